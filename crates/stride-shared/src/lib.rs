//! # stride-shared
//!
//! Types shared by every Stride crate: identifiers, backend wire DTOs, view
//! models, plan documents and constants. Nothing in here performs I/O.

pub mod constants;
pub mod dto;
pub mod error;
pub mod models;
pub mod plans;
pub mod time;
pub mod types;

pub use error::ModelError;
