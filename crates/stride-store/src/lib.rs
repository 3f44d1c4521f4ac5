//! # stride-store
//!
//! Durable client-side cache for Stride, backed by SQLite.
//!
//! The crate exposes a cloneable [`LocalCache`] handle over a small key/value
//! table. Every write is paired with a [`CacheChange`] broadcast so that all
//! handles sharing the cache converge on the same view. Typed helpers for the
//! session user, inbox summaries, reminder snoozes and one-time flags live in
//! their own modules.

pub mod cache;
pub mod inbox;
pub mod migrations;
pub mod reminders;
pub mod session;

mod error;

pub use cache::{CacheChange, ChangeKind, KeyWatch, LocalCache};
pub use error::{Result, StoreError};
