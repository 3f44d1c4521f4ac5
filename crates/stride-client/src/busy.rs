//! In-flight flags for user actions.
//!
//! A [`BusyFlag`] mirrors the disabled state of a submit control: while one
//! submission is running, a second is rejected with
//! [`ClientError::Busy`](crate::ClientError::Busy). The flag resets when the
//! guard drops, so a cancelled future cannot leave it stuck.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{ClientError, Result};

#[derive(Debug, Clone, Default)]
pub struct BusyFlag(Arc<AtomicBool>);

impl BusyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn acquire(&self) -> Result<BusyGuard> {
        if self.0.swap(true, Ordering::AcqRel) {
            return Err(ClientError::Busy);
        }
        Ok(BusyGuard(self.0.clone()))
    }
}

#[must_use = "the flag is released as soon as the guard drops"]
#[derive(Debug)]
pub struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
