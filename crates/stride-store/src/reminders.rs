//! Reminder snoozes and one-time UI flags.

use chrono::{DateTime, Utc};

use stride_shared::constants::{KEY_ALERT_SHOWN_PREFIX, KEY_REMINDER_SNOOZE_PREFIX};
use stride_shared::types::UserId;

use crate::cache::LocalCache;
use crate::error::Result;

fn snooze_key(user: UserId) -> String {
    format!("{KEY_REMINDER_SNOOZE_PREFIX}{user}")
}

fn flag_key(name: &str) -> String {
    format!("{KEY_ALERT_SHOWN_PREFIX}{name}")
}

impl LocalCache {
    /// When the measurement reminder was last snoozed by `user`.
    pub fn reminder_snoozed_at(&self, user: UserId) -> Result<Option<DateTime<Utc>>> {
        self.get(&snooze_key(user))
    }

    pub fn snooze_reminder(&self, user: UserId, at: DateTime<Utc>) -> Result<()> {
        self.set(&snooze_key(user), &at)
    }

    pub fn flag_is_set(&self, name: &str) -> Result<bool> {
        Ok(self.get::<bool>(&flag_key(name))?.unwrap_or(false))
    }

    /// Set a one-time flag. Returns `true` only for the call that set it.
    pub fn mark_flag_once(&self, name: &str) -> Result<bool> {
        if self.flag_is_set(name)? {
            return Ok(false);
        }
        self.set(&flag_key(name), &true)?;
        Ok(true)
    }
}
