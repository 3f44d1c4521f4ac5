//! Notification and inbox badge state.
//!
//! Three independent sources feed the badge:
//! - a measurement reminder synthesized on the client when the user's last
//!   measurement update is stale and the reminder is not snoozed,
//! - inbox summaries from the [`LocalCache`], reloaded whenever the cache
//!   broadcasts a change of the inbox key,
//! - social notifications pushed or seeded by the embedding UI.
//!
//! Read state is local only.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use stride_shared::constants::{
    KEY_INBOX_CHATS, MEASUREMENT_REMINDER_DAYS, REMINDER_CHECK_DELAY_MS, REMINDER_MARKER,
    REMINDER_SNOOZE_HOURS,
};
use stride_shared::models::{AppNotification, InboxChat, User, UserSummary};
use stride_shared::time::{days_between, relative_label};
use stride_shared::types::{NavTarget, NotificationKind};
use stride_store::{KeyWatch, LocalCache};

use crate::error::Result;

const REMINDER_ID: &str = "measurement-reminder";

/// Aggregated counts for the navigation badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PresenceBadge {
    pub unread_notifications: usize,
    pub conversations: usize,
}

pub struct PresenceAggregator {
    cache: LocalCache,
    viewer: User,
    notifications: Vec<AppNotification>,
    inbox: Vec<InboxChat>,
}

impl PresenceAggregator {
    pub fn new(cache: LocalCache, viewer: User) -> Self {
        Self {
            cache,
            viewer,
            notifications: Vec::new(),
            inbox: Vec::new(),
        }
    }

    pub fn notifications(&self) -> &[AppNotification] {
        &self.notifications
    }

    pub fn inbox(&self) -> &[InboxChat] {
        &self.inbox
    }

    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }

    pub fn badge(&self) -> PresenceBadge {
        PresenceBadge {
            unread_notifications: self.unread_count(),
            conversations: self.inbox.len(),
        }
    }

    /// Update the viewer record (e.g. after logging new measurements).
    pub fn set_viewer(&mut self, viewer: User) {
        self.viewer = viewer;
    }

    // ------------------------------------------------------------------
    // Inbox
    // ------------------------------------------------------------------

    /// Reload inbox summaries. A cache failure degrades to an empty inbox.
    pub fn refresh_inbox(&mut self) {
        self.inbox = match self.cache.load_inbox(self.viewer.id) {
            Ok(list) => list,
            Err(e) => {
                warn!(error = %e, "failed to load inbox, showing none");
                Vec::new()
            }
        };
        debug!(count = self.inbox.len(), "inbox refreshed");
    }

    /// Change stream for the inbox key; pass it to [`Self::follow_inbox`].
    pub fn watch_inbox(&self) -> KeyWatch {
        self.cache.watch(KEY_INBOX_CHATS)
    }

    /// Wait for the next inbox change and reload. Returns `false` once the
    /// cache is gone.
    pub async fn follow_inbox(&mut self, watch: &mut KeyWatch) -> bool {
        match watch.changed().await {
            Some(_) => {
                self.refresh_inbox();
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Measurement reminder
    // ------------------------------------------------------------------

    /// Mount-time work: load the inbox, then run the reminder check after
    /// the fixed delay. Returns whether a reminder was added.
    pub async fn mount(&mut self) -> Result<bool> {
        self.refresh_inbox();
        tokio::time::sleep(Duration::from_millis(REMINDER_CHECK_DELAY_MS)).await;
        self.check_measurement_reminder(Utc::now())
    }

    /// Add the measurement reminder if it is due, not snoozed and not
    /// already present. Returns whether a reminder was added.
    ///
    /// Raising the reminder also starts the snooze window, so other mounts
    /// stay quiet for the next 24 hours.
    pub fn check_measurement_reminder(&mut self, now: DateTime<Utc>) -> Result<bool> {
        let days = self
            .viewer
            .last_measurement_update
            .map(|at| days_between(at, now));
        if matches!(days, Some(d) if d < MEASUREMENT_REMINDER_DAYS) {
            return Ok(false);
        }

        if let Some(snoozed_at) = self.cache.reminder_snoozed_at(self.viewer.id)? {
            if now - snoozed_at < chrono::Duration::hours(REMINDER_SNOOZE_HOURS) {
                debug!(user = %self.viewer.id, "measurement reminder snoozed");
                return Ok(false);
            }
        }

        if self
            .notifications
            .iter()
            .any(|n| n.text.contains(REMINDER_MARKER))
        {
            return Ok(false);
        }

        let text = match days {
            Some(d) => format!(
                "It's been {d} days since your last check-in. Time to {REMINDER_MARKER}!"
            ),
            None => format!("No measurements logged yet. Time to {REMINDER_MARKER}!"),
        };
        self.notifications.insert(
            0,
            AppNotification {
                id: REMINDER_ID.to_string(),
                kind: NotificationKind::System,
                user: UserSummary::system(),
                text,
                time_label: relative_label(now, now),
                read: false,
                target: Some(NavTarget::Progress),
            },
        );
        if let Err(e) = self.cache.snooze_reminder(self.viewer.id, now) {
            warn!(user = %self.viewer.id, error = %e, "failed to record reminder snooze");
        }
        info!(user = %self.viewer.id, days = ?days, "measurement reminder raised");
        Ok(true)
    }

    /// Silence the reminder for the snooze window and drop it from the list.
    pub fn snooze_reminder(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.cache.snooze_reminder(self.viewer.id, now)?;
        self.notifications
            .retain(|n| !n.text.contains(REMINDER_MARKER));
        Ok(())
    }

    // ------------------------------------------------------------------
    // Social notifications
    // ------------------------------------------------------------------

    /// Add a notification unless one with the same id is present.
    pub fn push(&mut self, notification: AppNotification) -> bool {
        if self.notifications.iter().any(|n| n.id == notification.id) {
            return false;
        }
        self.notifications.insert(0, notification);
        true
    }

    pub fn seed(&mut self, notifications: impl IntoIterator<Item = AppNotification>) {
        for n in notifications {
            self.push(n);
        }
    }

    /// Mark one notification read and return where the UI should go.
    pub fn mark_read(&mut self, id: &str) -> Option<NavTarget> {
        let n = self.notifications.iter_mut().find(|n| n.id == id)?;
        n.read = true;
        n.target
    }

    pub fn mark_all_read(&mut self) {
        for n in &mut self.notifications {
            n.read = true;
        }
    }
}

/// Build a social notification with the navigation target its kind implies.
pub fn social_notification(
    id: impl Into<String>,
    kind: NotificationKind,
    user: UserSummary,
    at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> AppNotification {
    let (text, target) = match kind {
        NotificationKind::Follow => (format!("{} started following you", user.name), NavTarget::Profile),
        NotificationKind::Like => (format!("{} liked your post", user.name), NavTarget::Home),
        NotificationKind::Comment => (format!("{} commented on your post", user.name), NavTarget::Home),
        NotificationKind::Story => (format!("{} shared a new story", user.name), NavTarget::Home),
        NotificationKind::System => (String::new(), NavTarget::Progress),
    };
    AppNotification {
        id: id.into(),
        kind,
        user,
        text,
        time_label: relative_label(at, now),
        read: false,
        target: Some(target),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use stride_shared::types::UserId;

    fn viewer(days_since_update: Option<i64>) -> User {
        User {
            id: UserId(1),
            username: "mia".into(),
            name: "Mia".into(),
            avatar: None,
            bio: None,
            last_measurement_update: days_since_update
                .map(|d| Utc::now() - ChronoDuration::days(d)),
            workout_plan: None,
            diet_plan: None,
        }
    }

    fn friend() -> UserSummary {
        UserSummary {
            id: UserId(2),
            name: "Bo".into(),
            username: "bo".into(),
            avatar: None,
        }
    }

    #[test]
    fn stale_measurements_raise_one_reminder() {
        let cache = LocalCache::in_memory().unwrap();
        let mut presence = PresenceAggregator::new(cache, viewer(Some(20)));
        let now = Utc::now();

        assert!(presence.check_measurement_reminder(now).unwrap());
        assert!(!presence.check_measurement_reminder(now).unwrap());

        let reminders: Vec<_> = presence
            .notifications()
            .iter()
            .filter(|n| n.kind == NotificationKind::System)
            .collect();
        assert_eq!(reminders.len(), 1);
        assert!(reminders[0].text.contains("20 days"));
        assert_eq!(presence.unread_count(), 1);
    }

    #[test]
    fn fresh_measurements_raise_nothing() {
        let cache = LocalCache::in_memory().unwrap();
        let mut presence = PresenceAggregator::new(cache, viewer(Some(3)));
        assert!(!presence.check_measurement_reminder(Utc::now()).unwrap());
        assert!(presence.notifications().is_empty());
    }

    #[test]
    fn recent_snooze_suppresses_reminder() {
        let cache = LocalCache::in_memory().unwrap();
        let now = Utc::now();
        cache
            .snooze_reminder(UserId(1), now - ChronoDuration::hours(23))
            .unwrap();
        let mut presence = PresenceAggregator::new(cache, viewer(Some(200)));
        assert!(!presence.check_measurement_reminder(now).unwrap());
    }

    #[test]
    fn expired_snooze_allows_reminder() {
        let cache = LocalCache::in_memory().unwrap();
        let now = Utc::now();
        cache
            .snooze_reminder(UserId(1), now - ChronoDuration::hours(25))
            .unwrap();
        let mut presence = PresenceAggregator::new(cache, viewer(Some(16)));
        assert!(presence.check_measurement_reminder(now).unwrap());
    }

    #[test]
    fn raised_reminder_quiets_other_mounts() {
        let cache = LocalCache::in_memory().unwrap();
        let now = Utc::now();
        let mut first = PresenceAggregator::new(cache.clone(), viewer(Some(20)));
        assert!(first.check_measurement_reminder(now).unwrap());
        assert_eq!(cache.reminder_snoozed_at(UserId(1)).unwrap(), Some(now));

        let mut second = PresenceAggregator::new(cache.clone(), viewer(Some(20)));
        assert!(!second.check_measurement_reminder(now + ChronoDuration::hours(2)).unwrap());
        assert!(second.notifications().is_empty());

        let mut next_day = PresenceAggregator::new(cache, viewer(Some(21)));
        assert!(next_day
            .check_measurement_reminder(now + ChronoDuration::hours(25))
            .unwrap());
    }

    #[test]
    fn snoozing_removes_and_persists() {
        let cache = LocalCache::in_memory().unwrap();
        let mut presence = PresenceAggregator::new(cache.clone(), viewer(None));
        let now = Utc::now();
        assert!(presence.check_measurement_reminder(now).unwrap());

        presence.snooze_reminder(now).unwrap();
        assert!(presence.notifications().is_empty());
        assert_eq!(cache.reminder_snoozed_at(UserId(1)).unwrap(), Some(now));
        assert!(!presence.check_measurement_reminder(now).unwrap());
    }

    #[test]
    fn mark_read_returns_target() {
        let cache = LocalCache::in_memory().unwrap();
        let mut presence = PresenceAggregator::new(cache, viewer(Some(1)));
        let now = Utc::now();
        presence.seed(vec![
            social_notification("n1", NotificationKind::Follow, friend(), now, now),
            social_notification("n2", NotificationKind::Like, friend(), now, now),
            social_notification("n1", NotificationKind::Follow, friend(), now, now),
        ]);
        assert_eq!(presence.notifications().len(), 2);
        assert_eq!(presence.unread_count(), 2);

        assert_eq!(presence.mark_read("n1"), Some(NavTarget::Profile));
        assert_eq!(presence.unread_count(), 1);
        assert_eq!(presence.mark_read("missing"), None);

        presence.mark_all_read();
        assert_eq!(presence.badge().unread_notifications, 0);
    }

    #[tokio::test]
    async fn inbox_follows_cache_changes() {
        let cache = LocalCache::in_memory().unwrap();
        let mut presence = PresenceAggregator::new(cache.clone(), viewer(Some(1)));
        presence.refresh_inbox();
        assert!(presence.inbox().is_empty());

        let mut watch = presence.watch_inbox();
        let other_tab = cache.clone();
        other_tab
            .upsert_inbox_chat(
                UserId(1),
                InboxChat {
                    user_id: UserId(2),
                    username: "bo".into(),
                    avatar: None,
                    last_message: "see you at the gym".into(),
                    timestamp: Utc::now(),
                },
            )
            .unwrap();

        assert!(presence.follow_inbox(&mut watch).await);
        assert_eq!(presence.inbox().len(), 1);
        assert_eq!(presence.badge().conversations, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn mount_runs_reminder_after_delay() {
        let cache = LocalCache::in_memory().unwrap();
        let mut presence = PresenceAggregator::new(cache, viewer(Some(30)));
        let started = tokio::time::Instant::now();
        assert!(presence.mount().await.unwrap());
        assert!(started.elapsed() >= Duration::from_millis(3_000));
        assert_eq!(presence.unread_count(), 1);
    }
}
