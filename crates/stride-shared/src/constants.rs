/// Default backend origin used when no configuration is provided
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Chat history polling interval in seconds
pub const CHAT_POLL_INTERVAL_SECS: u64 = 3;

/// Days without a measurement update before the reminder fires
pub const MEASUREMENT_REMINDER_DAYS: i64 = 15;

/// How long a snoozed reminder stays quiet (hours)
pub const REMINDER_SNOOZE_HOURS: i64 = 24;

/// Delay after mount before the reminder check runs (milliseconds)
pub const REMINDER_CHECK_DELAY_MS: u64 = 3_000;

/// Text fragment every measurement reminder carries; used for dedup
pub const REMINDER_MARKER: &str = "update your measurements";

/// Search-as-you-type debounce window (milliseconds)
pub const SEARCH_DEBOUNCE_MS: u64 = 300;

/// Deepest repost chain kept when mapping backend posts
pub const MAX_REPOST_DEPTH: usize = 8;

/// Display format for post and comment timestamps
pub const DISPLAY_TIME_FORMAT: &str = "%b %-d, %Y %H:%M";

/// Default HTTP timeout in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Durable cache keys. These must stay stable across releases.
pub const KEY_CURRENT_USER: &str = "currentUser";
pub const KEY_AUTH_TOKEN: &str = "authToken";
pub const KEY_INBOX_CHATS: &str = "inboxChats";
pub const KEY_REMINDER_SNOOZE_PREFIX: &str = "measurementReminderSnooze:";
pub const KEY_ALERT_SHOWN_PREFIX: &str = "alertShown:";
