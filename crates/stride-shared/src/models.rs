//! View models the client state core hands to the UI layer.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can be cached
//! durably or passed across an IPC boundary unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{
    ChallengeId, ChallengeStatus, CommentId, GroupCategory, GroupId, MessageId, NavTarget,
    NotificationKind, PostId, StoryId, UserChallengeId, UserId,
};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// The signed-in user, cached for the duration of the session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub name: String,
    pub avatar: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    pub last_measurement_update: Option<DateTime<Utc>>,
    /// Raw JSON blob; decode with [`crate::plans::WorkoutPlan::parse_or_template`].
    #[serde(default)]
    pub workout_plan: Option<String>,
    /// Raw JSON blob; decode with [`crate::plans::DietPlan::parse_or_template`].
    #[serde(default)]
    pub diet_plan: Option<String>,
}

impl User {
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            username: self.username.clone(),
            avatar: self.avatar.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub username: String,
    pub avatar: Option<String>,
}

impl UserSummary {
    /// Placeholder used when the backend omits the author of a record.
    pub fn unknown() -> Self {
        Self {
            id: UserId(0),
            name: "Unknown".to_string(),
            username: "unknown".to_string(),
            avatar: None,
        }
    }

    /// Synthetic author of client-generated system notifications.
    pub fn system() -> Self {
        Self {
            id: UserId(0),
            name: "Stride".to_string(),
            username: "stride".to_string(),
            avatar: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Feed
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub author: UserSummary,
    pub text: String,
    pub created_at: Option<DateTime<Utc>>,
    pub display_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub name: String,
    pub value: f64,
    pub unit: String,
}

/// Progress chart attached to a chart post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub title: String,
    pub period: String,
    pub unit: String,
    pub data: Vec<ChartPoint>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "chart", rename_all = "lowercase")]
pub enum PostKind {
    #[default]
    Standard,
    Chart(ChartData),
}

/// A feed entry. Reposts carry the wrapped post in `original_post`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub author: UserSummary,
    #[serde(default)]
    pub kind: PostKind,
    pub content: String,
    pub image: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub display_time: String,
    pub likes: u32,
    pub comments: u32,
    pub is_liked: bool,
    pub comments_list: Vec<Comment>,
    pub original_post: Option<Box<Post>>,
}

impl Post {
    pub fn is_repost(&self) -> bool {
        self.original_post.is_some()
    }

    pub fn chart(&self) -> Option<&ChartData> {
        match &self.kind {
            PostKind::Chart(chart) => Some(chart),
            PostKind::Standard => None,
        }
    }

    /// Owner check used to decide whether delete is offered. The server
    /// performs the authoritative check.
    pub fn is_owned_by(&self, viewer: UserId) -> bool {
        self.author.id == viewer
    }

    /// Number of nested reposts below this post.
    pub fn repost_depth(&self) -> usize {
        let mut depth = 0;
        let mut cursor = self.original_post.as_deref();
        while let Some(inner) = cursor {
            depth += 1;
            cursor = inner.original_post.as_deref();
        }
        depth
    }
}

// ---------------------------------------------------------------------------
// Challenges
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub id: ChallengeId,
    pub title: String,
    pub description: String,
    pub category: String,
    /// Display label, e.g. "30 days".
    pub duration: String,
    pub target: f64,
    pub reward: String,
    pub participants: u32,
    pub creator: Option<UserSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserChallenge {
    pub id: UserChallengeId,
    pub user_id: Option<UserId>,
    pub challenge: Challenge,
    pub status: ChallengeStatus,
    pub progress: f64,
}

impl UserChallenge {
    /// Progress clamped into `0..=target` for display.
    pub fn display_progress(&self) -> f64 {
        self.progress.clamp(0.0, self.challenge.target.max(0.0))
    }

    /// Fraction of the target reached, in `0.0..=1.0`.
    pub fn completion_ratio(&self) -> f64 {
        if self.challenge.target <= 0.0 {
            return 0.0;
        }
        self.display_progress() / self.challenge.target
    }
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub description: String,
    pub category: GroupCategory,
    pub member_count: u32,
    pub is_member: bool,
    pub location: Option<String>,
}

// ---------------------------------------------------------------------------
// Messaging
// ---------------------------------------------------------------------------

/// Denormalized per-conversation record kept in the durable cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InboxChat {
    pub user_id: UserId,
    pub username: String,
    pub avatar: Option<String>,
    pub last_message: String,
    pub timestamp: DateTime<Utc>,
}

/// Identity of a chat message: server-assigned, or a local echo that has not
/// been confirmed by a poll yet.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum MessageKey {
    Server(MessageId),
    Local(Uuid),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub key: MessageKey,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn is_pending(&self) -> bool {
        matches!(self.key, MessageKey::Local(_))
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppNotification {
    pub id: String,
    pub kind: NotificationKind,
    pub user: UserSummary,
    pub text: String,
    pub time_label: String,
    pub read: bool,
    pub target: Option<NavTarget>,
}

// ---------------------------------------------------------------------------
// Stories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: StoryId,
    pub author: UserSummary,
    pub media: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Story {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|at| at <= now).unwrap_or(false)
    }
}
