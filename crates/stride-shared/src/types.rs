use serde::{Deserialize, Serialize};

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(v: i64) -> Self {
                Self(v)
            }
        }
    };
}

numeric_id!(
    /// Server-assigned user identifier.
    UserId
);
numeric_id!(PostId);
numeric_id!(CommentId);
numeric_id!(ChallengeId);
numeric_id!(
    /// Identifier of the join record between a user and a challenge.
    UserChallengeId
);
numeric_id!(GroupId);
numeric_id!(MessageId);
numeric_id!(StoryId);

/// Which slice of posts the feed shows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FeedType {
    #[default]
    General,
    Following,
}

impl FeedType {
    pub fn as_query(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Following => "following",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    List,
    Grid,
}

/// Closed set of group categories. Anything the backend sends outside this
/// set collapses to `General`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GroupCategory {
    Running,
    Cycling,
    Strength,
    Yoga,
    Nutrition,
    #[default]
    General,
}

impl GroupCategory {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "running" => Self::Running,
            "cycling" => Self::Cycling,
            "strength" => Self::Strength,
            "yoga" => Self::Yoga,
            "nutrition" => Self::Nutrition,
            _ => Self::General,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Cycling => "cycling",
            Self::Strength => "strength",
            Self::Yoga => "yoga",
            Self::Nutrition => "nutrition",
            Self::General => "general",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeStatus {
    #[default]
    Active,
    Completed,
}

impl ChallengeStatus {
    /// Backend sends upper- or lower-case status strings.
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("completed") {
            Self::Completed
        } else {
            Self::Active
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Follow,
    Like,
    Comment,
    Story,
    System,
}

/// Where the UI should navigate when a notification is opened.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NavTarget {
    Home,
    Profile,
    Messages,
    Challenges,
    Community,
    Progress,
}
