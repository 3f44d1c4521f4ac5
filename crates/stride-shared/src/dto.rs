//! Backend wire representations.
//!
//! These mirror the JSON the REST API sends. Every optional field carries a
//! serde default so a sparse payload still decodes; conversion into the view
//! models in [`crate::models`] happens on the client side where the upload
//! host is known.

use serde::{Deserialize, Serialize};

use crate::types::{
    ChallengeId, CommentId, GroupId, MessageId, PostId, StoryId, UserChallengeId, UserId,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserSummaryDto {
    pub id: UserId,
    #[serde(default, alias = "fullName")]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, alias = "avatar", alias = "avatarUrl")]
    pub profile_picture: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: UserId,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, alias = "fullName")]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "avatar", alias = "avatarUrl")]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub last_measurement_update: Option<String>,
    #[serde(default)]
    pub workout_plan: Option<String>,
    #[serde(default)]
    pub diet_plan: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CommentDto {
    pub id: CommentId,
    #[serde(default, alias = "author")]
    pub user: Option<UserSummaryDto>,
    #[serde(default, alias = "content")]
    pub text: Option<String>,
    #[serde(default, alias = "timestamp")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PostDto {
    pub id: PostId,
    #[serde(default, alias = "author")]
    pub user: Option<UserSummaryDto>,
    #[serde(default, alias = "content")]
    pub description: Option<String>,
    #[serde(default, alias = "photoUrl", alias = "image")]
    pub image_url: Option<String>,
    #[serde(default, alias = "publicationDate")]
    pub created_at: Option<String>,
    #[serde(default, alias = "likeCount", alias = "likes")]
    pub likes_count: Option<i64>,
    #[serde(default, alias = "commentCount")]
    pub comments_count: Option<i64>,
    #[serde(default, alias = "isLiked", alias = "likedByUser")]
    pub liked: bool,
    #[serde(default)]
    pub comments: Option<Vec<CommentDto>>,
    #[serde(default)]
    pub original_post: Option<Box<PostDto>>,
    #[serde(default)]
    pub post_type: Option<String>,
    #[serde(default)]
    pub chart_data: Option<ChartDataDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChartPointDto {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataDto {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub data: Vec<ChartPointDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeDto {
    pub id: ChallengeId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    /// Free-form label such as "15 days". Older payloads send a bare day
    /// count, which is turned into the same kind of label.
    #[serde(default, alias = "durationDays", deserialize_with = "label_or_number")]
    pub duration: Option<String>,
    #[serde(default, alias = "targetValue", alias = "target")]
    pub total_target: Option<f64>,
    #[serde(default)]
    pub reward: Option<String>,
    #[serde(default, alias = "participants")]
    pub participants_count: Option<u32>,
    #[serde(default)]
    pub creator: Option<UserSummaryDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserChallengeDto {
    pub id: UserChallengeId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub challenge: ChallengeDto,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub progress: Option<f64>,
}

/// Request body for `POST /api/challenges`; the backend binds it straight
/// onto its challenge record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewChallenge {
    pub title: String,
    pub description: String,
    pub category: String,
    pub duration: String,
    pub total_target: u32,
    pub reward: String,
}

fn label_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Label(String),
        Days(u64),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Label(label)) => Some(label),
        Some(Raw::Days(days)) => Some(format!("{days} days")),
        None => None,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GroupDto {
    pub id: GroupId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, alias = "memberCount")]
    pub members_count: Option<u32>,
    #[serde(default, alias = "isMember")]
    pub member: bool,
    #[serde(default)]
    pub location: Option<String>,
}

/// Request body for `POST /api/groups`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewGroup {
    pub name: String,
    pub description: String,
    pub category: String,
    pub location: Option<String>,
    pub creator_id: UserId,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: MessageId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    #[serde(default)]
    pub content: String,
    #[serde(default, alias = "sentAt")]
    pub timestamp: Option<String>,
}

/// Request body for `POST /api/messages`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct StoryDto {
    pub id: StoryId,
    #[serde(default)]
    pub user: Option<UserSummaryDto>,
    #[serde(default, alias = "imageUrl")]
    pub media_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub expires_at: Option<String>,
}

/// Request body for `POST /auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login/registration response that wraps the user next to a bearer token.
/// Some deployments answer with the bare user instead; see the client's
/// session handling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[serde(default)]
    pub token: Option<String>,
    pub user: UserDto,
}
