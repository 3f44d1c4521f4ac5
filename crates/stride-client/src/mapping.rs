//! Backend DTO -> view model conversion.
//!
//! All functions here are pure: mapping the same DTO twice yields equal
//! models. Missing optional fields fall back to defaults instead of failing.

use tracing::warn;

use stride_shared::constants::MAX_REPOST_DEPTH;
use stride_shared::dto::{
    ChallengeDto, ChartDataDto, CommentDto, GroupDto, MessageDto, PostDto, StoryDto,
    UserChallengeDto, UserDto, UserSummaryDto,
};
use stride_shared::models::{
    ChartData, ChartPoint, ChatMessage, Challenge, Comment, Group, MessageKey, Post, PostKind,
    Story, User, UserChallenge, UserSummary,
};
use stride_shared::time::{format_display, parse_timestamp};
use stride_shared::types::{ChallengeStatus, GroupCategory};

/// Resolves image references against the upload host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaResolver {
    base: String,
}

impl MediaResolver {
    pub fn new(upload_url: &str) -> Self {
        Self {
            base: upload_url.trim_end_matches('/').to_string(),
        }
    }

    /// Absolute URLs pass through; relative paths are joined to the upload
    /// host; blank references resolve to `None`.
    pub fn resolve(&self, reference: Option<&str>) -> Option<String> {
        let reference = reference?.trim();
        if reference.is_empty() {
            return None;
        }
        if reference.starts_with("http://")
            || reference.starts_with("https://")
            || reference.starts_with("data:")
        {
            return Some(reference.to_string());
        }
        Some(format!("{}/{}", self.base, reference.trim_start_matches('/')))
    }
}

pub fn map_user_summary(dto: &UserSummaryDto, media: &MediaResolver) -> UserSummary {
    let username = non_blank(dto.username.as_deref())
        .or_else(|| non_blank(dto.name.as_deref()))
        .map(str::to_string)
        .unwrap_or_else(|| format!("user{}", dto.id));
    let name = non_blank(dto.name.as_deref())
        .map(str::to_string)
        .unwrap_or_else(|| username.clone());
    UserSummary {
        id: dto.id,
        name,
        username,
        avatar: media.resolve(dto.profile_picture.as_deref()),
    }
}

pub fn map_user(dto: &UserDto, media: &MediaResolver) -> User {
    let summary = map_user_summary(
        &UserSummaryDto {
            id: dto.id,
            name: dto.name.clone(),
            username: dto.username.clone(),
            profile_picture: dto.profile_picture.clone(),
        },
        media,
    );
    User {
        id: dto.id,
        username: summary.username,
        name: summary.name,
        avatar: summary.avatar,
        bio: dto.bio.clone(),
        last_measurement_update: dto
            .last_measurement_update
            .as_deref()
            .and_then(parse_timestamp),
        workout_plan: dto.workout_plan.clone(),
        diet_plan: dto.diet_plan.clone(),
    }
}

pub fn map_comment(dto: &CommentDto, media: &MediaResolver) -> Comment {
    let created_at = dto.created_at.as_deref().and_then(parse_timestamp);
    Comment {
        id: dto.id,
        author: author_or_unknown(dto.user.as_ref(), media),
        text: dto.text.clone().unwrap_or_default(),
        created_at,
        display_time: format_display(created_at),
    }
}

/// Map a backend post, unwrapping reposts recursively.
pub fn map_post(dto: &PostDto, media: &MediaResolver) -> Post {
    map_post_at_depth(dto, media, 0)
}

fn map_post_at_depth(dto: &PostDto, media: &MediaResolver, depth: usize) -> Post {
    let created_at = dto.created_at.as_deref().and_then(parse_timestamp);
    let comments_list: Vec<Comment> = dto
        .comments
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|c| map_comment(c, media))
        .collect();
    // With a list present its length is authoritative.
    let comments = if dto.comments.is_some() {
        comments_list.len() as u32
    } else {
        clamp_count(dto.comments_count)
    };

    let original_post = match dto.original_post.as_deref() {
        Some(inner) if depth < MAX_REPOST_DEPTH => {
            Some(Box::new(map_post_at_depth(inner, media, depth + 1)))
        }
        Some(inner) => {
            warn!(post = %dto.id, dropped = %inner.id, "repost chain too deep, truncating");
            None
        }
        None => None,
    };

    Post {
        id: dto.id,
        author: author_or_unknown(dto.user.as_ref(), media),
        kind: map_post_kind(dto),
        content: dto.description.clone().unwrap_or_default(),
        image: media.resolve(dto.image_url.as_deref()),
        created_at,
        display_time: format_display(created_at),
        likes: clamp_count(dto.likes_count),
        comments,
        is_liked: dto.liked,
        comments_list,
        original_post,
    }
}

/// Chart posts need their chart payload; a chart post without one is shown
/// as a standard post.
fn map_post_kind(dto: &PostDto) -> PostKind {
    let declared = dto.post_type.as_deref().map(|t| t.trim().to_ascii_lowercase());
    match (declared.as_deref(), dto.chart_data.as_ref()) {
        (Some("standard"), _) => PostKind::Standard,
        (_, Some(chart)) => PostKind::Chart(map_chart(chart)),
        (Some("chart"), None) => {
            warn!(post = %dto.id, "chart post without chart data");
            PostKind::Standard
        }
        _ => PostKind::Standard,
    }
}

fn map_chart(dto: &ChartDataDto) -> ChartData {
    ChartData {
        title: dto.title.clone(),
        period: dto.period.clone(),
        unit: dto.unit.clone(),
        data: dto
            .data
            .iter()
            .map(|p| ChartPoint {
                name: p.name.clone(),
                value: p.value.filter(|v| v.is_finite()).unwrap_or(0.0),
                unit: p
                    .unit
                    .clone()
                    .filter(|u| !u.trim().is_empty())
                    .unwrap_or_else(|| dto.unit.clone()),
            })
            .collect(),
    }
}

pub fn map_challenge(dto: &ChallengeDto, media: &MediaResolver) -> Challenge {
    Challenge {
        id: dto.id,
        title: dto.title.clone(),
        description: dto.description.clone(),
        category: dto.category.clone().unwrap_or_else(|| "general".to_string()),
        duration: dto
            .duration
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string(),
        target: dto.total_target.unwrap_or(0.0).max(0.0),
        reward: dto.reward.clone().unwrap_or_default(),
        participants: dto.participants_count.unwrap_or(0),
        creator: dto.creator.as_ref().map(|c| map_user_summary(c, media)),
    }
}

pub fn map_user_challenge(dto: &UserChallengeDto, media: &MediaResolver) -> UserChallenge {
    UserChallenge {
        id: dto.id,
        user_id: dto.user_id,
        challenge: map_challenge(&dto.challenge, media),
        status: dto
            .status
            .as_deref()
            .map(ChallengeStatus::parse)
            .unwrap_or_default(),
        progress: dto.progress.unwrap_or(0.0).max(0.0),
    }
}

pub fn map_group(dto: &GroupDto) -> Group {
    Group {
        id: dto.id,
        name: dto.name.clone(),
        description: dto.description.clone(),
        category: dto
            .category
            .as_deref()
            .map(GroupCategory::parse)
            .unwrap_or_default(),
        member_count: dto.members_count.unwrap_or(0),
        is_member: dto.member,
        location: dto.location.clone().filter(|l| !l.trim().is_empty()),
    }
}

pub fn map_message(dto: &MessageDto) -> ChatMessage {
    ChatMessage {
        key: MessageKey::Server(dto.id),
        sender_id: dto.sender_id,
        receiver_id: dto.receiver_id,
        content: dto.content.clone(),
        sent_at: dto
            .timestamp
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or_default(),
    }
}

pub fn map_story(dto: &StoryDto, media: &MediaResolver) -> Story {
    Story {
        id: dto.id,
        author: author_or_unknown(dto.user.as_ref(), media),
        media: media.resolve(dto.media_url.as_deref()),
        created_at: dto.created_at.as_deref().and_then(parse_timestamp),
        expires_at: dto.expires_at.as_deref().and_then(parse_timestamp),
    }
}

fn author_or_unknown(dto: Option<&UserSummaryDto>, media: &MediaResolver) -> UserSummary {
    dto.map(|u| map_user_summary(u, media))
        .unwrap_or_else(UserSummary::unknown)
}

fn clamp_count(raw: Option<i64>) -> u32 {
    raw.unwrap_or(0).clamp(0, u32::MAX as i64) as u32
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}
