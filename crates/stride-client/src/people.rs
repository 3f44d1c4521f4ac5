//! Users, follows, avatars and stories.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use stride_shared::models::{Story, User, UserSummary};
use stride_shared::types::{StoryId, UserId};

use crate::api::ImageUpload;
use crate::error::{ClientError, Result};
use crate::mapping::{map_story, map_user, map_user_summary, MediaResolver};
use crate::remote::RemoteClient;

#[derive(Clone)]
pub struct People {
    remote: RemoteClient,
    media: MediaResolver,
}

impl People {
    pub fn new(remote: RemoteClient, media: MediaResolver) -> Self {
        Self { remote, media }
    }

    pub async fn user(&self, id: UserId) -> Result<User> {
        let dto = self.remote.user(id).await?;
        Ok(map_user(&dto, &self.media))
    }

    pub async fn all(&self) -> Result<Vec<UserSummary>> {
        let dtos = self.remote.users().await?;
        Ok(self.summaries(&dtos))
    }

    /// Sidebar suggestions: everyone except the viewer. A failed load shows
    /// no suggestions instead of an error.
    pub async fn suggested(&self, viewer: UserId, limit: usize) -> Vec<UserSummary> {
        match self.all().await {
            Ok(users) => users
                .into_iter()
                .filter(|u| u.id != viewer)
                .take(limit)
                .collect(),
            Err(e) => {
                warn!(error = %e, "failed to load suggested users");
                Vec::new()
            }
        }
    }

    /// Blank queries return nothing without a request.
    pub async fn search(&self, query: &str) -> Result<Vec<UserSummary>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let dtos = self.remote.search_users(query).await?;
        Ok(self.summaries(&dtos))
    }

    /// Toggle whether `viewer` follows `target`.
    pub async fn toggle_follow(&self, viewer: UserId, target: UserId) -> Result<()> {
        if viewer == target {
            return Err(ClientError::Validation("cannot follow yourself".into()));
        }
        self.remote.follow(target, viewer).await?;
        info!(%viewer, %target, "follow toggled");
        Ok(())
    }

    pub async fn followers(&self, user: UserId) -> Result<Vec<UserSummary>> {
        let dtos = self.remote.followers(user).await?;
        Ok(self.summaries(&dtos))
    }

    pub async fn following(&self, user: UserId) -> Result<Vec<UserSummary>> {
        let dtos = self.remote.following(user).await?;
        Ok(self.summaries(&dtos))
    }

    pub async fn upload_avatar(&self, user: UserId, image: ImageUpload) -> Result<User> {
        if image.is_empty() {
            return Err(ClientError::Validation("avatar image is empty".into()));
        }
        let dto = self.remote.upload_avatar(user, image).await?;
        info!(%user, "avatar updated");
        Ok(map_user(&dto, &self.media))
    }

    /// Live stories, newest first.
    pub async fn stories(&self, now: DateTime<Utc>) -> Result<Vec<Story>> {
        let dtos = self.remote.stories().await?;
        let mut stories: Vec<Story> = dtos
            .iter()
            .map(|s| map_story(s, &self.media))
            .filter(|s| !s.is_expired(now))
            .collect();
        stories.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(stories)
    }

    pub async fn post_story(&self, user: UserId, media: ImageUpload) -> Result<Story> {
        if media.is_empty() {
            return Err(ClientError::Validation("story media is empty".into()));
        }
        let dto = self.remote.create_story(user, media).await?;
        Ok(map_story(&dto, &self.media))
    }

    pub async fn delete_story(&self, story: StoryId, user: UserId) -> Result<()> {
        self.remote.delete_story(story, user).await
    }

    fn summaries(&self, dtos: &[stride_shared::dto::UserSummaryDto]) -> Vec<UserSummary> {
        dtos.iter()
            .map(|u| map_user_summary(u, &self.media))
            .collect()
    }
}
