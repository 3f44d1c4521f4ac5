//! The backend seam used by the feed and chat state.
//!
//! [`SocialApi`] covers exactly the calls that [`PostStore`](crate::PostStore),
//! [`FeedController`](crate::FeedController) and
//! [`ChatSession`](crate::ChatSession) make. [`RemoteClient`](crate::RemoteClient)
//! implements it over HTTP; tests substitute an in-memory double.

use async_trait::async_trait;

use stride_shared::dto::{CommentDto, MessageDto, NewMessage, PostDto};
use stride_shared::types::{FeedType, PostId, UserId};

use crate::error::Result;

/// An image attached to a post, story or avatar upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[async_trait]
pub trait SocialApi: Send + Sync {
    /// `GET /api/posts?type=..&userId=..`
    async fn fetch_posts(&self, feed: FeedType, viewer: Option<UserId>) -> Result<Vec<PostDto>>;

    /// `POST /api/posts/user/{author}` (multipart)
    async fn create_post(
        &self,
        author: UserId,
        content: &str,
        image: Option<ImageUpload>,
    ) -> Result<PostDto>;

    /// `POST /api/posts/{post}/like?userId=..` (toggles server-side)
    async fn like_post(&self, post: PostId, viewer: UserId) -> Result<()>;

    /// `POST /api/posts/{post}/comments?userId=..` (raw text body)
    async fn add_comment(&self, post: PostId, viewer: UserId, text: &str) -> Result<CommentDto>;

    /// `DELETE /api/posts/{post}?userId=..`
    async fn delete_post(&self, post: PostId, viewer: UserId) -> Result<()>;

    /// `POST /api/posts/{post}/repost?userId=..`
    async fn repost(&self, post: PostId, viewer: UserId, quote: Option<&str>) -> Result<PostDto>;

    /// `GET /api/messages/{a}/{b}`
    async fn conversation(&self, a: UserId, b: UserId) -> Result<Vec<MessageDto>>;

    /// `POST /api/messages`
    async fn send_message(&self, message: &NewMessage) -> Result<()>;
}
