//! In-memory [`SocialApi`] used by unit tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use stride_shared::dto::{CommentDto, MessageDto, NewMessage, PostDto, UserSummaryDto};
use stride_shared::types::{CommentId, FeedType, MessageId, PostId, UserId};

use crate::api::{ImageUpload, SocialApi};
use crate::error::{ClientError, Result};

#[derive(Default)]
struct FakeState {
    next_id: i64,
    posts: Vec<PostDto>,
    messages: Vec<MessageDto>,
    followed: HashSet<UserId>,
    failing: HashSet<&'static str>,
    calls: Vec<String>,
}

#[derive(Default)]
pub(crate) struct FakeApi {
    state: Mutex<FakeState>,
    conversation_delay: Mutex<Option<Duration>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

pub(crate) fn author(id: i64) -> UserSummaryDto {
    UserSummaryDto {
        id: UserId(id),
        name: Some(format!("User {id}")),
        username: Some(format!("user{id}")),
        profile_picture: None,
    }
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_post(&self, id: i64, author_id: i64, content: &str, likes: i64, liked: bool) {
        let mut s = self.state.lock().unwrap();
        s.next_id = s.next_id.max(id);
        s.posts.push(PostDto {
            id: PostId(id),
            user: Some(author(author_id)),
            description: Some(content.to_string()),
            likes_count: Some(likes),
            liked,
            comments: Some(Vec::new()),
            ..PostDto::default()
        });
    }

    pub fn seed_message(&self, from: i64, to: i64, content: &str) {
        let mut s = self.state.lock().unwrap();
        s.next_id += 1;
        let id = s.next_id;
        s.messages.push(MessageDto {
            id: MessageId(id),
            sender_id: UserId(from),
            receiver_id: UserId(to),
            content: content.to_string(),
            timestamp: Some("2024-05-01T10:00:00".to_string()),
        });
    }

    pub fn follow(&self, user: i64) {
        self.state.lock().unwrap().followed.insert(UserId(user));
    }

    pub fn fail(&self, op: &'static str) {
        self.state.lock().unwrap().failing.insert(op);
    }

    pub fn heal(&self, op: &'static str) {
        self.state.lock().unwrap().failing.remove(op);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn message_count(&self) -> usize {
        self.state.lock().unwrap().messages.len()
    }

    pub fn set_conversation_delay(&self, delay: Duration) {
        *self.conversation_delay.lock().unwrap() = Some(delay);
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn enter(&self, op: &'static str) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(op.to_string());
        if s.failing.contains(op) {
            return Err(ClientError::Status {
                status: 500,
                body: format!("{op} failed"),
            });
        }
        Ok(())
    }

    fn next_id(&self) -> i64 {
        let mut s = self.state.lock().unwrap();
        s.next_id += 1;
        s.next_id
    }
}

#[async_trait]
impl SocialApi for FakeApi {
    async fn fetch_posts(&self, feed: FeedType, _viewer: Option<UserId>) -> Result<Vec<PostDto>> {
        self.enter("fetch")?;
        let s = self.state.lock().unwrap();
        Ok(s.posts
            .iter()
            .filter(|p| match feed {
                FeedType::General => true,
                FeedType::Following => p
                    .user
                    .as_ref()
                    .map(|u| s.followed.contains(&u.id))
                    .unwrap_or(false),
            })
            .cloned()
            .collect())
    }

    async fn create_post(
        &self,
        author_id: UserId,
        content: &str,
        image: Option<ImageUpload>,
    ) -> Result<PostDto> {
        self.enter("publish")?;
        let id = self.next_id();
        let dto = PostDto {
            id: PostId(id),
            user: Some(author(author_id.0)),
            description: Some(content.to_string()),
            image_url: image.map(|i| i.file_name),
            created_at: Some("2024-05-01T10:00:00".to_string()),
            likes_count: Some(0),
            comments_count: Some(0),
            ..PostDto::default()
        };
        self.state.lock().unwrap().posts.insert(0, dto.clone());
        Ok(dto)
    }

    async fn like_post(&self, post: PostId, _viewer: UserId) -> Result<()> {
        self.enter("like")?;
        let mut s = self.state.lock().unwrap();
        if let Some(p) = s.posts.iter_mut().find(|p| p.id == post) {
            p.liked = !p.liked;
            let delta = if p.liked { 1 } else { -1 };
            p.likes_count = Some(p.likes_count.unwrap_or(0) + delta);
        }
        Ok(())
    }

    async fn add_comment(&self, post: PostId, viewer: UserId, text: &str) -> Result<CommentDto> {
        self.enter("comment")?;
        let id = self.next_id();
        let comment = CommentDto {
            id: CommentId(id),
            user: Some(author(viewer.0)),
            // The server trims; the client must show the server's version.
            text: Some(text.trim().to_string()),
            created_at: Some("2024-05-01T10:05:00".to_string()),
        };
        let mut s = self.state.lock().unwrap();
        if let Some(p) = s.posts.iter_mut().find(|p| p.id == post) {
            p.comments.get_or_insert_with(Vec::new).push(comment.clone());
        }
        Ok(comment)
    }

    async fn delete_post(&self, post: PostId, _viewer: UserId) -> Result<()> {
        self.enter("delete")?;
        self.state.lock().unwrap().posts.retain(|p| p.id != post);
        Ok(())
    }

    async fn repost(&self, post: PostId, viewer: UserId, quote: Option<&str>) -> Result<PostDto> {
        self.enter("repost")?;
        let original = self
            .state
            .lock()
            .unwrap()
            .posts
            .iter()
            .find(|p| p.id == post)
            .cloned()
            .ok_or_else(|| ClientError::Status {
                status: 404,
                body: "Post not found".into(),
            })?;
        let id = self.next_id();
        let dto = PostDto {
            id: PostId(id),
            user: Some(author(viewer.0)),
            description: quote.map(str::to_string),
            likes_count: Some(0),
            comments_count: Some(0),
            original_post: Some(Box::new(original)),
            ..PostDto::default()
        };
        self.state.lock().unwrap().posts.insert(0, dto.clone());
        Ok(dto)
    }

    async fn conversation(&self, a: UserId, b: UserId) -> Result<Vec<MessageDto>> {
        self.enter("conversation")?;
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = *self.conversation_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let result = self
            .state
            .lock()
            .unwrap()
            .messages
            .iter()
            .filter(|m| {
                (m.sender_id == a && m.receiver_id == b) || (m.sender_id == b && m.receiver_id == a)
            })
            .cloned()
            .collect();
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(result)
    }

    async fn send_message(&self, message: &NewMessage) -> Result<()> {
        self.enter("send")?;
        let id = self.next_id();
        self.state.lock().unwrap().messages.push(MessageDto {
            id: MessageId(id),
            sender_id: message.sender_id,
            receiver_id: message.receiver_id,
            content: message.content.clone(),
            timestamp: Some("2024-05-01T10:10:00".to_string()),
        });
        Ok(())
    }
}
