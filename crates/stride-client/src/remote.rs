//! HTTP client for the Stride REST backend.
//!
//! Every call is fire-once: no retry, no backoff. Transport failures, non-2xx
//! statuses and undecodable payloads each surface as their own
//! [`ClientError`] variant and the caller decides what to show.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, warn};

use stride_shared::dto::{
    ChallengeDto, CommentDto, GroupDto, LoginRequest, MessageDto, NewChallenge, NewGroup,
    NewMessage, PostDto, RegisterRequest, StoryDto, UserChallengeDto, UserDto, UserSummaryDto,
};
use stride_shared::types::{
    ChallengeId, FeedType, GroupId, PostId, StoryId, UserChallengeId, UserId,
};

use crate::api::{ImageUpload, SocialApi};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// Request payload variants the backend accepts.
#[derive(Debug)]
pub enum Body {
    Empty,
    Json(Value),
    Text(String),
    Multipart(Form),
}

/// Cloneable handle to the backend. Clones share the connection pool and the
/// bearer token.
#[derive(Clone)]
pub struct RemoteClient {
    http: reqwest::Client,
    base_url: String,
    token: Arc<RwLock<Option<String>>>,
}

impl RemoteClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            token: Arc::new(RwLock::new(None)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Replace (or clear) the bearer token attached to every request.
    pub fn set_token(&self, token: Option<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Issue one request and return the decoded body.
    ///
    /// An empty body yields `Value::Null`; a body that is not JSON (plain-text
    /// acknowledgements) yields `Value::String`.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Body,
    ) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.http.request(method.clone(), &url);
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(token) = self.token() {
            req = req.bearer_auth(token);
        }
        req = match body {
            Body::Empty => req,
            Body::Json(value) => req.json(&value),
            Body::Text(text) => req.header(CONTENT_TYPE, "text/plain").body(text),
            Body::Multipart(form) => req.multipart(form),
        };

        debug!(%method, %url, "sending request");

        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            warn!(%method, %url, status = status.as_u16(), "request failed");
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(parse_body(&text))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        decode(self.request(Method::GET, path, query, Body::Empty).await?)
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        decode_list(self.request(Method::GET, path, query, Body::Empty).await?)
    }

    // ------------------------------------------------------------------
    // Plans
    // ------------------------------------------------------------------

    pub async fn workout_plan(&self, user: UserId) -> Result<Option<String>> {
        let value = self
            .request(Method::GET, &format!("/api/workout/{user}"), &[], Body::Empty)
            .await?;
        Ok(plan_blob(value))
    }

    pub async fn save_workout_plan(&self, user: UserId, blob: &str) -> Result<()> {
        self.request(
            Method::PUT,
            &format!("/api/workout/{user}"),
            &[],
            Body::Json(Value::String(blob.to_string())),
        )
        .await?;
        Ok(())
    }

    pub async fn diet_plan(&self, user: UserId) -> Result<Option<String>> {
        let value = self
            .request(Method::GET, &format!("/api/diet/{user}"), &[], Body::Empty)
            .await?;
        Ok(plan_blob(value))
    }

    pub async fn save_diet_plan(&self, user: UserId, blob: &str) -> Result<()> {
        self.request(
            Method::PUT,
            &format!("/api/diet/{user}"),
            &[],
            Body::Json(Value::String(blob.to_string())),
        )
        .await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Challenges
    // ------------------------------------------------------------------

    pub async fn challenges(&self) -> Result<Vec<ChallengeDto>> {
        self.get_list("/api/challenges", &[]).await
    }

    pub async fn user_challenges(&self, user: UserId) -> Result<Vec<UserChallengeDto>> {
        self.get_list(&format!("/api/challenges/user/{user}"), &[]).await
    }

    pub async fn create_challenge(&self, challenge: &NewChallenge) -> Result<ChallengeDto> {
        let body = Body::Json(serde_json::to_value(challenge)?);
        decode(self.request(Method::POST, "/api/challenges", &[], body).await?)
    }

    pub async fn accept_challenge(
        &self,
        challenge: ChallengeId,
        user: UserId,
    ) -> Result<UserChallengeDto> {
        let path = format!("/api/challenges/{challenge}/accept/{user}");
        decode(self.request(Method::POST, &path, &[], Body::Empty).await?)
    }

    /// Report a check-in. The server owns the resulting status.
    pub async fn update_progress(
        &self,
        user_challenge: UserChallengeId,
        increment: f64,
    ) -> Result<UserChallengeDto> {
        let path = format!("/api/challenges/{user_challenge}/progress");
        let body = Body::Json(json!({ "increment": increment }));
        decode(self.request(Method::PUT, &path, &[], body).await?)
    }

    // ------------------------------------------------------------------
    // Groups
    // ------------------------------------------------------------------

    pub async fn groups(&self, viewer: Option<UserId>) -> Result<Vec<GroupDto>> {
        let query: Vec<(&str, String)> = viewer
            .map(|v| vec![("userId", v.to_string())])
            .unwrap_or_default();
        self.get_list("/api/groups", &query).await
    }

    pub async fn create_group(&self, group: &NewGroup) -> Result<GroupDto> {
        let body = Body::Json(serde_json::to_value(group)?);
        decode(self.request(Method::POST, "/api/groups", &[], body).await?)
    }

    pub async fn group_members(&self, group: GroupId) -> Result<Vec<UserSummaryDto>> {
        self.get_list(&format!("/api/groups/{group}/members"), &[]).await
    }

    pub async fn toggle_group_member(&self, group: GroupId, user: UserId) -> Result<GroupDto> {
        let path = format!("/api/groups/{group}/toggle-member");
        let query = [("userId", user.to_string())];
        decode(self.request(Method::POST, &path, &query, Body::Empty).await?)
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    pub async fn users(&self) -> Result<Vec<UserSummaryDto>> {
        self.get_list("/api/users", &[]).await
    }

    pub async fn user(&self, id: UserId) -> Result<UserDto> {
        self.get(&format!("/api/users/{id}"), &[]).await
    }

    pub async fn search_users(&self, query: &str) -> Result<Vec<UserSummaryDto>> {
        self.get_list("/api/users/search", &[("query", query.to_string())])
            .await
    }

    /// Toggle following `target`.
    pub async fn follow(&self, target: UserId, follower: UserId) -> Result<()> {
        let path = format!("/api/users/{target}/follow");
        let query = [("followerId", follower.to_string())];
        self.request(Method::POST, &path, &query, Body::Empty).await?;
        Ok(())
    }

    pub async fn followers(&self, user: UserId) -> Result<Vec<UserSummaryDto>> {
        self.get_list(&format!("/api/users/{user}/followers"), &[]).await
    }

    pub async fn following(&self, user: UserId) -> Result<Vec<UserSummaryDto>> {
        self.get_list(&format!("/api/users/{user}/following"), &[]).await
    }

    pub async fn upload_avatar(&self, user: UserId, image: ImageUpload) -> Result<UserDto> {
        let form = Form::new().part("file", image_part(image)?);
        let path = format!("/api/users/{user}/avatar");
        decode(self.request(Method::POST, &path, &[], Body::Multipart(form)).await?)
    }

    // ------------------------------------------------------------------
    // Stories
    // ------------------------------------------------------------------

    pub async fn stories(&self) -> Result<Vec<StoryDto>> {
        self.get_list("/api/stories", &[]).await
    }

    pub async fn create_story(&self, user: UserId, media: ImageUpload) -> Result<StoryDto> {
        let form = Form::new().part("file", image_part(media)?);
        let path = format!("/api/stories/user/{user}");
        decode(self.request(Method::POST, &path, &[], Body::Multipart(form)).await?)
    }

    pub async fn delete_story(&self, story: StoryId, user: UserId) -> Result<()> {
        let path = format!("/api/stories/{story}");
        let query = [("userId", user.to_string())];
        self.request(Method::DELETE, &path, &query, Body::Empty).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Auth
    // ------------------------------------------------------------------

    pub async fn register(&self, request: &RegisterRequest) -> Result<Value> {
        let body = Body::Json(serde_json::to_value(request)?);
        self.request(Method::POST, "/auth/register", &[], body).await
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<Value> {
        let body = Body::Json(serde_json::to_value(request)?);
        self.request(Method::POST, "/auth/login", &[], body).await
    }
}

#[async_trait]
impl SocialApi for RemoteClient {
    async fn fetch_posts(&self, feed: FeedType, viewer: Option<UserId>) -> Result<Vec<PostDto>> {
        let mut query = vec![("type", feed.as_query().to_string())];
        if let Some(viewer) = viewer {
            query.push(("userId", viewer.to_string()));
        }
        self.get_list("/api/posts", &query).await
    }

    async fn create_post(
        &self,
        author: UserId,
        content: &str,
        image: Option<ImageUpload>,
    ) -> Result<PostDto> {
        let mut form = Form::new().text("description", content.to_string());
        if let Some(image) = image {
            form = form.part("imageFile", image_part(image)?);
        }
        let path = format!("/api/posts/user/{author}");
        decode(self.request(Method::POST, &path, &[], Body::Multipart(form)).await?)
    }

    async fn like_post(&self, post: PostId, viewer: UserId) -> Result<()> {
        let path = format!("/api/posts/{post}/like");
        let query = [("userId", viewer.to_string())];
        self.request(Method::POST, &path, &query, Body::Empty).await?;
        Ok(())
    }

    async fn add_comment(&self, post: PostId, viewer: UserId, text: &str) -> Result<CommentDto> {
        let path = format!("/api/posts/{post}/comments");
        let query = [("userId", viewer.to_string())];
        let body = Body::Text(text.to_string());
        decode(self.request(Method::POST, &path, &query, body).await?)
    }

    async fn delete_post(&self, post: PostId, viewer: UserId) -> Result<()> {
        let path = format!("/api/posts/{post}");
        let query = [("userId", viewer.to_string())];
        self.request(Method::DELETE, &path, &query, Body::Empty).await?;
        Ok(())
    }

    async fn repost(&self, post: PostId, viewer: UserId, quote: Option<&str>) -> Result<PostDto> {
        let path = format!("/api/posts/{post}/repost");
        let query = [("userId", viewer.to_string())];
        let body = match quote {
            Some(q) => Body::Json(json!({ "content": q })),
            None => Body::Empty,
        };
        decode(self.request(Method::POST, &path, &query, body).await?)
    }

    async fn conversation(&self, a: UserId, b: UserId) -> Result<Vec<MessageDto>> {
        self.get_list(&format!("/api/messages/{a}/{b}"), &[]).await
    }

    async fn send_message(&self, message: &NewMessage) -> Result<()> {
        let body = Body::Json(serde_json::to_value(message)?);
        self.request(Method::POST, "/api/messages", &[], body).await?;
        Ok(())
    }
}

fn image_part(image: ImageUpload) -> Result<Part> {
    Ok(Part::bytes(image.bytes)
        .file_name(image.file_name)
        .mime_str(&image.mime)?)
}

fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| ClientError::Decode(e.to_string()))
}

/// Lists tolerate a null body.
fn decode_list<T: DeserializeOwned>(value: Value) -> Result<Vec<T>> {
    match value {
        Value::Null => Ok(Vec::new()),
        other => decode(other),
    }
}

/// Plan endpoints answer with the stored string, the decoded object, or
/// nothing at all.
fn plan_blob(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}
