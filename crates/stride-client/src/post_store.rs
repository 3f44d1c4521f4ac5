//! In-memory feed posts with optimistic mutations.
//!
//! The store is a cloneable handle: the feed list, an open post modal and a
//! profile grid all read the same entries, so an action taken in one place is
//! visible everywhere. The list is kept newest first and is only ever grown by
//! prepending.
//!
//! Likes are applied optimistically. If the server call fails, only the like
//! state of the affected post is restored; a concurrent action on another post
//! is left untouched.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use tracing::{debug, info, warn};

use stride_shared::dto::PostDto;
use stride_shared::models::{Comment, Post};
use stride_shared::types::{PostId, UserId};

use crate::api::{ImageUpload, SocialApi};
use crate::busy::BusyFlag;
use crate::error::{ClientError, Result};
use crate::mapping::{map_comment, map_post, MediaResolver};

/// What happened to an optimistic like toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeOutcome {
    /// Server confirmed; the post now shows `liked`.
    Applied { liked: bool },
    /// Server rejected; the post was restored to its previous state.
    RolledBack,
}

struct Inner {
    api: Arc<dyn SocialApi>,
    media: MediaResolver,
    viewer: RwLock<Option<UserId>>,
    posts: Mutex<Vec<Post>>,
    posting: BusyFlag,
}

#[derive(Clone)]
pub struct PostStore {
    inner: Arc<Inner>,
}

impl PostStore {
    pub fn new(api: Arc<dyn SocialApi>, media: MediaResolver, viewer: Option<UserId>) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                media,
                viewer: RwLock::new(viewer),
                posts: Mutex::new(Vec::new()),
                posting: BusyFlag::new(),
            }),
        }
    }

    fn posts_mut(&self) -> MutexGuard<'_, Vec<Post>> {
        self.inner
            .posts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn viewer(&self) -> Option<UserId> {
        *self
            .inner
            .viewer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_viewer(&self, viewer: Option<UserId>) {
        *self
            .inner
            .viewer
            .write()
            .unwrap_or_else(PoisonError::into_inner) = viewer;
    }

    fn require_viewer(&self) -> Result<UserId> {
        self.viewer().ok_or(ClientError::NotLoggedIn)
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Snapshot of the feed, newest first.
    pub fn posts(&self) -> Vec<Post> {
        self.posts_mut().clone()
    }

    pub fn get(&self, id: PostId) -> Option<Post> {
        self.posts_mut().iter().find(|p| p.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.posts_mut().len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts_mut().is_empty()
    }

    pub fn is_posting(&self) -> bool {
        self.inner.posting.is_busy()
    }

    /// Whether the delete action should be offered for `id`. Advisory only;
    /// the server decides.
    pub fn can_delete(&self, id: PostId) -> bool {
        match (self.viewer(), self.get(id)) {
            (Some(viewer), Some(post)) => post.is_owned_by(viewer),
            _ => false,
        }
    }

    /// Convert a backend post into the view model.
    pub fn map_from_backend(&self, dto: &PostDto) -> Post {
        map_post(dto, &self.inner.media)
    }

    /// Replace the whole list with a fresh fetch.
    pub fn replace_all(&self, dtos: &[PostDto]) {
        let posts: Vec<Post> = dtos.iter().map(|d| self.map_from_backend(d)).collect();
        debug!(count = posts.len(), "replacing feed");
        *self.posts_mut() = posts;
    }

    pub fn clear(&self) {
        self.posts_mut().clear();
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Flip the viewer's like on `id` immediately, then confirm with the
    /// server. A failed call restores the previous like state of that post
    /// and is reported as [`LikeOutcome::RolledBack`], not as an error.
    pub async fn toggle_like(&self, id: PostId) -> Result<LikeOutcome> {
        let viewer = self.require_viewer()?;

        let (prev_liked, prev_likes) = {
            let mut posts = self.posts_mut();
            let post = posts
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or(ClientError::UnknownPost(id))?;
            let prev = (post.is_liked, post.likes);
            post.is_liked = !post.is_liked;
            post.likes = if post.is_liked {
                post.likes.saturating_add(1)
            } else {
                post.likes.saturating_sub(1)
            };
            prev
        };

        match self.inner.api.like_post(id, viewer).await {
            Ok(()) => {
                debug!(post = %id, liked = !prev_liked, "like confirmed");
                Ok(LikeOutcome::Applied { liked: !prev_liked })
            }
            Err(e) => {
                warn!(post = %id, error = %e, "like failed, rolling back");
                if let Some(post) = self.posts_mut().iter_mut().find(|p| p.id == id) {
                    post.is_liked = prev_liked;
                    post.likes = prev_likes;
                }
                Ok(LikeOutcome::RolledBack)
            }
        }
    }

    /// Post a comment. Blank text is a no-op (`Ok(None)`). The comment shown
    /// is the one the server returned, with its id and timestamp.
    pub async fn add_comment(&self, id: PostId, text: &str) -> Result<Option<Comment>> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        let viewer = self.require_viewer()?;
        if self.get(id).is_none() {
            return Err(ClientError::UnknownPost(id));
        }

        let dto = self.inner.api.add_comment(id, viewer, text).await?;
        let comment = map_comment(&dto, &self.inner.media);

        let mut posts = self.posts_mut();
        let post = posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(ClientError::UnknownPost(id))?;
        post.comments_list.push(comment.clone());
        post.comments = post.comments.saturating_add(1);

        info!(post = %id, comment = %comment.id, "comment added");
        Ok(Some(comment))
    }

    /// Publish a new post and put it at the top of the feed.
    pub async fn publish(&self, content: &str, image: Option<ImageUpload>) -> Result<PostId> {
        let image = image.filter(|i| !i.is_empty());
        if content.trim().is_empty() && image.is_none() {
            return Err(ClientError::Validation(
                "a post needs text or an image".to_string(),
            ));
        }
        let viewer = self.require_viewer()?;
        let _busy = self.inner.posting.acquire()?;

        let dto = self.inner.api.create_post(viewer, content, image).await?;
        let post = self.map_from_backend(&dto);
        let id = post.id;
        self.prepend(post);

        info!(post = %id, "post published");
        Ok(id)
    }

    /// Repost `id`, optionally with a quote. The new post goes to the top.
    pub async fn repost(&self, id: PostId, quote: Option<&str>) -> Result<PostId> {
        let viewer = self.require_viewer()?;
        let quote = quote.map(str::trim).filter(|q| !q.is_empty());

        let dto = self.inner.api.repost(id, viewer, quote).await?;
        let post = self.map_from_backend(&dto);
        let new_id = post.id;
        self.prepend(post);

        info!(original = %id, post = %new_id, "post reposted");
        Ok(new_id)
    }

    /// Delete `id`. The entry is removed only after the server confirms.
    pub async fn delete(&self, id: PostId) -> Result<()> {
        let viewer = self.require_viewer()?;
        self.inner.api.delete_post(id, viewer).await?;
        self.posts_mut().retain(|p| p.id != id);
        info!(post = %id, "post deleted");
        Ok(())
    }

    fn prepend(&self, post: Post) {
        let mut posts = self.posts_mut();
        // A refetch may already have delivered it.
        posts.retain(|p| p.id != post.id);
        posts.insert(0, post);
    }
}
