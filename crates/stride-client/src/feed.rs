//! Feed orchestration: which posts are shown, how, and what is open.
//!
//! Two independent axes drive the controller. Changing the feed type refetches
//! the whole list; changing the layout is purely presentational. The selected
//! post (grid layout only) is held by id and always read through the shared
//! [`PostStore`], so a modal and the grid never diverge.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};

use stride_shared::models::Post;
use stride_shared::types::{FeedType, Layout, PostId, UserId};

use crate::api::SocialApi;
use crate::busy::BusyFlag;
use crate::error::{ClientError, Result};
use crate::post_store::PostStore;

pub struct FeedController {
    api: Arc<dyn SocialApi>,
    store: PostStore,
    feed_type: FeedType,
    layout: Layout,
    selected: Option<PostId>,
    open_threads: HashSet<PostId>,
    loading: BusyFlag,
}

impl FeedController {
    pub fn new(api: Arc<dyn SocialApi>, store: PostStore) -> Self {
        Self {
            api,
            store,
            feed_type: FeedType::General,
            layout: Layout::List,
            selected: None,
            open_threads: HashSet::new(),
            loading: BusyFlag::new(),
        }
    }

    pub fn store(&self) -> &PostStore {
        &self.store
    }

    pub fn feed_type(&self) -> FeedType {
        self.feed_type
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_busy()
    }

    pub fn viewer(&self) -> Option<UserId> {
        self.store.viewer()
    }

    /// The following feed needs a signed-in viewer; the control is disabled
    /// otherwise.
    pub fn following_enabled(&self) -> bool {
        self.viewer().is_some()
    }

    /// Sign in or out. Signing out while on the following feed falls back
    /// to the general feed (the caller refreshes).
    pub fn set_viewer(&mut self, viewer: Option<UserId>) {
        self.store.set_viewer(viewer);
        if viewer.is_none() && self.feed_type == FeedType::Following {
            self.feed_type = FeedType::General;
        }
    }

    /// Fetch the current feed type from scratch and replace the list.
    pub async fn refresh(&self) -> Result<usize> {
        self.load(self.feed_type).await
    }

    /// Switch between the general and following feeds and refetch. The new
    /// feed type is only committed once its posts are in the store; a failed
    /// fetch leaves the controller on the old feed.
    pub async fn set_feed_type(&mut self, feed_type: FeedType) -> Result<usize> {
        if feed_type == FeedType::Following && !self.following_enabled() {
            return Err(ClientError::NotLoggedIn);
        }
        info!(from = ?self.feed_type, to = ?feed_type, "switching feed");
        let count = self.load(feed_type).await?;
        self.feed_type = feed_type;
        self.selected = None;
        self.open_threads.clear();
        Ok(count)
    }

    async fn load(&self, feed_type: FeedType) -> Result<usize> {
        let _busy = self.loading.acquire()?;
        let dtos = self.api.fetch_posts(feed_type, self.viewer()).await?;
        self.store.replace_all(&dtos);
        debug!(feed = ?feed_type, count = dtos.len(), "feed refreshed");
        Ok(dtos.len())
    }

    /// Pure presentation change; no network traffic.
    pub fn set_layout(&mut self, layout: Layout) {
        self.layout = layout;
        if layout == Layout::List {
            self.selected = None;
        }
    }

    /// Open a post in the grid modal. Returns `false` in list layout or for
    /// a post that is not in the feed.
    pub fn select_post(&mut self, id: PostId) -> bool {
        if self.layout != Layout::Grid || self.store.get(id).is_none() {
            return false;
        }
        self.selected = Some(id);
        true
    }

    pub fn close_post(&mut self) {
        self.selected = None;
    }

    /// The open post, read live from the store. A post deleted while open
    /// reads as `None`.
    pub fn selected_post(&self) -> Option<Post> {
        self.selected.and_then(|id| self.store.get(id))
    }

    /// Toggle the comment thread of a post; returns whether it is now open.
    pub fn toggle_comments(&mut self, id: PostId) -> bool {
        if self.open_threads.remove(&id) {
            false
        } else {
            self.open_threads.insert(id);
            true
        }
    }

    pub fn comments_open(&self, id: PostId) -> bool {
        self.open_threads.contains(&id)
    }
}
