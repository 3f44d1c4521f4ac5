//! Application state shared by every screen.
//!
//! [`AppState`] owns the handles that outlive a single view: the backend
//! client, the durable cache, the media resolver and the shared post store.
//! Per-view controllers are built from it on demand.

use std::sync::Arc;

use tracing::info;

use stride_shared::models::{User, UserSummary};
use stride_store::LocalCache;

use crate::api::SocialApi;
use crate::challenges::ChallengeBoard;
use crate::chat::ChatSession;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::feed::FeedController;
use crate::groups::GroupDirectory;
use crate::mapping::MediaResolver;
use crate::people::People;
use crate::plans::PlanService;
use crate::post_store::PostStore;
use crate::presence::PresenceAggregator;
use crate::remote::RemoteClient;
use crate::session::Session;

pub struct AppState {
    pub config: ClientConfig,

    /// Backend client. Clones share the bearer token.
    pub remote: RemoteClient,

    /// Durable key/value cache, shared with every other handle on the same
    /// database.
    pub cache: LocalCache,

    pub media: MediaResolver,

    pub session: Session,

    /// The one post list every feed view reads from.
    pub posts: PostStore,
}

impl AppState {
    /// Open the cache, build the client and restore any saved session.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let cache = match &config.cache_path {
            Some(path) => LocalCache::open_at(path)?,
            None => LocalCache::open_default()?,
        };
        Self::with_cache(config, cache)
    }

    pub fn with_cache(config: ClientConfig, cache: LocalCache) -> Result<Self> {
        let remote = RemoteClient::new(&config)?;
        let media = MediaResolver::new(&config.upload_url);
        let session = Session::new(remote.clone(), cache.clone(), media.clone());
        let viewer = session.restore()?;

        let api: Arc<dyn SocialApi> = Arc::new(remote.clone());
        let posts = PostStore::new(api, media.clone(), viewer.as_ref().map(|u| u.id));

        info!(api = %remote.base_url(), signed_in = viewer.is_some(), "client state ready");
        Ok(Self {
            config,
            remote,
            cache,
            media,
            session,
            posts,
        })
    }

    fn api(&self) -> Arc<dyn SocialApi> {
        Arc::new(self.remote.clone())
    }

    fn viewer(&self) -> Result<User> {
        self.session.current_user()?.ok_or(ClientError::NotLoggedIn)
    }

    /// Log in and point the post store at the new viewer.
    pub async fn login(&self, username: &str, password: &str) -> Result<User> {
        let user = self.session.login(username, password).await?;
        self.posts.set_viewer(Some(user.id));
        Ok(user)
    }

    pub fn logout(&self) -> Result<()> {
        self.session.logout()?;
        self.posts.set_viewer(None);
        self.posts.clear();
        Ok(())
    }

    pub fn feed(&self) -> FeedController {
        FeedController::new(self.api(), self.posts.clone())
    }

    pub async fn open_chat(&self, peer: UserSummary) -> Result<ChatSession> {
        let viewer = self.viewer()?;
        ChatSession::open(
            self.api(),
            self.cache.clone(),
            viewer.summary(),
            peer,
            self.config.chat_poll_interval,
        )
        .await
    }

    pub fn presence(&self) -> Result<PresenceAggregator> {
        Ok(PresenceAggregator::new(self.cache.clone(), self.viewer()?))
    }

    pub fn challenges(&self) -> Result<ChallengeBoard> {
        let viewer = self.viewer()?;
        Ok(ChallengeBoard::new(self.remote.clone(), self.media.clone(), viewer.id))
    }

    pub fn groups(&self) -> Result<GroupDirectory> {
        let viewer = self.session.current_user()?.map(|u| u.id);
        Ok(GroupDirectory::new(self.remote.clone(), self.media.clone(), viewer))
    }

    pub fn plans(&self) -> PlanService {
        PlanService::new(self.remote.clone(), self.cache.clone())
    }

    pub fn people(&self) -> People {
        People::new(self.remote.clone(), self.media.clone())
    }
}
