pub mod api;
pub mod busy;
pub mod challenges;
pub mod chat;
pub mod config;
pub mod debounce;
pub mod error;
pub mod feed;
pub mod groups;
pub mod mapping;
pub mod people;
pub mod plans;
pub mod post_store;
pub mod presence;
pub mod remote;
pub mod session;
pub mod state;

#[cfg(test)]
mod testing;

use tracing_subscriber::{fmt, EnvFilter};

pub use api::{ImageUpload, SocialApi};
pub use chat::ChatSession;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use feed::FeedController;
pub use mapping::MediaResolver;
pub use post_store::{LikeOutcome, PostStore};
pub use presence::{PresenceAggregator, PresenceBadge};
pub use remote::RemoteClient;
pub use session::Session;
pub use state::AppState;

/// Install the global `tracing` subscriber. `RUST_LOG` overrides the default
/// filter. Calling it twice is harmless.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("stride_client=debug,stride_store=info,warn"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}
