//! One open conversation with another user.
//!
//! History is polled on a fixed interval. Each poll is awaited inside the
//! poller task before the next tick is taken, so at most one conversation
//! request is outstanding per session, and ticks missed while a slow request
//! was running are skipped rather than replayed.
//!
//! Sent messages appear immediately as local echoes ([`MessageKey::Local`]).
//! A poll replaces the list with the server history; an echo survives only
//! until a server message from the same sender with the same content confirms
//! it. Candidates are the server messages the session had not seen when the
//! send started, so a poll that lands while the send request is still in
//! flight can still confirm the echo afterwards.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use stride_shared::dto::NewMessage;
use stride_shared::models::{ChatMessage, InboxChat, MessageKey, UserSummary};
use stride_shared::types::UserId;
use stride_store::LocalCache;

use crate::api::SocialApi;
use crate::busy::BusyFlag;
use crate::error::{ClientError, Result};
use crate::mapping::map_message;

pub struct ChatSession {
    api: Arc<dyn SocialApi>,
    cache: LocalCache,
    viewer: UserSummary,
    peer: UserSummary,
    state: Arc<watch::Sender<Vec<ChatMessage>>>,
    echoes: Arc<Mutex<EchoLedger>>,
    sending: BusyFlag,
    poller: Option<JoinHandle<()>>,
}

/// Bookkeeping for unconfirmed echoes.
#[derive(Debug, Default)]
struct EchoLedger {
    /// Server keys already on screen when each echo's send started.
    baselines: HashMap<Uuid, HashSet<MessageKey>>,
    /// Server messages that already confirmed an echo.
    claimed: HashSet<MessageKey>,
}

impl ChatSession {
    /// Load the history once, then start polling every `interval`.
    ///
    /// A failed initial load is logged and leaves the conversation empty;
    /// the poller keeps trying.
    pub async fn open(
        api: Arc<dyn SocialApi>,
        cache: LocalCache,
        viewer: UserSummary,
        peer: UserSummary,
        interval: Duration,
    ) -> Result<Self> {
        if viewer.id == peer.id {
            return Err(ClientError::SelfChat);
        }

        let (tx, _) = watch::channel(Vec::new());
        let state = Arc::new(tx);
        let echoes = Arc::new(Mutex::new(EchoLedger::default()));

        if let Err(e) = poll_once(api.as_ref(), viewer.id, peer.id, &state, &echoes).await {
            warn!(peer = %peer.id, error = %e, "initial history load failed");
        }

        let poller = tokio::spawn(poll_loop(
            api.clone(),
            viewer.id,
            peer.id,
            state.clone(),
            echoes.clone(),
            interval,
        ));
        info!(viewer = %viewer.id, peer = %peer.id, ?interval, "chat opened");

        Ok(Self {
            api,
            cache,
            viewer,
            peer,
            state,
            echoes,
            sending: BusyFlag::new(),
            poller: Some(poller),
        })
    }

    pub fn peer(&self) -> &UserSummary {
        &self.peer
    }

    /// Snapshot of the conversation, oldest first.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.state.borrow().clone()
    }

    /// Receiver that is notified after every poll and every send.
    pub fn subscribe(&self) -> watch::Receiver<Vec<ChatMessage>> {
        self.state.subscribe()
    }

    pub fn is_sending(&self) -> bool {
        self.sending.is_busy()
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Poll now, outside the schedule.
    pub async fn refresh(&self) -> Result<usize> {
        poll_once(
            self.api.as_ref(),
            self.viewer.id,
            self.peer.id,
            &self.state,
            &self.echoes,
        )
        .await
    }

    /// Send `text`. Blank input is ignored and returns `Ok(None)`.
    ///
    /// The echo is appended only after the backend accepted the message; the
    /// inbox summary for this peer then moves to the front of the list.
    pub async fn send(&self, text: &str) -> Result<Option<ChatMessage>> {
        let content = text.trim();
        if content.is_empty() {
            return Ok(None);
        }
        let _busy = self.sending.acquire()?;
        let baseline = self.seen_server_keys();

        let outgoing = NewMessage {
            sender_id: self.viewer.id,
            receiver_id: self.peer.id,
            content: content.to_string(),
        };
        self.api.send_message(&outgoing).await?;

        let echo = self.push_echo(outgoing.content, baseline);

        let summary = InboxChat {
            user_id: self.peer.id,
            username: self.peer.username.clone(),
            avatar: self.peer.avatar.clone(),
            last_message: echo.content.clone(),
            timestamp: echo.sent_at,
        };
        if let Err(e) = self.cache.upsert_inbox_chat(self.viewer.id, summary) {
            warn!(peer = %self.peer.id, error = %e, "failed to update inbox summary");
        }

        debug!(peer = %self.peer.id, "message sent");
        Ok(Some(echo))
    }

    fn seen_server_keys(&self) -> HashSet<MessageKey> {
        server_keys(&self.state.borrow())
    }

    fn push_echo(&self, content: String, baseline: HashSet<MessageKey>) -> ChatMessage {
        let id = Uuid::new_v4();
        let echo = ChatMessage {
            key: MessageKey::Local(id),
            sender_id: self.viewer.id,
            receiver_id: self.peer.id,
            content,
            sent_at: Utc::now(),
        };
        self.state.send_modify(|list| {
            lock_ledger(&self.echoes).baselines.insert(id, baseline);
            list.push(echo.clone());
        });
        echo
    }

    /// Stop polling. Idempotent.
    pub fn close(&mut self) {
        if let Some(handle) = self.poller.take() {
            handle.abort();
            info!(peer = %self.peer.id, "chat closed");
        }
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.close();
    }
}

async fn poll_loop(
    api: Arc<dyn SocialApi>,
    viewer: UserId,
    peer: UserId,
    state: Arc<watch::Sender<Vec<ChatMessage>>>,
    echoes: Arc<Mutex<EchoLedger>>,
    period: Duration,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        if let Err(e) = poll_once(api.as_ref(), viewer, peer, &state, &echoes).await {
            warn!(%peer, error = %e, "chat poll failed");
        }
    }
}

async fn poll_once(
    api: &dyn SocialApi,
    viewer: UserId,
    peer: UserId,
    state: &watch::Sender<Vec<ChatMessage>>,
    echoes: &Mutex<EchoLedger>,
) -> Result<usize> {
    let history: Vec<ChatMessage> = api
        .conversation(viewer, peer)
        .await?
        .iter()
        .map(map_message)
        .collect();
    let count = history.len();
    state.send_modify(|current| {
        let merged = reconcile(current, history, &mut lock_ledger(echoes));
        *current = merged;
    });
    Ok(count)
}

fn lock_ledger(echoes: &Mutex<EchoLedger>) -> MutexGuard<'_, EchoLedger> {
    echoes.lock().unwrap_or_else(PoisonError::into_inner)
}

fn server_keys(messages: &[ChatMessage]) -> HashSet<MessageKey> {
    messages
        .iter()
        .filter(|m| !m.is_pending())
        .map(|m| m.key)
        .collect()
}

/// Server history plus the echoes it does not yet confirm.
///
/// An echo is confirmed by a server message with the same sender and content
/// that is outside the echo's baseline and has not confirmed another echo.
/// Repeating an earlier message therefore never hides the new copy.
fn reconcile(
    current: &[ChatMessage],
    server: Vec<ChatMessage>,
    ledger: &mut EchoLedger,
) -> Vec<ChatMessage> {
    let mut unconfirmed = Vec::new();
    for echo in current.iter().filter(|m| m.is_pending()) {
        let MessageKey::Local(id) = echo.key else {
            continue;
        };
        let fallback;
        let baseline = match ledger.baselines.get(&id) {
            Some(b) => b,
            None => {
                fallback = server_keys(current);
                &fallback
            }
        };
        let hit = server.iter().find(|m| {
            !baseline.contains(&m.key)
                && !ledger.claimed.contains(&m.key)
                && m.sender_id == echo.sender_id
                && m.content == echo.content
        });
        match hit {
            Some(m) => {
                let key = m.key;
                ledger.claimed.insert(key);
                ledger.baselines.remove(&id);
            }
            None => unconfirmed.push(echo.clone()),
        }
    }

    let mut merged = server;
    merged.extend(unconfirmed);
    merged
}
