//! Challenge catalogue and the viewer's participations.
//!
//! Completion is decided by the backend. The board only reports increments
//! and applies whatever status and progress come back.

use tracing::{info, warn};

use stride_shared::dto::NewChallenge;
use stride_shared::models::{Challenge, UserChallenge};
use stride_shared::types::{ChallengeId, ChallengeStatus, UserChallengeId, UserId};

use crate::busy::BusyFlag;
use crate::error::{ClientError, Result};
use crate::mapping::{map_challenge, map_user_challenge, MediaResolver};
use crate::remote::RemoteClient;

/// Form input for a new challenge.
#[derive(Debug, Clone, Default)]
pub struct ChallengeDraft {
    pub title: String,
    pub description: String,
    pub category: String,
    pub duration_days: u32,
    pub target: u32,
    pub reward: String,
}

impl ChallengeDraft {
    fn validate(&self) -> Result<NewChallenge> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ClientError::Validation("challenge title is required".into()));
        }
        if self.target == 0 {
            return Err(ClientError::Validation(
                "challenge target must be positive".into(),
            ));
        }
        let category = match self.category.trim() {
            "" => "general".to_string(),
            c => c.to_string(),
        };
        Ok(NewChallenge {
            title: title.to_string(),
            description: self.description.trim().to_string(),
            category,
            duration: format!("{} days", self.duration_days.max(1)),
            total_target: self.target,
            reward: self.reward.trim().to_string(),
        })
    }
}

pub struct ChallengeBoard {
    remote: RemoteClient,
    media: MediaResolver,
    viewer: UserId,
    catalogue: Vec<Challenge>,
    joined: Vec<UserChallenge>,
    submitting: BusyFlag,
}

impl ChallengeBoard {
    pub fn new(remote: RemoteClient, media: MediaResolver, viewer: UserId) -> Self {
        Self {
            remote,
            media,
            viewer,
            catalogue: Vec::new(),
            joined: Vec::new(),
            submitting: BusyFlag::new(),
        }
    }

    pub fn catalogue(&self) -> &[Challenge] {
        &self.catalogue
    }

    pub fn joined(&self) -> &[UserChallenge] {
        &self.joined
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.is_busy()
    }

    /// Challenges the viewer has not joined yet.
    pub fn available(&self) -> Vec<&Challenge> {
        self.catalogue
            .iter()
            .filter(|c| !self.joined.iter().any(|uc| uc.challenge.id == c.id))
            .collect()
    }

    pub fn with_status(&self, status: ChallengeStatus) -> Vec<&UserChallenge> {
        self.joined.iter().filter(|uc| uc.status == status).collect()
    }

    /// Reload the catalogue and the viewer's participations.
    pub async fn load(&mut self) -> Result<()> {
        let all = self.remote.challenges().await?;
        let mine = self.remote.user_challenges(self.viewer).await?;
        self.catalogue = all.iter().map(|c| map_challenge(c, &self.media)).collect();
        self.joined = mine
            .iter()
            .map(|uc| map_user_challenge(uc, &self.media))
            .collect();
        Ok(())
    }

    pub async fn create(&mut self, draft: &ChallengeDraft) -> Result<ChallengeId> {
        let body = draft.validate()?;
        let _busy = self.submitting.acquire()?;
        let dto = self.remote.create_challenge(&body).await?;
        let challenge = map_challenge(&dto, &self.media);
        let id = challenge.id;
        self.catalogue.insert(0, challenge);
        info!(challenge = %id, "challenge created");
        Ok(id)
    }

    pub async fn accept(&mut self, challenge: ChallengeId) -> Result<UserChallengeId> {
        if self.joined.iter().any(|uc| uc.challenge.id == challenge) {
            return Err(ClientError::Validation("challenge already joined".into()));
        }
        let _busy = self.submitting.acquire()?;
        let dto = self.remote.accept_challenge(challenge, self.viewer).await?;
        let joined = map_user_challenge(&dto, &self.media);
        let id = joined.id;
        if let Some(c) = self.catalogue.iter_mut().find(|c| c.id == challenge) {
            c.participants = c.participants.saturating_add(1);
        }
        self.joined.insert(0, joined);
        info!(%challenge, user_challenge = %id, "challenge accepted");
        Ok(id)
    }

    /// Report progress on a joined challenge and apply the server's answer.
    pub async fn check_in(&mut self, id: UserChallengeId, increment: f64) -> Result<&UserChallenge> {
        if !increment.is_finite() || increment <= 0.0 {
            return Err(ClientError::Validation("increment must be positive".into()));
        }
        let index = self
            .joined
            .iter()
            .position(|uc| uc.id == id)
            .ok_or_else(|| ClientError::Validation(format!("not a joined challenge: {id}")))?;
        let _busy = self.submitting.acquire()?;
        let dto = self.remote.update_progress(id, increment).await?;
        let updated = map_user_challenge(&dto, &self.media);
        if updated.progress > updated.challenge.target && updated.status == ChallengeStatus::Active {
            warn!(user_challenge = %id, "progress past target but still active");
        }
        self.joined[index] = updated;
        Ok(&self.joined[index])
    }
}
