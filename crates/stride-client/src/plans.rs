use tracing::{debug, warn};

use stride_shared::plans::{decode_blob, encode_blob, DietPlan, WorkoutPlan};
use stride_shared::types::UserId;
use stride_store::LocalCache;

use crate::error::Result;
use crate::remote::RemoteClient;

/// Loads and saves the viewer's workout and diet plans.
///
/// A stored plan that cannot be decoded is replaced by the empty template;
/// saving mirrors the new blob onto the cached user record.
#[derive(Clone)]
pub struct PlanService {
    remote: RemoteClient,
    cache: LocalCache,
}

impl PlanService {
    pub fn new(remote: RemoteClient, cache: LocalCache) -> Self {
        Self { remote, cache }
    }

    pub async fn workout(&self, user: UserId) -> Result<WorkoutPlan> {
        let blob = self.remote.workout_plan(user).await?;
        Ok(decode_or_template(blob.as_deref(), WorkoutPlan::template, "workout"))
    }

    pub async fn diet(&self, user: UserId) -> Result<DietPlan> {
        let blob = self.remote.diet_plan(user).await?;
        Ok(decode_or_template(blob.as_deref(), DietPlan::template, "diet"))
    }

    pub async fn save_workout(&self, user: UserId, plan: &WorkoutPlan) -> Result<()> {
        let blob = encode_blob(plan)?;
        self.remote.save_workout_plan(user, &blob).await?;
        self.mirror(user, |u| u.workout_plan = Some(blob))
    }

    pub async fn save_diet(&self, user: UserId, plan: &DietPlan) -> Result<()> {
        let blob = encode_blob(plan)?;
        self.remote.save_diet_plan(user, &blob).await?;
        self.mirror(user, |u| u.diet_plan = Some(blob))
    }

    fn mirror(&self, user: UserId, apply: impl FnOnce(&mut stride_shared::models::User)) -> Result<()> {
        if let Some(mut cached) = self.cache.current_user()? {
            if cached.id == user {
                apply(&mut cached);
                self.cache.set_current_user(&cached)?;
                debug!(%user, "cached user plan updated");
            }
        }
        Ok(())
    }
}

fn decode_or_template<T: serde::de::DeserializeOwned>(
    raw: Option<&str>,
    template: fn() -> T,
    kind: &str,
) -> T {
    let Some(raw) = raw else {
        return template();
    };
    match decode_blob(raw) {
        Ok(plan) => plan,
        Err(e) => {
            warn!(kind, error = %e, "stored plan unreadable, using template");
            template()
        }
    }
}
