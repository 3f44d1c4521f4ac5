//! Community groups.

use tracing::info;

use stride_shared::dto::NewGroup;
use stride_shared::models::{Group, UserSummary};
use stride_shared::types::{GroupCategory, GroupId, UserId};

use crate::busy::BusyFlag;
use crate::error::{ClientError, Result};
use crate::mapping::{map_group, map_user_summary, MediaResolver};
use crate::remote::RemoteClient;

#[derive(Debug, Clone, Default)]
pub struct GroupDraft {
    pub name: String,
    pub description: String,
    pub category: GroupCategory,
    pub location: Option<String>,
}

pub struct GroupDirectory {
    remote: RemoteClient,
    media: MediaResolver,
    viewer: Option<UserId>,
    groups: Vec<Group>,
    submitting: BusyFlag,
}

impl GroupDirectory {
    pub fn new(remote: RemoteClient, media: MediaResolver, viewer: Option<UserId>) -> Self {
        Self {
            remote,
            media,
            viewer,
            groups: Vec::new(),
            submitting: BusyFlag::new(),
        }
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn in_category(&self, category: GroupCategory) -> Vec<&Group> {
        self.groups.iter().filter(|g| g.category == category).collect()
    }

    pub fn joined(&self) -> Vec<&Group> {
        self.groups.iter().filter(|g| g.is_member).collect()
    }

    pub async fn load(&mut self) -> Result<usize> {
        let dtos = self.remote.groups(self.viewer).await?;
        self.groups = dtos.iter().map(map_group).collect();
        Ok(self.groups.len())
    }

    pub async fn create(&mut self, draft: &GroupDraft) -> Result<GroupId> {
        let viewer = self.viewer.ok_or(ClientError::NotLoggedIn)?;
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(ClientError::Validation("group name is required".into()));
        }
        let _busy = self.submitting.acquire()?;
        let body = NewGroup {
            name: name.to_string(),
            description: draft.description.trim().to_string(),
            category: draft.category.as_str().to_string(),
            location: draft
                .location
                .as_deref()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string),
            creator_id: viewer,
        };
        let dto = self.remote.create_group(&body).await?;
        let group = map_group(&dto);
        let id = group.id;
        self.groups.insert(0, group);
        info!(group = %id, "group created");
        Ok(id)
    }

    pub async fn members(&self, group: GroupId) -> Result<Vec<UserSummary>> {
        let dtos = self.remote.group_members(group).await?;
        Ok(dtos.iter().map(|u| map_user_summary(u, &self.media)).collect())
    }

    /// Join or leave. The server's view of the group replaces ours.
    pub async fn toggle_membership(&mut self, group: GroupId) -> Result<bool> {
        let viewer = self.viewer.ok_or(ClientError::NotLoggedIn)?;
        let _busy = self.submitting.acquire()?;
        let dto = self.remote.toggle_group_member(group, viewer).await?;
        let updated = map_group(&dto);
        let member = updated.is_member;
        match self.groups.iter_mut().find(|g| g.id == group) {
            Some(existing) => *existing = updated,
            None => self.groups.push(updated),
        }
        info!(%group, member, "group membership toggled");
        Ok(member)
    }
}
