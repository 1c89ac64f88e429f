//! Committee use-case service.
//!
//! # Responsibility
//! - Validate committee and member input above the repository layer.
//! - Hand out reorder sessions bound to one committee.
//!
//! # Invariants
//! - Committee and member names are trimmed and non-blank.
//! - Manual `order_index` edits must be >= 1 and must not collide with a
//!   sibling; siblings are left alone.

use crate::model::committee::{
    Committee, CommitteeId, CommitteeMember, MemberId, MemberPatch, NewMember,
};
use crate::reorder::{OrderStore, ReorderSession};
use crate::repo::committee_repo::{CommitteeRepository, RepoError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from committee service operations.
#[derive(Debug)]
pub enum CommitteeServiceError {
    /// Name is blank after trim.
    InvalidName,
    /// Manual position edit below 1.
    InvalidOrderIndex(u32),
    /// Manual position edit collides with a sibling.
    OrderIndexTaken(u32),
    CommitteeNotFound(CommitteeId),
    MemberNotFound(MemberId),
    Repo(RepoError),
}

impl Display for CommitteeServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName => write!(f, "name must not be blank"),
            Self::InvalidOrderIndex(value) => {
                write!(f, "order index must be at least 1, got {value}")
            }
            Self::OrderIndexTaken(value) => {
                write!(f, "order index {value} is already used in this committee")
            }
            Self::CommitteeNotFound(id) => write!(f, "committee not found: {id}"),
            Self::MemberNotFound(id) => write!(f, "committee member not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CommitteeServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for CommitteeServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::CommitteeNotFound(id) => Self::CommitteeNotFound(id),
            RepoError::MemberNotFound(id) => Self::MemberNotFound(id),
            RepoError::OrderIndexTaken { order_index, .. } => Self::OrderIndexTaken(order_index),
            other => Self::Repo(other),
        }
    }
}

/// Committee service facade.
pub struct CommitteeService<R: CommitteeRepository> {
    repo: R,
}

impl<R: CommitteeRepository> CommitteeService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_committee(
        &self,
        name: impl Into<String>,
    ) -> Result<Committee, CommitteeServiceError> {
        let name = normalize_name(name.into())?;
        let committee = self.repo.create_committee(&name)?;
        info!(
            "event=committee_create module=committee status=ok committee_id={}",
            committee.id
        );
        Ok(committee)
    }

    pub fn rename_committee(
        &self,
        id: CommitteeId,
        name: impl Into<String>,
    ) -> Result<Committee, CommitteeServiceError> {
        let name = normalize_name(name.into())?;
        Ok(self.repo.rename_committee(id, &name)?)
    }

    pub fn list_committees(&self) -> Result<Vec<Committee>, CommitteeServiceError> {
        Ok(self.repo.list_committees()?)
    }

    /// Appends a member at the end of the committee's order.
    pub fn add_member(
        &self,
        committee_id: CommitteeId,
        member: NewMember,
    ) -> Result<CommitteeMember, CommitteeServiceError> {
        let member = NewMember {
            name: normalize_name(member.name)?,
            role: member.role.trim().to_string(),
            image_url: normalize_optional(member.image_url),
        };
        let created = self.repo.create_member(committee_id, &member)?;
        info!(
            "event=member_create module=committee status=ok committee_id={} member_id={} order_index={}",
            committee_id, created.id, created.order_index
        );
        Ok(created)
    }

    /// Applies a partial update. An empty patch returns the stored member.
    pub fn update_member(
        &self,
        id: MemberId,
        patch: MemberPatch,
    ) -> Result<CommitteeMember, CommitteeServiceError> {
        if patch.is_empty() {
            return self
                .repo
                .get_member(id)?
                .ok_or(CommitteeServiceError::MemberNotFound(id));
        }
        if let Some(order_index) = patch.order_index {
            if order_index == 0 {
                return Err(CommitteeServiceError::InvalidOrderIndex(order_index));
            }
        }

        let patch = MemberPatch {
            name: patch.name.map(normalize_name).transpose()?,
            role: patch.role.map(|role| role.trim().to_string()),
            image_url: patch.image_url.map(normalize_optional),
            order_index: patch.order_index,
        };
        Ok(self.repo.update_member(id, &patch)?)
    }

    /// Deletes one member. Remaining members keep their order indexes.
    pub fn delete_member(&self, id: MemberId) -> Result<(), CommitteeServiceError> {
        self.repo.delete_member(id)?;
        info!("event=member_delete module=committee status=ok member_id={id}");
        Ok(())
    }

    /// Members in display order.
    pub fn list_members(
        &self,
        committee_id: CommitteeId,
    ) -> Result<Vec<CommitteeMember>, CommitteeServiceError> {
        Ok(self.repo.list_members(committee_id)?)
    }
}

impl<R> CommitteeService<R>
where
    R: CommitteeRepository
        + OrderStore<Item = CommitteeMember, ParentId = CommitteeId, Error = RepoError>,
{
    /// Starts a drag-and-drop reorder session for one committee.
    pub fn reorder_session(
        &self,
        committee_id: CommitteeId,
    ) -> Result<ReorderSession<&R>, CommitteeServiceError> {
        Ok(ReorderSession::load(&self.repo, committee_id)?)
    }
}

fn normalize_name(value: String) -> Result<String, CommitteeServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CommitteeServiceError::InvalidName);
    }
    Ok(trimmed.to_string())
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
