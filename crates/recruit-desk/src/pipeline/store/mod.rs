//! Storage contracts for the review pipeline.
//!
//! The hosted document store is an external collaborator; these traits describe the only
//! operation shapes the pipeline issues against it. `memory` provides the in-process
//! implementation used by the service and the tests.

mod memory;
mod seed;

pub use memory::{InMemoryApplicationStore, InMemoryTeamStore};
pub use seed::{load_seed, SeedError, SeedRecord};

use async_trait::async_trait;

use super::domain::{
    Application, ApplicationId, ApplicationStatus, NewApplication, NewTeamMember, ReviewState,
    TeamMember, TeamMemberId,
};

/// Partial update for a stored application.
///
/// `expected` turns the update into a conditional write: the store applies it only while the
/// record is still in that review state, otherwise it answers `PreconditionFailed`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationPatch {
    pub status: Option<Option<ApplicationStatus>>,
    pub email_sent: Option<bool>,
    pub interview_approved: Option<bool>,
    pub expected: Option<ReviewState>,
}

impl ApplicationPatch {
    pub fn email_sent(value: bool) -> Self {
        Self {
            email_sent: Some(value),
            ..Self::default()
        }
    }

    pub fn interview_approved(value: bool) -> Self {
        Self {
            interview_approved: Some(value),
            ..Self::default()
        }
    }

    /// Conditional move of the review state from `from` to `to`.
    pub fn transition(from: ReviewState, to: ReviewState) -> Self {
        Self {
            status: Some(to.as_status()),
            expected: Some(from),
            ..Self::default()
        }
    }

    pub(crate) fn apply(&self, application: &mut Application) -> Result<(), StoreError> {
        if let Some(expected) = self.expected {
            let current = application.review_state();
            if current != expected {
                return Err(StoreError::PreconditionFailed { expected, current });
            }
        }

        if let Some(status) = self.status {
            application.status = status;
        }
        if let Some(value) = self.email_sent {
            application.email_sent = value;
        }
        if let Some(value) = self.interview_approved {
            application.interview_approved = value;
        }
        Ok(())
    }
}

/// Partial update for a team member, issued by the team-management flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
pub struct TeamMemberUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub referral_code: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub project_assignments: Option<Vec<String>>,
}

impl TeamMemberUpdate {
    pub(crate) fn apply(self, member: &mut TeamMember) {
        if let Some(name) = self.name {
            member.name = name;
        }
        if let Some(phone) = self.phone {
            member.phone = phone;
        }
        if let Some(email) = self.email {
            member.email = email;
        }
        if let Some(code) = self.referral_code {
            member.referral_code = code;
        }
        if let Some(role) = self.role {
            member.role = Some(role);
        }
        if let Some(projects) = self.project_assignments {
            member.project_assignments = projects;
        }
    }
}

/// Document collection holding submitted applications.
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Every stored application, in store order.
    async fn list(&self) -> Result<Vec<Application>, StoreError>;
    async fn get(&self, id: &ApplicationId) -> Result<Option<Application>, StoreError>;
    /// Apply a partial update and return the record as stored afterwards.
    async fn update(
        &self,
        id: &ApplicationId,
        patch: ApplicationPatch,
    ) -> Result<Application, StoreError>;
    async fn insert(&self, submission: NewApplication) -> Result<Application, StoreError>;
}

/// Document collection holding team members.
#[async_trait]
pub trait TeamStore: Send + Sync {
    async fn insert(&self, member: NewTeamMember) -> Result<TeamMember, StoreError>;
    async fn list(&self) -> Result<Vec<TeamMember>, StoreError>;
    async fn get(&self, id: &TeamMemberId) -> Result<Option<TeamMember>, StoreError>;
    async fn update(
        &self,
        id: &TeamMemberId,
        update: TeamMemberUpdate,
    ) -> Result<TeamMember, StoreError>;
    async fn delete(&self, id: &TeamMemberId) -> Result<TeamMember, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record {0} not found")]
    NotFound(String),
    #[error("conditional update expected a {expected} record but found {current}")]
    PreconditionFailed {
        expected: ReviewState,
        current: ReviewState,
    },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
