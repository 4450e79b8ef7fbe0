//! Review state machine for submitted applications.
//!
//! An application starts `Pending` and ends `Approved` or `Rejected`. Both terminal moves are
//! conditional writes against the store, so only the caller that actually moves a record
//! out of `Pending` gets to run the approval side effect. The `email_sent` and
//! `interview_approved` flags sit outside the state machine and stay writable in every state.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::domain::{Application, ApplicationId, ReviewState, TeamMember};
use super::enrollment::TeamEnrollment;
use super::store::{ApplicationPatch, ApplicationStore, StoreError, TeamStore};

/// Outcome of a successful approval.
#[derive(Debug, Clone, Serialize)]
pub struct Approval {
    pub application: Application,
    pub team_member: TeamMember,
}

/// Drives applications through review.
pub struct ApplicationWorkflow<S, T> {
    applications: Arc<S>,
    enrollment: TeamEnrollment<T>,
}

impl<S, T> ApplicationWorkflow<S, T>
where
    S: ApplicationStore + 'static,
    T: TeamStore + 'static,
{
    pub fn new(applications: Arc<S>, team: Arc<T>) -> Self {
        Self {
            applications,
            enrollment: TeamEnrollment::new(team),
        }
    }

    /// Fetch one application for detail inspection.
    pub async fn get(&self, id: &ApplicationId) -> Result<Application, WorkflowError> {
        self.applications
            .get(id)
            .await
            .map_err(WorkflowError::Fetch)?
            .ok_or_else(|| WorkflowError::NotFound(id.clone()))
    }

    pub async fn set_email_sent(
        &self,
        id: &ApplicationId,
        value: bool,
    ) -> Result<Application, WorkflowError> {
        let updated = self.patch(id, ApplicationPatch::email_sent(value)).await?;
        info!(application_id = %id, value, "email sent flag updated");
        Ok(updated)
    }

    pub async fn set_interview_approved(
        &self,
        id: &ApplicationId,
        value: bool,
    ) -> Result<Application, WorkflowError> {
        let updated = self
            .patch(id, ApplicationPatch::interview_approved(value))
            .await?;
        info!(application_id = %id, value, "interview approval flag updated");
        Ok(updated)
    }

    /// Approve a pending application and enroll the applicant in the team.
    ///
    /// The status moves first and is the sole trigger for enrollment. If the team insert
    /// fails the status is moved back to `Pending` so the reviewer can retry.
    pub async fn approve(&self, id: &ApplicationId) -> Result<Approval, WorkflowError> {
        let application = self.transition(id, ReviewState::Approved).await?;

        match self.enrollment.enroll(&application).await {
            Ok(team_member) => {
                info!(
                    application_id = %id,
                    team_member_id = %team_member.id,
                    "application approved"
                );
                Ok(Approval {
                    application,
                    team_member,
                })
            }
            Err(source) => {
                let revert =
                    ApplicationPatch::transition(ReviewState::Approved, ReviewState::Pending);
                let rollback = self.applications.update(id, revert).await.err();
                match &rollback {
                    Some(err) => warn!(
                        application_id = %id,
                        error = %source,
                        rollback_error = %err,
                        "enrollment failed and approval could not be reverted"
                    ),
                    None => warn!(
                        application_id = %id,
                        error = %source,
                        "enrollment failed; application returned to pending"
                    ),
                }
                Err(WorkflowError::EnrollmentFailed {
                    id: id.clone(),
                    source,
                    rollback,
                })
            }
        }
    }

    pub async fn reject(&self, id: &ApplicationId) -> Result<Application, WorkflowError> {
        let application = self.transition(id, ReviewState::Rejected).await?;
        info!(application_id = %id, "application rejected");
        Ok(application)
    }

    async fn transition(
        &self,
        id: &ApplicationId,
        requested: ReviewState,
    ) -> Result<Application, WorkflowError> {
        let patch = ApplicationPatch::transition(ReviewState::Pending, requested);
        self.applications
            .update(id, patch)
            .await
            .map_err(|err| match err {
                StoreError::PreconditionFailed { current, .. } => {
                    WorkflowError::InvalidStateTransition {
                        id: id.clone(),
                        current,
                        requested,
                    }
                }
                StoreError::NotFound(_) => WorkflowError::NotFound(id.clone()),
                other => WorkflowError::Mutation(other),
            })
    }

    async fn patch(
        &self,
        id: &ApplicationId,
        patch: ApplicationPatch,
    ) -> Result<Application, WorkflowError> {
        self.applications
            .update(id, patch)
            .await
            .map_err(|err| match err {
                StoreError::NotFound(_) => WorkflowError::NotFound(id.clone()),
                other => {
                    warn!(application_id = %id, error = %other, "application update failed");
                    WorkflowError::Mutation(other)
                }
            })
    }
}

/// Error raised by the review workflow.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("application {0} not found")]
    NotFound(ApplicationId),
    #[error("application {id} is already {current} and cannot become {requested}")]
    InvalidStateTransition {
        id: ApplicationId,
        current: ReviewState,
        requested: ReviewState,
    },
    #[error("unable to load application: {0}")]
    Fetch(#[source] StoreError),
    #[error("application store rejected the change: {0}")]
    Mutation(#[source] StoreError),
    #[error("team enrollment for application {id} failed: {source}")]
    EnrollmentFailed {
        id: ApplicationId,
        #[source]
        source: StoreError,
        rollback: Option<StoreError>,
    },
}

impl WorkflowError {
    /// Whether a failed approval left the application approved without a team member.
    pub fn left_partial_approval(&self) -> bool {
        matches!(
            self,
            WorkflowError::EnrollmentFailed {
                rollback: Some(_),
                ..
            }
        )
    }
}
