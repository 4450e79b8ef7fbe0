//! Reviewer-facing session state.
//!
//! A session remembers the last queue that was fetched successfully and tracks each review
//! flag as confirmed, in flight, or failed, so a caller can tell an optimistic value from a
//! persisted one. A failed refresh never clears the held queue.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::warn;

use super::domain::{Application, ApplicationId};
use super::query::{ActiveQueue, ApplicationQuery, ApplicationQueryEngine, QueryError};
use super::store::{ApplicationStore, TeamStore};
use super::workflow::{ApplicationWorkflow, Approval, WorkflowError};

/// The two operator-controlled booleans on an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewFlag {
    EmailSent,
    InterviewApproved,
}

impl ReviewFlag {
    fn read(self, application: &Application) -> bool {
        match self {
            ReviewFlag::EmailSent => application.email_sent,
            ReviewFlag::InterviewApproved => application.interview_approved,
        }
    }
}

/// Write state of a single flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FlagState {
    Persisted {
        value: bool,
    },
    PendingWrite {
        attempted: bool,
        previous: bool,
    },
    WriteFailed {
        attempted: bool,
        persisted: bool,
        reason: String,
    },
}

impl FlagState {
    /// Value to display: the optimistic one while a write is in flight, the stored one
    /// otherwise.
    pub fn effective(&self) -> bool {
        match self {
            FlagState::Persisted { value } => *value,
            FlagState::PendingWrite { attempted, .. } => *attempted,
            FlagState::WriteFailed { persisted, .. } => *persisted,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, FlagState::Persisted { .. })
    }
}

#[derive(Default)]
struct SessionState {
    queue: Option<ActiveQueue>,
    flags: HashMap<(ApplicationId, ReviewFlag), FlagState>,
}

impl SessionState {
    fn held(&self, id: &ApplicationId) -> Option<&Application> {
        self.queue
            .as_ref()
            .and_then(|queue| queue.applications.iter().find(|app| &app.id == id))
    }

    fn replace(&mut self, application: &Application) {
        if let Some(queue) = self.queue.as_mut() {
            if let Some(slot) = queue
                .applications
                .iter_mut()
                .find(|app| app.id == application.id)
            {
                *slot = application.clone();
            }
        }
    }

    fn remove(&mut self, id: &ApplicationId) {
        if let Some(queue) = self.queue.as_mut() {
            queue.applications.retain(|app| &app.id != id);
        }
        self.flags.retain(|(flag_id, _), _| flag_id != id);
    }
}

/// One reviewer's view over the pipeline.
pub struct ReviewSession<S, T> {
    engine: Arc<ApplicationQueryEngine<S>>,
    workflow: Arc<ApplicationWorkflow<S, T>>,
    state: RwLock<SessionState>,
}

impl<S, T> ReviewSession<S, T>
where
    S: ApplicationStore + 'static,
    T: TeamStore + 'static,
{
    pub fn new(
        engine: Arc<ApplicationQueryEngine<S>>,
        workflow: Arc<ApplicationWorkflow<S, T>>,
    ) -> Self {
        Self {
            engine,
            workflow,
            state: RwLock::new(SessionState::default()),
        }
    }

    /// Recompute the queue. On failure the previously held queue stays in place.
    pub async fn refresh(&self, query: &ApplicationQuery) -> Result<ActiveQueue, QueryError> {
        let queue = match self.engine.fetch(query).await {
            Ok(queue) => queue,
            Err(err) => {
                warn!(error = %err, "keeping previous queue after failed refresh");
                return Err(err);
            }
        };

        let mut state = self.state.write().await;
        state
            .flags
            .retain(|_, flag| matches!(flag, FlagState::PendingWrite { .. }));
        state.queue = Some(queue.clone());
        Ok(queue)
    }

    /// Last successfully fetched queue.
    pub async fn queue(&self) -> Option<ActiveQueue> {
        self.state.read().await.queue.clone()
    }

    pub async fn flag_state(&self, id: &ApplicationId, flag: ReviewFlag) -> Option<FlagState> {
        let state = self.state.read().await;
        if let Some(tracked) = state.flags.get(&(id.clone(), flag)) {
            return Some(tracked.clone());
        }
        state.held(id).map(|application| FlagState::Persisted {
            value: flag.read(application),
        })
    }

    pub async fn set_email_sent(
        &self,
        id: &ApplicationId,
        value: bool,
    ) -> Result<Application, WorkflowError> {
        self.set_flag(id, ReviewFlag::EmailSent, value).await
    }

    pub async fn set_interview_approved(
        &self,
        id: &ApplicationId,
        value: bool,
    ) -> Result<Application, WorkflowError> {
        self.set_flag(id, ReviewFlag::InterviewApproved, value).await
    }

    /// Write a flag, recording it as pending until the store answers.
    pub async fn set_flag(
        &self,
        id: &ApplicationId,
        flag: ReviewFlag,
        value: bool,
    ) -> Result<Application, WorkflowError> {
        let previous = match self.flag_state(id, flag).await {
            Some(current) => current.effective(),
            None => flag.read(&self.workflow.get(id).await?),
        };

        let key = (id.clone(), flag);
        self.state.write().await.flags.insert(
            key.clone(),
            FlagState::PendingWrite {
                attempted: value,
                previous,
            },
        );

        let result = match flag {
            ReviewFlag::EmailSent => self.workflow.set_email_sent(id, value).await,
            ReviewFlag::InterviewApproved => self.workflow.set_interview_approved(id, value).await,
        };

        let mut state = self.state.write().await;
        match &result {
            Ok(application) => {
                state.flags.insert(
                    key,
                    FlagState::Persisted {
                        value: flag.read(application),
                    },
                );
                state.replace(application);
            }
            Err(err) => {
                state.flags.insert(
                    key,
                    FlagState::WriteFailed {
                        attempted: value,
                        persisted: previous,
                        reason: err.to_string(),
                    },
                );
            }
        }
        result
    }

    pub async fn approve(&self, id: &ApplicationId) -> Result<Approval, WorkflowError> {
        let result = self.workflow.approve(id).await;
        self.settle_terminal(id, result.as_ref().err()).await;
        result
    }

    pub async fn reject(&self, id: &ApplicationId) -> Result<Application, WorkflowError> {
        let result = self.workflow.reject(id).await;
        self.settle_terminal(id, result.as_ref().err()).await;
        result
    }

    // Anything the store now holds as terminal leaves the held queue: a record that was
    // already finished, and an approval whose enrollment failed and could not be reverted.
    async fn settle_terminal(&self, id: &ApplicationId, error: Option<&WorkflowError>) {
        let terminal = match error {
            None | Some(WorkflowError::InvalidStateTransition { .. }) => true,
            Some(err) => err.left_partial_approval(),
        };
        if terminal {
            self.state.write().await.remove(id);
        }
    }
}
