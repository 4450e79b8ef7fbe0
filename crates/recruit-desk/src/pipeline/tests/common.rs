use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::response::Response;
use chrono::{TimeZone, Utc};
use serde_json::Value;
use tokio::sync::Notify;

use crate::pipeline::domain::{
    Application, ApplicationId, NewApplication, NewTeamMember, TeamMember, TeamMemberId,
};
use crate::pipeline::service::ReviewPipeline;
use crate::pipeline::store::{
    ApplicationPatch, ApplicationStore, InMemoryApplicationStore, InMemoryTeamStore, StoreError,
    TeamMemberUpdate, TeamStore,
};

pub(super) fn applicant(name: &str, phone: &str, day: u32) -> NewApplication {
    let handle: String = name
        .split_whitespace()
        .next()
        .unwrap_or("applicant")
        .to_lowercase();
    NewApplication {
        name: name.to_string(),
        email: format!("{handle}@example.com"),
        phone: phone.to_string(),
        role: "Backend Engineer".to_string(),
        linkedin_url: format!("https://linkedin.com/in/{handle}"),
        resume_url: format!("https://files.example.com/{handle}.pdf"),
        referral_code: String::new(),
        referral_code_used: false,
        created_at: Utc.with_ymd_and_hms(2024, 9, day, 9, 0, 0).unwrap(),
    }
}

pub(super) fn ada() -> NewApplication {
    let mut submission = applicant("Ada Lovelace", "9876543210", 3);
    submission.referral_code = "ADA001".to_string();
    submission.referral_code_used = true;
    submission
}

pub(super) fn alan() -> NewApplication {
    let mut submission = applicant("Alan Turing", "5551234", 1);
    submission.role = "Cryptanalyst".to_string();
    submission
}

pub(super) fn grace() -> NewApplication {
    applicant("Grace Hopper", "5550199", 2)
}

pub(super) type MemoryPipeline = ReviewPipeline<InMemoryApplicationStore, InMemoryTeamStore>;

pub(super) fn build_pipeline() -> (
    MemoryPipeline,
    Arc<InMemoryApplicationStore>,
    Arc<InMemoryTeamStore>,
) {
    let applications = Arc::new(InMemoryApplicationStore::new());
    let team = Arc::new(InMemoryTeamStore::new());
    let pipeline = ReviewPipeline::new(applications.clone(), team.clone());
    (pipeline, applications, team)
}

/// Inserts Ada, Alan, and Grace in that order and returns their stored records.
pub(super) async fn seed(store: &InMemoryApplicationStore) -> Vec<Application> {
    let mut stored = Vec::new();
    for submission in [ada(), alan(), grace()] {
        stored.push(store.insert(submission).await.expect("seed insert"));
    }
    stored
}

fn offline() -> StoreError {
    StoreError::Unavailable("document store offline".to_string())
}

pub(super) struct UnavailableApplicationStore;

#[async_trait]
impl ApplicationStore for UnavailableApplicationStore {
    async fn list(&self) -> Result<Vec<Application>, StoreError> {
        Err(offline())
    }

    async fn get(&self, _id: &ApplicationId) -> Result<Option<Application>, StoreError> {
        Err(offline())
    }

    async fn update(
        &self,
        _id: &ApplicationId,
        _patch: ApplicationPatch,
    ) -> Result<Application, StoreError> {
        Err(offline())
    }

    async fn insert(&self, _submission: NewApplication) -> Result<Application, StoreError> {
        Err(offline())
    }
}

/// Application store whose listing and updates can be switched off mid-test, and which can
/// stop accepting updates after a fixed number of successful ones.
#[derive(Default)]
pub(super) struct FlakyApplicationStore {
    pub(super) inner: InMemoryApplicationStore,
    pub(super) fail_list: AtomicBool,
    pub(super) fail_updates: AtomicBool,
    updates_remaining: Option<AtomicUsize>,
}

impl FlakyApplicationStore {
    pub(super) fn allowing_updates(count: usize) -> Self {
        Self {
            updates_remaining: Some(AtomicUsize::new(count)),
            ..Self::default()
        }
    }

    fn update_allowed(&self) -> bool {
        if self.fail_updates.load(Ordering::SeqCst) {
            return false;
        }
        match &self.updates_remaining {
            Some(remaining) => remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
                .is_ok(),
            None => true,
        }
    }
}

#[async_trait]
impl ApplicationStore for FlakyApplicationStore {
    async fn list(&self) -> Result<Vec<Application>, StoreError> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(offline());
        }
        self.inner.list().await
    }

    async fn get(&self, id: &ApplicationId) -> Result<Option<Application>, StoreError> {
        self.inner.get(id).await
    }

    async fn update(
        &self,
        id: &ApplicationId,
        patch: ApplicationPatch,
    ) -> Result<Application, StoreError> {
        if !self.update_allowed() {
            return Err(offline());
        }
        self.inner.update(id, patch).await
    }

    async fn insert(&self, submission: NewApplication) -> Result<Application, StoreError> {
        self.inner.insert(submission).await
    }
}

/// Application store that holds every update until the test releases it.
#[derive(Default)]
pub(super) struct GatedApplicationStore {
    pub(super) inner: InMemoryApplicationStore,
    pub(super) gate: Notify,
}

#[async_trait]
impl ApplicationStore for GatedApplicationStore {
    async fn list(&self) -> Result<Vec<Application>, StoreError> {
        self.inner.list().await
    }

    async fn get(&self, id: &ApplicationId) -> Result<Option<Application>, StoreError> {
        self.inner.get(id).await
    }

    async fn update(
        &self,
        id: &ApplicationId,
        patch: ApplicationPatch,
    ) -> Result<Application, StoreError> {
        self.gate.notified().await;
        self.inner.update(id, patch).await
    }

    async fn insert(&self, submission: NewApplication) -> Result<Application, StoreError> {
        self.inner.insert(submission).await
    }
}

/// Team store that refuses every insert.
#[derive(Default)]
pub(super) struct RejectingTeamStore {
    pub(super) attempts: AtomicUsize,
}

#[async_trait]
impl TeamStore for RejectingTeamStore {
    async fn insert(&self, _member: NewTeamMember) -> Result<TeamMember, StoreError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Unavailable("team collection read only".to_string()))
    }

    async fn list(&self) -> Result<Vec<TeamMember>, StoreError> {
        Ok(Vec::new())
    }

    async fn get(&self, _id: &TeamMemberId) -> Result<Option<TeamMember>, StoreError> {
        Ok(None)
    }

    async fn update(
        &self,
        id: &TeamMemberId,
        _update: TeamMemberUpdate,
    ) -> Result<TeamMember, StoreError> {
        Err(StoreError::NotFound(id.to_string()))
    }

    async fn delete(&self, id: &TeamMemberId) -> Result<TeamMember, StoreError> {
        Err(StoreError::NotFound(id.to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
