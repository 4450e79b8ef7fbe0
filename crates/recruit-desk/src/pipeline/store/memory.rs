use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::seed::SeedRecord;
use super::{ApplicationPatch, ApplicationStore, StoreError, TeamMemberUpdate, TeamStore};
use crate::pipeline::domain::{
    Application, ApplicationId, NewApplication, NewTeamMember, TeamMember, TeamMemberId,
};

/// In-process application collection.
///
/// Records keep insertion order, which is the store order the query engine relies on to
/// break `created_at` ties. Patches are evaluated under the write lock, so a conditional
/// status update behaves as a compare-and-set per application.
#[derive(Debug, Default)]
pub struct InMemoryApplicationStore {
    records: RwLock<Vec<Application>>,
    sequence: AtomicU64,
}

impl InMemoryApplicationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated from seed records, preserving their order.
    pub fn from_seed(records: Vec<SeedRecord>) -> Self {
        let applications: Vec<Application> = records
            .into_iter()
            .zip(1u64..)
            .map(|(record, sequence)| record.into_application(application_id(sequence)))
            .collect();

        Self {
            sequence: AtomicU64::new(applications.len() as u64),
            records: RwLock::new(applications),
        }
    }

    fn next_id(&self) -> ApplicationId {
        application_id(self.sequence.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

fn application_id(sequence: u64) -> ApplicationId {
    ApplicationId(format!("app-{sequence:06}"))
}

#[async_trait]
impl ApplicationStore for InMemoryApplicationStore {
    async fn list(&self) -> Result<Vec<Application>, StoreError> {
        Ok(self.records.read().await.clone())
    }

    async fn get(&self, id: &ApplicationId) -> Result<Option<Application>, StoreError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|record| &record.id == id).cloned())
    }

    async fn update(
        &self,
        id: &ApplicationId,
        patch: ApplicationPatch,
    ) -> Result<Application, StoreError> {
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|record| &record.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        patch.apply(record)?;
        Ok(record.clone())
    }

    async fn insert(&self, submission: NewApplication) -> Result<Application, StoreError> {
        let application = Application::from_submission(self.next_id(), submission);
        self.records.write().await.push(application.clone());
        Ok(application)
    }
}

/// In-process team collection.
#[derive(Debug, Default)]
pub struct InMemoryTeamStore {
    members: RwLock<Vec<TeamMember>>,
    sequence: AtomicU64,
}

impl InMemoryTeamStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> TeamMemberId {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        TeamMemberId(format!("team-{id:06}"))
    }
}

#[async_trait]
impl TeamStore for InMemoryTeamStore {
    async fn insert(&self, member: NewTeamMember) -> Result<TeamMember, StoreError> {
        let member = TeamMember::from_new(self.next_id(), member);
        self.members.write().await.push(member.clone());
        Ok(member)
    }

    async fn list(&self) -> Result<Vec<TeamMember>, StoreError> {
        Ok(self.members.read().await.clone())
    }

    async fn get(&self, id: &TeamMemberId) -> Result<Option<TeamMember>, StoreError> {
        let members = self.members.read().await;
        Ok(members.iter().find(|member| &member.id == id).cloned())
    }

    async fn update(
        &self,
        id: &TeamMemberId,
        update: TeamMemberUpdate,
    ) -> Result<TeamMember, StoreError> {
        let mut members = self.members.write().await;
        let member = members
            .iter_mut()
            .find(|member| &member.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        update.apply(member);
        Ok(member.clone())
    }

    async fn delete(&self, id: &TeamMemberId) -> Result<TeamMember, StoreError> {
        let mut members = self.members.write().await;
        let index = members
            .iter()
            .position(|member| &member.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(members.remove(index))
    }
}
