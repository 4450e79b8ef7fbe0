use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use super::domain::{NewTeamMember, TeamMember, TeamMemberId};
use super::referral::generate_referral_code;
use super::store::{StoreError, TeamMemberUpdate, TeamStore};

/// Contact details for a team member added by hand rather than through approval.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewTeamMemberRequest {
    pub name: String,
    pub phone: String,
    pub email: String,
}

/// Editing flow for team members, whether enrolled on approval or added directly.
pub struct TeamService<T> {
    team: Arc<T>,
}

impl<T> TeamService<T>
where
    T: TeamStore + 'static,
{
    pub fn new(team: Arc<T>) -> Self {
        Self { team }
    }

    pub async fn list(&self) -> Result<Vec<TeamMember>, TeamError> {
        Ok(self.team.list().await?)
    }

    /// Add a member directly. The referral code is minted the same way enrollment does.
    pub async fn create(&self, request: NewTeamMemberRequest) -> Result<TeamMember, TeamError> {
        if request.name.trim().is_empty() {
            return Err(TeamError::BlankName);
        }

        let NewTeamMemberRequest { name, phone, email } = request;
        let member = self
            .team
            .insert(NewTeamMember {
                referral_code: generate_referral_code(&name, &phone),
                name,
                phone,
                email,
                project_assignments: Vec::new(),
                role: None,
            })
            .await?;
        info!(
            team_member_id = %member.id,
            referral_code = %member.referral_code,
            "team member added"
        );
        Ok(member)
    }

    pub async fn update(
        &self,
        id: &TeamMemberId,
        update: TeamMemberUpdate,
    ) -> Result<TeamMember, TeamError> {
        if update.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(TeamError::BlankName);
        }

        let member = self.team.update(id, update).await.map_err(|err| match err {
            StoreError::NotFound(_) => TeamError::NotFound(id.clone()),
            other => TeamError::Store(other),
        })?;
        info!(team_member_id = %id, "team member updated");
        Ok(member)
    }

    pub async fn delete(&self, id: &TeamMemberId) -> Result<TeamMember, TeamError> {
        let member = self.team.delete(id).await.map_err(|err| match err {
            StoreError::NotFound(_) => TeamError::NotFound(id.clone()),
            other => TeamError::Store(other),
        })?;
        info!(team_member_id = %id, "team member removed");
        Ok(member)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TeamError {
    #[error("team member {0} not found")]
    NotFound(TeamMemberId),
    #[error("team member name cannot be blank")]
    BlankName,
    #[error(transparent)]
    Store(#[from] StoreError),
}
