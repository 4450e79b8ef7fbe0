use std::sync::Arc;

use tracing::info;

use super::domain::{Application, NewTeamMember, TeamMember};
use super::referral::generate_referral_code;
use super::store::{StoreError, TeamStore};

/// Snapshot an approved applicant into a team member record.
///
/// Contact fields are copied, not referenced; the referral code is freshly minted and has
/// nothing to do with the code the applicant supplied.
pub fn team_member_from(application: &Application) -> NewTeamMember {
    NewTeamMember {
        name: application.name.clone(),
        phone: application.phone.clone(),
        email: application.email.clone(),
        referral_code: generate_referral_code(&application.name, &application.phone),
        project_assignments: Vec::new(),
        role: None,
    }
}

/// Writes team members for approved applications.
pub struct TeamEnrollment<T> {
    team: Arc<T>,
}

impl<T> TeamEnrollment<T>
where
    T: TeamStore + 'static,
{
    pub fn new(team: Arc<T>) -> Self {
        Self { team }
    }

    pub async fn enroll(&self, application: &Application) -> Result<TeamMember, StoreError> {
        let member = self.team.insert(team_member_from(application)).await?;
        info!(
            application_id = %application.id,
            team_member_id = %member.id,
            referral_code = %member.referral_code,
            "team member enrolled"
        );
        Ok(member)
    }
}
