use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Identifier wrapper for submitted applications, assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for team members, assigned by the team store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamMemberId(pub String);

impl fmt::Display for TeamMemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Terminal review outcome. An application without one is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    fn from_label(value: &str) -> Option<Self> {
        match value {
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// Position of an application in the review state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewState {
    Pending,
    Approved,
    Rejected,
}

impl ReviewState {
    pub const fn label(self) -> &'static str {
        match self {
            ReviewState::Pending => "pending",
            ReviewState::Approved => "approved",
            ReviewState::Rejected => "rejected",
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, ReviewState::Pending)
    }

    /// The stored status value representing this state.
    pub const fn as_status(self) -> Option<ApplicationStatus> {
        match self {
            ReviewState::Pending => None,
            ReviewState::Approved => Some(ApplicationStatus::Approved),
            ReviewState::Rejected => Some(ApplicationStatus::Rejected),
        }
    }
}

impl From<Option<ApplicationStatus>> for ReviewState {
    fn from(status: Option<ApplicationStatus>) -> Self {
        match status {
            None => ReviewState::Pending,
            Some(ApplicationStatus::Approved) => ReviewState::Approved,
            Some(ApplicationStatus::Rejected) => ReviewState::Rejected,
        }
    }
}

impl fmt::Display for ReviewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Submitted fields of an application before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewApplication {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
    #[serde(default)]
    pub linkedin_url: String,
    #[serde(default)]
    pub resume_url: String,
    #[serde(default)]
    pub referral_code: String,
    #[serde(default)]
    pub referral_code_used: bool,
    pub created_at: DateTime<Utc>,
}

/// A stored job application as seen by reviewers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
    #[serde(default)]
    pub linkedin_url: String,
    #[serde(default)]
    pub resume_url: String,
    #[serde(default)]
    pub referral_code: String,
    #[serde(default)]
    pub referral_code_used: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: Option<ApplicationStatus>,
    #[serde(default)]
    pub email_sent: bool,
    #[serde(default)]
    pub interview_approved: bool,
}

impl Application {
    pub fn from_submission(id: ApplicationId, submission: NewApplication) -> Self {
        let NewApplication {
            name,
            email,
            phone,
            role,
            linkedin_url,
            resume_url,
            referral_code,
            referral_code_used,
            created_at,
        } = submission;

        Self {
            id,
            name,
            email,
            phone,
            role,
            linkedin_url,
            resume_url,
            referral_code,
            referral_code_used,
            created_at,
            status: None,
            email_sent: false,
            interview_approved: false,
        }
    }

    pub fn review_state(&self) -> ReviewState {
        ReviewState::from(self.status)
    }

    pub fn is_active(&self) -> bool {
        !self.review_state().is_terminal()
    }
}

// Stored documents may carry arbitrary status strings; anything that is not a
// terminal label counts as pending.
pub(crate) fn lenient_status<'de, D>(deserializer: D) -> Result<Option<ApplicationStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(ApplicationStatus::from_label))
}

/// Team member record created from an approved application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTeamMember {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub referral_code: String,
    #[serde(default)]
    pub project_assignments: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Stored team member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: TeamMemberId,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub referral_code: String,
    #[serde(default)]
    pub project_assignments: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl TeamMember {
    pub fn from_new(id: TeamMemberId, member: NewTeamMember) -> Self {
        Self {
            id,
            name: member.name,
            phone: member.phone,
            email: member.email,
            referral_code: member.referral_code,
            project_assignments: member.project_assignments,
            role: member.role,
        }
    }
}
