use std::io::Read;

use serde::Deserialize;

use crate::pipeline::domain::{
    lenient_status, Application, ApplicationId, ApplicationStatus, NewApplication,
};

/// One application document from a seed file. Review fields are optional so exports of a
/// live collection can be replayed as-is.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedRecord {
    #[serde(flatten)]
    pub submission: NewApplication,
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: Option<ApplicationStatus>,
    #[serde(default)]
    pub email_sent: bool,
    #[serde(default)]
    pub interview_approved: bool,
}

impl SeedRecord {
    pub(crate) fn into_application(self, id: ApplicationId) -> Application {
        let mut application = Application::from_submission(id, self.submission);
        application.status = self.status;
        application.email_sent = self.email_sent;
        application.interview_approved = self.interview_approved;
        application
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("unable to read seed file: {0}")]
    Io(#[from] std::io::Error),
    #[error("seed file is not a JSON array of applications: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Parse a JSON array of application documents.
pub fn load_seed<R: Read>(reader: R) -> Result<Vec<SeedRecord>, SeedError> {
    let records = serde_json::from_reader(reader)?;
    Ok(records)
}
