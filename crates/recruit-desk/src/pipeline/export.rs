use chrono::SecondsFormat;
use serde::Serialize;

use super::domain::Application;

/// Destination that turns a list of applications into a downloadable spreadsheet.
pub trait ExportSink: Send + Sync {
    fn export(&self, applications: &[Application]) -> Result<Vec<u8>, ExportError>;
    fn content_type(&self) -> mime::Mime;
    fn file_name(&self) -> &str;
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to encode spreadsheet row: {0}")]
    Encode(#[from] csv::Error),
    #[error("failed to flush spreadsheet: {0}")]
    Flush(String),
}

/// Writes one CSV row per application and one column per field.
#[derive(Debug, Clone)]
pub struct CsvExportSink {
    file_name: String,
}

impl CsvExportSink {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }
}

impl Default for CsvExportSink {
    fn default() -> Self {
        Self::new("applications.csv")
    }
}

#[derive(Serialize)]
struct ApplicationRow<'a> {
    id: &'a str,
    name: &'a str,
    email: &'a str,
    phone: &'a str,
    role: &'a str,
    linkedin_url: &'a str,
    resume_url: &'a str,
    referral_code: &'a str,
    referral_code_used: bool,
    created_at: String,
    status: &'static str,
    email_sent: bool,
    interview_approved: bool,
}

impl<'a> From<&'a Application> for ApplicationRow<'a> {
    fn from(application: &'a Application) -> Self {
        Self {
            id: &application.id.0,
            name: &application.name,
            email: &application.email,
            phone: &application.phone,
            role: &application.role,
            linkedin_url: &application.linkedin_url,
            resume_url: &application.resume_url,
            referral_code: &application.referral_code,
            referral_code_used: application.referral_code_used,
            created_at: application
                .created_at
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            status: application.status.map(|status| status.label()).unwrap_or(""),
            email_sent: application.email_sent,
            interview_approved: application.interview_approved,
        }
    }
}

impl ExportSink for CsvExportSink {
    fn export(&self, applications: &[Application]) -> Result<Vec<u8>, ExportError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for application in applications {
            writer.serialize(ApplicationRow::from(application))?;
        }
        writer
            .into_inner()
            .map_err(|err| ExportError::Flush(err.to_string()))
    }

    fn content_type(&self) -> mime::Mime {
        mime::TEXT_CSV_UTF_8
    }

    fn file_name(&self) -> &str {
        &self.file_name
    }
}
