use crate::config::ConfigError;
use crate::pipeline::export::ExportError;
use crate::pipeline::query::QueryError;
use crate::pipeline::store::{SeedError, StoreError};
use crate::pipeline::team::TeamError;
use crate::pipeline::workflow::WorkflowError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Seed(SeedError),
    Store(StoreError),
    Query(QueryError),
    Workflow(WorkflowError),
    Team(TeamError),
    Export(ExportError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Seed(err) => write!(f, "seed error: {}", err),
            AppError::Store(err) => write!(f, "store error: {}", err),
            AppError::Query(err) => write!(f, "queue error: {}", err),
            AppError::Workflow(err) => write!(f, "workflow error: {}", err),
            AppError::Team(err) => write!(f, "team error: {}", err),
            AppError::Export(err) => write!(f, "export error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Seed(err) => Some(err),
            AppError::Store(err) => Some(err),
            AppError::Query(err) => Some(err),
            AppError::Workflow(err) => Some(err),
            AppError::Team(err) => Some(err),
            AppError::Export(err) => Some(err),
        }
    }
}

impl AppError {
    /// HTTP status for this error. Handlers and the service share this single mapping.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Store(err) => store_status(err),
            AppError::Query(QueryError::Fetch(source)) => store_status(source),
            AppError::Workflow(err) => match err {
                WorkflowError::NotFound(_) => StatusCode::NOT_FOUND,
                WorkflowError::InvalidStateTransition { .. } => StatusCode::CONFLICT,
                WorkflowError::Fetch(source)
                | WorkflowError::Mutation(source)
                | WorkflowError::EnrollmentFailed { source, .. } => store_status(source),
            },
            AppError::Team(err) => match err {
                TeamError::NotFound(_) => StatusCode::NOT_FOUND,
                TeamError::BlankName => StatusCode::UNPROCESSABLE_ENTITY,
                TeamError::Store(source) => store_status(source),
            },
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Seed(_)
            | AppError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn store_status(err: &StoreError) -> StatusCode {
    match err {
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::PreconditionFailed { .. } => StatusCode::CONFLICT,
        StoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<SeedError> for AppError {
    fn from(value: SeedError) -> Self {
        Self::Seed(value)
    }
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<QueryError> for AppError {
    fn from(value: QueryError) -> Self {
        Self::Query(value)
    }
}

impl From<WorkflowError> for AppError {
    fn from(value: WorkflowError) -> Self {
        Self::Workflow(value)
    }
}

impl From<TeamError> for AppError {
    fn from(value: TeamError) -> Self {
        Self::Team(value)
    }
}

impl From<ExportError> for AppError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}
