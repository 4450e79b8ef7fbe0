use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{de, Deserialize, Deserializer};

use super::domain::{Application, ApplicationId, TeamMember, TeamMemberId};
use super::query::{ActiveQueue, ApplicationQuery, SortOrder};
use super::service::ReviewPipeline;
use super::store::{ApplicationStore, TeamMemberUpdate, TeamStore};
use super::team::NewTeamMemberRequest;
use super::workflow::Approval;
use crate::error::AppError;

/// Query-string parameters for the active queue.
#[derive(Debug, Default, Deserialize)]
pub struct QueueParams {
    #[serde(default)]
    pub referral_code: Option<String>,
    #[serde(default, deserialize_with = "sort_param")]
    pub sort: Option<SortOrder>,
    #[serde(default)]
    pub search: Option<String>,
}

impl QueueParams {
    fn into_query(self, base: ApplicationQuery) -> ApplicationQuery {
        let mut query = base;
        if let Some(sort) = self.sort {
            query.sort_order = sort;
        }
        query
            .with_referral_code(self.referral_code.unwrap_or_default())
            .with_search(self.search.unwrap_or_default())
    }
}

// Same spellings the CLI and APP_DEFAULT_SORT accept; an empty value means "not given".
fn sort_param<'de, D>(deserializer: D) -> Result<Option<SortOrder>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    raw.filter(|value| !value.trim().is_empty())
        .map(|value| {
            SortOrder::parse(&value).ok_or_else(|| {
                de::Error::custom(format!("expected 'asc' or 'desc', found '{value}'"))
            })
        })
        .transpose()
}

/// Body for the flag endpoints.
#[derive(Debug, Deserialize)]
pub struct FlagRequest {
    pub value: bool,
}

/// Router exposing the review queue, workflow transitions, export, and team editing.
pub fn pipeline_router<S, T>(pipeline: Arc<ReviewPipeline<S, T>>) -> Router
where
    S: ApplicationStore + 'static,
    T: TeamStore + 'static,
{
    Router::new()
        .route("/api/v1/applications", get(queue_handler::<S, T>))
        .route("/api/v1/applications/export", get(export_handler::<S, T>))
        .route(
            "/api/v1/applications/:application_id",
            get(detail_handler::<S, T>),
        )
        .route(
            "/api/v1/applications/:application_id/email-sent",
            put(email_sent_handler::<S, T>),
        )
        .route(
            "/api/v1/applications/:application_id/interview-approved",
            put(interview_approved_handler::<S, T>),
        )
        .route(
            "/api/v1/applications/:application_id/approve",
            post(approve_handler::<S, T>),
        )
        .route(
            "/api/v1/applications/:application_id/reject",
            post(reject_handler::<S, T>),
        )
        .route(
            "/api/v1/team",
            get(team_list_handler::<S, T>).post(team_create_handler::<S, T>),
        )
        .route(
            "/api/v1/team/:member_id",
            put(team_update_handler::<S, T>).delete(team_delete_handler::<S, T>),
        )
        .with_state(pipeline)
}

pub(crate) async fn queue_handler<S, T>(
    State(pipeline): State<Arc<ReviewPipeline<S, T>>>,
    Query(params): Query<QueueParams>,
) -> Result<Json<ActiveQueue>, AppError>
where
    S: ApplicationStore + 'static,
    T: TeamStore + 'static,
{
    let query = params.into_query(pipeline.default_query());
    Ok(Json(pipeline.queries().fetch(&query).await?))
}

pub(crate) async fn export_handler<S, T>(
    State(pipeline): State<Arc<ReviewPipeline<S, T>>>,
    Query(params): Query<QueueParams>,
) -> Result<Response, AppError>
where
    S: ApplicationStore + 'static,
    T: TeamStore + 'static,
{
    let query = params.into_query(pipeline.default_query());
    let queue = pipeline.queries().fetch(&query).await?;

    let sink = pipeline.export_sink();
    let bytes = sink.export(&queue.applications)?;
    let disposition = format!("attachment; filename=\"{}\"", sink.file_name());
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, sink.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

pub(crate) async fn detail_handler<S, T>(
    State(pipeline): State<Arc<ReviewPipeline<S, T>>>,
    Path(application_id): Path<String>,
) -> Result<Json<Application>, AppError>
where
    S: ApplicationStore + 'static,
    T: TeamStore + 'static,
{
    let id = ApplicationId(application_id);
    Ok(Json(pipeline.workflow().get(&id).await?))
}

pub(crate) async fn email_sent_handler<S, T>(
    State(pipeline): State<Arc<ReviewPipeline<S, T>>>,
    Path(application_id): Path<String>,
    Json(request): Json<FlagRequest>,
) -> Result<Json<Application>, AppError>
where
    S: ApplicationStore + 'static,
    T: TeamStore + 'static,
{
    let id = ApplicationId(application_id);
    let application = pipeline.workflow().set_email_sent(&id, request.value).await?;
    Ok(Json(application))
}

pub(crate) async fn interview_approved_handler<S, T>(
    State(pipeline): State<Arc<ReviewPipeline<S, T>>>,
    Path(application_id): Path<String>,
    Json(request): Json<FlagRequest>,
) -> Result<Json<Application>, AppError>
where
    S: ApplicationStore + 'static,
    T: TeamStore + 'static,
{
    let id = ApplicationId(application_id);
    let application = pipeline
        .workflow()
        .set_interview_approved(&id, request.value)
        .await?;
    Ok(Json(application))
}

pub(crate) async fn approve_handler<S, T>(
    State(pipeline): State<Arc<ReviewPipeline<S, T>>>,
    Path(application_id): Path<String>,
) -> Result<(StatusCode, Json<Approval>), AppError>
where
    S: ApplicationStore + 'static,
    T: TeamStore + 'static,
{
    let id = ApplicationId(application_id);
    let approval = pipeline.workflow().approve(&id).await?;
    Ok((StatusCode::CREATED, Json(approval)))
}

pub(crate) async fn reject_handler<S, T>(
    State(pipeline): State<Arc<ReviewPipeline<S, T>>>,
    Path(application_id): Path<String>,
) -> Result<Json<Application>, AppError>
where
    S: ApplicationStore + 'static,
    T: TeamStore + 'static,
{
    let id = ApplicationId(application_id);
    Ok(Json(pipeline.workflow().reject(&id).await?))
}

pub(crate) async fn team_list_handler<S, T>(
    State(pipeline): State<Arc<ReviewPipeline<S, T>>>,
) -> Result<Json<Vec<TeamMember>>, AppError>
where
    S: ApplicationStore + 'static,
    T: TeamStore + 'static,
{
    Ok(Json(pipeline.team().list().await?))
}

pub(crate) async fn team_create_handler<S, T>(
    State(pipeline): State<Arc<ReviewPipeline<S, T>>>,
    Json(request): Json<NewTeamMemberRequest>,
) -> Result<(StatusCode, Json<TeamMember>), AppError>
where
    S: ApplicationStore + 'static,
    T: TeamStore + 'static,
{
    let member = pipeline.team().create(request).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

pub(crate) async fn team_update_handler<S, T>(
    State(pipeline): State<Arc<ReviewPipeline<S, T>>>,
    Path(member_id): Path<String>,
    Json(update): Json<TeamMemberUpdate>,
) -> Result<Json<TeamMember>, AppError>
where
    S: ApplicationStore + 'static,
    T: TeamStore + 'static,
{
    let id = TeamMemberId(member_id);
    Ok(Json(pipeline.team().update(&id, update).await?))
}

pub(crate) async fn team_delete_handler<S, T>(
    State(pipeline): State<Arc<ReviewPipeline<S, T>>>,
    Path(member_id): Path<String>,
) -> Result<StatusCode, AppError>
where
    S: ApplicationStore + 'static,
    T: TeamStore + 'static,
{
    let id = TeamMemberId(member_id);
    pipeline.team().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
