use super::common::*;
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{header, Request, StatusCode};
use axum::response::IntoResponse;
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::pipeline::domain::Application;
use crate::pipeline::query::SortOrder;
use crate::pipeline::router::{self, pipeline_router, QueueParams};
use crate::pipeline::service::ReviewPipeline;
use crate::pipeline::store::{InMemoryApplicationStore, InMemoryTeamStore, TeamStore};

fn names(payload: &Value) -> Vec<String> {
    payload["applications"]
        .as_array()
        .expect("applications array")
        .iter()
        .filter_map(|application| application["name"].as_str().map(str::to_string))
        .collect()
}

async fn seeded_router() -> (
    Router,
    Vec<Application>,
    Arc<InMemoryTeamStore>,
) {
    let (pipeline, applications, team) = build_pipeline();
    let stored = seed(&applications).await;
    (pipeline_router(Arc::new(pipeline)), stored, team)
}

async fn send(router: Router, request: Request<Body>) -> axum::response::Response {
    router.oneshot(request).await.expect("route executes")
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str) -> Request<Body> {
    Request::post(uri).body(Body::empty()).unwrap()
}

fn put_json(uri: &str, payload: Value) -> Request<Body> {
    Request::put(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&payload).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn queue_route_defaults_to_newest_first() {
    let (router, _, _) = seeded_router().await;

    let response = send(router, get("/api/v1/applications")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(
        names(&payload),
        ["Ada Lovelace", "Grace Hopper", "Alan Turing"]
    );
    assert_eq!(payload["query"]["sort_order"], "desc");
}

#[tokio::test]
async fn queue_route_applies_sort_search_and_referral_filter() {
    let (router, _, _) = seeded_router().await;

    let ascending = send(router.clone(), get("/api/v1/applications?sort=asc")).await;
    assert_eq!(
        names(&read_json_body(ascending).await),
        ["Alan Turing", "Grace Hopper", "Ada Lovelace"]
    );

    let searched = send(router.clone(), get("/api/v1/applications?search=CRYPT")).await;
    assert_eq!(names(&read_json_body(searched).await), ["Alan Turing"]);

    let referred = send(router.clone(), get("/api/v1/applications?referral_code=ADA")).await;
    assert_eq!(names(&read_json_body(referred).await), ["Ada Lovelace"]);

    // The referral filter is case-sensitive.
    let lowercase = send(router, get("/api/v1/applications?referral_code=ada")).await;
    assert!(names(&read_json_body(lowercase).await).is_empty());
}

#[tokio::test]
async fn approve_route_creates_member_then_conflicts() {
    let (router, stored, team) = seeded_router().await;
    let uri = format!("/api/v1/applications/{}/approve", stored[0].id);

    let response = send(router.clone(), post(&uri)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["application"]["status"], "approved");
    assert_eq!(payload["team_member"]["referral_code"], "ADA210");
    assert_eq!(payload["team_member"]["project_assignments"], json!([]));

    let again = send(router.clone(), post(&uri)).await;
    assert_eq!(again.status(), StatusCode::CONFLICT);
    let error = read_json_body(again).await;
    assert!(error["error"]
        .as_str()
        .is_some_and(|message| message.contains("already approved")));

    let queue = send(router, get("/api/v1/applications")).await;
    assert_eq!(
        names(&read_json_body(queue).await),
        ["Grace Hopper", "Alan Turing"]
    );
    assert_eq!(team.list().await.expect("list").len(), 1);
}

#[tokio::test]
async fn reject_route_marks_the_record() {
    let (router, stored, team) = seeded_router().await;
    let uri = format!("/api/v1/applications/{}/reject", stored[1].id);

    let response = send(router.clone(), post(&uri)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json_body(response).await["status"], "rejected");
    assert!(team.list().await.expect("list").is_empty());

    let approve = format!("/api/v1/applications/{}/approve", stored[1].id);
    assert_eq!(
        send(router, post(&approve)).await.status(),
        StatusCode::CONFLICT
    );
}

#[tokio::test]
async fn flag_routes_update_independent_booleans() {
    let (router, stored, _) = seeded_router().await;
    let id = &stored[2].id;

    let response = send(
        router.clone(),
        put_json(
            &format!("/api/v1/applications/{id}/email-sent"),
            json!({ "value": true }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["email_sent"], true);
    assert_eq!(payload["interview_approved"], false);

    let response = send(
        router.clone(),
        put_json(
            &format!("/api/v1/applications/{id}/interview-approved"),
            json!({ "value": true }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let detail = send(router, get(&format!("/api/v1/applications/{id}"))).await;
    let payload = read_json_body(detail).await;
    assert_eq!(payload["email_sent"], true);
    assert_eq!(payload["interview_approved"], true);
    assert_eq!(payload["status"], Value::Null);
}

#[tokio::test]
async fn detail_route_reports_unknown_ids() {
    let (router, _, _) = seeded_router().await;

    let response = send(router, get("/api/v1/applications/app-424242")).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn export_route_streams_the_filtered_queue_as_csv() {
    let (router, _, _) = seeded_router().await;

    let response = send(router, get("/api/v1/applications/export?sort=asc")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        mime::TEXT_CSV_UTF_8.as_ref()
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"applications.csv\""
    );

    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    let text = String::from_utf8(body.to_vec()).expect("utf-8 csv");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("id,name,email,phone,role"));
    assert!(lines[1].contains("Alan Turing"));
    assert!(lines[3].contains("Ada Lovelace"));
    assert!(lines[3].contains("2024-09-03T09:00:00Z"));
}

#[tokio::test]
async fn store_outages_map_to_service_unavailable() {
    let pipeline = ReviewPipeline::new(
        Arc::new(UnavailableApplicationStore),
        Arc::new(InMemoryTeamStore::new()),
    );
    let router = pipeline_router(Arc::new(pipeline));

    let queue = send(router.clone(), get("/api/v1/applications")).await;
    assert_eq!(queue.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(read_json_body(queue).await["error"].is_string());

    let reject = send(router, post("/api/v1/applications/app-000001/reject")).await;
    assert_eq!(reject.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn failed_enrollment_maps_to_service_unavailable() {
    let applications = Arc::new(InMemoryApplicationStore::new());
    let stored = seed(&applications).await;
    let service = Arc::new(ReviewPipeline::new(
        applications,
        Arc::new(RejectingTeamStore::default()),
    ));

    let response = router::approve_handler::<InMemoryApplicationStore, RejectingTeamStore>(
        State(service),
        Path(stored[0].id.0.clone()),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .is_some_and(|message| message.contains("team enrollment")));
}

#[tokio::test]
async fn queue_handler_honours_configured_default_sort() {
    let (pipeline, applications, _) = build_pipeline();
    seed(&applications).await;
    let pipeline = Arc::new(pipeline.with_default_sort(SortOrder::Ascending));

    let response = router::queue_handler::<InMemoryApplicationStore, InMemoryTeamStore>(
        State(pipeline),
        Query(QueueParams::default()),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        names(&read_json_body(response).await),
        ["Alan Turing", "Grace Hopper", "Ada Lovelace"]
    );
}

#[tokio::test]
async fn team_routes_edit_and_remove_enrolled_members() {
    let (router, stored, team) = seeded_router().await;
    let approve = format!("/api/v1/applications/{}/approve", stored[1].id);
    let approval = read_json_body(send(router.clone(), post(&approve)).await).await;
    let member_id = approval["team_member"]["id"]
        .as_str()
        .expect("member id")
        .to_string();

    let listed = read_json_body(send(router.clone(), get("/api/v1/team")).await).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));

    let updated = send(
        router.clone(),
        put_json(
            &format!("/api/v1/team/{member_id}"),
            json!({ "role": "Cryptanalyst", "project_assignments": ["enigma"] }),
        ),
    )
    .await;
    assert_eq!(updated.status(), StatusCode::OK);
    let payload = read_json_body(updated).await;
    assert_eq!(payload["role"], "Cryptanalyst");
    assert_eq!(payload["project_assignments"], json!(["enigma"]));

    let blank = send(
        router.clone(),
        put_json(&format!("/api/v1/team/{member_id}"), json!({ "name": " " })),
    )
    .await;
    assert_eq!(blank.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let delete = Request::delete(format!("/api/v1/team/{member_id}"))
        .body(Body::empty())
        .unwrap();
    assert_eq!(
        send(router.clone(), delete).await.status(),
        StatusCode::NO_CONTENT
    );
    assert!(team.list().await.expect("list").is_empty());

    let again = Request::delete(format!("/api/v1/team/{member_id}"))
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(router, again).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn team_route_adds_members_by_hand() {
    let (router, _, team) = seeded_router().await;

    let request = Request::post("/api/v1/team")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::to_vec(&json!({
                "name": "Katherine Johnson",
                "phone": "5550142",
                "email": "katherine@example.com",
            }))
            .unwrap(),
        ))
        .unwrap();
    let response = send(router.clone(), request).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["referral_code"], "KAT142");
    assert_eq!(payload["project_assignments"], json!([]));
    assert_eq!(team.list().await.expect("list").len(), 1);

    let blank = Request::post("/api/v1/team")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::to_vec(&json!({ "name": "", "phone": "1", "email": "x@example.com" }))
                .unwrap(),
        ))
        .unwrap();
    assert_eq!(
        send(router, blank).await.status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[tokio::test]
async fn queue_route_accepts_mixed_case_sort_values() {
    let (router, _, _) = seeded_router().await;

    let response = send(router, get("/api/v1/applications?sort=ASC")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        names(&read_json_body(response).await),
        ["Alan Turing", "Grace Hopper", "Ada Lovelace"]
    );
}

#[tokio::test]
async fn flag_route_reports_unknown_ids_as_not_found() {
    let (router, _, _) = seeded_router().await;

    let response = send(
        router,
        put_json(
            "/api/v1/applications/app-424242/email-sent",
            json!({ "value": true }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
