//! HTTP-level tests: routing, actor header handling, and the problem+json
//! error mapping, driven through the axum router with `oneshot`.

mod common;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use regex::Regex;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use common::TestContext;
use tenders::config::AppConfig;
use tenders::server::{AppState, create_app};
use tenders::workflow::Actor;

async fn setup() -> (TestContext, Router) {
    let ctx = TestContext::new().await;
    let config = AppConfig {
        profile: "test".to_string(),
        ..Default::default()
    };
    let state = AppState::new(config, ctx.db.clone()).expect("Failed to build app state");
    let app = create_app(state);
    (ctx, app)
}

fn request(method: &str, uri: &str, actor: Option<Actor>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(actor) = actor {
        builder = builder
            .header("X-Actor-Id", actor.id.to_string())
            .header("X-Actor-Role", actor.role.as_str());
    }
    match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn create_body(ctx: &TestContext) -> Value {
    json!({
        "name": "Road resurfacing, phase 2",
        "description": "Resurfacing of the northern access road",
        "budget": "250000.00",
        "deadline": common::DEADLINE,
        "company_id": ctx.company_id,
        "required_department_id": ctx.department_id,
    })
}

#[tokio::test]
async fn test_root_returns_service_info() {
    let (_ctx, app) = setup().await;

    let response = app.oneshot(request("GET", "/", None, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["service"], "tenders");
}

#[tokio::test]
async fn test_health_endpoint() {
    let (_ctx, app) = setup().await;

    let response = app
        .oneshot(request("GET", "/health", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_create_tender_returns_created_with_location() {
    let (ctx, app) = setup().await;

    let response = app
        .oneshot(request(
            "POST",
            "/api/v1/tenders",
            Some(ctx.bd),
            Some(create_body(&ctx)),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let location = response.headers().get("Location").unwrap().to_str().unwrap();
    assert!(location.starts_with("/api/v1/tenders/"));

    let body = body_json(response).await;
    assert_eq!(body["status"], "draft");
    let pattern = Regex::new(r"^BTD-\d{8}-[0-9A-F]{6}$").unwrap();
    assert!(pattern.is_match(body["reference_number"].as_str().unwrap()));
}

#[tokio::test]
async fn test_missing_actor_headers_is_unauthorized() {
    let (ctx, app) = setup().await;

    let response = app
        .oneshot(request(
            "POST",
            "/api/v1/tenders",
            None,
            Some(create_body(&ctx)),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_wrong_role_is_forbidden() {
    let (ctx, app) = setup().await;

    let response = app
        .oneshot(request(
            "POST",
            "/api/v1/tenders",
            Some(ctx.manager),
            Some(create_body(&ctx)),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = body_json(response).await;
    assert_eq!(body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_invalid_budget_is_validation_failure() {
    let (ctx, app) = setup().await;

    let mut payload = create_body(&ctx);
    payload["budget"] = json!("a lot");

    let response = app
        .oneshot(request("POST", "/api/v1/tenders", Some(ctx.bd), Some(payload)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn test_submit_without_spec_is_unprocessable() {
    let (ctx, app) = setup().await;
    let tender = ctx.create_draft().await;

    let response = app
        .oneshot(request(
            "POST",
            &format!("/api/v1/tenders/{}/submit-for-review", tender.id),
            Some(ctx.bd),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    assert_eq!(body["code"], "PRECONDITION_FAILED");
}

#[tokio::test]
async fn test_review_with_unknown_decision_is_bad_request() {
    let (ctx, app) = setup().await;
    let tender = ctx.create_draft().await;
    ctx.attach_spec(tender.id).await;
    ctx.workflow
        .submit_for_superuser_review(tender.id, ctx.bd)
        .await
        .unwrap();

    let response = app
        .oneshot(request(
            "POST",
            &format!("/api/v1/tenders/{}/review", tender.id),
            Some(ctx.superuser),
            Some(json!({ "decision": "defer" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_illegal_transition_maps_to_conflict() {
    let (ctx, app) = setup().await;
    let tender = ctx.create_draft().await;

    let response = app
        .oneshot(request(
            "POST",
            &format!("/api/v1/tenders/{}/award", tender.id),
            Some(ctx.manager),
            Some(json!({})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = body_json(response).await;
    assert_eq!(body["code"], "INVALID_TRANSITION");
    assert_eq!(body["details"]["from"], "draft");
    assert_eq!(body["details"]["to"], "awarded");
}

#[tokio::test]
async fn test_get_tender_detail_includes_timeline() {
    let (ctx, app) = setup().await;
    let tender = ctx.create_draft().await;

    let response = app
        .oneshot(request(
            "GET",
            &format!("/api/v1/tenders/{}", tender.id),
            Some(ctx.bd),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["id"], tender.id.to_string());
    assert!(body["timeline"]["submission_end"].is_string());
    assert!(body["assigned_users"].is_array());
}

#[tokio::test]
async fn test_get_tender_by_reference() {
    let (ctx, app) = setup().await;
    let tender = ctx.create_draft().await;

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/api/v1/tenders/by-reference/{}", tender.reference_number),
            Some(ctx.bd),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["id"], tender.id.to_string());

    let response = app
        .oneshot(request(
            "GET",
            "/api/v1/tenders/by-reference/BTD-20250601-000000",
            Some(ctx.bd),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_unknown_tender_is_not_found() {
    let (ctx, app) = setup().await;

    let response = app
        .oneshot(request(
            "GET",
            &format!("/api/v1/tenders/{}", Uuid::new_v4()),
            Some(ctx.bd),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_with_unknown_status_is_bad_request() {
    let (ctx, app) = setup().await;

    let response = app
        .oneshot(request(
            "GET",
            "/api/v1/tenders?status=bogus",
            Some(ctx.bd),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_filters_by_status() {
    let (ctx, app) = setup().await;
    ctx.create_draft().await;
    ctx.create_draft().await;
    ctx.create_in_progress().await;

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            "/api/v1/tenders?status=draft",
            Some(ctx.bd),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    // Unfiltered listing returns every tender regardless of status
    let response = app
        .oneshot(request("GET", "/api/v1/tenders", Some(ctx.bd), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_checklist_endpoints() {
    let (ctx, app) = setup().await;
    let tender = ctx.create_in_progress().await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/v1/tenders/{}/checklist", tender.id),
            Some(ctx.manager),
            Some(json!({
                "items": [
                    { "name": "Site survey" },
                    { "name": "Bid bond" }
                ]
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let created = body_json(response).await;
    let item_id = created[0]["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/v1/checklist-items/{item_id}/complete"),
            Some(ctx.manager),
            Some(json!({})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(request(
            "GET",
            &format!("/api/v1/tenders/{}/checklist/summary", tender.id),
            Some(ctx.manager),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let summary = body_json(response).await;
    assert_eq!(summary["completed"], 1);
    assert_eq!(summary["pending"], 1);
}

#[tokio::test]
async fn test_history_endpoints() {
    let (ctx, app) = setup().await;
    let tender = ctx.create_in_progress().await;

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/api/v1/tenders/{}/approvals", tender.id),
            Some(ctx.bd),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let approvals = body_json(response).await;
    assert_eq!(approvals.as_array().unwrap().len(), 1);
    assert_eq!(approvals[0]["status"], "approved");

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/api/v1/tenders/{}/audit-log", tender.id),
            Some(ctx.bd),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let audit = body_json(response).await;
    assert!(!audit.as_array().unwrap().is_empty());

    let response = app
        .oneshot(request(
            "GET",
            &format!("/api/v1/tenders/{}/assignments", tender.id),
            Some(ctx.bd),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let assignments = body_json(response).await;
    assert_eq!(assignments.as_array().unwrap().len(), 1);
    assert_eq!(assignments[0]["is_active"], true);
}

#[tokio::test]
async fn test_attach_document_endpoint() {
    let (ctx, app) = setup().await;
    let tender = ctx.create_draft().await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/v1/tenders/{}/documents", tender.id),
            Some(ctx.bd),
            Some(json!({
                "document_type": "spec",
                "storage_key": "tenders/ref/spec.pdf"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Unknown document types are rejected
    let response = app
        .oneshot(request(
            "POST",
            &format!("/api/v1/tenders/{}/documents", tender.id),
            Some(ctx.bd),
            Some(json!({
                "document_type": "meme",
                "storage_key": "tenders/ref/meme.png"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
