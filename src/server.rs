//! # Server Configuration
//!
//! This module contains the server setup and routing for the Tenders API.

use std::sync::Arc;

use axum::{
    Router,
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use crate::clock::SystemClock;
use crate::config::AppConfig;
use crate::handlers;
use crate::notify::LogNotifier;
use crate::telemetry::{self, TraceContext};
use crate::workflow::{ChecklistEngine, TenderWorkflow};

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
    pub workflow: TenderWorkflow,
    pub checklist: ChecklistEngine,
}

impl AppState {
    /// Wire the default production collaborators: system clock and log-only
    /// notifier.
    pub fn new(config: AppConfig, db: DatabaseConnection) -> Result<Self, crate::config::ConfigError> {
        let mode = config.workflow_mode()?;
        let clock = Arc::new(SystemClock);
        let notifier = Arc::new(LogNotifier);

        let workflow = TenderWorkflow::new(
            db.clone(),
            clock.clone(),
            notifier.clone(),
            mode,
            config.reference_prefix.clone(),
        );
        let checklist = ChecklistEngine::new(db.clone(), clock, notifier);

        Ok(Self {
            config: Arc::new(config),
            db,
            workflow,
            checklist,
        })
    }
}

/// Attach a trace context to every request so error responses and logs can
/// be correlated. Honors an upstream X-Request-Id when the gateway sets one.
async fn trace_context_middleware(request: Request, next: Next) -> Response {
    let trace_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    telemetry::with_trace_context(TraceContext::new(trace_id), next.run(request)).await
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route(
            "/api/v1/tenders",
            post(handlers::tenders::create_tender).get(handlers::tenders::list_tenders),
        )
        .route(
            "/api/v1/tenders/by-reference/{reference}",
            get(handlers::tenders::get_tender_by_reference),
        )
        .route("/api/v1/tenders/{id}", get(handlers::tenders::get_tender))
        .route(
            "/api/v1/tenders/{id}/submit-for-review",
            post(handlers::tenders::submit_for_review),
        )
        .route(
            "/api/v1/tenders/{id}/review",
            post(handlers::tenders::review_tender),
        )
        .route(
            "/api/v1/tenders/{id}/approve",
            post(handlers::tenders::approve_tender),
        )
        .route(
            "/api/v1/tenders/{id}/submit",
            post(handlers::tenders::submit_tender),
        )
        .route(
            "/api/v1/tenders/{id}/final-review",
            post(handlers::tenders::submit_to_final_review),
        )
        .route(
            "/api/v1/tenders/{id}/award",
            post(handlers::tenders::award_tender),
        )
        .route(
            "/api/v1/tenders/{id}/close",
            post(handlers::tenders::close_tender),
        )
        .route(
            "/api/v1/tenders/{id}/documents",
            post(handlers::documents::attach_document).get(handlers::documents::list_documents),
        )
        .route(
            "/api/v1/tenders/{id}/checklist",
            post(handlers::checklist::create_checklist).get(handlers::checklist::list_checklist),
        )
        .route(
            "/api/v1/tenders/{id}/checklist/summary",
            get(handlers::checklist::checklist_summary),
        )
        .route(
            "/api/v1/checklist-items/{id}/complete",
            post(handlers::checklist::complete_item),
        )
        .route(
            "/api/v1/checklist-items/{id}/undo",
            post(handlers::checklist::undo_item),
        )
        .route(
            "/api/v1/checklist-items/{id}/submit-review",
            post(handlers::checklist::submit_item_for_review),
        )
        .route(
            "/api/v1/checklist-items/{id}/review",
            post(handlers::checklist::review_item),
        )
        .route(
            "/api/v1/tenders/{id}/approvals",
            get(handlers::history::list_approvals),
        )
        .route(
            "/api/v1/tenders/{id}/audit-log",
            get(handlers::history::list_audit_log),
        )
        .route(
            "/api/v1/tenders/{id}/assignments",
            get(handlers::history::list_assignments),
        )
        .with_state(state)
        .layer(middleware::from_fn(trace_context_middleware))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
}

/// Starts the server with the given configuration
pub async fn run_server(
    config: AppConfig,
    db: DatabaseConnection,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config
        .bind_addr()
        .map_err(|e| format!("Invalid server address: {}", e))?;
    let profile = config.profile.clone();

    let state = AppState::new(config, db)?;
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, %profile, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::health,
        crate::handlers::tenders::create_tender,
        crate::handlers::tenders::get_tender,
        crate::handlers::tenders::get_tender_by_reference,
        crate::handlers::tenders::list_tenders,
        crate::handlers::tenders::submit_for_review,
        crate::handlers::tenders::review_tender,
        crate::handlers::tenders::approve_tender,
        crate::handlers::tenders::submit_tender,
        crate::handlers::tenders::submit_to_final_review,
        crate::handlers::tenders::award_tender,
        crate::handlers::tenders::close_tender,
        crate::handlers::documents::attach_document,
        crate::handlers::documents::list_documents,
        crate::handlers::checklist::create_checklist,
        crate::handlers::checklist::list_checklist,
        crate::handlers::checklist::checklist_summary,
        crate::handlers::checklist::complete_item,
        crate::handlers::checklist::undo_item,
        crate::handlers::checklist::submit_item_for_review,
        crate::handlers::checklist::review_item,
        crate::handlers::history::list_approvals,
        crate::handlers::history::list_audit_log,
        crate::handlers::history::list_assignments,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::handlers::HealthStatus,
            crate::error::ApiError,
            crate::handlers::tenders::CreateTenderRequestDto,
            crate::handlers::tenders::TenderDto,
            crate::handlers::tenders::TenderDetailDto,
            crate::handlers::tenders::TimelineDto,
            crate::handlers::tenders::ReviewRequestDto,
            crate::handlers::tenders::CommentsDto,
            crate::handlers::documents::AttachDocumentRequestDto,
            crate::handlers::documents::DocumentDto,
            crate::handlers::checklist::ChecklistItemRequestDto,
            crate::handlers::checklist::CreateChecklistRequestDto,
            crate::handlers::checklist::ChecklistItemDto,
            crate::handlers::checklist::ItemCommentsDto,
            crate::handlers::checklist::UndoRequestDto,
            crate::handlers::checklist::ItemReviewRequestDto,
            crate::handlers::history::ApprovalDto,
            crate::handlers::history::AuditLogDto,
            crate::handlers::history::AssignmentDto,
        )
    ),
    info(
        title = "Tenders API",
        description = "Tender lifecycle and approval workflow service",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
