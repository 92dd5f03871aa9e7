// Academy Enrollment - Web Server
// REST API consumed by the enrollment single-page site

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use academy_enrollment::{
    logging, quote_for, Catalogs, Config, EnrollmentError, EnrollmentForm, EnrollmentSubmission,
    EquipmentItem, Program, QuoteBreakdown, WebhookClient,
};

/// Shared application state
#[derive(Clone)]
struct AppState {
    catalogs: Arc<Catalogs>,
    webhook: Arc<WebhookClient>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

fn fail(status: StatusCode, message: impl Into<String>) -> Response {
    let body: ApiResponse<()> = ApiResponse {
        success: false,
        data: None,
        error: Some(message.into()),
    };
    (status, Json(body)).into_response()
}

/// Promo check response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PromoResponse {
    code: String,
    discount: f64,
    description: Option<String>,
}

/// POST /api/quote body
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteRequest {
    program_id: String,
    #[serde(default)]
    owned_item_ids: Vec<String>,
    #[serde(default)]
    promo_code: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnrollResponse {
    submission_id: String,
    final_total: f64,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/catalog - Equipment items in catalog order
async fn get_catalog(State(state): State<AppState>) -> impl IntoResponse {
    let items: Vec<EquipmentItem> = state.catalogs.equipment.all_items().to_vec();
    Json(ApiResponse::ok(items))
}

/// GET /api/programs - Enrollment programs
async fn get_programs(State(state): State<AppState>) -> impl IntoResponse {
    let programs: Vec<Program> = state.catalogs.programs.all_programs().to_vec();
    Json(ApiResponse::ok(programs))
}

/// GET /api/promo/:code - Validate a promotional code
async fn check_promo(State(state): State<AppState>, Path(code): Path<String>) -> Response {
    // Path has already percent-decoded the segment
    match state.catalogs.promos.lookup(&code) {
        Ok(entry) => Json(ApiResponse::ok(PromoResponse {
            code: entry.code.clone(),
            discount: entry.discount,
            description: entry.description.clone(),
        }))
        .into_response(),
        Err(e) => {
            info!("Promo code rejected: {}", e);
            fail(StatusCode::NOT_FOUND, e.user_message())
        }
    }
}

/// POST /api/quote - Price an enrollment without submitting it
async fn post_quote(State(state): State<AppState>, Json(request): Json<QuoteRequest>) -> Response {
    let catalogs = &state.catalogs;

    let Some(program) = catalogs.programs.find_by_id(&request.program_id) else {
        return fail(StatusCode::NOT_FOUND, "El programa seleccionado no existe.");
    };

    let form = EnrollmentForm {
        program_id: request.program_id,
        owned_item_ids: request.owned_item_ids,
        promo_code: request.promo_code,
        ..Default::default()
    };

    match quote_for(&form, program, &catalogs.equipment, &catalogs.promos) {
        Ok(breakdown) => Json(ApiResponse::<QuoteBreakdown>::ok(breakdown)).into_response(),
        Err(e) => fail(StatusCode::UNPROCESSABLE_ENTITY, e.user_message()),
    }
}

/// POST /api/enroll - Validate, price and forward to the webhook
async fn post_enroll(State(state): State<AppState>, Json(form): Json<EnrollmentForm>) -> Response {
    let catalogs = &state.catalogs;

    let submission = match EnrollmentSubmission::build(
        &form,
        &catalogs.programs,
        &catalogs.equipment,
        &catalogs.promos,
        Utc::now(),
    ) {
        Ok(submission) => submission,
        Err(EnrollmentError::Invalid(errors)) => {
            let body: ApiResponse<_> = ApiResponse {
                success: false,
                data: Some(errors),
                error: Some(EnrollmentError::Invalid(Vec::new()).user_message()),
            };
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response();
        }
        Err(e) => return fail(StatusCode::UNPROCESSABLE_ENTITY, e.user_message()),
    };

    match state.webhook.submit(&submission).await {
        Ok(()) => Json(ApiResponse::ok(EnrollResponse {
            submission_id: submission.submission_id,
            final_total: submission.final_total,
        }))
        .into_response(),
        Err(e) => {
            error!("Error submitting enrollment: {}", e);
            fail(StatusCode::BAD_GATEWAY, e.user_message())
        }
    }
}

fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/catalog", get(get_catalog))
        .route("/programs", get(get_programs))
        .route("/promo/:code", get(check_promo))
        .route("/quote", post(post_quote))
        .route("/enroll", post(post_enroll))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load(None)?;
    logging::init_logging(&config.log_level, false);

    println!("🌐 Academy Enrollment - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let catalogs = Catalogs::load(&config)?;
    println!(
        "✓ Loaded {} items, {} programs, {} promo codes",
        catalogs.equipment.count(),
        catalogs.programs.count(),
        catalogs.promos.count()
    );

    let state = AppState {
        catalogs: Arc::new(catalogs),
        webhook: Arc::new(WebhookClient::from_config(&config)?),
    };

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    println!("\n🚀 Server running on http://{}", config.bind_addr);
    println!("   API: http://{}/api/catalog", config.bind_addr);
    println!("   Webhook: {}", config.webhook_url);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, router(state)).await?;

    Ok(())
}
