use std::{sync::Arc, time::Duration};

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use intake_core::{
    HttpWebhookClient, SubmissionCoordinator, SubmissionError, SubmitOutcome, SubmitPhase,
};
use reference::{DataFetchError, HttpReferenceSource, ReferenceCache, ReferenceIndex};
use serde::Deserialize;
use shared::{
    error::{ApiError, ErrorCode},
    protocol::{SubmitResponse, SubmitStatus},
};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;
mod form;
mod submit;

use app_state::AppState;
use config::load_settings;
use submit::read_submit_form;

#[derive(Debug, Deserialize)]
struct FormQuery {
    database: Option<String>,
    po: Option<String>,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = load_settings().resolve()?;
    let http = build_http_client(settings.http_timeout)?;

    let reference = Arc::new(ReferenceCache::new(Arc::new(
        HttpReferenceSource::with_client(http.clone(), settings.reference_url.clone()),
    )));
    // Warm the cache; a failure here is shown on the form and retried per page load.
    if let Err(error) = reference.get().await {
        warn!(%error, "initial reference load failed");
    }

    let webhooks = Arc::new(HttpWebhookClient::with_client(http, settings.webhooks));
    let state = AppState {
        reference,
        coordinator: Arc::new(SubmissionCoordinator::new(webhooks)),
    };
    let app = build_router(state, settings.max_body_bytes);

    info!(addr = %settings.bind_addr, "intake form listening");
    let listener = tokio::net::TcpListener::bind(settings.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_http_client(timeout: Option<Duration>) -> anyhow::Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/", get(form_page))
        .route("/api/databases", get(http_list_databases))
        .route(
            "/api/databases/:database/purchase_orders",
            get(http_list_purchase_orders),
        )
        .route(
            "/api/databases/:database/purchase_orders/:po/items",
            get(http_list_items),
        )
        .route("/submit", post(http_submit))
        .route("/admin/reference/invalidate", post(invalidate_reference))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn form_page(State(state): State<AppState>, Query(q): Query<FormQuery>) -> Response {
    match state.reference.get().await {
        Ok(index) => Html(form::render_form(
            &index,
            q.database.as_deref(),
            q.po.as_deref(),
        ))
        .into_response(),
        Err(err) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Html(form::render_load_error(&err)),
        )
            .into_response(),
    }
}

async fn reference_index(
    state: &AppState,
) -> Result<Arc<ReferenceIndex>, (StatusCode, Json<ApiError>)> {
    state.reference.get().await.map_err(|e| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiError::new(ErrorCode::Upstream, e.to_string())),
        )
    })
}

fn not_found(message: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError::new(ErrorCode::NotFound, message)),
    )
}

async fn http_list_databases(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    let index = reference_index(&state).await?;
    Ok(Json(index.databases().map(ToString::to_string).collect()))
}

async fn http_list_purchase_orders(
    State(state): State<AppState>,
    Path(database): Path<String>,
) -> ApiResult<Vec<String>> {
    let index = reference_index(&state).await?;
    let po_numbers = index
        .po_numbers(&database)
        .ok_or_else(|| not_found("database not found"))?;
    Ok(Json(po_numbers.into_iter().map(ToString::to_string).collect()))
}

async fn http_list_items(
    State(state): State<AppState>,
    Path((database, po)): Path<(String, String)>,
) -> ApiResult<Vec<String>> {
    let index = reference_index(&state).await?;
    let items = index
        .items(&database, &po)
        .ok_or_else(|| not_found("purchase order not found"))?;
    Ok(Json(items.iter().map(ToString::to_string).collect()))
}

fn rejected(status: StatusCode, message: String) -> (StatusCode, Json<SubmitResponse>) {
    (
        status,
        Json(SubmitResponse {
            status: SubmitStatus::Failed,
            message,
            folder_name: None,
            folder_url: None,
            entries_appended: 0,
            debug: Vec::new(),
        }),
    )
}

fn outcome_status(outcome: &SubmitOutcome) -> StatusCode {
    match (outcome.phase, outcome.failed_during) {
        (SubmitPhase::Done, _) => StatusCode::OK,
        (_, Some(SubmitPhase::Validating)) => StatusCode::UNPROCESSABLE_ENTITY,
        (_, Some(SubmitPhase::Uploading | SubmitPhase::Appending)) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn http_submit(
    State(state): State<AppState>,
    multipart: Multipart,
) -> (StatusCode, Json<SubmitResponse>) {
    let form = match read_submit_form(multipart).await {
        Ok(form) => form,
        Err(err) => {
            warn!(error = %err, "unreadable submit form");
            return rejected(StatusCode::BAD_REQUEST, format!("Invalid form data: {err}"));
        }
    };
    let (selection, photos) = match form.into_selection() {
        Ok(parts) => parts,
        Err(err) => {
            return rejected(
                StatusCode::UNPROCESSABLE_ENTITY,
                SubmissionError::from(err).user_message(),
            )
        }
    };

    let index = match state.reference.get().await {
        Ok(index) => index,
        Err(err) => return reference_unavailable(&err),
    };
    if let Err(err) = selection.check_against(&index) {
        return rejected(
            StatusCode::UNPROCESSABLE_ENTITY,
            SubmissionError::from(err).user_message(),
        );
    }

    let coordinator = Arc::clone(&state.coordinator);
    let outcome = tokio::spawn(async move { coordinator.submit(&selection, &photos).await })
        .await
        .unwrap_or_else(|join_error| {
            error!(error = %join_error, "submit task did not complete");
            SubmitOutcome::unexpected(join_error.to_string())
        });

    (outcome_status(&outcome), Json(outcome.to_response()))
}

fn reference_unavailable(err: &DataFetchError) -> (StatusCode, Json<SubmitResponse>) {
    rejected(
        StatusCode::SERVICE_UNAVAILABLE,
        format!("Failed to load reference data: {err}"),
    )
}

async fn invalidate_reference(State(state): State<AppState>) -> StatusCode {
    state.reference.invalidate().await;
    StatusCode::NO_CONTENT
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
