//! # REST API
//!
//! Builds the axum router that exposes the ledger over HTTP. All endpoints
//! share application state through axum's `State` extractor.
//!
//! ## Endpoints
//!
//! | Method | Path                 | Description                              |
//! |--------|----------------------|------------------------------------------|
//! | GET    | `/health`            | Liveness check                           |
//! | GET    | `/api/banks`         | Bank directory served to clients         |
//! | GET    | `/api/ledger`        | Balance, display name, full history      |
//! | GET    | `/api/history`       | History with relative dates              |
//! | GET    | `/api/summary`       | Money in / out for the current month     |
//! | GET    | `/api/receipt`       | Last completed transaction               |
//! | POST   | `/api/transfer`      | Submit a transfer                        |
//! | POST   | `/api/topup`         | Submit a top-up                          |
//! | POST   | `/api/check-amount`  | Per-keystroke funds check                |
//! | GET    | `/metrics`           | Prometheus exposition                    |
//!
//! Submissions hold the request open for the whole simulated delay and
//! answer with the completed record.

use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use mockbank_ledger::transaction::{Field, TopUpInput, TransferInput};
use mockbank_ledger::{Bank, Session, SimulatorError, Transaction, TransactionSimulator};

use crate::metrics::{metrics_handler, SharedMetrics};

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// Shared application state available to all request handlers.
///
/// Cheap to clone; everything is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The one ledger this server operates on.
    pub session: Arc<Session>,
    /// Enacts submissions against `session`.
    pub simulator: TransactionSimulator,
    /// Prometheus metrics for in-handler recording.
    pub metrics: SharedMetrics,
    /// Directory served at `/api/banks`.
    pub banks: Arc<Vec<Bank>>,
}

// ---------------------------------------------------------------------------
// Router Construction
// ---------------------------------------------------------------------------

/// Builds the full axum [`Router`] with all API routes, CORS, and tracing.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    let metrics = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(Arc::clone(&state.metrics));

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/banks", get(banks_handler))
        .route("/api/ledger", get(ledger_handler))
        .route("/api/history", get(history_handler))
        .route("/api/summary", get(summary_handler))
        .route("/api/receipt", get(receipt_handler))
        .route("/api/transfer", post(transfer_handler))
        .route("/api/topup", post(top_up_handler))
        .route("/api/check-amount", post(check_amount_handler))
        .with_state(state)
        .merge(metrics)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

// ---------------------------------------------------------------------------
// Request / Response Types
// ---------------------------------------------------------------------------

/// Body of `POST /api/check-amount`.
#[derive(Debug, Deserialize)]
pub struct CheckAmountRequest {
    #[serde(default)]
    pub amount: serde_json::Value,
}

/// Response of `POST /api/check-amount`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CheckAmountResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// One problem with a submitted form.
#[derive(Debug, Serialize, Deserialize)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

/// Error body for rejected submissions.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

/// Maps a simulator failure onto an HTTP response.
///
/// Validation problems are 422 with one entry per field, a submission
/// while another is processing is 409, anything else is 500.
fn error_response(err: SimulatorError) -> Response {
    let (status, errors) = match &err {
        SimulatorError::Invalid(errors) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            errors
                .iter()
                .map(|e| FieldError {
                    field: e.field(),
                    message: e.to_string(),
                })
                .collect(),
        ),
        SimulatorError::Busy => (StatusCode::CONFLICT, Vec::new()),
        SimulatorError::Ledger(_) | SimulatorError::Interrupted(_) => {
            tracing::error!(error = %err, "submission failed after validation");
            (StatusCode::INTERNAL_SERVER_ERROR, Vec::new())
        }
    };

    let body = ErrorResponse {
        error: err.to_string(),
        errors,
    };
    (status, Json(body)).into_response()
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /health`: returns 200 if the server is alive.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

/// `GET /api/banks`: the bank directory as a JSON array of `{name, code}`.
async fn banks_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.banks.as_ref().clone())
}

/// `GET /api/ledger`: balance, display name, and every transaction.
async fn ledger_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.session.snapshot())
}

/// `GET /api/history`: transactions newest first, with relative dates.
async fn history_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.session.history(Local::now().naive_local()))
}

/// `GET /api/summary`: money in / money out for the current month.
async fn summary_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.session.current_month_summary())
}

/// `GET /api/receipt`: the last completed transaction, or 404.
async fn receipt_handler(State(state): State<AppState>) -> Response {
    match state.session.current_receipt() {
        Some(tx) => Json(tx).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "no completed transaction".into(),
                errors: Vec::new(),
            }),
        )
            .into_response(),
    }
}

/// `POST /api/transfer`: validates, waits out the transfer delay, and
/// answers with the completed record.
async fn transfer_handler(
    State(state): State<AppState>,
    Json(input): Json<TransferInput>,
) -> Response {
    let started = Instant::now();
    let result = state.simulator.submit_transfer(input).await;
    finish(&state, result, started)
}

/// `POST /api/topup`: validates, waits out the top-up delay, and answers
/// with the completed record once the return-to-summary pause has elapsed.
async fn top_up_handler(
    State(state): State<AppState>,
    Json(input): Json<TopUpInput>,
) -> Response {
    let started = Instant::now();
    let result = state.simulator.submit_top_up(input).await;
    finish(&state, result, started)
}

fn finish(
    state: &AppState,
    result: Result<Transaction, SimulatorError>,
    started: Instant,
) -> Response {
    match result {
        Ok(tx) => {
            state.metrics.record_completed(
                &tx,
                state.session.balance(),
                started.elapsed().as_secs_f64(),
            );
            Json(tx).into_response()
        }
        Err(err) => {
            if !matches!(
                err,
                SimulatorError::Ledger(_) | SimulatorError::Interrupted(_)
            ) {
                state.metrics.submissions_rejected_total.inc();
            }
            error_response(err)
        }
    }
}

/// `POST /api/check-amount`: the as-you-type funds check.
///
/// Blank or half-typed amounts pass; only an amount above the balance is
/// flagged.
async fn check_amount_handler(
    State(state): State<AppState>,
    Json(req): Json<CheckAmountRequest>,
) -> impl IntoResponse {
    let raw = match req.amount {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        _ => String::new(),
    };

    let resp = match state.session.check_amount(&raw) {
        Ok(()) => CheckAmountResponse {
            ok: true,
            message: None,
        },
        Err(e) => CheckAmountResponse {
            ok: false,
            message: Some(e.to_string()),
        },
    };
    Json(resp)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
