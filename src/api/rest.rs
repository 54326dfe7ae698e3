// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`. Public endpoints (health, register,
// login) require no authentication. All other endpoints require a valid
// Bearer session token checked via the `SessionAuth` extractor.
//
// Provider absence is a first-class outcome: a fetch that fails upstream
// produces a 200 response with a neutral no-data payload, never a 5xx.
//
// CORS is configured permissively for development; tighten `allowed_origins`
// in production.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::api::session::SessionAuth;
use crate::app_state::AppState;
use crate::charts;
use crate::indicators;
use crate::store::AccountError;
use crate::types::{ChartStyle, Interval, Range};

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // ── Public ──────────────────────────────────────────────────
        .route("/api/v1/health", get(health))
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/login", post(login))
        // ── Authenticated ───────────────────────────────────────────
        .route("/api/v1/stocks/:symbol", get(stock_view))
        .route("/api/v1/stocks/:symbol/news", get(stock_news))
        .route("/api/v1/market/trending", get(market_trending))
        .route("/api/v1/market/overview", get(market_overview))
        .route("/api/v1/watchlist", get(watchlist_list))
        .route("/api/v1/watchlist/:symbol", post(watchlist_add))
        .route("/api/v1/watchlist/:symbol", delete(watchlist_remove))
        // ── Middleware & State ───────────────────────────────────────
        .layer(cors)
        .with_state(state)
}

/// Map an internal store/provider failure to an opaque 500.
fn internal_error(e: anyhow::Error) -> (StatusCode, Json<serde_json::Value>) {
    error!(error = %e, "internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": "internal error" })),
    )
}

// =============================================================================
// Health (public)
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    state_version: u64,
    server_time: i64,
    uptime_secs: i64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    Json(HealthResponse {
        status: "ok",
        state_version: state.version(),
        server_time: now.timestamp_millis(),
        uptime_secs: (now - state.started_at).num_seconds(),
    })
}

// =============================================================================
// Accounts (public)
// =============================================================================

#[derive(Deserialize)]
struct CredentialsRequest {
    email: String,
    password: String,
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    match state
        .store
        .create_account(&req.email, &req.password)
        .map_err(internal_error)?
    {
        Ok(()) => {
            state.increment_version();
            Ok((
                StatusCode::CREATED,
                Json(serde_json::json!({ "message": "Account created successfully" })),
            ))
        }
        Err(err) => {
            let status = match err {
                AccountError::DuplicateEmail => StatusCode::CONFLICT,
                AccountError::InvalidEmail | AccountError::WeakPassword => {
                    StatusCode::BAD_REQUEST
                }
            };
            Err((
                status,
                Json(serde_json::json!({ "error": err, "message": err.message() })),
            ))
        }
    }
}

#[derive(Serialize)]
struct LoginResponse {
    token: String,
    email: String,
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let ok = state
        .store
        .authenticate(&req.email, &req.password)
        .map_err(internal_error)?;
    if !ok {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "error": "Invalid credentials" })),
        ));
    }

    let token = state
        .session_keys
        .issue(&req.email, chrono::Utc::now().timestamp());
    info!(email = %req.email, "login succeeded");
    Ok(Json(LoginResponse {
        token,
        email: req.email,
    }))
}

// =============================================================================
// Stock analysis view (authenticated)
// =============================================================================

#[derive(Deserialize)]
struct StockQuery {
    range: Option<String>,
    interval: Option<String>,
    style: Option<String>,
}

fn bad_request(msg: String) -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::BAD_REQUEST, Json(serde_json::json!({ "error": msg })))
}

/// One fetch-compute-render cycle: price series + metadata from the provider,
/// the indicator table over the series, and the chart specs built from both.
async fn stock_view(
    SessionAuth(email): SessionAuth,
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(query): Query<StockQuery>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(bad_request("symbol must not be empty".into()));
    }

    let (default_range, default_interval) = {
        let config = state.config.read();
        (config.default_range, config.default_interval)
    };
    let range = match &query.range {
        Some(s) => Range::parse(s).ok_or_else(|| bad_request(format!("unknown range '{s}'")))?,
        None => default_range,
    };
    let interval = match &query.interval {
        Some(s) => {
            Interval::parse(s).ok_or_else(|| bad_request(format!("unknown interval '{s}'")))?
        }
        None => default_interval,
    };
    let style = match &query.style {
        Some(s) => {
            ChartStyle::parse(s).ok_or_else(|| bad_request(format!("unknown style '{s}'")))?
        }
        None => ChartStyle::default(),
    };

    let outcome = state.provider.fetch(&symbol, range, interval).await;
    let (series, meta) = match (outcome.series, outcome.meta) {
        (Some(series), Some(meta)) => (series, meta),
        _ => {
            // Absent data is non-fatal: the dashboard shows a neutral state.
            return Ok(Json(serde_json::json!({
                "symbol": symbol,
                "data": charts::no_data(),
                "footer": charts::footer(chrono::Utc::now()),
            })));
        }
    };

    let rows = indicators::compute(&series).unwrap_or_default();
    let in_watchlist = state
        .store
        .watchlist(&email)
        .map_err(internal_error)?
        .iter()
        .any(|s| s == &symbol);

    Ok(Json(serde_json::json!({
        "symbol": symbol,
        "range": range,
        "interval": interval.clamp_to(range),
        "meta": meta,
        "widgets": charts::summary_widgets(&meta),
        "charts": {
            "price": charts::price_chart(&series, style),
            "moving_averages": charts::moving_average_chart(&series, &rows),
            "rsi": charts::rsi_chart(&series, &rows),
            "macd": charts::macd_chart(&series, &rows),
            "bollinger": charts::bollinger_chart(&series, &rows),
        },
        "in_watchlist": in_watchlist,
        "footer": charts::footer(chrono::Utc::now()),
    })))
}

async fn stock_news(
    _auth: SessionAuth,
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> impl IntoResponse {
    let symbol = symbol.trim().to_uppercase();
    let articles = state.provider.news(&symbol).await;
    Json(serde_json::json!({ "symbol": symbol, "articles": articles }))
}

// =============================================================================
// Market overview (authenticated)
// =============================================================================

async fn market_trending(
    _auth: SessionAuth,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let symbols = state.config.read().trending_symbols.clone();
    let rows = state.provider.trending(&symbols).await;
    Json(serde_json::json!({ "trending": rows }))
}

async fn market_overview(
    _auth: SessionAuth,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let indices = state.config.read().index_symbols.clone();

    let mut panels = Vec::with_capacity(indices.len());
    for index in &indices {
        let chart = match state.provider.index_series(&index.symbol).await {
            Some(series) => charts::price_chart(&series, ChartStyle::Line),
            None => charts::no_data(),
        };
        panels.push(serde_json::json!({
            "symbol": index.symbol,
            "name": index.name,
            "chart": chart,
        }));
    }
    Json(serde_json::json!({ "indices": panels }))
}

// =============================================================================
// Watchlist (authenticated)
// =============================================================================

async fn watchlist_list(
    SessionAuth(email): SessionAuth,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let symbols = state.store.watchlist(&email).map_err(internal_error)?;
    Ok(Json(serde_json::json!({ "watchlist": symbols })))
}

async fn watchlist_add(
    SessionAuth(email): SessionAuth,
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(bad_request("symbol must not be empty".into()));
    }

    let added = state
        .store
        .add_to_watchlist(&email, &symbol)
        .map_err(internal_error)?;
    if !added {
        return Err((
            StatusCode::CONFLICT,
            Json(serde_json::json!({ "error": format!("{symbol} is already on the watchlist") })),
        ));
    }

    state.increment_version();
    Ok(Json(serde_json::json!({ "added": symbol })))
}

async fn watchlist_remove(
    SessionAuth(email): SessionAuth,
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let symbol = symbol.trim().to_uppercase();
    state
        .store
        .remove_from_watchlist(&email, &symbol)
        .map_err(internal_error)?;
    state.increment_version();
    Ok(Json(serde_json::json!({ "removed": symbol })))
}
