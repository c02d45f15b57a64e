use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::aggregate::{ScanStats, SortMode};
use crate::analyze::{ClassifiedItem, RiskLevel};
use crate::ingest::types::RawEntry;
use crate::scan::ScanQuery;
use crate::state::AppState;
use crate::view::{page_view, PageView, RiskFilter};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/targets", get(list_targets))
        .route("/scan", post(run_scan))
        .route("/results", get(current_results))
        .route("/classify", post(classify_one))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m),
        };
        (status, Json(ErrorBody { error: msg })).into_response()
    }
}

#[derive(Serialize)]
struct TargetOut {
    name: String,
    query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

#[derive(Serialize)]
struct TargetsOut {
    targets: Vec<TargetOut>,
    windows: Vec<String>,
    default_window: String,
}

async fn list_targets(State(state): State<AppState>) -> Json<TargetsOut> {
    let cfg = &state.config;
    Json(TargetsOut {
        targets: cfg
            .targets
            .iter()
            .map(|t| TargetOut {
                name: t.name.clone(),
                query: t.query.clone(),
                description: t.description.clone(),
            })
            .collect(),
        windows: cfg.windows.iter().map(|w| w.label.clone()).collect(),
        default_window: cfg.default_window.clone(),
    })
}

#[derive(Deserialize)]
struct ScanReq {
    target: String,
    #[serde(default)]
    window: Option<String>,
    #[serde(default)]
    sort: Option<String>,
}

#[derive(Serialize)]
struct ScanResp {
    /// "ok" or "empty" (no intelligence found)
    status: &'static str,
    /// False when a newer scan started before this one finished.
    published: bool,
    target: String,
    window: String,
    sort: SortMode,
    total: usize,
    by_risk: RiskCounts,
    stats: ScanStats,
    scanned_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct RiskCounts {
    critical: usize,
    high: usize,
    medium: usize,
    low: usize,
}

async fn run_scan(
    State(state): State<AppState>,
    Json(body): Json<ScanReq>,
) -> Result<Json<ScanResp>, ApiError> {
    let cfg = &state.config;
    if cfg.target(&body.target).is_none() {
        return Err(ApiError::NotFound(format!("unknown target `{}`", body.target)));
    }
    if let Some(w) = body.window.as_deref() {
        if cfg.window(w).is_none() {
            return Err(ApiError::BadRequest(format!("unknown window `{w}`")));
        }
    }
    let mode: SortMode = body
        .sort
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(|e: anyhow::Error| ApiError::BadRequest(e.to_string()))?;

    let q = ScanQuery::from_config(cfg, &body.target, body.window.as_deref())
        .map_err(|e| ApiError::BadRequest(format!("{e:#}")))?;

    let ticket = state.current.begin();
    let result = state.scanner.run(&q, mode).await.map_err(|e| {
        tracing::warn!(target: "api", error = ?e, "scan failed");
        ApiError::Internal(format!("{e:#}"))
    })?;

    let resp = ScanResp {
        status: if result.is_empty() { "empty" } else { "ok" },
        published: false,
        target: result.target.clone(),
        window: result.window.clone(),
        sort: result.sort,
        total: result.total_before_filter,
        by_risk: RiskCounts {
            critical: result.count_at(RiskLevel::Critical),
            high: result.count_at(RiskLevel::High),
            medium: result.count_at(RiskLevel::Medium),
            low: result.count_at(RiskLevel::Low),
        },
        stats: result.stats,
        scanned_at: result.scanned_at,
    };
    let published = state.current.publish(ticket, result);
    Ok(Json(ScanResp { published, ..resp }))
}

#[derive(Deserialize)]
struct ResultsQuery {
    #[serde(default)]
    risk: Option<String>,
    #[serde(default)]
    page: Option<usize>,
    #[serde(default)]
    per_page: Option<usize>,
}

#[derive(Serialize)]
struct ResultsResp {
    /// "idle" (no scan yet), "empty" (no intelligence found) or "ok"
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    window: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scanned_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    view: Option<PageView>,
}

async fn current_results(
    State(state): State<AppState>,
    Query(q): Query<ResultsQuery>,
) -> Result<Json<ResultsResp>, ApiError> {
    let filter: RiskFilter = q
        .risk
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(|e: anyhow::Error| ApiError::BadRequest(e.to_string()))?;

    let Some(result) = state.current.snapshot() else {
        return Ok(Json(ResultsResp {
            status: "idle",
            target: None,
            window: None,
            scanned_at: None,
            view: None,
        }));
    };

    let per_page = state.config.view.per_page(q.per_page);
    let view = page_view(&result, filter, q.page.unwrap_or(0), per_page);
    Ok(Json(ResultsResp {
        status: if result.is_empty() { "empty" } else { "ok" },
        target: Some(result.target.clone()),
        window: Some(result.window.clone()),
        scanned_at: Some(result.scanned_at),
        view: Some(view),
    }))
}

#[derive(Deserialize)]
struct ClassifyReq {
    title: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    published: Option<String>,
}

async fn classify_one(
    State(state): State<AppState>,
    Json(body): Json<ClassifyReq>,
) -> Result<Json<ClassifiedItem>, ApiError> {
    if body.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title must not be empty".into()));
    }
    let entry = RawEntry {
        title: body.title,
        link: body.link.unwrap_or_default(),
        published: body.published,
        summary: body.summary,
        source: None,
    };
    Ok(Json(state.scanner.classifier().classify(&entry)))
}
