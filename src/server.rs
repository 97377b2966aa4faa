use std::net::SocketAddr;
use std::str::FromStr;

use anyhow::Result;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info};

use crate::config::Config;
use crate::display::{badge_for, gap_token, Badge};
use crate::district::{build_district_report, AreaRow, DistrictReport};
use crate::gap::whatif::{next_reach_plan, simulate_whatif, CountField, ReachPlan, WhatIfResult};
use crate::gap::{compute_with_table, GapAnalysisResult, PerformanceSnapshot};
use crate::program::{ProgramType, ThresholdTable};
use crate::validate::validate_snapshot;

#[derive(Clone)]
struct ApiState {
    config: Config,
}

#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    ok: bool,
    data: T,
}

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    ok: bool,
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ApiErrorBody {
            ok: false,
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<ApiResponse<T>>, ApiError>;

#[derive(Debug, Clone, Deserialize)]
struct AnalyzeRequest {
    program: Option<String>,
    #[serde(flatten)]
    snapshot: PerformanceSnapshot,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct Adjustments {
    club_base: Option<i64>,
    paid_clubs: Option<i64>,
    distinguished_clubs: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
struct WhatIfRequest {
    program: Option<String>,
    #[serde(flatten)]
    snapshot: PerformanceSnapshot,
    #[serde(default)]
    adjust: Adjustments,
}

#[derive(Debug, Clone, Deserialize)]
struct ReportRequest {
    rows: Vec<AreaRow>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct GapTokens {
    distinguished: String,
    select: String,
    presidents: String,
}

#[derive(Debug, Serialize)]
struct AnalyzeResponse {
    result: GapAnalysisResult,
    badge: Badge,
    tokens: GapTokens,
    next_step: Option<ReachPlan>,
}

pub async fn run_server(config: Config, bind: SocketAddr) -> Result<()> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/v1/thresholds/:program", get(thresholds))
        .route("/v1/analyze", post(analyze))
        .route("/v1/whatif", post(whatif))
        .route("/v1/report", post(report))
        .route("/v1/config", get(show_config))
        .layer(cors)
        .with_state(ApiState { config });

    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("REST API listening on http://{bind}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<ApiResponse<HealthResponse>> {
    ok(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn show_config(State(state): State<ApiState>) -> Json<ApiResponse<Config>> {
    ok(state.config)
}

async fn thresholds(
    State(state): State<ApiState>,
    Path(program): Path<String>,
) -> ApiResult<ThresholdTable> {
    let program = parse_program(&state, Some(&program))?;
    Ok(ok(state.config.table_for(program)))
}

async fn analyze(
    State(state): State<ApiState>,
    Json(request): Json<AnalyzeRequest>,
) -> ApiResult<AnalyzeResponse> {
    let program = parse_program(&state, request.program.as_deref())?;
    validate_snapshot(&request.snapshot).map_err(|e| ApiError::bad_request(e.to_string()))?;
    debug!("analyzing {program} snapshot {:?}", request.snapshot);

    let table = state.config.table_for(program);
    let result = compute_with_table(&request.snapshot, &table);
    let next_step = next_reach_plan(&request.snapshot, &table, &result);
    let badge = badge_for(&result);
    let tokens = GapTokens {
        distinguished: gap_token(&result.distinguished_gap).to_string(),
        select: gap_token(&result.select_gap).to_string(),
        presidents: gap_token(&result.presidents_gap).to_string(),
    };
    Ok(ok(AnalyzeResponse {
        result,
        badge,
        tokens,
        next_step,
    }))
}

async fn whatif(
    State(state): State<ApiState>,
    Json(request): Json<WhatIfRequest>,
) -> ApiResult<WhatIfResult> {
    let program = parse_program(&state, request.program.as_deref())?;
    validate_snapshot(&request.snapshot).map_err(|e| ApiError::bad_request(e.to_string()))?;

    let adjustments = collect_adjustments(&request.adjust);
    if adjustments.is_empty() {
        return Err(ApiError::bad_request(
            "at least one count adjustment is required",
        ));
    }
    Ok(ok(simulate_whatif(
        &request.snapshot,
        &state.config.table_for(program),
        &adjustments,
    )))
}

async fn report(
    State(state): State<ApiState>,
    Json(request): Json<ReportRequest>,
) -> ApiResult<DistrictReport> {
    if request.rows.is_empty() {
        return Err(ApiError::bad_request("rows cannot be empty"));
    }
    let report = build_district_report(
        &request.rows,
        &state.config.table_for(ProgramType::Area),
        &state.config.table_for(ProgramType::Division),
    )
    .map_err(|e| ApiError::bad_request(format!("{e:#}")))?;
    Ok(ok(report))
}

fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse { ok: true, data })
}

fn parse_program(
    state: &ApiState,
    raw: Option<&str>,
) -> std::result::Result<ProgramType, ApiError> {
    match raw {
        Some(raw) => {
            ProgramType::from_str(raw).map_err(|error| ApiError::bad_request(error.to_string()))
        }
        None => Ok(state.config.analysis.default_program),
    }
}

fn collect_adjustments(adjust: &Adjustments) -> Vec<(CountField, i64)> {
    [
        (CountField::ClubBase, adjust.club_base),
        (CountField::PaidClubs, adjust.paid_clubs),
        (CountField::DistinguishedClubs, adjust.distinguished_clubs),
    ]
    .into_iter()
    .filter_map(|(field, delta)| delta.map(|d| (field, d)))
    .collect()
}
