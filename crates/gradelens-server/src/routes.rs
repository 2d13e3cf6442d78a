//! HTTP handlers for the analytics query surface.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use gradelens_core::bayes::BayesQuery;
use gradelens_core::conditional::ConditionalQuery;
use gradelens_core::dataset::SnapshotInfo;
use gradelens_core::query::{execute, AnalyticsQuery, AnalyticsResponse, BayesParams, ConditionalParams};

use crate::error::ApiError;
use crate::state::SharedState;

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub snapshot_id: Uuid,
    pub student_count: usize,
    pub loaded_at: DateTime<Utc>,
}

/// Routes under `/api`, without middleware.
pub fn api_routes(state: SharedState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/grades", get(grades))
        .route("/api/statistics", get(statistics))
        .route("/api/correlation-matrix", get(correlation_matrix))
        .route("/api/conditional-probability", get(conditional_probability))
        .route("/api/bayes", get(bayes))
        .route("/api/reload", post(reload))
        .with_state(state)
}

fn run(state: &SharedState, query: AnalyticsQuery) -> ApiResult<AnalyticsResponse> {
    let snapshot = state.store.current();
    tracing::debug!(?query, snapshot_id = %snapshot.snapshot_id(), "running query");
    Ok(Json(execute(&snapshot, &query)?))
}

async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let SnapshotInfo {
        snapshot_id,
        loaded_at,
        student_count,
    } = state.store.current().info();
    Json(HealthResponse {
        status: "healthy",
        snapshot_id,
        student_count,
        loaded_at,
    })
}

async fn grades(State(state): State<SharedState>) -> ApiResult<AnalyticsResponse> {
    run(&state, AnalyticsQuery::Grades)
}

async fn statistics(State(state): State<SharedState>) -> ApiResult<AnalyticsResponse> {
    run(&state, AnalyticsQuery::Statistics)
}

async fn correlation_matrix(State(state): State<SharedState>) -> ApiResult<AnalyticsResponse> {
    run(&state, AnalyticsQuery::CorrelationMatrix)
}

async fn conditional_probability(
    State(state): State<SharedState>,
    params: Result<Query<ConditionalParams>, QueryRejection>,
) -> ApiResult<AnalyticsResponse> {
    let Query(params) = params?;
    let query = ConditionalQuery::from_params(&params)?;
    run(&state, AnalyticsQuery::Conditional(query))
}

async fn bayes(
    State(state): State<SharedState>,
    params: Result<Query<BayesParams>, QueryRejection>,
) -> ApiResult<AnalyticsResponse> {
    let Query(params) = params?;
    let query = BayesQuery::from_params(&params)?;
    run(&state, AnalyticsQuery::Bayes(query))
}

async fn reload(State(state): State<SharedState>) -> ApiResult<SnapshotInfo> {
    let info = state.reload().await?;
    tracing::info!(snapshot_id = %info.snapshot_id, students = info.student_count, "reload requested");
    Ok(Json(info))
}
