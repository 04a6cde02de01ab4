use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::{
    Schedule, ScheduleRequest, SchedulerError, SchedulingPolicy, Task, Taskboard, ranking,
};

type Clock = dyn Fn() -> NaiveDateTime + Send + Sync;

/// Server-wide settings. Holds no per-user scheduling state; every request
/// runs its own allocation.
#[derive(Clone)]
pub struct AppState {
    default_policy: Arc<SchedulingPolicy>,
    clock: Arc<Clock>,
}

impl AppState {
    pub fn new(default_policy: SchedulingPolicy) -> Self {
        Self::with_clock(default_policy, || chrono::Local::now().naive_local())
    }

    /// Uses `clock` for requests that omit `now`.
    pub fn with_clock<F>(default_policy: SchedulingPolicy, clock: F) -> Self
    where
        F: Fn() -> NaiveDateTime + Send + Sync + 'static,
    {
        Self {
            default_policy: Arc::new(default_policy),
            clock: Arc::new(clock),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(SchedulingPolicy::default())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    InvalidPolicy(String),
}

impl From<SchedulerError> for ApiError {
    fn from(value: SchedulerError) -> Self {
        match value {
            SchedulerError::InvalidPolicy(err) => ApiError::InvalidPolicy(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InvalidPolicy(message) => {
                let body = Json(ErrorBody {
                    error: "invalid_policy",
                    message,
                });
                (StatusCode::BAD_REQUEST, body).into_response()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct SchedulePayload {
    tasks: Vec<Task>,
    #[serde(default)]
    taskboards: Vec<Taskboard>,
    #[serde(default)]
    policy: Option<SchedulingPolicy>,
    #[serde(default)]
    now: Option<NaiveDateTime>,
}

#[derive(Debug, Deserialize)]
struct RankPayload {
    tasks: Vec<Task>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/policy/default", get(default_policy))
        .route("/schedule", post(build_schedule))
        .route("/rank", post(rank_tasks))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "http api listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn default_policy(State(state): State<AppState>) -> Json<SchedulingPolicy> {
    Json(state.default_policy.as_ref().clone())
}

async fn build_schedule(
    State(state): State<AppState>,
    Json(payload): Json<SchedulePayload>,
) -> Result<Json<Schedule>, ApiError> {
    let request = ScheduleRequest {
        tasks: payload.tasks,
        taskboards: payload.taskboards,
        policy: payload
            .policy
            .unwrap_or_else(|| state.default_policy.as_ref().clone()),
        now: payload.now.unwrap_or_else(|| (state.clock)()),
    };
    let schedule = Schedule::build(&request).map_err(|err| {
        warn!(error = %err, "rejecting schedule request");
        ApiError::from(err)
    })?;
    Ok(Json(schedule))
}

async fn rank_tasks(Json(payload): Json<RankPayload>) -> Json<Vec<Task>> {
    Json(ranking::rank(&payload.tasks))
}
