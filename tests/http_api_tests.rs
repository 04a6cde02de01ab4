#![cfg(feature = "http_api")]

use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use chrono::NaiveDate;
use serde_json::{Value, json};
use task_autoscheduler::{SchedulingPolicy, http_api};
use tower::ServiceExt;

fn app() -> axum::Router {
    let state = http_api::AppState::with_clock(SchedulingPolicy::default(), || {
        NaiveDate::from_ymd_opt(2025, 1, 6)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    });
    http_api::router(state)
}

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn default_policy_is_served() {
    let request = Request::builder()
        .uri("/policy/default")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["work_hours_per_day"], 8.0);
    assert_eq!(body["work_start_time"], "09:00");
}

#[tokio::test]
async fn schedule_uses_server_clock_when_now_is_omitted() {
    let payload = json!({
        "tasks": [
            {"id": "b", "title": "Report", "estimatedHours": 2, "priority": "medium"},
            {"id": "a", "title": "Outage", "estimatedHours": 4, "priority": "urgent"}
        ]
    });

    let (status, body) = send(post_json("/schedule", payload)).await;

    assert_eq!(status, StatusCode::OK);
    let assignments = body["assignments"].as_array().unwrap();
    assert_eq!(assignments.len(), 2);
    assert_eq!(assignments[0]["task"]["id"], "a");
    assert_eq!(assignments[0]["date"], "2025-01-06");
    assert_eq!(assignments[0]["end_time"], "13:48");
    assert_eq!(assignments[1]["start_time"], "13:48");
    assert_eq!(assignments[1]["end_time"], "16:12");
    assert_eq!(body["report"]["days_needed"], 1);
}

#[tokio::test]
async fn schedule_honours_request_policy_and_now() {
    let payload = json!({
        "tasks": [{"id": "x", "title": "Weekend", "estimatedHours": 1, "taskboardId": "home"}],
        "taskboards": [{"id": "home", "name": "Home", "color": "#22c55e"}],
        "policy": {"workDaysPerWeek": 7, "workStartTime": "10:00", "bufferPercentage": 0},
        "now": "2025-01-11T07:00:00"
    });

    let (status, body) = send(post_json("/schedule", payload)).await;

    assert_eq!(status, StatusCode::OK);
    let first = &body["assignments"][0];
    assert_eq!(first["date"], "2025-01-11");
    assert_eq!(first["start_time"], "10:00");
    assert_eq!(first["end_time"], "11:00");
    assert_eq!(first["board_name"], "Home");
}

#[tokio::test]
async fn invalid_policy_is_a_bad_request() {
    let payload = json!({
        "tasks": [{"id": "x", "title": "X", "estimatedHours": 1}],
        "policy": {"workHoursPerDay": 0}
    });

    let (status, body) = send(post_json("/schedule", payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_policy");
}

#[tokio::test]
async fn rank_filters_and_orders_tasks() {
    let payload = json!({
        "tasks": [
            {"id": "low", "title": "L", "estimatedHours": 1, "priority": "low"},
            {"id": "done", "title": "D", "estimatedHours": 1, "priority": "urgent", "status": "done"},
            {"id": "high", "title": "H", "estimatedHours": 1, "priority": "high"}
        ]
    });

    let (status, body) = send(post_json("/rank", payload)).await;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["high", "low"]);
}
