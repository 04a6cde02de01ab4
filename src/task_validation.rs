use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::HashSet;
use thiserror::Error;

use crate::task::{Task, TaskStatus};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TaskValidationError {
    #[error("task {task_id} has no estimated hours")]
    MissingEstimate { task_id: String },

    #[error("task {task_id} has invalid estimated hours {hours} (must be a positive number)")]
    InvalidEstimate { task_id: String, hours: f64 },

    #[error("task {task_id} is already {status}")]
    Terminal { task_id: String, status: TaskStatus },

    #[error("task {task_id} has unparseable due date '{raw}'")]
    UnparseableDueDate { task_id: String, raw: String },

    #[error("task record is missing an id")]
    MissingId,

    #[error("duplicate task id {0}")]
    DuplicateId(String),
}

/// Accepts `YYYY-MM-DD`, an RFC 3339 timestamp, or a naive `YYYY-MM-DDTHH:MM:SS`
/// timestamp, keeping only the date part.
pub fn parse_due_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.date_naive());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|timestamp| timestamp.date())
}

/// Checks whether a task can be placed on the calendar, returning its parsed
/// due date when it can.
pub fn check_schedulable(task: &Task) -> Result<Option<NaiveDate>, TaskValidationError> {
    if task.status.is_terminal() {
        return Err(TaskValidationError::Terminal {
            task_id: task.id.clone(),
            status: task.status,
        });
    }

    let hours = task
        .estimated_hours
        .ok_or_else(|| TaskValidationError::MissingEstimate {
            task_id: task.id.clone(),
        })?;
    if !hours.is_finite() || hours <= 0.0 {
        return Err(TaskValidationError::InvalidEstimate {
            task_id: task.id.clone(),
            hours,
        });
    }

    match task.due_date.as_deref() {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse_due_date(raw).map(Some).ok_or_else(|| {
            TaskValidationError::UnparseableDueDate {
                task_id: task.id.clone(),
                raw: raw.to_string(),
            }
        }),
    }
}

/// Structural checks for a task snapshot loaded from a store: every record
/// has an id and ids are unique.
pub fn validate_task_collection(tasks: &[Task]) -> Result<(), TaskValidationError> {
    let mut seen_ids = HashSet::with_capacity(tasks.len());
    for task in tasks {
        if task.id.trim().is_empty() {
            return Err(TaskValidationError::MissingId);
        }
        if !seen_ids.insert(task.id.as_str()) {
            return Err(TaskValidationError::DuplicateId(task.id.clone()));
        }
    }
    Ok(())
}
