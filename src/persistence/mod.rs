use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeJsonError;
use std::io;
use thiserror::Error;

use crate::policy::SchedulingPolicy;
use crate::schedule::ScheduleRequest;
use crate::task::{Task, Taskboard};
use crate::task_validation;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] SerdeJsonError),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("store lock poisoned")]
    LockPoisoned,

    #[error("no snapshot stored")]
    NotFound,
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Read side of the task and preference stores. The scheduler treats each
/// load as a snapshot and never re-queries during a run.
pub trait TaskSource {
    fn load_tasks(&self) -> PersistenceResult<Vec<Task>>;
    fn load_taskboards(&self) -> PersistenceResult<Vec<Taskboard>>;
    fn load_policy(&self) -> PersistenceResult<Option<SchedulingPolicy>>;

    /// Assembles a request from the stored snapshot, using the default policy
    /// when the user has none stored.
    fn schedule_request(&self, now: NaiveDateTime) -> PersistenceResult<ScheduleRequest> {
        let tasks = self.load_tasks()?;
        let taskboards = self.load_taskboards()?;
        let policy = policy_or_default(self.load_policy()?);
        Ok(ScheduleRequest::new(tasks, policy, now).with_taskboards(taskboards))
    }
}

pub fn policy_or_default(policy: Option<SchedulingPolicy>) -> SchedulingPolicy {
    policy.unwrap_or_default()
}

/// Tasks, boards and the user's policy as one document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<SchedulingPolicy>,
    #[serde(default)]
    pub taskboards: Vec<Taskboard>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl TaskSource for TaskSnapshot {
    fn load_tasks(&self) -> PersistenceResult<Vec<Task>> {
        Ok(self.tasks.clone())
    }

    fn load_taskboards(&self) -> PersistenceResult<Vec<Taskboard>> {
        Ok(self.taskboards.clone())
    }

    fn load_policy(&self) -> PersistenceResult<Option<SchedulingPolicy>> {
        Ok(self.policy.clone())
    }
}

pub fn validate_tasks(tasks: &[Task]) -> PersistenceResult<()> {
    task_validation::validate_task_collection(tasks)
        .map_err(|err| PersistenceError::InvalidData(err.to_string()))
}

pub fn validate_snapshot(snapshot: &TaskSnapshot) -> PersistenceResult<()> {
    validate_tasks(&snapshot.tasks)?;
    if let Some(policy) = &snapshot.policy {
        policy
            .validate()
            .map_err(|err| PersistenceError::InvalidData(err.to_string()))?;
    }
    Ok(())
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    load_snapshot_from_json, load_tasks_from_csv, save_snapshot_to_json, save_tasks_to_csv,
};
