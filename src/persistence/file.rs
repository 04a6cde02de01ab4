use super::{PersistenceError, PersistenceResult, TaskSnapshot};
use crate::task::{Priority, Task, TaskStatus};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

pub fn save_snapshot_to_json<P: AsRef<Path>>(
    snapshot: &TaskSnapshot,
    path: P,
) -> PersistenceResult<()> {
    super::validate_snapshot(snapshot)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, snapshot)?;
    Ok(())
}

pub fn load_snapshot_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<TaskSnapshot> {
    let file = File::open(path)?;
    let snapshot: TaskSnapshot = serde_json::from_reader(file)?;
    super::validate_snapshot(&snapshot)?;
    Ok(snapshot)
}

#[derive(Default, Serialize, Deserialize)]
struct TaskCsvRecord {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    estimated_hours: String,
    #[serde(default)]
    priority: String,
    #[serde(default)]
    due_date: String,
    #[serde(default)]
    taskboard_id: String,
    #[serde(default)]
    status: String,
}

impl From<&Task> for TaskCsvRecord {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            estimated_hours: task
                .estimated_hours
                .map(|hours| hours.to_string())
                .unwrap_or_default(),
            priority: task.priority.as_str().to_string(),
            due_date: task.due_date.clone().unwrap_or_default(),
            taskboard_id: task.taskboard_id.clone().unwrap_or_default(),
            status: task.status.as_str().to_string(),
        }
    }
}

impl TaskCsvRecord {
    fn into_task(self) -> PersistenceResult<Task> {
        let estimated_hours = parse_f64(&self.estimated_hours).map_err(|_| {
            PersistenceError::InvalidData(format!(
                "task {} has non-numeric estimated_hours '{}'",
                self.id, self.estimated_hours
            ))
        })?;
        let priority: Priority = self.priority.parse().unwrap_or(Priority::Unknown);
        let status: TaskStatus = self.status.parse().unwrap_or(TaskStatus::Other);
        Ok(Task {
            id: self.id,
            title: self.title,
            estimated_hours,
            priority,
            due_date: parse_string_option(self.due_date),
            taskboard_id: parse_string_option(self.taskboard_id),
            status,
        })
    }
}

pub fn save_tasks_to_csv<P: AsRef<Path>>(tasks: &[Task], path: P) -> PersistenceResult<()> {
    super::validate_tasks(tasks)?;
    let mut writer = csv::Writer::from_path(path)?;
    for task in tasks {
        writer.serialize(TaskCsvRecord::from(task))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load_tasks_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<Task>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut tasks = Vec::new();
    for record in reader.deserialize::<TaskCsvRecord>() {
        tasks.push(record?.into_task()?);
    }
    super::validate_tasks(&tasks)?;
    Ok(tasks)
}

fn parse_f64(value: &str) -> Result<Option<f64>, std::num::ParseFloatError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Ok(None)
    } else {
        trimmed.parse::<f64>().map(Some)
    }
}

fn parse_string_option(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
