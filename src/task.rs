use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Deserializes case-insensitively through [`FromStr`], so stored and typed
/// values agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Urgent,
    High,
    #[default]
    Medium,
    Low,
    /// Any value the task store sends that is not one of the four levels.
    Unknown,
}

impl Priority {
    /// Higher ranks schedule first.
    pub fn rank(self) -> u8 {
        match self {
            Priority::Urgent => 4,
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
            Priority::Unknown => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Urgent => "urgent",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
            Priority::Unknown => "unknown",
        }
    }
}

impl FromStr for Priority {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "urgent" => Priority::Urgent,
            "high" => Priority::High,
            "medium" => Priority::Medium,
            "low" => Priority::Low,
            _ => Priority::Unknown,
        })
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or(Priority::Unknown))
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Review,
    Done,
    Completed,
    Other,
}

impl TaskStatus {
    /// `done` and `completed` tasks are never scheduled.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Done | TaskStatus::Completed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Review => "review",
            TaskStatus::Done => "done",
            TaskStatus::Completed => "completed",
            TaskStatus::Other => "other",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "" | "todo" => TaskStatus::Todo,
            "in_progress" | "in-progress" | "inprogress" => TaskStatus::InProgress,
            "review" => TaskStatus::Review,
            "done" => TaskStatus::Done,
            "completed" => TaskStatus::Completed,
            _ => TaskStatus::Other,
        })
    }
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or(TaskStatus::Other))
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A task record as delivered by the task store. The scheduler only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "estimatedHours")]
    pub estimated_hours: Option<f64>,
    #[serde(default)]
    pub priority: Priority,
    /// Raw due date text, `YYYY-MM-DD` or an RFC 3339 timestamp.
    #[serde(default, alias = "dueDate", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, alias = "taskboardId", skip_serializing_if = "Option::is_none")]
    pub taskboard_id: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>, estimated_hours: f64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            estimated_hours: Some(estimated_hours),
            priority: Priority::default(),
            due_date: None,
            taskboard_id: None,
            status: TaskStatus::default(),
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn on_board(mut self, taskboard_id: impl Into<String>) -> Self {
        self.taskboard_id = Some(taskboard_id.into());
        self
    }
}

/// Display metadata for the board a task lives on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taskboard {
    pub id: String,
    pub name: String,
    #[serde(default = "Taskboard::default_color")]
    pub color: String,
}

impl Taskboard {
    pub const DEFAULT_COLOR: &'static str = "#6b7280";
    pub const UNASSIGNED_NAME: &'static str = "Unassigned";

    pub fn new(id: impl Into<String>, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
        }
    }

    fn default_color() -> String {
        Self::DEFAULT_COLOR.to_string()
    }
}
