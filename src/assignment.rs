use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::policy::TimeOfDay;
use crate::task::Task;

/// One task placed on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledAssignment {
    pub task: Task,
    pub date: NaiveDate,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    /// Estimated hours after buffer inflation; the span this slot occupies.
    pub buffered_hours: f64,
    pub board_name: String,
    pub board_color: String,
}

impl ScheduledAssignment {
    pub fn estimated_hours(&self) -> f64 {
        self.task.estimated_hours.unwrap_or_default()
    }

    pub fn duration_minutes(&self) -> u32 {
        self.end_time
            .minutes_since_midnight()
            .saturating_sub(self.start_time.minutes_since_midnight())
    }
}
