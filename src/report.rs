use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::assignment::ScheduledAssignment;
use crate::policy::SchedulingPolicy;

/// Read-only statistics over a finished allocation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScheduleReport {
    /// Sum of unbuffered estimates, the number users see.
    pub total_scheduled_hours: f64,
    pub total_buffered_hours: f64,
    pub scheduled_count: usize,
    /// `ceil(total_scheduled_hours / work_hours_per_day)`.
    pub days_needed: u32,
    /// Distinct calendar dates that received at least one task.
    pub days_spanned: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_date: Option<NaiveDate>,
}

impl ScheduleReport {
    pub fn from_assignments(assignments: &[ScheduledAssignment], policy: &SchedulingPolicy) -> Self {
        let total_scheduled_hours: f64 = assignments.iter().map(|a| a.estimated_hours()).sum();
        let total_buffered_hours: f64 = assignments.iter().map(|a| a.buffered_hours).sum();
        let dates: BTreeSet<NaiveDate> = assignments.iter().map(|a| a.date).collect();

        let days_needed = if total_scheduled_hours > 0.0 && policy.work_hours_per_day > 0.0 {
            (total_scheduled_hours / policy.work_hours_per_day).ceil() as u32
        } else {
            0
        };

        Self {
            total_scheduled_hours,
            total_buffered_hours,
            scheduled_count: assignments.len(),
            days_needed,
            days_spanned: dates.len(),
            first_date: dates.first().copied(),
            last_date: dates.last().copied(),
        }
    }
}
