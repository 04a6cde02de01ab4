use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::allocation::AllocationEngine;
use crate::assignment::ScheduledAssignment;
use crate::error::SchedulerResult;
use crate::policy::SchedulingPolicy;
use crate::ranking;
use crate::report::ScheduleReport;
use crate::task::{Task, Taskboard};

/// Everything one scheduling run needs. `now` is supplied by the caller so
/// that runs are reproducible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub taskboards: Vec<Taskboard>,
    #[serde(default)]
    pub policy: SchedulingPolicy,
    pub now: NaiveDateTime,
}

impl ScheduleRequest {
    pub fn new(tasks: Vec<Task>, policy: SchedulingPolicy, now: NaiveDateTime) -> Self {
        Self {
            tasks,
            taskboards: Vec::new(),
            policy,
            now,
        }
    }

    pub fn with_taskboards(mut self, taskboards: Vec<Taskboard>) -> Self {
        self.taskboards = taskboards;
        self
    }
}

/// Result of a scheduling run: ordered assignments plus their report.
/// Recomputed wholesale whenever inputs change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    assignments: Vec<ScheduledAssignment>,
    report: ScheduleReport,
    excluded_count: usize,
}

impl Schedule {
    pub fn build(request: &ScheduleRequest) -> SchedulerResult<Self> {
        request.policy.validate()?;

        let ranked = ranking::rank(&request.tasks);
        let excluded_count = request.tasks.len() - ranked.len();
        let assignments = AllocationEngine::new(&request.policy)
            .with_taskboards(&request.taskboards)
            .allocate(&ranked, request.now)?;
        let report = ScheduleReport::from_assignments(&assignments, &request.policy);

        info!(
            scheduled = report.scheduled_count,
            excluded = excluded_count,
            total_hours = report.total_scheduled_hours,
            days_needed = report.days_needed,
            "schedule built"
        );

        Ok(Self {
            assignments,
            report,
            excluded_count,
        })
    }

    pub fn assignments(&self) -> &[ScheduledAssignment] {
        &self.assignments
    }

    pub fn report(&self) -> &ScheduleReport {
        &self.report
    }

    /// Tasks dropped during selection (terminal, unestimated, bad due date).
    pub fn excluded_count(&self) -> usize {
        self.excluded_count
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn assignments_on(&self, date: NaiveDate) -> impl Iterator<Item = &ScheduledAssignment> {
        self.assignments.iter().filter(move |a| a.date == date)
    }

    /// Flattens the assignments into a dataframe for tabular display.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let rows = &self.assignments;
        let mut columns: Vec<Column> = Vec::with_capacity(9);

        let epoch = unix_epoch()?;
        let dates: Vec<i32> = rows.iter().map(|a| date_to_i32(a.date, epoch)).collect();
        columns.push(
            Series::new(PlSmallStr::from_static("date"), dates)
                .cast(&DataType::Date)?
                .into_column(),
        );

        let starts: Vec<String> = rows.iter().map(|a| a.start_time.to_string()).collect();
        columns.push(Series::new(PlSmallStr::from_static("start"), starts).into_column());

        let ends: Vec<String> = rows.iter().map(|a| a.end_time.to_string()).collect();
        columns.push(Series::new(PlSmallStr::from_static("end"), ends).into_column());

        let ids: Vec<&str> = rows.iter().map(|a| a.task.id.as_str()).collect();
        columns.push(Series::new(PlSmallStr::from_static("task_id"), ids).into_column());

        let titles: Vec<&str> = rows.iter().map(|a| a.task.title.as_str()).collect();
        columns.push(Series::new(PlSmallStr::from_static("title"), titles).into_column());

        let priorities: Vec<&str> = rows.iter().map(|a| a.task.priority.as_str()).collect();
        columns.push(Series::new(PlSmallStr::from_static("priority"), priorities).into_column());

        let estimated: Vec<f64> = rows.iter().map(|a| a.estimated_hours()).collect();
        columns.push(
            Series::new(PlSmallStr::from_static("estimated_hours"), estimated).into_column(),
        );

        let buffered: Vec<f64> = rows.iter().map(|a| a.buffered_hours).collect();
        columns.push(
            Series::new(PlSmallStr::from_static("buffered_hours"), buffered).into_column(),
        );

        let boards: Vec<&str> = rows.iter().map(|a| a.board_name.as_str()).collect();
        columns.push(Series::new(PlSmallStr::from_static("board"), boards).into_column());

        DataFrame::new(columns)
    }
}

/// Runs independent requests (one per user) in parallel. Each run owns its
/// own cursor; results come back in request order.
pub fn schedule_batch(requests: &[ScheduleRequest]) -> Vec<SchedulerResult<Schedule>> {
    requests.par_iter().map(Schedule::build).collect()
}

fn unix_epoch() -> PolarsResult<NaiveDate> {
    NaiveDate::from_ymd_opt(1970, 1, 1)
        .ok_or_else(|| PolarsError::ComputeError("1970-01-01 is not a valid date".into()))
}

/// Days since 1970-01-01, the physical representation of a polars `Date`.
fn date_to_i32(date: NaiveDate, epoch: NaiveDate) -> i32 {
    (date - epoch).num_days() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_convert_to_days_since_epoch() {
        let epoch = unix_epoch().unwrap();
        assert_eq!(date_to_i32(epoch, epoch), 0);
        let date = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        assert_eq!(date_to_i32(date, epoch), 20094);
    }
}
