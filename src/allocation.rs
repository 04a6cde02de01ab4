//! Greedy day-by-day allocation of ranked tasks.
//!
//! Tasks are consumed strictly in rank order. Each one takes its buffered
//! duration from the cursor's current day; a task that does not fit in what
//! is left of the day moves whole to the next working day. Tasks are never
//! split, so a task longer than a working day moves once to a fresh day,
//! sits there alone and overruns the nominal day.

use chrono::NaiveDateTime;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::assignment::ScheduledAssignment;
use crate::cursor::CalendarCursor;
use crate::error::SchedulerResult;
use crate::policy::{SchedulingPolicy, TimeOfDay};
use crate::task::{Task, Taskboard};

const CAPACITY_EPSILON: f64 = 1e-6;

pub struct AllocationEngine<'a> {
    policy: &'a SchedulingPolicy,
    boards: HashMap<&'a str, &'a Taskboard>,
}

impl<'a> AllocationEngine<'a> {
    pub fn new(policy: &'a SchedulingPolicy) -> Self {
        Self {
            policy,
            boards: HashMap::new(),
        }
    }

    /// Boards used to label assignments. Unknown or missing board ids fall
    /// back to [`Taskboard::UNASSIGNED_NAME`] and [`Taskboard::DEFAULT_COLOR`].
    pub fn with_taskboards(mut self, boards: &'a [Taskboard]) -> Self {
        self.boards = boards
            .iter()
            .map(|board| (board.id.as_str(), board))
            .collect();
        self
    }

    /// Places `ranked` on the calendar starting from the date of `now`.
    ///
    /// The policy is validated before anything is placed, so an invalid
    /// policy never yields a partial schedule.
    pub fn allocate(
        &self,
        ranked: &[Task],
        now: NaiveDateTime,
    ) -> SchedulerResult<Vec<ScheduledAssignment>> {
        self.policy.validate()?;

        let capacity = self.policy.work_hours_per_day;
        let mut cursor = CalendarCursor::new(
            self.policy.work_calendar(),
            self.policy.work_start_time,
            now,
        );
        let mut assignments = Vec::with_capacity(ranked.len());

        for task in ranked {
            let Some(estimated) = task
                .estimated_hours
                .filter(|hours| hours.is_finite() && *hours > 0.0)
            else {
                warn!(task_id = %task.id, "skipping ranked task without a positive estimate");
                continue;
            };
            let buffered = self.policy.buffered_hours(estimated);

            cursor.skip_non_working_days_in_place();
            if cursor.hours_used_today() + buffered > capacity + CAPACITY_EPSILON {
                cursor.advance_to_next_working_day();
                cursor.skip_non_working_days_in_place();
                if buffered > capacity + CAPACITY_EPSILON {
                    warn!(
                        task_id = %task.id,
                        buffered_hours = buffered,
                        work_hours_per_day = capacity,
                        "task exceeds a full working day; placing it alone on a fresh day"
                    );
                }
            }

            let (start, end) = cursor.consume(buffered);
            let date = cursor.current_date();
            let start_time = Self::clamp_to_day(start, &task.id);
            let end_time = Self::clamp_to_day(end, &task.id);
            let (board_name, board_color) = self.board_labels(task);

            debug!(
                task_id = %task.id,
                %date,
                start = %start_time,
                end = %end_time,
                buffered_hours = buffered,
                "placed task"
            );

            assignments.push(ScheduledAssignment {
                task: task.clone(),
                date,
                start_time,
                end_time,
                buffered_hours: buffered,
                board_name,
                board_color,
            });
        }

        Ok(assignments)
    }

    fn clamp_to_day(hours: f64, task_id: &str) -> TimeOfDay {
        TimeOfDay::from_hours(hours).unwrap_or_else(|| {
            warn!(task_id, hours, "slot runs past midnight; clamping to 23:59");
            TimeOfDay::last_minute()
        })
    }

    fn board_labels(&self, task: &Task) -> (String, String) {
        match task
            .taskboard_id
            .as_deref()
            .and_then(|id| self.boards.get(id))
        {
            Some(board) => (board.name.clone(), board.color.clone()),
            None => (
                Taskboard::UNASSIGNED_NAME.to_string(),
                Taskboard::DEFAULT_COLOR.to_string(),
            ),
        }
    }
}

/// Allocates without board metadata. See [`AllocationEngine::allocate`].
pub fn allocate(
    ranked: &[Task],
    policy: &SchedulingPolicy,
    now: NaiveDateTime,
) -> SchedulerResult<Vec<ScheduledAssignment>> {
    AllocationEngine::new(policy).allocate(ranked, now)
}
