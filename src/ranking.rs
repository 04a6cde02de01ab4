//! Task selection and ranking.
//!
//! Selection drops everything the allocator cannot place: terminal tasks,
//! tasks without a positive estimate and tasks whose due date does not parse.
//! Ranking is a stable sort on (priority descending, due date ascending with
//! dated tasks first), so ties keep their input order and ranking an already
//! ranked list is a no-op.

use chrono::NaiveDate;
use std::cmp::Ordering;
use tracing::warn;

use crate::task::Task;
use crate::task_validation::check_schedulable;

/// A task that passed selection, with its due date already parsed.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub task: &'a Task,
    pub due_date: Option<NaiveDate>,
}

/// Keeps the tasks that can be scheduled, in input order. Rejected tasks are
/// logged and skipped; one bad record never fails the run.
pub fn select(tasks: &[Task]) -> Vec<Candidate<'_>> {
    tasks
        .iter()
        .filter_map(|task| match check_schedulable(task) {
            Ok(due_date) => Some(Candidate { task, due_date }),
            Err(reason) => {
                warn!(task_id = %task.id, %reason, "excluding task from scheduling");
                None
            }
        })
        .collect()
}

/// Total order used by the allocator: higher priority first, then earlier due
/// date, with undated tasks after dated ones.
pub fn compare(a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
    b.task
        .priority
        .rank()
        .cmp(&a.task.priority.rank())
        .then_with(|| match (a.due_date, b.due_date) {
            (Some(left), Some(right)) => left.cmp(&right),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}

/// Selection followed by a stable sort on [`compare`].
pub fn rank_candidates(tasks: &[Task]) -> Vec<Candidate<'_>> {
    let mut candidates = select(tasks);
    candidates.sort_by(compare);
    candidates
}

pub fn rank(tasks: &[Task]) -> Vec<Task> {
    rank_candidates(tasks)
        .into_iter()
        .map(|candidate| candidate.task.clone())
        .collect()
}
