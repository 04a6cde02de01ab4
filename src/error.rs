use thiserror::Error;

/// Reasons a [`SchedulingPolicy`](crate::SchedulingPolicy) is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolicyError {
    #[error("work_hours_per_day must be within (0, 24], got {0}")]
    WorkHoursPerDay(f64),

    #[error("work_days_per_week must be 5, 6 or 7, got {0}")]
    WorkDaysPerWeek(u8),

    #[error("buffer_fraction must be within [0, 1), got {0}")]
    BufferFraction(f64),

    #[error("malformed time of day '{0}' (expected HH:MM)")]
    TimeOfDay(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchedulerError {
    #[error("invalid scheduling policy: {0}")]
    InvalidPolicy(#[from] PolicyError),
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;
