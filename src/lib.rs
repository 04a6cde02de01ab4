pub mod allocation;
pub mod assignment;
pub mod calendar;
pub mod cursor;
pub mod error;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod persistence;
pub mod policy;
pub mod ranking;
pub mod report;
pub mod schedule;
pub mod task;
pub(crate) mod task_validation;

pub use allocation::{AllocationEngine, allocate};
pub use assignment::ScheduledAssignment;
pub use calendar::WorkCalendar;
pub use cursor::CalendarCursor;
pub use error::{PolicyError, SchedulerError, SchedulerResult};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteTaskStore;
pub use persistence::{
    PersistenceError, TaskSnapshot, TaskSource, load_snapshot_from_json, load_tasks_from_csv,
    policy_or_default, save_snapshot_to_json, save_tasks_to_csv,
};
pub use policy::{SchedulingPolicy, TimeOfDay};
pub use ranking::rank;
pub use report::ScheduleReport;
pub use schedule::{Schedule, ScheduleRequest, schedule_batch};
pub use task::{Priority, Task, TaskStatus, Taskboard};
pub use task_validation::TaskValidationError;
