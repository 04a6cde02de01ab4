#![cfg(feature = "sqlite")]

use chrono::NaiveDate;
use task_autoscheduler::{
    Priority, Schedule, SchedulingPolicy, SqliteTaskStore, Task, TaskSnapshot, TaskSource,
    Taskboard,
};
use tempfile::NamedTempFile;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn snapshot() -> TaskSnapshot {
    TaskSnapshot {
        policy: Some(
            SchedulingPolicy::new(7.0, 7, "10:00", "17:00", 0.0)
                .unwrap()
                .with_holidays([d(2025, 1, 7)]),
        ),
        taskboards: vec![
            Taskboard::new("work", "Work", "#3b82f6"),
            Taskboard::new("home", "Home", "#22c55e"),
        ],
        tasks: vec![
            Task::new("z", "Last id, first row", 3.0).on_board("home"),
            Task::new("a", "Urgent", 5.0)
                .with_priority(Priority::Urgent)
                .on_board("work"),
            Task::new("m", "Dated", 2.0).with_due_date("2025-01-20"),
        ],
    }
}

#[test]
fn sqlite_store_round_trip_snapshot() {
    let file = NamedTempFile::new().unwrap();
    let store = SqliteTaskStore::new(file.path()).unwrap();
    let snapshot = snapshot();

    store.save_snapshot(&snapshot).unwrap();

    assert_eq!(store.load_tasks().unwrap(), snapshot.tasks);
    assert_eq!(store.load_policy().unwrap(), snapshot.policy);
    let boards = store.load_taskboards().unwrap();
    let names: Vec<&str> = boards.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["Home", "Work"]);
}

#[test]
fn sqlite_store_persists_across_connections() {
    let file = NamedTempFile::new().unwrap();
    {
        let store = SqliteTaskStore::new(file.path()).unwrap();
        store.save_snapshot(&snapshot()).unwrap();
    }

    let reopened = SqliteTaskStore::new(file.path()).unwrap();

    assert_eq!(reopened.load_tasks().unwrap().len(), 3);
}

#[test]
fn save_replaces_previous_contents() {
    let store = SqliteTaskStore::in_memory().unwrap();
    store.save_snapshot(&snapshot()).unwrap();

    let smaller = TaskSnapshot {
        policy: None,
        taskboards: Vec::new(),
        tasks: vec![Task::new("only", "Only", 1.0)],
    };
    store.save_snapshot(&smaller).unwrap();

    assert_eq!(store.load_tasks().unwrap(), smaller.tasks);
    assert!(store.load_taskboards().unwrap().is_empty());
    assert_eq!(store.load_policy().unwrap(), None);
}

#[test]
fn empty_store_yields_default_request() {
    let store = SqliteTaskStore::in_memory().unwrap();
    let now = d(2025, 1, 6).and_hms_opt(9, 0, 0).unwrap();

    let request = store.schedule_request(now).unwrap();

    assert!(request.tasks.is_empty());
    assert_eq!(request.policy, SchedulingPolicy::default());
}

#[test]
fn invalid_snapshot_is_not_written() {
    let store = SqliteTaskStore::in_memory().unwrap();
    store.save_snapshot(&snapshot()).unwrap();

    let mut bad = snapshot();
    bad.tasks.push(Task::new("a", "Duplicate", 1.0));
    assert!(store.save_snapshot(&bad).is_err());

    assert_eq!(store.load_tasks().unwrap().len(), 3);
}

#[test]
fn stored_snapshot_schedules_with_stored_policy() {
    let store = SqliteTaskStore::in_memory().unwrap();
    store.save_snapshot(&snapshot()).unwrap();
    let now = d(2025, 1, 6).and_hms_opt(9, 0, 0).unwrap();

    let request = store.schedule_request(now).unwrap();
    let schedule = Schedule::build(&request).unwrap();

    let placed: Vec<(&str, NaiveDate, String)> = schedule
        .assignments()
        .iter()
        .map(|a| (a.task.id.as_str(), a.date, a.start_time.to_string()))
        .collect();
    assert_eq!(
        placed,
        vec![
            ("a", d(2025, 1, 6), "10:00".to_string()),
            ("m", d(2025, 1, 6), "15:00".to_string()),
            ("z", d(2025, 1, 8), "10:00".to_string()),
        ]
    );
    assert_eq!(schedule.assignments()[0].board_name, "Work");
}
