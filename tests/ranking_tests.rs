use task_autoscheduler::ranking::{rank_candidates, select};
use task_autoscheduler::{Priority, Task, TaskStatus, rank};

fn ids(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(|t| t.id.as_str()).collect()
}

#[test]
fn priority_dominates_due_date() {
    let tasks = vec![
        Task::new("low-soon", "Low", 1.0)
            .with_priority(Priority::Low)
            .with_due_date("2025-01-01"),
        Task::new("urgent-late", "Urgent", 1.0)
            .with_priority(Priority::Urgent)
            .with_due_date("2026-01-01"),
        Task::new("high", "High", 1.0).with_priority(Priority::High),
        Task::new("medium", "Medium", 1.0).with_priority(Priority::Medium),
    ];

    assert_eq!(
        ids(&rank(&tasks)),
        vec!["urgent-late", "high", "medium", "low-soon"]
    );
}

#[test]
fn earlier_due_date_first_and_undated_last_within_priority() {
    let tasks = vec![
        Task::new("undated", "U", 1.0).with_priority(Priority::High),
        Task::new("later", "L", 1.0)
            .with_priority(Priority::High)
            .with_due_date("2025-03-01"),
        Task::new("sooner", "S", 1.0)
            .with_priority(Priority::High)
            .with_due_date("2025-02-01T10:00:00Z"),
    ];

    assert_eq!(ids(&rank(&tasks)), vec!["sooner", "later", "undated"]);
}

#[test]
fn ties_keep_input_order() {
    let tasks = vec![
        Task::new("c", "C", 1.0),
        Task::new("a", "A", 1.0),
        Task::new("b", "B", 1.0),
    ];

    assert_eq!(ids(&rank(&tasks)), vec!["c", "a", "b"]);
}

#[test]
fn ranking_is_idempotent() {
    let tasks = vec![
        Task::new("1", "1", 1.0)
            .with_priority(Priority::Low)
            .with_due_date("2025-02-01"),
        Task::new("2", "2", 1.0).with_priority(Priority::Urgent),
        Task::new("3", "3", 1.0)
            .with_priority(Priority::Low)
            .with_due_date("2025-01-01"),
        Task::new("4", "4", 1.0).with_priority(Priority::Unknown),
    ];

    let once = rank(&tasks);
    let twice = rank(&once);

    assert_eq!(once, twice);
}

#[test]
fn unknown_priority_ranks_below_low() {
    let tasks = vec![
        Task::new("odd", "Odd", 1.0).with_priority(Priority::Unknown),
        Task::new("low", "Low", 1.0).with_priority(Priority::Low),
    ];

    assert_eq!(ids(&rank(&tasks)), vec!["low", "odd"]);
}

#[test]
fn selection_drops_unschedulable_tasks() {
    let mut unestimated = Task::new("none", "None", 1.0);
    unestimated.estimated_hours = None;
    let tasks = vec![
        Task::new("done", "Done", 1.0).with_status(TaskStatus::Done),
        Task::new("completed", "Completed", 1.0).with_status(TaskStatus::Completed),
        unestimated,
        Task::new("zero", "Zero", 0.0),
        Task::new("negative", "Negative", -2.0),
        Task::new("bad-date", "Bad", 1.0).with_due_date("someday"),
        Task::new("review", "Review", 1.0).with_status(TaskStatus::Review),
        Task::new("ok", "Ok", 1.0),
    ];

    let kept = select(&tasks);

    let kept_ids: Vec<&str> = kept.iter().map(|c| c.task.id.as_str()).collect();
    assert_eq!(kept_ids, vec!["review", "ok"]);
}

#[test]
fn candidates_carry_parsed_due_date() {
    let tasks = vec![Task::new("a", "A", 1.0).with_due_date("2025-04-01T23:00:00+00:00")];

    let ranked = rank_candidates(&tasks);

    assert_eq!(
        ranked[0].due_date,
        chrono::NaiveDate::from_ymd_opt(2025, 4, 1)
    );
}

#[test]
fn priority_and_status_strings_parse_leniently() {
    assert_eq!("URGENT".parse::<Priority>().unwrap(), Priority::Urgent);
    assert_eq!("critical".parse::<Priority>().unwrap(), Priority::Unknown);
    assert_eq!(
        "in-progress".parse::<TaskStatus>().unwrap(),
        TaskStatus::InProgress
    );

    let task: Task = serde_json::from_str(
        r#"{"id":"x","title":"X","estimatedHours":2,"priority":"blocker","status":"archived"}"#,
    )
    .unwrap();
    assert_eq!(task.priority, Priority::Unknown);
    assert_eq!(task.status, TaskStatus::Other);
    assert_eq!(task.estimated_hours, Some(2.0));
}

#[test]
fn stored_priority_and_status_ignore_case() {
    let tasks: Vec<Task> = serde_json::from_str(
        r#"[
            {"id":"low","title":"L","estimatedHours":1,"priority":"low"},
            {"id":"urgent","title":"U","estimatedHours":1,"priority":"Urgent"},
            {"id":"closed","title":"C","estimatedHours":1,"priority":"HIGH","status":"Done"},
            {"id":"wip","title":"W","estimatedHours":1,"priority":"High","status":"In_Progress"}
        ]"#,
    )
    .unwrap();

    assert_eq!(tasks[1].priority, Priority::Urgent);
    assert_eq!(tasks[2].status, TaskStatus::Done);
    assert_eq!(tasks[3].status, TaskStatus::InProgress);
    assert_eq!(ids(&rank(&tasks)), vec!["urgent", "wip", "low"]);

    for raw in ["Urgent", "HIGH", "medium", "Low", "blocker"] {
        let from_json: Priority = serde_json::from_value(serde_json::json!(raw)).unwrap();
        assert_eq!(from_json, raw.parse::<Priority>().unwrap(), "{raw}");
    }
}
