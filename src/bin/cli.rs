use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use polars::prelude::{AnyValue, Column, DataFrame};
use std::io::{self, Write};
use task_autoscheduler::{
    Priority, Schedule, ScheduleRequest, SchedulingPolicy, Task, TaskSnapshot, TaskStatus,
    Taskboard, TimeOfDay, load_snapshot_from_json, load_tasks_from_csv, save_snapshot_to_json,
    save_tasks_to_csv,
};

struct Session {
    tasks: Vec<Task>,
    taskboards: Vec<Taskboard>,
    policy: SchedulingPolicy,
    now: NaiveDateTime,
}

impl Session {
    fn request(&self) -> ScheduleRequest {
        ScheduleRequest::new(self.tasks.clone(), self.policy.clone(), self.now)
            .with_taskboards(self.taskboards.clone())
    }

    fn snapshot(&self) -> TaskSnapshot {
        TaskSnapshot {
            policy: Some(self.policy.clone()),
            taskboards: self.taskboards.clone(),
            tasks: self.tasks.clone(),
        }
    }

    fn upsert_task(&mut self, task: Task) {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => *existing = task,
            None => self.tasks.push(task),
        }
    }

    fn find_task_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }
}

fn cell_text(col: &Column, row_idx: usize) -> String {
    match col.get(row_idx) {
        Ok(AnyValue::Null) | Err(_) => String::new(),
        Ok(AnyValue::String(s)) => s.to_string(),
        Ok(AnyValue::Float64(v)) => format!("{v:.2}"),
        Ok(AnyValue::Date(days)) => NaiveDate::from_ymd_opt(1970, 1, 1)
            .map(|epoch| (epoch + Duration::days(days as i64)).to_string())
            .unwrap_or_default(),
        Ok(av) => av.to_string(),
    }
}

fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let cells: Vec<Vec<String>> = (0..df.height())
        .map(|row_idx| columns.iter().map(|col| cell_text(col, row_idx)).collect())
        .collect();

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.len()).collect();
    for row in &cells {
        for (ci, s) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(s.len());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let render_row = |values: &[String]| {
        let mut line = String::from("|");
        for (ci, s) in values.iter().enumerate() {
            line.push(' ');
            line.push_str(s);
            line.push_str(&" ".repeat(widths[ci].saturating_sub(s.len())));
            line.push_str(" |");
        }
        line
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(col_names.as_slice()));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &cells {
        out.push_str(&render_row(row.as_slice()));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_help() {
    println!(
        "Commands:\n  help                                   Show this help\n  tasks                                  List loaded tasks\n  add <id> <priority> <hours> <due|-> <title...>\n                                         Upsert a task (due as YYYY-MM-DD, '-' for none)\n  done <id>                              Mark a task done\n  board <id> <color> <name...>           Upsert a taskboard\n  assign <task_id> <board_id>            Put a task on a board\n  policy show                            Show the scheduling policy\n  policy set <field> <value>             Set hours|days|start|end|buffer\n  holiday <YYYY-MM-DD>                   Add a non-working date\n  now <YYYY-MM-DD> [HH:MM]               Set the scheduling start instant\n  schedule                               Build and show the schedule\n  report                                 Show schedule statistics only\n  load <json|csv> <path>                 Load tasks (json also loads boards and policy)\n  save <json|csv> <path>                 Save tasks (json also saves boards and policy)\n  quit|exit                              Exit"
    );
}

fn print_policy(policy: &SchedulingPolicy) {
    let working_days = policy
        .work_calendar()
        .working_days()
        .iter()
        .map(|wd| wd.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let holidays = policy
        .holidays
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    println!("Work hours per day : {}", policy.work_hours_per_day);
    println!("Work days per week : {}", policy.work_days_per_week);
    println!("Working days       : {}", working_days);
    println!("Work start time    : {}", policy.work_start_time);
    println!("Work end time      : {}", policy.work_end_time);
    println!("Buffer fraction    : {}", policy.buffer_fraction);
    println!("Holidays           : {}", holidays);
}

fn print_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks loaded.");
        return;
    }
    for task in tasks {
        let hours = task
            .estimated_hours
            .map(|h| format!("{h}h"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<10} {:<8} {:>6} {:<12} {:<12} {}",
            task.id,
            task.priority,
            hours,
            task.due_date.as_deref().unwrap_or("-"),
            task.status,
            task.title
        );
    }
}

fn print_summary(schedule: &Schedule) {
    let report = schedule.report();
    println!(
        "Scheduled {} task(s) over {} day(s); {:.1}h estimated, {} day(s) needed.",
        report.scheduled_count, report.days_spanned, report.total_scheduled_hours, report.days_needed
    );
    if schedule.excluded_count() > 0 {
        println!("Excluded {} task(s).", schedule.excluded_count());
    }
}

fn apply_policy_field(
    policy: &SchedulingPolicy,
    field: &str,
    value: &str,
) -> Result<SchedulingPolicy, String> {
    let mut updated = policy.clone();
    match field {
        "hours" => {
            updated.work_hours_per_day = value.parse::<f64>().map_err(|_| "hours must be a number")?
        }
        "days" => {
            updated.work_days_per_week = value.parse::<u8>().map_err(|_| "days must be 5, 6 or 7")?
        }
        "start" => updated.work_start_time = value.parse::<TimeOfDay>().map_err(|e| e.to_string())?,
        "end" => updated.work_end_time = value.parse::<TimeOfDay>().map_err(|e| e.to_string())?,
        "buffer" => {
            updated.buffer_fraction = value.parse::<f64>().map_err(|_| "buffer must be a number")?
        }
        other => return Err(format!("unknown policy field '{other}'")),
    }
    updated.validate().map_err(|e| e.to_string())?;
    Ok(updated)
}

fn parse_now(date_s: &str, time_s: Option<&str>) -> Option<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(date_s, "%Y-%m-%d").ok()?;
    let time = match time_s {
        Some(t) => NaiveTime::parse_from_str(t, "%H:%M").ok()?,
        None => NaiveTime::MIN,
    };
    Some(date.and_time(time))
}

fn run_schedule(session: &Session, show_table: bool) {
    match Schedule::build(&session.request()) {
        Ok(schedule) => {
            if schedule.is_empty() {
                println!("No schedulable tasks.");
            } else if show_table {
                match schedule.to_dataframe() {
                    Ok(df) => println!("{}", render_df_as_text_table(&df)),
                    Err(e) => println!("Error rendering schedule: {}", e),
                }
            }
            print_summary(&schedule);
        }
        Err(e) => println!("Error: {}", e),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let mut session = Session {
        tasks: Vec::new(),
        taskboards: Vec::new(),
        policy: SchedulingPolicy::default(),
        now: chrono::Local::now().naive_local(),
    };

    println!("Task Auto-Scheduler (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "tasks" => print_tasks(&session.tasks),
            "add" => {
                let id_s = parts.next();
                let priority_s = parts.next();
                let hours_s = parts.next();
                let due_s = parts.next();
                let title = parts.collect::<Vec<_>>().join(" ");
                match (id_s, priority_s, hours_s, due_s) {
                    (Some(id), Some(priority_s), Some(hours_s), Some(due_s)) => {
                        let hours: f64 = match hours_s.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid hours");
                                continue;
                            }
                        };
                        let priority: Priority =
                            priority_s.parse().unwrap_or(Priority::Unknown);
                        let mut task = Task::new(id, title, hours).with_priority(priority);
                        if due_s != "-" {
                            task = task.with_due_date(due_s);
                        }
                        session.upsert_task(task);
                        println!("Task {} saved.", id);
                    }
                    _ => println!("Usage: add <id> <priority> <hours> <due|-> <title...>"),
                }
            }
            "done" => match parts.next() {
                Some(id) => match session.find_task_mut(id) {
                    Some(task) => {
                        task.status = TaskStatus::Done;
                        println!("Task {} marked done.", id);
                    }
                    None => println!("Task {} not found.", id),
                },
                None => println!("Usage: done <id>"),
            },
            "board" => {
                let id_s = parts.next();
                let color_s = parts.next();
                let name = parts.collect::<Vec<_>>().join(" ");
                match (id_s, color_s) {
                    (Some(id), Some(color)) if !name.is_empty() => {
                        let board = Taskboard::new(id, name, color);
                        match session.taskboards.iter_mut().find(|b| b.id == board.id) {
                            Some(existing) => *existing = board,
                            None => session.taskboards.push(board),
                        }
                        println!("Board {} saved.", id);
                    }
                    _ => println!("Usage: board <id> <color> <name...>"),
                }
            }
            "assign" => match (parts.next(), parts.next()) {
                (Some(task_id), Some(board_id)) => match session.find_task_mut(task_id) {
                    Some(task) => {
                        task.taskboard_id = Some(board_id.to_string());
                        println!("Task {} assigned to board {}.", task_id, board_id);
                    }
                    None => println!("Task {} not found.", task_id),
                },
                _ => println!("Usage: assign <task_id> <board_id>"),
            },
            "policy" => match parts.next() {
                Some("show") => print_policy(&session.policy),
                Some("set") => match (parts.next(), parts.next()) {
                    (Some(field), Some(value)) => {
                        match apply_policy_field(&session.policy, field, value) {
                            Ok(updated) => {
                                session.policy = updated;
                                println!("Policy updated.");
                            }
                            Err(e) => println!("Invalid policy: {}", e),
                        }
                    }
                    _ => println!("Usage: policy set <field> <value>"),
                },
                _ => println!("Usage: policy <show|set>"),
            },
            "holiday" => match parts.next().map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d")) {
                Some(Ok(date)) => {
                    session.policy = session.policy.clone().with_holidays([date]);
                    println!("Holiday {} added.", date);
                }
                Some(Err(_)) => println!("Invalid date (expected YYYY-MM-DD)"),
                None => println!("Usage: holiday <YYYY-MM-DD>"),
            },
            "now" => match parts.next() {
                Some(date_s) => match parse_now(date_s, parts.next()) {
                    Some(now) => {
                        session.now = now;
                        println!("Scheduling from {}.", now);
                    }
                    None => println!("Invalid instant (expected YYYY-MM-DD [HH:MM])"),
                },
                None => println!("Usage: now <YYYY-MM-DD> [HH:MM]"),
            },
            "schedule" => run_schedule(&session, true),
            "report" => run_schedule(&session, false),
            "load" => match (parts.next(), parts.next()) {
                (Some("json"), Some(path)) => match load_snapshot_from_json(path) {
                    Ok(snapshot) => {
                        session.policy = snapshot.policy.unwrap_or_default();
                        session.taskboards = snapshot.taskboards;
                        session.tasks = snapshot.tasks;
                        println!("Loaded {} task(s) from {}", session.tasks.len(), path);
                    }
                    Err(e) => println!("Error loading JSON: {}", e),
                },
                (Some("csv"), Some(path)) => match load_tasks_from_csv(path) {
                    Ok(tasks) => {
                        session.tasks = tasks;
                        println!("Loaded {} task(s) from {}", session.tasks.len(), path);
                    }
                    Err(e) => println!("Error loading CSV: {}", e),
                },
                _ => println!("Usage: load <json|csv> <path>"),
            },
            "save" => match (parts.next(), parts.next()) {
                (Some("json"), Some(path)) => match save_snapshot_to_json(&session.snapshot(), path) {
                    Ok(()) => println!("Saved {} task(s) to {}", session.tasks.len(), path),
                    Err(e) => println!("Error saving JSON: {}", e),
                },
                (Some("csv"), Some(path)) => match save_tasks_to_csv(&session.tasks, path) {
                    Ok(()) => println!("Saved {} task(s) to {}", session.tasks.len(), path),
                    Err(e) => println!("Error saving CSV: {}", e),
                },
                _ => println!("Usage: save <json|csv> <path>"),
            },
            _ => println!("Unknown command. Type 'help'."),
        }
    }
}
