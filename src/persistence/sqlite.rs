use super::{PersistenceError, PersistenceResult, TaskSnapshot, TaskSource};
use crate::policy::SchedulingPolicy;
use crate::task::{Task, Taskboard};
use rusqlite::{Connection, OptionalExtension, params};
use std::sync::{Mutex, MutexGuard};

/// Task and preference store backed by SQLite. Rows hold JSON payloads; task
/// rows keep their insertion position so loads return tasks in saved order.
pub struct SqliteTaskStore {
    connection: Mutex<Connection>,
}

impl SqliteTaskStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::from_connection(connection)
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(connection: Connection) -> PersistenceResult<Self> {
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS preferences (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                policy_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS taskboards (
                id TEXT PRIMARY KEY,
                board_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS tasks (
                position INTEGER PRIMARY KEY,
                id TEXT NOT NULL UNIQUE,
                task_json TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn lock(&self) -> PersistenceResult<MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| PersistenceError::LockPoisoned)
    }

    /// Replaces everything stored with `snapshot`.
    pub fn save_snapshot(&self, snapshot: &TaskSnapshot) -> PersistenceResult<()> {
        super::validate_snapshot(snapshot)?;
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        Self::save_policy(&tx, snapshot.policy.as_ref())?;
        Self::save_taskboards(&tx, &snapshot.taskboards)?;
        Self::save_tasks(&tx, &snapshot.tasks)?;
        tx.commit()?;
        Ok(())
    }

    fn save_policy(
        tx: &rusqlite::Transaction,
        policy: Option<&SchedulingPolicy>,
    ) -> PersistenceResult<()> {
        tx.execute("DELETE FROM preferences", [])?;
        if let Some(policy) = policy {
            let json = serde_json::to_string(policy)?;
            tx.execute(
                "INSERT INTO preferences (id, policy_json) VALUES (1, ?1)",
                params![json],
            )?;
        }
        Ok(())
    }

    fn save_taskboards(tx: &rusqlite::Transaction, boards: &[Taskboard]) -> PersistenceResult<()> {
        tx.execute("DELETE FROM taskboards", [])?;
        let mut stmt = tx.prepare("INSERT INTO taskboards (id, board_json) VALUES (?1, ?2)")?;
        for board in boards {
            let json = serde_json::to_string(board)?;
            stmt.execute(params![board.id, json])?;
        }
        Ok(())
    }

    fn save_tasks(tx: &rusqlite::Transaction, tasks: &[Task]) -> PersistenceResult<()> {
        tx.execute("DELETE FROM tasks", [])?;
        let mut stmt =
            tx.prepare("INSERT INTO tasks (position, id, task_json) VALUES (?1, ?2, ?3)")?;
        for (position, task) in tasks.iter().enumerate() {
            let json = serde_json::to_string(task)?;
            stmt.execute(params![position as i64, task.id, json])?;
        }
        Ok(())
    }
}

impl TaskSource for SqliteTaskStore {
    fn load_tasks(&self) -> PersistenceResult<Vec<Task>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT task_json FROM tasks ORDER BY position ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut tasks = Vec::new();
        for json in rows {
            let task: Task = serde_json::from_str(&json?)?;
            tasks.push(task);
        }
        super::validate_tasks(&tasks)?;
        Ok(tasks)
    }

    fn load_taskboards(&self) -> PersistenceResult<Vec<Taskboard>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT board_json FROM taskboards ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut boards = Vec::new();
        for json in rows {
            boards.push(serde_json::from_str(&json?)?);
        }
        Ok(boards)
    }

    fn load_policy(&self) -> PersistenceResult<Option<SchedulingPolicy>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT policy_json FROM preferences WHERE id = 1")?;
        let json: Option<String> = stmt.query_row([], |row| row.get(0)).optional()?;
        json.map(|json| serde_json::from_str(&json).map_err(PersistenceError::from))
            .transpose()
    }
}
