mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound, Utc};
use rusqlite::{Connection, Row};

use crate::models::*;

const TODO_COLUMNS: &str = "id, title, content, due_date, completed, created_at, updated_at";

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open the database in the platform data directory, or at
    /// `TODO_DATABASE_PATH` when set.
    pub fn open_default() -> Result<Self> {
        if let Ok(path) = std::env::var("TODO_DATABASE_PATH") {
            return Self::open(PathBuf::from(path));
        }
        let dirs = directories::ProjectDirs::from("", "", "todo-assistant")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        Self::open(dirs.data_dir().join("todos.db"))
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    // ============================================================
    // Todo operations
    // ============================================================

    pub fn create_todo(&self, input: CreateTodoInput) -> Result<Todo> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let now = Utc::now().trunc_subsecs(6);

        conn.execute(
            "INSERT INTO todos (title, content, due_date, completed, created_at, updated_at)
             VALUES (?, ?, ?, 0, ?, ?)",
            (
                &input.title,
                &input.content,
                input.due_date.map(|d| d.to_string()),
                timestamp(now),
                timestamp(now),
            ),
        )?;

        Ok(Todo {
            id: conn.last_insert_rowid(),
            title: input.title,
            content: input.content,
            due_date: input.due_date,
            completed: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// List todos, newest first. `completed` narrows to one completion state.
    pub fn get_todos(&self, completed: Option<bool>) -> Result<Vec<Todo>> {
        let conn = self.conn.lock().expect("database lock poisoned");

        let todos = match completed {
            Some(completed) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {TODO_COLUMNS} FROM todos WHERE completed = ?
                     ORDER BY created_at DESC, id DESC"
                ))?;
                let rows = stmt.query_map([completed as i32], todo_from_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {TODO_COLUMNS} FROM todos ORDER BY created_at DESC, id DESC"
                ))?;
                let rows = stmt.query_map([], todo_from_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };

        Ok(todos)
    }

    pub fn get_todo(&self, id: i64) -> Result<Option<Todo>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = ?"))?;

        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(todo_from_row(row)?)),
            None => Ok(None),
        }
    }

    /// Apply a partial update. Returns `None` when the todo does not exist.
    /// An update with no fields returns the current row unchanged.
    pub fn update_todo(&self, id: i64, input: UpdateTodoInput) -> Result<Option<Todo>> {
        if input.is_empty() {
            return self.get_todo(id);
        }

        let rows = {
            let conn = self.conn.lock().expect("database lock poisoned");
            let mut updates = vec![];
            let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![];

            if let Some(title) = input.title {
                updates.push("title = ?");
                params.push(Box::new(title));
            }
            if let Some(content) = input.content {
                updates.push("content = ?");
                params.push(Box::new(content));
            }
            if let Some(due_date) = input.due_date {
                updates.push("due_date = ?");
                params.push(Box::new(due_date.to_string()));
            }
            if let Some(completed) = input.completed {
                updates.push("completed = ?");
                params.push(Box::new(completed as i32));
            }

            updates.push("updated_at = ?");
            params.push(Box::new(timestamp(Utc::now())));
            params.push(Box::new(id));

            let sql = format!("UPDATE todos SET {} WHERE id = ?", updates.join(", "));
            let params_ref: Vec<&dyn rusqlite::ToSql> =
                params.iter().map(|p| p.as_ref()).collect();
            conn.execute(&sql, params_ref.as_slice())?
        };

        if rows == 0 {
            return Ok(None);
        }
        self.get_todo(id)
    }

    pub fn delete_todo(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM todos WHERE id = ?", [id])?;
        Ok(rows > 0)
    }

    /// Substring search over title and content, newest first.
    pub fn search_todos(&self, query: &str) -> Result<Vec<Todo>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let pattern = format!("%{}%", escape_like(query));
        let mut stmt = conn.prepare(&format!(
            "SELECT {TODO_COLUMNS} FROM todos
             WHERE title LIKE ?1 ESCAPE '\\' OR content LIKE ?1 ESCAPE '\\'
             ORDER BY created_at DESC, id DESC"
        ))?;

        let todos = stmt
            .query_map([pattern], todo_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(todos)
    }

    pub fn mark_completed(&self, id: i64) -> Result<Option<Todo>> {
        self.update_todo(id, UpdateTodoInput::completed())
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

fn todo_from_row(row: &Row<'_>) -> rusqlite::Result<Todo> {
    Ok(Todo {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        due_date: row.get::<_, Option<String>>(3)?.and_then(parse_date),
        completed: row.get::<_, i32>(4)? != 0,
        created_at: parse_datetime(row.get::<_, String>(5)?),
        updated_at: parse_datetime(row.get::<_, String>(6)?),
    })
}

fn escape_like(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Fixed-width RFC 3339 so lexical order in SQLite matches time order.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_date(s: String) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

fn parse_datetime(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
