use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use thiserror::Error;

use crate::models::{
    Activity, ActivityPage, Board, List, NewTask, Priority, TargetType, Task, TaskPatch, User,
    avatar_url,
};
use crate::sync::{ChangeKind, SyncChannel};
use crate::utils::{new_id, now_millis};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Failed to create database directory: {0}")]
    Directory(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Task not found: {0}")]
    TaskNotFound(String),
}

/// Sole authority over the persisted board data. Every mutation applies as a
/// single logical read-modify-write, appends an Activity record when a
/// session user exists, and publishes its category on the sync channel after
/// committing.
pub struct BoardStore {
    conn: Connection,
    sync: SyncChannel,
}

impl BoardStore {
    /// Open (or create) the database at `path` and seed default data
    pub fn open(path: &str, sync: SyncChannel) -> Result<Self, StoreError> {
        let db_path = PathBuf::from(path);

        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StoreError::Directory(e.to_string()))?;
            }
        }

        let conn = Connection::open(&db_path)?;
        Self::from_connection(conn, sync)
    }

    /// Open an in-memory database (used by tests)
    pub fn open_in_memory(sync: SyncChannel) -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, sync)
    }

    fn from_connection(conn: Connection, sync: SyncChannel) -> Result<Self, StoreError> {
        let store = BoardStore { conn, sync };
        store.initialize_schema()?;
        store.seed_default_data()?;
        Ok(store)
    }

    /// The channel this store publishes change notifications on
    pub fn sync_channel(&self) -> &SyncChannel {
        &self.sync
    }

    /// Register a listener for change notifications. Dropping the receiver
    /// unregisters it.
    pub fn subscribe(&self) -> Receiver<ChangeKind> {
        self.sync.subscribe()
    }

    /// Initialize the database schema (tables and indexes)
    fn initialize_schema(&self) -> Result<(), StoreError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL,
                email       TEXT NOT NULL,
                avatar      TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS boards (
                id          TEXT PRIMARY KEY,
                title       TEXT NOT NULL,
                owner_id    TEXT NOT NULL,
                created_at  INTEGER NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS lists (
                id          TEXT PRIMARY KEY,
                title       TEXT NOT NULL,
                board_id    TEXT NOT NULL,
                \"order\"   INTEGER NOT NULL DEFAULT 0
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS tasks (
                id          TEXT PRIMARY KEY,
                title       TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                assignee_id TEXT,
                list_id     TEXT NOT NULL,
                board_id    TEXT NOT NULL,
                priority    TEXT NOT NULL DEFAULT 'medium',
                \"order\"   INTEGER NOT NULL DEFAULT 0,
                created_at  INTEGER NOT NULL,
                updated_at  INTEGER NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS activities (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL,
                user_name   TEXT NOT NULL,
                action      TEXT NOT NULL,
                target_id   TEXT NOT NULL,
                target_type TEXT NOT NULL,
                timestamp   INTEGER NOT NULL
            )",
            [],
        )?;

        // Single-row table holding the current session, if any
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS session (
                id          INTEGER PRIMARY KEY CHECK (id = 1),
                user_id     TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_lists_board_id ON lists(board_id)",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_tasks_board_id ON tasks(board_id)",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_tasks_list_id ON tasks(list_id)",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_activities_timestamp ON activities(timestamp)",
            [],
        )?;

        Ok(())
    }

    /// Seed the user directory and a demo board on first run
    fn seed_default_data(&self) -> Result<(), StoreError> {
        let user_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        if user_count == 0 {
            let seeds = [
                ("u1", "Sreesanth Osuri", "sreesanth@hintro.com", "Sreesanth"),
                ("u2", "Sarah Chen", "sarah@example.com", "Sarah"),
                ("u3", "James Miller", "james@example.com", "James"),
            ];
            for (id, name, email, avatar_seed) in seeds {
                self.conn.execute(
                    "INSERT INTO users (id, name, email, avatar) VALUES (?1, ?2, ?3, ?4)",
                    rusqlite::params![id, name, email, avatar_url(avatar_seed)],
                )?;
            }
        }

        let board_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM boards", [], |row| row.get(0))?;
        if board_count == 0 {
            let now = now_millis();
            let tx = self.conn.unchecked_transaction()?;
            tx.execute(
                "INSERT INTO boards (id, title, owner_id, created_at) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params!["b1", "Enterprise Roadmap 2025", "u1", now],
            )?;
            for (id, title, order) in [("l1", "Backlog", 0), ("l2", "In Review", 1), ("l3", "Deployed", 2)] {
                tx.execute(
                    "INSERT INTO lists (id, title, board_id, \"order\") VALUES (?1, ?2, 'b1', ?3)",
                    rusqlite::params![id, title, order],
                )?;
            }
            tx.execute(
                "INSERT INTO tasks (id, title, description, assignee_id, list_id, board_id, priority, \"order\", created_at, updated_at)
                 VALUES ('t1', 'Architecture Review', 'Evaluate system scalability for 1M concurrent users.', 'u1', 'l1', 'b1', 'high', 0, ?1, ?1)",
                rusqlite::params![now],
            )?;
            tx.execute(
                "INSERT INTO tasks (id, title, description, assignee_id, list_id, board_id, priority, \"order\", created_at, updated_at)
                 VALUES ('t2', 'Frontend UI Audit', 'Ensure WCAG 2.1 compliance across all modules.', 'u2', 'l2', 'b1', 'medium', 0, ?1, ?1)",
                rusqlite::params![now],
            )?;
            tx.commit()?;
        }

        Ok(())
    }

    // ----- session -------------------------------------------------------

    /// The session's user, if logged in. No side effects.
    pub fn current_user(&self) -> Result<Option<User>, StoreError> {
        let result = self.conn.query_row(
            "SELECT u.id, u.name, u.email, u.avatar
             FROM session s JOIN users u ON u.id = s.user_id
             WHERE s.id = 1",
            [],
            Self::row_to_user,
        );

        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StoreError::from(e)),
        }
    }

    /// Resolve a user by exact email match, falling back to the first seeded
    /// user, and establish a session. Always succeeds.
    pub fn login(&self, email: &str) -> Result<User, StoreError> {
        let user = match self.user_by_email(email)? {
            Some(user) => user,
            None => self.first_user()?,
        };
        self.set_session(&user.id)?;
        Ok(user)
    }

    /// Create a fresh user (no email uniqueness check) and establish a session
    pub fn signup(&self, name: &str, email: &str) -> Result<User, StoreError> {
        let user = User::new(name.to_string(), email.to_string());
        self.conn.execute(
            "INSERT INTO users (id, name, email, avatar) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![user.id, user.name, user.email, user.avatar],
        )?;
        self.set_session(&user.id)?;
        Ok(user)
    }

    /// Clear the session. Idempotent.
    pub fn logout(&self) -> Result<(), StoreError> {
        self.conn.execute("DELETE FROM session WHERE id = 1", [])?;
        Ok(())
    }

    fn set_session(&self, user_id: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO session (id, user_id) VALUES (1, ?1)
             ON CONFLICT(id) DO UPDATE SET user_id = excluded.user_id",
            rusqlite::params![user_id],
        )?;
        Ok(())
    }

    // ----- users ----------------------------------------------------------

    fn row_to_user(row: &rusqlite::Row) -> Result<User, rusqlite::Error> {
        Ok(User {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            avatar: row.get(3)?,
        })
    }

    /// All known users, insertion order
    pub fn users(&self) -> Result<Vec<User>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, email, avatar FROM users ORDER BY rowid ASC")?;
        let users = stmt
            .query_map([], Self::row_to_user)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let result = self.conn.query_row(
            "SELECT id, name, email, avatar FROM users WHERE email = ?1 ORDER BY rowid ASC LIMIT 1",
            rusqlite::params![email],
            Self::row_to_user,
        );

        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StoreError::from(e)),
        }
    }

    fn user_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        let result = self.conn.query_row(
            "SELECT id, name, email, avatar FROM users WHERE id = ?1",
            rusqlite::params![id],
            Self::row_to_user,
        );

        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StoreError::from(e)),
        }
    }

    fn first_user(&self) -> Result<User, StoreError> {
        self.conn
            .query_row(
                "SELECT id, name, email, avatar FROM users ORDER BY rowid ASC LIMIT 1",
                [],
                Self::row_to_user,
            )
            .map_err(StoreError::from)
    }

    // ----- boards and lists ----------------------------------------------

    fn row_to_board(row: &rusqlite::Row) -> Result<Board, rusqlite::Error> {
        Ok(Board {
            id: row.get(0)?,
            title: row.get(1)?,
            owner_id: row.get(2)?,
            created_at: row.get(3)?,
        })
    }

    /// All boards, insertion order
    pub fn boards(&self) -> Result<Vec<Board>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title, owner_id, created_at FROM boards ORDER BY rowid ASC")?;
        let boards = stmt
            .query_map([], Self::row_to_board)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(boards)
    }

    /// Create a board owned by the session user (or the default owner when
    /// logged out), along with its three starter lists.
    pub fn create_board(&self, title: &str) -> Result<Board, StoreError> {
        let owner_id = self
            .current_user()?
            .map(|u| u.id)
            .unwrap_or_else(|| "u1".to_string());
        let board = Board::new(title.to_string(), owner_id);

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO boards (id, title, owner_id, created_at) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![board.id, board.title, board.owner_id, board.created_at],
        )?;
        for (title, order) in [("To Do", 0i64), ("Doing", 1), ("Done", 2)] {
            let list = List::new(title.to_string(), board.id.clone(), order);
            tx.execute(
                "INSERT INTO lists (id, title, board_id, \"order\") VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![list.id, list.title, list.board_id, list.order],
            )?;
        }
        tx.commit()?;

        self.record_activity(
            &format!("created board \"{}\"", board.title),
            &board.id,
            TargetType::Board,
        )?;
        self.sync.publish(ChangeKind::BoardsUpdated);
        Ok(board)
    }

    fn row_to_list(row: &rusqlite::Row) -> Result<List, rusqlite::Error> {
        Ok(List {
            id: row.get(0)?,
            title: row.get(1)?,
            board_id: row.get(2)?,
            order: row.get(3)?,
        })
    }

    /// Lists of a board, ascending by order
    pub fn lists(&self, board_id: &str) -> Result<Vec<List>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, board_id, \"order\"
             FROM lists WHERE board_id = ?1 ORDER BY \"order\" ASC, rowid ASC",
        )?;
        let lists = stmt
            .query_map(rusqlite::params![board_id], Self::row_to_list)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(lists)
    }

    fn list_board_id(&self, list_id: &str) -> Result<Option<String>, StoreError> {
        let result = self.conn.query_row(
            "SELECT board_id FROM lists WHERE id = ?1",
            rusqlite::params![list_id],
            |row| row.get(0),
        );

        match result {
            Ok(board_id) => Ok(Some(board_id)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StoreError::from(e)),
        }
    }

    // ----- tasks ----------------------------------------------------------

    fn row_to_task(row: &rusqlite::Row) -> Result<Task, rusqlite::Error> {
        let priority: Priority = row.get::<_, String>(6)?.parse().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
        })?;
        Ok(Task {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            assignee_id: row.get(3)?,
            list_id: row.get(4)?,
            board_id: row.get(5)?,
            priority,
            order: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }

    const TASK_COLUMNS: &str =
        "id, title, description, assignee_id, list_id, board_id, priority, \"order\", created_at, updated_at";

    /// Tasks of a board, ascending by order
    pub fn tasks(&self, board_id: &str) -> Result<Vec<Task>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM tasks WHERE board_id = ?1 ORDER BY \"order\" ASC, rowid ASC",
            Self::TASK_COLUMNS
        ))?;
        let tasks = stmt
            .query_map(rusqlite::params![board_id], Self::row_to_task)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    fn find_task(&self, task_id: &str) -> Result<Option<Task>, StoreError> {
        let result = self.conn.query_row(
            &format!("SELECT {} FROM tasks WHERE id = ?1", Self::TASK_COLUMNS),
            rusqlite::params![task_id],
            Self::row_to_task,
        );

        match result {
            Ok(task) => Ok(Some(task)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StoreError::from(e)),
        }
    }

    /// Create a task at the end of its list. `list_id` and `board_id` are
    /// required; title and priority fall back to defaults.
    pub fn create_task(&self, new: NewTask) -> Result<Task, StoreError> {
        let list_id = new
            .list_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| StoreError::Validation("listId is required".to_string()))?;
        let board_id = new
            .board_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| StoreError::Validation("boardId is required".to_string()))?;

        let order: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM tasks WHERE list_id = ?1",
            rusqlite::params![list_id],
            |row| row.get(0),
        )?;

        let now = now_millis();
        let task = Task {
            id: new_id("t"),
            title: new
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "New Task".to_string()),
            description: new.description.unwrap_or_default(),
            assignee_id: new.assignee_id,
            list_id,
            board_id,
            priority: new.priority.unwrap_or_default(),
            order,
            created_at: now,
            updated_at: now,
        };

        self.conn.execute(
            "INSERT INTO tasks (id, title, description, assignee_id, list_id, board_id, priority, \"order\", created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            rusqlite::params![
                task.id,
                task.title,
                task.description,
                task.assignee_id,
                task.list_id,
                task.board_id,
                task.priority.as_str(),
                task.order,
                task.created_at,
                task.updated_at
            ],
        )?;

        self.record_activity("created", &task.id, TargetType::Task)?;
        self.sync.publish(ChangeKind::TasksUpdated);
        Ok(task)
    }

    /// Merge a patch over an existing task. Fails with `TaskNotFound` for an
    /// unknown id and leaves the collection untouched.
    pub fn update_task(&self, task_id: &str, patch: TaskPatch) -> Result<Task, StoreError> {
        let old = self
            .find_task(task_id)?
            .ok_or_else(|| StoreError::TaskNotFound(task_id.to_string()))?;

        let assignee_changed = patch
            .assignee_id
            .as_ref()
            .is_some_and(|a| *a != old.assignee_id);
        let list_changed = patch.list_id.as_ref().is_some_and(|l| *l != old.list_id);

        let updated = Task {
            id: old.id.clone(),
            title: patch.title.unwrap_or_else(|| old.title.clone()),
            description: patch.description.unwrap_or_else(|| old.description.clone()),
            assignee_id: patch.assignee_id.unwrap_or_else(|| old.assignee_id.clone()),
            list_id: patch.list_id.unwrap_or_else(|| old.list_id.clone()),
            board_id: old.board_id.clone(),
            priority: patch.priority.unwrap_or(old.priority),
            order: patch.order.unwrap_or(old.order),
            created_at: old.created_at,
            updated_at: now_millis(),
        };

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE tasks SET title = ?1, description = ?2, assignee_id = ?3, list_id = ?4,
             priority = ?5, \"order\" = ?6, updated_at = ?7 WHERE id = ?8",
            rusqlite::params![
                updated.title,
                updated.description,
                updated.assignee_id,
                updated.list_id,
                updated.priority.as_str(),
                updated.order,
                updated.updated_at,
                updated.id
            ],
        )?;
        tx.commit()?;

        // Activity message picks the most significant change, in priority
        // order: assignee, then list, then a generic update.
        let action = if assignee_changed {
            let assignee_name = match updated.assignee_id.as_deref() {
                Some(id) => self.user_by_id(id)?.map(|u| u.name),
                None => None,
            };
            format!(
                "assigned \"{}\" to {}",
                old.title,
                assignee_name.as_deref().unwrap_or("Unassigned")
            )
        } else if list_changed {
            format!("moved \"{}\" across lists", old.title)
        } else {
            format!("updated \"{}\"", old.title)
        };
        self.record_activity(&action, task_id, TargetType::Task)?;

        self.sync.publish(ChangeKind::TasksUpdated);
        Ok(updated)
    }

    /// Delete a task and renumber its surviving siblings. Deleting an
    /// unknown id is a silent no-op (but still notifies, as the original
    /// backend did).
    pub fn delete_task(&self, task_id: &str) -> Result<(), StoreError> {
        if let Some(task) = self.find_task(task_id)? {
            let tx = self.conn.unchecked_transaction()?;
            tx.execute("DELETE FROM tasks WHERE id = ?1", rusqlite::params![task_id])?;
            Self::renumber_list(&tx, &task.list_id)?;
            tx.commit()?;

            self.record_activity(
                &format!("deleted \"{}\"", task.title),
                task_id,
                TargetType::Task,
            )?;
        }
        self.sync.publish(ChangeKind::TasksUpdated);
        Ok(())
    }

    /// Move a task to `target_list_id` at position `target_order` (clamped to
    /// the list bounds), renumbering both the target list and, on a
    /// cross-list move, the source list. Unknown ids are a silent no-op.
    pub fn move_task(
        &self,
        task_id: &str,
        target_list_id: &str,
        target_order: i64,
    ) -> Result<(), StoreError> {
        let Some(task) = self.find_task(task_id)? else {
            return Ok(());
        };

        // A list of another board adopts the task into that board
        let board_id = self
            .list_board_id(target_list_id)?
            .unwrap_or_else(|| task.board_id.clone());

        let tx = self.conn.unchecked_transaction()?;

        let mut stmt = tx.prepare(
            "SELECT id FROM tasks WHERE list_id = ?1 AND id != ?2 ORDER BY \"order\" ASC, rowid ASC",
        )?;
        let mut ids: Vec<String> = stmt
            .query_map(rusqlite::params![target_list_id, task_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);

        let position = target_order.clamp(0, ids.len() as i64) as usize;
        ids.insert(position, task_id.to_string());

        tx.execute(
            "UPDATE tasks SET list_id = ?1, board_id = ?2, updated_at = ?3 WHERE id = ?4",
            rusqlite::params![target_list_id, board_id, now_millis(), task_id],
        )?;
        for (order, id) in ids.iter().enumerate() {
            tx.execute(
                "UPDATE tasks SET \"order\" = ?1 WHERE id = ?2",
                rusqlite::params![order as i64, id],
            )?;
        }
        if task.list_id != target_list_id {
            Self::renumber_list(&tx, &task.list_id)?;
        }
        tx.commit()?;

        let action = if task.list_id != target_list_id {
            format!("moved \"{}\" across lists", task.title)
        } else {
            format!("reordered \"{}\"", task.title)
        };
        self.record_activity(&action, task_id, TargetType::Task)?;

        self.sync.publish(ChangeKind::TasksUpdated);
        Ok(())
    }

    /// Rewrite a list's task orders to the contiguous range 0..n-1
    fn renumber_list(conn: &Connection, list_id: &str) -> Result<(), StoreError> {
        let mut stmt = conn.prepare(
            "SELECT id FROM tasks WHERE list_id = ?1 ORDER BY \"order\" ASC, rowid ASC",
        )?;
        let ids: Vec<String> = stmt
            .query_map(rusqlite::params![list_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        for (order, id) in ids.iter().enumerate() {
            conn.execute(
                "UPDATE tasks SET \"order\" = ?1 WHERE id = ?2",
                rusqlite::params![order as i64, id],
            )?;
        }
        Ok(())
    }

    // ----- activity feed --------------------------------------------------

    fn row_to_activity(row: &rusqlite::Row) -> Result<Activity, rusqlite::Error> {
        let target_type: TargetType = row.get::<_, String>(5)?.parse().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?;
        Ok(Activity {
            id: row.get(0)?,
            user_id: row.get(1)?,
            user_name: row.get(2)?,
            action: row.get(3)?,
            target_id: row.get(4)?,
            target_type,
            timestamp: row.get(6)?,
        })
    }

    /// One page of the newest-first feed. `page` below 1 clamps to 1;
    /// a non-positive `page_size` is rejected.
    pub fn activities(&self, page: i64, page_size: i64) -> Result<ActivityPage, StoreError> {
        if page_size < 1 {
            return Err(StoreError::Validation(
                "pageSize must be positive".to_string(),
            ));
        }
        let page = page.max(1);

        let total: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM activities", [], |row| row.get(0))?;

        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, user_name, action, target_id, target_type, timestamp
             FROM activities ORDER BY timestamp DESC, rowid DESC LIMIT ?1 OFFSET ?2",
        )?;
        let items = stmt
            .query_map(
                rusqlite::params![page_size, (page - 1) * page_size],
                Self::row_to_activity,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ActivityPage { items, total })
    }

    /// Append an activity entry attributed to the session user, trimming the
    /// log to the newest 100 entries. Skipped when logged out.
    fn record_activity(
        &self,
        action: &str,
        target_id: &str,
        target_type: TargetType,
    ) -> Result<(), StoreError> {
        let Some(user) = self.current_user()? else {
            return Ok(());
        };

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO activities (id, user_id, user_name, action, target_id, target_type, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                new_id("act"),
                user.id,
                user.name,
                action,
                target_id,
                target_type.as_str(),
                now_millis()
            ],
        )?;
        tx.execute(
            "DELETE FROM activities WHERE rowid NOT IN
             (SELECT rowid FROM activities ORDER BY timestamp DESC, rowid DESC LIMIT 100)",
            [],
        )?;
        tx.commit()?;

        self.sync.publish(ChangeKind::ActivityUpdated);
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
