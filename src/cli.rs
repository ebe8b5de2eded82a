use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::models::{NewTask, Priority, TaskPatch};
use crate::store::{BoardStore, StoreError};
use crate::utils::format_millis;

#[derive(Parser)]
#[command(name = "hintro")]
#[command(about = "Kanban-style task board - boards, lists, tasks and an activity feed")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Use development mode (uses separate dev config/database)
    #[arg(long)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in by email (falls back to the first seeded user)
    Login {
        /// Email address
        email: String,
    },
    /// Create a new account and log in
    Signup {
        /// Display name
        name: String,
        /// Email address
        email: String,
    },
    /// Clear the current session
    Logout,
    /// Show the current session user
    Whoami,
    /// List all known users
    Users {
        /// Emit JSON instead of plain text
        #[arg(long)]
        json: bool,
    },
    /// List all boards
    Boards {
        /// Emit JSON instead of plain text
        #[arg(long)]
        json: bool,
    },
    /// Create a board with its three starter lists
    CreateBoard {
        /// Board title
        title: String,
    },
    /// Show the lists of a board
    Lists {
        /// Board id
        board: String,
        /// Emit JSON instead of plain text
        #[arg(long)]
        json: bool,
    },
    /// Show the tasks of a board, grouped by list order
    Tasks {
        /// Board id
        board: String,
        /// Emit JSON instead of plain text
        #[arg(long)]
        json: bool,
    },
    /// Add a task to the end of a list
    AddTask {
        /// Task title
        title: String,
        /// Target list id
        #[arg(long)]
        list: String,
        /// Target board id
        #[arg(long)]
        board: String,
        /// Priority (low, medium, high)
        #[arg(long)]
        priority: Option<String>,
        /// Assignee user id
        #[arg(long)]
        assignee: Option<String>,
        /// Task description
        #[arg(long)]
        description: Option<String>,
    },
    /// Edit fields of an existing task
    EditTask {
        /// Task id
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// New priority (low, medium, high)
        #[arg(long)]
        priority: Option<String>,
        /// Assign to a user id
        #[arg(long, conflicts_with = "unassign")]
        assignee: Option<String>,
        /// Remove the current assignee
        #[arg(long)]
        unassign: bool,
        /// Move to a list id
        #[arg(long)]
        list: Option<String>,
    },
    /// Delete a task (no-op if it does not exist)
    DelTask {
        /// Task id
        id: String,
    },
    /// Move a task to a position within a list
    MoveTask {
        /// Task id
        id: String,
        /// Target list id
        #[arg(long)]
        list: String,
        /// Zero-based position in the target list (clamped to its bounds)
        #[arg(long)]
        position: i64,
    },
    /// Show the activity feed, newest first
    Activity {
        /// Page number (1-based)
        #[arg(long)]
        page: Option<i64>,
        /// Entries per page (defaults to the configured page size)
        #[arg(long)]
        page_size: Option<i64>,
        /// Emit JSON instead of plain text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),
    #[error("Invalid priority '{0}' (expected low, medium or high)")]
    InvalidPriority(String),
    #[error("Title cannot be empty")]
    EmptyTitle,
    #[error("Failed to render JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

fn parse_priority(value: Option<String>) -> Result<Option<Priority>, CliError> {
    match value {
        Some(s) => s
            .parse::<Priority>()
            .map(Some)
            .map_err(|_| CliError::InvalidPriority(s)),
        None => Ok(None),
    }
}

/// Handle the login command
pub fn handle_login(email: String, db: &BoardStore) -> Result<(), CliError> {
    let user = db.login(&email)?;
    println!("Logged in as {} <{}>", user.name, user.email);
    Ok(())
}

/// Handle the signup command
pub fn handle_signup(name: String, email: String, db: &BoardStore) -> Result<(), CliError> {
    let user = db.signup(&name, &email)?;
    println!("Account created for {} (ID: {})", user.name, user.id);
    Ok(())
}

/// Handle the logout command
pub fn handle_logout(db: &BoardStore) -> Result<(), CliError> {
    db.logout()?;
    println!("Logged out");
    Ok(())
}

/// Handle the whoami command
pub fn handle_whoami(db: &BoardStore) -> Result<(), CliError> {
    match db.current_user()? {
        Some(user) => println!("{} <{}> (ID: {})", user.name, user.email, user.id),
        None => println!("Not logged in"),
    }
    Ok(())
}

/// Handle the users command
pub fn handle_users(json: bool, db: &BoardStore) -> Result<(), CliError> {
    let users = db.users()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&users)?);
        return Ok(());
    }
    for user in users {
        println!("{}  {} <{}>", user.id, user.name, user.email);
    }
    Ok(())
}

/// Handle the boards command
pub fn handle_boards(json: bool, db: &BoardStore) -> Result<(), CliError> {
    let boards = db.boards()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&boards)?);
        return Ok(());
    }
    for board in boards {
        println!(
            "{}  {} (owner: {}, created: {})",
            board.id,
            board.title,
            board.owner_id,
            format_millis(board.created_at)
        );
    }
    Ok(())
}

/// Handle the create-board command. The empty-title guard lives here, on the
/// caller side, not in the store.
pub fn handle_create_board(title: String, db: &BoardStore) -> Result<(), CliError> {
    if title.trim().is_empty() {
        return Err(CliError::EmptyTitle);
    }
    let board = db.create_board(&title)?;
    println!("Board created successfully (ID: {})", board.id);
    Ok(())
}

/// Handle the lists command
pub fn handle_lists(board: String, json: bool, db: &BoardStore) -> Result<(), CliError> {
    let lists = db.lists(&board)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&lists)?);
        return Ok(());
    }
    for list in lists {
        println!("{}  [{}] {}", list.id, list.order, list.title);
    }
    Ok(())
}

/// Handle the tasks command
pub fn handle_tasks(board: String, json: bool, db: &BoardStore) -> Result<(), CliError> {
    let tasks = db.tasks(&board)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&tasks)?);
        return Ok(());
    }
    for task in tasks {
        let assignee = task.assignee_id.as_deref().unwrap_or("-");
        println!(
            "{}  [{}:{}] {} ({}, assignee: {})",
            task.id, task.list_id, task.order, task.title, task.priority, assignee
        );
    }
    Ok(())
}

/// Handle the add-task command
pub fn handle_add_task(
    title: String,
    list: String,
    board: String,
    priority: Option<String>,
    assignee: Option<String>,
    description: Option<String>,
    db: &BoardStore,
) -> Result<(), CliError> {
    let priority = parse_priority(priority)?;
    let task = db.create_task(NewTask {
        title: Some(title),
        description,
        list_id: Some(list),
        board_id: Some(board),
        priority,
        assignee_id: assignee,
    })?;
    println!("Task created successfully (ID: {})", task.id);
    Ok(())
}

/// Handle the edit-task command
pub fn handle_edit_task(
    id: String,
    title: Option<String>,
    description: Option<String>,
    priority: Option<String>,
    assignee: Option<String>,
    unassign: bool,
    list: Option<String>,
    db: &BoardStore,
) -> Result<(), CliError> {
    let priority = parse_priority(priority)?;
    let assignee_id = if unassign {
        Some(None)
    } else {
        assignee.map(Some)
    };
    let task = db.update_task(
        &id,
        TaskPatch {
            title,
            description,
            priority,
            list_id: list,
            order: None,
            assignee_id,
        },
    )?;
    println!("Task updated successfully (ID: {})", task.id);
    Ok(())
}

/// Handle the del-task command
pub fn handle_del_task(id: String, db: &BoardStore) -> Result<(), CliError> {
    db.delete_task(&id)?;
    println!("Task deleted (ID: {})", id);
    Ok(())
}

/// Handle the move-task command
pub fn handle_move_task(
    id: String,
    list: String,
    position: i64,
    db: &BoardStore,
) -> Result<(), CliError> {
    db.move_task(&id, &list, position)?;
    println!("Task moved (ID: {})", id);
    Ok(())
}

/// Handle the activity command
pub fn handle_activity(
    page: i64,
    page_size: i64,
    json: bool,
    db: &BoardStore,
) -> Result<(), CliError> {
    let feed = db.activities(page, page_size)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&feed)?);
        return Ok(());
    }
    for activity in &feed.items {
        println!(
            "[{}] {} {}",
            format_millis(activity.timestamp),
            activity.user_name,
            activity.action
        );
    }
    println!(
        "Showing {} of {} activities (page {})",
        feed.items.len(),
        feed.total,
        page.max(1)
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::SyncChannel;

    fn store() -> BoardStore {
        BoardStore::open_in_memory(SyncChannel::new()).unwrap()
    }

    #[test]
    fn create_board_rejects_whitespace_title() {
        let db = store();
        let err = handle_create_board("   ".to_string(), &db).unwrap_err();
        assert!(matches!(err, CliError::EmptyTitle));
        assert_eq!(db.boards().unwrap().len(), 1);
    }

    #[test]
    fn add_task_rejects_unknown_priority() {
        let db = store();
        let err = handle_add_task(
            "x".to_string(),
            "l1".to_string(),
            "b1".to_string(),
            Some("urgent".to_string()),
            None,
            None,
            &db,
        )
        .unwrap_err();
        assert!(matches!(err, CliError::InvalidPriority(_)));
    }

    #[test]
    fn edit_task_unassign_maps_to_explicit_none() {
        let db = store();
        handle_edit_task(
            "t1".to_string(),
            None,
            None,
            None,
            None,
            true,
            None,
            &db,
        )
        .unwrap();
        let task = db
            .tasks("b1")
            .unwrap()
            .into_iter()
            .find(|t| t.id == "t1")
            .unwrap();
        assert!(task.assignee_id.is_none());
    }
}
