use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::utils::{new_id, now_millis};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: String,
}

impl User {
    pub fn new(name: String, email: String) -> Self {
        let avatar = avatar_url(&name);
        Self {
            id: new_id("u"),
            name,
            email,
            avatar,
        }
    }
}

/// Derived avatar reference, seeded by the user's name
pub fn avatar_url(name: &str) -> String {
    format!("https://api.dicebear.com/7.x/avataaars/svg?seed={}", name)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub id: String,
    pub title: String,
    pub owner_id: String,
    pub created_at: i64, // Unix milliseconds
}

impl Board {
    pub fn new(title: String, owner_id: String) -> Self {
        Self {
            id: new_id("b"),
            title,
            owner_id,
            created_at: now_millis(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct List {
    pub id: String,
    pub title: String,
    pub board_id: String,
    pub order: i64,
}

impl List {
    pub fn new(title: String, board_id: String, order: i64) -> Self {
        Self {
            id: new_id("l"),
            title,
            board_id,
            order,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("not a valid priority: {0}")]
pub struct ParsePriorityError(String);

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(ParsePriorityError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub assignee_id: Option<String>,
    pub list_id: String,
    pub board_id: String,
    pub priority: Priority,
    pub order: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Creation payload for a task. Every field is optional at the call site;
/// `list_id` and `board_id` are validated by the store.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub list_id: Option<String>,
    pub board_id: Option<String>,
    pub priority: Option<Priority>,
    pub assignee_id: Option<String>,
}

/// Merge patch for a task update. `None` means "leave unchanged".
/// `assignee_id` is doubly optional so that `Some(None)` can express
/// an explicit unassign.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub list_id: Option<String>,
    pub order: Option<i64>,
    pub assignee_id: Option<Option<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Task,
    List,
    Board,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::Task => "task",
            TargetType::List => "list",
            TargetType::Board => "board",
        }
    }
}

#[derive(Debug, Error)]
#[error("not a valid target type: {0}")]
pub struct ParseTargetTypeError(String);

impl FromStr for TargetType {
    type Err = ParseTargetTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "task" => Ok(TargetType::Task),
            "list" => Ok(TargetType::List),
            "board" => Ok(TargetType::Board),
            other => Err(ParseTargetTypeError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub action: String,
    pub target_id: String,
    pub target_type: TargetType,
    pub timestamp: i64,
}

/// One page of the newest-first activity feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityPage {
    pub items: Vec<Activity>,
    pub total: i64,
}
