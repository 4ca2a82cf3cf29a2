/// Task model
///
/// Tasks belong to exactly one project and are shown on a kanban board with
/// one column per status.
///
/// # Status
///
/// ```text
/// todo ⇄ working ⇄ done
///   ⇅_____________⇅
/// ```
///
/// Every transition between the three states is allowed, including moving a
/// finished task back to `todo`. Only the status has transition logic on the
/// client; everything else is a plain edit.
///
/// # Wire format
///
/// ```json
/// {
///   "id": 12,
///   "project_id": 7,
///   "title": "Buy seeds",
///   "description": "Tomatoes and basil",
///   "information": "<p>Check the <b>local</b> shop first</p>",
///   "priority": "high",
///   "status": "todo",
///   "deadline": "2025-03-20 18:00:00"
/// }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use crate::models::deadline;

/// Task status (kanban column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Not started
    #[default]
    Todo,

    /// In progress
    Working,

    /// Finished
    Done,
}

impl TaskStatus {
    /// All statuses in board order
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::Working, TaskStatus::Done];

    /// Converts status to its wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::Working => "working",
            TaskStatus::Done => "done",
        }
    }

    /// Checks if the task is finished
    pub fn is_done(&self) -> bool {
        matches!(self, TaskStatus::Done)
    }

    /// Checks if transition to target status is valid
    ///
    /// There is no enforced ordering between task statuses.
    pub fn can_transition_to(&self, _target: TaskStatus) -> bool {
        true
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "todo" => Ok(TaskStatus::Todo),
            "working" => Ok(TaskStatus::Working),
            "done" => Ok(TaskStatus::Done),
            other => Err(format!("unknown task status: {}", other)),
        }
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Normal,
    High,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Normal => "normal",
            TaskPriority::High => "high",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(TaskPriority::Low),
            "normal" => Ok(TaskPriority::Normal),
            "high" => Ok(TaskPriority::High),
            other => Err(format!("unknown task priority: {}", other)),
        }
    }
}

/// Task as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Backend task ID
    pub id: i64,

    /// Owning project
    #[serde(alias = "projectId")]
    pub project_id: i64,

    /// Short title
    pub title: String,

    /// One-line description
    #[serde(default)]
    pub description: String,

    /// Rich-text body (HTML as produced by the editor)
    #[serde(default)]
    pub information: String,

    #[serde(default)]
    pub priority: TaskPriority,

    #[serde(default)]
    pub status: TaskStatus,

    /// Optional deadline
    #[serde(default, with = "deadline")]
    pub deadline: Option<DateTime<Utc>>,
}

impl Task {
    /// Editable fields of this task, for a read-modify-write update
    pub fn to_input(&self) -> TaskInput {
        TaskInput {
            project_id: self.project_id,
            title: self.title.clone(),
            description: self.description.clone(),
            information: self.information.clone(),
            priority: self.priority,
            status: Some(self.status),
            deadline: self.deadline,
        }
    }
}

/// Input for creating or updating a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// Parent project
    pub project_id: i64,

    /// Task title
    #[validate(
        custom(function = "crate::validation::not_blank"),
        length(max = 255, message = "Title must be less than 255 characters")
    )]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub information: String,

    #[serde(default)]
    pub priority: TaskPriority,

    /// Status (only sent on full updates; new tasks start as `todo`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,

    #[serde(default, with = "deadline")]
    pub deadline: Option<DateTime<Utc>>,
}

impl TaskInput {
    /// Creates input for a new task with default priority and no deadline
    pub fn new(project_id: i64, title: impl Into<String>) -> Self {
        Self {
            project_id,
            title: title.into(),
            description: String::new(),
            information: String::new(),
            priority: TaskPriority::default(),
            status: None,
            deadline: None,
        }
    }
}

/// Body of `PATCH /tasks/:id/status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatusChange {
    pub status: TaskStatus,
}

/// Response of `POST /tasks`
///
/// The backend wraps the new task as `{ "task": {...} }`; a bare task is
/// accepted too.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CreatedTask {
    Wrapped { task: Task },
    Bare(Task),
}

impl CreatedTask {
    pub fn into_task(self) -> Task {
        match self {
            CreatedTask::Wrapped { task } => task,
            CreatedTask::Bare(task) => task,
        }
    }
}
