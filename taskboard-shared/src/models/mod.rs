/// API models for Taskboard
///
/// Mirrors of what the REST backend returns, plus the input bodies the
/// client sends. The backend owns all of this state; nothing here is
/// authoritative.
///
/// # Models
///
/// - `user`: Authenticated user identity
/// - `project`: Projects and their active/inactive status
/// - `task`: Tasks, their kanban status and priority
/// - `stats`: Dashboard task counters
/// - `deadline`: Deadline wire format helpers
/// - `optional_text`: Blank-as-absent text fields
///
/// # Example
///
/// ```
/// use taskboard_shared::models::task::{Task, TaskStatus};
///
/// let task: Task = serde_json::from_str(
///     r#"{"id": 1, "project_id": 2, "title": "Buy seeds", "status": "working"}"#,
/// ).unwrap();
/// assert_eq!(task.status, TaskStatus::Working);
/// ```

pub mod deadline;
pub mod optional_text;
pub mod project;
pub mod stats;
pub mod task;
pub mod user;

pub use project::{Project, ProjectInput, ProjectStatus};
pub use stats::TaskStats;
pub use task::{Task, TaskInput, TaskPriority, TaskStatus};
pub use user::User;
