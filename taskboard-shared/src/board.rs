/// Kanban board rules
///
/// The board groups a project's tasks into one column per status and owns
/// the two navigation rules that must hold whatever front end sits on top:
///
/// - A task whose status is `done` cannot be opened for detail editing by a
///   plain open. Its status can still be changed.
/// - No task can be created under an `inactive` project, regardless of the
///   other fields.
///
/// It also classifies deadlines for the "due soon" / "overdue" badges.
///
/// # Example
///
/// ```
/// use taskboard_shared::board::{ensure_can_create_task, PolicyViolation};
/// use taskboard_shared::models::{Project, ProjectStatus};
///
/// let project = Project {
///     id: 1,
///     name: "Garden".into(),
///     description: String::new(),
///     image_url: None,
///     deadline: None,
///     status: ProjectStatus::Inactive,
///     created_at: None,
/// };
/// assert_eq!(
///     ensure_can_create_task(&project),
///     Err(PolicyViolation::ProjectInactive { project_id: 1 })
/// );
/// ```

use chrono::{DateTime, Duration, Utc};

use crate::models::project::Project;
use crate::models::task::{Task, TaskStatus};

/// How far ahead a deadline counts as "due soon"
pub const DUE_SOON_WINDOW_DAYS: i64 = 7;

/// Board rule violations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyViolation {
    /// Finished tasks are not opened for detail editing
    #[error("Task {task_id} is done and cannot be opened for editing")]
    TaskDone { task_id: i64 },

    /// Inactive projects do not accept new tasks
    #[error("Cannot create tasks for inactive projects")]
    ProjectInactive { project_id: i64 },

    /// The task belongs to a different project than the one given
    #[error("Task {task_id} does not belong to project {project_id}")]
    ProjectMismatch { task_id: i64, project_id: i64 },
}

/// Refuses task creation under an inactive project
pub fn ensure_can_create_task(project: &Project) -> Result<(), PolicyViolation> {
    if project.status.accepts_new_tasks() {
        Ok(())
    } else {
        Err(PolicyViolation::ProjectInactive {
            project_id: project.id,
        })
    }
}

/// Refuses opening a finished task's detail view
pub fn ensure_can_open_task(task: &Task) -> Result<(), PolicyViolation> {
    if task.status.is_done() {
        Err(PolicyViolation::TaskDone { task_id: task.id })
    } else {
        Ok(())
    }
}

/// Whether a plain open should navigate to the task's details
pub fn can_open_task(task: &Task) -> bool {
    ensure_can_open_task(task).is_ok()
}

/// Deadline badge state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineState {
    /// No deadline set
    None,

    /// Deadline more than a week away
    OnTrack,

    /// Deadline within the next week
    DueSoon,

    /// Deadline has passed
    Overdue,
}

impl DeadlineState {
    pub fn classify(deadline: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        match deadline {
            None => DeadlineState::None,
            Some(due) if now > due => DeadlineState::Overdue,
            Some(due) if now + Duration::days(DUE_SOON_WINDOW_DAYS) > due => DeadlineState::DueSoon,
            Some(_) => DeadlineState::OnTrack,
        }
    }

    /// Whether a warning badge should be shown
    pub fn needs_attention(&self) -> bool {
        matches!(self, DeadlineState::DueSoon | DeadlineState::Overdue)
    }
}

/// A project's tasks grouped by status
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Board {
    pub todo: Vec<Task>,
    pub working: Vec<Task>,
    pub done: Vec<Task>,
}

impl Board {
    /// Groups tasks into columns, keeping their original order
    pub fn from_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let mut board = Board::default();
        for task in tasks {
            board.column_mut(task.status).push(task);
        }
        board
    }

    pub fn column(&self, status: TaskStatus) -> &[Task] {
        match status {
            TaskStatus::Todo => &self.todo,
            TaskStatus::Working => &self.working,
            TaskStatus::Done => &self.done,
        }
    }

    fn column_mut(&mut self, status: TaskStatus) -> &mut Vec<Task> {
        match status {
            TaskStatus::Todo => &mut self.todo,
            TaskStatus::Working => &mut self.working,
            TaskStatus::Done => &mut self.done,
        }
    }

    pub fn len(&self) -> usize {
        self.todo.len() + self.working.len() + self.done.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn find(&self, task_id: i64) -> Option<&Task> {
        TaskStatus::ALL
            .iter()
            .flat_map(|status| self.column(*status))
            .find(|task| task.id == task_id)
    }

    /// Replaces a task with its refreshed version, moving columns if needed
    ///
    /// Returns false when the task is not on this board.
    pub fn replace(&mut self, updated: Task) -> bool {
        let mut found = false;
        for status in TaskStatus::ALL {
            let column = self.column_mut(status);
            let before = column.len();
            column.retain(|task| task.id != updated.id);
            found |= column.len() != before;
        }
        if found {
            self.column_mut(updated.status).push(updated);
        }
        found
    }

    /// Looks up a task for a plain open, applying the done-task rule
    pub fn open_task(&self, task_id: i64) -> Option<Result<&Task, PolicyViolation>> {
        self.find(task_id)
            .map(|task| ensure_can_open_task(task).map(|_| task))
    }
}
