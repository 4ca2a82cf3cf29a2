/// Task and project status controller
///
/// Owns the local view state (the last known version of each project and
/// task) and is the only thing that writes to it. A status change is never
/// applied optimistically: the controller sends the status-only PATCH, then
/// re-fetches the full entity and publishes that.
///
/// Responses can arrive out of order when the same entity is changed twice
/// in quick succession. Every operation on an entity takes a ticket from a
/// [`RequestSequencer`] for that entity's slot before it starts, and its
/// result is only published if the ticket is still the newest. Older
/// results come back as [`StatusUpdate::Superseded`]. Board and project list
/// loads never overwrite an entity that was touched while they were in
/// flight.
///
/// # Example
///
/// ```no_run
/// use taskboard_client::status::StatusUpdate;
/// use taskboard_shared::models::TaskStatus;
///
/// # async fn example(controller: taskboard_client::status::StatusController) -> anyhow::Result<()> {
/// match controller.set_task_status(12, TaskStatus::Done).await? {
///     StatusUpdate::Applied(task) => println!("{} is now {}", task.title, task.status),
///     StatusUpdate::Superseded => println!("a newer change won"),
/// }
/// # Ok(())
/// # }
/// ```

use std::collections::HashMap;
use std::sync::Arc;

use taskboard_shared::board::{ensure_can_create_task, ensure_can_open_task, Board};
use taskboard_shared::models::{Project, ProjectInput, ProjectStatus, Task, TaskInput, TaskStatus};
use taskboard_shared::sequence::{project_slot, task_slot, RequestSequencer, Ticket};
use tokio::sync::RwLock;

use crate::error::ClientResult;
use crate::gateway::{ProjectGateway, TaskGateway};

/// Result of a guarded update
#[derive(Debug, Clone, PartialEq)]
pub enum StatusUpdate<T> {
    /// The refreshed entity was published to the view state
    Applied(T),

    /// A newer request for the same entity was issued meanwhile; this
    /// result was discarded
    Superseded,
}

impl<T> StatusUpdate<T> {
    pub fn applied(self) -> Option<T> {
        match self {
            StatusUpdate::Applied(value) => Some(value),
            StatusUpdate::Superseded => None,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, StatusUpdate::Superseded)
    }
}

/// Last known version of each entity
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub projects: HashMap<i64, Project>,
    pub tasks: HashMap<i64, Task>,
}

impl ViewState {
    /// Tasks of one project grouped into board columns, ordered by ID
    pub fn board(&self, project_id: i64) -> Board {
        let mut tasks: Vec<Task> = self
            .tasks
            .values()
            .filter(|task| task.project_id == project_id)
            .cloned()
            .collect();
        tasks.sort_by_key(|task| task.id);
        Board::from_tasks(tasks)
    }
}

/// Drives status changes and keeps the view state fresh
#[derive(Debug, Clone)]
pub struct StatusController {
    projects: ProjectGateway,
    tasks: TaskGateway,
    sequencer: RequestSequencer,
    view: Arc<RwLock<ViewState>>,
}

impl StatusController {
    pub fn new(projects: ProjectGateway, tasks: TaskGateway) -> Self {
        Self {
            projects,
            tasks,
            sequencer: RequestSequencer::new(),
            view: Arc::new(RwLock::new(ViewState::default())),
        }
    }

    /// Copy of the current view state
    pub async fn view(&self) -> ViewState {
        self.view.read().await.clone()
    }

    pub async fn cached_task(&self, id: i64) -> Option<Task> {
        self.view.read().await.tasks.get(&id).cloned()
    }

    pub async fn cached_project(&self, id: i64) -> Option<Project> {
        self.view.read().await.projects.get(&id).cloned()
    }

    /// Changes a task's status, then publishes the re-fetched task
    #[tracing::instrument(skip(self))]
    pub async fn set_task_status(&self, id: i64, status: TaskStatus) -> ClientResult<StatusUpdate<Task>> {
        let ticket = self.sequencer.issue(task_slot(id));
        self.tasks.update_status(id, status).await?;
        let task = self.tasks.get(id).await?;
        Ok(self.publish_task(&ticket, task).await)
    }

    /// Re-fetches a task without changing it
    pub async fn refresh_task(&self, id: i64) -> ClientResult<StatusUpdate<Task>> {
        let ticket = self.sequencer.issue(task_slot(id));
        let task = self.tasks.get(id).await?;
        Ok(self.publish_task(&ticket, task).await)
    }

    /// Saves a task's editable fields, then publishes the re-fetched task
    #[tracing::instrument(skip(self, input))]
    pub async fn update_task(&self, id: i64, input: &TaskInput) -> ClientResult<StatusUpdate<Task>> {
        let ticket = self.sequencer.issue(task_slot(id));
        self.tasks.update(id, input).await?;
        let task = self.tasks.get(id).await?;
        Ok(self.publish_task(&ticket, task).await)
    }

    /// Changes a project's status, then publishes the re-fetched project
    #[tracing::instrument(skip(self))]
    pub async fn set_project_status(
        &self,
        id: i64,
        status: ProjectStatus,
    ) -> ClientResult<StatusUpdate<Project>> {
        let ticket = self.sequencer.issue(project_slot(id));
        self.projects.update_status(id, status).await?;
        let project = self.projects.get(id).await?;
        Ok(self.publish_project(&ticket, project).await)
    }

    /// Re-fetches a project without changing it
    pub async fn refresh_project(&self, id: i64) -> ClientResult<StatusUpdate<Project>> {
        let ticket = self.sequencer.issue(project_slot(id));
        let project = self.projects.get(id).await?;
        Ok(self.publish_project(&ticket, project).await)
    }

    /// Saves a project's editable fields, then publishes the re-fetched project
    #[tracing::instrument(skip(self, input))]
    pub async fn update_project(
        &self,
        id: i64,
        input: &ProjectInput,
    ) -> ClientResult<StatusUpdate<Project>> {
        let ticket = self.sequencer.issue(project_slot(id));
        self.projects.update(id, input).await?;
        let project = self.projects.get(id).await?;
        Ok(self.publish_project(&ticket, project).await)
    }

    /// Loads all projects into the view state
    ///
    /// Projects changed or refreshed while the list was in flight keep their
    /// newer cached copy, both in the view state and in the returned list.
    pub async fn load_projects(&self) -> ClientResult<Vec<Project>> {
        let mark = self.sequencer.mark();
        let listed = self.projects.list().await?;

        let mut view = self.view.write().await;
        let mut fresh = HashMap::with_capacity(listed.len());
        let mut projects = Vec::with_capacity(listed.len());
        for project in listed {
            let project = if self.sequencer.touched_since(&project_slot(project.id), &mark) {
                match view.projects.get(&project.id) {
                    Some(newer) => newer.clone(),
                    None => continue,
                }
            } else {
                project
            };
            fresh.insert(project.id, project.clone());
            projects.push(project);
        }
        // Keep projects that appeared through a newer request meanwhile
        for (id, project) in view.projects.drain() {
            if !fresh.contains_key(&id) && self.sequencer.touched_since(&project_slot(id), &mark) {
                fresh.insert(id, project);
            }
        }
        view.projects = fresh;

        Ok(projects)
    }

    /// Loads one project's tasks and groups them into a board
    ///
    /// Same staleness rule as [`Self::load_projects`], per task.
    pub async fn load_board(&self, project_id: i64) -> ClientResult<Board> {
        let mark = self.sequencer.mark();
        let listed = self.tasks.list_for_project(project_id).await?;

        let mut view = self.view.write().await;
        let listed_ids: Vec<i64> = listed.iter().map(|t| t.id).collect();
        view.tasks.retain(|id, task| {
            task.project_id != project_id
                || listed_ids.contains(id)
                || self.sequencer.touched_since(&task_slot(*id), &mark)
        });

        let mut tasks = Vec::with_capacity(listed.len());
        for task in listed {
            if self.sequencer.touched_since(&task_slot(task.id), &mark) {
                tracing::debug!(task_id = task.id, "Keeping newer cached task over board listing");
                match view.tasks.get(&task.id) {
                    Some(newer) if newer.project_id == project_id => tasks.push(newer.clone()),
                    _ => {}
                }
                continue;
            }
            view.tasks.insert(task.id, task.clone());
            tasks.push(task);
        }

        Ok(Board::from_tasks(tasks))
    }

    /// Creates a task, refusing inactive projects before sending anything
    ///
    /// The parent project is taken from the view state, or fetched if it is
    /// not known yet. The status rule is checked before the input itself.
    #[tracing::instrument(skip(self, input), fields(project_id = input.project_id))]
    pub async fn create_task(&self, input: &TaskInput) -> ClientResult<Task> {
        let project = match self.cached_project(input.project_id).await {
            Some(project) => project,
            None => {
                let mark = self.sequencer.mark();
                let project = self.projects.get(input.project_id).await?;
                let mut view = self.view.write().await;
                if !self.sequencer.touched_since(&project_slot(project.id), &mark) {
                    view.projects.insert(project.id, project.clone());
                }
                project
            }
        };

        if let Err(violation) = ensure_can_create_task(&project) {
            tracing::warn!(%violation, "Task creation refused");
            return Err(violation.into());
        }

        let task = self.tasks.create(input).await?;
        self.view.write().await.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    /// Opens a task for detail editing
    ///
    /// Finished tasks are refused with a policy error; the latest known
    /// version is used, fetching it if needed.
    pub async fn open_task(&self, id: i64) -> ClientResult<Task> {
        let task = match self.cached_task(id).await {
            Some(task) => task,
            None => match self.refresh_task(id).await? {
                StatusUpdate::Applied(task) => task,
                // A concurrent refresh already published a newer copy
                StatusUpdate::Superseded => match self.cached_task(id).await {
                    Some(task) => task,
                    None => self.tasks.get(id).await?,
                },
            },
        };

        ensure_can_open_task(&task)?;
        Ok(task)
    }

    /// Deletes a task and drops it from the view state
    pub async fn delete_task(&self, id: i64) -> ClientResult<()> {
        // Supersede anything still in flight for this task
        self.sequencer.issue(task_slot(id));
        self.tasks.delete(id).await?;
        self.view.write().await.tasks.remove(&id);
        Ok(())
    }

    /// Deletes a project and drops it and its tasks from the view state
    pub async fn delete_project(&self, id: i64) -> ClientResult<()> {
        self.sequencer.issue(project_slot(id));
        self.projects.delete(id).await?;

        let mut view = self.view.write().await;
        view.projects.remove(&id);
        view.tasks.retain(|_, task| task.project_id != id);
        Ok(())
    }

    async fn publish_task(&self, ticket: &Ticket, task: Task) -> StatusUpdate<Task> {
        let mut view = self.view.write().await;
        if !self.sequencer.is_current(ticket) {
            tracing::debug!(slot = ticket.slot(), seq = ticket.seq(), "Discarding stale task response");
            return StatusUpdate::Superseded;
        }
        view.tasks.insert(task.id, task.clone());
        self.sequencer.record_applied(ticket.slot());
        StatusUpdate::Applied(task)
    }

    async fn publish_project(&self, ticket: &Ticket, project: Project) -> StatusUpdate<Project> {
        let mut view = self.view.write().await;
        if !self.sequencer.is_current(ticket) {
            tracing::debug!(slot = ticket.slot(), seq = ticket.seq(), "Discarding stale project response");
            return StatusUpdate::Superseded;
        }
        view.projects.insert(project.id, project.clone());
        self.sequencer.record_applied(ticket.slot());
        StatusUpdate::Applied(project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskboard_shared::models::TaskPriority;

    fn task(id: i64, project_id: i64, status: TaskStatus) -> Task {
        Task {
            id,
            project_id,
            title: format!("task {}", id),
            description: String::new(),
            information: String::new(),
            priority: TaskPriority::Normal,
            status,
            deadline: None,
        }
    }

    #[test]
    fn test_status_update_helpers() {
        assert_eq!(StatusUpdate::Applied(3).applied(), Some(3));
        assert!(StatusUpdate::<i32>::Superseded.is_superseded());
        assert_eq!(StatusUpdate::<i32>::Superseded.applied(), None);
    }

    #[test]
    fn test_view_board_filters_by_project() {
        let mut view = ViewState::default();
        for t in [
            task(3, 1, TaskStatus::Done),
            task(1, 1, TaskStatus::Todo),
            task(2, 2, TaskStatus::Todo),
        ] {
            view.tasks.insert(t.id, t);
        }

        let board = view.board(1);
        assert_eq!(board.len(), 2);
        assert_eq!(board.todo[0].id, 1);
        assert_eq!(board.done[0].id, 3);
        assert!(view.board(9).is_empty());
    }
}
