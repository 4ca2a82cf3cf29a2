/// Task gateway
///
/// # Endpoints
///
/// - `GET /tasks/project/:project_id` - Tasks of one project
/// - `GET /tasks/:id` - Get one task
/// - `POST /tasks` - Create (response is `{ "task": {...} }`)
/// - `PUT /tasks/:id` - Replace editable fields
/// - `PATCH /tasks/:id/status` - Change status only
/// - `DELETE /tasks/:id` - Delete
/// - `GET /tasks/stats` - Counts per status for the dashboard

use reqwest::Method;
use taskboard_shared::models::task::{CreatedTask, TaskStatusChange};
use taskboard_shared::models::{Task, TaskInput, TaskStats, TaskStatus};
use taskboard_shared::validation::check;

use crate::error::{ClientError, ClientResult};
use crate::http::ApiClient;

pub const TASKS_PATH: &str = "tasks";
pub const STATS_PATH: &str = "tasks/stats";

fn task_path(id: i64) -> String {
    format!("{}/{}", TASKS_PATH, id)
}

/// Task endpoints
#[derive(Debug, Clone)]
pub struct TaskGateway {
    api: ApiClient,
}

impl TaskGateway {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list_for_project(&self, project_id: i64) -> ClientResult<Vec<Task>> {
        self.api
            .get(&format!("{}/project/{}", TASKS_PATH, project_id))
            .await
    }

    pub async fn get(&self, id: i64) -> ClientResult<Task> {
        self.api.get(&task_path(id)).await
    }

    /// Creates a task
    ///
    /// This does not check the parent project's status; use
    /// `StatusController::create_task` for that.
    #[tracing::instrument(skip(self, input), fields(project_id = input.project_id))]
    pub async fn create(&self, input: &TaskInput) -> ClientResult<Task> {
        check(input).map_err(ClientError::from_details)?;

        let created: CreatedTask = self.api.send_json(Method::POST, TASKS_PATH, input).await?;
        let task = created.into_task();
        tracing::info!(task_id = task.id, "Task created");
        Ok(task)
    }

    /// Replaces the editable fields; the response body is ignored
    #[tracing::instrument(skip(self, input))]
    pub async fn update(&self, id: i64, input: &TaskInput) -> ClientResult<()> {
        check(input).map_err(ClientError::from_details)?;
        self.api.send_unit(Method::PUT, &task_path(id), Some(input)).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_status(&self, id: i64, status: TaskStatus) -> ClientResult<()> {
        self.api
            .send_unit(
                Method::PATCH,
                &format!("{}/status", task_path(id)),
                Some(&TaskStatusChange { status }),
            )
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        self.api
            .send_unit(Method::DELETE, &task_path(id), None::<&()>)
            .await?;
        tracing::info!(task_id = id, "Task deleted");
        Ok(())
    }

    /// Dashboard counts
    pub async fn stats(&self) -> ClientResult<TaskStats> {
        self.api.get(STATS_PATH).await
    }
}
