/// Project gateway
///
/// # Endpoints
///
/// - `GET /projects` - List projects
/// - `GET /projects/:id` - Get one project
/// - `POST /projects` - Create
/// - `PUT /projects/:id` - Replace editable fields
/// - `PATCH /projects/:id/status` - Change status only
/// - `DELETE /projects/:id` - Delete

use reqwest::Method;
use serde::Deserialize;
use taskboard_shared::models::project::ProjectStatusChange;
use taskboard_shared::models::{Project, ProjectInput, ProjectStatus};
use taskboard_shared::validation::check;

use crate::error::{ClientError, ClientResult};
use crate::http::ApiClient;

pub const PROJECTS_PATH: &str = "projects";

/// Response of `POST /projects`: the project, bare or wrapped
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProjectEnvelope {
    Wrapped { project: Project },
    Bare(Project),
}

impl ProjectEnvelope {
    fn into_project(self) -> Project {
        match self {
            ProjectEnvelope::Wrapped { project } => project,
            ProjectEnvelope::Bare(project) => project,
        }
    }
}

fn project_path(id: i64) -> String {
    format!("{}/{}", PROJECTS_PATH, id)
}

/// Project endpoints
#[derive(Debug, Clone)]
pub struct ProjectGateway {
    api: ApiClient,
}

impl ProjectGateway {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> ClientResult<Vec<Project>> {
        self.api.get(PROJECTS_PATH).await
    }

    pub async fn get(&self, id: i64) -> ClientResult<Project> {
        self.api.get(&project_path(id)).await
    }

    #[tracing::instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: &ProjectInput) -> ClientResult<Project> {
        check(input).map_err(ClientError::from_details)?;

        let created: ProjectEnvelope = self.api.send_json(Method::POST, PROJECTS_PATH, input).await?;
        let project = created.into_project();
        tracing::info!(project_id = project.id, "Project created");
        Ok(project)
    }

    /// Replaces the editable fields; the response body is ignored
    #[tracing::instrument(skip(self, input))]
    pub async fn update(&self, id: i64, input: &ProjectInput) -> ClientResult<()> {
        check(input).map_err(ClientError::from_details)?;
        self.api.send_unit(Method::PUT, &project_path(id), Some(input)).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_status(&self, id: i64, status: ProjectStatus) -> ClientResult<()> {
        self.api
            .send_unit(
                Method::PATCH,
                &format!("{}/status", project_path(id)),
                Some(&ProjectStatusChange { status }),
            )
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        self.api
            .send_unit(Method::DELETE, &project_path(id), None::<&()>)
            .await?;
        tracing::info!(project_id = id, "Project deleted");
        Ok(())
    }
}
