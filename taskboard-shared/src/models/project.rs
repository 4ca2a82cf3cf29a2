/// Project model
///
/// Projects are owned by the authenticated user and live entirely on the
/// backend; the client only mirrors what the API returns.
///
/// # Status
///
/// ```text
/// active ⇄ inactive
/// ```
///
/// Both directions are always allowed. An inactive project cannot receive
/// new tasks (see `crate::board`).
///
/// # Wire format
///
/// ```json
/// {
///   "id": 7,
///   "name": "Garden",
///   "description": "Spring planting",
///   "image_url": "https://example.com/garden.png",
///   "deadline": "2025-04-01 12:00:00",
///   "status": "active",
///   "created_at": "2025-01-02T10:00:00.000Z"
/// }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use crate::models::{deadline, optional_text};

/// Project status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    /// Project accepts new tasks
    #[default]
    Active,

    /// Project is parked; task creation is refused
    Inactive,
}

impl ProjectStatus {
    /// Converts status to its wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::Inactive => "inactive",
        }
    }

    /// Whether new tasks may be created under a project in this status
    pub fn accepts_new_tasks(&self) -> bool {
        matches!(self, ProjectStatus::Active)
    }

    /// Checks if transition to target status is valid
    ///
    /// Project status is freely bidirectional.
    pub fn can_transition_to(&self, _target: ProjectStatus) -> bool {
        true
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(ProjectStatus::Active),
            "inactive" => Ok(ProjectStatus::Inactive),
            other => Err(format!("unknown project status: {}", other)),
        }
    }
}

/// Project as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Backend project ID
    pub id: i64,

    /// Project name
    pub name: String,

    /// Free-form description
    #[serde(default)]
    pub description: String,

    /// Optional cover image (the backend stores `""` for none)
    #[serde(default, alias = "imageUrl", deserialize_with = "optional_text::deserialize")]
    pub image_url: Option<String>,

    /// Optional deadline
    #[serde(default, with = "deadline")]
    pub deadline: Option<DateTime<Utc>>,

    /// Current status (absent on the wire means active)
    #[serde(default)]
    pub status: ProjectStatus,

    /// When the project was created
    #[serde(default, alias = "createdAt", with = "deadline")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Project {
    /// Editable fields of this project, for a read-modify-write update
    pub fn to_input(&self) -> ProjectInput {
        ProjectInput {
            name: self.name.clone(),
            description: self.description.clone(),
            image_url: optional_text::normalize(self.image_url.clone()),
            deadline: self.deadline,
        }
    }
}

/// Input for creating or updating a project
///
/// Limits mirror the backend's column sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ProjectInput {
    /// Project name
    #[validate(
        custom(function = "crate::validation::not_blank"),
        length(max = 75, message = "Project name must be at most 75 characters")
    )]
    pub name: String,

    /// Description
    #[serde(default)]
    #[validate(length(max = 255, message = "Description must be less than 255 characters"))]
    pub description: String,

    /// Optional cover image URL, sent as `""` when absent
    #[serde(default, with = "optional_text")]
    #[validate(custom(function = "crate::validation::blank_or_url"))]
    pub image_url: Option<String>,

    /// Optional deadline
    #[serde(default, with = "deadline")]
    pub deadline: Option<DateTime<Utc>>,
}

/// Body of `PATCH /projects/:id/status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectStatusChange {
    pub status: ProjectStatus,
}
