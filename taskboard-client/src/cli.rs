/// Command-line front end
///
/// Every command runs after the bootstrap, so a stored session is picked up
/// automatically. Results go to stdout; logs go to stderr.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use taskboard_shared::auth::{Credentials, Registration};
use taskboard_shared::board::{can_open_task, Board, DeadlineState};
use taskboard_shared::models::{deadline, optional_text, Project, ProjectInput, ProjectStatus, Task, TaskInput, TaskPriority, TaskStatus};

use crate::app::App;
use crate::status::StatusUpdate;

#[derive(Debug, Parser)]
#[command(name = "taskboard")]
#[command(version)]
#[command(about = "Taskboard projects and tasks from the command line")]
pub struct Cli {
    /// Config file (default: ./taskboard.toml)
    #[arg(long, global = true, env = "TASKBOARD_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Shows the logged-in user
    Whoami,
    /// Logs in and stores the session
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "TASKBOARD_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Creates an account
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "TASKBOARD_PASSWORD", hide_env_values = true)]
        password: String,
        /// Repeat of the password (defaults to --password)
        #[arg(long)]
        confirm_password: Option<String>,
    },
    /// Logs out and forgets the stored session
    Logout,
    /// Deletes the account and logs out
    DeleteAccount {
        /// Required confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Changes the profile picture
    Avatar {
        #[arg(value_name = "URL")]
        url: String,
    },
    /// Manage projects
    Projects {
        #[command(subcommand)]
        command: ProjectCommands,
    },
    /// Manage tasks
    Tasks {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Shows task counts per status
    Stats,
}

#[derive(Debug, Subcommand)]
pub enum ProjectCommands {
    /// Lists projects
    List,
    /// Shows one project
    Show {
        #[arg(value_name = "PROJECT_ID")]
        id: i64,
    },
    /// Creates a project
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        image_url: Option<String>,
        /// YYYY-MM-DD or YYYY-MM-DD HH:MM:SS (UTC)
        #[arg(long, value_parser = parse_deadline)]
        deadline: Option<DateTime<Utc>>,
    },
    /// Changes a project's name, description, image or deadline
    Edit {
        #[arg(value_name = "PROJECT_ID")]
        id: i64,
        #[command(flatten)]
        edits: ProjectEdits,
    },
    /// Sets a project's status (active or inactive)
    Status {
        #[arg(value_name = "PROJECT_ID")]
        id: i64,
        status: ProjectStatus,
    },
    /// Deletes a project
    Delete {
        #[arg(value_name = "PROJECT_ID")]
        id: i64,
    },
}

#[derive(Debug, Subcommand)]
pub enum TaskCommands {
    /// Shows a project's board
    List {
        #[arg(value_name = "PROJECT_ID")]
        project_id: i64,
    },
    /// Shows one task's details (read-only)
    Show {
        #[arg(value_name = "TASK_ID")]
        id: i64,
    },
    /// Creates a task
    Create {
        #[arg(value_name = "PROJECT_ID")]
        project_id: i64,
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "normal")]
        priority: TaskPriority,
        /// YYYY-MM-DD or YYYY-MM-DD HH:MM:SS (UTC)
        #[arg(long, value_parser = parse_deadline)]
        deadline: Option<DateTime<Utc>>,
    },
    /// Changes an unfinished task's details
    Edit {
        #[arg(value_name = "TASK_ID")]
        id: i64,
        #[command(flatten)]
        edits: TaskEdits,
    },
    /// Sets a task's status (todo, working or done)
    Status {
        #[arg(value_name = "TASK_ID")]
        id: i64,
        status: TaskStatus,
    },
    /// Deletes a task
    Delete {
        #[arg(value_name = "TASK_ID")]
        id: i64,
    },
}

/// Project fields to change; unset flags keep the current value
#[derive(Debug, Args)]
pub struct ProjectEdits {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// New image URL ("" removes the image)
    #[arg(long)]
    pub image_url: Option<String>,
    #[arg(long, value_parser = parse_deadline, conflicts_with = "clear_deadline")]
    pub deadline: Option<DateTime<Utc>>,
    #[arg(long)]
    pub clear_deadline: bool,
}

impl ProjectEdits {
    pub fn apply(self, input: &mut ProjectInput) {
        if let Some(name) = self.name {
            input.name = name;
        }
        if let Some(description) = self.description {
            input.description = description;
        }
        if let Some(image_url) = self.image_url {
            input.image_url = optional_text::normalize(Some(image_url));
        }
        if self.clear_deadline {
            input.deadline = None;
        } else if self.deadline.is_some() {
            input.deadline = self.deadline;
        }
    }
}

/// Task fields to change; unset flags keep the current value
#[derive(Debug, Args)]
pub struct TaskEdits {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Rich-text body (HTML)
    #[arg(long)]
    pub information: Option<String>,
    #[arg(long)]
    pub priority: Option<TaskPriority>,
    #[arg(long, value_parser = parse_deadline, conflicts_with = "clear_deadline")]
    pub deadline: Option<DateTime<Utc>>,
    #[arg(long)]
    pub clear_deadline: bool,
}

impl TaskEdits {
    pub fn apply(self, input: &mut TaskInput) {
        if let Some(title) = self.title {
            input.title = title;
        }
        if let Some(description) = self.description {
            input.description = description;
        }
        if let Some(information) = self.information {
            input.information = information;
        }
        if let Some(priority) = self.priority {
            input.priority = priority;
        }
        if self.clear_deadline {
            input.deadline = None;
        } else if self.deadline.is_some() {
            input.deadline = self.deadline;
        }
    }
}

/// Accepts a bare date (midnight UTC) or any deadline wire format
pub fn parse_deadline(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(date) = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    deadline::parse(raw).ok_or_else(|| format!("invalid deadline: {}", raw))
}

/// Runs one command against a bootstrapped application
pub async fn run(app: &App, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Login { username, password } => {
            let user = app.login(&Credentials::new(username, password)).await?;
            println!("Logged in as {}", user.display_name());
        }
        Commands::Register {
            username,
            email,
            password,
            confirm_password,
        } => {
            let confirm_password = confirm_password.unwrap_or_else(|| password.clone());
            app.register(&Registration {
                username,
                email,
                password,
                confirm_password,
            })
            .await?;
            println!("Account created. Run `taskboard login` to sign in.");
        }
        Commands::Logout => {
            app.logout().await;
            println!("Logged out");
        }
        command => {
            if !app.session.is_authenticated().await {
                anyhow::bail!("Not logged in. Run `taskboard login` first.");
            }
            run_authenticated(app, command).await?;
        }
    }
    Ok(())
}

async fn run_authenticated(app: &App, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Whoami => {
            if let Some(user) = app.session.current_user().await {
                println!("{} (id {})", user.display_name(), user.id);
                if let Some(email) = &user.email {
                    println!("email:  {}", email);
                }
                if let Some(avatar) = &user.avatar_url {
                    println!("avatar: {}", avatar);
                }
            }
        }
        Commands::DeleteAccount { yes } => {
            if !yes {
                anyhow::bail!("Refusing to delete the account without --yes");
            }
            app.delete_account().await?;
            println!("Account deleted");
        }
        Commands::Avatar { url } => {
            let user = app.update_avatar(&url).await?;
            println!("Avatar updated for {}", user.display_name());
        }
        Commands::Projects { command } => run_projects(app, command).await?,
        Commands::Tasks { command } => run_tasks(app, command).await?,
        Commands::Stats => {
            let stats = app.tasks.stats().await?;
            println!("todo:    {}", stats.todo);
            println!("working: {}", stats.working);
            println!("done:    {}", stats.done);
            println!("total:   {}", stats.total);
            println!("completed: {:.0}%", stats.completion_ratio() * 100.0);
        }
        Commands::Login { .. } | Commands::Register { .. } | Commands::Logout => {}
    }
    Ok(())
}

async fn run_projects(app: &App, command: ProjectCommands) -> anyhow::Result<()> {
    match command {
        ProjectCommands::List => {
            let projects = app.status.load_projects().await?;
            if projects.is_empty() {
                println!("No projects yet");
            }
            for project in &projects {
                print_project_line(project);
            }
        }
        ProjectCommands::Show { id } => {
            if let Some(project) = app.status.refresh_project(id).await?.applied() {
                print_project(&project);
            }
        }
        ProjectCommands::Create {
            name,
            description,
            image_url,
            deadline,
        } => {
            let project = app
                .projects
                .create(&ProjectInput {
                    name,
                    description,
                    image_url,
                    deadline,
                })
                .await?;
            println!("Created project {} ({})", project.id, project.name);
        }
        ProjectCommands::Edit { id, edits } => {
            let mut input = app.projects.get(id).await?.to_input();
            edits.apply(&mut input);
            match app.status.update_project(id, &input).await? {
                StatusUpdate::Applied(project) => print_project(&project),
                StatusUpdate::Superseded => println!("Project {} was changed again meanwhile", id),
            }
        }
        ProjectCommands::Status { id, status } => match app.status.set_project_status(id, status).await? {
            StatusUpdate::Applied(project) => println!("Project {} is now {}", project.id, project.status),
            StatusUpdate::Superseded => println!("Project {} was changed again meanwhile", id),
        },
        ProjectCommands::Delete { id } => {
            app.status.delete_project(id).await?;
            println!("Deleted project {}", id);
        }
    }
    Ok(())
}

async fn run_tasks(app: &App, command: TaskCommands) -> anyhow::Result<()> {
    match command {
        TaskCommands::List { project_id } => {
            let board = app.status.load_board(project_id).await?;
            print_board(&board);
        }
        TaskCommands::Show { id } => {
            let task = app.tasks.get(id).await?;
            print_task(&task);
            if !can_open_task(&task) {
                println!("\n(finished; read-only)");
            }
        }
        TaskCommands::Edit { id, edits } => {
            let mut input = app.status.open_task(id).await?.to_input();
            edits.apply(&mut input);
            match app.status.update_task(id, &input).await? {
                StatusUpdate::Applied(task) => print_task(&task),
                StatusUpdate::Superseded => println!("Task {} was changed again meanwhile", id),
            }
        }
        TaskCommands::Create {
            project_id,
            title,
            description,
            priority,
            deadline,
        } => {
            let mut input = TaskInput::new(project_id, title);
            input.description = description;
            input.priority = priority;
            input.deadline = deadline;

            let task = app.status.create_task(&input).await?;
            println!("Created task {} ({})", task.id, task.title);
        }
        TaskCommands::Status { id, status } => match app.status.set_task_status(id, status).await? {
            StatusUpdate::Applied(task) => println!("Task {} is now {}", task.id, task.status),
            StatusUpdate::Superseded => println!("Task {} was changed again meanwhile", id),
        },
        TaskCommands::Delete { id } => {
            app.status.delete_task(id).await?;
            println!("Deleted task {}", id);
        }
    }
    Ok(())
}

fn deadline_label(deadline: Option<DateTime<Utc>>) -> String {
    let state = DeadlineState::classify(deadline, Utc::now());
    match (deadline, state) {
        (None, _) => "-".to_string(),
        (Some(due), DeadlineState::Overdue) => format!("{} (overdue)", deadline::format(&due)),
        (Some(due), DeadlineState::DueSoon) => format!("{} (due soon)", deadline::format(&due)),
        (Some(due), _) => deadline::format(&due),
    }
}

fn print_project_line(project: &Project) {
    println!(
        "{:>5}  {:<8}  {:<30}  {}",
        project.id,
        project.status.as_str(),
        project.name,
        deadline_label(project.deadline)
    );
}

fn print_project(project: &Project) {
    println!("#{} {}", project.id, project.name);
    println!("status:      {}", project.status);
    println!("deadline:    {}", deadline_label(project.deadline));
    if let Some(image) = &project.image_url {
        println!("image:       {}", image);
    }
    if !project.description.is_empty() {
        println!("description: {}", project.description);
    }
}

fn print_board(board: &Board) {
    for status in TaskStatus::ALL {
        let column = board.column(status);
        println!("== {} ({})", status, column.len());
        for task in column {
            let lock = if can_open_task(task) { " " } else { "x" };
            println!(
                "{} {:>5}  {:<6}  {:<30}  {}",
                lock,
                task.id,
                task.priority.as_str(),
                task.title,
                deadline_label(task.deadline)
            );
        }
    }
}

fn print_task(task: &Task) {
    println!("#{} {}", task.id, task.title);
    println!("project:  {}", task.project_id);
    println!("status:   {}", task.status);
    println!("priority: {}", task.priority.as_str());
    println!("deadline: {}", deadline_label(task.deadline));
    if !task.description.is_empty() {
        println!("\n{}", task.description);
    }
    if !task.information.is_empty() {
        println!("\n{}", task.information);
    }
}
