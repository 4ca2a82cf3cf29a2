/// REST gateways
///
/// One gateway per resource, all sharing one [`ApiClient`](crate::http::ApiClient)
/// and therefore one cookie jar, one session and the same 401 handling.
///
/// - `auth`: CSRF, login, registration, verification, logout, account
/// - `projects`: project CRUD and status
/// - `tasks`: task CRUD, status and dashboard stats

pub mod auth;
pub mod projects;
pub mod tasks;

pub use auth::AuthGateway;
pub use projects::ProjectGateway;
pub use tasks::TaskGateway;
