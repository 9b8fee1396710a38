/// HTTP API Layer
///
/// JSON REST endpoints over the project store:
/// - Project CRUD and search
/// - Bug report append/remove on a project
/// - Error mapping to stable error codes

// Project and bug report endpoints
pub mod projects;

// Store error to HTTP response mapping
pub mod error;

// Re-export router builder and shared state
pub use error::ApiError;
pub use projects::{create_project_routes, AppState};
