/// Project and bug report REST API endpoints
///
/// Thin handlers over `ProjectStore`: extract, call one store operation, shape the
/// JSON response. Failures are returned as `ApiError`.

use crate::{
    api::error::ApiError,
    project::{BugReport, NewBugReport, Project, ProjectFields, ProjectStore, SearchField},
};
use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    /// Project store shared by every request
    pub store: ProjectStore,
}

/// Response for project update operations
#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub id: String,
    pub message: String,
}

/// Query string for listing and searching
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    #[serde(rename = "searchType")]
    pub search_type: Option<String>,
}

/// Create project management routes
pub fn create_project_routes() -> Router<AppState> {
    Router::new()
        .route("/api/projects", get(list_projects).post(create_project))
        .route(
            "/api/projects/{id}",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/api/projects/{id}/bugs", post(append_bug))
        .route("/api/projects/{id}/bugs/{bug_id}", delete(remove_bug))
}

/// List or search projects
///
/// GET /api/projects
/// GET /api/projects?search=alice&searchType=author
/// `searchType` defaults to "title"; any other value than title/author is rejected.
async fn list_projects(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query?;

    if query.search.is_none() && query.search_type.is_none() {
        let projects = state.store.list_all().await?;
        return Ok(Json(json!({ "projects": projects })));
    }

    let field = match query.search_type.as_deref() {
        Some(raw) => raw.parse::<SearchField>()?,
        None => SearchField::default(),
    };
    let projects = state.store.search(query.search.as_deref(), field).await?;

    Ok(Json(json!({
        "projects": projects,
        "search": query.search,
        "searchType": field,
    })))
}

/// Create a new project
///
/// POST /api/projects
/// Body: { "name": "...", "description": "...", "author": "..." }
async fn create_project(
    State(state): State<AppState>,
    payload: Result<Json<ProjectFields>, JsonRejection>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    let Json(fields) = payload?;
    let project = state.store.create(fields).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// Get a project with its bug reports
///
/// GET /api/projects/{id}
async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Project>, ApiError> {
    let project = state.store.get_by_id(&id).await?;
    Ok(Json(project))
}

/// Overwrite name, description and author of a project
///
/// PUT /api/projects/{id}
/// Body: { "name": "...", "description": "...", "author": "..." }
async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ProjectFields>, JsonRejection>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let Json(fields) = payload?;
    state.store.update_fields(&id, fields).await?;

    Ok(Json(ProjectResponse {
        id,
        message: "Project updated successfully".to_string(),
    }))
}

/// Delete a project and its bug reports
///
/// DELETE /api/projects/{id}
async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.store.delete_by_id(&id).await?;
    Ok(Json(json!({ "message": "Project deleted successfully" })))
}

/// Report a bug on a project
///
/// POST /api/projects/{id}/bugs
/// Body: { "title": "...", "description": "...", "author": "...",
///         "priority": "low|medium|high", "severity": "low|medium|high" }
async fn append_bug(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<NewBugReport>, JsonRejection>,
) -> Result<(StatusCode, Json<BugReport>), ApiError> {
    let Json(bug) = payload?;
    let report = state.store.append_bug(&id, bug).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

/// Remove a bug report from a project
///
/// DELETE /api/projects/{id}/bugs/{bug_id}
/// Always 204 once both ids are well-formed, even if nothing matched.
async fn remove_bug(
    State(state): State<AppState>,
    Path((id, bug_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state.store.remove_bug(&id, &bug_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
