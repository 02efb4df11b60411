use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    app_state::AppState,
    auth::AuthUser,
    domain::models::{Project, ProjectId, ProjectPatch},
    domain::services::CreateProject,
    routes::ApiError,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_projects).post(create_project))
        .route(
            "/:id",
            get(get_project).patch(update_project).delete(delete_project),
        )
        .route("/slug/:slug", get(get_project_by_slug))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateProjectBody {
    name: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateProjectBody {
    name: Option<String>,
    description: Option<String>,
}

#[instrument(name = "POST /projects", skip(user, app_state, body), fields(user_id = %user.id))]
async fn create_project(
    user: AuthUser,
    State(app_state): State<AppState>,
    Json(body): Json<CreateProjectBody>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    let project = app_state
        .projects
        .create(
            user.id,
            CreateProject {
                name: body.name,
                description: body.description,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(project)))
}

#[instrument(name = "GET /projects", skip(user, app_state), fields(user_id = %user.id))]
async fn list_projects(
    user: AuthUser,
    State(app_state): State<AppState>,
) -> Result<Json<Vec<Project>>, ApiError> {
    let projects = app_state.projects.list(user.id).await?;
    Ok(Json(projects))
}

#[instrument(name = "GET /projects/:id", skip(user, app_state), fields(user_id = %user.id))]
async fn get_project(
    user: AuthUser,
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Project>, ApiError> {
    let project = app_state
        .projects
        .get_by_id(user.id, ProjectId::new(id))
        .await?;
    Ok(Json(project))
}

#[instrument(name = "GET /projects/slug/:slug", skip(user, app_state), fields(user_id = %user.id))]
async fn get_project_by_slug(
    user: AuthUser,
    State(app_state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Project>, ApiError> {
    let project = app_state.projects.get_by_slug(user.id, &slug).await?;
    Ok(Json(project))
}

#[instrument(name = "PATCH /projects/:id", skip(user, app_state, body), fields(user_id = %user.id))]
async fn update_project(
    user: AuthUser,
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<UpdateProjectBody>,
) -> Result<Json<Project>, ApiError> {
    let project = app_state
        .projects
        .update(
            user.id,
            ProjectId::new(id),
            ProjectPatch {
                name: body.name,
                description: body.description,
            },
        )
        .await?;

    Ok(Json(project))
}

#[instrument(name = "DELETE /projects/:id", skip(user, app_state), fields(user_id = %user.id))]
async fn delete_project(
    user: AuthUser,
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    app_state.projects.delete(user.id, ProjectId::new(id)).await?;
    Ok(StatusCode::OK)
}
