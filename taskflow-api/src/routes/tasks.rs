use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    app_state::AppState,
    auth::AuthUser,
    domain::models::{ProjectId, Task, TaskId, TaskPatch, TaskPriority, TaskStatus},
    domain::services::CreateTask,
    domain::DomainError,
    routes::ApiError,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tasks).post(create_task))
        .route("/:id", get(get_task).patch(update_task).delete(delete_task))
        .route("/slug/:slug", get(get_task_by_slug))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateTaskBody {
    title: String,
    description: Option<String>,
    project_id: i32,
    priority: Option<TaskPriority>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateTaskBody {
    title: Option<String>,
    description: Option<String>,
    status: Option<TaskStatus>,
    priority: Option<TaskPriority>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskQuery {
    project_id: Option<i32>,
}

#[instrument(name = "POST /tasks", skip(user, app_state, body), fields(user_id = %user.id))]
async fn create_task(
    user: AuthUser,
    State(app_state): State<AppState>,
    Json(body): Json<CreateTaskBody>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let task = app_state
        .tasks
        .create(
            user.id,
            CreateTask {
                title: body.title,
                description: body.description,
                project_id: ProjectId::new(body.project_id),
                priority: body.priority,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

#[instrument(name = "GET /tasks", skip(user, app_state), fields(user_id = %user.id))]
async fn list_tasks(
    user: AuthUser,
    State(app_state): State<AppState>,
    Query(query): Query<TaskQuery>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let tasks = app_state
        .tasks
        .list(user.id, query.project_id.map(ProjectId::new))
        .await?;
    Ok(Json(tasks))
}

#[instrument(name = "GET /tasks/:id", skip(user, app_state), fields(user_id = %user.id))]
async fn get_task(
    user: AuthUser,
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Task>, ApiError> {
    let task = app_state.tasks.get_by_id(user.id, TaskId::new(id)).await?;
    Ok(Json(task))
}

#[instrument(name = "GET /tasks/slug/:slug", skip(user, app_state), fields(user_id = %user.id))]
async fn get_task_by_slug(
    user: AuthUser,
    State(app_state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<TaskQuery>,
) -> Result<Json<Task>, ApiError> {
    let Some(project_id) = query.project_id else {
        return Err(DomainError::validation("projectId", "projectId is required").into());
    };

    let task = app_state
        .tasks
        .get_by_slug(user.id, ProjectId::new(project_id), &slug)
        .await?;
    Ok(Json(task))
}

#[instrument(name = "PATCH /tasks/:id", skip(user, app_state, body), fields(user_id = %user.id))]
async fn update_task(
    user: AuthUser,
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<UpdateTaskBody>,
) -> Result<Json<Task>, ApiError> {
    let task = app_state
        .tasks
        .update(
            user.id,
            TaskId::new(id),
            TaskPatch {
                title: body.title,
                description: body.description,
                status: body.status,
                priority: body.priority,
            },
        )
        .await?;

    Ok(Json(task))
}

#[instrument(name = "DELETE /tasks/:id", skip(user, app_state), fields(user_id = %user.id))]
async fn delete_task(
    user: AuthUser,
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    app_state.tasks.delete(user.id, TaskId::new(id)).await?;
    Ok(StatusCode::OK)
}
