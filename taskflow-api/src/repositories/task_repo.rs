use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;

use crate::domain::models::{
    NewTask, ProjectId, Task, TaskId, TaskPatch, TaskPriority, TaskStatus, UserId,
};

use super::repo_error::RepositoryError;

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn insert(&self, task: &NewTask) -> Result<Task, RepositoryError>;
    async fn find_by_id(&self, id: TaskId) -> Result<Option<Task>, RepositoryError>;
    async fn find_by_slug(
        &self,
        project_id: ProjectId,
        slug: &str,
    ) -> Result<Option<Task>, RepositoryError>;
    /// Tasks across all projects owned by `user_id`, optionally narrowed to
    /// one project, newest first.
    async fn list_for_user(
        &self,
        user_id: UserId,
        project_id: Option<ProjectId>,
    ) -> Result<Vec<Task>, RepositoryError>;
    async fn update(&self, id: TaskId, patch: &TaskPatch) -> Result<Task, RepositoryError>;
    async fn delete(&self, id: TaskId) -> Result<(), RepositoryError>;
}

pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn insert(&self, task: &NewTask) -> Result<Task, RepositoryError> {
        let row = sqlx::query_as::<_, TaskRow>(
            r#"
            INSERT INTO tasks (title, description, status, priority, slug, project_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, title, description, status, priority, slug, project_id,
                      created_at, updated_at
            "#,
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status)
        .bind(task.priority)
        .bind(&task.slug)
        .bind(task.project_id.as_i32())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: TaskId) -> Result<Option<Task>, RepositoryError> {
        let row = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, title, description, status, priority, slug, project_id,
                   created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn find_by_slug(
        &self,
        project_id: ProjectId,
        slug: &str,
    ) -> Result<Option<Task>, RepositoryError> {
        let row = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, title, description, status, priority, slug, project_id,
                   created_at, updated_at
            FROM tasks
            WHERE project_id = $1 AND slug = $2
            "#,
        )
        .bind(project_id.as_i32())
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
        project_id: Option<ProjectId>,
    ) -> Result<Vec<Task>, RepositoryError> {
        let rows = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT t.id, t.title, t.description, t.status, t.priority, t.slug,
                   t.project_id, t.created_at, t.updated_at
            FROM tasks t
            JOIN projects p ON p.id = t.project_id
            WHERE p.user_id = $1
              AND ($2::int IS NULL OR t.project_id = $2)
            ORDER BY t.created_at DESC
            "#,
        )
        .bind(user_id.as_i32())
        .bind(project_id.map(|id| id.as_i32()))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(&self, id: TaskId, patch: &TaskPatch) -> Result<Task, RepositoryError> {
        let row = sqlx::query_as::<_, TaskRow>(
            r#"
            UPDATE tasks
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                status = COALESCE($4, status),
                priority = COALESCE($5, priority),
                updated_at = now()
            WHERE id = $1
            RETURNING id, title, description, status, priority, slug, project_id,
                      created_at, updated_at
            "#,
        )
        .bind(id.as_i32())
        .bind(&patch.title)
        .bind(&patch.description)
        .bind(patch.status)
        .bind(patch.priority)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn delete(&self, id: TaskId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id.as_i32())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: i32,
    title: String,
    description: Option<String>,
    status: TaskStatus,
    priority: TaskPriority,
    slug: String,
    project_id: i32,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Self {
            id: TaskId::new(row.id),
            title: row.title,
            description: row.description,
            status: row.status,
            priority: row.priority,
            slug: row.slug,
            project_id: ProjectId::new(row.project_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
