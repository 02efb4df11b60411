use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;

use crate::domain::models::{NewProject, Project, ProjectId, ProjectPatch, UserId};

use super::repo_error::RepositoryError;

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn insert(&self, project: &NewProject) -> Result<Project, RepositoryError>;
    async fn find_by_id(&self, id: ProjectId) -> Result<Option<Project>, RepositoryError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Project>, RepositoryError>;
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Project>, RepositoryError>;
    async fn update(
        &self,
        id: ProjectId,
        patch: &ProjectPatch,
    ) -> Result<Project, RepositoryError>;
    /// Delete the project and every task inside it, atomically.
    async fn delete(&self, id: ProjectId) -> Result<(), RepositoryError>;
}

pub struct PgProjectRepository {
    pool: PgPool,
}

impl PgProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectRepository for PgProjectRepository {
    async fn insert(&self, project: &NewProject) -> Result<Project, RepositoryError> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            INSERT INTO projects (name, description, slug, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, slug, user_id, created_at, updated_at
            "#,
        )
        .bind(&project.name)
        .bind(&project.description)
        .bind(&project.slug)
        .bind(project.user_id.as_i32())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: ProjectId) -> Result<Option<Project>, RepositoryError> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT id, name, description, slug, user_id, created_at, updated_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Project>, RepositoryError> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT id, name, description, slug, user_id, created_at, updated_at
            FROM projects
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Project>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT id, name, description, slug, user_id, created_at, updated_at
            FROM projects
            WHERE user_id = $1
            ORDER BY updated_at DESC
            "#,
        )
        .bind(user_id.as_i32())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(
        &self,
        id: ProjectId,
        patch: &ProjectPatch,
    ) -> Result<Project, RepositoryError> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            UPDATE projects
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = now()
            WHERE id = $1
            RETURNING id, name, description, slug, user_id, created_at, updated_at
            "#,
        )
        .bind(id.as_i32())
        .bind(&patch.name)
        .bind(&patch.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn delete(&self, id: ProjectId) -> Result<(), RepositoryError> {
        // The schema also carries ON DELETE CASCADE; deleting the tasks
        // inside the same transaction keeps the invariant independent of it.
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM tasks WHERE project_id = $1")
            .bind(id.as_i32())
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id.as_i32())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct ProjectRow {
    id: i32,
    name: String,
    description: Option<String>,
    slug: String,
    user_id: i32,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Self {
            id: ProjectId::new(row.id),
            name: row.name,
            description: row.description,
            slug: row.slug,
            user_id: UserId::new(row.user_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
