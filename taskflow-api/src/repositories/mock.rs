//! In-memory repository implementations for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::domain::models::{
    NewProject, NewTask, NewUser, Project, ProjectId, ProjectPatch, Task, TaskId, TaskPatch,
    User, UserId, UserRecord,
};

use super::repo_error::RepositoryError;
use super::{ProjectRepository, TaskRepository, UserRepository};

fn missing_row() -> RepositoryError {
    RepositoryError::Database(sqlx::Error::RowNotFound)
}

/// Mock user repository backed by an in-memory HashMap.
///
/// Mirrors the storage contract of the real table: duplicate emails and
/// slugs fail with the same constraint names the unique indexes carry.
#[derive(Clone, Default)]
pub struct MockUserRepository {
    users: Arc<RwLock<HashMap<i32, UserRecord>>>,
    next_id: Arc<AtomicI32>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn insert_user(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let mut users = self.users.write().unwrap();

        if users.values().any(|u| u.user.email == user.email) {
            return Err(RepositoryError::UniqueViolation(
                "users_email_key".to_string(),
            ));
        }
        if users.values().any(|u| u.user.slug == user.slug) {
            return Err(RepositoryError::UniqueViolation(
                "users_slug_key".to_string(),
            ));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let now = OffsetDateTime::now_utc();
        let record = UserRecord {
            user: User {
                id: UserId::new(id),
                email: user.email.clone(),
                name: user.name.clone(),
                slug: user.slug.clone(),
                created_at: now,
                updated_at: now,
            },
            password_hash: user.password_hash.clone(),
        };

        users.insert(id, record.clone());
        Ok(record.user)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let users = self.users.read().unwrap();
        Ok(users.get(&id.as_i32()).map(|r| r.user.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepositoryError> {
        let users = self.users.read().unwrap();
        Ok(users.values().find(|r| r.user.email == email).cloned())
    }
}

/// Mock project repository. Shares its task map with
/// [`MockTaskRepository::sharing`] so cascade deletes and ownership joins
/// see the same data.
#[derive(Clone, Default)]
pub struct MockProjectRepository {
    projects: Arc<RwLock<HashMap<i32, Project>>>,
    tasks: Arc<RwLock<HashMap<i32, Task>>>,
    next_id: Arc<AtomicI32>,
}

impl MockProjectRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProjectRepository for MockProjectRepository {
    async fn insert(&self, project: &NewProject) -> Result<Project, RepositoryError> {
        let mut projects = self.projects.write().unwrap();

        if projects.values().any(|p| p.slug == project.slug) {
            return Err(RepositoryError::UniqueViolation(
                "projects_slug_key".to_string(),
            ));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let now = OffsetDateTime::now_utc();
        let created = Project {
            id: ProjectId::new(id),
            name: project.name.clone(),
            description: project.description.clone(),
            slug: project.slug.clone(),
            user_id: project.user_id,
            created_at: now,
            updated_at: now,
        };

        projects.insert(id, created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: ProjectId) -> Result<Option<Project>, RepositoryError> {
        let projects = self.projects.read().unwrap();
        Ok(projects.get(&id.as_i32()).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Project>, RepositoryError> {
        let projects = self.projects.read().unwrap();
        Ok(projects.values().find(|p| p.slug == slug).cloned())
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Project>, RepositoryError> {
        let projects = self.projects.read().unwrap();
        let mut owned: Vec<Project> = projects
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();

        owned.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then(b.id.as_i32().cmp(&a.id.as_i32()))
        });
        Ok(owned)
    }

    async fn update(
        &self,
        id: ProjectId,
        patch: &ProjectPatch,
    ) -> Result<Project, RepositoryError> {
        let mut projects = self.projects.write().unwrap();
        let project = projects.get_mut(&id.as_i32()).ok_or_else(missing_row)?;

        if let Some(name) = &patch.name {
            project.name = name.clone();
        }
        if let Some(description) = &patch.description {
            project.description = Some(description.clone());
        }
        project.updated_at = OffsetDateTime::now_utc();

        Ok(project.clone())
    }

    async fn delete(&self, id: ProjectId) -> Result<(), RepositoryError> {
        let mut projects = self.projects.write().unwrap();
        let mut tasks = self.tasks.write().unwrap();

        projects.remove(&id.as_i32());
        tasks.retain(|_, task| task.project_id != id);

        Ok(())
    }
}

/// Mock task repository sharing state with a [`MockProjectRepository`].
#[derive(Clone)]
pub struct MockTaskRepository {
    projects: Arc<RwLock<HashMap<i32, Project>>>,
    tasks: Arc<RwLock<HashMap<i32, Task>>>,
    next_id: Arc<AtomicI32>,
}

impl MockTaskRepository {
    pub fn sharing(projects: &MockProjectRepository) -> Self {
        Self {
            projects: projects.projects.clone(),
            tasks: projects.tasks.clone(),
            next_id: Arc::new(AtomicI32::new(0)),
        }
    }
}

#[async_trait]
impl TaskRepository for MockTaskRepository {
    async fn insert(&self, task: &NewTask) -> Result<Task, RepositoryError> {
        let mut tasks = self.tasks.write().unwrap();

        if tasks
            .values()
            .any(|t| t.project_id == task.project_id && t.slug == task.slug)
        {
            return Err(RepositoryError::UniqueViolation(
                "tasks_project_id_slug_key".to_string(),
            ));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let now = OffsetDateTime::now_utc();
        let created = Task {
            id: TaskId::new(id),
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            priority: task.priority,
            slug: task.slug.clone(),
            project_id: task.project_id,
            created_at: now,
            updated_at: now,
        };

        tasks.insert(id, created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: TaskId) -> Result<Option<Task>, RepositoryError> {
        let tasks = self.tasks.read().unwrap();
        Ok(tasks.get(&id.as_i32()).cloned())
    }

    async fn find_by_slug(
        &self,
        project_id: ProjectId,
        slug: &str,
    ) -> Result<Option<Task>, RepositoryError> {
        let tasks = self.tasks.read().unwrap();
        Ok(tasks
            .values()
            .find(|t| t.project_id == project_id && t.slug == slug)
            .cloned())
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
        project_id: Option<ProjectId>,
    ) -> Result<Vec<Task>, RepositoryError> {
        let projects = self.projects.read().unwrap();
        let tasks = self.tasks.read().unwrap();

        let mut owned: Vec<Task> = tasks
            .values()
            .filter(|t| {
                projects
                    .get(&t.project_id.as_i32())
                    .map(|p| p.user_id == user_id)
                    .unwrap_or(false)
            })
            .filter(|t| project_id.map(|pid| t.project_id == pid).unwrap_or(true))
            .cloned()
            .collect();

        owned.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.id.as_i32().cmp(&a.id.as_i32()))
        });
        Ok(owned)
    }

    async fn update(&self, id: TaskId, patch: &TaskPatch) -> Result<Task, RepositoryError> {
        let mut tasks = self.tasks.write().unwrap();
        let task = tasks.get_mut(&id.as_i32()).ok_or_else(missing_row)?;

        if let Some(title) = &patch.title {
            task.title = title.clone();
        }
        if let Some(description) = &patch.description {
            task.description = Some(description.clone());
        }
        if let Some(status) = patch.status {
            task.status = status;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        task.updated_at = OffsetDateTime::now_utc();

        Ok(task.clone())
    }

    async fn delete(&self, id: TaskId) -> Result<(), RepositoryError> {
        let mut tasks = self.tasks.write().unwrap();
        tasks.remove(&id.as_i32());
        Ok(())
    }
}
