use std::sync::Arc;

use crate::domain::access;
use crate::domain::error::DomainError;
use crate::domain::models::{
    NewTask, ProjectId, Task, TaskId, TaskPatch, TaskPriority, TaskStatus, UserId,
};
use crate::domain::slug::{slugify, slugify_with_suffix};
use crate::repositories::{ProjectRepository, TaskRepository};

const PROJECT_NOT_FOUND: &str = "Project not found";
const TASK_NOT_FOUND: &str = "Task not found";
const TASK_FORBIDDEN: &str = "You cannot access this task";
const CREATE_FORBIDDEN: &str = "You do not have permission to add tasks to this project";
const SLUG_ATTEMPTS: usize = 4;

#[derive(Debug, Clone)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    pub project_id: ProjectId,
    pub priority: Option<TaskPriority>,
}

/// Task lifecycle operations.
///
/// A task carries no owner of its own; every gate resolves the parent
/// project and authorizes against its owner. Resolution failures surface as
/// NotFound before any ownership evaluation, including at creation, where
/// the gate runs against the parent project of the task-to-be.
pub struct TaskService<T, P> {
    tasks: Arc<T>,
    projects: Arc<P>,
}

impl<T: TaskRepository, P: ProjectRepository> TaskService<T, P> {
    pub fn new(tasks: Arc<T>, projects: Arc<P>) -> Self {
        Self { tasks, projects }
    }

    pub async fn create(&self, actor: UserId, input: CreateTask) -> Result<Task, DomainError> {
        if input.title.trim().is_empty() {
            return Err(DomainError::validation("title", "title must not be empty"));
        }

        let project = self
            .projects
            .find_by_id(input.project_id)
            .await?
            .ok_or_else(|| DomainError::not_found(PROJECT_NOT_FOUND))?;
        access::authorize(actor, &project, CREATE_FORBIDDEN)?;

        let mut attempt = 0;
        loop {
            let slug = if attempt == 0 {
                slugify(&input.title)
            } else {
                slugify_with_suffix(&input.title)
            };

            let new_task = NewTask {
                title: input.title.clone(),
                description: input.description.clone(),
                status: TaskStatus::initial(),
                priority: input.priority.unwrap_or_default(),
                slug,
                project_id: project.id,
            };

            match self.tasks.insert(&new_task).await {
                Ok(task) => return Ok(task),
                Err(err) if err.violates("tasks_project_id_slug_key") => {
                    if attempt + 1 < SLUG_ATTEMPTS {
                        attempt += 1;
                    } else {
                        return Err(DomainError::conflict("Could not allocate a unique slug"));
                    }
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Tasks across all of the actor's projects, newest first, optionally
    /// narrowed to one project. A foreign or unknown `project_id` simply
    /// yields an empty list; the filter is ownership-scoped, not gated.
    pub async fn list(
        &self,
        actor: UserId,
        project_id: Option<ProjectId>,
    ) -> Result<Vec<Task>, DomainError> {
        Ok(self.tasks.list_for_user(actor, project_id).await?)
    }

    pub async fn get_by_id(&self, actor: UserId, id: TaskId) -> Result<Task, DomainError> {
        let task = self
            .tasks
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(TASK_NOT_FOUND))?;

        self.authorize_through_parent(actor, &task).await?;
        Ok(task)
    }

    pub async fn get_by_slug(
        &self,
        actor: UserId,
        project_id: ProjectId,
        slug: &str,
    ) -> Result<Task, DomainError> {
        let task = self
            .tasks
            .find_by_slug(project_id, slug)
            .await?
            .ok_or_else(|| DomainError::not_found(TASK_NOT_FOUND))?;

        self.authorize_through_parent(actor, &task).await?;
        Ok(task)
    }

    /// Apply a partial patch. Absent fields are left untouched; status moves
    /// freely between any two states.
    pub async fn update(
        &self,
        actor: UserId,
        id: TaskId,
        patch: TaskPatch,
    ) -> Result<Task, DomainError> {
        // Malformed input is rejected before ownership is ever evaluated.
        if let Some(title) = &patch.title {
            if title.trim().is_empty() {
                return Err(DomainError::validation("title", "title must not be empty"));
            }
        }

        self.get_by_id(actor, id).await?;

        Ok(self.tasks.update(id, &patch).await?)
    }

    pub async fn delete(&self, actor: UserId, id: TaskId) -> Result<(), DomainError> {
        self.get_by_id(actor, id).await?;
        Ok(self.tasks.delete(id).await?)
    }

    /// Resolve the parent project and gate on its owner. The parent is
    /// fetched fresh on every check; nothing is cached.
    async fn authorize_through_parent(
        &self,
        actor: UserId,
        task: &Task,
    ) -> Result<(), DomainError> {
        let project = self
            .projects
            .find_by_id(task.project_id)
            .await?
            .ok_or_else(|| DomainError::not_found(TASK_NOT_FOUND))?;

        access::authorize(actor, &project, TASK_FORBIDDEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::services::projects::{CreateProject, ProjectService};
    use crate::repositories::mock::{MockProjectRepository, MockTaskRepository};

    const ALICE: UserId = UserId::new(1);
    const BOB: UserId = UserId::new(2);

    struct Fixture {
        projects: ProjectService<MockProjectRepository>,
        tasks: TaskService<MockTaskRepository, MockProjectRepository>,
    }

    fn fixture() -> Fixture {
        let project_repo = Arc::new(MockProjectRepository::new());
        let task_repo = Arc::new(MockTaskRepository::sharing(&project_repo));

        Fixture {
            projects: ProjectService::new(project_repo.clone()),
            tasks: TaskService::new(task_repo, project_repo),
        }
    }

    async fn project_for(fixture: &Fixture, owner: UserId, name: &str) -> ProjectId {
        fixture
            .projects
            .create(
                owner,
                CreateProject {
                    name: name.to_string(),
                    description: None,
                },
            )
            .await
            .unwrap()
            .id
    }

    fn create_input(title: &str, project_id: ProjectId) -> CreateTask {
        CreateTask {
            title: title.to_string(),
            description: None,
            project_id,
            priority: None,
        }
    }

    #[tokio::test]
    async fn create_defaults_status_and_priority() {
        let fx = fixture();
        let project_id = project_for(&fx, ALICE, "Mine").await;

        let task = fx
            .tasks
            .create(ALICE, create_input("Write the docs", project_id))
            .await
            .unwrap();

        assert_eq!(task.status, TaskStatus::Open);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(task.slug, "write-the-docs");
        assert_eq!(task.project_id, project_id);
    }

    #[tokio::test]
    async fn create_honors_explicit_priority() {
        let fx = fixture();
        let project_id = project_for(&fx, ALICE, "Mine").await;

        let task = fx
            .tasks
            .create(
                ALICE,
                CreateTask {
                    priority: Some(TaskPriority::VeryHigh),
                    ..create_input("Urgent", project_id)
                },
            )
            .await
            .unwrap();

        assert_eq!(task.priority, TaskPriority::VeryHigh);
    }

    #[tokio::test]
    async fn create_authorizes_against_the_parent_project() {
        let fx = fixture();
        let project_id = project_for(&fx, ALICE, "Mine").await;

        // Missing parent: NotFound, before ownership is considered.
        let err = fx
            .tasks
            .create(BOB, create_input("Sneaky", ProjectId::new(999)))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));

        // Foreign parent: Forbidden.
        let err = fx
            .tasks
            .create(BOB, create_input("Sneaky", project_id))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn ownership_is_transitive_through_the_project() {
        let fx = fixture();
        let project_id = project_for(&fx, ALICE, "Mine").await;
        let task = fx
            .tasks
            .create(ALICE, create_input("Private", project_id))
            .await
            .unwrap();

        assert!(fx.tasks.get_by_id(ALICE, task.id).await.is_ok());

        let err = fx.tasks.get_by_id(BOB, task.id).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let err = fx
            .tasks
            .get_by_slug(BOB, project_id, &task.slug)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn missing_task_is_not_found_not_forbidden() {
        let fx = fixture();
        let project_id = project_for(&fx, ALICE, "Mine").await;
        let task = fx
            .tasks
            .create(ALICE, create_input("Private", project_id))
            .await
            .unwrap();

        let absent = fx.tasks.get_by_id(BOB, TaskId::new(999)).await.unwrap_err();
        assert!(matches!(absent, DomainError::NotFound(_)));

        let foreign = fx.tasks.get_by_id(BOB, task.id).await.unwrap_err();
        assert!(matches!(foreign, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn list_spans_all_owned_projects() {
        let fx = fixture();
        let first = project_for(&fx, ALICE, "First").await;
        let second = project_for(&fx, ALICE, "Second").await;
        let foreign = project_for(&fx, BOB, "Foreign").await;

        fx.tasks.create(ALICE, create_input("a", first)).await.unwrap();
        fx.tasks.create(ALICE, create_input("b", second)).await.unwrap();
        fx.tasks.create(BOB, create_input("c", foreign)).await.unwrap();

        let all = fx.tasks.list(ALICE, None).await.unwrap();
        assert_eq!(all.len(), 2);

        let scoped = fx.tasks.list(ALICE, Some(first)).await.unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].title, "a");

        // A foreign project id filters down to nothing instead of erroring.
        let foreign_scope = fx.tasks.list(ALICE, Some(foreign)).await.unwrap();
        assert!(foreign_scope.is_empty());
    }

    #[tokio::test]
    async fn update_moves_status_freely() {
        let fx = fixture();
        let project_id = project_for(&fx, ALICE, "Mine").await;
        let task = fx
            .tasks
            .create(ALICE, create_input("Flappable", project_id))
            .await
            .unwrap();

        let done = fx
            .tasks
            .update(
                ALICE,
                task.id,
                TaskPatch {
                    status: Some(TaskStatus::Done),
                    ..TaskPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(done.status, TaskStatus::Done);

        // No transition graph: DONE can go straight back to OPEN.
        let reopened = fx
            .tasks
            .update(
                ALICE,
                task.id,
                TaskPatch {
                    status: Some(TaskStatus::Open),
                    ..TaskPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(reopened.status, TaskStatus::Open);
        assert_eq!(reopened.title, "Flappable");
    }

    #[tokio::test]
    async fn empty_patch_changes_nothing() {
        let fx = fixture();
        let project_id = project_for(&fx, ALICE, "Mine").await;
        let task = fx
            .tasks
            .create(ALICE, create_input("Stable", project_id))
            .await
            .unwrap();

        let updated = fx
            .tasks
            .update(ALICE, task.id, TaskPatch::default())
            .await
            .unwrap();

        assert_eq!(updated.title, task.title);
        assert_eq!(updated.description, task.description);
        assert_eq!(updated.status, task.status);
        assert_eq!(updated.priority, task.priority);
    }

    #[tokio::test]
    async fn update_and_delete_are_owner_only() {
        let fx = fixture();
        let project_id = project_for(&fx, ALICE, "Mine").await;
        let task = fx
            .tasks
            .create(ALICE, create_input("Private", project_id))
            .await
            .unwrap();

        let err = fx
            .tasks
            .update(BOB, task.id, TaskPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let err = fx.tasks.delete(BOB, task.id).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        fx.tasks.delete(ALICE, task.id).await.unwrap();
        let err = fx.tasks.get_by_id(ALICE, task.id).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn deleting_a_project_cascades_to_its_tasks() {
        let fx = fixture();
        let project_id = project_for(&fx, ALICE, "Doomed").await;
        let keeper = project_for(&fx, ALICE, "Keeper").await;

        let doomed_a = fx.tasks.create(ALICE, create_input("a", project_id)).await.unwrap();
        let doomed_b = fx.tasks.create(ALICE, create_input("b", project_id)).await.unwrap();
        let survivor = fx.tasks.create(ALICE, create_input("c", keeper)).await.unwrap();

        fx.projects.delete(ALICE, project_id).await.unwrap();

        // The project is gone from listings...
        let remaining = fx.projects.list(ALICE).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, keeper);

        // ...and every one of its former tasks resolves to NotFound.
        for id in [doomed_a.id, doomed_b.id] {
            let err = fx.tasks.get_by_id(ALICE, id).await.unwrap_err();
            assert!(matches!(err, DomainError::NotFound(_)));
        }
        assert!(fx.tasks.get_by_id(ALICE, survivor.id).await.is_ok());
        assert_eq!(fx.tasks.list(ALICE, None).await.unwrap().len(), 1);
    }
}
