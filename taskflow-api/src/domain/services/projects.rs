use std::sync::Arc;

use crate::domain::access;
use crate::domain::error::DomainError;
use crate::domain::models::{NewProject, Project, ProjectId, ProjectPatch, UserId};
use crate::domain::slug::{slugify, slugify_with_suffix};
use crate::repositories::ProjectRepository;

const PROJECT_NOT_FOUND: &str = "Project not found";
const PROJECT_FORBIDDEN: &str = "You do not have permission to access this project";
const SLUG_ATTEMPTS: usize = 4;

#[derive(Debug, Clone)]
pub struct CreateProject {
    pub name: String,
    pub description: Option<String>,
}

/// Project lifecycle operations.
///
/// Every read/update/delete follows the same gate: resolve by identifier
/// (absent resources fail NotFound before ownership is ever looked at),
/// then authorize the actor against the owner recorded at creation.
pub struct ProjectService<R> {
    projects: Arc<R>,
}

impl<R: ProjectRepository> ProjectService<R> {
    pub fn new(projects: Arc<R>) -> Self {
        Self { projects }
    }

    pub async fn create(
        &self,
        actor: UserId,
        input: CreateProject,
    ) -> Result<Project, DomainError> {
        if input.name.trim().is_empty() {
            return Err(DomainError::validation("name", "name must not be empty"));
        }

        let mut attempt = 0;
        loop {
            let slug = if attempt == 0 {
                slugify(&input.name)
            } else {
                slugify_with_suffix(&input.name)
            };

            let new_project = NewProject {
                name: input.name.clone(),
                description: input.description.clone(),
                slug,
                user_id: actor,
            };

            match self.projects.insert(&new_project).await {
                Ok(project) => return Ok(project),
                Err(err) if err.violates("projects_slug_key") => {
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

    /// The actor's projects, most recently updated first.
    pub async fn list(&self, actor: UserId) -> Result<Vec<Project>, DomainError> {
        Ok(self.projects.list_for_user(actor).await?)
    }

    pub async fn get_by_id(&self, actor: UserId, id: ProjectId) -> Result<Project, DomainError> {
        let project = self
            .projects
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(PROJECT_NOT_FOUND))?;

        access::authorize(actor, &project, PROJECT_FORBIDDEN)?;
        Ok(project)
    }

    pub async fn get_by_slug(&self, actor: UserId, slug: &str) -> Result<Project, DomainError> {
        let project = self
            .projects
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found(PROJECT_NOT_FOUND))?;

        access::authorize(actor, &project, PROJECT_FORBIDDEN)?;
        Ok(project)
    }

    /// Apply a partial patch. Absent fields are left untouched.
    pub async fn update(
        &self,
        actor: UserId,
        id: ProjectId,
        patch: ProjectPatch,
    ) -> Result<Project, DomainError> {
        // Malformed input is rejected before ownership is ever evaluated.
        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("name", "name must not be empty"));
            }
        }

        self.get_by_id(actor, id).await?;

        Ok(self.projects.update(id, &patch).await?)
    }

    /// Delete the project and all of its tasks atomically.
    pub async fn delete(&self, actor: UserId, id: ProjectId) -> Result<(), DomainError> {
        self.get_by_id(actor, id).await?;
        Ok(self.projects.delete(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::mock::MockProjectRepository;

    fn service() -> ProjectService<MockProjectRepository> {
        ProjectService::new(Arc::new(MockProjectRepository::new()))
    }

    fn create_input(name: &str) -> CreateProject {
        CreateProject {
            name: name.to_string(),
            description: Some("a project".to_string()),
        }
    }

    const ALICE: UserId = UserId::new(1);
    const BOB: UserId = UserId::new(2);

    #[tokio::test]
    async fn create_assigns_owner_and_slug() {
        let projects = service();
        let project = projects.create(ALICE, create_input("My Project")).await.unwrap();

        assert_eq!(project.user_id, ALICE);
        assert_eq!(project.slug, "my-project");
        assert_eq!(project.description.as_deref(), Some("a project"));
    }

    #[tokio::test]
    async fn create_rejects_empty_name() {
        let projects = service();
        let err = projects.create(ALICE, create_input("   ")).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn slug_collision_gets_a_suffix() {
        let projects = service();
        let first = projects.create(ALICE, create_input("My Project")).await.unwrap();
        let second = projects.create(BOB, create_input("My Project")).await.unwrap();

        assert_eq!(first.slug, "my-project");
        assert!(second.slug.starts_with("my-project-"));
    }

    #[tokio::test]
    async fn owner_gate_on_reads() {
        let projects = service();
        let project = projects.create(ALICE, create_input("Mine")).await.unwrap();

        assert!(projects.get_by_id(ALICE, project.id).await.is_ok());

        let err = projects.get_by_id(BOB, project.id).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let err = projects.get_by_slug(BOB, &project.slug).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn missing_resource_is_not_found_not_forbidden() {
        let projects = service();
        let project = projects.create(ALICE, create_input("Mine")).await.unwrap();

        // Nonexistent id: NotFound, even for a stranger.
        let absent = projects
            .get_by_id(BOB, ProjectId::new(999))
            .await
            .unwrap_err();
        assert!(matches!(absent, DomainError::NotFound(_)));

        // Existing but foreign id: Forbidden. The two outcomes must differ.
        let foreign = projects.get_by_id(BOB, project.id).await.unwrap_err();
        assert!(matches!(foreign, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn list_is_scoped_to_owner() {
        let projects = service();
        projects.create(ALICE, create_input("Alpha")).await.unwrap();
        projects.create(BOB, create_input("Beta")).await.unwrap();

        let mine = projects.list(ALICE).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].name, "Alpha");
    }

    #[tokio::test]
    async fn empty_patch_changes_nothing() {
        let projects = service();
        let project = projects.create(ALICE, create_input("Mine")).await.unwrap();

        let updated = projects
            .update(ALICE, project.id, ProjectPatch::default())
            .await
            .unwrap();

        assert_eq!(updated.name, project.name);
        assert_eq!(updated.description, project.description);
        assert_eq!(updated.slug, project.slug);
    }

    #[tokio::test]
    async fn patch_overwrites_only_present_fields() {
        let projects = service();
        let project = projects.create(ALICE, create_input("Mine")).await.unwrap();

        let updated = projects
            .update(
                ALICE,
                project.id,
                ProjectPatch {
                    name: Some("Renamed".to_string()),
                    description: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.description.as_deref(), Some("a project"));
    }

    #[tokio::test]
    async fn update_and_delete_are_owner_only() {
        let projects = service();
        let project = projects.create(ALICE, create_input("Mine")).await.unwrap();

        let err = projects
            .update(BOB, project.id, ProjectPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let err = projects.delete(BOB, project.id).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        // Still there for its owner.
        assert!(projects.get_by_id(ALICE, project.id).await.is_ok());
        projects.delete(ALICE, project.id).await.unwrap();

        let err = projects.get_by_id(ALICE, project.id).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }
}
