//! Ownership-authorization core.
//!
//! Pure decision logic with no side effects. Callers resolve the resource
//! first (absent resources are a NotFound, decided before ownership is ever
//! evaluated) and then gate on the owner recorded at creation time. Nothing
//! here is cached: ownership is immutable, and every check re-reads the
//! freshly resolved resource.

use crate::domain::error::DomainError;
use crate::domain::models::{Project, UserId};

/// A resource with exactly one owning user.
///
/// Tasks deliberately do not implement this: a task has no owner field and
/// is authorized transitively through its parent [`Project`].
pub trait Owned {
    fn owner_id(&self) -> UserId;
}

impl Owned for Project {
    fn owner_id(&self) -> UserId {
        self.user_id
    }
}

/// Whether `actor` may access `resource`.
pub fn can_access(actor: UserId, resource: &impl Owned) -> bool {
    resource.owner_id() == actor
}

/// Gate an operation on ownership, with the denial message surfaced to the
/// client on mismatch.
pub fn authorize(
    actor: UserId,
    resource: &impl Owned,
    denial: &str,
) -> Result<(), DomainError> {
    if can_access(actor, resource) {
        Ok(())
    } else {
        Err(DomainError::forbidden(denial))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    use crate::domain::models::ProjectId;

    fn project_owned_by(user: i32) -> Project {
        Project {
            id: ProjectId::new(1),
            name: "Test".to_string(),
            description: None,
            slug: "test".to_string(),
            user_id: UserId::new(user),
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn owner_can_access() {
        let project = project_owned_by(1);
        assert!(can_access(UserId::new(1), &project));
    }

    #[test]
    fn non_owner_cannot_access() {
        let project = project_owned_by(1);
        assert!(!can_access(UserId::new(2), &project));
    }

    #[test]
    fn authorize_maps_mismatch_to_forbidden() {
        let project = project_owned_by(1);
        let err = authorize(UserId::new(2), &project, "no").unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
        assert!(authorize(UserId::new(1), &project, "no").is_ok());
    }
}
