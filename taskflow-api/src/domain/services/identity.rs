use std::fmt;
use std::sync::Arc;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::TokenSigner;
use crate::domain::error::{DomainError, FieldError};
use crate::domain::models::{NewUser, User};
use crate::domain::slug::{slugify, slugify_with_suffix};
use crate::repositories::UserRepository;

/// Both login failure paths surface this exact message, so a caller cannot
/// tell an unknown email from a wrong password.
const INVALID_CREDENTIALS: &str = "Invalid email or password";
const INVALID_TOKEN: &str = "Invalid or expired token";
const EMAIL_TAKEN: &str = "User with this email already exists";
const MIN_PASSWORD_LEN: usize = 8;
const SLUG_ATTEMPTS: usize = 4;

#[derive(Clone)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// Registers users, authenticates logins, and resolves session tokens back
/// to users.
pub struct IdentityService<U> {
    users: Arc<U>,
    signer: TokenSigner,
}

impl<U: UserRepository> IdentityService<U> {
    pub fn new(users: Arc<U>, signer: TokenSigner) -> Self {
        Self { users, signer }
    }

    /// Create a user and issue an access token for it.
    pub async fn register(&self, req: RegisterRequest) -> Result<(User, String), DomainError> {
        validate_registration(&req)?;

        // Advisory pre-check; the unique index on users.email settles the
        // race between two concurrent registrations.
        if self.users.find_by_email(&req.email).await?.is_some() {
            return Err(DomainError::conflict(EMAIL_TAKEN));
        }

        let password_hash = hash_password(&req.password).map_err(|err| {
            tracing::error!("Password hashing failed: {err}");
            DomainError::internal("Failed to process credentials")
        })?;

        let slug_base = req
            .name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| req.email.split('@').next().unwrap_or(req.email.as_str()));

        let mut attempt = 0;
        let user = loop {
            let slug = if attempt == 0 {
                slugify(slug_base)
            } else {
                slugify_with_suffix(slug_base)
            };

            let new_user = NewUser {
                email: req.email.clone(),
                password_hash: password_hash.clone(),
                name: req.name.clone(),
                slug,
            };

            match self.users.insert_user(&new_user).await {
                Ok(user) => break user,
                Err(err) if err.violates("users_email_key") => {
                    return Err(DomainError::conflict(EMAIL_TAKEN));
                }
                Err(err) if err.violates("users_slug_key") => {
                    if attempt + 1 < SLUG_ATTEMPTS {
                        attempt += 1;
                    } else {
                        return Err(DomainError::conflict("Could not allocate a unique slug"));
                    }
                }
                Err(err) => return Err(err.into()),
            }
        };

        let token = self.issue_token(&user)?;
        Ok((user, token))
    }

    /// Verify credentials and issue an access token.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), DomainError> {
        let Some(record) = self.users.find_by_email(email).await? else {
            return Err(DomainError::authentication(INVALID_CREDENTIALS));
        };

        if !verify_password(password, &record.password_hash) {
            return Err(DomainError::authentication(INVALID_CREDENTIALS));
        }

        let token = self.issue_token(&record.user)?;
        Ok((record.user, token))
    }

    /// Resolve a bearer token back to its user.
    ///
    /// A token whose subject no longer resolves to an existing user fails
    /// the same way a malformed or expired one does.
    pub async fn authenticate(&self, token: &str) -> Result<User, DomainError> {
        let claims = self
            .signer
            .verify(token)
            .map_err(|_| DomainError::authentication(INVALID_TOKEN))?;
        let user_id = claims
            .user_id()
            .map_err(|_| DomainError::authentication(INVALID_TOKEN))?;

        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::authentication(INVALID_TOKEN))
    }

    fn issue_token(&self, user: &User) -> Result<String, DomainError> {
        self.signer.issue(user).map_err(|err| {
            tracing::error!("Token signing failed: {err}");
            DomainError::internal("Failed to issue access token")
        })
    }
}

fn validate_registration(req: &RegisterRequest) -> Result<(), DomainError> {
    let mut errors = Vec::new();

    let (local, domain) = req.email.split_once('@').unwrap_or(("", ""));
    if local.is_empty() || domain.is_empty() {
        errors.push(FieldError::new("email", "email must be a valid address"));
    }

    if req.password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(FieldError::new(
            "password",
            format!("password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(DomainError::Validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::mock::MockUserRepository;

    fn service() -> IdentityService<MockUserRepository> {
        IdentityService::new(
            Arc::new(MockUserRepository::new()),
            TokenSigner::new("test-secret", 24),
        )
    }

    fn register_req(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: "correct-horse".to_string(),
            name: Some("Ada Lovelace".to_string()),
        }
    }

    #[tokio::test]
    async fn register_returns_user_and_token() {
        let identity = service();

        let (user, token) = identity.register(register_req("ada@example.com")).await.unwrap();

        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.slug, "ada-lovelace");
        assert!(!token.is_empty());

        let resolved = identity.authenticate(&token).await.unwrap();
        assert_eq!(resolved.id, user.id);
    }

    #[tokio::test]
    async fn register_never_serializes_the_digest() {
        let identity = service();
        let (user, _) = identity.register(register_req("ada@example.com")).await.unwrap();

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let identity = service();
        identity.register(register_req("ada@example.com")).await.unwrap();

        let err = identity
            .register(register_req("ada@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn register_validates_email_and_password() {
        let identity = service();
        let err = identity
            .register(RegisterRequest {
                email: "not-an-email".to_string(),
                password: "short".to_string(),
                name: None,
            })
            .await
            .unwrap_err();

        let DomainError::Validation(fields) = err else {
            panic!("expected validation error");
        };
        let names: Vec<_> = fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(names, vec!["email", "password"]);
    }

    #[tokio::test]
    async fn slug_collision_gets_a_suffix() {
        let identity = service();
        let (first, _) = identity.register(register_req("ada@example.com")).await.unwrap();
        let (second, _) = identity.register(register_req("ada@other.com")).await.unwrap();

        assert_eq!(first.slug, "ada-lovelace");
        assert!(second.slug.starts_with("ada-lovelace-"));
        assert_ne!(first.slug, second.slug);
    }

    #[tokio::test]
    async fn login_roundtrip() {
        let identity = service();
        identity.register(register_req("ada@example.com")).await.unwrap();

        let (user, token) = identity
            .login("ada@example.com", "correct-horse")
            .await
            .unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert!(identity.authenticate(&token).await.is_ok());
    }

    #[tokio::test]
    async fn login_failure_message_is_uniform() {
        let identity = service();
        identity.register(register_req("ada@example.com")).await.unwrap();

        let unknown = identity
            .login("nobody@example.com", "correct-horse")
            .await
            .unwrap_err();
        let wrong = identity
            .login("ada@example.com", "wrong-password")
            .await
            .unwrap_err();

        let (DomainError::Authentication(a), DomainError::Authentication(b)) = (unknown, wrong)
        else {
            panic!("expected authentication errors");
        };
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn authenticate_rejects_dangling_subject() {
        let identity = service();

        // A well-signed token whose subject was never registered.
        let ghost = User {
            id: crate::domain::models::UserId::new(999),
            email: "ghost@example.com".to_string(),
            name: None,
            slug: "ghost".to_string(),
            created_at: time::OffsetDateTime::now_utc(),
            updated_at: time::OffsetDateTime::now_utc(),
        };
        let token = TokenSigner::new("test-secret", 24).issue(&ghost).unwrap();

        let err = identity.authenticate(&token).await.unwrap_err();
        assert!(matches!(err, DomainError::Authentication(_)));
    }

    #[tokio::test]
    async fn authenticate_rejects_garbage() {
        let identity = service();
        assert!(matches!(
            identity.authenticate("garbage").await.unwrap_err(),
            DomainError::Authentication(_)
        ));
    }
}
