use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(sqlx::Error),
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            // Postgres class 23505: unique_violation.
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unique").to_string();
                return Self::UniqueViolation(constraint);
            }
        }

        Self::Database(err)
    }
}

impl RepositoryError {
    /// Whether this is a unique violation on the named constraint.
    pub fn violates(&self, constraint: &str) -> bool {
        matches!(self, Self::UniqueViolation(c) if c == constraint)
    }
}
