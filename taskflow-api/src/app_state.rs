use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    auth::TokenSigner,
    config::Settings,
    domain::services::{IdentityService, ProjectService, TaskService},
    repositories::{PgProjectRepository, PgTaskRepository, PgUserRepository},
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub identity: Arc<IdentityService<PgUserRepository>>,
    pub projects: Arc<ProjectService<PgProjectRepository>>,
    pub tasks: Arc<TaskService<PgTaskRepository, PgProjectRepository>>,
}

impl AppState {
    pub fn new(db_pool: PgPool, settings: &Settings) -> Self {
        let user_repo = Arc::new(PgUserRepository::new(db_pool.clone()));
        let project_repo = Arc::new(PgProjectRepository::new(db_pool.clone()));
        let task_repo = Arc::new(PgTaskRepository::new(db_pool.clone()));

        let signer = TokenSigner::new(
            &settings.auth.jwt_secret,
            settings.auth.token_ttl_hours,
        );

        Self {
            identity: Arc::new(IdentityService::new(user_repo, signer)),
            projects: Arc::new(ProjectService::new(project_repo.clone())),
            tasks: Arc::new(TaskService::new(task_repo, project_repo)),
            db_pool,
        }
    }
}
