//! Application state - shared across all handlers.

use std::sync::Arc;

use anyhow::Context;
use migration::{Migrator, MigratorTrait};

use todolist_core::ports::{PasswordService, TodoRepository, TokenService, UserRepository};
use todolist_infra::database::connect;
use todolist_infra::{
    Argon2PasswordService, DatabaseDriver, InMemoryRepository, JwtTokenService, SeaOrmRepository,
};

use crate::config::AppConfig;

/// Shared application state. Built once at startup; every worker holds a clone.
#[derive(Clone)]
pub struct AppState {
    pub todos: Arc<dyn TodoRepository>,
    pub users: Arc<dyn UserRepository>,
    pub passwords: Arc<dyn PasswordService>,
    pub tokens: Arc<dyn TokenService>,
}

impl AppState {
    /// Assemble state around a repository serving both todos and users.
    pub fn new<R>(
        repo: Arc<R>,
        passwords: Arc<dyn PasswordService>,
        tokens: Arc<dyn TokenService>,
    ) -> Self
    where
        R: TodoRepository + UserRepository + 'static,
    {
        Self {
            todos: repo.clone(),
            users: repo,
            passwords,
            tokens,
        }
    }

    /// Open storage, run pending migrations and build the auth services.
    pub async fn init(config: &AppConfig) -> anyhow::Result<Self> {
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));

        let state = if config.database.driver == DatabaseDriver::Memory {
            tracing::warn!("DB_DRIVER=memory. Data will be lost on restart.");
            Self::new(Arc::new(InMemoryRepository::new()), passwords, tokens)
        } else {
            let db = connect(&config.database)
                .await
                .context("failed to connect to database")?;

            Migrator::up(&db, None)
                .await
                .context("error running schema migration")?;
            tracing::info!("Schema migrations applied");

            Self::new(Arc::new(SeaOrmRepository::new(db)), passwords, tokens)
        };

        tracing::info!("Application state initialized");
        Ok(state)
    }
}
