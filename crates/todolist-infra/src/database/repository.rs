//! SeaORM repository implementation for todos and users.

use async_trait::async_trait;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbConn, DbErr, EntityTrait, QueryFilter, QueryOrder, SqlErr,
};

use todolist_core::domain::{NewUser, Todo, TodoChanges, User};
use todolist_core::error::RepoError;
use todolist_core::ports::{TodoRepository, UserRepository};

use super::entity::todo::{self, Entity as TodoEntity};
use super::entity::user::{self, Entity as UserEntity};

/// Repository over a SeaORM connection pool. Works with any backend the
/// pool was opened against.
pub struct SeaOrmRepository {
    db: DbConn,
}

impl SeaOrmRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

fn query_error(err: DbErr) -> RepoError {
    match err {
        DbErr::Conn(e) => RepoError::Connection(e.to_string()),
        other => RepoError::Query(other.to_string()),
    }
}

// Server texts for a unique violation: Postgres 23505, MySQL 1062.
const UNIQUE_VIOLATION_TEXTS: [&str; 2] = [
    "duplicate key value violates unique constraint",
    "Duplicate entry",
];

fn insert_error(err: DbErr) -> RepoError {
    if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
        return RepoError::AlreadyExists(detail);
    }

    // Errors that did not come through a sqlx driver are unclassified.
    let message = err.to_string();
    if UNIQUE_VIOLATION_TEXTS.iter().any(|t| message.contains(t)) {
        RepoError::AlreadyExists(message)
    } else {
        query_error(err)
    }
}

/// Mask an email for logging to avoid PII in logs.
fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let mut chars = local.chars();
            match (chars.next(), chars.next()) {
                (Some(first), Some(_)) => format!("{first}***@{domain}"),
                _ => format!("***@{domain}"),
            }
        }
        None => "***".to_string(),
    }
}

#[async_trait]
impl TodoRepository for SeaOrmRepository {
    async fn create(&self, title: &str, description: &str) -> Result<Todo, RepoError> {
        let model = todo::ActiveModel {
            id: NotSet,
            title: Set(title.to_owned()),
            description: Set(description.to_owned()),
            status: Set(false),
        }
        .insert(&self.db)
        .await
        .map_err(query_error)?;

        tracing::debug!(todo_id = model.id, "Inserted todo");
        Ok(model.into())
    }

    async fn find_all(&self) -> Result<Vec<Todo>, RepoError> {
        let models = TodoEntity::find()
            .order_by_asc(todo::Column::Id)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Todo>, RepoError> {
        let model = TodoEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(model.map(Into::into))
    }

    async fn update(&self, id: i64, changes: TodoChanges) -> Result<u64, RepoError> {
        let values = todo::ActiveModel {
            id: NotSet,
            title: changes.title.map_or(NotSet, Set),
            description: changes.description.map_or(NotSet, Set),
            status: Set(changes.status),
        };

        let result = TodoEntity::update_many()
            .set(values)
            .filter(todo::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.rows_affected)
    }

    async fn delete(&self, id: i64) -> Result<u64, RepoError> {
        let result = TodoEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.rows_affected)
    }
}

#[async_trait]
impl UserRepository for SeaOrmRepository {
    async fn create_user(&self, new_user: NewUser) -> Result<User, RepoError> {
        let masked = mask_email(&new_user.email);

        let model = user::ActiveModel::from(new_user)
            .insert(&self.db)
            .await
            .map_err(insert_error)?;

        tracing::debug!(user_email = %masked, user_id = model.id, "Created user");
        Ok(model.into())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let model = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(model.map(Into::into))
    }
}
