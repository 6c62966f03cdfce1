use async_trait::async_trait;

use crate::domain::{NewUser, Todo, TodoChanges, User};
use crate::error::RepoError;

/// Todo persistence operations.
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// Insert a new todo with `status = false` and return the stored row.
    async fn create(&self, title: &str, description: &str) -> Result<Todo, RepoError>;

    /// All todos in ascending id order. Empty when there are none.
    async fn find_all(&self) -> Result<Vec<Todo>, RepoError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Todo>, RepoError>;

    /// Write the present fields of `changes`. Returns the number of rows affected.
    async fn update(&self, id: i64, changes: TodoChanges) -> Result<u64, RepoError>;

    /// Returns the number of rows deleted; zero means the id was absent.
    async fn delete(&self, id: i64) -> Result<u64, RepoError>;
}

/// User persistence operations.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user. A taken email yields [`RepoError::AlreadyExists`].
    async fn create_user(&self, user: NewUser) -> Result<User, RepoError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
}
