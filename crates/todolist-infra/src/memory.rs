//! In-memory repository - used when `DB_DRIVER=memory` and as the test double
//! for the HTTP layer.

use async_trait::async_trait;
use tokio::sync::RwLock;

use todolist_core::domain::{NewUser, Todo, TodoChanges, User};
use todolist_core::error::RepoError;
use todolist_core::ports::{TodoRepository, UserRepository};

#[derive(Default)]
struct Store {
    todos: Vec<Todo>,
    users: Vec<User>,
    last_todo_id: i64,
    last_user_id: i64,
}

/// Todos and users kept in vectors behind an async RwLock.
///
/// Ids are assigned from 1 and never reused. Data is lost on process restart.
#[derive(Default)]
pub struct InMemoryRepository {
    store: RwLock<Store>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoRepository for InMemoryRepository {
    async fn create(&self, title: &str, description: &str) -> Result<Todo, RepoError> {
        let mut store = self.store.write().await;
        store.last_todo_id += 1;

        let todo = Todo {
            id: store.last_todo_id,
            title: title.to_owned(),
            description: description.to_owned(),
            status: false,
        };
        store.todos.push(todo.clone());

        Ok(todo)
    }

    async fn find_all(&self) -> Result<Vec<Todo>, RepoError> {
        let store = self.store.read().await;
        Ok(store.todos.clone())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Todo>, RepoError> {
        let store = self.store.read().await;
        Ok(store.todos.iter().find(|t| t.id == id).cloned())
    }

    async fn update(&self, id: i64, changes: TodoChanges) -> Result<u64, RepoError> {
        let mut store = self.store.write().await;
        match store.todos.iter_mut().find(|t| t.id == id) {
            Some(todo) => {
                todo.apply(&changes);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, id: i64) -> Result<u64, RepoError> {
        let mut store = self.store.write().await;
        let before = store.todos.len();
        store.todos.retain(|t| t.id != id);
        Ok((before - store.todos.len()) as u64)
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn create_user(&self, new_user: NewUser) -> Result<User, RepoError> {
        let mut store = self.store.write().await;
        if store.users.iter().any(|u| u.email == new_user.email) {
            return Err(RepoError::AlreadyExists(format!(
                "email '{}' is taken",
                new_user.email
            )));
        }

        store.last_user_id += 1;
        let user = new_user.into_user(store.last_user_id);
        store.users.push(user.clone());

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let store = self.store.read().await;
        Ok(store.users.iter().find(|u| u.email == email).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_assigns_increasing_ids() {
        let repo = InMemoryRepository::new();
        let first = repo.create("first", "first todo").await.unwrap();
        let second = repo.create("second", "second todo").await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert!(!second.status);
        assert_eq!(repo.find_all().await.unwrap(), vec![first, second]);
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let repo = InMemoryRepository::new();
        let first = repo.create("first", "first todo").await.unwrap();
        assert_eq!(repo.delete(first.id).await.unwrap(), 1);

        let second = repo.create("second", "second todo").await.unwrap();
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_id() {
        let repo = InMemoryRepository::new();

        assert_eq!(repo.update(5, TodoChanges::new(true)).await.unwrap(), 0);
        assert_eq!(repo.delete(5).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_writes_only_present_fields() {
        let repo = InMemoryRepository::new();
        let todo = repo.create("title", "description").await.unwrap();

        let changes = TodoChanges::new(true).with_description("new description");
        assert_eq!(repo.update(todo.id, changes).await.unwrap(), 1);

        let stored = repo.find_by_id(todo.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "title");
        assert_eq!(stored.description, "new description");
        assert!(stored.status);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let repo = InMemoryRepository::new();
        let user = || NewUser::new("a".into(), "a@example.com".into(), "hash".into());

        repo.create_user(user()).await.unwrap();
        let err = repo.create_user(user()).await.unwrap_err();

        assert!(matches!(err, RepoError::AlreadyExists(_)));
        assert!(repo.find_user_by_email("a@example.com").await.unwrap().is_some());
        assert!(repo.find_user_by_email("b@example.com").await.unwrap().is_none());
    }
}
