//! Data Transfer Objects - request types for the API.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use todolist_core::domain::TodoChanges;

/// Message returned for any rejected todo body.
pub const INVALID_INPUT: &str = "invalid input validation";

const MIN_TITLE_LEN: usize = 2;
const MIN_DESCRIPTION_LEN: usize = 4;
const MIN_CREDENTIAL_LEN: usize = 2;

/// A request body that failed validation. The message is client-facing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Request to create a todo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodoRequest {
    pub title: String,
    pub description: String,
}

impl CreateTodoRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if char_len(&self.title) < MIN_TITLE_LEN
            || char_len(&self.description) < MIN_DESCRIPTION_LEN
        {
            return Err(ValidationError::new(INVALID_INPUT));
        }
        Ok(())
    }
}

/// Request to update a todo. Empty `title`/`description` leave the stored
/// value alone; `status` is always written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTodoRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: bool,
}

impl UpdateTodoRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let short_title = !self.title.is_empty() && char_len(&self.title) < MIN_TITLE_LEN;
        let short_description =
            !self.description.is_empty() && char_len(&self.description) < MIN_DESCRIPTION_LEN;

        if short_title || short_description {
            return Err(ValidationError::new(INVALID_INPUT));
        }
        Ok(())
    }

    /// The fields this request writes.
    pub fn changes(&self) -> TodoChanges {
        let mut changes = TodoChanges::new(self.status);
        if !self.title.is_empty() {
            changes = changes.with_title(self.title.clone());
        }
        if !self.description.is_empty() {
            changes = changes.with_description(self.description.clone());
        }
        changes
    }
}

/// Request to register a new user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl RegisterRequest {
    /// Reports the first missing field, in order username, email, password.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.username.is_empty() {
            return Err(ValidationError::new("username is required"));
        }
        if self.email.is_empty() {
            return Err(ValidationError::new("email is required"));
        }
        if self.password.is_empty() {
            return Err(ValidationError::new("password is required"));
        }
        Ok(())
    }
}

/// Request to login.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if char_len(&self.email) < MIN_CREDENTIAL_LEN || char_len(&self.password) < MIN_CREDENTIAL_LEN
        {
            return Err(ValidationError::new(
                "email and password must be at least 2 characters long",
            ));
        }
        Ok(())
    }
}
