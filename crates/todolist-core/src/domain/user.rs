use chrono::{DateTime, Utc};

/// User entity - a registered account.
///
/// Not serializable: the password hash must never reach a response body.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user ready to be inserted. The store assigns the id and timestamps.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

impl NewUser {
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        Self {
            username,
            email,
            password_hash,
        }
    }

    /// Materialize the stored user with the given id, stamped now.
    pub fn into_user(self, id: i64) -> User {
        let now = Utc::now();
        User {
            id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}
