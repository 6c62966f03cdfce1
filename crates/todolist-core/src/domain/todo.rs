use serde::{Deserialize, Serialize};

/// Todo entity - a single task on the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: bool,
}

impl Todo {
    /// Apply a partial update in place. The id never changes.
    pub fn apply(&mut self, changes: &TodoChanges) {
        if let Some(title) = &changes.title {
            self.title = title.clone();
        }
        if let Some(description) = &changes.description {
            self.description = description.clone();
        }
        self.status = changes.status;
    }
}

/// The set of fields a partial update writes.
///
/// `title` and `description` are written only when present; `status` is
/// always written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: bool,
}

impl TodoChanges {
    pub fn new(status: bool) -> Self {
        Self {
            title: None,
            description: None,
            status,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
