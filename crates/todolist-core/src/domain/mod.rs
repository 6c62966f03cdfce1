//! Domain entities - the core business objects.

mod todo;
mod user;

pub use todo::{Todo, TodoChanges};
pub use user::{NewUser, User};
