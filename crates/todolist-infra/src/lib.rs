//! # Todolist Infrastructure
//!
//! Concrete implementations of the ports defined in `todolist-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory storage only
//! - `database` - MySQL / PostgreSQL storage via SeaORM
//! - `auth` - JWT + Argon2 authentication

pub mod database;
pub mod memory;

#[cfg(feature = "auth")]
pub mod auth;

pub use database::{DatabaseConfig, DatabaseDriver};
pub use memory::InMemoryRepository;

#[cfg(feature = "database")]
pub use database::SeaOrmRepository;

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
