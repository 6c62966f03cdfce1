//! Relational storage: connection setup, entities and the SeaORM repository.

mod connections;

#[cfg(feature = "database")]
pub mod entity;
#[cfg(feature = "database")]
mod repository;

pub use connections::{DatabaseConfig, DatabaseDriver, UnknownDriver};

#[cfg(feature = "database")]
pub use connections::connect;
#[cfg(feature = "database")]
pub use repository::SeaOrmRepository;
