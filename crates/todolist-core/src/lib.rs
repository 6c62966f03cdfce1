//! # Todolist Core
//!
//! The domain layer of the todolist service.
//! This crate contains the entities and the ports the infrastructure implements,
//! with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;

pub use error::RepoError;
