//! # Todolist Shared
//!
//! Request and response types of the HTTP API, with their validation rules.

pub mod dto;
pub mod response;

pub use response::{DataResponse, ErrorResponse, ListResponse, MessageResponse, TokenResponse};
