//! Response envelopes. Every body carries the HTTP status and a message.

use serde::{Deserialize, Serialize};

/// Response carrying a single payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub status: u16,
    pub message: String,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(status: u16, message: impl Into<String>, data: T) -> Self {
        Self {
            status,
            message: message.into(),
            data,
        }
    }
}

/// Response carrying a list and its length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub status: u16,
    pub message: String,
    pub more: usize,
    pub data: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn new(status: u16, message: impl Into<String>, data: Vec<T>) -> Self {
        Self {
            status,
            message: message.into(),
            more: data.len(),
            data,
        }
    }
}

/// Response with nothing but a status and a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub status: u16,
    pub message: String,
}

impl MessageResponse {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

/// Successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub status: u16,
    pub message: String,
    pub token: String,
}

/// Error body shared by every failure path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}
