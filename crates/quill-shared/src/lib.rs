//! # Quill Shared
//!
//! Request/response types for the Quill API surface, shared between the
//! server and API clients.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse};
