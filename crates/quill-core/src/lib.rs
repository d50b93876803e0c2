//! # Quill Core
//!
//! The domain layer of the Quill blog platform.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! the post lifecycle, like/comment interactions, and authorization rules.

pub mod authz;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;
pub mod slug;

pub use error::DomainError;
