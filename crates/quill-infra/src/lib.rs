//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`:
//! PostgreSQL persistence via SeaORM and the JWT/Argon2 auth collaborator.

pub mod auth;
pub mod database;

pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
pub use database::{DbClient, DbConfig, SeaOrmPostRepository, SeaOrmUserRepository};
pub use sea_orm::DbErr;
