//! SeaORM entities.

pub mod comment;
pub mod post;
pub mod post_like;
pub mod user;
