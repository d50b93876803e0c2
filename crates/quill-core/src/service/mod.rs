//! Domain services: the post store and the interaction engine.

mod interactions;
mod posts;

pub use interactions::InteractionService;
pub use posts::PostService;
