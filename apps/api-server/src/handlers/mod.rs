//! HTTP handlers and route configuration.

mod auth;
mod health;
mod posts;
mod users;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me))
                    .route("/profile", web::put().to(auth::update_profile)),
            )
            // Post routes
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list_posts))
                    .route("", web::post().to(posts::create_post))
                    .route("/{key}", web::get().to(posts::get_post))
                    .route("/{id}", web::put().to(posts::update_post))
                    .route("/{id}", web::delete().to(posts::delete_post))
                    .route("/{id}/like", web::post().to(posts::toggle_like))
                    .route("/{id}/comments", web::post().to(posts::add_comment)),
            )
            // User routes
            .service(
                web::scope("/users")
                    .route("/{id}", web::get().to(users::get_user))
                    .route("/{id}/posts", web::get().to(users::get_user_posts)),
            ),
    );
}
