//! HTTP handlers and route configuration.

mod comments;
mod health;
mod posts;
mod views;
mod wall;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .route("/wall", web::get().to(wall::get_wall))
            .service(
                web::scope("/posts")
                    .route("", web::post().to(posts::create_post))
                    .route("/{id}/upvote", web::post().to(posts::upvote_post))
                    .route("/{id}/comments", web::post().to(comments::create_comment))
                    .route(
                        "/{post_id}/comments/{id}/upvote",
                        web::post().to(comments::upvote_comment),
                    ),
            ),
    );
}
