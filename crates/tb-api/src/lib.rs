//! # tb-api
//!
//! The web routing and orchestration layer for Tinyboard.

pub mod handlers;
pub mod middleware;

use actix_web::web;

/// Configures the routes for both backends: the in-memory collections
/// (posts, todos), the session surface, and the persisted board.
///
/// # Developer Note
/// We use a plain route table rather than scopes so the main binary
/// can mount everything at the root, matching the paths clients
/// already depend on.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::index))
        // In-memory collections
        .route("/posts", web::get().to(handlers::list_posts))
        .route("/posts", web::post().to(handlers::create_post))
        .route("/posts/{id}", web::put().to(handlers::update_post))
        .route("/posts/{id}", web::delete().to(handlers::delete_post))
        .route("/todos", web::get().to(handlers::list_todos))
        .route("/todos", web::post().to(handlers::create_todo))
        .route("/todos/{id}", web::put().to(handlers::update_todo))
        .route("/todos/{id}", web::delete().to(handlers::delete_todo))
        // Session surface
        .route("/login", web::post().to(handlers::login))
        .route("/logout", web::get().to(handlers::logout))
        .route("/form", web::get().to(handlers::form))
        .route("/cookie", web::get().to(handlers::set_demo_cookie))
        // Persisted board
        .route("/view", web::get().to(handlers::list_board))
        .route("/read/{bnum}", web::get().to(handlers::read_board))
        .route("/img/{bnum}", web::get().to(handlers::board_image))
        .route("/insert", web::post().to(handlers::insert_board))
        .route("/update/{bnum}", web::put().to(handlers::update_board))
        .route("/delete/{bnum}", web::delete().to(handlers::delete_board));
}
