//! # Tinyboard Binary
//!
//! The entry point that assembles the application based on compile-time features.

use actix_web::middleware::from_fn;
use actix_web::{web, App, HttpServer};
use tb_api::handlers::AppState;
use tb_api::middleware::{cors_policy, rate_limit, standard_middleware, RateLimitState};
use tb_core::origin::OriginPolicy;
use tb_store_memory::{InMemoryPostRepo, InMemoryTodoRepo};

// Feature-gated imports: each backend is compiled to order
#[cfg(feature = "db-sqlite")]
use tb_db_sqlite::SqliteBoardRepo;

#[cfg(feature = "storage-local")]
use tb_storage_local::LocalMediaStore;

#[cfg(feature = "auth-jwt")]
use tb_auth_jwt::{default_users, JwtAuthProvider};

fn env_or(key: &str, fallback: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| fallback.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = env_or("HOST", "0.0.0.0");
    let port: u16 = env_or("PORT", "3000").parse().expect("PORT must be a number");
    let database_url = env_or("DATABASE_URL", "sqlite:tinyboard.db");
    let upload_dir = env_or("UPLOAD_DIR", "./data/uploads");
    let jwt_secret = env_or("JWT_SECRET", "your-secret-key");
    let allow_origins: Vec<String> = env_or("CORS_ALLOW_ORIGINS", "http://localhost:3000")
        .split(',')
        .map(|origin| origin.trim().to_string())
        .filter(|origin| !origin.is_empty())
        .collect();

    std::fs::create_dir_all(&upload_dir)?;

    // 1. Initialize Database Implementation
    #[cfg(feature = "db-sqlite")]
    let boards = SqliteBoardRepo::new(&database_url)
        .await
        .expect("Failed to init SQLite");

    // 2. Initialize Storage Implementation
    #[cfg(feature = "storage-local")]
    let store = LocalMediaStore::new(upload_dir.into());

    // 3. Initialize Auth Implementation
    #[cfg(feature = "auth-jwt")]
    let auth = JwtAuthProvider::new(&jwt_secret, default_users());

    // 4. Wrap in AppState (dynamic dispatch keeps handlers backend-agnostic)
    let state = web::Data::new(AppState {
        posts: Box::new(InMemoryPostRepo::default()),
        todos: Box::new(InMemoryTodoRepo::default()),
        boards: Box::new(boards),
        store: Box::new(store),
        auth: Box::new(auth),
    });
    let limiter = web::Data::new(RateLimitState::default());
    let origin_policy = OriginPolicy::new(allow_origins);

    log::info!("Server is running on : {host}:{port}");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(limiter.clone())
            .wrap(standard_middleware())
            .wrap(from_fn(rate_limit))
            .wrap(cors_policy(origin_policy.clone()))
            .configure(tb_api::configure_routes)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
