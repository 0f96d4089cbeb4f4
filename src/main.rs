use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::{get, Router},
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod models;
mod routes;
mod services;
mod state;
mod utils;

use crate::{
    config::Config,
    services::{AuthService, Database, FeedService, FollowService, TweetService, UserService},
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("LOG_LEVEL").unwrap_or_else(|_| "chirp=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting chirp service...");

    dotenv::dotenv().ok();
    let config = Config::from_env()?;

    let db = Arc::new(Database::new(&config).await?);
    db.migrate().await?;
    info!("Database connection established");

    let auth_service = AuthService::new(db.clone(), &config);
    let user_service = UserService::new(db.clone());
    let tweet_service = TweetService::new(db.clone(), &config);
    let follow_service = FollowService::new(db.clone());
    let feed_service = FeedService::new(db.clone(), follow_service.clone());

    let app_state = Arc::new(AppState {
        config: config.clone(),
        auth_service,
        user_service,
        tweet_service,
        follow_service,
        feed_service,
    });

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
        .allow_origin(
            config
                .cors_allowed_origins
                .split(',')
                .filter_map(|origin| origin.trim().parse::<HeaderValue>().ok())
                .collect::<Vec<_>>(),
        );

    let app = Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .nest("/api/auth", routes::auth::router())
        .nest("/api/tweets", routes::tweets::router())
        .nest(
            "/api/users",
            routes::users::router().merge(routes::follows::router()),
        )
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            utils::middleware::auth_middleware,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let addr = format!("{}:{}", config.server_host, config.server_port);
    info!("Starting server on http://{}", addr);

    axum::Server::bind(&addr.parse()?)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "chirp is running!"
}
