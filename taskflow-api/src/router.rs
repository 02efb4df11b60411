use axum::{http::Method, middleware, routing::get, Router};
use sqlx::PgPool;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::{app_state::AppState, config::Settings, routes};

pub fn create(connection_pool: PgPool, config: Settings) -> Router<()> {
    let app_state = AppState::new(connection_pool, &config);

    let app_url = config.application.app_url.clone();
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([
            "content-type".parse().unwrap(),
            "authorization".parse().unwrap(),
        ])
        .allow_origin(AllowOrigin::predicate(move |origin, _| {
            origin.to_str().map(|o| o == app_url).unwrap_or(false)
        }));

    Router::new()
        .route("/", get(|| async { "TaskFlow API" }))
        .route("/health", get(routes::health::health))
        .nest("/auth", routes::auth::router())
        .nest("/projects", routes::projects::router())
        .nest("/tasks", routes::tasks::router())
        .with_state(app_state)
        .layer(middleware::from_fn(routes::error::error_envelope))
        .layer(cors)
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
}
