use std::sync::{Arc, Mutex};

use axum::routing::{delete, get, post, put};
use axum::Router;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use lessonbook::config::AppConfig;
use lessonbook::db;
use lessonbook::handlers;
use lessonbook::services;
use lessonbook::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;

    let (events_tx, _) = broadcast::channel(256);

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        events_tx,
    });

    tokio::spawn(services::reaper::run(state.clone()));

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route(
            "/api/availability",
            get(handlers::availability::get_availability),
        )
        .route("/api/sessions", get(handlers::availability::list_sessions))
        .route(
            "/api/reservations",
            post(handlers::reservations::create_reservation),
        )
        .route(
            "/api/reservations/:id/confirm",
            post(handlers::reservations::confirm_reservation),
        )
        .route(
            "/api/reservations/:id/cancel",
            post(handlers::reservations::cancel_reservation),
        )
        .route("/api/events", get(handlers::events::events_stream))
        .route("/api/admin/templates", get(handlers::admin::list_templates))
        .route(
            "/api/admin/templates",
            post(handlers::admin::create_template),
        )
        .route(
            "/api/admin/templates/:id",
            put(handlers::admin::update_template),
        )
        .route(
            "/api/admin/templates/:id",
            delete(handlers::admin::delete_template),
        )
        .route("/api/admin/blocked", get(handlers::admin::list_blocked))
        .route("/api/admin/blocked", post(handlers::admin::create_blocked))
        .route(
            "/api/admin/blocked/:id",
            delete(handlers::admin::delete_blocked),
        )
        .route("/api/admin/extra", get(handlers::admin::list_extra))
        .route("/api/admin/extra", post(handlers::admin::create_extra))
        .route(
            "/api/admin/extra/:id",
            delete(handlers::admin::delete_extra),
        )
        .route("/api/admin/sessions", get(handlers::admin::list_sessions))
        .route(
            "/api/admin/sessions",
            post(handlers::admin::create_session),
        )
        .route(
            "/api/admin/sessions/:id",
            delete(handlers::admin::delete_session),
        )
        .route(
            "/api/admin/reservations",
            get(handlers::admin::list_reservations),
        )
        .route("/api/admin/reap", post(handlers::admin::trigger_reap))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
