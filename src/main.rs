use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use dotenvy::dotenv;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod error;
mod handlers;
mod models;
mod stats;
mod store;


use config::Config;
use store::TaskStore;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health_check,
        handlers::tasks::list_tasks,
        handlers::tasks::create_task,
        handlers::tasks::update_task,
        handlers::tasks::delete_task,
        handlers::stats::get_stats
    ),
    components(
        schemas(
            models::Task,
            models::CreateTask,
            models::UpdateTask,
            models::TaskStats,
            models::TaskResponse,
            models::TaskListResponse,
            models::MessageResponse,
            models::StatsResponse,
            models::HealthResponse,
            models::ErrorResponse
        )
    ),
    tags(
        (name = "tasks", description = "Task CRUD endpoints"),
        (name = "stats", description = "Aggregate task counts"),
        (name = "health", description = "Liveness probe")
    )
)]
struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TaskStore>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env();

    let default_filter = if config.debug {
        "debug".to_string()
    } else {
        "info,agenda_backend=debug".to_string()
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            env::var("RUST_LOG").unwrap_or(default_filter),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let store = store::connect(&config).await;
    // The process keeps serving with an unreachable store; requests surface
    // the error per-call and /health reports it.
    if let Err(e) = store.ping().await {
        tracing::warn!("store not reachable at startup: {}", e);
    }

    let app = create_app(AppState { store });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(|| async { "Agenda backend is running!" }))
        .route("/health", get(handlers::health::health_check))
        .route("/tasks", get(handlers::tasks::list_tasks))
        .route("/tasks", post(handlers::tasks::create_task))
        .route("/tasks/:id", put(handlers::tasks::update_task))
        .route("/tasks/:id", delete(handlers::tasks::delete_task))
        .route("/stats", get(handlers::stats::get_stats))
        .fallback(handlers::fallback)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
