mod client;
mod config;
mod error;
mod handlers;
mod logger;
mod metrics;
mod models;
mod persona;
mod provider;
mod wellbeing;
#[cfg(test)]
mod test_support;

use std::any::Any;
use std::sync::Arc;

use axum::{
    Router,
    http::{Method, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use reqwest::Client;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;
use error::ApiError;
use metrics::Metrics;

// shared by every handler: the pooled http client avoids
// a new connection setup per request, config is read only
// and the counters are atomics so nothing here needs a lock
#[derive(Clone)]
pub struct AppState {
    pub http_client: Client,
    pub config: Arc<Config>,
    pub metrics: Arc<Metrics>,
}

impl AppState {

    pub fn new(config: Config) -> Self {

        AppState {
            http_client: Client::new(),
            config: Arc::new(config),
            metrics: Arc::new(Metrics::new()),
        }

    }

}

pub fn router(state: AppState) -> Router {

    let app = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
        .route(
            "/api/chat",
            post(handlers::chat_handler).fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/mood",
            get(wellbeing::list_moods)
                .post(wellbeing::record_mood)
                .fallback(wellbeing::method_not_allowed),
        )
        .route(
            "/api/goals",
            get(wellbeing::list_goals)
                .post(wellbeing::create_goal)
                .fallback(wellbeing::method_not_allowed),
        );

    let app = if state.config.cors_enabled {
        app.layer(
            CorsLayer::new()
                .allow_origin(AnyOrigin)
                .allow_methods([Method::POST])
                .allow_headers([header::CONTENT_TYPE]),
        )
    } else {
        app
    };

    app.layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)

}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {

    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(detail, "handler panicked");

    ApiError::internal("Internal server error").into_response()

}

#[tokio::main]
async fn main() -> anyhow::Result<()> {

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mindspace_gateway=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    info!(
        policy = ?config.failure_policy,
        cors = config.cors_enabled,
        timeout_secs = config.upstream.timeout.as_secs(),
        "configuration loaded"
    );

    let addr = config.bind_addr;
    let app = router(AppState::new(config));

    let listener = TcpListener::bind(addr).await?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())

}

async fn shutdown_signal() {

    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");

}
