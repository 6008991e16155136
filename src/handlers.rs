use std::time::Instant;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use tracing::{info, warn};
use crate::AppState;
use crate::client::call_provider;
use crate::config::FailurePolicy;
use crate::error::{ApiError, GatewayError};
use crate::logger::log_exchange;
use crate::metrics::MetricsSnapshot;
use crate::models::{ChatRequest, ChatResponse};
use crate::persona::{MISSING_KEY_REPLY, UPSTREAM_FAILURE_REPLY};
use crate::provider::Provider;

pub async fn health_check() -> &'static str {

    "OK"

}

pub async fn metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {

    Json(state.metrics.snapshot())

}

pub async fn method_not_allowed(State(state): State<AppState>) -> ApiError {

    state.metrics.record_rejected();
    ApiError::method_not_allowed()

}

#[tracing::instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>
) -> Result<Json<ChatResponse>, ApiError> {

    let policy = state.config.failure_policy;

    let Json(request) = payload.map_err(|rejection| {
        state.metrics.record_rejected();
        ApiError::bad_request(rejection.body_text())
    })?;

    info!(
        provider = request.provider.as_deref().unwrap_or("<none>"),
        has_key = request.api_key().is_some(),
        message_count = request.messages.len(),
        "received chat request"
    );

    // without a key there is nothing to forward
    let Some(api_key) = request.api_key() else {
        state.metrics.record_missing_credential();
        return match policy {
            FailurePolicy::Graceful => Ok(Json(ChatResponse::assistant(MISSING_KEY_REPLY))),
            FailurePolicy::Structured => Err(ApiError::bad_request("API key is required")),
        };
    };

    let provider = match request.provider.as_deref().map(str::parse::<Provider>) {
        Some(Ok(provider)) => provider,
        _ => {
            state.metrics.record_rejected();
            return Err(ApiError::bad_request("Invalid provider"));
        }
    };

    let started = Instant::now();
    let result = call_provider(
        &state.http_client,
        &state.config.upstream,
        provider,
        api_key,
        &request.messages
    ).await;
    let elapsed = started.elapsed();

    let outcome = match &result {
        Ok(_) => "ok",
        Err(GatewayError::Upstream { .. }) => "upstream_error",
        Err(GatewayError::Transport { .. }) => "transport_error",
        Err(GatewayError::MalformedResponse { .. }) => "malformed",
    };
    if let Some(path) = &state.config.request_log {
        log_exchange(path, provider, outcome, request.messages.len(), elapsed);
    }

    match result {
        Ok(response) => {
            state.metrics.record_upstream_success();
            info!(
                %provider,
                elapsed_ms = elapsed.as_millis() as u64,
                reply_chars = response.first_content().map_or(0, str::len),
                "upstream call succeeded"
            );
            Ok(Json(response))
        }
        Err(err) => {
            state.metrics.record_upstream_failure();
            warn!(%provider, elapsed_ms = elapsed.as_millis() as u64, error = %err, "upstream call failed");
            match policy {
                FailurePolicy::Graceful => Ok(Json(ChatResponse::assistant(UPSTREAM_FAILURE_REPLY))),
                FailurePolicy::Structured => Err(ApiError::from(err)),
            }
        }
    }

}
