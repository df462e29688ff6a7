use axum::{
    Json,
    body::to_bytes,
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, header::CONTENT_TYPE},
};
use serde_json::Value;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::error::RelayError;
use crate::metrics::{
    CHAT_REQUESTS_TOTAL, COMPLETION_ERRORS_TOTAL, COMPLETION_LATENCY, INVALID_REQUESTS_TOTAL,
    RATE_LIMITED_TOTAL, TRACKED_CLIENTS,
};
use crate::models::{ChatCompletionRequest, ChatMessage, ChatReply, ChatRequest};
use crate::prompt::{FALLBACK_REPLY, MAX_TOKENS, SYSTEM_PROMPT, TEMPERATURE};
use crate::rate_limit::RateLimitDecision;
use crate::state::AppState;

// Bodies above this are treated as invalid
const MAX_BODY_BYTES: usize = 64 * 1024;

// Used when neither a forwarding header nor a peer address is known
const UNKNOWN_CLIENT: &str = "unknown";

// rate limit key: left-most X-Forwarded-For entry, then peer IP, then sentinel
fn client_id(headers: &HeaderMap, remote: Option<IpAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|chain| chain.split(',').next())
        .map(str::trim)
        .filter(|first| !first.is_empty());

    match (forwarded, remote) {
        (Some(first), _) => first.to_string(),
        (None, Some(ip)) => ip.to_string(),
        (None, None) => UNKNOWN_CLIENT.to_string(),
    }
}

fn missing_message() -> RelayError {
    RelayError::InvalidRequest("Provide JSON body with 'message' field.".to_string())
}

// application/json or any application/*+json
fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mime| {
            let mime = mime.trim().to_ascii_lowercase();
            mime == "application/json"
                || (mime.starts_with("application/") && mime.ends_with("+json"))
        })
        .unwrap_or(false)
}

// Validate the body and return the trimmed message
fn parse_message(body: &[u8]) -> Result<String, RelayError> {
    // only a JSON object is accepted, serde would also map an array onto the struct
    let value: Value = serde_json::from_slice(body).map_err(|_| missing_message())?;
    if !value.is_object() {
        return Err(missing_message());
    }
    let request: ChatRequest = serde_json::from_value(value).map_err(|_| missing_message())?;
    let message = request.message.ok_or_else(missing_message)?;

    let message = message.trim();
    if message.is_empty() {
        return Err(RelayError::InvalidRequest("Empty message.".to_string()));
    }
    Ok(message.to_string())
}

async fn read_message(request: Request) -> Result<String, RelayError> {
    if !is_json(request.headers()) {
        return Err(missing_message());
    }
    let body = to_bytes(request.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|e| RelayError::InvalidRequest(format!("Unreadable body: {}", e)))?;
    parse_message(&body)
}

// POST /chat
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<ChatReply>, RelayError> {
    CHAT_REQUESTS_TOTAL.inc();

    let remote = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let client = client_id(request.headers(), remote);

    let decision = state.rate_limiter.check_now(&client);
    TRACKED_CLIENTS.set(state.rate_limiter.tracked_clients() as f64);
    debug!(client = %client, admitted = decision.is_admit(), "rate limit checked");
    if let RateLimitDecision::Deny { retry_after } = decision {
        RATE_LIMITED_TOTAL.inc();
        warn!(client = %client, retry_after_seconds = retry_after.as_secs(), "rate limit exceeded");
        return Err(RelayError::RateLimited {
            retry_after_seconds: retry_after.as_secs(),
        });
    }

    let message = read_message(request).await.inspect_err(|e| {
        INVALID_REQUESTS_TOTAL.inc();
        debug!(client = %client, error = %e, "rejected chat request");
    })?;

    let completion_request = ChatCompletionRequest {
        model: state.model.clone(),
        messages: vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(message)],
        temperature: TEMPERATURE,
        max_tokens: MAX_TOKENS,
    };

    let timer = COMPLETION_LATENCY.start_timer();
    let result = state.completion.complete(&completion_request).await;
    timer.observe_duration();

    let response = result.map_err(|e| {
        COMPLETION_ERRORS_TOTAL.inc();
        error!(client = %client, error = %e, "completion provider call failed");
        RelayError::from(e)
    })?;

    let reply = match response.reply_text() {
        Some(text) => text.to_string(),
        None => {
            warn!(client = %client, "completion response had no text, using fallback reply");
            FALLBACK_REPLY.to_string()
        }
    };

    info!(client = %client, reply_chars = reply.chars().count(), "chat request completed");
    Ok(Json(ChatReply { reply }))
}
