//! CORS proxy in front of the upstream Nuance API.
//!
//! Browsers cannot call the upstream directly, so every client-side
//! request goes through `/api/nuance?endpoint=/some/path&extra=params`.
//! The proxy forwards the request upstream, relays the upstream status
//! and JSON body, and stamps permissive CORS headers on every response
//! it produces, including errors.

use crate::state::SharedState;
use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tracing::{info, warn};

const ALLOW_ORIGIN: &str = "*";
const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Authorization";

fn with_cors(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(ALLOW_ORIGIN),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    response
}

fn error_response(status: StatusCode, message: &str) -> Response {
    with_cors((status, Json(json!({ "error": message }))).into_response())
}

// Form-urlencoded component: `+` means space and must be rewritten
// before percent-decoding so an encoded `%2B` stays a literal plus.
fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

/// Decodes a raw query string into ordered key/value pairs. Order is
/// preserved so the upstream sees parameters exactly as sent.
fn parse_query(raw: &str) -> Vec<(String, String)> {
    raw.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

/// Splits the query into the target endpoint and the parameters to
/// forward. Everything except `endpoint` passes through.
fn split_endpoint(raw: &str) -> (Option<String>, Vec<(String, String)>) {
    let mut endpoint = None;
    let mut forwarded = Vec::new();
    for (key, value) in parse_query(raw) {
        if key == "endpoint" {
            endpoint = Some(value);
        } else {
            forwarded.push((key, value));
        }
    }
    (endpoint, forwarded)
}

fn build_upstream_url(base: &str, endpoint: &str, params: &[(String, String)]) -> String {
    let mut url = format!("{}{}", base.trim_end_matches('/'), endpoint);
    for (i, (key, value)) in params.iter().enumerate() {
        url.push(if i == 0 { '?' } else { '&' });
        url.push_str(&urlencoding::encode(key));
        url.push('=');
        url.push_str(&urlencoding::encode(value));
    }
    url
}

/// Relays the upstream response. Non-2xx statuses pass through with a
/// short error body; a body that is not JSON counts as a fetch failure.
async fn relay(response: reqwest::Response) -> Response {
    let status = StatusCode::from_u16(response.status().as_u16())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if !status.is_success() {
        let reason = status.canonical_reason().unwrap_or("Unknown Error");
        warn!("upstream returned {}: {}", status, reason);
        return error_response(status, &format!("API request failed: {}", reason));
    }

    match response.json::<Value>().await {
        Ok(body) => with_cors((status, Json(body)).into_response()),
        Err(e) => {
            warn!("upstream body was not JSON: {:#}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch from Nuance API",
            )
        }
    }
}

pub async fn proxy_get(State(state): State<SharedState>, RawQuery(raw): RawQuery) -> Response {
    let (endpoint, params) = split_endpoint(raw.as_deref().unwrap_or(""));
    let Some(endpoint) = endpoint.filter(|e| !e.is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "Endpoint parameter is required");
    };

    let url = build_upstream_url(&state.config.upstream_base, &endpoint, &params);
    info!("proxying GET {}", url);

    match state.http_client.get(&url).send().await {
        Ok(response) => relay(response).await,
        Err(e) => {
            warn!("upstream request failed: {:#}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch from Nuance API",
            )
        }
    }
}

pub async fn proxy_post(
    State(state): State<SharedState>,
    RawQuery(raw): RawQuery,
    body: Bytes,
) -> Response {
    // POST carries its payload in the body; query parameters beyond
    // `endpoint` are ignored, not forwarded.
    let (endpoint, _) = split_endpoint(raw.as_deref().unwrap_or(""));
    let Some(endpoint) = endpoint.filter(|e| !e.is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "Endpoint parameter is required");
    };

    let url = build_upstream_url(&state.config.upstream_base, &endpoint, &[]);
    info!("proxying POST {}", url);

    match state
        .http_client
        .post(&url)
        .header("content-type", "application/json")
        .body(body.to_vec())
        .send()
        .await
    {
        Ok(response) => relay(response).await,
        Err(e) => {
            warn!("upstream request failed: {:#}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch from Nuance API",
            )
        }
    }
}

/// CORS preflight.
pub async fn proxy_options() -> Response {
    with_cors(StatusCode::OK.into_response())
}
