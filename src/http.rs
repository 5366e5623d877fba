//! HTTP demonstration endpoints for guarded invocation.
//!
//! Requires the `http` feature. Uses axum for routing. The endpoints exist to
//! exercise the lock by hand: open two terminals, hit `/hold/T` from both,
//! and only one of them gets the lock while the other receives 409.
//!
//! ## Routes
//!
//! - `GET /health`: `{ "ok": true }`.
//! - `GET /hold/:key?hold_ms=N&ttl_ms=M`: hold `key` for `hold_ms` inside a
//!   guarded call. 200 when the lock was acquired, 409 when busy.
//! - `GET /status/:key`: `{ key, locked, remaining_ttl_ms }`.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use kvlock::{http, GuardedInvocation, InMemoryStore, LockManager};
//!
//! let guarded = Arc::new(GuardedInvocation::new(LockManager::new(InMemoryStore::new())));
//! http::serve(guarded, "0.0.0.0:8080").await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::guarded::{GuardedInvocation, Invocation};
use crate::lock::LockError;
use crate::store::KeyValueStore;

/// How long `/hold` keeps the lock when `hold_ms` is omitted.
pub const DEFAULT_HOLD_MS: u64 = 5_000;
/// Lock TTL used by `/hold` when `ttl_ms` is omitted.
pub const DEFAULT_HOLD_TTL_MS: u64 = 30_000;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HoldParams {
    pub hold_ms: Option<u64>,
    pub ttl_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldResponse {
    pub acquired: bool,
    pub key: String,
    /// `"released"`, `"lapsed"` or `"failed"`; absent when not acquired.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub key: String,
    pub locked: bool,
    pub remaining_ttl_ms: Option<u64>,
}

/// Build an axum `Router` over the given guarded invocation.
pub fn router<S: KeyValueStore + 'static>(guarded: Arc<GuardedInvocation<S>>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/hold/:key", get(hold_handler::<S>))
        .route("/status/:key", get(status_handler::<S>))
        .with_state(guarded)
}

/// Serve the demo endpoints at the given address (e.g. `"0.0.0.0:8080"`).
pub async fn serve<S: KeyValueStore + 'static>(
    guarded: Arc<GuardedInvocation<S>>,
    addr: &str,
) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "serving lock demo endpoints");
    axum::serve(listener, router(guarded)).await
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

async fn hold_handler<S: KeyValueStore + 'static>(
    State(guarded): State<Arc<GuardedInvocation<S>>>,
    Path(key): Path<String>,
    Query(params): Query<HoldParams>,
) -> Response {
    let hold = Duration::from_millis(params.hold_ms.unwrap_or(DEFAULT_HOLD_MS));
    let ttl = Duration::from_millis(params.ttl_ms.unwrap_or(DEFAULT_HOLD_TTL_MS));

    // The lock protocol is blocking I/O; keep it off the async workers.
    let task_key = key.clone();
    let joined = tokio::task::spawn_blocking(move || {
        guarded.call(&task_key, ttl, || std::thread::sleep(hold))
    })
    .await;

    match joined {
        Ok(Ok(Invocation::Completed { release, .. })) => (
            StatusCode::OK,
            Json(HoldResponse {
                acquired: true,
                key,
                release: Some(release.as_str().to_string()),
            }),
        )
            .into_response(),
        Ok(Ok(Invocation::NotAcquired { .. })) => (
            StatusCode::CONFLICT,
            Json(HoldResponse {
                acquired: false,
                key,
                release: None,
            }),
        )
            .into_response(),
        Ok(Err(err)) => error_response(err),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": err.to_string() })),
        )
            .into_response(),
    }
}

async fn status_handler<S: KeyValueStore + 'static>(
    State(guarded): State<Arc<GuardedInvocation<S>>>,
    Path(key): Path<String>,
) -> Response {
    let task_key = key.clone();
    let joined =
        tokio::task::spawn_blocking(move || guarded.manager().remaining_ttl(&task_key)).await;

    match joined {
        Ok(Ok(remaining)) => Json(StatusResponse {
            key,
            locked: remaining.is_some(),
            remaining_ttl_ms: remaining.map(|d| d.as_millis().min(u64::MAX as u128) as u64),
        })
        .into_response(),
        Ok(Err(err)) => error_response(err),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": err.to_string() })),
        )
            .into_response(),
    }
}

fn status_for(err: &LockError) -> StatusCode {
    match err {
        LockError::InvalidKey(_) | LockError::InvalidTtl(_) => StatusCode::BAD_REQUEST,
        LockError::Busy(_) => StatusCode::CONFLICT,
        LockError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn error_response(err: LockError) -> Response {
    (status_for(&err), Json(json!({ "error": err.to_string() }))).into_response()
}
