//! HTTP surface of the token endpoint
//!
//! `POST /token` accepts `{"token": "..."}` once; `GET /status` lets operator
//! tooling confirm the listener is live.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

use crate::core::{BridgeError, Result};

pub const TOKEN_PATH: &str = "/token";
pub const STATUS_PATH: &str = "/status";
pub const AWAITING_STATUS: &str = "Awaiting token submission";

/// Body of a token submission
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenSubmission {
    #[serde(default)]
    pub token: Option<String>,
}

/// Received-token slot plus the sending half of the completion signal
#[derive(Debug)]
struct TokenSlot {
    token: Option<String>,
    signal: Option<oneshot::Sender<String>>,
    /// Set once the owner stops waiting; later submissions are refused
    closed: bool,
}

/// State shared between the endpoint task and its owner
#[derive(Debug, Clone)]
pub(crate) struct SlotHandle {
    inner: Arc<Mutex<TokenSlot>>,
}

impl SlotHandle {
    /// Fresh slot and the receiver that fires when it is filled
    pub(crate) fn new() -> (Self, oneshot::Receiver<String>) {
        let (tx, rx) = oneshot::channel();
        let slot = TokenSlot {
            token: None,
            signal: Some(tx),
            closed: false,
        };
        (
            Self {
                inner: Arc::new(Mutex::new(slot)),
            },
            rx,
        )
    }

    /// Store `token` and fire the signal, unless a token was already accepted
    /// or the slot was closed
    pub(crate) fn submit(&self, token: String) -> Result<()> {
        let mut slot = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if slot.token.is_some() {
            return Err(BridgeError::SubmissionConflict);
        }
        if slot.closed {
            return Err(BridgeError::SubmissionClosed);
        }

        slot.token = Some(token.clone());
        if let Some(signal) = slot.signal.take() {
            // The owner may already have stopped waiting; the slot still counts as filled
            let _ = signal.send(token);
        }
        Ok(())
    }

    /// Refuse further submissions and return the token accepted before closing
    ///
    /// Whatever this returns is the only token the owner may act on: a
    /// submission either lands before the close and is returned here, or is
    /// rejected.
    pub(crate) fn close(&self) -> Option<String> {
        let mut slot = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        slot.closed = true;
        slot.signal = None;
        slot.token.clone()
    }

    /// Token accepted so far
    pub(crate) fn received(&self) -> Option<String> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .token
            .clone()
    }
}

pub(crate) fn router(slot: SlotHandle) -> Router {
    Router::new()
        .route(TOKEN_PATH, post(receive_token))
        .route(STATUS_PATH, get(status))
        .with_state(slot)
}

async fn receive_token(
    State(slot): State<SlotHandle>,
    body: std::result::Result<Json<TokenSubmission>, JsonRejection>,
) -> Response {
    let token = body
        .ok()
        .and_then(|Json(submission)| submission.token)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    let Some(token) = token else {
        tracing::warn!("Rejected token submission without a token");
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Token not provided" })),
        )
            .into_response();
    };

    match slot.submit(token) {
        Ok(()) => {
            tracing::info!("Verification token received");
            Json(json!({ "status": "Token received" })).into_response()
        }
        Err(BridgeError::SubmissionClosed) => {
            tracing::warn!("Rejected token submission: the request has expired");
            (
                StatusCode::GONE,
                Json(json!({ "error": "Token request expired" })),
            )
                .into_response()
        }
        Err(_) => {
            tracing::warn!("Rejected token submission: a token was already received");
            (
                StatusCode::CONFLICT,
                Json(json!({ "error": "Token already received" })),
            )
                .into_response()
        }
    }
}

async fn status() -> Json<serde_json::Value> {
    Json(json!({ "status": AWAITING_STATUS }))
}
