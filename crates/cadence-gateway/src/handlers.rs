// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the chat API.
//!
//! Handles POST /chat, GET /chat/history, GET /health.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use cadence_core::CadenceError;
use cadence_core::types::SessionToken;
use cadence_identity::RequestCredentials;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::server::GatewayState;

/// Request body for POST /chat.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Raw chat message.
    pub message: String,
    /// Optional caller identifier.
    #[serde(default)]
    pub identifier: Option<String>,
    /// Optional session token from a previous reply.
    #[serde(default)]
    pub session: Option<String>,
}

/// Response body for POST /chat.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// Bot reply text.
    pub reply: String,
    /// Session token for subsequent requests, when one was issued.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
}

/// Query parameters for GET /chat/history.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub session: Option<String>,
}

/// Response body for GET /chat/history.
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    /// Transcript lines, oldest first.
    pub history: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn credentials(identifier: Option<String>, session: Option<String>) -> RequestCredentials {
    RequestCredentials {
        identifier: identifier.filter(|s| !s.trim().is_empty()),
        session: session
            .filter(|s| !s.trim().is_empty())
            .map(SessionToken),
    }
}

/// Map a pipeline error to an HTTP response. Internal detail stays in the
/// logs; clients get a generic message for anything unexpected.
fn error_response(err: CadenceError) -> Response {
    match err {
        CadenceError::IdentityRequired => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: err.to_string(),
            }),
        )
            .into_response(),
        other => {
            error!(error = %other, "request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "internal error".to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// POST /chat
///
/// Resolves the caller's identity and runs the message through the
/// dialogue/router pipeline, returning the reply synchronously.
pub async fn post_chat(
    State(state): State<GatewayState>,
    Json(body): Json<ChatRequest>,
) -> Response {
    let creds = credentials(body.identifier, body.session);
    let identity = match state.resolver.resolve(&creds).await {
        Ok(identity) => identity,
        Err(e) => return error_response(e),
    };

    match state.engine.handle_message(&identity.key, &body.message).await {
        Ok(reply) => Json(ChatResponse {
            reply,
            session: identity.issued_session.map(|t| t.0),
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /chat/history?identifier=...
///
/// Read-only: resolution here never registers a user or mints a session.
/// Unknown callers get an empty transcript.
pub async fn get_history(
    State(state): State<GatewayState>,
    Query(query): Query<HistoryQuery>,
) -> Response {
    let creds = credentials(query.identifier, query.session);
    let history = match state.resolver.lookup(&creds).await {
        Some(identity) => state.engine.history(&identity.key).await,
        None => Vec::new(),
    };
    Json(HistoryResponse {
        history,
        session: None,
    })
    .into_response()
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_deserializes_with_message_only() {
        let json = r#"{"message": "post loader"}"#;
        let req: ChatRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.message, "post loader");
        assert!(req.identifier.is_none());
        assert!(req.session.is_none());
    }

    #[test]
    fn chat_request_deserializes_with_all_fields() {
        let json = r#"{
            "message": "hlo",
            "identifier": "alice",
            "session": "sess-123"
        }"#;
        let req: ChatRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.message, "hlo");
        assert_eq!(req.identifier.as_deref(), Some("alice"));
        assert_eq!(req.session.as_deref(), Some("sess-123"));
    }

    #[test]
    fn chat_response_omits_absent_session() {
        let resp = ChatResponse {
            reply: "hey".to_string(),
            session: None,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"reply\":\"hey\""));
        assert!(!json.contains("session"));
    }

    #[test]
    fn health_response_serializes() {
        let resp = HealthResponse {
            status: "ok".to_string(),
            version: "0.1.0".to_string(),
            uptime_secs: 42,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("\"uptime_secs\":42"));
    }

    #[test]
    fn blank_credentials_are_dropped() {
        let creds = credentials(Some("  ".to_string()), Some("".to_string()));
        assert!(creds.identifier.is_none());
        assert!(creds.session.is_none());
    }
}
