//! Contact form relay.
//!
//! Accepts the message, queues it for the relay and answers immediately;
//! whether the email ultimately lands is not this route's problem.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use cruffs_core::ValidationError;
use cruffs_notify::NotifyEvent;

use crate::error::ApiResult;
use crate::state::AppState;

/// Upper bound on the message body. Anything longer is someone's script,
/// not a candy question.
const MAX_MESSAGE_LEN: usize = 4000;

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

pub async fn send_message(
    State(state): State<AppState>,
    Json(req): Json<ContactRequest>,
) -> ApiResult<StatusCode> {
    if req.name.trim().is_empty() {
        return Err(ValidationError::Required { field: "name" }.into());
    }
    if req.email.trim().is_empty() {
        return Err(ValidationError::Required { field: "email" }.into());
    }
    let message = req.message.trim();
    if message.is_empty() {
        return Err(ValidationError::Required { field: "message" }.into());
    }
    if message.len() > MAX_MESSAGE_LEN {
        return Err(ValidationError::InvalidFormat {
            field: "message",
            reason: "message too long",
        }
        .into());
    }

    state.notifier.enqueue(NotifyEvent::ContactMessage {
        email: req.email.trim().to_string(),
        name: req.name.trim().to_string(),
        message: message.to_string(),
    });

    Ok(StatusCode::ACCEPTED)
}
