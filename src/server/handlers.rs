// src/server/handlers.rs

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, header},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::{Value, json};
use tracing::{debug, error, info};

use super::AppState;
use super::session::{resolve_session, set_cookie_header};
use super::types::{GuessRequest, GuessResponse};
use crate::llm::UpstreamFailure;
use crate::prompt::normalize_guess;

pub async fn status_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "answers": state.game.answers().len(),
        "prompt_style": state.game.prompts().style().as_str(),
    }))
}

/// `POST /guess`: ask the host model about today's answer.
///
/// Always answers 200. Upstream failures turn into the apology text.
pub async fn guess_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<GuessRequest>,
) -> Response {
    let session_id = resolve_session(&headers);
    let answer = state.game.todays_answer(Utc::now());
    let guess = normalize_guess(&request.text);
    let prompt = state.game.prompt_for(answer, &request.text);

    debug!(session_id = %session_id, prompt = %prompt.to_log_text(), "rendered prompt");

    let outcome = match request.api_key().or(state.default_api_key.as_deref()) {
        Some(key) => state.completion.complete(&prompt, key).await,
        None => Err(UpstreamFailure::MissingCredential),
    };

    match &outcome {
        Ok(completion) if state.log_upstream_response => {
            debug!(session_id = %session_id, response = %completion.raw, "upstream response");
        }
        Ok(_) => {}
        Err(e) => {
            error!(session_id = %session_id, error = %e, "completion failed");
        }
    }

    let reply = GuessResponse::from_outcome(&outcome);
    info!(
        session_id = %session_id,
        answer = %answer.answer,
        guess_raw = %request.text,
        guess = %guess,
        response_text = %reply.text,
        "guess answered"
    );

    let mut response = Json(reply).into_response();
    if let Some(cookie) = set_cookie_header(&session_id) {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    response
}
