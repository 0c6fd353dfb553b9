// src/server/session.rs

//! `session_id` cookie bookkeeping. The id is only used to correlate log
//! lines; nothing is stored server-side.

use axum::http::{HeaderMap, HeaderValue, header};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "session_id";

/// The caller's `session_id` cookie, if it sent a non-empty one.
pub fn session_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| name.trim() == SESSION_COOKIE && !value.trim().is_empty())
        .map(|(_, value)| value.trim().to_string())
}

/// Existing session id, or a fresh UUID v4.
pub fn resolve_session(headers: &HeaderMap) -> String {
    session_from_headers(headers).unwrap_or_else(|| Uuid::new_v4().to_string())
}

pub fn set_cookie_header(session_id: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!("{SESSION_COOKIE}={session_id}; Path=/; SameSite=Lax")).ok()
}
