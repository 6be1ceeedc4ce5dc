//! Calendar feed handler

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue},
};
use serde::Deserialize;
use tracing::warn;

use crate::feed::render_feed;
use crate::{error::ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub user: String,
    pub secret: String,
}

/// Compares two secrets without short-circuiting on the first differing byte
fn secrets_match(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        return false;
    }
    provided
        .iter()
        .zip(expected)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// Serves a user's appointment feed as text/calendar
///
/// The secret comes from the feed URL because calendar apps cannot send
/// headers; a wrong secret and a disabled feed both answer 404 so probing
/// cannot tell the endpoint apart from an unknown route.
pub async fn calendar_feed(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Result<(HeaderMap, String), ApiError> {
    if !state.config.feed_enabled || !secrets_match(&query.secret, &state.config.feed_secret) {
        warn!(user = %query.user, "rejected calendar feed request");
        return Err(ApiError::NotFound("calendar feed".to_string()));
    }

    let events = state.events.events_for(&query.user)?;
    let body = render_feed(&events);

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/calendar; charset=utf-8"),
    );
    Ok((headers, body))
}
