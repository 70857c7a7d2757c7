use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::models::AuthUser;
use crate::AppState;

/// Session token from `Authorization: Bearer` or the session cookie.
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string());

    let prefix = format!("{}=", cookie_name);
    let from_cookie = || {
        headers
            .get("cookie")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .split(';')
            .map(str::trim)
            .find_map(|c| c.strip_prefix(prefix.as_str()))
            .map(str::to_string)
    };

    bearer.or_else(from_cookie).filter(|t| !t.is_empty())
}

fn reject(status: StatusCode, error: &str) -> Response {
    (status, Json(serde_json::json!({ "error": error }))).into_response()
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers, &state.config.session_cookie)
            .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "Not authenticated"))?;

        match state.store.resolve_session(&token).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(reject(StatusCode::UNAUTHORIZED, "Invalid session")),
            Err(e) => {
                tracing::error!("Session lookup failed: {}", e);
                Err(reject(StatusCode::INTERNAL_SERVER_ERROR, "Database error"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc"));
        headers.insert("cookie", HeaderValue::from_static("parley_session=xyz"));
        assert_eq!(session_token(&headers, "parley_session").as_deref(), Some("abc"));
    }

    #[test]
    fn cookie_is_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "cookie",
            HeaderValue::from_static("theme=dark; parley_session=xyz; lang=en"),
        );
        assert_eq!(session_token(&headers, "parley_session").as_deref(), Some("xyz"));
        assert_eq!(session_token(&headers, "other"), None);
    }

    #[test]
    fn empty_token_is_absent() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer "));
        assert_eq!(session_token(&headers, "parley_session"), None);
    }
}
