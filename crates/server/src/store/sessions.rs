use chrono::{DateTime, Utc};

use super::{Store, StoreError};
use crate::models::AuthUser;

impl Store {
    /// Maps an opaque session token to its user. Expired or unknown tokens
    /// resolve to `None`.
    pub async fn resolve_session(&self, token: &str) -> Result<Option<AuthUser>, StoreError> {
        if token.is_empty() {
            return Ok(None);
        }

        let row = sqlx::query_as::<_, (i64, String, String)>(
            r#"SELECT u.id, u.nickname, s.expires_at
               FROM sessions s
               JOIN users u ON u.id = s.user_id
               WHERE s.token = ?"#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        let Some((id, nickname, expires_at)) = row else {
            return Ok(None);
        };

        let expired = DateTime::parse_from_rfc3339(&expires_at)
            .map(|at| at.with_timezone(&Utc) < Utc::now())
            .unwrap_or(true);
        if expired {
            tracing::debug!("Session for user {} expired at {}", id, expires_at);
            return Ok(None);
        }

        Ok(Some(AuthUser { id, nickname }))
    }
}
