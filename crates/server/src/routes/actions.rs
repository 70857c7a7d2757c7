use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

use crate::models::AuthUser;
use crate::queue::Origin;
use crate::ws::actions::Action;
use crate::AppState;

/// POST /api/actions
///
/// Same envelope as the gateway. Results are broadcast to connected
/// clients; the response only confirms the action was queued.
pub async fn submit_action(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    body: String,
) -> impl IntoResponse {
    let action = match Action::decode(&body) {
        Ok(action) => action,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": format!("malformed action: {}", e)})),
            )
                .into_response()
        }
    };

    let kind = action.kind();
    let origin = Origin {
        client_id: None,
        user_id: user.id,
    };
    match state.hub.publish(Some(origin), action).await {
        Ok(()) => (
            StatusCode::ACCEPTED,
            Json(serde_json::json!({"queued": true, "messageOption": kind})),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to enqueue {} for user {}: {}", kind, user.id, e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({"error": "Action queue unavailable"})),
            )
                .into_response()
        }
    }
}
