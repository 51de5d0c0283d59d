use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::AppState;

/// Gate for every API route. The internal token header (used by the tick
/// driver and trusted automation) always passes; otherwise access is open
/// only when the server is bound to loopback. Exposing the API on a
/// non-loopback address requires the token.
pub async fn require_auth(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(header) = req.headers().get("x-newsdesk-internal-token")
        && let Ok(val) = header.to_str()
        && val == state.internal_token
    {
        return next.run(req).await;
    }

    let is_loopback = state.api_host == "127.0.0.1"
        || state.api_host == "::1"
        || state.api_host == "localhost";
    if is_loopback {
        return next.run(req).await;
    }

    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": "Missing or invalid x-newsdesk-internal-token header"
        })),
    )
        .into_response()
}
