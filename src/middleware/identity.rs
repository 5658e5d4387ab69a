use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::error::AppError;

/// Header set by the auth gateway after it has verified the session
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller, available to handlers as `Extension<CurrentUser>`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurrentUser(pub Uuid);

impl CurrentUser {
    pub fn id(&self) -> Uuid {
        self.0
    }
}

/// Rejects requests without a valid `x-user-id` with 401
pub async fn require_user(mut request: Request, next: Next) -> Response {
    let user = request
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| Uuid::parse_str(s.trim()).ok())
        .map(CurrentUser);

    match user {
        Some(user) => {
            tracing::Span::current().record("user_id", tracing::field::display(user.0));
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        None => AppError::Unauthorized("Missing or invalid user identity".to_string())
            .into_response(),
    }
}
