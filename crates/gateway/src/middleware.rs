//! Middleware for authentication and other cross-cutting concerns

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use cadence_database::User;
use std::sync::Arc;

use crate::error::GatewayError;
use crate::state::GatewayState;

/// The authenticated caller, inserted into request extensions by
/// [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Authentication middleware that validates bearer tokens and resolves the
/// identity behind them.
pub async fn auth_middleware(
    State(state): State<Arc<GatewayState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, GatewayError> {
    let token = bearer_token(&request)?;

    let user = state
        .directory
        .authenticate(&state.jwt, &token)
        .await
        .map_err(GatewayError::from)?;

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

fn bearer_token(request: &Request) -> Result<String, GatewayError> {
    let value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| {
            GatewayError::AuthenticationFailed("missing authorization header".to_string())
        })?;

    let mut parts = value.split_whitespace();
    let scheme = parts.next().unwrap_or("");
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(GatewayError::AuthenticationFailed(
            "invalid authorization scheme".to_string(),
        ));
    }

    let token = parts.next().unwrap_or("");
    if token.is_empty() {
        return Err(GatewayError::AuthenticationFailed(
            "missing bearer token".to_string(),
        ));
    }

    Ok(token.to_string())
}
