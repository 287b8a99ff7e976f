use axum::body::Body;
use axum::extract::{Extension, State};
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use http::header::AUTHORIZATION;

use crate::auth::access::require_role;
use crate::auth::jwt::Claims;
use crate::error::AppError;
use crate::models::{Role, User};
use crate::state::AppState;

#[derive(Clone, Debug)]
pub struct AuthContext {
    pub email: String,
    pub claims: Claims,
}

/// Stored record of a caller that passed a role check.
#[derive(Clone, Debug)]
pub struct Caller(pub User);

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::unauthenticated("Access Forbidden"))?;

    // Expect "Bearer <token>"
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::unauthenticated("Access Forbidden"))?;

    let claims = state.tokens.verify(token.trim())?;

    // Attach context
    req.extensions_mut().insert(AuthContext {
        email: claims.email.clone(),
        claims,
    });

    Ok(next.run(req).await)
}

pub async fn require_admin(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    require_role_then(state, auth, Role::Admin, req, next).await
}

pub async fn require_deliveryman(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    require_role_then(state, auth, Role::Deliveryman, req, next).await
}

async fn require_role_then(
    state: AppState,
    auth: AuthContext,
    role: Role,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let user = require_role(state.users.as_ref(), &auth, role).await?;
    req.extensions_mut().insert(Caller(user));
    Ok(next.run(req).await)
}
