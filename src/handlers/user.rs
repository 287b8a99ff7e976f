use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, Path, State};
use axum::Json;

use crate::auth::access::require_self;
use crate::auth::jwt::Claims;
use crate::dtos::user::{
    CreateUserRequest, MessageResponse, PageQuery, RoleStatus, SocialLoginRequest,
    SocialLoginResponse, TokenResponse, UpdateUserRequest,
};
use crate::error::AppError;
use crate::extract::{AppJson, AppQuery};
use crate::middleware::auth::AuthContext;
use crate::models::{Role, User, UserId};
use crate::state::AppState;
use crate::store::{InsertOutcome, Page, SocialLogin, UpdateOutcome};

/// Any unusable body, malformed or incomplete, is reported as `failed`.
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Ok(Json(payload)) = payload else {
        return Err(AppError::failed());
    };
    let new_user = payload.into_new_user().ok_or_else(AppError::failed)?;
    let user = state.users.create_user(new_user).await?;
    tracing::info!(email = %user.email, role = %user.role, "user created");
    Ok(Json(MessageResponse { message: "success" }))
}

pub async fn issue_token(
    State(state): State<AppState>,
    AppJson(claims): AppJson<Claims>,
) -> Result<Json<TokenResponse>, AppError> {
    let token = state.tokens.issue(claims)?;
    Ok(Json(TokenResponse { token }))
}

pub async fn social_login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SocialLoginRequest>,
) -> Result<Json<SocialLoginResponse>, AppError> {
    let new_user = payload.into_new_user().ok_or_else(|| AppError::validation("email is required"))?;
    match state.users.upsert_social_login(new_user).await? {
        SocialLogin::Created(user) => {
            tracing::info!(email = %user.email, "social login user created");
            Ok(Json(SocialLoginResponse::Created(InsertOutcome::new(user.id))))
        }
        SocialLogin::AlreadyExists => Ok(Json(SocialLoginResponse::Exists(MessageResponse { message: "user exists" }))),
    }
}

pub async fn list_users(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<PageQuery>,
) -> Result<Json<Vec<User>>, AppError> {
    let users = state.users.list_by_role(Role::User, Page::try_from(query)?).await?;
    Ok(Json(users))
}

pub async fn list_deliverymen(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<PageQuery>,
) -> Result<Json<Vec<User>>, AppError> {
    let users = state.users.list_by_role(Role::Deliveryman, Page::try_from(query)?).await?;
    Ok(Json(users))
}

/// Profile fields may be changed by the owner or an admin; role changes are
/// admin-only. Promoting to delivery-man also zeroes the delivery stats.
pub async fn update_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> Result<Json<UpdateOutcome>, AppError> {
    let id = UserId::parse_path(&id)?;
    let (profile, role) = payload.into_parts();
    if profile.is_empty() && role.is_none() {
        return Err(AppError::validation("Nothing to update"));
    }

    let caller = state
        .users
        .find_by_email(&auth.email)
        .await?
        .ok_or_else(|| AppError::forbidden("Forbidden"))?;
    let is_admin = caller.role == Role::Admin;
    if !is_admin && (caller.id != id || role.is_some()) {
        return Err(AppError::forbidden("Forbidden"));
    }

    let mut outcome = UpdateOutcome::matched(0);
    if !profile.is_empty() {
        outcome = outcome.and(state.users.update_profile_fields(id, &profile).await?);
    }
    if let Some(role) = role {
        outcome = outcome.and(state.users.change_role(id, role).await?);
        if role == Role::Deliveryman {
            outcome = outcome.and(state.users.init_deliveryman_stats(id).await?);
        }
        tracing::info!(%id, %role, by = %auth.email, "role changed");
    }
    Ok(Json(outcome))
}

pub async fn get_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(email): Path<String>,
) -> Result<Json<User>, AppError> {
    require_self(&auth, &email)?;
    let user = state
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(Json(user))
}

pub async fn get_roles(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(email): Path<String>,
) -> Result<Json<RoleStatus>, AppError> {
    require_self(&auth, &email)?;
    let role = state.users.find_by_email(&email).await?.map(|u| u.role);
    Ok(Json(RoleStatus {
        admin: role == Some(Role::Admin),
        deliveryman: role == Some(Role::Deliveryman),
    }))
}
