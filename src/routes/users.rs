use axum::{Router, routing::{post, get, put}, middleware};
use crate::state::AppState;
use crate::handlers::user::{
    create_user, issue_token, social_login, list_users, list_deliverymen, update_user, get_user, get_roles,
};
use crate::middleware::auth::{require_auth, require_admin};

pub fn routes(state: AppState) -> Router<AppState> {
    let open = Router::new()
        .route("/users", post(create_user))
        .route("/jwt", post(issue_token))
        .route("/socialLoginUsers", post(social_login));

    let protected = Router::new()
        .route("/users/update/{id}", put(update_user))
        .route("/users/{email}", get(get_user))
        .route("/users/roles/{email}", get(get_roles))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // Admin only: role checked after the token
    let admin = Router::new()
        .route("/users", get(list_users))
        .route("/users/deliveryman", get(list_deliverymen))
        .layer(middleware::from_fn_with_state(state.clone(), require_admin))
        .layer(middleware::from_fn_with_state(state, require_auth));

    open.merge(protected).merge(admin)
}
