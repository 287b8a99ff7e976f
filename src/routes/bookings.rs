use axum::{Router, routing::{get, post, put}, middleware};
use crate::state::AppState;
use crate::handlers::booking::{
    add_booking, list_bookings, get_booking, admin_update_booking, deliveryman_update_booking,
    requester_update_booking,
};
use crate::middleware::auth::{require_auth, require_admin, require_deliveryman};

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/addBooking", post(add_booking))
        .route("/bookings/{email}", get(list_bookings))
        .route("/bookings/booking/{id}", get(get_booking))
        .route("/bookings/update/user/{id}", put(requester_update_booking))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let admin = Router::new()
        .route("/bookings/update/{id}", put(admin_update_booking))
        .layer(middleware::from_fn_with_state(state.clone(), require_admin))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let deliveryman = Router::new()
        .route("/bookings/update/delivery/{id}", put(deliveryman_update_booking))
        .layer(middleware::from_fn_with_state(state.clone(), require_deliveryman))
        .layer(middleware::from_fn_with_state(state, require_auth));

    protected.merge(admin).merge(deliveryman)
}
