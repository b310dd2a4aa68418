//! Route definitions for the `/admin` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// POST   /register    -> admin registration (setup secret)
/// POST   /login       -> admin login
/// GET    /users       -> user listing (admin)
/// GET    /users/{id}  -> user detail (admin)
/// PUT    /users/{id}  -> user update (admin)
/// DELETE /users/{id}  -> user deletion (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(admin::register_admin))
        .route("/login", post(admin::login_admin))
        .route("/users", get(admin::list_users))
        .route(
            "/users/{id}",
            get(admin::get_user)
                .put(admin::update_user)
                .delete(admin::delete_user),
        )
}
