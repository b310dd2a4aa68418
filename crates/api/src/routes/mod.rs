pub mod admin;
pub mod auth;
pub mod health;
pub mod petitions;
pub mod reports;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                     citizen registration (public)
/// /auth/login                        citizen login (public)
/// /auth/me                           current user (requires auth)
///
/// /petitions                         list public, create (POST requires auth)
/// /petitions/user                    own petitions (requires auth)
/// /petitions/check-deadlines         deadline sweep (POST)
/// /petitions/{id}                    detail, update, delete
/// /petitions/{id}/sign               sign (POST, requires auth)
/// /petitions/{id}/updates            progress update (POST)
/// /petitions/{id}/image              image upload (POST, multipart)
/// /petitions/admin/all               all petitions (admin)
/// /petitions/admin/{id}/review       review verdict (PUT, admin)
///
/// /reports                           own reports (all for admins), submit
/// /reports/{id}                      detail (submitter or admin)
/// /reports/{id}/status               status change (PATCH, admin)
/// /reports/{id}/assign               assignment (PATCH, admin)
/// /reports/{id}/comments             list, append (submitter or admin)
/// /reports/{id}/evidence             evidence upload (POST, multipart)
/// /reports/evidence/{filename}       evidence download (submitter or admin)
/// /reports/admin/all                 all reports (admin)
/// /reports/admin/{id}/status         triage with note (PUT, admin)
/// /reports/admin/stats               dashboard statistics (admin)
///
/// /admin/register                    admin registration (setup secret)
/// /admin/login                       admin login (public)
/// /admin/users                       user listing (admin)
/// /admin/users/{id}                  get, update, delete (admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/petitions", petitions::router())
        .nest("/reports", reports::router())
        .nest("/admin", admin::router())
}
