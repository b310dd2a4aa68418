//! Route definitions for the `/petitions` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;

use civica_core::upload::MAX_IMAGE_BYTES;

use crate::handlers::petitions;
use crate::state::AppState;

/// Headroom on top of the file ceiling for multipart boundaries and part
/// headers.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Routes mounted at `/petitions`.
///
/// The static segments (`/user`, `/check-deadlines`, `/admin/...`) are
/// registered alongside `/{id}`; Axum gives static matches priority.
///
/// ```text
/// GET    /                  -> public listing
/// POST   /                  -> create (requires auth)
/// GET    /user              -> own petitions (requires auth)
/// POST   /check-deadlines   -> deadline sweep
/// GET    /admin/all         -> all petitions (admin)
/// PUT    /admin/{id}/review -> review verdict (admin)
/// GET    /{id}              -> detail
/// PUT    /{id}              -> edit (creator or admin)
/// DELETE /{id}              -> delete (creator)
/// POST   /{id}/sign         -> sign (requires auth)
/// POST   /{id}/updates      -> progress update (creator or admin)
/// POST   /{id}/image        -> image upload (creator or admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(petitions::list_petitions).post(petitions::create_petition),
        )
        .route("/user", get(petitions::list_my_petitions))
        .route("/check-deadlines", post(petitions::check_deadlines))
        .route("/admin/all", get(petitions::admin_list_petitions))
        .route("/admin/{id}/review", put(petitions::review_petition))
        .route(
            "/{id}",
            get(petitions::get_petition)
                .put(petitions::update_petition)
                .delete(petitions::delete_petition),
        )
        .route("/{id}/sign", post(petitions::sign_petition))
        .route("/{id}/updates", post(petitions::add_petition_update))
        .route(
            "/{id}/image",
            // Raise axum's default 2 MB body cap so the handler, not the
            // extractor, enforces the image size ceiling.
            post(petitions::upload_petition_image)
                .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES + MULTIPART_OVERHEAD)),
        )
}
