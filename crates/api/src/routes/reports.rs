//! Route definitions for the `/reports` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, patch, post, put};
use axum::Router;

use civica_core::upload::MAX_EVIDENCE_BYTES;

use crate::handlers::reports;
use crate::state::AppState;

/// Headroom on top of the file ceiling for multipart boundaries and part
/// headers.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Routes mounted at `/reports`.
///
/// ```text
/// GET    /                     -> own reports; all for admins
/// POST   /                     -> submit (requires auth)
/// GET    /evidence/{filename}  -> evidence download (submitter or admin)
/// GET    /admin/all            -> all reports (admin)
/// PUT    /admin/{id}/status    -> triage with note (admin)
/// GET    /admin/stats          -> dashboard statistics (admin)
/// GET    /{id}                 -> detail (submitter or admin)
/// PATCH  /{id}/status          -> status change (admin)
/// PATCH  /{id}/assign          -> assignment (admin)
/// GET    /{id}/comments        -> comment thread (submitter or admin)
/// POST   /{id}/comments        -> append comment (submitter or admin)
/// POST   /{id}/evidence        -> evidence upload (submitter or admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(reports::list_reports).post(reports::create_report),
        )
        .route("/evidence/{filename}", get(reports::serve_evidence))
        .route("/admin/all", get(reports::admin_list_reports))
        .route("/admin/{id}/status", put(reports::admin_triage_report))
        .route("/admin/stats", get(reports::report_stats))
        .route("/{id}", get(reports::get_report))
        .route("/{id}/status", patch(reports::update_report_status))
        .route("/{id}/assign", patch(reports::assign_report))
        .route(
            "/{id}/comments",
            get(reports::list_report_comments).post(reports::add_report_comment),
        )
        .route(
            "/{id}/evidence",
            // Raise axum's default 2 MB body cap so the handler, not the
            // extractor, enforces the evidence size ceiling.
            post(reports::upload_evidence)
                .layer(DefaultBodyLimit::max(MAX_EVIDENCE_BYTES + MULTIPART_OVERHEAD)),
        )
}
