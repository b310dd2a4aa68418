//! Issue report entity models and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use civica_core::report::ReportStatus;
use civica_core::types::{DbId, Timestamp};

/// Full report row from the `reports` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Report {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub report_type: String,
    pub category: String,
    pub location: String,
    pub incident_date: NaiveDate,
    pub incident_time: String,
    pub status: ReportStatus,
    pub submitted_by: DbId,
    pub assigned_to: Option<DbId>,
    pub evidence_path: Option<String>,
    pub admin_notes: Vec<String>,
    pub resolved_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Comment appended by the submitter or an admin.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReportComment {
    pub id: DbId,
    pub report_id: DbId,
    pub user_id: DbId,
    pub text: String,
    pub created_at: Timestamp,
}

/// Report row with submitter/assignee names resolved for admin listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReportWithNames {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub report: Report,
    pub submitter_name: String,
    pub assignee_name: Option<String>,
}

/// API-facing report detail with its comment thread.
#[derive(Debug, Serialize)]
pub struct ReportResponse {
    #[serde(flatten)]
    pub report: Report,
    pub comments: Vec<ReportComment>,
}

/// DTO for creating a report; status starts as `pending`.
#[derive(Debug, Deserialize)]
pub struct CreateReport {
    pub title: String,
    pub description: String,
    pub report_type: String,
    pub category: String,
    pub location: String,
    pub incident_date: NaiveDate,
    pub incident_time: String,
}

/// Per-status and per-category counts plus the most recently updated reports.
#[derive(Debug, Serialize)]
pub struct ReportStats {
    pub by_status: Vec<StatusCount>,
    pub by_category: Vec<CategoryCount>,
    pub recent: Vec<ReportWithNames>,
}

#[derive(Debug, FromRow, Serialize)]
pub struct StatusCount {
    pub status: ReportStatus,
    pub count: i64,
}

#[derive(Debug, FromRow, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}
