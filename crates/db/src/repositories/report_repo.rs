//! Repository for the `reports` table and its comments.

use sqlx::PgPool;

use civica_core::report::ReportStatus;
use civica_core::types::DbId;

use crate::models::report::{
    CategoryCount, CreateReport, Report, ReportComment, ReportStats, ReportWithNames, StatusCount,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, report_type, category, location, incident_date, \
                       incident_time, status, submitted_by, assigned_to, evidence_path, \
                       admin_notes, resolved_at, created_at, updated_at";

/// Column list qualified with the `r.` alias for joined queries.
const JOINED_COLUMNS: &str =
    "r.id, r.title, r.description, r.report_type, r.category, r.location, r.incident_date, \
     r.incident_time, r.status, r.submitted_by, r.assigned_to, r.evidence_path, \
     r.admin_notes, r.resolved_at, r.created_at, r.updated_at";

/// Provides persistence operations for issue reports.
pub struct ReportRepo;

impl ReportRepo {
    /// Insert a new report with initial status `pending`.
    pub async fn create(
        pool: &PgPool,
        submitted_by: DbId,
        input: &CreateReport,
    ) -> Result<Report, sqlx::Error> {
        let query = format!(
            "INSERT INTO reports
                (title, description, report_type, category, location,
                 incident_date, incident_time, submitted_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Report>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.report_type)
            .bind(&input.category)
            .bind(&input.location)
            .bind(input.incident_date)
            .bind(&input.incident_time)
            .bind(submitted_by)
            .fetch_one(pool)
            .await
    }

    /// Find a report by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Report>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reports WHERE id = $1");
        sqlx::query_as::<_, Report>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the report an uploaded evidence file belongs to.
    pub async fn find_by_evidence_path(
        pool: &PgPool,
        evidence_path: &str,
    ) -> Result<Option<Report>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reports WHERE evidence_path = $1");
        sqlx::query_as::<_, Report>(&query)
            .bind(evidence_path)
            .fetch_optional(pool)
            .await
    }

    /// Admin listing: all reports with submitter and assignee names resolved,
    /// newest first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<ReportWithNames>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS},
                    u.name AS submitter_name,
                    a.name AS assignee_name
             FROM reports r
             JOIN users u ON u.id = r.submitted_by
             LEFT JOIN users a ON a.id = r.assigned_to
             ORDER BY r.created_at DESC"
        );
        sqlx::query_as::<_, ReportWithNames>(&query)
            .fetch_all(pool)
            .await
    }

    /// Reports submitted by a given user, newest first.
    pub async fn list_by_submitter(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<Report>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reports WHERE submitted_by = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Report>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Set the report status. `resolved_at` is stamped when the new status
    /// closes the report (resolved/rejected) and cleared when it reopens.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: ReportStatus,
    ) -> Result<Option<Report>, sqlx::Error> {
        let query = format!(
            "UPDATE reports SET
                status = $2,
                resolved_at = CASE WHEN $2 IN ('resolved', 'rejected') THEN NOW() ELSE NULL END,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Report>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Admin triage: set the status and append an admin note in one statement.
    pub async fn update_status_with_note(
        pool: &PgPool,
        id: DbId,
        status: ReportStatus,
        note: Option<&str>,
    ) -> Result<Option<Report>, sqlx::Error> {
        let query = format!(
            "UPDATE reports SET
                status = $2,
                admin_notes = CASE WHEN $3::TEXT IS NULL THEN admin_notes
                                   ELSE array_append(admin_notes, $3) END,
                resolved_at = CASE WHEN $2 IN ('resolved', 'rejected') THEN NOW() ELSE NULL END,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Report>(&query)
            .bind(id)
            .bind(status)
            .bind(note)
            .fetch_optional(pool)
            .await
    }

    /// Assign a report to an admin. The assignee id is stored verbatim; no
    /// existence check is performed.
    pub async fn assign(
        pool: &PgPool,
        id: DbId,
        assigned_to: DbId,
    ) -> Result<Option<Report>, sqlx::Error> {
        let query = format!(
            "UPDATE reports SET assigned_to = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Report>(&query)
            .bind(id)
            .bind(assigned_to)
            .fetch_optional(pool)
            .await
    }

    /// Append a comment, returning the created row.
    pub async fn add_comment(
        pool: &PgPool,
        report_id: DbId,
        user_id: DbId,
        text: &str,
    ) -> Result<ReportComment, sqlx::Error> {
        let comment = sqlx::query_as::<_, ReportComment>(
            "INSERT INTO report_comments (report_id, user_id, text)
             VALUES ($1, $2, $3)
             RETURNING id, report_id, user_id, text, created_at",
        )
        .bind(report_id)
        .bind(user_id)
        .bind(text)
        .fetch_one(pool)
        .await?;

        sqlx::query("UPDATE reports SET updated_at = NOW() WHERE id = $1")
            .bind(report_id)
            .execute(pool)
            .await?;

        Ok(comment)
    }

    /// Comments for a report in insertion order.
    pub async fn list_comments(
        pool: &PgPool,
        report_id: DbId,
    ) -> Result<Vec<ReportComment>, sqlx::Error> {
        sqlx::query_as::<_, ReportComment>(
            "SELECT id, report_id, user_id, text, created_at
             FROM report_comments WHERE report_id = $1 ORDER BY created_at, id",
        )
        .bind(report_id)
        .fetch_all(pool)
        .await
    }

    /// Record the stored evidence path for a report.
    pub async fn set_evidence_path(
        pool: &PgPool,
        id: DbId,
        evidence_path: &str,
    ) -> Result<Option<Report>, sqlx::Error> {
        let query = format!(
            "UPDATE reports SET evidence_path = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Report>(&query)
            .bind(id)
            .bind(evidence_path)
            .fetch_optional(pool)
            .await
    }

    /// Aggregate statistics for the admin dashboard: counts by status, counts
    /// by category, and the 5 most recently updated reports.
    pub async fn stats(pool: &PgPool) -> Result<ReportStats, sqlx::Error> {
        let by_status = sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count FROM reports GROUP BY status ORDER BY count DESC",
        )
        .fetch_all(pool)
        .await?;

        let by_category = sqlx::query_as::<_, CategoryCount>(
            "SELECT category, COUNT(*) AS count FROM reports GROUP BY category ORDER BY count DESC",
        )
        .fetch_all(pool)
        .await?;

        let query = format!(
            "SELECT {JOINED_COLUMNS},
                    u.name AS submitter_name,
                    a.name AS assignee_name
             FROM reports r
             JOIN users u ON u.id = r.submitted_by
             LEFT JOIN users a ON a.id = r.assigned_to
             ORDER BY r.updated_at DESC
             LIMIT 5"
        );
        let recent = sqlx::query_as::<_, ReportWithNames>(&query)
            .fetch_all(pool)
            .await?;

        Ok(ReportStats {
            by_status,
            by_category,
            recent,
        })
    }
}
