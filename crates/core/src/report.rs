//! Issue report lifecycle: status enum, transition validation, and comment
//! rules.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum length for a report comment (characters).
pub const MAX_COMMENT_LENGTH: usize = 2_000;

/// Triage status of an issue report.
///
/// Every report starts as `Pending`. Status changes are admin-only;
/// `resolved_at` is set exactly when the status becomes `Resolved` or
/// `Rejected` and cleared when it leaves those states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(type_name = "text", rename_all = "kebab-case")]
pub enum ReportStatus {
    Pending,
    InProgress,
    Resolved,
    Rejected,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::InProgress => "in-progress",
            ReportStatus::Resolved => "resolved",
            ReportStatus::Rejected => "rejected",
        }
    }

    /// Whether this status closes the report and stamps `resolved_at`.
    pub fn is_closing(&self) -> bool {
        matches!(self, ReportStatus::Resolved | ReportStatus::Rejected)
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statuses accepted by the dedicated admin triage route.
///
/// The general PATCH route accepts the full enum; this route deliberately
/// excludes `in-progress` because it pairs the status change with an admin
/// note and a final disposition.
pub const ADMIN_TRIAGE_STATUSES: &[ReportStatus] = &[
    ReportStatus::Pending,
    ReportStatus::Resolved,
    ReportStatus::Rejected,
];

/// Validate a status against the narrow admin-triage set.
pub fn validate_triage_status(status: ReportStatus) -> Result<(), CoreError> {
    if ADMIN_TRIAGE_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid triage status '{status}'. Must be one of: pending, resolved, rejected"
        )))
    }
}

/// Validate a report comment body: non-empty after trimming, bounded length.
pub fn validate_comment(text: &str) -> Result<(), CoreError> {
    if text.trim().is_empty() {
        return Err(CoreError::Validation(
            "Comment text must not be empty".to_string(),
        ));
    }
    if text.len() > MAX_COMMENT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Comment exceeds maximum length of {} characters (got {})",
            MAX_COMMENT_LENGTH,
            text.len()
        )));
    }
    Ok(())
}
