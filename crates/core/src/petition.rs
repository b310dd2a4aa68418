//! Petition lifecycle: status enums, transition rules, goal and deadline
//! validation, and signature-progress math.
//!
//! Both status fields are closed enums rather than free-form strings so that
//! an illegal state cannot survive past the deserialization boundary.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Signature goal applied when the caller omits the field or supplies an
/// invalid value.
pub const DEFAULT_GOAL: i32 = 100;

/// Smallest signature goal a petition may carry.
pub const MIN_GOAL: i32 = 10;

/// Display name recorded on a signature when neither the credential nor the
/// user store can supply one.
pub const ANONYMOUS_SIGNER_NAME: &str = "Anonymous Supporter";

// ---------------------------------------------------------------------------
// Status enums
// ---------------------------------------------------------------------------

/// Lifecycle status of a petition.
///
/// `Active` is the only non-terminal state:
/// - `Active` -> `Completed` when signatures reach the goal
/// - `Active` -> `Expired` via the deadline sweep
/// - `Active` -> `Rejected` when an admin review rejects the petition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum PetitionStatus {
    Active,
    Completed,
    Expired,
    Rejected,
}

impl PetitionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PetitionStatus::Active => "active",
            PetitionStatus::Completed => "completed",
            PetitionStatus::Expired => "expired",
            PetitionStatus::Rejected => "rejected",
        }
    }

    /// Whether the petition may still be edited (or signed, subject to the
    /// review gate). All states other than `Active` are terminal for edits.
    pub fn is_active(&self) -> bool {
        matches!(self, PetitionStatus::Active)
    }
}

impl std::fmt::Display for PetitionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Admin review verdict on a petition.
///
/// `Pending` -> `Approved` | `Rejected`; independent of [`PetitionStatus`]
/// except that a rejected review cascades the petition to
/// [`PetitionStatus::Rejected`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

/// Resolve the effective signature goal from caller input.
///
/// Absent or sub-minimum values fall back to [`DEFAULT_GOAL`] rather than
/// erroring, matching the forgiving create semantics.
pub fn resolve_goal(requested: Option<i32>) -> i32 {
    match requested {
        Some(g) if g >= MIN_GOAL => g,
        _ => DEFAULT_GOAL,
    }
}

/// Validate that a petition deadline lies strictly in the future.
pub fn validate_deadline(deadline: Timestamp, now: Timestamp) -> Result<(), CoreError> {
    if deadline <= now {
        return Err(CoreError::Validation(
            "Deadline must be in the future".to_string(),
        ));
    }
    Ok(())
}

/// Validate that a petition may be edited in its current status.
pub fn validate_editable(status: PetitionStatus) -> Result<(), CoreError> {
    if !status.is_active() {
        return Err(CoreError::Validation(format!(
            "Cannot edit a petition with status: {status}"
        )));
    }
    Ok(())
}

/// Validate that a petition can accept a new signature.
///
/// Signing requires the petition to be `active` AND its review to be
/// `approved`. The already-signed check is enforced at the persistence layer
/// inside the signing transaction.
pub fn validate_signable(status: PetitionStatus, review: ReviewStatus) -> Result<(), CoreError> {
    if !status.is_active() {
        return Err(CoreError::Validation(format!(
            "Cannot sign a petition with status: {status}"
        )));
    }
    if review != ReviewStatus::Approved {
        return Err(CoreError::Validation(format!(
            "Cannot sign a petition whose review status is: {review}"
        )));
    }
    Ok(())
}

/// Validate an admin review verdict. Only `approved` and `rejected` are
/// acceptable verdicts; `pending` is the initial state, not a decision.
pub fn validate_review_verdict(verdict: ReviewStatus) -> Result<(), CoreError> {
    if verdict == ReviewStatus::Pending {
        return Err(CoreError::Validation(
            "Review status must be 'approved' or 'rejected'".to_string(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Derived values
// ---------------------------------------------------------------------------

/// Percentage of the signature goal reached, rounded, clamped to 100.
///
/// `min(round(100 * signatures / goal), 100)` -- monotone non-decreasing as
/// signatures are added.
pub fn percentage_complete(signature_count: i64, goal: i32) -> i32 {
    if goal <= 0 {
        return 0;
    }
    let pct = (signature_count as f64 * 100.0 / goal as f64).round() as i64;
    pct.min(100) as i32
}

/// Whether a signature count satisfies the goal.
pub fn goal_reached(signature_count: i64, goal: i32) -> bool {
    signature_count >= goal as i64
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn goal_defaults_when_absent() {
        assert_eq!(resolve_goal(None), DEFAULT_GOAL);
    }

    #[test]
    fn goal_defaults_when_below_minimum() {
        assert_eq!(resolve_goal(Some(0)), DEFAULT_GOAL);
        assert_eq!(resolve_goal(Some(9)), DEFAULT_GOAL);
        assert_eq!(resolve_goal(Some(-5)), DEFAULT_GOAL);
    }

    #[test]
    fn goal_accepted_at_minimum_and_above() {
        assert_eq!(resolve_goal(Some(MIN_GOAL)), MIN_GOAL);
        assert_eq!(resolve_goal(Some(5_000)), 5_000);
    }

    #[test]
    fn past_deadline_is_invalid() {
        let now = Utc::now();
        assert!(validate_deadline(now - Duration::hours(1), now).is_err());
        assert!(validate_deadline(now, now).is_err());
        assert!(validate_deadline(now + Duration::hours(1), now).is_ok());
    }

    #[test]
    fn only_active_petitions_are_editable() {
        assert!(validate_editable(PetitionStatus::Active).is_ok());
        assert!(validate_editable(PetitionStatus::Completed).is_err());
        assert!(validate_editable(PetitionStatus::Expired).is_err());
        assert!(validate_editable(PetitionStatus::Rejected).is_err());
    }

    #[test]
    fn signing_requires_active_and_approved() {
        assert!(validate_signable(PetitionStatus::Active, ReviewStatus::Approved).is_ok());
        assert!(validate_signable(PetitionStatus::Active, ReviewStatus::Pending).is_err());
        assert!(validate_signable(PetitionStatus::Active, ReviewStatus::Rejected).is_err());
        assert!(validate_signable(PetitionStatus::Completed, ReviewStatus::Approved).is_err());
        assert!(validate_signable(PetitionStatus::Expired, ReviewStatus::Approved).is_err());
    }

    #[test]
    fn signing_error_names_the_status() {
        let err = validate_signable(PetitionStatus::Completed, ReviewStatus::Approved).unwrap_err();
        assert!(err.to_string().contains("completed"));
    }

    #[test]
    fn pending_is_not_a_review_verdict() {
        assert!(validate_review_verdict(ReviewStatus::Pending).is_err());
        assert!(validate_review_verdict(ReviewStatus::Approved).is_ok());
        assert!(validate_review_verdict(ReviewStatus::Rejected).is_ok());
    }

    #[test]
    fn percentage_matches_formula_and_clamps() {
        assert_eq!(percentage_complete(0, 100), 0);
        assert_eq!(percentage_complete(50, 100), 50);
        assert_eq!(percentage_complete(1, 3), 33);
        assert_eq!(percentage_complete(2, 3), 67);
        assert_eq!(percentage_complete(100, 100), 100);
        // Over-goal counts clamp to 100.
        assert_eq!(percentage_complete(250, 100), 100);
        // Degenerate goal never divides by zero.
        assert_eq!(percentage_complete(10, 0), 0);
    }

    #[test]
    fn percentage_is_monotone_non_decreasing() {
        let goal = 37;
        let mut last = 0;
        for count in 0..100 {
            let pct = percentage_complete(count, goal);
            assert!(pct >= last, "pct dropped from {last} to {pct} at {count}");
            last = pct;
        }
    }

    #[test]
    fn goal_reached_at_exact_count() {
        assert!(!goal_reached(9, 10));
        assert!(goal_reached(10, 10));
        assert!(goal_reached(11, 10));
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&PetitionStatus::Active).unwrap(),
            "\"active\""
        );
        assert_eq!(
            serde_json::to_string(&ReviewStatus::Approved).unwrap(),
            "\"approved\""
        );
    }
}
