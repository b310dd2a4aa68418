//! Petition entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use civica_core::petition::{percentage_complete, PetitionStatus, ReviewStatus};
use civica_core::types::{DbId, Timestamp};

/// Full petition row from the `petitions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Petition {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub goal: i32,
    pub deadline: Timestamp,
    pub status: PetitionStatus,
    pub image_path: Option<String>,
    pub created_by: DbId,
    pub review_status: ReviewStatus,
    pub review_notes: Option<String>,
    pub reviewed_by: Option<DbId>,
    pub reviewed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Signature row joined with nothing -- the signer name is a snapshot taken
/// at signing time, so signer emails never leave the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Signature {
    pub id: DbId,
    pub petition_id: DbId,
    pub user_id: DbId,
    pub signer_name: String,
    pub comment: Option<String>,
    pub signed_at: Timestamp,
}

/// Progress update appended by the creator or an admin.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PetitionUpdate {
    pub id: DbId,
    pub petition_id: DbId,
    pub text: String,
    pub added_by: DbId,
    pub added_at: Timestamp,
}

/// Petition summary for list endpoints: row data plus the signature count
/// resolved in the same query.
#[derive(Debug, Clone, FromRow)]
pub struct PetitionSummary {
    #[sqlx(flatten)]
    pub petition: Petition,
    pub signature_count: i64,
    pub creator_name: String,
}

/// Outcome of a successful sign operation.
#[derive(Debug)]
pub struct SignOutcome {
    pub signature: Signature,
    pub signature_count: i64,
    /// Petition status after the save -- `Completed` when this signature
    /// reached the goal.
    pub status: PetitionStatus,
}

/// API-facing petition representation with derived and populated fields.
#[derive(Debug, Serialize)]
pub struct PetitionResponse {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub goal: i32,
    pub deadline: Timestamp,
    pub status: PetitionStatus,
    pub image_path: Option<String>,
    pub created_by: DbId,
    pub creator_name: String,
    pub signature_count: i64,
    pub percentage_complete: i32,
    pub review_status: ReviewStatus,
    pub review_notes: Option<String>,
    pub reviewed_by: Option<DbId>,
    pub reviewer_name: Option<String>,
    pub reviewed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signatures: Option<Vec<Signature>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updates: Option<Vec<PetitionUpdate>>,
}

impl PetitionResponse {
    /// Build a summary response (list endpoints -- no child collections).
    pub fn from_summary(s: &PetitionSummary) -> Self {
        Self::build(
            &s.petition,
            s.creator_name.clone(),
            None,
            s.signature_count,
            None,
            None,
        )
    }

    /// Build a fully populated response (detail endpoint).
    pub fn detailed(
        petition: &Petition,
        creator_name: String,
        reviewer_name: Option<String>,
        signatures: Vec<Signature>,
        updates: Vec<PetitionUpdate>,
    ) -> Self {
        let count = signatures.len() as i64;
        Self::build(
            petition,
            creator_name,
            reviewer_name,
            count,
            Some(signatures),
            Some(updates),
        )
    }

    fn build(
        p: &Petition,
        creator_name: String,
        reviewer_name: Option<String>,
        signature_count: i64,
        signatures: Option<Vec<Signature>>,
        updates: Option<Vec<PetitionUpdate>>,
    ) -> Self {
        PetitionResponse {
            id: p.id,
            title: p.title.clone(),
            description: p.description.clone(),
            category: p.category.clone(),
            goal: p.goal,
            deadline: p.deadline,
            status: p.status,
            image_path: p.image_path.clone(),
            created_by: p.created_by,
            creator_name,
            signature_count,
            percentage_complete: percentage_complete(signature_count, p.goal),
            review_status: p.review_status,
            review_notes: p.review_notes.clone(),
            reviewed_by: p.reviewed_by,
            reviewer_name,
            reviewed_at: p.reviewed_at,
            created_at: p.created_at,
            updated_at: p.updated_at,
            signatures,
            updates,
        }
    }
}

/// DTO for creating a petition. Status and review fields take their initial
/// values in the INSERT.
#[derive(Debug)]
pub struct CreatePetition {
    pub title: String,
    pub description: String,
    pub category: String,
    pub goal: i32,
    pub deadline: Timestamp,
    pub created_by: DbId,
}

/// DTO for the petition update endpoint. All fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdatePetition {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub goal: Option<i32>,
    pub deadline: Option<Timestamp>,
}
