//! Repository for the `petitions` table and its child tables.

use sqlx::PgPool;

use civica_core::error::CoreError;
use civica_core::petition::{self, PetitionStatus, ReviewStatus};
use civica_core::types::DbId;

use crate::models::petition::{
    CreatePetition, Petition, PetitionResponse, PetitionSummary, PetitionUpdate, SignOutcome,
    Signature, UpdatePetition,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, category, goal, deadline, status, image_path, \
                       created_by, review_status, review_notes, reviewed_by, reviewed_at, \
                       created_at, updated_at";

/// Failure modes of the signing transaction.
///
/// Domain rejections (not-found, already signed, not signable) are separated
/// from infrastructure errors so the API layer can map them to 4xx codes.
#[derive(Debug, thiserror::Error)]
pub enum SignError {
    #[error(transparent)]
    Domain(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Provides persistence operations for petitions.
pub struct PetitionRepo;

impl PetitionRepo {
    /// Insert a new petition with initial status `active` / review `pending`.
    pub async fn create(pool: &PgPool, input: &CreatePetition) -> Result<Petition, sqlx::Error> {
        let query = format!(
            "INSERT INTO petitions (title, description, category, goal, deadline, created_by)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Petition>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.category)
            .bind(input.goal)
            .bind(input.deadline)
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }

    /// Find a petition by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Petition>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM petitions WHERE id = $1");
        sqlx::query_as::<_, Petition>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Fully populated petition for the public detail endpoint: creator and
    /// reviewer names resolved, signatures and updates loaded in insertion
    /// order. Signer emails are never selected.
    pub async fn find_detailed(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<PetitionResponse>, sqlx::Error> {
        let Some(petition) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let creator_name: String = sqlx::query_scalar("SELECT name FROM users WHERE id = $1")
            .bind(petition.created_by)
            .fetch_optional(pool)
            .await?
            .unwrap_or_else(|| "Unknown".to_string());

        let reviewer_name: Option<String> = match petition.reviewed_by {
            Some(reviewer_id) => {
                sqlx::query_scalar("SELECT name FROM users WHERE id = $1")
                    .bind(reviewer_id)
                    .fetch_optional(pool)
                    .await?
            }
            None => None,
        };

        let signatures = sqlx::query_as::<_, Signature>(
            "SELECT id, petition_id, user_id, signer_name, comment, signed_at
             FROM petition_signatures WHERE petition_id = $1 ORDER BY signed_at, id",
        )
        .bind(id)
        .fetch_all(pool)
        .await?;

        let updates = sqlx::query_as::<_, PetitionUpdate>(
            "SELECT id, petition_id, text, added_by, added_at
             FROM petition_updates WHERE petition_id = $1 ORDER BY added_at, id",
        )
        .bind(id)
        .fetch_all(pool)
        .await?;

        Ok(Some(PetitionResponse::detailed(
            &petition,
            creator_name,
            reviewer_name,
            signatures,
            updates,
        )))
    }

    /// Public listing: approved or still-pending petitions, newest first.
    pub async fn list_public(pool: &PgPool) -> Result<Vec<PetitionSummary>, sqlx::Error> {
        Self::list_where(pool, "p.review_status IN ('approved', 'pending')", None).await
    }

    /// Petitions created by a given user, newest first.
    pub async fn list_by_creator(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<PetitionSummary>, sqlx::Error> {
        Self::list_where(pool, "p.created_by = $1", Some(user_id)).await
    }

    /// Admin listing: every petition regardless of review status.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<PetitionSummary>, sqlx::Error> {
        Self::list_where(pool, "TRUE", None).await
    }

    async fn list_where(
        pool: &PgPool,
        predicate: &str,
        bind_id: Option<DbId>,
    ) -> Result<Vec<PetitionSummary>, sqlx::Error> {
        let query = format!(
            "SELECT p.*,
                    (SELECT COUNT(*) FROM petition_signatures s
                      WHERE s.petition_id = p.id) AS signature_count,
                    u.name AS creator_name
             FROM petitions p
             JOIN users u ON u.id = p.created_by
             WHERE {predicate}
             ORDER BY p.created_at DESC"
        );
        let mut q = sqlx::query_as::<_, PetitionSummary>(&query);
        if let Some(id) = bind_id {
            q = q.bind(id);
        }
        q.fetch_all(pool).await
    }

    /// Apply a partial update. Only non-`None` fields are changed.
    ///
    /// Returns `None` if no row with the given `id` exists. The caller is
    /// responsible for the editable-status and future-deadline checks.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePetition,
    ) -> Result<Option<Petition>, sqlx::Error> {
        let query = format!(
            "UPDATE petitions SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                category = COALESCE($4, category),
                goal = COALESCE($5, goal),
                deadline = COALESCE($6, deadline),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Petition>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.category)
            .bind(input.goal)
            .bind(input.deadline)
            .fetch_optional(pool)
            .await
    }

    /// Delete a petition (signatures and updates cascade).
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM petitions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Sign a petition on behalf of a user.
    ///
    /// Runs as a single transaction with the petition row locked
    /// (`SELECT ... FOR UPDATE`), so the signable check, the duplicate check,
    /// the insert, and the completed-flip commit atomically: two concurrent
    /// signers cannot double-sign or overshoot the goal.
    pub async fn sign(
        pool: &PgPool,
        petition_id: DbId,
        user_id: DbId,
        signer_name: &str,
        comment: Option<&str>,
    ) -> Result<SignOutcome, SignError> {
        let mut tx = pool.begin().await.map_err(SignError::Db)?;

        let query = format!("SELECT {COLUMNS} FROM petitions WHERE id = $1 FOR UPDATE");
        let petition = sqlx::query_as::<_, Petition>(&query)
            .bind(petition_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(SignError::Db)?
            .ok_or(CoreError::NotFound {
                entity: "Petition",
                id: petition_id,
            })?;

        petition::validate_signable(petition.status, petition.review_status)?;

        let already_signed: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM petition_signatures
              WHERE petition_id = $1 AND user_id = $2)",
        )
        .bind(petition_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(SignError::Db)?;

        if already_signed {
            return Err(CoreError::Validation(
                "You have already signed this petition".to_string(),
            )
            .into());
        }

        let signature = sqlx::query_as::<_, Signature>(
            "INSERT INTO petition_signatures (petition_id, user_id, signer_name, comment)
             VALUES ($1, $2, $3, $4)
             RETURNING id, petition_id, user_id, signer_name, comment, signed_at",
        )
        .bind(petition_id)
        .bind(user_id)
        .bind(signer_name)
        .bind(comment)
        .fetch_one(&mut *tx)
        .await
        .map_err(SignError::Db)?;

        let signature_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM petition_signatures WHERE petition_id = $1",
        )
        .bind(petition_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(SignError::Db)?;

        let status = if petition::goal_reached(signature_count, petition.goal) {
            Self::set_status(&mut tx, petition_id, PetitionStatus::Completed)
                .await
                .map_err(SignError::Db)?;
            PetitionStatus::Completed
        } else {
            Self::touch(&mut tx, petition_id).await.map_err(SignError::Db)?;
            petition.status
        };

        tx.commit().await.map_err(SignError::Db)?;

        Ok(SignOutcome {
            signature,
            signature_count,
            status,
        })
    }

    async fn set_status(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
        status: PetitionStatus,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE petitions SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    async fn touch(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE petitions SET updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Append a progress update, returning the created row.
    pub async fn add_update(
        pool: &PgPool,
        petition_id: DbId,
        text: &str,
        added_by: DbId,
    ) -> Result<PetitionUpdate, sqlx::Error> {
        let update = sqlx::query_as::<_, PetitionUpdate>(
            "INSERT INTO petition_updates (petition_id, text, added_by)
             VALUES ($1, $2, $3)
             RETURNING id, petition_id, text, added_by, added_at",
        )
        .bind(petition_id)
        .bind(text)
        .bind(added_by)
        .fetch_one(pool)
        .await?;

        sqlx::query("UPDATE petitions SET updated_at = NOW() WHERE id = $1")
            .bind(petition_id)
            .execute(pool)
            .await?;

        Ok(update)
    }

    /// Record an admin review verdict. A rejected review cascades the
    /// petition status to `rejected` in the same statement.
    pub async fn set_review(
        pool: &PgPool,
        id: DbId,
        verdict: ReviewStatus,
        notes: Option<&str>,
        reviewer_id: DbId,
    ) -> Result<Option<Petition>, sqlx::Error> {
        let query = format!(
            "UPDATE petitions SET
                review_status = $2,
                review_notes = $3,
                reviewed_by = $4,
                reviewed_at = NOW(),
                status = CASE WHEN $2 = 'rejected' THEN 'rejected' ELSE status END,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Petition>(&query)
            .bind(id)
            .bind(verdict)
            .bind(notes)
            .bind(reviewer_id)
            .fetch_optional(pool)
            .await
    }

    /// Record the stored image path for a petition.
    pub async fn set_image_path(
        pool: &PgPool,
        id: DbId,
        image_path: &str,
    ) -> Result<Option<Petition>, sqlx::Error> {
        let query = format!(
            "UPDATE petitions SET image_path = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Petition>(&query)
            .bind(id)
            .bind(image_path)
            .fetch_optional(pool)
            .await
    }

    /// Deadline sweep: transition every active petition whose deadline has
    /// passed to `expired`. Returns the number of rows transitioned; running
    /// it again immediately is a no-op.
    pub async fn expire_past_deadline(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE petitions SET status = 'expired', updated_at = NOW()
             WHERE status = 'active' AND deadline < NOW()",
        )
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Signature count for a petition.
    pub async fn signature_count(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM petition_signatures WHERE petition_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
    }
}
