use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

const EXPERIENCE_COLUMNS: &str = "id, user_id, college_id, year, profile, wat_summary, \
     pi_questions, final_remarks, is_verified, is_anonymous, views, upvotes, upvoted_by, \
     created_at, updated_at";

const EXPERIENCE_COLUMNS_E: &str = "e.id, e.user_id, e.college_id, e.year, e.profile, \
     e.wat_summary, e.pi_questions, e.final_remarks, e.is_verified, e.is_anonymous, e.views, \
     e.upvotes, e.upvoted_by, e.created_at, e.updated_at";

/// Applicant profile attached to a submission. Explicit optional fields, not
/// an open map, so the boundary stays validated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExperienceProfile {
    pub stream: Option<String>,
    pub category: Option<String>,
    pub work_experience: Option<f64>,
    pub cat_percentile: Option<f64>,
}

/// One personal-interview question with its answer; order is preserved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PiQuestion {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Experience {
    pub id: Uuid,
    pub user_id: Uuid,
    pub college_id: Uuid,
    pub year: i32,
    pub profile: Json<ExperienceProfile>,
    pub wat_summary: Option<String>,
    pub pi_questions: Json<Vec<PiQuestion>>,
    pub final_remarks: Option<String>,
    pub is_verified: bool,
    pub is_anonymous: bool,
    pub views: i64,
    pub upvotes: i32,
    pub upvoted_by: Vec<Uuid>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Experience joined with its submitter.
#[derive(Debug, FromRow)]
pub struct ExperienceUserRow {
    #[sqlx(flatten)]
    pub experience: Experience,
    pub user_name: String,
    pub user_email: String,
}

/// Experience joined with submitter and college, for moderation views.
#[derive(Debug, FromRow)]
pub struct ExperienceDetailRow {
    #[sqlx(flatten)]
    pub experience: Experience,
    pub user_name: String,
    pub user_email: String,
    pub college_name: String,
    pub college_slug: String,
}

/// Compact row for per-user listings in the admin area.
#[derive(Debug, Serialize, FromRow)]
pub struct ExperienceSummary {
    pub id: Uuid,
    pub year: i32,
    pub is_verified: bool,
    pub created_at: OffsetDateTime,
    pub college_id: Uuid,
    pub college_name: String,
    pub college_slug: String,
}

pub struct NewExperience {
    pub user_id: Uuid,
    pub college_id: Uuid,
    pub year: i32,
    pub profile: ExperienceProfile,
    pub wat_summary: Option<String>,
    pub pi_questions: Vec<PiQuestion>,
    pub final_remarks: Option<String>,
    pub is_anonymous: bool,
    pub is_verified: bool,
}

/// Partial admin update; `None` keeps the stored value.
#[derive(Default)]
pub struct ExperienceChanges {
    pub college_id: Option<Uuid>,
    pub year: Option<i32>,
    pub profile: Option<ExperienceProfile>,
    pub wat_summary: Option<String>,
    pub pi_questions: Option<Vec<PiQuestion>>,
    pub final_remarks: Option<String>,
    pub is_verified: Option<bool>,
}

/// Verified-only listing filters; `min_percentile` applies to
/// `profile.cat_percentile`.
pub struct SearchParams {
    pub college: Option<String>,
    pub year: Option<i32>,
    pub background: Option<String>,
    pub min_percentile: Option<f64>,
    pub limit: i64,
    pub offset: i64,
}

impl Experience {
    pub async fn create(db: &PgPool, new: NewExperience) -> anyhow::Result<Experience> {
        let experience = sqlx::query_as::<_, Experience>(&format!(
            "INSERT INTO interview_experiences
                 (user_id, college_id, year, profile, wat_summary, pi_questions,
                  final_remarks, is_anonymous, is_verified)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {EXPERIENCE_COLUMNS}"
        ))
        .bind(new.user_id)
        .bind(new.college_id)
        .bind(new.year)
        .bind(Json(&new.profile))
        .bind(&new.wat_summary)
        .bind(Json(&new.pi_questions))
        .bind(&new.final_remarks)
        .bind(new.is_anonymous)
        .bind(new.is_verified)
        .fetch_one(db)
        .await?;
        Ok(experience)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Experience>> {
        let experience = sqlx::query_as::<_, Experience>(&format!(
            "SELECT {EXPERIENCE_COLUMNS} FROM interview_experiences WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(experience)
    }

    /// All experiences, newest first, optionally narrowed to one submitter.
    pub async fn list_with_users(
        db: &PgPool,
        user_id: Option<Uuid>,
    ) -> anyhow::Result<Vec<ExperienceUserRow>> {
        let rows = sqlx::query_as::<_, ExperienceUserRow>(&format!(
            "SELECT {EXPERIENCE_COLUMNS_E}, u.name AS user_name, u.email AS user_email
             FROM interview_experiences e
             JOIN users u ON u.id = e.user_id
             WHERE $1::uuid IS NULL OR e.user_id = $1
             ORDER BY e.created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Filtered listing over verified records only.
    pub async fn search(db: &PgPool, p: &SearchParams) -> anyhow::Result<Vec<ExperienceUserRow>> {
        let rows = sqlx::query_as::<_, ExperienceUserRow>(&format!(
            "SELECT {EXPERIENCE_COLUMNS_E}, u.name AS user_name, u.email AS user_email
             FROM interview_experiences e
             JOIN users u ON u.id = e.user_id
             JOIN colleges c ON c.id = e.college_id
             WHERE e.is_verified = TRUE
               AND ($1::text IS NULL OR c.name = $1)
               AND ($2::int IS NULL OR e.year = $2)
               AND ($3::text IS NULL OR e.profile->>'category' = $3)
               AND ($4::float8 IS NULL OR (e.profile->>'cat_percentile')::float8 >= $4)
             ORDER BY e.created_at DESC
             LIMIT $5 OFFSET $6"
        ))
        .bind(&p.college)
        .bind(p.year)
        .bind(&p.background)
        .bind(p.min_percentile)
        .bind(p.limit)
        .bind(p.offset)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn list_verified_by_college(
        db: &PgPool,
        college_id: Uuid,
    ) -> anyhow::Result<Vec<ExperienceUserRow>> {
        let rows = sqlx::query_as::<_, ExperienceUserRow>(&format!(
            "SELECT {EXPERIENCE_COLUMNS_E}, u.name AS user_name, u.email AS user_email
             FROM interview_experiences e
             JOIN users u ON u.id = e.user_id
             WHERE e.is_verified = TRUE AND e.college_id = $1
             ORDER BY e.created_at DESC"
        ))
        .bind(college_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Single public fetch; bumps the view counter in the same statement.
    pub async fn fetch_and_bump_views(
        db: &PgPool,
        id: Uuid,
    ) -> anyhow::Result<Option<ExperienceUserRow>> {
        let row = sqlx::query_as::<_, ExperienceUserRow>(
            "WITH e AS (
                 UPDATE interview_experiences
                 SET views = views + 1
                 WHERE id = $1
                 RETURNING *
             )
             SELECT e.id, e.user_id, e.college_id, e.year, e.profile, e.wat_summary,
                    e.pi_questions, e.final_remarks, e.is_verified, e.is_anonymous, e.views,
                    e.upvotes, e.upvoted_by, e.created_at, e.updated_at,
                    u.name AS user_name, u.email AS user_email
             FROM e
             JOIN users u ON u.id = e.user_id",
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    // ---- vote toggle ----

    pub async fn lock_votes_tx(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> anyhow::Result<Option<(i32, Vec<Uuid>)>> {
        let row: Option<(i32, Vec<Uuid>)> = sqlx::query_as(
            "SELECT upvotes, upvoted_by FROM interview_experiences WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(row)
    }

    pub async fn set_votes_tx(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        upvotes: i32,
        upvoted_by: &[Uuid],
    ) -> anyhow::Result<()> {
        sqlx::query(
            "UPDATE interview_experiences
             SET upvotes = $2, upvoted_by = $3, updated_at = now()
             WHERE id = $1",
        )
        .bind(id)
        .bind(upvotes)
        .bind(upvoted_by)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    // ---- moderation ----

    /// Moderation listing, optionally filtered by verification state.
    pub async fn list_detailed(
        db: &PgPool,
        verified: Option<bool>,
    ) -> anyhow::Result<Vec<ExperienceDetailRow>> {
        let rows = sqlx::query_as::<_, ExperienceDetailRow>(&format!(
            "SELECT {EXPERIENCE_COLUMNS_E}, u.name AS user_name, u.email AS user_email,
                    c.name AS college_name, c.slug AS college_slug
             FROM interview_experiences e
             JOIN users u ON u.id = e.user_id
             JOIN colleges c ON c.id = e.college_id
             WHERE $1::bool IS NULL OR e.is_verified = $1
             ORDER BY e.created_at DESC"
        ))
        .bind(verified)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Moderation fetch by id, regardless of verification state.
    pub async fn find_detailed(
        db: &PgPool,
        id: Uuid,
    ) -> anyhow::Result<Option<ExperienceDetailRow>> {
        let row = sqlx::query_as::<_, ExperienceDetailRow>(&format!(
            "SELECT {EXPERIENCE_COLUMNS_E}, u.name AS user_name, u.email AS user_email,
                    c.name AS college_name, c.slug AS college_slug
             FROM interview_experiences e
             JOIN users u ON u.id = e.user_id
             JOIN colleges c ON c.id = e.college_id
             WHERE e.id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    /// Idempotent: re-verifying an already-verified record still succeeds.
    pub async fn set_verified(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query(
            "UPDATE interview_experiences
             SET is_verified = TRUE, updated_at = now()
             WHERE id = $1",
        )
        .bind(id)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM interview_experiences WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn update_admin(
        db: &PgPool,
        id: Uuid,
        changes: ExperienceChanges,
    ) -> anyhow::Result<Option<Experience>> {
        let experience = sqlx::query_as::<_, Experience>(&format!(
            "UPDATE interview_experiences SET
                 college_id = COALESCE($2, college_id),
                 year = COALESCE($3, year),
                 profile = COALESCE($4, profile),
                 wat_summary = COALESCE($5, wat_summary),
                 pi_questions = COALESCE($6, pi_questions),
                 final_remarks = COALESCE($7, final_remarks),
                 is_verified = COALESCE($8, is_verified),
                 updated_at = now()
             WHERE id = $1
             RETURNING {EXPERIENCE_COLUMNS}"
        ))
        .bind(id)
        .bind(changes.college_id)
        .bind(changes.year)
        .bind(changes.profile.map(Json))
        .bind(changes.wat_summary)
        .bind(changes.pi_questions.map(Json))
        .bind(changes.final_remarks)
        .bind(changes.is_verified)
        .fetch_optional(db)
        .await?;
        Ok(experience)
    }

    // ---- dependent counts for referential guards ----

    pub async fn count_by_college_tx(
        tx: &mut Transaction<'_, Postgres>,
        college_id: Uuid,
    ) -> anyhow::Result<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM interview_experiences WHERE college_id = $1")
                .bind(college_id)
                .fetch_one(&mut **tx)
                .await?;
        Ok(count)
    }

    pub async fn count_by_user_tx(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
    ) -> anyhow::Result<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM interview_experiences WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&mut **tx)
                .await?;
        Ok(count)
    }

    pub async fn summaries_by_user(
        db: &PgPool,
        user_id: Uuid,
        verified: Option<bool>,
    ) -> anyhow::Result<Vec<ExperienceSummary>> {
        let rows = sqlx::query_as::<_, ExperienceSummary>(
            "SELECT e.id, e.year, e.is_verified, e.created_at,
                    c.id AS college_id, c.name AS college_name, c.slug AS college_slug
             FROM interview_experiences e
             JOIN colleges c ON c.id = e.college_id
             WHERE e.user_id = $1 AND ($2::bool IS NULL OR e.is_verified = $2)
             ORDER BY e.created_at DESC",
        )
        .bind(user_id)
        .bind(verified)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}
