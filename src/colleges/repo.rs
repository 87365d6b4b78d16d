use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "college_status", rename_all = "lowercase")]
pub enum CollegeStatus {
    Active,
    Pending,
    Inactive,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct College {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub status: CollegeStatus,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Aggregates over a college's verified experiences.
#[derive(Debug, Serialize, FromRow)]
pub struct CollegeStats {
    pub total: i64,
    pub avg_cat_percentile: Option<f64>,
    pub avg_work_exp: Option<f64>,
    pub avg_questions: Option<f64>,
}

impl College {
    pub async fn list(db: &PgPool) -> anyhow::Result<Vec<College>> {
        let colleges = sqlx::query_as::<_, College>(
            "SELECT id, name, slug, status, created_at, updated_at
             FROM colleges
             ORDER BY name ASC",
        )
        .fetch_all(db)
        .await?;
        Ok(colleges)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<College>> {
        let college = sqlx::query_as::<_, College>(
            "SELECT id, name, slug, status, created_at, updated_at
             FROM colleges
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(college)
    }

    /// Duplicate probe used before create/rename; slug collisions count even
    /// when the names differ.
    pub async fn name_or_slug_taken(
        db: &PgPool,
        name: &str,
        slug: &str,
        exclude: Option<Uuid>,
    ) -> anyhow::Result<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (
                 SELECT 1 FROM colleges
                 WHERE (name = $1 OR slug = $2) AND ($3::uuid IS NULL OR id <> $3)
             )",
        )
        .bind(name)
        .bind(slug)
        .bind(exclude)
        .fetch_one(db)
        .await?;
        Ok(exists)
    }

    pub async fn create(
        db: &PgPool,
        name: &str,
        slug: &str,
        status: CollegeStatus,
    ) -> anyhow::Result<College> {
        let college = sqlx::query_as::<_, College>(
            "INSERT INTO colleges (name, slug, status)
             VALUES ($1, $2, $3)
             RETURNING id, name, slug, status, created_at, updated_at",
        )
        .bind(name)
        .bind(slug)
        .bind(status)
        .fetch_one(db)
        .await?;
        Ok(college)
    }

    pub async fn update(
        db: &PgPool,
        id: Uuid,
        name: &str,
        slug: &str,
        status: CollegeStatus,
    ) -> anyhow::Result<Option<College>> {
        let college = sqlx::query_as::<_, College>(
            "UPDATE colleges SET name = $2, slug = $3, status = $4, updated_at = now()
             WHERE id = $1
             RETURNING id, name, slug, status, created_at, updated_at",
        )
        .bind(id)
        .bind(name)
        .bind(slug)
        .bind(status)
        .fetch_optional(db)
        .await?;
        Ok(college)
    }

    pub async fn lock_by_id_tx(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> anyhow::Result<Option<College>> {
        let college = sqlx::query_as::<_, College>(
            "SELECT id, name, slug, status, created_at, updated_at
             FROM colleges
             WHERE id = $1
             FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(college)
    }

    pub async fn delete_tx(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM colleges WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    pub async fn stats(db: &PgPool, id: Uuid) -> anyhow::Result<CollegeStats> {
        let stats = sqlx::query_as::<_, CollegeStats>(
            "SELECT COUNT(*) AS total,
                    AVG((profile->>'cat_percentile')::float8) AS avg_cat_percentile,
                    AVG((profile->>'work_experience')::float8) AS avg_work_exp,
                    AVG(jsonb_array_length(pi_questions))::float8 AS avg_questions
             FROM interview_experiences
             WHERE is_verified = TRUE AND college_id = $1",
        )
        .bind(id)
        .fetch_one(db)
        .await?;
        Ok(stats)
    }
}
