use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::claims::Role;

const USER_COLUMNS: &str = "id, name, email, password_hash, role, is_verified, otp, otp_expires, \
     reset_password_otp, reset_password_otp_expires, last_login, created_at, updated_at";

/// User record. Soft-deleted rows (`deleted_at` set) are invisible to every
/// query here except the admin soft delete itself.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub is_verified: bool,
    #[serde(skip_serializing)]
    pub otp: Option<String>,
    #[serde(skip_serializing)]
    pub otp_expires: Option<OffsetDateTime>,
    #[serde(skip_serializing)]
    pub reset_password_otp: Option<String>,
    #[serde(skip_serializing)]
    pub reset_password_otp_expires: Option<OffsetDateTime>,
    pub last_login: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Slim projection for admin listings.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub is_verified: bool,
    pub last_login: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

impl From<&User> for UserSummary {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            name: u.name.clone(),
            email: u.email.clone(),
            role: u.role,
            is_verified: u.is_verified,
            last_login: u.last_login,
            created_at: u.created_at,
        }
    }
}

impl User {
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 AND deleted_at IS NULL"
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Insert a fresh unverified account.
    pub async fn create_unverified(
        db: &PgPool,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (name, email, password_hash)
             VALUES ($1, $2, $3)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Re-registration before verification overwrites name and password,
    /// keeping the id.
    pub async fn update_unverified_profile(
        db: &PgPool,
        id: Uuid,
        name: &str,
        password_hash: &str,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET name = $2, password_hash = $3, updated_at = now()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(name)
        .bind(password_hash)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    pub async fn store_otp(
        db: &PgPool,
        email: &str,
        otp: &str,
        expires: OffsetDateTime,
    ) -> anyhow::Result<()> {
        sqlx::query(
            "UPDATE users SET otp = $2, otp_expires = $3, updated_at = now()
             WHERE email = $1 AND deleted_at IS NULL",
        )
        .bind(email)
        .bind(otp)
        .bind(expires)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Reset codes are written to both field pairs, matching the
    /// forgot-password flow.
    pub async fn store_reset_otp(
        db: &PgPool,
        id: Uuid,
        otp: &str,
        expires: OffsetDateTime,
    ) -> anyhow::Result<()> {
        sqlx::query(
            "UPDATE users
             SET otp = $2, otp_expires = $3,
                 reset_password_otp = $2, reset_password_otp_expires = $3,
                 updated_at = now()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(otp)
        .bind(expires)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Row-locked lookup for transactional OTP check-and-clear.
    pub async fn lock_by_email_tx(
        tx: &mut Transaction<'_, Postgres>,
        email: &str,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users
             WHERE email = $1 AND deleted_at IS NULL
             FOR UPDATE"
        ))
        .bind(email)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(user)
    }

    /// Flip to verified and consume the code in one statement.
    pub async fn mark_verified_tx(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> anyhow::Result<()> {
        sqlx::query(
            "UPDATE users
             SET is_verified = TRUE, otp = NULL, otp_expires = NULL, updated_at = now()
             WHERE id = $1",
        )
        .bind(id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Row-locked lookup matching email, reset code and an unexpired window
    /// all at once.
    pub async fn lock_for_reset_tx(
        tx: &mut Transaction<'_, Postgres>,
        email: &str,
        otp: &str,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users
             WHERE email = $1
               AND reset_password_otp = $2
               AND reset_password_otp_expires > now()
               AND deleted_at IS NULL
             FOR UPDATE"
        ))
        .bind(email)
        .bind(otp)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(user)
    }

    pub async fn set_password_tx(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        password_hash: &str,
    ) -> anyhow::Result<()> {
        sqlx::query(
            "UPDATE users
             SET password_hash = $2,
                 reset_password_otp = NULL, reset_password_otp_expires = NULL,
                 updated_at = now()
             WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    pub async fn touch_last_login(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET last_login = now() WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    // ---- admin queries ----

    pub async fn search_page(
        db: &PgPool,
        search: &str,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<UserSummary>> {
        let pattern = format!("%{search}%");
        let users = sqlx::query_as::<_, UserSummary>(
            "SELECT id, name, email, role, is_verified, last_login, created_at
             FROM users
             WHERE deleted_at IS NULL AND (name ILIKE $1 OR email ILIKE $1)
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
        Ok(users)
    }

    pub async fn count_search(db: &PgPool, search: &str) -> anyhow::Result<i64> {
        let pattern = format!("%{search}%");
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM users
             WHERE deleted_at IS NULL AND (name ILIKE $1 OR email ILIKE $1)",
        )
        .bind(&pattern)
        .fetch_one(db)
        .await?;
        Ok(count)
    }

    pub async fn lock_by_id_tx(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users
             WHERE id = $1 AND deleted_at IS NULL
             FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(user)
    }

    pub async fn email_taken_by_other_tx(
        tx: &mut Transaction<'_, Postgres>,
        email: &str,
        exclude: Uuid,
    ) -> anyhow::Result<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (
                 SELECT 1 FROM users
                 WHERE email = $1 AND id <> $2 AND deleted_at IS NULL
             )",
        )
        .bind(email)
        .bind(exclude)
        .fetch_one(&mut **tx)
        .await?;
        Ok(exists)
    }

    pub async fn update_admin_tx(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        name: &str,
        email: &str,
        role: Role,
    ) -> anyhow::Result<UserSummary> {
        let user = sqlx::query_as::<_, UserSummary>(
            "UPDATE users SET name = $2, email = $3, role = $4, updated_at = now()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING id, name, email, role, is_verified, last_login, created_at",
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(role)
        .fetch_one(&mut **tx)
        .await?;
        Ok(user)
    }

    pub async fn soft_delete_tx(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET deleted_at = now(), updated_at = now() WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_serialization_hides_credentials() {
        let user = User {
            id: Uuid::new_v4(),
            name: "A".into(),
            email: "a@x.com".into(),
            password_hash: "argon2-hash".into(),
            role: Role::User,
            is_verified: true,
            otp: Some("123456".into()),
            otp_expires: None,
            reset_password_otp: Some("654321".into()),
            reset_password_otp_expires: None,
            last_login: None,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2-hash"));
        assert!(!json.contains("123456"));
        assert!(!json.contains("654321"));
        assert!(json.contains("a@x.com"));
    }
}
