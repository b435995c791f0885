use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use super::repo_types::{NewUser, User};

/// Insert or update hit the unique index on `users.email`.
#[derive(Debug, thiserror::Error)]
#[error("email already registered")]
pub struct DuplicateEmail;

fn write_error(e: sqlx::Error, what: &'static str) -> anyhow::Error {
    match e {
        sqlx::Error::Database(db) if db.is_unique_violation() => DuplicateEmail.into(),
        other => anyhow::Error::new(other).context(what),
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;

    async fn find_all(&self, page: i64, size: i64) -> anyhow::Result<Vec<User>>;

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>>;

    async fn exists_by_id(&self, id: i64) -> anyhow::Result<bool>;

    async fn insert(&self, user: &NewUser) -> anyhow::Result<User>;

    /// `None` if row `id` no longer exists.
    async fn update(&self, id: i64, user: &NewUser) -> anyhow::Result<Option<User>>;

    async fn delete_by_id(&self, id: i64) -> anyhow::Result<()>;

    async fn count(&self) -> anyhow::Result<i64>;
}

pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub fn boxed(db: PgPool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(db))
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    async fn find_all(&self, page: i64, size: i64) -> anyhow::Result<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at
            FROM users
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(size)
        .bind(page.saturating_mul(size))
        .fetch_all(&self.db)
        .await
        .context("list users")?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT id, name, email, password_hash, created_at FROM users WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    async fn exists_by_id(&self, id: i64) -> anyhow::Result<bool> {
        let (exists,): (bool,) =
            sqlx::query_as(r#"SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)"#)
                .bind(id)
                .fetch_one(&self.db)
                .await
                .context("check user exists")?;
        Ok(exists)
    }

    async fn insert(&self, user: &NewUser) -> anyhow::Result<User> {
        let row = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password_hash, created_at
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(|e| write_error(e, "insert user"))?;
        Ok(row)
    }

    async fn update(&self, id: i64, user: &NewUser) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
               SET name = $2, email = $3, password_hash = $4
             WHERE id = $1
            RETURNING id, name, email, password_hash, created_at
            "#,
        )
        .bind(id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| write_error(e, "update user"))?;
        Ok(row)
    }

    async fn delete_by_id(&self, id: i64) -> anyhow::Result<()> {
        sqlx::query(r#"DELETE FROM users WHERE id = $1"#)
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete user")?;
        Ok(())
    }

    async fn count(&self) -> anyhow::Result<i64> {
        let (count,): (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM users"#)
            .fetch_one(&self.db)
            .await
            .context("count users")?;
        Ok(count)
    }
}
