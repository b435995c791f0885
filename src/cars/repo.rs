use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use super::filters::{search_query, CarFilter};
use super::repo_types::{Car, CarPayload};

#[async_trait]
pub trait CarRepository: Send + Sync {
    /// One page of cars ordered by id.
    async fn find_all(&self, page: i64, size: i64) -> anyhow::Result<Vec<Car>>;

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Car>>;

    async fn exists_by_id(&self, id: i64) -> anyhow::Result<bool>;

    /// Inserts a new row; the id is assigned by the database.
    async fn insert(&self, car: &CarPayload) -> anyhow::Result<Car>;

    /// Replaces every column of row `id`; `None` if the row is gone.
    async fn update(&self, id: i64, car: &CarPayload) -> anyhow::Result<Option<Car>>;

    async fn delete_by_id(&self, id: i64) -> anyhow::Result<()>;

    async fn count(&self) -> anyhow::Result<i64>;

    /// All cars matching every filter; no limit.
    async fn search(&self, filters: &[CarFilter]) -> anyhow::Result<Vec<Car>>;
}

pub struct PgCarRepository {
    db: PgPool,
}

impl PgCarRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub fn boxed(db: PgPool) -> Arc<dyn CarRepository> {
        Arc::new(Self::new(db))
    }
}

#[async_trait]
impl CarRepository for PgCarRepository {
    async fn find_all(&self, page: i64, size: i64) -> anyhow::Result<Vec<Car>> {
        let rows = sqlx::query_as::<_, Car>(
            r#"
            SELECT id, model, manufacturer, country, color, year, horsepower
            FROM cars
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(size)
        .bind(page.saturating_mul(size))
        .fetch_all(&self.db)
        .await
        .context("list cars")?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Car>> {
        let car = sqlx::query_as::<_, Car>(
            r#"
            SELECT id, model, manufacturer, country, color, year, horsepower
            FROM cars
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find car by id")?;
        Ok(car)
    }

    async fn exists_by_id(&self, id: i64) -> anyhow::Result<bool> {
        let (exists,): (bool,) =
            sqlx::query_as(r#"SELECT EXISTS (SELECT 1 FROM cars WHERE id = $1)"#)
                .bind(id)
                .fetch_one(&self.db)
                .await
                .context("check car exists")?;
        Ok(exists)
    }

    async fn insert(&self, car: &CarPayload) -> anyhow::Result<Car> {
        let row = sqlx::query_as::<_, Car>(
            r#"
            INSERT INTO cars (model, manufacturer, country, color, year, horsepower)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, model, manufacturer, country, color, year, horsepower
            "#,
        )
        .bind(&car.model)
        .bind(&car.manufacturer)
        .bind(&car.country)
        .bind(&car.color)
        .bind(car.year)
        .bind(car.horsepower)
        .fetch_one(&self.db)
        .await
        .context("insert car")?;
        Ok(row)
    }

    async fn update(&self, id: i64, car: &CarPayload) -> anyhow::Result<Option<Car>> {
        let row = sqlx::query_as::<_, Car>(
            r#"
            UPDATE cars
               SET model = $2, manufacturer = $3, country = $4,
                   color = $5, year = $6, horsepower = $7
             WHERE id = $1
            RETURNING id, model, manufacturer, country, color, year, horsepower
            "#,
        )
        .bind(id)
        .bind(&car.model)
        .bind(&car.manufacturer)
        .bind(&car.country)
        .bind(&car.color)
        .bind(car.year)
        .bind(car.horsepower)
        .fetch_optional(&self.db)
        .await
        .context("update car")?;
        Ok(row)
    }

    async fn delete_by_id(&self, id: i64) -> anyhow::Result<()> {
        sqlx::query(r#"DELETE FROM cars WHERE id = $1"#)
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete car")?;
        Ok(())
    }

    async fn count(&self) -> anyhow::Result<i64> {
        let (count,): (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM cars"#)
            .fetch_one(&self.db)
            .await
            .context("count cars")?;
        Ok(count)
    }

    async fn search(&self, filters: &[CarFilter]) -> anyhow::Result<Vec<Car>> {
        let mut qb = search_query(filters);
        let rows = qb
            .build_query_as::<Car>()
            .fetch_all(&self.db)
            .await
            .context("search cars")?;
        Ok(rows)
    }
}
