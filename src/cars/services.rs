use std::sync::Arc;

use tracing::debug;

use super::filters::CarFilter;
use super::repo::CarRepository;
use super::repo_types::{Car, CarPayload};
use crate::error::AppError;

/// Inventory operations. Mutations check that the target exists first so a
/// missing id always surfaces as [`AppError::NotFound`].
#[derive(Clone)]
pub struct CarService {
    repo: Arc<dyn CarRepository>,
}

impl CarService {
    pub fn new(repo: Arc<dyn CarRepository>) -> Self {
        Self { repo }
    }

    pub async fn list_all(&self, page: i64, size: i64) -> Result<Vec<Car>, AppError> {
        Ok(self.repo.find_all(page, size).await?)
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        Ok(self.repo.count().await?)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Car, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn create(&self, car: CarPayload) -> Result<Car, AppError> {
        Ok(self.repo.insert(&car).await?)
    }

    pub async fn update(&self, id: i64, car: CarPayload) -> Result<Car, AppError> {
        if !self.repo.exists_by_id(id).await? {
            return Err(not_found(id));
        }
        self.repo
            .update(id, &car)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.find_by_id(id).await?;
        Ok(self.repo.delete_by_id(id).await?)
    }

    pub async fn search(&self, filters: &[CarFilter]) -> Result<Vec<Car>, AppError> {
        let cars = self.repo.search(filters).await?;
        debug!(filters = filters.len(), matches = cars.len(), "car search");
        Ok(cars)
    }
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Car not found with id: {id}"))
}
