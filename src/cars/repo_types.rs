use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Car record in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Car {
    pub id: i64, // server-generated
    pub model: String,
    pub manufacturer: String,
    pub country: String,
    pub color: String,
    pub year: i32,
    pub horsepower: i32,
}

/// Request body for create and full-replace update. Any `id` sent by the
/// client is dropped here; the stored id comes from the database or the path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarPayload {
    pub model: String,
    pub manufacturer: String,
    pub country: String,
    pub color: String,
    pub year: i32,
    pub horsepower: i32,
}

impl CarPayload {
    pub fn into_car(self, id: i64) -> Car {
        Car {
            id,
            model: self.model,
            manufacturer: self.manufacturer,
            country: self.country,
            color: self.color,
            year: self.year,
            horsepower: self.horsepower,
        }
    }
}
