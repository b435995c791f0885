use std::path::Path as FsPath;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::export::export_csv;
use super::filters::CarSearch;
use super::repo_types::{Car, CarPayload};
use crate::{
    error::AppError,
    headers::{self, Paging, TOTAL_COUNT},
    state::AppState,
};

const DEFAULT_PAGE_SIZE: i64 = 99999;

pub fn car_routes() -> Router<AppState> {
    Router::new()
        .route("/cars", get(list_cars).post(create_car))
        .route("/cars/search", get(search_cars))
        .route("/cars/export-cars", get(export_cars))
        .route("/cars/:id", get(get_car).put(update_car).delete(delete_car))
}

/// Builds filters from the optional `model`, `manufacturer`, `country`,
/// `color` and `year` headers.
fn search_from_headers(h: &HeaderMap) -> Result<CarSearch, AppError> {
    Ok(CarSearch {
        model: headers::text(h, "model")?,
        manufacturer: headers::text(h, "manufacturer")?,
        country: headers::text(h, "country")?,
        color: headers::text(h, "color")?,
        year: headers::number::<i32>(h, "year")?,
    })
}

#[instrument(skip(state, h))]
pub async fn search_cars(
    State(state): State<AppState>,
    h: HeaderMap,
) -> Result<Json<Vec<Car>>, AppError> {
    let filters = search_from_headers(&h)?.into_filters();
    let cars = state.cars.search(&filters).await?;
    Ok(Json(cars))
}

#[instrument(skip(state, h))]
pub async fn list_cars(
    State(state): State<AppState>,
    h: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let Paging { page, size } = Paging::from_headers(&h, DEFAULT_PAGE_SIZE)?;
    info!(page, size, "list cars");
    let total = state.cars.count().await?;
    let cars = state.cars.list_all(page, size).await?;
    Ok(([(TOTAL_COUNT, total.to_string())], Json(cars)))
}

#[instrument(skip(state))]
pub async fn get_car(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Car>, AppError> {
    match state.cars.find_by_id(id).await {
        Ok(car) => Ok(Json(car)),
        Err(e) => {
            warn!(car_id = id, error = %e, "get car failed");
            Err(e)
        }
    }
}

#[instrument(skip(state, payload))]
pub async fn create_car(
    State(state): State<AppState>,
    Json(payload): Json<CarPayload>,
) -> Result<(StatusCode, Json<Car>), AppError> {
    let car = state.cars.create(payload).await?;
    info!(car_id = car.id, "car saved");
    Ok((StatusCode::CREATED, Json(car)))
}

#[instrument(skip(state, payload))]
pub async fn update_car(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<CarPayload>,
) -> Result<Json<Car>, AppError> {
    match state.cars.update(id, payload).await {
        Ok(car) => {
            info!(car_id = id, "car updated");
            Ok(Json(car))
        }
        Err(e) => {
            warn!(car_id = id, error = %e, "car update failed");
            Err(e)
        }
    }
}

#[instrument(skip(state))]
pub async fn delete_car(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    match state.cars.delete(id).await {
        Ok(()) => {
            info!(car_id = id, "car deleted");
            Ok(StatusCode::NO_CONTENT)
        }
        Err(e) => {
            warn!(car_id = id, error = %e, "car delete failed");
            Err(e)
        }
    }
}

/// Regenerates the CSV export and streams it back as a download.
#[instrument(skip(state))]
pub async fn export_cars(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let path = FsPath::new(&state.config.export_path);
    let body = export_csv(&state.cars, path).await?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "cars.csv".into());
    info!(path = %path.display(), "csv export sent");
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    ))
}
