use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::repo_types::{User, UserPayload};
use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest},
        extractors::AuthUser,
        services::Authenticator,
    },
    error::AppError,
    headers::{Paging, TOTAL_COUNT},
    state::AppState,
};

const DEFAULT_PAGE_SIZE: i64 = 9999;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/login", post(login))
        .route("/users/:id", put(update_user).delete(delete_user))
}

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/users/my-profile", get(my_profile))
}

#[instrument(skip(state, h))]
pub async fn list_users(
    State(state): State<AppState>,
    h: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let Paging { page, size } = Paging::from_headers(&h, DEFAULT_PAGE_SIZE)?;
    info!(page, size, "list users");
    let total = state.users.count().await?;
    let users = state.users.find_all(page, size).await?;
    Ok(([(TOTAL_COUNT, total.to_string())], Json(users)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let authenticator = Authenticator::new(state.users.clone(), state.keys.clone());
    let token = authenticator
        .authenticate(&payload.email, &payload.password)
        .await?;
    info!(email = %payload.email, "user logged in");
    Ok(Json(AuthResponse { token }))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<UserPayload>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = state.users.create(payload).await?;
    info!(user_id = user.id, "user saved");
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UserPayload>,
) -> Result<Json<User>, AppError> {
    match state.users.update(id, payload).await {
        Ok(user) => {
            info!(user_id = id, "user updated");
            Ok(Json(user))
        }
        Err(e) => {
            warn!(user_id = id, error = %e, "user update failed");
            Err(e)
        }
    }
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    match state.users.delete(id).await {
        Ok(()) => {
            info!(user_id = id, "user deleted");
            Ok(StatusCode::NO_CONTENT)
        }
        Err(e) => {
            warn!(user_id = id, error = %e, "user delete failed");
            Err(e)
        }
    }
}

#[instrument(skip(state))]
pub async fn my_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<User>, AppError> {
    match state.users.find_by_id(user_id).await? {
        Some(user) => Ok(Json(user)),
        None => {
            warn!(user_id, "profile not found after token validation");
            Err(AppError::NotFound("User profile not found".into()))
        }
    }
}
