use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;

use super::password::hash_password;
use super::repo::{DuplicateEmail, UserRepository};
use super::repo_types::{NewUser, User, UserPayload};
use crate::error::AppError;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Emails are compared after trimming and lower-casing.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    /// Full record including the password hash; used by login.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.repo.find_by_email(&normalize_email(email)).await?)
    }

    pub async fn find_all(&self, page: i64, size: i64) -> Result<Vec<User>, AppError> {
        Ok(self.repo.find_all(page, size).await?)
    }

    /// Profile lookup. The password hash is cleared before the record leaves.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let user = self.repo.find_by_id(id).await?.map(|mut user| {
            user.password_hash.clear();
            user
        });
        Ok(user)
    }

    pub async fn create(&self, payload: UserPayload) -> Result<User, AppError> {
        let new_user = self.prepare(payload, None).await?;
        self.repo.insert(&new_user).await.map_err(write_conflict)
    }

    pub async fn update(&self, id: i64, payload: UserPayload) -> Result<User, AppError> {
        if !self.repo.exists_by_id(id).await? {
            return Err(not_found(id));
        }
        let new_user = self.prepare(payload, Some(id)).await?;
        self.repo
            .update(id, &new_user)
            .await
            .map_err(write_conflict)?
            .ok_or_else(|| not_found(id))
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))?;
        Ok(self.repo.delete_by_id(id).await?)
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        Ok(self.repo.count().await?)
    }

    /// Validates the payload and hashes its password. `owner` is the id being
    /// updated, which may keep its own email.
    async fn prepare(&self, payload: UserPayload, owner: Option<i64>) -> Result<NewUser, AppError> {
        let email = normalize_email(&payload.email);
        if !is_valid_email(&email) {
            return Err(AppError::BadRequest("Invalid email".into()));
        }
        if let Some(existing) = self.repo.find_by_email(&email).await? {
            if Some(existing.id) != owner {
                return Err(email_taken());
            }
        }
        let password_hash = hash_password(&payload.password)?;
        Ok(NewUser {
            name: payload.name,
            email,
            password_hash,
        })
    }
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("User not found with id: {id}"))
}

fn email_taken() -> AppError {
    AppError::Conflict("Email already registered".into())
}

/// A concurrent writer can claim the email after `prepare` looked it up.
fn write_conflict(e: anyhow::Error) -> AppError {
    if e.is::<DuplicateEmail>() {
        email_taken()
    } else {
        AppError::Internal(e)
    }
}
