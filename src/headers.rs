//! Typed access to the request headers the API reads its parameters from.

use axum::http::{HeaderMap, HeaderName};

use crate::error::AppError;

pub const TOTAL_COUNT: HeaderName = HeaderName::from_static("total-count");

/// `None` when the header is absent; a 400 when it is not UTF-8.
pub fn text(headers: &HeaderMap, name: &str) -> Result<Option<String>, AppError> {
    headers
        .get(name)
        .map(|v| {
            std::str::from_utf8(v.as_bytes())
                .map(str::to_string)
                .map_err(|_| AppError::BadRequest(format!("header '{name}' is not valid UTF-8")))
        })
        .transpose()
}

/// `None` when absent; a 400 when present but not an integer.
pub fn number<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Result<Option<T>, AppError> {
    text(headers, name)?
        .map(|v| {
            v.trim()
                .parse::<T>()
                .map_err(|_| AppError::BadRequest(format!("header '{name}' must be an integer")))
        })
        .transpose()
}

/// Zero-based page request read from the `page` and `size` headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub page: i64,
    pub size: i64,
}

impl Paging {
    pub fn from_headers(headers: &HeaderMap, default_size: i64) -> Result<Self, AppError> {
        let page = number::<i64>(headers, "page")?.unwrap_or(0);
        let size = number::<i64>(headers, "size")?.unwrap_or(default_size);
        if page < 0 {
            return Err(AppError::BadRequest("page must not be negative".into()));
        }
        if size < 1 {
            return Err(AppError::BadRequest("size must be at least 1".into()));
        }
        Ok(Self { page, size })
    }
}
