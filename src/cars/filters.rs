//! Search filters over single car attributes.
//!
//! Every variant renders one boolean condition into a [`QueryBuilder`]; a
//! search ANDs together whatever filters the caller supplied. A field the
//! caller does not want to filter on has no filter at all, so an empty list
//! selects every car.

use sqlx::{Postgres, QueryBuilder};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CarFilter {
    Model(String),
    Manufacturer(String),
    Country(String),
    Color(String),
    Year(i32),
}

impl CarFilter {
    pub fn column(&self) -> &'static str {
        match self {
            Self::Model(_) => "model",
            Self::Manufacturer(_) => "manufacturer",
            Self::Country(_) => "country",
            Self::Color(_) => "color",
            Self::Year(_) => "year",
        }
    }

    /// Appends this filter's condition. Text filters are case-insensitive,
    /// unanchored substring matches; `strpos` keeps `%` and `_` literal.
    pub fn push_condition(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        match self {
            Self::Year(year) => {
                qb.push("year = ").push_bind(*year);
            }
            Self::Model(value)
            | Self::Manufacturer(value)
            | Self::Country(value)
            | Self::Color(value) => {
                qb.push("strpos(lower(")
                    .push(self.column())
                    .push("), lower(")
                    .push_bind(value.clone())
                    .push(")) > 0");
            }
        }
    }
}

/// Optional criteria as they arrive from the request headers.
#[derive(Debug, Default, Clone)]
pub struct CarSearch {
    pub model: Option<String>,
    pub manufacturer: Option<String>,
    pub country: Option<String>,
    pub color: Option<String>,
    pub year: Option<i32>,
}

impl CarSearch {
    /// One filter per present criterion, in model, manufacturer, country,
    /// color, year order.
    pub fn into_filters(self) -> Vec<CarFilter> {
        let mut filters = Vec::new();
        if let Some(m) = self.model {
            filters.push(CarFilter::Model(m));
        }
        if let Some(f) = self.manufacturer {
            filters.push(CarFilter::Manufacturer(f));
        }
        if let Some(p) = self.country {
            filters.push(CarFilter::Country(p));
        }
        if let Some(c) = self.color {
            filters.push(CarFilter::Color(c));
        }
        if let Some(y) = self.year {
            filters.push(CarFilter::Year(y));
        }
        filters
    }
}

/// `SELECT` over all cars narrowed by the AND of `filters`.
pub fn search_query(filters: &[CarFilter]) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(
        "SELECT id, model, manufacturer, country, color, year, horsepower FROM cars",
    );
    for (i, filter) in filters.iter().enumerate() {
        qb.push(if i == 0 { " WHERE " } else { " AND " });
        filter.push_condition(&mut qb);
    }
    qb.push(" ORDER BY id");
    qb
}
