//! In-memory repositories backing `AppState::fake()` in tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::cars::filters::CarFilter;
use crate::cars::repo::CarRepository;
use crate::cars::repo_types::{Car, CarPayload};
use crate::users::repo::{DuplicateEmail, UserRepository};
use crate::users::repo_types::{NewUser, User};

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Row-level semantics of the SQL each filter renders.
fn matches(filter: &CarFilter, car: &Car) -> bool {
    match filter {
        CarFilter::Model(v) => contains_ignore_case(&car.model, v),
        CarFilter::Manufacturer(v) => contains_ignore_case(&car.manufacturer, v),
        CarFilter::Country(v) => contains_ignore_case(&car.country, v),
        CarFilter::Color(v) => contains_ignore_case(&car.color, v),
        CarFilter::Year(y) => car.year == *y,
    }
}

fn page_of<T: Clone>(rows: &[T], page: i64, size: i64) -> Vec<T> {
    let skip = usize::try_from(page.saturating_mul(size)).unwrap_or(usize::MAX);
    let take = usize::try_from(size).unwrap_or(0);
    rows.iter().skip(skip).take(take).cloned().collect()
}

struct Table<T> {
    rows: Vec<T>,
    next_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            next_id: 0,
        }
    }
}

/// Cars kept in id order. `mutations` counts insert/update/delete calls.
#[derive(Default)]
pub struct MemoryCarRepository {
    table: Mutex<Table<Car>>,
    mutations: AtomicUsize,
}

impl MemoryCarRepository {
    pub fn mutations(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CarRepository for MemoryCarRepository {
    async fn find_all(&self, page: i64, size: i64) -> anyhow::Result<Vec<Car>> {
        Ok(page_of(&self.table.lock().unwrap().rows, page, size))
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Car>> {
        let table = self.table.lock().unwrap();
        Ok(table.rows.iter().find(|c| c.id == id).cloned())
    }

    async fn exists_by_id(&self, id: i64) -> anyhow::Result<bool> {
        Ok(self.find_by_id(id).await?.is_some())
    }

    async fn insert(&self, car: &CarPayload) -> anyhow::Result<Car> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        let mut table = self.table.lock().unwrap();
        table.next_id += 1;
        let row = car.clone().into_car(table.next_id);
        table.rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, id: i64, car: &CarPayload) -> anyhow::Result<Option<Car>> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        let mut table = self.table.lock().unwrap();
        Ok(table.rows.iter_mut().find(|c| c.id == id).map(|slot| {
            *slot = car.clone().into_car(id);
            slot.clone()
        }))
    }

    async fn delete_by_id(&self, id: i64) -> anyhow::Result<()> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        self.table.lock().unwrap().rows.retain(|c| c.id != id);
        Ok(())
    }

    async fn count(&self) -> anyhow::Result<i64> {
        Ok(self.table.lock().unwrap().rows.len() as i64)
    }

    async fn search(&self, filters: &[CarFilter]) -> anyhow::Result<Vec<Car>> {
        let table = self.table.lock().unwrap();
        Ok(table
            .rows
            .iter()
            .filter(|car| filters.iter().all(|f| matches(f, car)))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryUserRepository {
    table: Mutex<Table<User>>,
    mutations: AtomicUsize,
}

impl MemoryUserRepository {
    pub fn mutations(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let table = self.table.lock().unwrap();
        Ok(table.rows.iter().find(|u| u.email == email).cloned())
    }

    async fn find_all(&self, page: i64, size: i64) -> anyhow::Result<Vec<User>> {
        Ok(page_of(&self.table.lock().unwrap().rows, page, size))
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        let table = self.table.lock().unwrap();
        Ok(table.rows.iter().find(|u| u.id == id).cloned())
    }

    async fn exists_by_id(&self, id: i64) -> anyhow::Result<bool> {
        Ok(self.find_by_id(id).await?.is_some())
    }

    async fn insert(&self, user: &NewUser) -> anyhow::Result<User> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        let mut table = self.table.lock().unwrap();
        if table.rows.iter().any(|u| u.email == user.email) {
            return Err(DuplicateEmail.into());
        }
        table.next_id += 1;
        let row = User {
            id: table.next_id,
            name: user.name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            created_at: OffsetDateTime::now_utc(),
        };
        table.rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, id: i64, user: &NewUser) -> anyhow::Result<Option<User>> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        let mut table = self.table.lock().unwrap();
        if table.rows.iter().any(|u| u.id != id && u.email == user.email) {
            return Err(DuplicateEmail.into());
        }
        Ok(table.rows.iter_mut().find(|u| u.id == id).map(|slot| {
            slot.name = user.name.clone();
            slot.email = user.email.clone();
            slot.password_hash = user.password_hash.clone();
            slot.clone()
        }))
    }

    async fn delete_by_id(&self, id: i64) -> anyhow::Result<()> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        self.table.lock().unwrap().rows.retain(|u| u.id != id);
        Ok(())
    }

    async fn count(&self) -> anyhow::Result<i64> {
        Ok(self.table.lock().unwrap().rows.len() as i64)
    }
}
