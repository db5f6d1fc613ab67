use chrono::NaiveDate;
use serde::Serialize;

use petadmin_core::{ApplicationStatus, PetId, PetSpecies, PetStatus, UserRole};

pub const MAX_PER_PAGE: u32 = 100;
pub const DEFAULT_PER_PAGE: u32 = 20;

/// 1-based page selection with a clamped page size.
#[derive(Debug, Clone, Copy)]
pub struct PageParams {
    page: u32,
    per_page: u32,
}

impl PageParams {
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

impl<T> Page<T> {
    pub(crate) fn new(items: Vec<T>, total: i64, params: PageParams) -> Self {
        Self {
            items,
            total,
            page: params.page(),
            per_page: params.per_page(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub role: Option<UserRole>,
    /// Case-insensitive substring match over name and email.
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PetFilter {
    pub status: Option<PetStatus>,
    pub species: Option<PetSpecies>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ApplicationFilter {
    pub status: Option<ApplicationStatus>,
    pub pet_id: Option<PetId>,
}

#[derive(Debug, Clone, Default)]
pub struct VaccinationFilter {
    pub pet_id: Option<PetId>,
    pub vaccine: Option<String>,
    /// Keep records whose `due_on` falls on or before this date.
    pub due_before: Option<NaiveDate>,
}
