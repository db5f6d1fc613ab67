//! SQLite-backed persistence for the PetAdmin back-office.
//!
//! The [`Store`] owns a connection pool and exposes the query surface the
//! admin pages are built on: filtered, paginated listings over users, pets,
//! adoption applications, and vaccination records, the adoption-approval
//! transaction, and the dashboard aggregation.

mod applications;
mod dashboard;
mod filter;
mod migrations;
mod model;
mod pets;
mod seed;
mod store;
mod users;
mod vaccinations;

pub use filter::{
    ApplicationFilter, Page, PageParams, PetFilter, UserFilter, VaccinationFilter,
};
pub use model::{ApplicationRow, CountByLabel, DashboardStats, MonthlyCount, VaccinationRow};
pub use seed::SeedCounts;
pub use store::Store;
