use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use petadmin_core::{
    AdoptionApplication, ApplicationStatus, Pet, PetAdminError, PetSpecies, PetStatus, Result,
    User, UserRole, VaccinationRecord,
};

pub(crate) fn parse_id(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|_| PetAdminError::Parse(format!("invalid id: {}", s)))
}

pub(crate) fn user_from_row(row: &SqliteRow) -> Result<User> {
    let id: String = row.try_get("id")?;
    let role: String = row.try_get("role")?;
    Ok(User {
        id: parse_id(&id)?,
        full_name: row.try_get("full_name")?,
        email: row.try_get("email")?,
        role: role.parse::<UserRole>().map_err(PetAdminError::Parse)?,
        phone: row.try_get("phone")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

pub(crate) fn pet_from_row(row: &SqliteRow) -> Result<Pet> {
    let id: String = row.try_get("id")?;
    let species: String = row.try_get("species")?;
    let status: String = row.try_get("status")?;
    let age_months: i64 = row.try_get("age_months")?;
    Ok(Pet {
        id: parse_id(&id)?,
        name: row.try_get("name")?,
        species: species.parse::<PetSpecies>().map_err(PetAdminError::Parse)?,
        breed: row.try_get("breed")?,
        age_months: age_months.max(0) as u32,
        sex: row.try_get("sex")?,
        status: status.parse::<PetStatus>().map_err(PetAdminError::Parse)?,
        description: row.try_get("description")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

pub(crate) fn application_from_row(row: &SqliteRow) -> Result<AdoptionApplication> {
    let id: String = row.try_get("id")?;
    let user_id: String = row.try_get("user_id")?;
    let pet_id: String = row.try_get("pet_id")?;
    let status: String = row.try_get("status")?;
    Ok(AdoptionApplication {
        id: parse_id(&id)?,
        user_id: parse_id(&user_id)?,
        pet_id: parse_id(&pet_id)?,
        status: status
            .parse::<ApplicationStatus>()
            .map_err(PetAdminError::Parse)?,
        message: row.try_get("message")?,
        submitted_at: row.try_get::<DateTime<Utc>, _>("submitted_at")?,
        decided_at: row.try_get::<Option<DateTime<Utc>>, _>("decided_at")?,
    })
}

pub(crate) fn vaccination_from_row(row: &SqliteRow) -> Result<VaccinationRecord> {
    let id: String = row.try_get("id")?;
    let pet_id: String = row.try_get("pet_id")?;
    Ok(VaccinationRecord {
        id: parse_id(&id)?,
        pet_id: parse_id(&pet_id)?,
        vaccine: row.try_get("vaccine")?,
        administered_on: row.try_get::<NaiveDate, _>("administered_on")?,
        due_on: row.try_get::<Option<NaiveDate>, _>("due_on")?,
        veterinarian: row.try_get("veterinarian")?,
    })
}

/// An application joined with its applicant and pet, the shape the
/// applications listing works with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationRow {
    #[serde(flatten)]
    pub application: AdoptionApplication,
    pub applicant_name: String,
    pub applicant_email: String,
    pub pet_name: String,
    pub pet_species: PetSpecies,
    pub pet_status: PetStatus,
}

pub(crate) fn application_row_from_row(row: &SqliteRow) -> Result<ApplicationRow> {
    let pet_species: String = row.try_get("pet_species")?;
    let pet_status: String = row.try_get("pet_status")?;
    Ok(ApplicationRow {
        application: application_from_row(row)?,
        applicant_name: row.try_get("applicant_name")?,
        applicant_email: row.try_get("applicant_email")?,
        pet_name: row.try_get("pet_name")?,
        pet_species: pet_species
            .parse::<PetSpecies>()
            .map_err(PetAdminError::Parse)?,
        pet_status: pet_status
            .parse::<PetStatus>()
            .map_err(PetAdminError::Parse)?,
    })
}

/// A vaccination record joined with its pet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaccinationRow {
    #[serde(flatten)]
    pub record: VaccinationRecord,
    pub pet_name: String,
    pub pet_species: PetSpecies,
    pub pet_status: PetStatus,
}

pub(crate) fn vaccination_row_from_row(row: &SqliteRow) -> Result<VaccinationRow> {
    let pet_species: String = row.try_get("pet_species")?;
    let pet_status: String = row.try_get("pet_status")?;
    Ok(VaccinationRow {
        record: vaccination_from_row(row)?,
        pet_name: row.try_get("pet_name")?,
        pet_species: pet_species
            .parse::<PetSpecies>()
            .map_err(PetAdminError::Parse)?,
        pet_status: pet_status
            .parse::<PetStatus>()
            .map_err(PetAdminError::Parse)?,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountByLabel {
    pub label: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyCount {
    /// `YYYY-MM`.
    pub month: String,
    pub count: i64,
}

/// Everything the dashboard page renders: card counts plus chart series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_pets: i64,
    pub pets_by_status: Vec<CountByLabel>,
    pub pets_by_species: Vec<CountByLabel>,
    pub applications_by_status: Vec<CountByLabel>,
    pub total_adoptions: i64,
    pub adoptions_by_month: Vec<MonthlyCount>,
    pub vaccinations_due_soon: i64,
}
