use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use petadmin_core::{
    ApplicationStatus, Pet, PetSpecies, PetStatus, User, UserRole, VaccinationRecord,
};
use petadmin_store::{
    ApplicationFilter, ApplicationRow, DashboardStats, Page, PageParams, PetFilter, UserFilter,
    VaccinationFilter, VaccinationRow,
};

use crate::{ApiError, ApiResult, AppState};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: option_env!("CARGO_PKG_VERSION")
            .unwrap_or("0.1.0")
            .to_string(),
    })
}

fn parse_param<T>(value: Option<&str>, what: &str) -> ApiResult<Option<T>>
where
    T: FromStr<Err = String>,
{
    value
        .map(|s| {
            s.parse::<T>()
                .map_err(|e| ApiError::BadRequest(format!("invalid {}: {}", what, e)))
        })
        .transpose()
}

#[derive(Deserialize)]
pub struct UserListQuery {
    pub role: Option<String>,
    pub q: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<UserListQuery>,
) -> ApiResult<Json<Page<User>>> {
    let filter = UserFilter {
        role: parse_param::<UserRole>(params.role.as_deref(), "role")?,
        search: params.q,
    };
    let page = PageParams::new(params.page, params.per_page);
    let users = state.store.list_users(&filter, page).await?;
    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<User>> {
    let user = state.store.get_user(user_id).await?;
    Ok(Json(user))
}

#[derive(Deserialize)]
pub struct PetListQuery {
    pub status: Option<String>,
    pub species: Option<String>,
    pub q: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

pub async fn list_pets(
    State(state): State<AppState>,
    Query(params): Query<PetListQuery>,
) -> ApiResult<Json<Page<Pet>>> {
    let filter = PetFilter {
        status: parse_param::<PetStatus>(params.status.as_deref(), "status")?,
        species: parse_param::<PetSpecies>(params.species.as_deref(), "species")?,
        search: params.q,
    };
    let page = PageParams::new(params.page, params.per_page);
    let pets = state.store.list_pets(&filter, page).await?;
    Ok(Json(pets))
}

#[derive(Serialize)]
pub struct PetDetailResponse {
    #[serde(flatten)]
    pub pet: Pet,
    pub vaccinations: Vec<VaccinationRecord>,
}

pub async fn get_pet(
    State(state): State<AppState>,
    Path(pet_id): Path<Uuid>,
) -> ApiResult<Json<PetDetailResponse>> {
    let pet = state.store.get_pet(pet_id).await?;
    let vaccinations = state.store.pet_vaccinations(pet_id).await?;
    Ok(Json(PetDetailResponse { pet, vaccinations }))
}

#[derive(Deserialize)]
pub struct ApplicationListQuery {
    pub status: Option<String>,
    pub pet_id: Option<Uuid>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

pub async fn list_applications(
    State(state): State<AppState>,
    Query(params): Query<ApplicationListQuery>,
) -> ApiResult<Json<Page<ApplicationRow>>> {
    let filter = ApplicationFilter {
        status: parse_param::<ApplicationStatus>(params.status.as_deref(), "status")?,
        pet_id: params.pet_id,
    };
    let page = PageParams::new(params.page, params.per_page);
    let applications = state.store.list_applications(&filter, page).await?;
    Ok(Json(applications))
}

pub async fn get_application(
    State(state): State<AppState>,
    Path(application_id): Path<Uuid>,
) -> ApiResult<Json<ApplicationRow>> {
    let application = state.store.get_application(application_id).await?;
    Ok(Json(application))
}

#[derive(Deserialize)]
pub struct DecisionRequest {
    pub decision: ApplicationStatus,
    /// Only meaningful for approvals; defaults to 0.
    pub fee_cents: Option<i64>,
}

pub async fn decide_application(
    State(state): State<AppState>,
    Path(application_id): Path<Uuid>,
    Json(request): Json<DecisionRequest>,
) -> ApiResult<Json<ApplicationRow>> {
    let decided = state
        .store
        .decide_application(application_id, request.decision, request.fee_cents)
        .await?;
    Ok(Json(decided))
}

#[derive(Deserialize)]
pub struct VaccinationListQuery {
    pub pet_id: Option<Uuid>,
    pub vaccine: Option<String>,
    pub due_before: Option<NaiveDate>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

pub async fn list_vaccinations(
    State(state): State<AppState>,
    Query(params): Query<VaccinationListQuery>,
) -> ApiResult<Json<Page<VaccinationRow>>> {
    let filter = VaccinationFilter {
        pet_id: params.pet_id,
        vaccine: params.vaccine,
        due_before: params.due_before,
    };
    let page = PageParams::new(params.page, params.per_page);
    let records = state.store.list_vaccinations(&filter, page).await?;
    Ok(Json(records))
}

pub async fn dashboard(State(state): State<AppState>) -> ApiResult<Json<DashboardStats>> {
    let stats = state.store.dashboard_stats().await?;
    Ok(Json(stats))
}
