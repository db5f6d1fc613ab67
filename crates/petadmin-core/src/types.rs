use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub type UserId = Uuid;
pub type PetId = Uuid;
pub type ApplicationId = Uuid;
pub type AdoptionId = Uuid;
pub type VaccinationId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Adopter,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UserRole::Admin => "admin",
            UserRole::Adopter => "adopter",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "adopter" => Ok(UserRole::Adopter),
            other => Err(format!("unknown user role: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetSpecies {
    Dog,
    Cat,
    Rabbit,
    Bird,
    #[serde(untagged)]
    Other(String),
}

impl fmt::Display for PetSpecies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PetSpecies::Dog => "dog",
            PetSpecies::Cat => "cat",
            PetSpecies::Rabbit => "rabbit",
            PetSpecies::Bird => "bird",
            PetSpecies::Other(s) => s.as_str(),
        };
        write!(f, "{}", s)
    }
}

impl FromStr for PetSpecies {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dog" => Ok(PetSpecies::Dog),
            "cat" => Ok(PetSpecies::Cat),
            "rabbit" => Ok(PetSpecies::Rabbit),
            "bird" => Ok(PetSpecies::Bird),
            other => Ok(PetSpecies::Other(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetStatus {
    Available,
    Pending,
    Adopted,
}

impl fmt::Display for PetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PetStatus::Available => "available",
            PetStatus::Pending => "pending",
            PetStatus::Adopted => "adopted",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for PetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "available" => Ok(PetStatus::Available),
            "pending" => Ok(PetStatus::Pending),
            "adopted" => Ok(PetStatus::Adopted),
            other => Err(format!("unknown pet status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    /// A pending application may be approved or rejected; decided
    /// applications are immutable.
    pub fn can_transition_to(&self, next: ApplicationStatus) -> bool {
        matches!(
            (self, next),
            (
                ApplicationStatus::Pending,
                ApplicationStatus::Approved | ApplicationStatus::Rejected
            )
        )
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ApplicationStatus::Pending),
            "approved" => Ok(ApplicationStatus::Approved),
            "rejected" => Ok(ApplicationStatus::Rejected),
            other => Err(format!("unknown application status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub full_name: String,
    pub email: String,
    pub role: UserRole,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pet {
    pub id: PetId,
    pub name: String,
    pub species: PetSpecies,
    pub breed: Option<String>,
    pub age_months: u32,
    pub sex: String,
    pub status: PetStatus,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdoptionApplication {
    pub id: ApplicationId,
    pub user_id: UserId,
    pub pet_id: PetId,
    pub status: ApplicationStatus,
    pub message: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdoptionRecord {
    pub id: AdoptionId,
    pub application_id: ApplicationId,
    pub user_id: UserId,
    pub pet_id: PetId,
    pub adopted_at: DateTime<Utc>,
    pub fee_cents: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaccinationRecord {
    pub id: VaccinationId,
    pub pet_id: PetId,
    pub vaccine: String,
    pub administered_on: NaiveDate,
    pub due_on: Option<NaiveDate>,
    pub veterinarian: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            ApplicationStatus::Pending,
            ApplicationStatus::Approved,
            ApplicationStatus::Rejected,
        ] {
            assert_eq!(status.to_string().parse::<ApplicationStatus>(), Ok(status));
        }
        assert!("granted".parse::<ApplicationStatus>().is_err());
    }

    #[test]
    fn pet_status_rejects_unknown_strings() {
        assert_eq!("Available".parse::<PetStatus>(), Ok(PetStatus::Available));
        assert!("fostered".parse::<PetStatus>().is_err());
    }

    #[test]
    fn species_falls_back_to_other() {
        assert_eq!("dog".parse::<PetSpecies>(), Ok(PetSpecies::Dog));
        assert_eq!(
            "ferret".parse::<PetSpecies>(),
            Ok(PetSpecies::Other("ferret".to_string()))
        );
    }

    #[test]
    fn only_pending_applications_transition() {
        assert!(ApplicationStatus::Pending.can_transition_to(ApplicationStatus::Approved));
        assert!(ApplicationStatus::Pending.can_transition_to(ApplicationStatus::Rejected));
        assert!(!ApplicationStatus::Approved.can_transition_to(ApplicationStatus::Rejected));
        assert!(!ApplicationStatus::Rejected.can_transition_to(ApplicationStatus::Approved));
        assert!(!ApplicationStatus::Pending.can_transition_to(ApplicationStatus::Pending));
    }
}
