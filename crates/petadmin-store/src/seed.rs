use chrono::{Duration, Utc};
use uuid::Uuid;

use petadmin_core::{
    AdoptionApplication, ApplicationStatus, Pet, PetId, PetSpecies, PetStatus, Result, User,
    UserId, UserRole, VaccinationRecord,
};

use crate::Store;

const FULL_NAMES: &[&str] = &[
    "Maria Santos",
    "James Okafor",
    "Priya Sharma",
    "Liam O'Brien",
    "Yuki Tanaka",
    "Fatima Al-Rashid",
    "Carlos Mendoza",
    "Emma Lindqvist",
    "Kwame Asante",
    "Sofia Rossi",
];

const PET_NAMES: &[&str] = &[
    "Rex", "Whiskers", "Bella", "Max", "Luna", "Charlie", "Daisy", "Rocky", "Milo", "Coco",
    "Buddy", "Nala",
];

const VACCINES: &[&str] = &["rabies", "distemper", "parvovirus", "bordetella", "leukemia"];

const SPECIES_CYCLE: &[PetSpecies] = &[
    PetSpecies::Dog,
    PetSpecies::Cat,
    PetSpecies::Rabbit,
    PetSpecies::Bird,
];

#[derive(Debug, Clone, Copy)]
pub struct SeedCounts {
    pub users: u32,
    pub pets: u32,
}

impl Default for SeedCounts {
    fn default() -> Self {
        Self { users: 12, pets: 16 }
    }
}

pub(crate) fn demo_user(full_name: &str, email: &str, role: UserRole) -> User {
    User {
        id: Uuid::new_v4(),
        full_name: full_name.to_string(),
        email: email.to_string(),
        role,
        phone: None,
        created_at: Utc::now(),
    }
}

pub(crate) fn demo_pet(name: &str, species: PetSpecies, status: PetStatus) -> Pet {
    Pet {
        id: Uuid::new_v4(),
        name: name.to_string(),
        species,
        breed: None,
        age_months: 24,
        sex: "female".to_string(),
        status,
        description: None,
        created_at: Utc::now(),
    }
}

pub(crate) fn demo_application(user_id: UserId, pet_id: PetId) -> AdoptionApplication {
    AdoptionApplication {
        id: Uuid::new_v4(),
        user_id,
        pet_id,
        status: ApplicationStatus::Pending,
        message: Some("We have a fenced yard and two kids who can't wait.".to_string()),
        submitted_at: Utc::now(),
        decided_at: None,
    }
}

pub(crate) fn demo_vaccination(
    pet_id: PetId,
    vaccine: &str,
    administered_on: chrono::NaiveDate,
    due_on: Option<chrono::NaiveDate>,
) -> VaccinationRecord {
    VaccinationRecord {
        id: Uuid::new_v4(),
        pet_id,
        vaccine: vaccine.to_string(),
        administered_on,
        due_on,
        veterinarian: None,
    }
}

impl Store {
    /// Insert a demo data set with a fixed shape (ids and timestamps are
    /// generated fresh): one admin, adopters, pets with vaccination
    /// histories, pending applications, and a handful of approved adoptions
    /// (driven through the real approval transaction).
    pub async fn seed_demo(&self, counts: &SeedCounts) -> Result<()> {
        let today = Utc::now().date_naive();

        let mut adopters: Vec<User> = Vec::new();
        for i in 0..counts.users {
            let role = if i == 0 {
                UserRole::Admin
            } else {
                UserRole::Adopter
            };
            let name = FULL_NAMES[i as usize % FULL_NAMES.len()];
            let email = format!("user{}@petadmin.example", i);
            let user = demo_user(name, &email, role);
            self.insert_user(&user).await?;
            if role == UserRole::Adopter {
                adopters.push(user);
            }
        }

        let mut pets: Vec<Pet> = Vec::new();
        for i in 0..counts.pets {
            let idx = i as usize;
            let mut pet = demo_pet(
                PET_NAMES[idx % PET_NAMES.len()],
                SPECIES_CYCLE[idx % SPECIES_CYCLE.len()].clone(),
                PetStatus::Available,
            );
            pet.age_months = (idx as u32 * 5 + 3) % 120;
            pet.sex = if idx % 2 == 0 { "male" } else { "female" }.to_string();
            self.insert_pet(&pet).await?;

            let administered = today - Duration::days((idx as i64 * 17) % 200);
            let due = if idx % 2 == 0 {
                Some(today + Duration::days((idx as i64 * 7) % 45))
            } else {
                None
            };
            let vaccine = VACCINES[idx % VACCINES.len()];
            self.insert_vaccination(&demo_vaccination(pet.id, vaccine, administered, due))
                .await?;

            pets.push(pet);
        }

        if adopters.is_empty() {
            return Ok(());
        }

        // every other pet receives an application; every fourth is approved
        for (idx, pet) in pets.iter().enumerate() {
            if idx % 2 != 0 {
                continue;
            }
            let applicant = &adopters[idx % adopters.len()];
            let application = demo_application(applicant.id, pet.id);
            self.insert_application(&application).await?;
            sqlx::query("UPDATE pets SET status = 'pending' WHERE id = ?")
                .bind(pet.id.to_string())
                .execute(self.pool())
                .await?;

            if idx % 4 == 0 {
                let runner_up = &adopters[(idx + 1) % adopters.len()];
                self.insert_application(&demo_application(runner_up.id, pet.id))
                    .await?;
                self.decide_application(
                    application.id,
                    ApplicationStatus::Approved,
                    Some((idx as i64 + 1) * 2500),
                )
                .await?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{PetFilter, UserFilter};
    use crate::PageParams;

    #[tokio::test]
    async fn seed_produces_consistent_counts() {
        let store = Store::open_in_memory().await.unwrap();
        let counts = SeedCounts { users: 6, pets: 8 };
        store.seed_demo(&counts).await.unwrap();

        let users = store
            .list_users(&UserFilter::default(), PageParams::default())
            .await
            .unwrap();
        assert_eq!(users.total, 6);

        let adopted = store
            .list_pets(
                &PetFilter {
                    status: Some(PetStatus::Adopted),
                    ..Default::default()
                },
                PageParams::default(),
            )
            .await
            .unwrap();
        // pets 0 and 4 were approved
        assert_eq!(adopted.total, 2);
        assert_eq!(store.total_adoptions().await.unwrap(), 2);
    }
}
