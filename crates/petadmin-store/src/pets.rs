use sqlx::{QueryBuilder, Row, Sqlite};

use petadmin_core::{Pet, PetAdminError, PetId, Result, VaccinationRecord};

use crate::filter::{Page, PageParams, PetFilter};
use crate::model::{pet_from_row, vaccination_from_row};
use crate::Store;

const PET_COLUMNS: &str =
    "id, name, species, breed, age_months, sex, status, description, created_at";

fn push_pet_filters(builder: &mut QueryBuilder<'_, Sqlite>, filter: &PetFilter) {
    builder.push(" WHERE 1 = 1");
    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status.to_string());
    }
    if let Some(species) = filter.species.as_ref() {
        builder.push(" AND species = ").push_bind(species.to_string());
    }
    if let Some(q) = filter.search.as_deref() {
        let q = q.trim();
        if !q.is_empty() {
            builder
                .push(" AND name LIKE ")
                .push_bind(format!("%{}%", q));
        }
    }
}

impl Store {
    pub async fn count_pets(&self, filter: &PetFilter) -> Result<i64> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) AS n FROM pets");
        push_pet_filters(&mut builder, filter);
        let row = builder.build().fetch_one(self.pool()).await?;
        Ok(row.try_get("n")?)
    }

    pub async fn list_pets(&self, filter: &PetFilter, page: PageParams) -> Result<Page<Pet>> {
        let total = self.count_pets(filter).await?;

        let mut builder = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM pets", PET_COLUMNS));
        push_pet_filters(&mut builder, filter);
        builder
            .push(" ORDER BY created_at DESC, id ASC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows = builder.build().fetch_all(self.pool()).await?;
        let items = rows.iter().map(pet_from_row).collect::<Result<Vec<_>>>()?;
        Ok(Page::new(items, total, page))
    }

    pub async fn get_pet(&self, id: PetId) -> Result<Pet> {
        let row = sqlx::query(&format!("SELECT {} FROM pets WHERE id = ?", PET_COLUMNS))
            .bind(id.to_string())
            .fetch_optional(self.pool())
            .await?;
        row.as_ref()
            .map(pet_from_row)
            .transpose()?
            .ok_or_else(|| PetAdminError::NotFound(format!("pet {}", id)))
    }

    /// Vaccination history for one pet, newest first.
    pub async fn pet_vaccinations(&self, pet_id: PetId) -> Result<Vec<VaccinationRecord>> {
        let rows = sqlx::query(
            r#"
SELECT id, pet_id, vaccine, administered_on, due_on, veterinarian
FROM vaccination_records
WHERE pet_id = ?
ORDER BY administered_on DESC, id ASC
            "#,
        )
        .bind(pet_id.to_string())
        .fetch_all(self.pool())
        .await?;
        rows.iter().map(vaccination_from_row).collect()
    }

    pub(crate) async fn insert_pet(&self, pet: &Pet) -> Result<()> {
        sqlx::query(
            r#"
INSERT INTO pets (id, name, species, breed, age_months, sex, status, description, created_at)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(pet.id.to_string())
        .bind(pet.name.as_str())
        .bind(pet.species.to_string())
        .bind(pet.breed.as_deref())
        .bind(i64::from(pet.age_months))
        .bind(pet.sex.as_str())
        .bind(pet.status.to_string())
        .bind(pet.description.as_deref())
        .bind(pet.created_at)
        .execute(self.pool())
        .await?;
        Ok(())
    }
}
