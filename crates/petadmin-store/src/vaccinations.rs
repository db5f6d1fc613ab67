use sqlx::{QueryBuilder, Row, Sqlite};

use petadmin_core::{Result, VaccinationRecord};

use crate::filter::{Page, PageParams, VaccinationFilter};
use crate::model::{vaccination_row_from_row, VaccinationRow};
use crate::Store;

const JOINED_SELECT: &str = r#"
SELECT
    v.id,
    v.pet_id,
    v.vaccine,
    v.administered_on,
    v.due_on,
    v.veterinarian,
    p.name AS pet_name,
    p.species AS pet_species,
    p.status AS pet_status
FROM vaccination_records v
JOIN pets p ON p.id = v.pet_id
"#;

fn push_vaccination_filters(builder: &mut QueryBuilder<'_, Sqlite>, filter: &VaccinationFilter) {
    builder.push(" WHERE 1 = 1");
    if let Some(pet_id) = filter.pet_id {
        builder.push(" AND v.pet_id = ").push_bind(pet_id.to_string());
    }
    if let Some(vaccine) = filter.vaccine.as_deref() {
        let vaccine = vaccine.trim();
        if !vaccine.is_empty() {
            builder
                .push(" AND v.vaccine LIKE ")
                .push_bind(format!("%{}%", vaccine));
        }
    }
    if let Some(cutoff) = filter.due_before {
        builder
            .push(" AND v.due_on IS NOT NULL AND v.due_on <= ")
            .push_bind(cutoff);
    }
}

impl Store {
    pub async fn count_vaccinations(&self, filter: &VaccinationFilter) -> Result<i64> {
        let mut builder =
            QueryBuilder::<Sqlite>::new("SELECT COUNT(*) AS n FROM vaccination_records v");
        push_vaccination_filters(&mut builder, filter);
        let row = builder.build().fetch_one(self.pool()).await?;
        Ok(row.try_get("n")?)
    }

    pub async fn list_vaccinations(
        &self,
        filter: &VaccinationFilter,
        page: PageParams,
    ) -> Result<Page<VaccinationRow>> {
        let total = self.count_vaccinations(filter).await?;

        let mut builder = QueryBuilder::<Sqlite>::new(JOINED_SELECT);
        push_vaccination_filters(&mut builder, filter);
        builder
            .push(" ORDER BY v.administered_on DESC, v.id ASC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows = builder.build().fetch_all(self.pool()).await?;
        let items = rows
            .iter()
            .map(vaccination_row_from_row)
            .collect::<Result<Vec<_>>>()?;
        Ok(Page::new(items, total, page))
    }

    pub(crate) async fn insert_vaccination(&self, record: &VaccinationRecord) -> Result<()> {
        sqlx::query(
            r#"
INSERT INTO vaccination_records (id, pet_id, vaccine, administered_on, due_on, veterinarian)
VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.id.to_string())
        .bind(record.pet_id.to_string())
        .bind(record.vaccine.as_str())
        .bind(record.administered_on)
        .bind(record.due_on)
        .bind(record.veterinarian.as_deref())
        .execute(self.pool())
        .await?;
        Ok(())
    }
}
