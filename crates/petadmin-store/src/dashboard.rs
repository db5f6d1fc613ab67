use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use petadmin_core::Result;

use crate::model::{CountByLabel, DashboardStats, MonthlyCount};
use crate::Store;

fn label_counts(rows: &[SqliteRow]) -> Result<Vec<CountByLabel>> {
    rows.iter()
        .map(|row| {
            Ok(CountByLabel {
                label: row.try_get("label")?,
                count: row.try_get("n")?,
            })
        })
        .collect()
}

impl Store {
    /// The aggregation behind the dashboard page: card counts plus the
    /// series the charts are drawn from.
    pub async fn dashboard_stats(&self) -> Result<DashboardStats> {
        let total_users: i64 = sqlx::query("SELECT COUNT(*) AS n FROM users")
            .fetch_one(self.pool())
            .await?
            .try_get("n")?;
        let total_pets: i64 = sqlx::query("SELECT COUNT(*) AS n FROM pets")
            .fetch_one(self.pool())
            .await?
            .try_get("n")?;

        let pets_by_status = label_counts(
            &sqlx::query(
                "SELECT status AS label, COUNT(*) AS n FROM pets GROUP BY status ORDER BY status",
            )
            .fetch_all(self.pool())
            .await?,
        )?;
        let pets_by_species = label_counts(
            &sqlx::query(
                "SELECT species AS label, COUNT(*) AS n FROM pets GROUP BY species ORDER BY n DESC, species",
            )
            .fetch_all(self.pool())
            .await?,
        )?;
        let applications_by_status = label_counts(
            &sqlx::query(
                "SELECT status AS label, COUNT(*) AS n FROM adoption_applications GROUP BY status ORDER BY status",
            )
            .fetch_all(self.pool())
            .await?,
        )?;

        let total_adoptions = self.total_adoptions().await?;

        // substr keeps this independent of the exact stored timestamp format
        let adoptions_by_month = sqlx::query(
            r#"
SELECT substr(adopted_at, 1, 7) AS month, COUNT(*) AS n
FROM adoption_records
WHERE adopted_at >= datetime('now', '-12 months')
GROUP BY month
ORDER BY month
            "#,
        )
        .fetch_all(self.pool())
        .await?
        .iter()
        .map(|row| {
            Ok(MonthlyCount {
                month: row.try_get("month")?,
                count: row.try_get("n")?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

        let vaccinations_due_soon: i64 = sqlx::query(
            r#"
SELECT COUNT(*) AS n
FROM vaccination_records
WHERE due_on IS NOT NULL
  AND due_on >= date('now')
  AND due_on <= date('now', '+30 days')
            "#,
        )
        .fetch_one(self.pool())
        .await?
        .try_get("n")?;

        Ok(DashboardStats {
            total_users,
            total_pets,
            pets_by_status,
            pets_by_species,
            applications_by_status,
            total_adoptions,
            adoptions_by_month,
            vaccinations_due_soon,
        })
    }
}
