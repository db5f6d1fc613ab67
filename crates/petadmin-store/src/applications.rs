use chrono::Utc;
use sqlx::{Connection, QueryBuilder, Row, Sqlite};
use uuid::Uuid;

use petadmin_core::{
    AdoptionApplication, ApplicationId, ApplicationStatus, PetAdminError, Result,
};

use crate::filter::{ApplicationFilter, Page, PageParams};
use crate::model::{application_from_row, application_row_from_row, ApplicationRow};
use crate::Store;

const JOINED_SELECT: &str = r#"
SELECT
    a.id,
    a.user_id,
    a.pet_id,
    a.status,
    a.message,
    a.submitted_at,
    a.decided_at,
    u.full_name AS applicant_name,
    u.email AS applicant_email,
    p.name AS pet_name,
    p.species AS pet_species,
    p.status AS pet_status
FROM adoption_applications a
JOIN users u ON u.id = a.user_id
JOIN pets p ON p.id = a.pet_id
"#;

fn push_application_filters(builder: &mut QueryBuilder<'_, Sqlite>, filter: &ApplicationFilter) {
    builder.push(" WHERE 1 = 1");
    if let Some(status) = filter.status {
        builder.push(" AND a.status = ").push_bind(status.to_string());
    }
    if let Some(pet_id) = filter.pet_id {
        builder.push(" AND a.pet_id = ").push_bind(pet_id.to_string());
    }
}

impl Store {
    pub async fn count_applications(&self, filter: &ApplicationFilter) -> Result<i64> {
        let mut builder =
            QueryBuilder::<Sqlite>::new("SELECT COUNT(*) AS n FROM adoption_applications a");
        push_application_filters(&mut builder, filter);
        let row = builder.build().fetch_one(self.pool()).await?;
        Ok(row.try_get("n")?)
    }

    pub async fn list_applications(
        &self,
        filter: &ApplicationFilter,
        page: PageParams,
    ) -> Result<Page<ApplicationRow>> {
        let total = self.count_applications(filter).await?;

        let mut builder = QueryBuilder::<Sqlite>::new(JOINED_SELECT);
        push_application_filters(&mut builder, filter);
        builder
            .push(" ORDER BY a.submitted_at DESC, a.id ASC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows = builder.build().fetch_all(self.pool()).await?;
        let items = rows
            .iter()
            .map(application_row_from_row)
            .collect::<Result<Vec<_>>>()?;
        Ok(Page::new(items, total, page))
    }

    pub async fn get_application(&self, id: ApplicationId) -> Result<ApplicationRow> {
        let sql = format!("{} WHERE a.id = ?", JOINED_SELECT);
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(self.pool())
            .await?;
        row.as_ref()
            .map(application_row_from_row)
            .transpose()?
            .ok_or_else(|| PetAdminError::NotFound(format!("application {}", id)))
    }

    /// Decide a pending application.
    ///
    /// Approval sets the application's status, inserts the adoption record,
    /// marks the pet adopted, and rejects every other still-pending
    /// application for the same pet. Rejection sets the status and, when no
    /// pending application remains, returns a pet held in `pending` to
    /// `available`. All statements run in one transaction that takes the
    /// write lock at `BEGIN`, so a concurrent decision for the same
    /// application waits and then fails the pending check.
    pub async fn decide_application(
        &self,
        id: ApplicationId,
        decision: ApplicationStatus,
        fee_cents: Option<i64>,
    ) -> Result<ApplicationRow> {
        if decision == ApplicationStatus::Pending {
            return Err(PetAdminError::InvalidTransition(
                "decision must be approved or rejected".into(),
            ));
        }

        let mut conn = self.pool().acquire().await?;
        let mut tx = conn.begin_with("BEGIN IMMEDIATE").await?;

        let row = sqlx::query(
            r#"
SELECT id, user_id, pet_id, status, message, submitted_at, decided_at
FROM adoption_applications
WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&mut *tx)
        .await?;
        let app = row
            .as_ref()
            .map(application_from_row)
            .transpose()?
            .ok_or_else(|| PetAdminError::NotFound(format!("application {}", id)))?;

        if !app.status.can_transition_to(decision) {
            return Err(PetAdminError::InvalidTransition(format!(
                "application {} is already {}",
                id, app.status
            )));
        }

        let now = Utc::now();
        let updated = sqlx::query(
            r#"
UPDATE adoption_applications
SET status = ?, decided_at = ?
WHERE id = ? AND status = 'pending'
            "#,
        )
        .bind(decision.to_string())
        .bind(now)
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(PetAdminError::InvalidTransition(format!(
                "application {} is no longer pending",
                id
            )));
        }

        match decision {
            ApplicationStatus::Approved => {
                sqlx::query(
                    r#"
INSERT INTO adoption_records (id, application_id, user_id, pet_id, adopted_at, fee_cents)
VALUES (?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(Uuid::new_v4().to_string())
                .bind(id.to_string())
                .bind(app.user_id.to_string())
                .bind(app.pet_id.to_string())
                .bind(now)
                .bind(fee_cents.unwrap_or(0))
                .execute(&mut *tx)
                .await?;

                sqlx::query("UPDATE pets SET status = 'adopted' WHERE id = ?")
                    .bind(app.pet_id.to_string())
                    .execute(&mut *tx)
                    .await?;

                sqlx::query(
                    r#"
UPDATE adoption_applications
SET status = 'rejected', decided_at = ?
WHERE pet_id = ? AND status = 'pending' AND id != ?
                    "#,
                )
                .bind(now)
                .bind(app.pet_id.to_string())
                .bind(id.to_string())
                .execute(&mut *tx)
                .await?;
            }
            ApplicationStatus::Rejected => {
                let remaining: i64 = sqlx::query(
                    "SELECT COUNT(*) AS n FROM adoption_applications WHERE pet_id = ? AND status = 'pending'",
                )
                .bind(app.pet_id.to_string())
                .fetch_one(&mut *tx)
                .await?
                .try_get("n")?;

                if remaining == 0 {
                    sqlx::query(
                        "UPDATE pets SET status = 'available' WHERE id = ? AND status = 'pending'",
                    )
                    .bind(app.pet_id.to_string())
                    .execute(&mut *tx)
                    .await?;
                }
            }
            ApplicationStatus::Pending => unreachable!("rejected above"),
        }

        tx.commit().await?;
        // Return the connection to the pool before re-querying; holding it
        // while acquiring again deadlocks a single-connection pool.
        drop(conn);
        self.get_application(id).await
    }

    pub(crate) async fn insert_application(&self, app: &AdoptionApplication) -> Result<()> {
        sqlx::query(
            r#"
INSERT INTO adoption_applications (id, user_id, pet_id, status, message, submitted_at, decided_at)
VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(app.id.to_string())
        .bind(app.user_id.to_string())
        .bind(app.pet_id.to_string())
        .bind(app.status.to_string())
        .bind(app.message.as_deref())
        .bind(app.submitted_at)
        .bind(app.decided_at)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    pub async fn total_adoptions(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM adoption_records")
            .fetch_one(self.pool())
            .await?;
        Ok(row.try_get("n")?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::{demo_application, demo_pet, demo_user};
    use petadmin_core::{PetSpecies, PetStatus, UserRole};

    async fn seed_two_applicants(store: &Store) -> (AdoptionApplication, AdoptionApplication) {
        let alice = demo_user("Alice", "alice@example.com", UserRole::Adopter);
        let bob = demo_user("Bob", "bob@example.com", UserRole::Adopter);
        let pet = demo_pet("Rex", PetSpecies::Dog, PetStatus::Pending);
        store.insert_user(&alice).await.unwrap();
        store.insert_user(&bob).await.unwrap();
        store.insert_pet(&pet).await.unwrap();

        let first = demo_application(alice.id, pet.id);
        let second = demo_application(bob.id, pet.id);
        store.insert_application(&first).await.unwrap();
        store.insert_application(&second).await.unwrap();
        (first, second)
    }

    async fn store_with_two_applicants() -> (Store, AdoptionApplication, AdoptionApplication) {
        let store = Store::open_in_memory().await.unwrap();
        let (first, second) = seed_two_applicants(&store).await;
        (store, first, second)
    }

    #[tokio::test]
    async fn approval_creates_record_and_rejects_competitors() {
        let (store, first, second) = store_with_two_applicants().await;

        let decided = store
            .decide_application(first.id, ApplicationStatus::Approved, Some(7500))
            .await
            .unwrap();
        assert_eq!(decided.application.status, ApplicationStatus::Approved);
        assert!(decided.application.decided_at.is_some());
        assert_eq!(decided.pet_status, PetStatus::Adopted);

        // the competing application was rejected in the same transaction
        let other = store.get_application(second.id).await.unwrap();
        assert_eq!(other.application.status, ApplicationStatus::Rejected);
        assert!(other.application.decided_at.is_some());

        assert_eq!(store.total_adoptions().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn deciding_twice_is_an_invalid_transition() {
        let (store, first, _) = store_with_two_applicants().await;

        store
            .decide_application(first.id, ApplicationStatus::Rejected, None)
            .await
            .unwrap();
        let err = store
            .decide_application(first.id, ApplicationStatus::Approved, None)
            .await
            .unwrap_err();
        assert!(matches!(err, PetAdminError::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn rejecting_last_pending_application_frees_the_pet() {
        let (store, first, second) = store_with_two_applicants().await;

        store
            .decide_application(first.id, ApplicationStatus::Rejected, None)
            .await
            .unwrap();
        // one pending application remains, the pet stays pending
        let pet = store.get_pet(first.pet_id).await.unwrap();
        assert_eq!(pet.status, PetStatus::Pending);

        store
            .decide_application(second.id, ApplicationStatus::Rejected, None)
            .await
            .unwrap();
        let pet = store.get_pet(first.pet_id).await.unwrap();
        assert_eq!(pet.status, PetStatus::Available);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_decisions_pick_exactly_one_winner() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(&dir.path().join("apps.sqlite"), 4).await.unwrap();
        let (first, _) = seed_two_applicants(&store).await;

        let approve = {
            let store = store.clone();
            let id = first.id;
            tokio::spawn(async move {
                store
                    .decide_application(id, ApplicationStatus::Approved, None)
                    .await
            })
        };
        let reject = {
            let store = store.clone();
            let id = first.id;
            tokio::spawn(async move {
                store
                    .decide_application(id, ApplicationStatus::Rejected, None)
                    .await
            })
        };

        let approved = approve.await.unwrap();
        let rejected = reject.await.unwrap();
        assert!(approved.is_ok() != rejected.is_ok());
        let loser = match (approved, rejected) {
            (Ok(_), Err(e)) | (Err(e), Ok(_)) => e,
            _ => unreachable!("asserted one winner above"),
        };
        assert!(matches!(loser, PetAdminError::InvalidTransition(_)));

        let decided = store.get_application(first.id).await.unwrap();
        assert_ne!(decided.application.status, ApplicationStatus::Pending);
        assert!(store.total_adoptions().await.unwrap() <= 1);
    }

    #[tokio::test]
    async fn pending_is_not_a_decision() {
        let (store, first, _) = store_with_two_applicants().await;
        let err = store
            .decide_application(first.id, ApplicationStatus::Pending, None)
            .await
            .unwrap_err();
        assert!(matches!(err, PetAdminError::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn list_applications_joins_and_filters() {
        let (store, first, _) = store_with_two_applicants().await;

        let all = store
            .list_applications(&ApplicationFilter::default(), PageParams::default())
            .await
            .unwrap();
        assert_eq!(all.total, 2);
        assert_eq!(all.items[0].pet_name, "Rex");
        assert!(!all.items[0].applicant_email.is_empty());

        store
            .decide_application(first.id, ApplicationStatus::Approved, None)
            .await
            .unwrap();

        let pending = store
            .list_applications(
                &ApplicationFilter {
                    status: Some(ApplicationStatus::Pending),
                    ..Default::default()
                },
                PageParams::default(),
            )
            .await
            .unwrap();
        assert_eq!(pending.total, 0);
    }
}
