use sqlx::{QueryBuilder, Row, Sqlite};

use petadmin_core::{PetAdminError, Result, User, UserId};

use crate::filter::{Page, PageParams, UserFilter};
use crate::model::user_from_row;
use crate::Store;

const USER_COLUMNS: &str = "id, full_name, email, role, phone, created_at";

fn push_user_filters(builder: &mut QueryBuilder<'_, Sqlite>, filter: &UserFilter) {
    builder.push(" WHERE 1 = 1");
    if let Some(role) = filter.role {
        builder.push(" AND role = ").push_bind(role.to_string());
    }
    if let Some(q) = filter.search.as_deref() {
        let q = q.trim();
        if !q.is_empty() {
            let pattern = format!("%{}%", q);
            builder
                .push(" AND (full_name LIKE ")
                .push_bind(pattern.clone())
                .push(" OR email LIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }
}

impl Store {
    pub async fn count_users(&self, filter: &UserFilter) -> Result<i64> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) AS n FROM users");
        push_user_filters(&mut builder, filter);
        let row = builder.build().fetch_one(self.pool()).await?;
        Ok(row.try_get("n")?)
    }

    pub async fn list_users(&self, filter: &UserFilter, page: PageParams) -> Result<Page<User>> {
        let total = self.count_users(filter).await?;

        let mut builder =
            QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM users", USER_COLUMNS));
        push_user_filters(&mut builder, filter);
        builder
            .push(" ORDER BY created_at DESC, id ASC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows = builder.build().fetch_all(self.pool()).await?;
        let items = rows.iter().map(user_from_row).collect::<Result<Vec<_>>>()?;
        Ok(Page::new(items, total, page))
    }

    pub async fn get_user(&self, id: UserId) -> Result<User> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE id = ?",
            USER_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(self.pool())
        .await?;
        row.as_ref()
            .map(user_from_row)
            .transpose()?
            .ok_or_else(|| PetAdminError::NotFound(format!("user {}", id)))
    }

    pub(crate) async fn insert_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
INSERT INTO users (id, full_name, email, role, phone, created_at)
VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.id.to_string())
        .bind(user.full_name.as_str())
        .bind(user.email.as_str())
        .bind(user.role.to_string())
        .bind(user.phone.as_deref())
        .bind(user.created_at)
        .execute(self.pool())
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::demo_user;
    use petadmin_core::UserRole;

    #[tokio::test]
    async fn list_users_filters_by_role_and_search() {
        let store = Store::open_in_memory().await.unwrap();
        store
            .insert_user(&demo_user("Ada Lovelace", "ada@example.com", UserRole::Admin))
            .await
            .unwrap();
        store
            .insert_user(&demo_user("Grace Hopper", "grace@example.com", UserRole::Adopter))
            .await
            .unwrap();
        store
            .insert_user(&demo_user("Alan Kay", "alan@example.com", UserRole::Adopter))
            .await
            .unwrap();

        let all = store
            .list_users(&UserFilter::default(), PageParams::default())
            .await
            .unwrap();
        assert_eq!(all.total, 3);

        let admins = store
            .list_users(
                &UserFilter {
                    role: Some(UserRole::Admin),
                    ..Default::default()
                },
                PageParams::default(),
            )
            .await
            .unwrap();
        assert_eq!(admins.total, 1);
        assert_eq!(admins.items[0].full_name, "Ada Lovelace");

        // search matches name or email, case-insensitively
        let found = store
            .list_users(
                &UserFilter {
                    search: Some("GRACE".into()),
                    ..Default::default()
                },
                PageParams::default(),
            )
            .await
            .unwrap();
        assert_eq!(found.total, 1);
        assert_eq!(found.items[0].email, "grace@example.com");
    }

    #[tokio::test]
    async fn pagination_past_the_end_keeps_true_total() {
        let store = Store::open_in_memory().await.unwrap();
        for i in 0..5 {
            let name = format!("User {}", i);
            let email = format!("user{}@example.com", i);
            store
                .insert_user(&demo_user(&name, &email, UserRole::Adopter))
                .await
                .unwrap();
        }

        let page = store
            .list_users(
                &UserFilter::default(),
                PageParams::new(Some(4), Some(2)),
            )
            .await
            .unwrap();
        assert_eq!(page.total, 5);
        assert!(page.items.is_empty());
        assert_eq!(page.page, 4);
    }

    #[tokio::test]
    async fn get_user_unknown_id_is_not_found() {
        let store = Store::open_in_memory().await.unwrap();
        let err = store.get_user(uuid::Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, PetAdminError::NotFound(_)));
    }
}
