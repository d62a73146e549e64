use sqlx::{sqlite::SqliteRow, Row};

use gridplan_core::domain::customer::{
    Channel, Customer, CustomerId, DealerType, RepresentativeId,
};

use super::{RepositoryError, RosterRepository};
use crate::DbPool;

pub struct SqlRosterRepository {
    pool: DbPool,
}

impl SqlRosterRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl RosterRepository for SqlRosterRepository {
    async fn list_customers(&self) -> Result<Vec<Customer>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, name, code, channel, dealer_type, representative
             FROM customer
             ORDER BY code ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(customer_from_row).collect()
    }

    async fn find_by_id(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, code, channel, dealer_type, representative
             FROM customer
             WHERE id = ?",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.map(customer_from_row).transpose()
    }

    async fn save(&self, customer: Customer) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO customer (id, name, code, channel, dealer_type, representative)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                code = excluded.code,
                channel = excluded.channel,
                dealer_type = excluded.dealer_type,
                representative = excluded.representative",
        )
        .bind(&customer.id.0)
        .bind(&customer.name)
        .bind(&customer.code)
        .bind(customer.channel.as_str())
        .bind(customer.dealer_type.as_str())
        .bind(&customer.representative.0)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// Unknown channel and dealer labels collapse to the catch-all band instead of
// failing the load.
fn customer_from_row(row: SqliteRow) -> Result<Customer, RepositoryError> {
    Ok(Customer {
        id: CustomerId(row.try_get("id")?),
        name: row.try_get("name")?,
        code: row.try_get("code")?,
        channel: Channel::from_label(row.try_get::<String, _>("channel")?.as_str()),
        dealer_type: DealerType::from_label(row.try_get::<String, _>("dealer_type")?.as_str()),
        representative: RepresentativeId(row.try_get("representative")?),
    })
}

#[cfg(test)]
mod tests {
    use gridplan_core::domain::customer::{
        Channel, Customer, CustomerId, DealerType, RepresentativeId,
    };

    use super::SqlRosterRepository;
    use crate::connect_with_settings;
    use crate::migrations::run_pending;
    use crate::repositories::RosterRepository;

    fn customer(id: &str, code: &str) -> Customer {
        Customer {
            id: CustomerId(id.to_string()),
            name: format!("Customer {code}"),
            code: code.to_string(),
            channel: Channel::Horeca,
            dealer_type: DealerType::Wholesaler,
            representative: RepresentativeId("rep-1".to_string()),
        }
    }

    #[tokio::test]
    async fn save_and_find_round_trip() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        let repo = SqlRosterRepository::new(pool);
        let stored = customer("cust-1", "C-001");
        repo.save(stored.clone()).await.expect("save customer");

        let found = repo.find_by_id(&stored.id).await.expect("find customer");
        assert_eq!(found, Some(stored));
    }

    #[tokio::test]
    async fn list_orders_by_code() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        let repo = SqlRosterRepository::new(pool);
        repo.save(customer("cust-b", "C-002")).await.expect("save second");
        repo.save(customer("cust-a", "C-001")).await.expect("save first");

        let listed = repo.list_customers().await.expect("list customers");
        let codes = listed.iter().map(|c| c.code.as_str()).collect::<Vec<_>>();
        assert_eq!(codes, vec!["C-001", "C-002"]);
    }

    #[tokio::test]
    async fn unknown_labels_collapse_to_other() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        sqlx::query(
            "INSERT INTO customer (id, name, code, channel, dealer_type, representative)
             VALUES ('cust-x', 'Legacy Import', 'X-001', 'ecommerce', 'franchise', 'rep-9')",
        )
        .execute(&pool)
        .await
        .expect("insert raw row");

        let repo = SqlRosterRepository::new(pool);
        let found = repo
            .find_by_id(&CustomerId("cust-x".to_string()))
            .await
            .expect("find customer")
            .expect("row present");

        assert_eq!(found.channel, Channel::Other);
        assert_eq!(found.dealer_type, DealerType::Other);
    }
}
