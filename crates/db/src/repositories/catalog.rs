use sqlx::{sqlite::SqliteRow, Row};

use gridplan_core::domain::product::{Product, ProductId};

use super::{parse_decimal, CatalogRepository, RepositoryError};
use crate::DbPool;

pub struct SqlCatalogRepository {
    pool: DbPool,
}

impl SqlCatalogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CatalogRepository for SqlCatalogRepository {
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query("SELECT id, code, name, unit_price FROM product ORDER BY code ASC")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(product_from_row).collect()
    }

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query("SELECT id, code, name, unit_price FROM product WHERE id = ?")
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.map(product_from_row).transpose()
    }

    async fn save(&self, product: Product) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO product (id, code, name, unit_price)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                code = excluded.code,
                name = excluded.name,
                unit_price = excluded.unit_price",
        )
        .bind(&product.id.0)
        .bind(&product.code)
        .bind(&product.name)
        .bind(product.unit_price.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn product_from_row(row: SqliteRow) -> Result<Product, RepositoryError> {
    Ok(Product {
        id: ProductId(row.try_get("id")?),
        code: row.try_get("code")?,
        name: row.try_get("name")?,
        unit_price: parse_decimal("unit_price", row.try_get("unit_price")?)?,
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use gridplan_core::domain::product::{Product, ProductId};

    use super::SqlCatalogRepository;
    use crate::connect_with_settings;
    use crate::migrations::run_pending;
    use crate::repositories::{CatalogRepository, RepositoryError};

    #[tokio::test]
    async fn save_preserves_exact_price() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        let repo = SqlCatalogRepository::new(pool);
        let stored = Product {
            id: ProductId("prod-1".to_string()),
            code: "P-001".to_string(),
            name: "Crate of 12".to_string(),
            unit_price: Decimal::new(4250, 2),
        };
        repo.save(stored.clone()).await.expect("save product");

        let found = repo.find_by_id(&stored.id).await.expect("find product");
        assert_eq!(found, Some(stored));
    }

    #[tokio::test]
    async fn malformed_price_fails_decode() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        sqlx::query(
            "INSERT INTO product (id, code, name, unit_price)
             VALUES ('prod-x', 'P-X', 'Broken Row', 'not-a-number')",
        )
        .execute(&pool)
        .await
        .expect("insert raw row");

        let repo = SqlCatalogRepository::new(pool);
        let result = repo.find_by_id(&ProductId("prod-x".to_string())).await;

        assert!(matches!(result, Err(RepositoryError::Decode(_))));
    }
}
