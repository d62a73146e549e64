use crate::connection::DbPool;
use crate::repositories::RepositoryError;
use sqlx::Executor;

/// Canonical demo roster covering every channel and dealer weight band.
const SEED_CUSTOMERS: &[SeedCustomerContract] = &[
    SeedCustomerContract {
        customer_id: "cust-mt-001",
        name: "Metro Grand Bazaar",
        code: "MT-001",
        channel: "modern_trade",
        dealer_type: "key_distributor",
        representative: "rep-anchali",
        description: "Flagship modern trade distributor - heaviest weight band",
    },
    SeedCustomerContract {
        customer_id: "cust-mt-002",
        name: "Harbor City Mart",
        code: "MT-002",
        channel: "modern_trade",
        dealer_type: "retailer",
        representative: "rep-anchali",
        description: "Modern trade retailer",
    },
    SeedCustomerContract {
        customer_id: "cust-ho-001",
        name: "Lotus Banquet Supply",
        code: "HO-001",
        channel: "horeca",
        dealer_type: "wholesaler",
        representative: "rep-danai",
        description: "HoReCa wholesaler",
    },
    SeedCustomerContract {
        customer_id: "cust-ho-002",
        name: "Riverside Catering Co",
        code: "HO-002",
        channel: "horeca",
        dealer_type: "retailer",
        representative: "rep-danai",
        description: "HoReCa retailer",
    },
    SeedCustomerContract {
        customer_id: "cust-gt-001",
        name: "Sunrise Provision Store",
        code: "GT-001",
        channel: "general_trade",
        dealer_type: "key_distributor",
        representative: "rep-kanya",
        description: "General trade distributor",
    },
    SeedCustomerContract {
        customer_id: "cust-gt-002",
        name: "Golden Field Traders",
        code: "GT-002",
        channel: "general_trade",
        dealer_type: "wholesaler",
        representative: "rep-kanya",
        description: "General trade wholesaler",
    },
    SeedCustomerContract {
        customer_id: "cust-gt-003",
        name: "Blue Hills Mini Mart",
        code: "GT-003",
        channel: "general_trade",
        dealer_type: "retailer",
        representative: "rep-kanya",
        description: "General trade retailer",
    },
    SeedCustomerContract {
        customer_id: "cust-ot-001",
        name: "Frontier Depot",
        code: "OT-001",
        channel: "other",
        dealer_type: "other",
        representative: "rep-danai",
        description: "Unclassified account - base weight band",
    },
];

const SEED_PRODUCTS: &[SeedProductContract] = &[
    SeedProductContract {
        product_id: "prod-aurora-500",
        code: "AUR-500",
        name: "Aurora Lager 500ml",
        unit_price: "42.50",
    },
    SeedProductContract {
        product_id: "prod-aurora-330",
        code: "AUR-330",
        name: "Aurora Lager 330ml",
        unit_price: "28.00",
    },
    SeedProductContract {
        product_id: "prod-summit-640",
        code: "SUM-640",
        name: "Summit Stout 640ml",
        unit_price: "55.25",
    },
];

/// Demo seed dataset for allocation planning sessions.
///
/// Provides a deterministic roster that exercises every combination the
/// weight model distinguishes, plus a small catalog for column binding.
pub struct DemoSeedDataset;

impl DemoSeedDataset {
    /// SQL fixture content for the demo seed data.
    pub const SQL: &str = include_str!("../../../config/fixtures/demo_seed_data.sql");

    /// Load the demo dataset into the database.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let mut tx = pool.begin().await?;

        tx.execute(sqlx::query(Self::SQL)).await?;
        tx.commit().await?;

        let roster_seeded = SEED_CUSTOMERS
            .iter()
            .map(|customer| SeedRosterInfo {
                customer_id: customer.customer_id,
                name: customer.name,
                channel: customer.channel,
                description: customer.description,
            })
            .collect::<Vec<_>>();

        let products_seeded = SEED_PRODUCTS
            .iter()
            .map(|product| SeedProductInfo {
                product_id: product.product_id,
                name: product.name,
                unit_price: product.unit_price,
            })
            .collect::<Vec<_>>();

        Ok(SeedResult { roster_seeded, products_seeded })
    }

    /// Verify that seed rows exist and match the contract.
    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::new();

        let quoted_customers = sql_array_from_ids(&customer_ids());
        let expected_customer_total = SEED_CUSTOMERS.len() as i64;
        let existing_customer_count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(1) FROM customer WHERE id IN {quoted_customers}"
        ))
        .fetch_one(pool)
        .await?;
        checks.push(("customer-count", existing_customer_count == expected_customer_total));

        for customer in SEED_CUSTOMERS {
            let row_ok: i64 = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM customer WHERE id = ?1 AND name = ?2 AND code = ?3 AND channel = ?4 AND dealer_type = ?5 AND representative = ?6)",
            )
            .bind(customer.customer_id)
            .bind(customer.name)
            .bind(customer.code)
            .bind(customer.channel)
            .bind(customer.dealer_type)
            .bind(customer.representative)
            .fetch_one(pool)
            .await?;
            checks.push((customer.customer_id, row_ok == 1));
        }

        let quoted_products = sql_array_from_ids(&product_ids());
        let expected_product_total = SEED_PRODUCTS.len() as i64;
        let existing_product_count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(1) FROM product WHERE id IN {quoted_products}"
        ))
        .fetch_one(pool)
        .await?;
        checks.push(("product-count", existing_product_count == expected_product_total));

        for product in SEED_PRODUCTS {
            let row_ok: i64 = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM product WHERE id = ?1 AND code = ?2 AND name = ?3 AND unit_price = ?4)",
            )
            .bind(product.product_id)
            .bind(product.code)
            .bind(product.name)
            .bind(product.unit_price)
            .fetch_one(pool)
            .await?;
            checks.push((product.product_id, row_ok == 1));
        }

        let all_present = checks.iter().all(|(_, exists)| *exists);
        Ok(VerificationResult { all_present, checks })
    }

    /// Clean up seeded fixtures from a test database.
    pub async fn clean(pool: &DbPool) -> Result<(), RepositoryError> {
        let mut tx = pool.begin().await?;

        let quoted_customers = sql_array_from_ids(&customer_ids());
        let quoted_products = sql_array_from_ids(&product_ids());

        sqlx::query(&format!("DELETE FROM customer WHERE id IN {quoted_customers}"))
            .execute(&mut *tx)
            .await?;
        sqlx::query(&format!("DELETE FROM product WHERE id IN {quoted_products}"))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct SeedCustomerContract {
    customer_id: &'static str,
    name: &'static str,
    code: &'static str,
    channel: &'static str,
    dealer_type: &'static str,
    representative: &'static str,
    description: &'static str,
}

#[derive(Debug, Clone, Copy)]
struct SeedProductContract {
    product_id: &'static str,
    code: &'static str,
    name: &'static str,
    unit_price: &'static str,
}

fn customer_ids() -> Vec<&'static str> {
    SEED_CUSTOMERS.iter().map(|customer| customer.customer_id).collect()
}

fn product_ids() -> Vec<&'static str> {
    SEED_PRODUCTS.iter().map(|product| product.product_id).collect()
}

fn sql_array_from_ids(ids: &[&str]) -> String {
    let quoted = ids.iter().map(|id| format!("'{}'", id)).collect::<Vec<_>>().join(",");
    format!("({quoted})")
}

#[derive(Debug)]
pub struct SeedResult {
    pub roster_seeded: Vec<SeedRosterInfo>,
    pub products_seeded: Vec<SeedProductInfo>,
}

#[derive(Debug)]
pub struct SeedRosterInfo {
    pub customer_id: &'static str,
    pub name: &'static str,
    pub channel: &'static str,
    pub description: &'static str,
}

#[derive(Debug)]
pub struct SeedProductInfo {
    pub product_id: &'static str,
    pub name: &'static str,
    pub unit_price: &'static str,
}

#[derive(Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}

impl VerificationResult {
    pub fn failed(&self) -> Vec<&'static str> {
        self.checks.iter().filter(|(_, ok)| !ok).map(|(label, _)| *label).collect()
    }
}
