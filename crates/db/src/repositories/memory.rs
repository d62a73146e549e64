use std::collections::HashMap;

use tokio::sync::RwLock;

use gridplan_core::domain::customer::{Customer, CustomerId};
use gridplan_core::domain::product::{Product, ProductId};
use gridplan_core::grid::submission::{SubmissionId, SubmissionPayload};

use super::{CatalogRepository, RepositoryError, RosterRepository, SubmissionRepository};

#[derive(Default)]
pub struct InMemoryRosterRepository {
    customers: RwLock<HashMap<String, Customer>>,
}

#[async_trait::async_trait]
impl RosterRepository for InMemoryRosterRepository {
    async fn list_customers(&self) -> Result<Vec<Customer>, RepositoryError> {
        let customers = self.customers.read().await;
        let mut listed = customers.values().cloned().collect::<Vec<_>>();
        listed.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(listed)
    }

    async fn find_by_id(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let customers = self.customers.read().await;
        Ok(customers.get(&id.0).cloned())
    }

    async fn save(&self, customer: Customer) -> Result<(), RepositoryError> {
        let mut customers = self.customers.write().await;
        customers.insert(customer.id.0.clone(), customer);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryCatalogRepository {
    products: RwLock<HashMap<String, Product>>,
}

#[async_trait::async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = self.products.read().await;
        let mut listed = products.values().cloned().collect::<Vec<_>>();
        listed.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(listed)
    }

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products.get(&id.0).cloned())
    }

    async fn save(&self, product: Product) -> Result<(), RepositoryError> {
        let mut products = self.products.write().await;
        products.insert(product.id.0.clone(), product);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemorySubmissionRepository {
    payloads: RwLock<HashMap<String, SubmissionPayload>>,
}

#[async_trait::async_trait]
impl SubmissionRepository for InMemorySubmissionRepository {
    async fn find_by_id(
        &self,
        id: &SubmissionId,
    ) -> Result<Option<SubmissionPayload>, RepositoryError> {
        let payloads = self.payloads.read().await;
        Ok(payloads.get(&id.to_string()).cloned())
    }

    async fn save(&self, payload: SubmissionPayload) -> Result<(), RepositoryError> {
        let mut payloads = self.payloads.write().await;
        payloads.insert(payload.id.to_string(), payload);
        Ok(())
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<SubmissionPayload>, RepositoryError> {
        let payloads = self.payloads.read().await;
        let mut listed = payloads.values().cloned().collect::<Vec<_>>();
        listed.sort_by(|a, b| b.generated_at.cmp(&a.generated_at));
        listed.truncate(limit as usize);
        Ok(listed)
    }
}
