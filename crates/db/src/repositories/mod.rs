use std::str::FromStr;

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use gridplan_core::domain::customer::{Customer, CustomerId};
use gridplan_core::domain::product::{Product, ProductId};
use gridplan_core::grid::submission::{SubmissionId, SubmissionPayload};

pub mod catalog;
pub mod memory;
pub mod roster;
pub mod submission;

pub use catalog::SqlCatalogRepository;
pub use memory::{
    InMemoryCatalogRepository, InMemoryRosterRepository, InMemorySubmissionRepository,
};
pub use roster::SqlRosterRepository;
pub use submission::SqlSubmissionRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("encode error: {0}")]
    Encode(String),
}

#[async_trait]
pub trait RosterRepository: Send + Sync {
    async fn list_customers(&self) -> Result<Vec<Customer>, RepositoryError>;
    async fn find_by_id(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError>;
    async fn save(&self, customer: Customer) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError>;
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError>;
    async fn save(&self, product: Product) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    async fn find_by_id(
        &self,
        id: &SubmissionId,
    ) -> Result<Option<SubmissionPayload>, RepositoryError>;

    async fn save(&self, payload: SubmissionPayload) -> Result<(), RepositoryError>;

    async fn list_recent(&self, limit: u32) -> Result<Vec<SubmissionPayload>, RepositoryError>;
}

pub(crate) fn parse_decimal(column: &str, value: String) -> Result<Decimal, RepositoryError> {
    Decimal::from_str(&value).map_err(|error| {
        RepositoryError::Decode(format!("invalid decimal in `{column}`: `{value}` ({error})"))
    })
}
