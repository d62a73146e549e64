pub mod customer;
pub mod plan;
pub mod product;
