use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::customer::CustomerId;
use crate::domain::product::ProductId;
use crate::grid::column::ColumnId;

/// Rejected grid operations. Validation findings are not errors; they are
/// reported as data by the validation module.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("column {0} does not exist")]
    UnknownColumn(ColumnId),
    #[error("customer `{0}` is not on the roster")]
    UnknownCustomer(CustomerId),
    #[error("product `{0}` is not bound to an input column")]
    ProductNotBound(ProductId),
    #[error("product `{product}` is already bound to column {column}")]
    ProductAlreadyBound { product: ProductId, column: ColumnId },
    #[error("column {0} is not an input column")]
    NotAnInputColumn(ColumnId),
    #[error("column {0} is derived; its cells are engine-written")]
    DerivedCellReadonly(ColumnId),
    #[error("removing column {0} needs no confirmation")]
    NoConfirmationNeeded(ColumnId),
    #[error("quantities must be non-negative, got {0}")]
    NegativeQuantity(Decimal),
}
