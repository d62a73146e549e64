use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;

/// Grid-local column handle. Allocated sequentially by the grid and never
/// reused within a session, so removed ids stay dangling rather than
/// pointing at a later column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ColumnId(pub u32);

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivedKind {
    Weekly,
    Daily,
}

impl DerivedKind {
    /// Fixed divisor applied to a customer's input row total.
    pub fn divisor(&self) -> Decimal {
        match self {
            DerivedKind::Weekly => Decimal::from(4),
            DerivedKind::Daily => Decimal::from(30),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DerivedKind::Weekly => "weekly",
            DerivedKind::Daily => "daily",
        }
    }
}

/// Input columns hold editable quantities and may bind a product; derived
/// columns are engine-written projections of row totals.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Input { product: Option<ProductId> },
    Derived(DerivedKind),
}

impl ColumnKind {
    pub fn is_input(&self) -> bool {
        matches!(self, ColumnKind::Input { .. })
    }

    pub fn derived_kind(&self) -> Option<DerivedKind> {
        match self {
            ColumnKind::Derived(kind) => Some(*kind),
            ColumnKind::Input { .. } => None,
        }
    }

    pub fn bound_product(&self) -> Option<&ProductId> {
        match self {
            ColumnKind::Input { product } => product.as_ref(),
            ColumnKind::Derived(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub kind: ColumnKind,
}

impl Column {
    pub fn is_input(&self) -> bool {
        self.kind.is_input()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divisors_match_projection_windows() {
        assert_eq!(DerivedKind::Weekly.divisor(), Decimal::from(4));
        assert_eq!(DerivedKind::Daily.divisor(), Decimal::from(30));
    }

    #[test]
    fn kind_accessors() {
        let unbound = ColumnKind::Input { product: None };
        let bound = ColumnKind::Input { product: Some(ProductId("p1".into())) };
        let weekly = ColumnKind::Derived(DerivedKind::Weekly);

        assert!(unbound.is_input() && bound.is_input() && !weekly.is_input());
        assert_eq!(bound.bound_product(), Some(&ProductId("p1".into())));
        assert_eq!(unbound.bound_product(), None);
        assert_eq!(weekly.derived_kind(), Some(DerivedKind::Weekly));
    }
}
