//! Consistency checks reported as data. Row findings are advisory while
//! editing; both levels gate submission.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::customer::CustomerId;

use super::column::{ColumnId, DerivedKind};
use super::TargetGrid;

/// A derived cell whose value, multiplied back by its divisor, strays from
/// the row total by more than 0.01.
///
/// Derived cells hold rounded projections, so any row total not divisible by
/// the divisor trips this check. That is intended: the finding marks rows
/// whose published weekly/daily figures do not reconstruct the row total,
/// and planners clear it by adjusting inputs or dropping the projection
/// columns before submitting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowMismatch {
    pub customer: CustomerId,
    pub column: ColumnId,
    pub kind: DerivedKind,
    pub derived_value: Decimal,
    pub row_total: Decimal,
    pub deviation: Decimal,
}

/// Reconciliation of the sum of product targets against the regional
/// target. A difference of at most one unit is accepted as rounding slack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateCheck {
    pub product_target_sum: Decimal,
    pub regional_target: Decimal,
    pub difference: Decimal,
    pub within_tolerance: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub row_mismatches: Vec<RowMismatch>,
    pub aggregate: AggregateCheck,
}

impl ValidationReport {
    /// Drafts save regardless; submission needs both levels clean.
    pub fn allows_submission(&self) -> bool {
        self.row_mismatches.is_empty() && self.aggregate.within_tolerance
    }
}

/// Pull-based: recomputed from current state on every call, never cached.
pub fn validate(grid: &TargetGrid) -> ValidationReport {
    ValidationReport { row_mismatches: row_mismatches(grid), aggregate: aggregate_check(grid) }
}

/// Checks every roster row, hidden or not; the filter is a view concern.
pub fn row_mismatches(grid: &TargetGrid) -> Vec<RowMismatch> {
    let tolerance = Decimal::new(1, 2);
    let derived: Vec<(ColumnId, DerivedKind)> = grid
        .columns()
        .iter()
        .filter_map(|column| column.kind.derived_kind().map(|kind| (column.id, kind)))
        .collect();

    let mut findings = Vec::new();
    for customer in grid.roster() {
        let row_total = match grid.row_total(&customer.id) {
            Ok(total) => total,
            Err(_) => continue,
        };
        for (column, kind) in &derived {
            let derived_value = grid.cell(&customer.id, *column);
            let deviation = (derived_value * kind.divisor() - row_total).abs();
            if deviation > tolerance {
                findings.push(RowMismatch {
                    customer: customer.id.clone(),
                    column: *column,
                    kind: *kind,
                    derived_value,
                    row_total,
                    deviation,
                });
            }
        }
    }
    findings
}

pub fn aggregate_check(grid: &TargetGrid) -> AggregateCheck {
    compare_targets(grid.product_targets().values().copied().sum(), grid.regional_target())
}

pub fn compare_targets(product_target_sum: Decimal, regional_target: Decimal) -> AggregateCheck {
    let difference = (product_target_sum - regional_target).abs();
    AggregateCheck {
        product_target_sum,
        regional_target,
        difference,
        within_tolerance: difference <= Decimal::ONE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::customer::{Channel, Customer, DealerType, RepresentativeId};
    use crate::domain::product::ProductId;

    fn customer(id: &str, channel: Channel, dealer_type: DealerType) -> Customer {
        Customer {
            id: CustomerId(id.into()),
            name: format!("Customer {id}"),
            code: format!("C-{id}"),
            channel,
            dealer_type,
            representative: RepresentativeId("rep-1".into()),
        }
    }

    // Weights 7.5 / 3.0 / 2.0; target 125 lands rows 75 / 30 / 20.
    fn populated_grid() -> TargetGrid {
        let mut grid = TargetGrid::new(vec![
            customer("a", Channel::ModernTrade, DealerType::KeyDistributor),
            customer("b", Channel::GeneralTrade, DealerType::Wholesaler),
            customer("c", Channel::Horeca, DealerType::Retailer),
        ]);
        let column = grid.add_input_column();
        grid.bind_product(column, ProductId("p1".into())).unwrap();
        grid.set_product_target(&ProductId("p1".into()), Decimal::from(125)).unwrap();
        grid
    }

    #[test]
    fn cleanly_divisible_rows_pass_the_row_check() {
        let mut grid = TargetGrid::new(vec![customer("a", Channel::Other, DealerType::Other)]);
        let column = grid.add_input_column();
        grid.bind_product(column, ProductId("p1".into())).unwrap();
        grid.set_product_target(&ProductId("p1".into()), Decimal::from(76)).unwrap();
        grid.add_derived_column(DerivedKind::Weekly);

        // 76/4 = 19 exactly; 19 * 4 reconstructs the row total.
        assert!(row_mismatches(&grid).is_empty());
    }

    #[test]
    fn rounded_weekly_projections_flag_their_rows() {
        let mut grid = populated_grid();
        let weekly = grid.add_derived_column(DerivedKind::Weekly);

        let findings = row_mismatches(&grid);

        // 75 -> 19 (off by 1) and 30 -> 8 (off by 2) flag; 20 -> 5 is exact.
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].customer, CustomerId("a".into()));
        assert_eq!(findings[0].column, weekly);
        assert_eq!(findings[0].deviation, Decimal::ONE);
        assert_eq!(findings[1].customer, CustomerId("b".into()));
        assert_eq!(findings[1].deviation, Decimal::from(2));
    }

    #[test]
    fn daily_projections_deviate_by_up_to_half_the_divisor() {
        let mut grid = populated_grid();
        grid.add_derived_column(DerivedKind::Daily);

        let findings = row_mismatches(&grid);

        // 75 -> 3 reconstructs to 90; 30 -> 1 and 20 -> 1 reconstruct to 30.
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].row_total, Decimal::from(75));
        assert_eq!(findings[0].deviation, Decimal::from(15));
        assert_eq!(findings[1].row_total, Decimal::from(20));
        assert_eq!(findings[1].deviation, Decimal::from(10));
    }

    #[test]
    fn aggregate_within_one_unit_is_accepted() {
        let exact = compare_targets(Decimal::from(500), Decimal::from(500));
        assert!(exact.within_tolerance);
        assert_eq!(exact.difference, Decimal::ZERO);

        let boundary = compare_targets(Decimal::from(124), Decimal::from(125));
        assert!(boundary.within_tolerance);
        assert_eq!(boundary.difference, Decimal::ONE);

        let fractional = compare_targets(Decimal::new(5005, 1), Decimal::from(500));
        assert!(fractional.within_tolerance);
    }

    #[test]
    fn aggregate_beyond_one_unit_is_rejected() {
        let over = compare_targets(Decimal::new(50101, 2), Decimal::from(500));
        assert!(!over.within_tolerance);
        assert_eq!(over.difference, Decimal::new(101, 2));

        let under = compare_targets(Decimal::from(498), Decimal::from(500));
        assert!(!under.within_tolerance);
    }

    #[test]
    fn submission_gate_requires_both_levels_clean() {
        let mut grid = populated_grid();
        grid.set_regional_target(Decimal::from(300)).unwrap();

        let report = validate(&grid);
        assert!(report.row_mismatches.is_empty());
        assert!(!report.aggregate.within_tolerance);
        assert!(!report.allows_submission());

        grid.set_regional_target(Decimal::from(125)).unwrap();
        assert!(validate(&grid).allows_submission());

        // Projection columns reintroduce row findings and close the gate.
        grid.add_derived_column(DerivedKind::Weekly);
        assert!(!validate(&grid).allows_submission());
    }
}
