//! Target allocation grid: roster rows crossed with input and derived
//! columns, plus the recalculation rules that keep derived projections
//! consistent with input row totals.

pub mod column;
pub mod distribution;
pub mod filter;
pub mod submission;
pub mod validation;
pub mod weights;

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::customer::{Customer, CustomerId};
use crate::domain::product::ProductId;
use crate::errors::DomainError;

use self::column::{Column, ColumnId, ColumnKind, DerivedKind};
use self::distribution::{distribute, round_half_up};
use self::filter::RosterFilter;

pub type CellKey = (CustomerId, ColumnId);

/// Columns that an input column removal would take with it. Removing an
/// input column invalidates every derived column, so the plan always lists
/// all of them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadePlan {
    pub input: ColumnId,
    pub derived: Vec<ColumnId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovedColumns {
    pub columns: Vec<ColumnId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalOutcome {
    Removed(RemovedColumns),
    ConfirmationRequired(CascadePlan),
}

/// Owned, single-session grid state. All mutations are synchronous and every
/// operation leaves derived cells consistent with their rows, so reads never
/// observe a half-applied recalculation.
#[derive(Clone, Debug)]
pub struct TargetGrid {
    roster: Vec<Customer>,
    columns: Vec<Column>,
    cells: BTreeMap<CellKey, Decimal>,
    product_targets: BTreeMap<ProductId, Decimal>,
    regional_target: Decimal,
    filter: RosterFilter,
    next_column_id: u32,
}

impl TargetGrid {
    pub fn new(roster: Vec<Customer>) -> Self {
        Self {
            roster,
            columns: Vec::new(),
            cells: BTreeMap::new(),
            product_targets: BTreeMap::new(),
            regional_target: Decimal::ZERO,
            filter: RosterFilter::default(),
            next_column_id: 0,
        }
    }

    pub fn roster(&self) -> &[Customer] {
        &self.roster
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, id: ColumnId) -> Result<&Column, DomainError> {
        self.columns.iter().find(|column| column.id == id).ok_or(DomainError::UnknownColumn(id))
    }

    pub fn cells(&self) -> &BTreeMap<CellKey, Decimal> {
        &self.cells
    }

    /// Absent cells read as zero.
    pub fn cell(&self, customer: &CustomerId, column: ColumnId) -> Decimal {
        self.cells.get(&(customer.clone(), column)).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn product_targets(&self) -> &BTreeMap<ProductId, Decimal> {
        &self.product_targets
    }

    pub fn regional_target(&self) -> Decimal {
        self.regional_target
    }

    pub fn filter(&self) -> &RosterFilter {
        &self.filter
    }

    /// Replaces the view filter. Cells written for customers that drop out
    /// of view stay in the store and reappear when the filter widens.
    pub fn set_filter(&mut self, filter: RosterFilter) {
        self.filter = filter;
    }

    pub fn clear_filter(&mut self) {
        self.filter = RosterFilter::default();
    }

    pub fn visible_customers(&self) -> impl Iterator<Item = &Customer> + '_ {
        self.roster.iter().filter(|customer| self.filter.matches(customer))
    }

    pub fn add_input_column(&mut self) -> ColumnId {
        let id = self.allocate_column_id();
        self.columns.push(Column { id, kind: ColumnKind::Input { product: None } });
        id
    }

    /// Adds a derived column and backfills it from current row totals.
    pub fn add_derived_column(&mut self, kind: DerivedKind) -> ColumnId {
        let id = self.allocate_column_id();
        self.columns.push(Column { id, kind: ColumnKind::Derived(kind) });
        let customers: Vec<CustomerId> = self.roster.iter().map(|c| c.id.clone()).collect();
        for customer in customers {
            let value = round_half_up(self.row_total_unchecked(&customer) / kind.divisor());
            self.cells.insert((customer, id), value);
        }
        id
    }

    /// Binds `product` to an input column and distributes its target across
    /// the full roster. A target set for the product earlier in the session
    /// is reused; otherwise the column starts from zero.
    pub fn bind_product(&mut self, column: ColumnId, product: ProductId) -> Result<(), DomainError> {
        let position = self.position(column)?;
        if !self.columns[position].kind.is_input() {
            return Err(DomainError::NotAnInputColumn(column));
        }
        if let Some(existing) = self.input_column_bound_to(&product) {
            if existing != column {
                return Err(DomainError::ProductAlreadyBound { product, column: existing });
            }
        }
        // Rebinding a column away from a previous product drops that
        // product's target entry.
        if let Some(previous) = self.columns[position].kind.bound_product().cloned() {
            if previous != product {
                self.product_targets.remove(&previous);
            }
        }
        let target = self.product_targets.get(&product).copied().unwrap_or(Decimal::ZERO);
        self.columns[position].kind = ColumnKind::Input { product: Some(product.clone()) };
        self.product_targets.insert(product, target);
        self.redistribute_column(column, target);
        Ok(())
    }

    /// Updates a bound product's target and redistributes its column. This
    /// overwrites every cell in the column, including manual edits.
    pub fn set_product_target(
        &mut self,
        product: &ProductId,
        target: Decimal,
    ) -> Result<(), DomainError> {
        ensure_quantity(target)?;
        let column = self
            .input_column_bound_to(product)
            .ok_or_else(|| DomainError::ProductNotBound(product.clone()))?;
        self.product_targets.insert(product.clone(), target);
        self.redistribute_column(column, target);
        Ok(())
    }

    pub fn set_regional_target(&mut self, target: Decimal) -> Result<(), DomainError> {
        ensure_quantity(target)?;
        self.regional_target = target;
        Ok(())
    }

    /// Writes one input cell. The edit survives until the next
    /// redistribution of its column.
    pub fn set_cell(
        &mut self,
        customer: &CustomerId,
        column: ColumnId,
        quantity: Decimal,
    ) -> Result<(), DomainError> {
        ensure_quantity(quantity)?;
        self.ensure_customer(customer)?;
        let position = self.position(column)?;
        if !self.columns[position].kind.is_input() {
            return Err(DomainError::DerivedCellReadonly(column));
        }
        self.cells.insert((customer.clone(), column), quantity);
        self.recalculate_row(customer);
        Ok(())
    }

    /// Sum of input cells for one roster row. Derived cells never count.
    pub fn row_total(&self, customer: &CustomerId) -> Result<Decimal, DomainError> {
        self.ensure_customer(customer)?;
        Ok(self.row_total_unchecked(customer))
    }

    /// Column sum over currently visible customers only.
    pub fn column_total(&self, column: ColumnId) -> Result<Decimal, DomainError> {
        self.column(column)?;
        Ok(self.visible_customers().map(|customer| self.cell(&customer.id, column)).sum())
    }

    /// Sum of all input cells over currently visible customers.
    pub fn grand_total(&self) -> Decimal {
        let inputs: Vec<ColumnId> =
            self.columns.iter().filter(|c| c.is_input()).map(|c| c.id).collect();
        self.visible_customers()
            .map(|customer| {
                inputs.iter().map(|column| self.cell(&customer.id, *column)).sum::<Decimal>()
            })
            .sum()
    }

    /// First phase of column removal. Derived columns and input columns with
    /// no derived columns present are removed immediately; otherwise the
    /// grid is left untouched and the returned plan lists the cascade that
    /// `confirm_remove_column` would apply.
    pub fn remove_column(&mut self, id: ColumnId) -> Result<RemovalOutcome, DomainError> {
        let kind = self.column(id)?.kind.clone();
        match kind {
            ColumnKind::Derived(_) => Ok(RemovalOutcome::Removed(self.delete_columns(vec![id]))),
            ColumnKind::Input { .. } => {
                let derived = self.derived_column_ids();
                if derived.is_empty() {
                    Ok(RemovalOutcome::Removed(self.delete_columns(vec![id])))
                } else {
                    Ok(RemovalOutcome::ConfirmationRequired(CascadePlan { input: id, derived }))
                }
            }
        }
    }

    /// Second phase of column removal, valid only while a cascade is
    /// pending. Recomputes the cascade rather than trusting a stored plan,
    /// so a stale confirmation still removes exactly the derived columns
    /// present now. Confirming a column that `remove_column` would remove
    /// immediately is rejected and leaves the grid untouched.
    pub fn confirm_remove_column(&mut self, id: ColumnId) -> Result<RemovedColumns, DomainError> {
        let kind = self.column(id)?.kind.clone();
        match kind {
            ColumnKind::Derived(_) => Err(DomainError::NoConfirmationNeeded(id)),
            ColumnKind::Input { .. } => {
                let derived = self.derived_column_ids();
                if derived.is_empty() {
                    Err(DomainError::NoConfirmationNeeded(id))
                } else {
                    let mut ids = vec![id];
                    ids.extend(derived);
                    Ok(self.delete_columns(ids))
                }
            }
        }
    }

    fn delete_columns(&mut self, ids: Vec<ColumnId>) -> RemovedColumns {
        let unbound: Vec<ProductId> = self
            .columns
            .iter()
            .filter(|column| ids.contains(&column.id))
            .filter_map(|column| column.kind.bound_product().cloned())
            .collect();
        for product in unbound {
            self.product_targets.remove(&product);
        }
        self.columns.retain(|column| !ids.contains(&column.id));
        self.cells.retain(|(_, column), _| !ids.contains(column));
        RemovedColumns { columns: ids }
    }

    fn redistribute_column(&mut self, column: ColumnId, target: Decimal) {
        let allocations = distribute(target, &self.roster);
        let customers: Vec<CustomerId> = self.roster.iter().map(|c| c.id.clone()).collect();
        for customer in customers {
            let quantity = allocations.get(&customer).copied().unwrap_or(Decimal::ZERO);
            self.cells.insert((customer.clone(), column), quantity);
            self.recalculate_row(&customer);
        }
    }

    /// Rewrites every derived cell in one row from the row's input total.
    fn recalculate_row(&mut self, customer: &CustomerId) {
        let total = self.row_total_unchecked(customer);
        let derived: Vec<(ColumnId, DerivedKind)> = self
            .columns
            .iter()
            .filter_map(|column| column.kind.derived_kind().map(|kind| (column.id, kind)))
            .collect();
        for (id, kind) in derived {
            self.cells.insert((customer.clone(), id), round_half_up(total / kind.divisor()));
        }
    }

    fn row_total_unchecked(&self, customer: &CustomerId) -> Decimal {
        self.columns
            .iter()
            .filter(|column| column.is_input())
            .map(|column| self.cell(customer, column.id))
            .sum()
    }

    fn position(&self, id: ColumnId) -> Result<usize, DomainError> {
        self.columns.iter().position(|column| column.id == id).ok_or(DomainError::UnknownColumn(id))
    }

    fn input_column_bound_to(&self, product: &ProductId) -> Option<ColumnId> {
        self.columns
            .iter()
            .find(|column| column.kind.bound_product() == Some(product))
            .map(|column| column.id)
    }

    fn derived_column_ids(&self) -> Vec<ColumnId> {
        self.columns.iter().filter(|c| !c.is_input()).map(|c| c.id).collect()
    }

    fn ensure_customer(&self, customer: &CustomerId) -> Result<(), DomainError> {
        if self.roster.iter().any(|c| &c.id == customer) {
            Ok(())
        } else {
            Err(DomainError::UnknownCustomer(customer.clone()))
        }
    }

    fn allocate_column_id(&mut self) -> ColumnId {
        let id = ColumnId(self.next_column_id);
        self.next_column_id += 1;
        id
    }
}

fn ensure_quantity(value: Decimal) -> Result<(), DomainError> {
    if value < Decimal::ZERO {
        return Err(DomainError::NegativeQuantity(value));
    }
    Ok(())
}
