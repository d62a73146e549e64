//! Builds the save/submit payload handed to the persistence collaborator.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink};
use crate::domain::customer::CustomerId;
use crate::domain::plan::{PlanContext, SubmissionStatus};
use crate::domain::product::{Catalog, ProductId};

use super::column::{ColumnId, ColumnKind};
use super::validation::{validate, ValidationReport};
use super::TargetGrid;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(pub Uuid);

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadColumn {
    pub id: ColumnId,
    pub kind: ColumnKind,
    pub position: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadCell {
    pub customer: CustomerId,
    pub column: ColumnId,
    pub quantity: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub id: SubmissionId,
    pub period: String,
    pub region: String,
    pub manager: String,
    pub status: SubmissionStatus,
    pub columns: Vec<PayloadColumn>,
    pub cells: Vec<PayloadCell>,
    pub regional_target: Decimal,
    pub product_targets: BTreeMap<ProductId, Decimal>,
    pub total_quantity: Decimal,
    pub total_value: Decimal,
    pub visible_customers: usize,
    pub generated_at: DateTime<Utc>,
}

/// Submission refused because validation findings are outstanding. Draft
/// assembly never returns this; drafts save regardless of findings.
#[derive(Clone, Debug, Error, PartialEq)]
#[error(
    "submission blocked: {} row mismatch(es), aggregate difference {}",
    report.row_mismatches.len(),
    report.aggregate.difference
)]
pub struct SubmissionBlocked {
    pub report: ValidationReport,
}

pub fn assemble_draft(grid: &TargetGrid, plan: &PlanContext, catalog: &Catalog) -> SubmissionPayload {
    build(grid, plan, catalog, SubmissionStatus::Draft)
}

pub fn assemble_submission(
    grid: &TargetGrid,
    plan: &PlanContext,
    catalog: &Catalog,
) -> Result<SubmissionPayload, SubmissionBlocked> {
    let report = validate(grid);
    if !report.allows_submission() {
        return Err(SubmissionBlocked { report });
    }
    Ok(build(grid, plan, catalog, SubmissionStatus::Submitted))
}

pub fn assemble_draft_with_audit(
    grid: &TargetGrid,
    plan: &PlanContext,
    catalog: &Catalog,
    sink: &dyn AuditSink,
    context: &AuditContext,
) -> SubmissionPayload {
    let payload = assemble_draft(grid, plan, catalog);
    sink.emit(
        AuditEvent::new(
            context,
            "submission.draft_assembled",
            AuditCategory::Submission,
            AuditOutcome::Success,
        )
        .with_metadata("submission_id", payload.id.to_string())
        .with_metadata("cells", payload.cells.len().to_string())
        .with_metadata("visible_customers", payload.visible_customers.to_string()),
    );
    payload
}

pub fn assemble_submission_with_audit(
    grid: &TargetGrid,
    plan: &PlanContext,
    catalog: &Catalog,
    sink: &dyn AuditSink,
    context: &AuditContext,
) -> Result<SubmissionPayload, SubmissionBlocked> {
    match assemble_submission(grid, plan, catalog) {
        Ok(payload) => {
            sink.emit(
                AuditEvent::new(
                    context,
                    "submission.submitted",
                    AuditCategory::Submission,
                    AuditOutcome::Success,
                )
                .with_metadata("submission_id", payload.id.to_string())
                .with_metadata("total_quantity", payload.total_quantity.to_string()),
            );
            Ok(payload)
        }
        Err(blocked) => {
            sink.emit(
                AuditEvent::new(
                    context,
                    "submission.blocked",
                    AuditCategory::Validation,
                    AuditOutcome::Rejected,
                )
                .with_metadata("row_mismatches", blocked.report.row_mismatches.len().to_string())
                .with_metadata(
                    "aggregate_difference",
                    blocked.report.aggregate.difference.to_string(),
                ),
            );
            Err(blocked)
        }
    }
}

fn build(
    grid: &TargetGrid,
    plan: &PlanContext,
    catalog: &Catalog,
    status: SubmissionStatus,
) -> SubmissionPayload {
    let visible: BTreeSet<CustomerId> =
        grid.visible_customers().map(|customer| customer.id.clone()).collect();

    let columns: Vec<PayloadColumn> = grid
        .columns()
        .iter()
        .enumerate()
        .map(|(position, column)| PayloadColumn {
            id: column.id,
            kind: column.kind.clone(),
            position,
        })
        .collect();

    // Cells of customers hidden by the active filter are dropped from the
    // payload here. They stay in grid state and reappear once the filter
    // widens; persistence only ever sees the visible subset.
    let cells: Vec<PayloadCell> = grid
        .cells()
        .iter()
        .filter(|((customer, _), _)| visible.contains(customer))
        .map(|((customer, column), quantity)| PayloadCell {
            customer: customer.clone(),
            column: *column,
            quantity: *quantity,
        })
        .collect();

    let total_value: Decimal = grid
        .columns()
        .iter()
        .filter_map(|column| {
            column.kind.bound_product().map(|product| (column.id, catalog.unit_price(product)))
        })
        .map(|(column, unit_price)| {
            let quantity: Decimal =
                visible.iter().map(|customer| grid.cell(customer, column)).sum();
            quantity * unit_price
        })
        .sum();

    SubmissionPayload {
        id: SubmissionId(Uuid::new_v4()),
        period: plan.period.clone(),
        region: plan.region.clone(),
        manager: plan.manager.clone(),
        status,
        columns,
        cells,
        regional_target: grid.regional_target(),
        product_targets: grid.product_targets().clone(),
        total_quantity: grid.grand_total(),
        total_value,
        visible_customers: visible.len(),
        generated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::audit::InMemoryAuditSink;
    use crate::domain::customer::{Channel, Customer, DealerType, RepresentativeId};
    use crate::domain::product::Product;
    use crate::grid::filter::RosterFilter;

    fn customer(id: &str, channel: Channel, dealer_type: DealerType, rep: &str) -> Customer {
        Customer {
            id: CustomerId(id.into()),
            name: format!("Customer {id}"),
            code: format!("C-{id}"),
            channel,
            dealer_type,
            representative: RepresentativeId(rep.into()),
        }
    }

    fn plan() -> PlanContext {
        PlanContext::new("2026-09", "north", "s.oliveira")
    }

    fn catalog() -> Catalog {
        Catalog::new(vec![Product {
            id: ProductId("p1".into()),
            code: "SKU-001".into(),
            name: "Sparkling 330ml".into(),
            unit_price: Decimal::new(250, 2),
        }])
    }

    // Weights 7.5 / 3.0 / 2.0; target 125 lands rows 75 / 30 / 20.
    fn reconciled_grid() -> TargetGrid {
        let mut grid = TargetGrid::new(vec![
            customer("a", Channel::ModernTrade, DealerType::KeyDistributor, "rep-1"),
            customer("b", Channel::GeneralTrade, DealerType::Wholesaler, "rep-1"),
            customer("c", Channel::Horeca, DealerType::Retailer, "rep-2"),
        ]);
        let column = grid.add_input_column();
        grid.bind_product(column, ProductId("p1".into())).unwrap();
        grid.set_product_target(&ProductId("p1".into()), Decimal::from(125)).unwrap();
        grid.set_regional_target(Decimal::from(125)).unwrap();
        grid
    }

    #[test]
    fn draft_payload_carries_grid_state_and_pricing() {
        let grid = reconciled_grid();
        let payload = assemble_draft(&grid, &plan(), &catalog());

        assert_eq!(payload.status, SubmissionStatus::Draft);
        assert_eq!(payload.period, "2026-09");
        assert_eq!(payload.columns.len(), 1);
        assert_eq!(payload.cells.len(), 3);
        assert_eq!(payload.total_quantity, Decimal::from(125));
        assert_eq!(payload.total_value, Decimal::new(31250, 2));
        assert_eq!(payload.visible_customers, 3);
        assert_eq!(payload.product_targets.get(&ProductId("p1".into())), Some(&Decimal::from(125)));
    }

    #[test]
    fn hidden_customers_are_dropped_from_the_payload_only() {
        let mut grid = reconciled_grid();
        grid.set_filter(RosterFilter {
            representatives: Some(BTreeSet::from([RepresentativeId("rep-1".into())])),
            ..RosterFilter::default()
        });

        let narrowed = assemble_draft(&grid, &plan(), &catalog());
        assert_eq!(narrowed.visible_customers, 2);
        assert!(narrowed.cells.iter().all(|cell| cell.customer != CustomerId("c".into())));
        assert_eq!(narrowed.total_quantity, Decimal::from(105));

        // Internal state keeps the hidden row; widening restores it.
        assert_eq!(grid.cell(&CustomerId("c".into()), grid.columns()[0].id), Decimal::from(20));
        grid.clear_filter();
        let widened = assemble_draft(&grid, &plan(), &catalog());
        assert!(widened.cells.iter().any(|cell| cell.customer == CustomerId("c".into())));
        assert_eq!(widened.total_quantity, Decimal::from(125));
    }

    #[test]
    fn submission_requires_clean_validation() {
        let mut grid = reconciled_grid();
        grid.set_regional_target(Decimal::from(300)).unwrap();

        let blocked = assemble_submission(&grid, &plan(), &catalog()).unwrap_err();
        assert!(!blocked.report.aggregate.within_tolerance);
        assert!(blocked.to_string().contains("aggregate difference 175"));

        grid.set_regional_target(Decimal::from(125)).unwrap();
        let payload = assemble_submission(&grid, &plan(), &catalog()).unwrap();
        assert_eq!(payload.status, SubmissionStatus::Submitted);
    }

    #[test]
    fn row_findings_block_submission_but_not_drafts() {
        let mut grid = reconciled_grid();
        grid.add_derived_column(crate::grid::column::DerivedKind::Weekly);

        let blocked = assemble_submission(&grid, &plan(), &catalog()).unwrap_err();
        assert_eq!(blocked.report.row_mismatches.len(), 2);

        let draft = assemble_draft(&grid, &plan(), &catalog());
        assert_eq!(draft.status, SubmissionStatus::Draft);
        assert_eq!(draft.columns.len(), 2);
    }

    #[test]
    fn unbound_columns_count_quantity_but_not_value() {
        let mut grid = reconciled_grid();
        let unbound = grid.add_input_column();
        grid.set_cell(&CustomerId("a".into()), unbound, Decimal::from(10)).unwrap();

        let payload = assemble_draft(&grid, &plan(), &catalog());
        assert_eq!(payload.total_quantity, Decimal::from(135));
        assert_eq!(payload.total_value, Decimal::new(31250, 2));
    }

    #[test]
    fn audited_assembly_emits_submission_events() {
        let grid = reconciled_grid();
        let sink = InMemoryAuditSink::default();
        let context = AuditContext::new(Some(plan().reference()), "req-1", "planner");

        let payload = assemble_draft_with_audit(&grid, &plan(), &catalog(), &sink, &context);
        let result = assemble_submission_with_audit(&grid, &plan(), &catalog(), &sink, &context);
        assert!(result.is_ok());

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, "submission.draft_assembled");
        assert_eq!(
            events[0].metadata.get("submission_id"),
            Some(&payload.id.to_string())
        );
        assert_eq!(events[1].event_type, "submission.submitted");
        assert_eq!(events[1].outcome, AuditOutcome::Success);
    }

    #[test]
    fn blocked_submission_is_audited_as_rejected() {
        let mut grid = reconciled_grid();
        grid.set_regional_target(Decimal::from(300)).unwrap();
        let sink = InMemoryAuditSink::default();
        let context = AuditContext::new(Some(plan().reference()), "req-2", "planner");

        let result = assemble_submission_with_audit(&grid, &plan(), &catalog(), &sink, &context);
        assert!(result.is_err());

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "submission.blocked");
        assert_eq!(events[0].outcome, AuditOutcome::Rejected);
        assert_eq!(events[0].metadata.get("aggregate_difference"), Some(&"175".to_string()));
    }

    #[test]
    fn payload_serializes_with_stable_field_names() {
        let grid = reconciled_grid();
        let payload = assemble_draft(&grid, &plan(), &catalog());

        let value: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&payload).unwrap()).unwrap();
        assert_eq!(value["status"], "draft");
        assert_eq!(value["visible_customers"], 3);
        assert_eq!(value["cells"].as_array().map(|cells| cells.len()), Some(3));
        assert!(value["product_targets"]["p1"].is_string() || value["product_targets"]["p1"].is_number());
    }
}
