pub mod audit;
pub mod config;
pub mod domain;
pub mod errors;
pub mod grid;

pub use audit::{
    AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink, InMemoryAuditSink,
};
pub use domain::customer::{Channel, Customer, CustomerId, DealerType, RepresentativeId};
pub use domain::plan::{PlanContext, SubmissionStatus};
pub use domain::product::{Catalog, Product, ProductId};
pub use errors::DomainError;
pub use grid::column::{Column, ColumnId, ColumnKind, DerivedKind};
pub use grid::distribution::distribute;
pub use grid::filter::RosterFilter;
pub use grid::submission::{
    assemble_draft, assemble_draft_with_audit, assemble_submission,
    assemble_submission_with_audit, PayloadCell, PayloadColumn, SubmissionBlocked, SubmissionId,
    SubmissionPayload,
};
pub use grid::validation::{
    aggregate_check, compare_targets, row_mismatches, validate, AggregateCheck, RowMismatch,
    ValidationReport,
};
pub use grid::weights::{channel_multiplier, customer_weight, dealer_type_multiplier};
pub use grid::{CascadePlan, RemovalOutcome, RemovedColumns, TargetGrid};
