//! Scripted allocation session against a live database. Seeds the demo
//! roster, walks the grid through distribution, projections, a cascade
//! prompt, filtering, and both payload assemblies, and prints what happened.

use std::collections::BTreeSet;

use anyhow::Context;
use rust_decimal::Decimal;
use serde::Serialize;

use gridplan_core::audit::{AuditContext, InMemoryAuditSink};
use gridplan_core::config::{AppConfig, LoadOptions};
use gridplan_core::domain::customer::RepresentativeId;
use gridplan_core::domain::plan::PlanContext;
use gridplan_core::domain::product::{Catalog, ProductId};
use gridplan_core::grid::column::DerivedKind;
use gridplan_core::grid::filter::RosterFilter;
use gridplan_core::grid::submission::{
    assemble_draft_with_audit, assemble_submission_with_audit, SubmissionPayload,
};
use gridplan_core::grid::validation::validate;
use gridplan_core::grid::{RemovalOutcome, TargetGrid};
use gridplan_db::repositories::{
    CatalogRepository, RosterRepository, SqlCatalogRepository, SqlRosterRepository,
    SqlSubmissionRepository, SubmissionRepository,
};
use gridplan_db::{connect_from_config, migrations, DbPool, DemoSeedDataset};

use crate::commands::CommandResult;

pub fn run(json_output: bool) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "demo",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    init_logging(&config);

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "demo",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let result = runtime.block_on(async {
        let pool = connect_from_config(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        DemoSeedDataset::load(&pool)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;

        let verification = DemoSeedDataset::verify(&pool)
            .await
            .map_err(|error| ("seed_verification", error.to_string(), 6u8))?;
        if !verification.all_present {
            let failed_checks = verification.failed();
            return Err((
                "seed_verification",
                format!("demo seed verification failed for checks: {}", failed_checks.join(", ")),
                6u8,
            ));
        }

        let report = run_session(&pool, &config)
            .await
            .map_err(|error| ("demo_session", format!("{error:#}"), 7u8))?;

        pool.close().await;
        Ok(report)
    });

    match result {
        Ok(report) => {
            let output = if json_output {
                serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
                    format!("{{\"error\":\"demo report serialization failed: {error}\"}}")
                })
            } else {
                render_human(&report)
            };
            CommandResult { exit_code: 0, output }
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("demo", error_class, message, exit_code)
        }
    }
}

fn init_logging(config: &AppConfig) {
    use gridplan_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    // try_init: the command can run repeatedly inside one process.
    let _ = match config.logging.format {
        Compact => tracing_subscriber::fmt()
            .with_target(false)
            .with_max_level(log_level)
            .compact()
            .try_init(),
        Pretty => tracing_subscriber::fmt()
            .with_target(false)
            .with_max_level(log_level)
            .pretty()
            .try_init(),
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().try_init()
        }
    };
}

#[derive(Debug, Serialize)]
struct PayloadSummary {
    submission_id: String,
    status: String,
    cells: usize,
    visible_customers: usize,
    total_quantity: String,
    total_value: String,
}

impl PayloadSummary {
    fn from_payload(payload: &SubmissionPayload) -> Self {
        Self {
            submission_id: payload.id.to_string(),
            status: payload.status.as_str().to_string(),
            cells: payload.cells.len(),
            visible_customers: payload.visible_customers,
            total_quantity: payload.total_quantity.to_string(),
            total_value: payload.total_value.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DemoReport {
    plan: String,
    manager: String,
    roster_size: usize,
    catalog_size: usize,
    regional_target: String,
    product_targets: Vec<String>,
    row_findings_with_projections: usize,
    cascade_confirmation_declined: usize,
    filter_visible_customers: usize,
    draft: PayloadSummary,
    submitted: PayloadSummary,
    projection_columns_removed: usize,
    aggregate_difference: String,
    audit_events: usize,
    stored_submissions: usize,
    steps: Vec<String>,
}

async fn run_session(pool: &DbPool, config: &AppConfig) -> anyhow::Result<DemoReport> {
    let roster_repo = SqlRosterRepository::new(pool.clone());
    let catalog_repo = SqlCatalogRepository::new(pool.clone());
    let submission_repo = SqlSubmissionRepository::new(pool.clone());

    let roster = roster_repo.list_customers().await.context("loading demo roster")?;
    let products = catalog_repo.list_products().await.context("loading demo catalog")?;
    anyhow::ensure!(!roster.is_empty(), "demo roster is empty after seeding");
    anyhow::ensure!(!products.is_empty(), "demo catalog is empty after seeding");

    let catalog = Catalog::new(products.clone());
    let plan = PlanContext::new(
        &config.planning.period,
        &config.planning.region,
        &config.planning.manager,
    );
    let lager_500 = ProductId("prod-aurora-500".into());
    let lager_330 = ProductId("prod-aurora-330".into());

    tracing::info!(
        event_name = "demo.session_started",
        plan_ref = %plan.reference(),
        roster_size = roster.len(),
        catalog_size = products.len(),
        "starting scripted allocation session"
    );

    let mut steps = Vec::new();
    steps.push(format!(
        "loaded roster of {} customers and catalog of {} products",
        roster.len(),
        products.len()
    ));

    let mut grid = TargetGrid::new(roster.clone());
    let lager_column = grid.add_input_column();
    grid.bind_product(lager_column, lager_500.clone())?;
    let small_column = grid.add_input_column();
    grid.bind_product(small_column, lager_330.clone())?;
    steps.push(format!("bound input columns to {lager_500} and {lager_330}"));

    grid.set_product_target(&lager_500, Decimal::from(1200))?;
    grid.set_product_target(&lager_330, Decimal::from(800))?;
    grid.set_regional_target(Decimal::from(2000))?;

    let distributed_500 = grid.column_total(lager_column)?;
    let distributed_330 = grid.column_total(small_column)?;
    tracing::info!(
        event_name = "demo.targets_distributed",
        distributed_500 = %distributed_500,
        distributed_330 = %distributed_330,
        "distributed product targets across the roster by weight"
    );
    steps.push(format!(
        "distributed 1200 units by weight; rounded shares sum to {} (drift {})",
        distributed_500,
        distributed_500 - Decimal::from(1200)
    ));
    steps.push(format!(
        "distributed 800 units by weight; rounded shares sum to {}",
        distributed_330
    ));
    steps.push("set regional target 2000".to_string());

    let weekly_column = grid.add_derived_column(DerivedKind::Weekly);
    let daily_column = grid.add_derived_column(DerivedKind::Daily);
    steps.push("added weekly and daily projection columns".to_string());

    let edited = roster
        .iter()
        .find(|customer| customer.id.0 == "cust-ot-001")
        .ok_or_else(|| anyhow::anyhow!("demo roster is missing cust-ot-001"))?;
    let previous = grid.cell(&edited.id, lager_column);
    grid.set_cell(&edited.id, lager_column, Decimal::from(50))?;
    steps.push(format!(
        "manual edit: {} cell {} -> 50; projections recalculated from the new row total",
        edited.code, previous
    ));

    let advisory = validate(&grid);
    let row_findings_with_projections = advisory.row_mismatches.len();
    steps.push(format!(
        "validation with projections present: {row_findings_with_projections} row finding(s); drafts save regardless"
    ));

    let cascade_confirmation_declined = match grid.remove_column(lager_column)? {
        RemovalOutcome::ConfirmationRequired(cascade) => {
            tracing::info!(
                event_name = "demo.cascade_declined",
                input_column = %cascade.input,
                derived_columns = cascade.derived.len(),
                "declined input column removal cascade"
            );
            steps.push(format!(
                "removing input column {} would cascade to {} projection column(s); declined",
                cascade.input,
                cascade.derived.len()
            ));
            cascade.derived.len()
        }
        RemovalOutcome::Removed(_) => {
            anyhow::bail!("input column removal skipped cascade confirmation")
        }
    };

    grid.set_filter(RosterFilter {
        representatives: Some(BTreeSet::from([RepresentativeId("rep-kanya".into())])),
        ..RosterFilter::default()
    });
    let filter_visible_customers = grid.visible_customers().count();
    steps.push(format!(
        "filtered roster to representative rep-kanya: {} of {} customers visible",
        filter_visible_customers,
        roster.len()
    ));

    let sink = InMemoryAuditSink::default();
    let audit_context =
        AuditContext::new(Some(plan.reference()), "demo-session", plan.manager.clone());

    let draft = assemble_draft_with_audit(&grid, &plan, &catalog, &sink, &audit_context);
    let hidden_rows = roster.len() - draft.visible_customers;
    tracing::info!(
        event_name = "demo.draft_saved",
        submission_id = %draft.id,
        cells = draft.cells.len(),
        hidden_rows,
        "draft payload withholds rows hidden by the filter"
    );
    submission_repo.save(draft.clone()).await.context("saving draft")?;
    steps.push(format!(
        "saved draft {}: {} cells, quantity {}, value {}; {} hidden row(s) withheld from the payload",
        draft.id,
        draft.cells.len(),
        draft.total_quantity,
        draft.total_value,
        hidden_rows
    ));

    grid.clear_filter();
    let mut projection_columns_removed = 0;
    for column in [weekly_column, daily_column] {
        match grid.remove_column(column)? {
            RemovalOutcome::Removed(removed) => {
                projection_columns_removed += removed.columns.len()
            }
            RemovalOutcome::ConfirmationRequired(_) => {
                anyhow::bail!("projection column removal unexpectedly required confirmation")
            }
        }
    }
    steps.push(format!(
        "cleared filter and removed {projection_columns_removed} projection column(s)"
    ));

    let gate = validate(&grid);
    anyhow::ensure!(
        gate.allows_submission(),
        "validation still blocks submission: {} row finding(s), aggregate difference {}",
        gate.row_mismatches.len(),
        gate.aggregate.difference
    );
    let aggregate_difference = gate.aggregate.difference.to_string();
    steps.push(format!(
        "validation clean: aggregate difference {aggregate_difference} within tolerance"
    ));

    let submitted = assemble_submission_with_audit(&grid, &plan, &catalog, &sink, &audit_context)?;
    tracing::info!(
        event_name = "demo.submitted",
        submission_id = %submitted.id,
        total_quantity = %submitted.total_quantity,
        "assembled and stored submission payload"
    );
    submission_repo.save(submitted.clone()).await.context("saving submission")?;
    steps.push(format!(
        "saved submission {}: {} cells, quantity {}, value {}",
        submitted.id,
        submitted.cells.len(),
        submitted.total_quantity,
        submitted.total_value
    ));

    let stored = submission_repo.list_recent(10).await.context("listing stored submissions")?;
    let audit_events = sink.events().len();
    steps.push(format!(
        "audit trail recorded {} event(s); store holds {} submission(s)",
        audit_events,
        stored.len()
    ));

    let product_targets = grid
        .product_targets()
        .iter()
        .map(|(product, target)| format!("{product} -> {target}"))
        .collect();

    Ok(DemoReport {
        plan: plan.reference(),
        manager: plan.manager.clone(),
        roster_size: roster.len(),
        catalog_size: products.len(),
        regional_target: grid.regional_target().to_string(),
        product_targets,
        row_findings_with_projections,
        cascade_confirmation_declined,
        filter_visible_customers,
        draft: PayloadSummary::from_payload(&draft),
        submitted: PayloadSummary::from_payload(&submitted),
        projection_columns_removed,
        aggregate_difference,
        audit_events,
        stored_submissions: stored.len(),
        steps,
    })
}

fn render_human(report: &DemoReport) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "demo allocation session for plan {} (manager {})",
        report.plan, report.manager
    ));
    for step in &report.steps {
        lines.push(format!("- {step}"));
    }
    lines.join("\n")
}
