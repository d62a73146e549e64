use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::{sqlite::SqliteRow, Row};
use uuid::Uuid;

use gridplan_core::domain::plan::SubmissionStatus;
use gridplan_core::grid::submission::{SubmissionId, SubmissionPayload};

use super::{parse_decimal, RepositoryError, SubmissionRepository};
use crate::DbPool;

pub struct SqlSubmissionRepository {
    pool: DbPool,
}

impl SqlSubmissionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SubmissionRepository for SqlSubmissionRepository {
    async fn find_by_id(
        &self,
        id: &SubmissionId,
    ) -> Result<Option<SubmissionPayload>, RepositoryError> {
        let row = sqlx::query(
            "SELECT
                id,
                period,
                region,
                manager,
                status,
                regional_target,
                total_quantity,
                total_value,
                columns_json,
                cells_json,
                product_targets_json,
                visible_customers,
                generated_at
             FROM submission
             WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(payload_from_row).transpose()
    }

    async fn save(&self, payload: SubmissionPayload) -> Result<(), RepositoryError> {
        let columns_json = to_json("columns", &payload.columns)?;
        let cells_json = to_json("cells", &payload.cells)?;
        let product_targets_json = to_json("product_targets", &payload.product_targets)?;

        sqlx::query(
            "INSERT INTO submission (
                id,
                period,
                region,
                manager,
                status,
                regional_target,
                total_quantity,
                total_value,
                columns_json,
                cells_json,
                product_targets_json,
                visible_customers,
                generated_at
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                period = excluded.period,
                region = excluded.region,
                manager = excluded.manager,
                status = excluded.status,
                regional_target = excluded.regional_target,
                total_quantity = excluded.total_quantity,
                total_value = excluded.total_value,
                columns_json = excluded.columns_json,
                cells_json = excluded.cells_json,
                product_targets_json = excluded.product_targets_json,
                visible_customers = excluded.visible_customers,
                generated_at = excluded.generated_at",
        )
        .bind(payload.id.to_string())
        .bind(&payload.period)
        .bind(&payload.region)
        .bind(&payload.manager)
        .bind(payload.status.as_str())
        .bind(payload.regional_target.to_string())
        .bind(payload.total_quantity.to_string())
        .bind(payload.total_value.to_string())
        .bind(&columns_json)
        .bind(&cells_json)
        .bind(&product_targets_json)
        .bind(payload.visible_customers as i64)
        .bind(payload.generated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<SubmissionPayload>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT
                id,
                period,
                region,
                manager,
                status,
                regional_target,
                total_quantity,
                total_value,
                columns_json,
                cells_json,
                product_targets_json,
                visible_customers,
                generated_at
             FROM submission
             ORDER BY generated_at DESC
             LIMIT ?",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(payload_from_row).collect()
    }
}

fn payload_from_row(row: SqliteRow) -> Result<SubmissionPayload, RepositoryError> {
    let id_raw = row.try_get::<String, _>("id")?;
    let id = id_raw.parse::<Uuid>().map(SubmissionId).map_err(|error| {
        RepositoryError::Decode(format!("invalid submission id `{id_raw}` ({error})"))
    })?;

    let status_raw = row.try_get::<String, _>("status")?;
    let status = SubmissionStatus::from_label(&status_raw).ok_or_else(|| {
        RepositoryError::Decode(format!("unknown submission status `{status_raw}`"))
    })?;

    Ok(SubmissionPayload {
        id,
        period: row.try_get("period")?,
        region: row.try_get("region")?,
        manager: row.try_get("manager")?,
        status,
        columns: from_json("columns_json", row.try_get("columns_json")?)?,
        cells: from_json("cells_json", row.try_get("cells_json")?)?,
        regional_target: parse_decimal("regional_target", row.try_get("regional_target")?)?,
        product_targets: from_json("product_targets_json", row.try_get("product_targets_json")?)?,
        total_quantity: parse_decimal("total_quantity", row.try_get("total_quantity")?)?,
        total_value: parse_decimal("total_value", row.try_get("total_value")?)?,
        visible_customers: parse_count("visible_customers", row.try_get("visible_customers")?)?,
        generated_at: parse_timestamp("generated_at", row.try_get("generated_at")?)?,
    })
}

fn to_json<T: Serialize>(field: &str, value: &T) -> Result<String, RepositoryError> {
    serde_json::to_string(value)
        .map_err(|error| RepositoryError::Encode(format!("failed to encode `{field}`: {error}")))
}

fn from_json<T: DeserializeOwned>(column: &str, value: String) -> Result<T, RepositoryError> {
    serde_json::from_str(&value)
        .map_err(|error| RepositoryError::Decode(format!("invalid JSON in `{column}`: {error}")))
}

fn parse_count(column: &str, value: i64) -> Result<usize, RepositoryError> {
    usize::try_from(value).map_err(|_| {
        RepositoryError::Decode(format!(
            "invalid value for `{column}` (expected non-negative count): {value}"
        ))
    })
}

fn parse_timestamp(column: &str, value: String) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(&value).map(|timestamp| timestamp.with_timezone(&Utc)).map_err(
        |error| {
            RepositoryError::Decode(format!("invalid timestamp in `{column}`: `{value}` ({error})"))
        },
    )
}
