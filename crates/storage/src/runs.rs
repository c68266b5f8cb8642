// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `runs` table: one row per plan execution at a location (spec §3 Run,
//! §4.I `PATCH /runs/:id`).

use crate::error::{to_backend_err, StorageError};
use async_trait::async_trait;
use outpost_core::{ExecutionGroupId, NodeResult, PlanId, Run, RunId, RunStatus, TriggeredBy};
use sqlx::{postgres::PgRow, PgPool, Row};

#[derive(Debug, Clone, Default)]
pub struct RunFilter {
    pub plan_id: Option<PlanId>,
    pub limit: i64,
    pub offset: i64,
}

#[async_trait]
pub trait RunRepository: Send + Sync {
    async fn create(&self, run: &Run) -> Result<(), StorageError>;
    async fn get(&self, id: &RunId) -> Result<Run, StorageError>;
    async fn list(&self, filter: RunFilter) -> Result<Vec<Run>, StorageError>;
    /// Worker status update: status, completion timestamp, duration,
    /// success flag, accumulated errors, and per-node results.
    async fn patch(&self, id: &RunId, run: &Run) -> Result<(), StorageError>;
}

pub struct PostgresRunRepository {
    pool: PgPool,
}

impl PostgresRunRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_run(row: PgRow) -> Result<Run, StorageError> {
    let status: String = row.try_get("status").map_err(to_backend_err)?;
    let status = parse_status(&status)?;
    let triggered_by: sqlx::types::Json<TriggeredBy> =
        row.try_get("triggered_by").map_err(to_backend_err)?;
    let results: sqlx::types::Json<Vec<NodeResult>> =
        row.try_get("results").map_err(to_backend_err)?;
    let errors: sqlx::types::Json<Vec<String>> =
        row.try_get("errors").map_err(to_backend_err)?;

    Ok(Run {
        id: RunId::from_string(row.try_get::<String, _>("id").map_err(to_backend_err)?),
        plan_id: PlanId::from_string(row.try_get::<String, _>("plan_id").map_err(to_backend_err)?),
        execution_group_id: ExecutionGroupId::from_string(
            row.try_get::<String, _>("execution_group_id").map_err(to_backend_err)?,
        ),
        location: row.try_get("location").map_err(to_backend_err)?,
        environment: row.try_get("environment").map_err(to_backend_err)?,
        status,
        triggered_by: triggered_by.0,
        started_at_ms: row.try_get::<i64, _>("started_at_ms").map_err(to_backend_err)? as u64,
        completed_at_ms: row
            .try_get::<Option<i64>, _>("completed_at_ms")
            .map_err(to_backend_err)?
            .map(|v| v as u64),
        duration_ms: row
            .try_get::<Option<i64>, _>("duration_ms")
            .map_err(to_backend_err)?
            .map(|v| v as u64),
        success: row.try_get("success").map_err(to_backend_err)?,
        errors: errors.0,
        results: results.0,
    })
}

fn parse_status(s: &str) -> Result<RunStatus, StorageError> {
    Ok(match s {
        "PENDING" => RunStatus::Pending,
        "RUNNING" => RunStatus::Running,
        "COMPLETED" => RunStatus::Completed,
        "FAILED" => RunStatus::Failed,
        other => return Err(StorageError::Backend(format!("unknown run status: {other}"))),
    })
}

#[async_trait]
impl RunRepository for PostgresRunRepository {
    async fn create(&self, run: &Run) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO runs
                (id, plan_id, execution_group_id, location, environment, status, triggered_by,
                 started_at_ms, completed_at_ms, duration_ms, success, errors, results)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(run.id.as_str())
        .bind(run.plan_id.as_str())
        .bind(run.execution_group_id.as_str())
        .bind(&run.location)
        .bind(&run.environment)
        .bind(run.status.to_string())
        .bind(sqlx::types::Json(&run.triggered_by))
        .bind(run.started_at_ms as i64)
        .bind(run.completed_at_ms.map(|v| v as i64))
        .bind(run.duration_ms.map(|v| v as i64))
        .bind(run.success)
        .bind(sqlx::types::Json(&run.errors))
        .bind(sqlx::types::Json(&run.results))
        .execute(&self.pool)
        .await
        .map_err(to_backend_err)?;
        Ok(())
    }

    async fn get(&self, id: &RunId) -> Result<Run, StorageError> {
        let row = sqlx::query("SELECT * FROM runs WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(to_backend_err)?
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        row_to_run(row)
    }

    async fn list(&self, filter: RunFilter) -> Result<Vec<Run>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM runs
            WHERE ($1::text IS NULL OR plan_id = $1)
            ORDER BY started_at_ms DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(filter.plan_id.as_ref().map(|id| id.to_string()))
        .bind(filter.limit.max(1))
        .bind(filter.offset.max(0))
        .fetch_all(&self.pool)
        .await
        .map_err(to_backend_err)?;

        rows.into_iter().map(row_to_run).collect()
    }

    async fn patch(&self, id: &RunId, run: &Run) -> Result<(), StorageError> {
        let result = sqlx::query(
            r#"
            UPDATE runs SET status = $2, completed_at_ms = $3, duration_ms = $4,
                success = $5, errors = $6, results = $7
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .bind(run.status.to_string())
        .bind(run.completed_at_ms.map(|v| v as i64))
        .bind(run.duration_ms.map(|v| v as i64))
        .bind(run.success)
        .bind(sqlx::types::Json(&run.errors))
        .bind(sqlx::types::Json(&run.results))
        .execute(&self.pool)
        .await
        .map_err(to_backend_err)?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
