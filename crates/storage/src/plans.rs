// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `plans` table: the canonical plan document store (spec §3 Plan, §4.I).
//! Follows the raw-`sqlx::query` + manual row mapping style established in
//! `outpost_queue::postgres` — no compile-time `query!` macro, since there
//! is no reachable database to check it against at build time.

use crate::error::{to_backend_err, StorageError};
use async_trait::async_trait;
use outpost_core::{Edge, Frequency, Node, Plan, PlanId};
use sqlx::{postgres::PgRow, PgPool, Row};

#[derive(Debug, Clone, Default)]
pub struct PlanFilter {
    pub project: Option<String>,
    pub environment: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

#[async_trait]
pub trait PlanRepository: Send + Sync {
    /// Assigns a new `PlanId` and persists the document.
    async fn create(&self, plan: &Plan) -> Result<Plan, StorageError>;
    /// Replaces the document at `id`, keeping `organization` fixed.
    async fn update(&self, id: &PlanId, plan: &Plan) -> Result<Plan, StorageError>;
    async fn delete(&self, id: &PlanId) -> Result<(), StorageError>;
    async fn get(&self, id: &PlanId) -> Result<Plan, StorageError>;
    async fn get_by_name(
        &self,
        organization: &str,
        project: &str,
        environment: &str,
        name: &str,
    ) -> Result<Plan, StorageError>;
    async fn list(&self, filter: PlanFilter) -> Result<Vec<Plan>, StorageError>;
}

pub struct PostgresPlanRepository {
    pool: PgPool,
}

impl PostgresPlanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_plan(row: PgRow) -> Result<Plan, StorageError> {
    let frequency: Option<sqlx::types::Json<Frequency>> =
        row.try_get("frequency").map_err(to_backend_err)?;
    let locations: sqlx::types::Json<Vec<String>> =
        row.try_get("locations").map_err(to_backend_err)?;
    let nodes: sqlx::types::Json<Vec<Node>> = row.try_get("nodes").map_err(to_backend_err)?;
    let edges: sqlx::types::Json<Vec<Edge>> = row.try_get("edges").map_err(to_backend_err)?;

    Ok(Plan {
        id: Some(PlanId::from_string(row.try_get::<String, _>("id").map_err(to_backend_err)?)),
        organization: row.try_get("organization").map_err(to_backend_err)?,
        project: row.try_get("project").map_err(to_backend_err)?,
        environment: row.try_get("environment").map_err(to_backend_err)?,
        name: row.try_get("name").map_err(to_backend_err)?,
        version: row.try_get("version").map_err(to_backend_err)?,
        frequency: frequency.map(|j| j.0),
        locations: locations.0,
        nodes: nodes.0,
        edges: edges.0,
    })
}

#[async_trait]
impl PlanRepository for PostgresPlanRepository {
    async fn create(&self, plan: &Plan) -> Result<Plan, StorageError> {
        let id = PlanId::new();
        sqlx::query(
            r#"
            INSERT INTO plans
                (id, organization, project, environment, name, version,
                 frequency, locations, nodes, edges)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(id.as_str())
        .bind(&plan.organization)
        .bind(&plan.project)
        .bind(&plan.environment)
        .bind(&plan.name)
        .bind(&plan.version)
        .bind(plan.frequency.map(sqlx::types::Json))
        .bind(sqlx::types::Json(&plan.locations))
        .bind(sqlx::types::Json(&plan.nodes))
        .bind(sqlx::types::Json(&plan.edges))
        .execute(&self.pool)
        .await
        .map_err(to_backend_err)?;

        let mut created = plan.clone();
        created.id = Some(id);
        Ok(created)
    }

    async fn update(&self, id: &PlanId, plan: &Plan) -> Result<Plan, StorageError> {
        let result = sqlx::query(
            r#"
            UPDATE plans SET
                project = $2, environment = $3, name = $4, version = $5,
                frequency = $6, locations = $7, nodes = $8, edges = $9
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .bind(&plan.project)
        .bind(&plan.environment)
        .bind(&plan.name)
        .bind(&plan.version)
        .bind(plan.frequency.map(sqlx::types::Json))
        .bind(sqlx::types::Json(&plan.locations))
        .bind(sqlx::types::Json(&plan.nodes))
        .bind(sqlx::types::Json(&plan.edges))
        .execute(&self.pool)
        .await
        .map_err(to_backend_err)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(id.to_string()));
        }
        self.get(id).await
    }

    async fn delete(&self, id: &PlanId) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM plans WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(to_backend_err)?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn get(&self, id: &PlanId) -> Result<Plan, StorageError> {
        let row = sqlx::query("SELECT * FROM plans WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(to_backend_err)?
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        row_to_plan(row)
    }

    async fn get_by_name(
        &self,
        organization: &str,
        project: &str,
        environment: &str,
        name: &str,
    ) -> Result<Plan, StorageError> {
        let row = sqlx::query(
            "SELECT * FROM plans WHERE organization = $1 AND project = $2 \
             AND environment = $3 AND name = $4",
        )
        .bind(organization)
        .bind(project)
        .bind(environment)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(to_backend_err)?
        .ok_or_else(|| StorageError::NotFound(name.to_string()))?;
        row_to_plan(row)
    }

    async fn list(&self, filter: PlanFilter) -> Result<Vec<Plan>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM plans
            WHERE ($1::text IS NULL OR project = $1)
              AND ($2::text IS NULL OR environment = $2)
            ORDER BY created_at_ms ASC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(filter.project)
        .bind(filter.environment)
        .bind(filter.limit.max(1))
        .bind(filter.offset.max(0))
        .fetch_all(&self.pool)
        .await
        .map_err(to_backend_err)?;

        rows.into_iter().map(row_to_plan).collect()
    }
}
