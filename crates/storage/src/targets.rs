// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `targets` table: one row per `(organization, environment)`, storing the
//! `$variable` base-URL map the execution engine resolves against (spec §3
//! Target Config, §4.I).

use crate::error::{to_backend_err, StorageError};
use async_trait::async_trait;
use outpost_core::{TargetConfig, TargetEntry, TargetScope};
use sqlx::{postgres::PgRow, PgPool, Row};
use std::collections::HashMap;

#[async_trait]
pub trait TargetConfigRepository: Send + Sync {
    async fn get(&self, scope: &TargetScope) -> Result<TargetConfig, StorageError>;
    async fn upsert(&self, config: &TargetConfig) -> Result<(), StorageError>;
}

pub struct PostgresTargetConfigRepository {
    pool: PgPool,
}

impl PostgresTargetConfigRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_config(row: PgRow) -> Result<TargetConfig, StorageError> {
    let organization: String = row.try_get("organization").map_err(to_backend_err)?;
    let environment: String = row.try_get("environment").map_err(to_backend_err)?;
    let targets: sqlx::types::Json<HashMap<String, TargetEntry>> =
        row.try_get("targets").map_err(to_backend_err)?;
    Ok(TargetConfig { scope: TargetScope::new(organization, environment), targets: targets.0 })
}

#[async_trait]
impl TargetConfigRepository for PostgresTargetConfigRepository {
    async fn get(&self, scope: &TargetScope) -> Result<TargetConfig, StorageError> {
        let row = sqlx::query("SELECT * FROM targets WHERE organization = $1 AND environment = $2")
            .bind(&scope.organization)
            .bind(&scope.environment)
            .fetch_optional(&self.pool)
            .await
            .map_err(to_backend_err)?;
        match row {
            Some(row) => row_to_config(row),
            None => Ok(TargetConfig::new(scope.clone())),
        }
    }

    async fn upsert(&self, config: &TargetConfig) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO targets (organization, environment, targets)
            VALUES ($1, $2, $3)
            ON CONFLICT (organization, environment) DO UPDATE SET targets = EXCLUDED.targets
            "#,
        )
        .bind(&config.scope.organization)
        .bind(&config.scope.environment)
        .bind(sqlx::types::Json(&config.targets))
        .execute(&self.pool)
        .await
        .map_err(to_backend_err)?;
        Ok(())
    }
}
