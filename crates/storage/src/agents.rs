// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `agents` table: durable agent registrations, so the hub's registered
//! location set survives a restart (spec §3 Agent, §4.G).

use crate::error::{to_backend_err, StorageError};
use async_trait::async_trait;
use outpost_core::{Agent, AgentId, AgentStatus};
use sqlx::{postgres::PgRow, PgPool, Row};

#[derive(Debug, Clone, Default)]
pub struct AgentFilter {
    pub location: Option<String>,
    pub status: Option<AgentStatus>,
}

#[async_trait]
pub trait AgentRepository: Send + Sync {
    async fn upsert(&self, agent: &Agent) -> Result<(), StorageError>;
    async fn get(&self, id: &AgentId) -> Result<Agent, StorageError>;
    async fn delete(&self, id: &AgentId) -> Result<(), StorageError>;
    async fn list(&self, filter: AgentFilter) -> Result<Vec<Agent>, StorageError>;
    /// Distinct locations across `ONLINE` agents.
    async fn registered_locations(&self) -> Result<Vec<String>, StorageError>;
    /// Marks every `ONLINE` agent whose heartbeat predates the threshold as
    /// `STALE`; returns the number of rows flipped.
    async fn sweep_stale(&self, now_ms: u64, staleness_threshold_ms: u64) -> Result<usize, StorageError>;
}

pub struct PostgresAgentRepository {
    pool: PgPool,
}

impl PostgresAgentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_agent(row: PgRow) -> Result<Agent, StorageError> {
    let status: String = row.try_get("status").map_err(to_backend_err)?;
    let status = match status.as_str() {
        "ONLINE" => AgentStatus::Online,
        "STALE" => AgentStatus::Stale,
        "DEREGISTERED" => AgentStatus::Deregistered,
        other => return Err(StorageError::Backend(format!("unknown agent status: {other}"))),
    };
    Ok(Agent {
        id: AgentId::from_string(row.try_get::<String, _>("id").map_err(to_backend_err)?),
        name: row.try_get("name").map_err(to_backend_err)?,
        location: row.try_get("location").map_err(to_backend_err)?,
        status,
        registered_at_ms: row.try_get::<i64, _>("registered_at_ms").map_err(to_backend_err)? as u64,
        last_heartbeat_at_ms: row
            .try_get::<i64, _>("last_heartbeat_at_ms")
            .map_err(to_backend_err)? as u64,
        version: row.try_get("version").map_err(to_backend_err)?,
    })
}

#[async_trait]
impl AgentRepository for PostgresAgentRepository {
    async fn upsert(&self, agent: &Agent) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO agents
                (id, name, location, status, registered_at_ms, last_heartbeat_at_ms, version)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                location = EXCLUDED.location,
                status = EXCLUDED.status,
                last_heartbeat_at_ms = EXCLUDED.last_heartbeat_at_ms,
                version = EXCLUDED.version
            "#,
        )
        .bind(agent.id.as_str())
        .bind(&agent.name)
        .bind(&agent.location)
        .bind(agent.status.to_string())
        .bind(agent.registered_at_ms as i64)
        .bind(agent.last_heartbeat_at_ms as i64)
        .bind(&agent.version)
        .execute(&self.pool)
        .await
        .map_err(to_backend_err)?;
        Ok(())
    }

    async fn get(&self, id: &AgentId) -> Result<Agent, StorageError> {
        let row = sqlx::query("SELECT * FROM agents WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(to_backend_err)?
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        row_to_agent(row)
    }

    async fn delete(&self, id: &AgentId) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM agents WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(to_backend_err)?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn list(&self, filter: AgentFilter) -> Result<Vec<Agent>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM agents
            WHERE ($1::text IS NULL OR location = $1)
              AND ($2::text IS NULL OR status = $2)
            ORDER BY name ASC
            "#,
        )
        .bind(filter.location)
        .bind(filter.status.map(|s| s.to_string()))
        .fetch_all(&self.pool)
        .await
        .map_err(to_backend_err)?;

        rows.into_iter().map(row_to_agent).collect()
    }

    async fn registered_locations(&self) -> Result<Vec<String>, StorageError> {
        let rows = sqlx::query(
            "SELECT DISTINCT location FROM agents WHERE status = 'ONLINE' ORDER BY location",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(to_backend_err)?;
        rows.into_iter()
            .map(|row| row.try_get::<String, _>("location").map_err(to_backend_err))
            .collect()
    }

    async fn sweep_stale(&self, now_ms: u64, staleness_threshold_ms: u64) -> Result<usize, StorageError> {
        let cutoff = (now_ms as i64).saturating_sub(staleness_threshold_ms as i64);
        let result = sqlx::query(
            "UPDATE agents SET status = 'STALE' WHERE status = 'ONLINE' AND last_heartbeat_at_ms < $1",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(to_backend_err)?;
        Ok(result.rows_affected() as usize)
    }
}
