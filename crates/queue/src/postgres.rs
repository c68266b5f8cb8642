// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Postgres-backed job queue: `jobs` table, `SELECT ... FOR UPDATE SKIP
//! LOCKED` to let many worker processes race for the same partition safely
//! (spec §4.D, §8.6).

use crate::queue_trait::{JobQueue, QueueError};
use async_trait::async_trait;
use outpost_core::{JobId, JobPayload, JobStatus, QueueJob};
use sqlx::{postgres::PgRow, PgPool, Row};

pub struct PostgresJobQueue {
    pool: PgPool,
}

impl PostgresJobQueue {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_job(row: PgRow) -> Result<QueueJob, QueueError> {
    let payload: sqlx::types::Json<JobPayload> =
        row.try_get("payload").map_err(|e| QueueError::Backend(e.to_string()))?;
    let status: String = row.try_get("status").map_err(|e| QueueError::Backend(e.to_string()))?;
    let status = match status.as_str() {
        "PENDING" => JobStatus::Pending,
        "RUNNING" => JobStatus::Running,
        "COMPLETED" => JobStatus::Completed,
        "FAILED" => JobStatus::Failed,
        "RETRYING" => JobStatus::Retrying,
        other => return Err(QueueError::Backend(format!("unknown job status: {other}"))),
    };

    Ok(QueueJob {
        id: JobId::from_string(row.try_get::<String, _>("id").map_err(to_backend_err)?),
        queue_name: row.try_get("queue_name").map_err(to_backend_err)?,
        location: row.try_get("location").map_err(to_backend_err)?,
        payload: payload.0,
        status,
        attempts: row.try_get::<i32, _>("attempts").map_err(to_backend_err)? as u32,
        max_attempts: row.try_get::<i32, _>("max_attempts").map_err(to_backend_err)? as u32,
        priority: row.try_get("priority").map_err(to_backend_err)?,
        scheduled_for_ms: row.try_get::<i64, _>("scheduled_for_ms").map_err(to_backend_err)? as u64,
        created_at_ms: row.try_get::<i64, _>("created_at_ms").map_err(to_backend_err)? as u64,
        locked_until_ms: row
            .try_get::<Option<i64>, _>("locked_until_ms")
            .map_err(to_backend_err)?
            .map(|v| v as u64),
        last_error: row.try_get("last_error").map_err(to_backend_err)?,
    })
}

fn to_backend_err(e: sqlx::Error) -> QueueError {
    QueueError::Backend(e.to_string())
}

#[async_trait]
impl JobQueue for PostgresJobQueue {
    async fn push(&self, job: QueueJob) -> Result<(), QueueError> {
        let status = job.status.to_string();
        sqlx::query(
            r#"
            INSERT INTO jobs
                (id, queue_name, location, payload, status, attempts, max_attempts,
                 priority, scheduled_for_ms, created_at_ms, locked_until_ms, last_error)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(job.id.as_str())
        .bind(&job.queue_name)
        .bind(&job.location)
        .bind(sqlx::types::Json(&job.payload))
        .bind(status)
        .bind(job.attempts as i32)
        .bind(job.max_attempts as i32)
        .bind(job.priority)
        .bind(job.scheduled_for_ms as i64)
        .bind(job.created_at_ms as i64)
        .bind(job.locked_until_ms.map(|v| v as i64))
        .bind(&job.last_error)
        .execute(&self.pool)
        .await
        .map_err(to_backend_err)?;
        Ok(())
    }

    async fn dequeue(
        &self,
        queue_name: &str,
        location: &str,
        now_ms: u64,
        visibility_timeout_ms: u64,
    ) -> Result<Option<QueueJob>, QueueError> {
        let mut tx = self.pool.begin().await.map_err(to_backend_err)?;

        let row = sqlx::query(
            r#"
            SELECT * FROM jobs
            WHERE queue_name = $1 AND location = $2 AND status IN ('PENDING', 'RETRYING')
              AND scheduled_for_ms <= $3
            ORDER BY priority DESC, scheduled_for_ms ASC, created_at_ms ASC
            FOR UPDATE SKIP LOCKED
            LIMIT 1
            "#,
        )
        .bind(queue_name)
        .bind(location)
        .bind(now_ms as i64)
        .fetch_optional(&mut *tx)
        .await
        .map_err(to_backend_err)?;

        let Some(row) = row else {
            tx.commit().await.map_err(to_backend_err)?;
            return Ok(None);
        };

        let mut job = row_to_job(row)?;
        job.status = JobStatus::Running;
        job.attempts += 1;
        job.locked_until_ms = Some(now_ms + visibility_timeout_ms);

        sqlx::query(
            r#"
            UPDATE jobs SET status = 'RUNNING', attempts = $2, locked_until_ms = $3
            WHERE id = $1
            "#,
        )
        .bind(job.id.as_str())
        .bind(job.attempts as i32)
        .bind(job.locked_until_ms.map(|v| v as i64))
        .execute(&mut *tx)
        .await
        .map_err(to_backend_err)?;

        tx.commit().await.map_err(to_backend_err)?;
        Ok(Some(job))
    }

    async fn ack(&self, job_id: &JobId) -> Result<(), QueueError> {
        let result = sqlx::query(
            "UPDATE jobs SET status = 'COMPLETED', locked_until_ms = NULL WHERE id = $1",
        )
        .bind(job_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(to_backend_err)?;
        if result.rows_affected() == 0 {
            return Err(QueueError::NotFound(job_id.to_string()));
        }
        Ok(())
    }

    async fn fail(&self, job_id: &JobId, now_ms: u64, error: String) -> Result<(), QueueError> {
        let row = sqlx::query("SELECT attempts, max_attempts FROM jobs WHERE id = $1")
            .bind(job_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(to_backend_err)?
            .ok_or_else(|| QueueError::NotFound(job_id.to_string()))?;

        let attempts: i32 = row.try_get("attempts").map_err(to_backend_err)?;
        let max_attempts: i32 = row.try_get("max_attempts").map_err(to_backend_err)?;

        if attempts >= max_attempts {
            sqlx::query(
                "UPDATE jobs SET status = 'FAILED', locked_until_ms = NULL, last_error = $2 WHERE id = $1",
            )
            .bind(job_id.as_str())
            .bind(&error)
            .execute(&self.pool)
            .await
            .map_err(to_backend_err)?;
        } else {
            let scheduled_for_ms =
                now_ms + QueueJob::backoff_seconds(attempts as u32) * 1_000;
            sqlx::query(
                r#"
                UPDATE jobs SET status = 'RETRYING', locked_until_ms = NULL,
                    last_error = $2, scheduled_for_ms = $3
                WHERE id = $1
                "#,
            )
            .bind(job_id.as_str())
            .bind(&error)
            .bind(scheduled_for_ms as i64)
            .execute(&self.pool)
            .await
            .map_err(to_backend_err)?;
        }
        Ok(())
    }

    async fn release_expired(&self, now_ms: u64) -> Result<usize, QueueError> {
        let result = sqlx::query(
            r#"
            UPDATE jobs SET status = 'PENDING', locked_until_ms = NULL
            WHERE status = 'RUNNING' AND locked_until_ms <= $1
            "#,
        )
        .bind(now_ms as i64)
        .execute(&self.pool)
        .await
        .map_err(to_backend_err)?;
        Ok(result.rows_affected() as usize)
    }
}
