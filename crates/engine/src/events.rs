// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run/node lifecycle events, fanned out to live subscribers and,
//! optionally, a durable sink (spec §1 "no stream processing beyond an
//! optional durable event bus").

use async_trait::async_trait;
use outpost_core::{NodeResultStatus, PlanId, RunId, RunStatus};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::broadcast;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EngineEvent {
    RunStarted { run_id: RunId, plan_id: PlanId },
    NodeStarted { run_id: RunId, node_id: String },
    NodeCompleted { run_id: RunId, node_id: String, status: NodeResultStatus },
    RunCompleted { run_id: RunId, status: RunStatus },
}

#[async_trait]
pub trait EventEmitter: Send + Sync {
    async fn emit(&self, event: EngineEvent);
}

/// Live fan-out only; subscribers that aren't listening lose events.
pub struct BroadcastEmitter {
    sender: broadcast::Sender<EngineEvent>,
}

impl BroadcastEmitter {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl EventEmitter for BroadcastEmitter {
    async fn emit(&self, event: EngineEvent) {
        // No active subscribers is not an error; it just means no one's watching.
        let _ = self.sender.send(event);
    }
}

#[derive(Debug, Error)]
pub enum DurableEventError {
    #[error("durable event sink error: {0}")]
    Sink(String),
}

#[async_trait]
pub trait DurableEventSink: Send + Sync {
    async fn append(&self, event: &EngineEvent) -> Result<(), DurableEventError>;
}

/// Wraps a [`BroadcastEmitter`] with a durable append; sink failures are
/// logged but never block the run.
pub struct DurableEmitter<S: DurableEventSink> {
    broadcast: BroadcastEmitter,
    sink: S,
}

impl<S: DurableEventSink> DurableEmitter<S> {
    pub fn new(sink: S, capacity: usize) -> Self {
        Self { broadcast: BroadcastEmitter::new(capacity), sink }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.broadcast.subscribe()
    }
}

#[async_trait]
impl<S: DurableEventSink> EventEmitter for DurableEmitter<S> {
    async fn emit(&self, event: EngineEvent) {
        if let Err(e) = self.sink.append(&event).await {
            tracing::warn!(error = %e, "failed to persist engine event");
        }
        self.broadcast.emit(event).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingSink;

    #[async_trait]
    impl DurableEventSink for FailingSink {
        async fn append(&self, _event: &EngineEvent) -> Result<(), DurableEventError> {
            Err(DurableEventError::Sink("disk full".into()))
        }
    }

    #[tokio::test]
    async fn broadcast_emitter_delivers_to_subscribers() {
        let emitter = BroadcastEmitter::new(8);
        let mut rx = emitter.subscribe();
        emitter
            .emit(EngineEvent::RunStarted { run_id: RunId::new(), plan_id: PlanId::new() })
            .await;
        assert!(matches!(rx.recv().await.unwrap(), EngineEvent::RunStarted { .. }));
    }

    #[tokio::test]
    async fn durable_emitter_still_broadcasts_when_sink_fails() {
        let emitter = DurableEmitter::new(FailingSink, 8);
        let mut rx = emitter.subscribe();
        emitter
            .emit(EngineEvent::RunStarted { run_id: RunId::new(), plan_id: PlanId::new() })
            .await;
        assert!(matches!(rx.recv().await.unwrap(), EngineEvent::RunStarted { .. }));
    }
}
