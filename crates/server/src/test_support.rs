// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory fakes for the storage traits, used only by this crate's route
//! tests. Mirrors the fakes `outpost-reconciler` keeps next to its own
//! tests rather than spinning up Postgres.

use async_trait::async_trait;
use outpost_core::{Plan, PlanId, Run, RunId, TargetConfig, TargetScope};
use outpost_storage::{
    PlanFilter, PlanRepository, RunFilter, RunRepository, StorageError, TargetConfigRepository,
};
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Default)]
pub struct FakePlanRepository {
    plans: Mutex<HashMap<PlanId, Plan>>,
}

#[async_trait]
impl PlanRepository for FakePlanRepository {
    async fn create(&self, plan: &Plan) -> Result<Plan, StorageError> {
        let mut created = plan.clone();
        created.id = Some(PlanId::new());
        self.plans.lock().insert(created.id.unwrap(), created.clone());
        Ok(created)
    }

    async fn update(&self, id: &PlanId, plan: &Plan) -> Result<Plan, StorageError> {
        let mut plans = self.plans.lock();
        if !plans.contains_key(id) {
            return Err(StorageError::NotFound(id.to_string()));
        }
        let mut updated = plan.clone();
        updated.id = Some(*id);
        plans.insert(*id, updated.clone());
        Ok(updated)
    }

    async fn delete(&self, id: &PlanId) -> Result<(), StorageError> {
        self.plans
            .lock()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    async fn get(&self, id: &PlanId) -> Result<Plan, StorageError> {
        self.plans.lock().get(id).cloned().ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    async fn get_by_name(
        &self,
        organization: &str,
        project: &str,
        environment: &str,
        name: &str,
    ) -> Result<Plan, StorageError> {
        self.plans
            .lock()
            .values()
            .find(|p| {
                p.organization == organization
                    && p.project == project
                    && p.environment == environment
                    && p.name == name
            })
            .cloned()
            .ok_or_else(|| StorageError::NotFound(name.to_string()))
    }

    async fn list(&self, filter: PlanFilter) -> Result<Vec<Plan>, StorageError> {
        let plans = self.plans.lock();
        let mut matching: Vec<Plan> = plans
            .values()
            .filter(|p| filter.project.as_deref().map_or(true, |v| p.project == v))
            .filter(|p| filter.environment.as_deref().map_or(true, |v| p.environment == v))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(matching)
    }
}

#[derive(Default)]
pub struct FakeRunRepository {
    runs: Mutex<HashMap<RunId, Run>>,
}

#[async_trait]
impl RunRepository for FakeRunRepository {
    async fn create(&self, run: &Run) -> Result<(), StorageError> {
        self.runs.lock().insert(run.id, run.clone());
        Ok(())
    }

    async fn get(&self, id: &RunId) -> Result<Run, StorageError> {
        self.runs.lock().get(id).cloned().ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    async fn list(&self, filter: RunFilter) -> Result<Vec<Run>, StorageError> {
        let runs = self.runs.lock();
        let mut matching: Vec<Run> = runs
            .values()
            .filter(|r| filter.plan_id.map_or(true, |id| r.plan_id == id))
            .cloned()
            .collect();
        matching.sort_by_key(|r| r.started_at_ms);
        Ok(matching)
    }

    async fn patch(&self, id: &RunId, run: &Run) -> Result<(), StorageError> {
        let mut runs = self.runs.lock();
        let existing = runs.get_mut(id).ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        *existing = run.clone();
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeTargetConfigRepository {
    configs: Mutex<HashMap<(String, String), TargetConfig>>,
}

#[async_trait]
impl TargetConfigRepository for FakeTargetConfigRepository {
    async fn get(&self, scope: &TargetScope) -> Result<TargetConfig, StorageError> {
        let key = (scope.organization.clone(), scope.environment.clone());
        Ok(self.configs.lock().get(&key).cloned().unwrap_or_else(|| TargetConfig::new(scope.clone())))
    }

    async fn upsert(&self, config: &TargetConfig) -> Result<(), StorageError> {
        let key = (config.scope.organization.clone(), config.scope.environment.clone());
        self.configs.lock().insert(key, config.clone());
        Ok(())
    }
}
