//! Workflow store
//!
//! Keyed in-memory store of workflow instances. Each record sits behind its
//! own lock so concurrent workflows never serialize against each other; the
//! sharded map handles key-level access. Retention is capped: when full,
//! the oldest terminal record is evicted on insert, running workflows are
//! never evicted.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::error::{ConductorError, Result};
use crate::workflow::model::Workflow;

pub struct WorkflowStore {
    records: DashMap<String, Arc<RwLock<Workflow>>>,
    /// Insertion order, oldest first; drives eviction
    order: Mutex<Vec<String>>,
    max_retained: usize,
}

impl WorkflowStore {
    pub fn new(max_retained: usize) -> Self {
        Self {
            records: DashMap::new(),
            order: Mutex::new(Vec::new()),
            max_retained: max_retained.max(1),
        }
    }

    pub async fn create(&self, workflow: Workflow) -> Result<()> {
        let id = workflow.workflow_id.clone();

        // The order lock serializes inserts, so the duplicate check and the
        // insert are one atomic step
        let mut order = self.order.lock().await;
        if self.records.contains_key(&id) {
            return Err(ConductorError::DuplicateWorkflow(id));
        }
        if order.len() >= self.max_retained {
            self.evict_oldest_terminal(&mut order).await;
        }
        self.records.insert(id.clone(), Arc::new(RwLock::new(workflow)));
        order.push(id);
        Ok(())
    }

    pub async fn get(&self, workflow_id: &str) -> Result<Workflow> {
        let record = self
            .records
            .get(workflow_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| ConductorError::WorkflowNotFound(workflow_id.to_string()))?;
        let guard = record.read().await;
        Ok(guard.clone())
    }

    /// Apply a mutation under the record's exclusive lock and return the
    /// updated snapshot.
    pub async fn update<F>(&self, workflow_id: &str, mutate: F) -> Result<Workflow>
    where
        F: FnOnce(&mut Workflow),
    {
        let record = self
            .records
            .get(workflow_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| ConductorError::WorkflowNotFound(workflow_id.to_string()))?;
        let mut guard = record.write().await;
        mutate(&mut guard);
        Ok(guard.clone())
    }

    /// Snapshot of all retained workflows in insertion order
    pub async fn list_all(&self) -> Vec<Workflow> {
        let order = self.order.lock().await;
        let mut out = Vec::with_capacity(order.len());
        for id in order.iter() {
            if let Some(record) = self.records.get(id).map(|e| Arc::clone(e.value())) {
                out.push(record.read().await.clone());
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    async fn evict_oldest_terminal(&self, order: &mut Vec<String>) {
        let mut evict_at = None;
        for (idx, id) in order.iter().enumerate() {
            let Some(record) = self.records.get(id).map(|e| Arc::clone(e.value())) else {
                evict_at = Some(idx);
                break;
            };
            if record.read().await.status.is_terminal() {
                evict_at = Some(idx);
                break;
            }
        }
        if let Some(idx) = evict_at {
            let id = order.remove(idx);
            self.records.remove(&id);
            debug!("Evicted workflow {} from store", id);
        }
    }
}
