//! Component status store
//!
//! The server owns one store instance and passes it to handlers through
//! state. [`InMemoryComponentStore`] backs tests and single-node
//! deployments.

use crate::error::{IngestError, StoreError};
use crate::ingest::ReadingReader;
use crate::models::{MaintenanceDecision, SensorReading};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Latest known state of one component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRecord {
    pub component_id: String,
    pub vehicle_id: String,
    pub reading: SensorReading,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_decision: Option<MaintenanceDecision>,
    pub updated_at: DateTime<Utc>,
}

impl ComponentRecord {
    pub fn from_reading(reading: SensorReading) -> Self {
        Self {
            component_id: reading.component_id.clone(),
            vehicle_id: reading.vehicle_id.clone(),
            reading,
            last_decision: None,
            updated_at: Utc::now(),
        }
    }

    pub fn with_decision(mut self, decision: MaintenanceDecision) -> Self {
        self.last_decision = Some(decision);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentSummary {
    pub component_id: String,
    pub vehicle_id: String,
}

#[async_trait]
pub trait ComponentStore: Send + Sync {
    async fn component_status(&self, component_id: &str) -> Result<Option<ComponentRecord>, StoreError>;

    /// Summaries sorted by component id
    async fn list_components(&self) -> Result<Vec<ComponentSummary>, StoreError>;

    /// Insert or replace. An older reading never overwrites a newer one.
    async fn upsert(&self, record: ComponentRecord) -> Result<(), StoreError>;

    async fn len(&self) -> Result<usize, StoreError>;
}

#[derive(Clone, Default)]
pub struct InMemoryComponentStore {
    records: Arc<DashMap<String, ComponentRecord>>,
}

impl InMemoryComponentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from an NDJSON telemetry file, keeping the latest reading per
    /// component. Invalid lines abort the seed.
    pub fn seeded_from(path: &Path) -> Result<Self, IngestError> {
        let store = Self::new();
        let mut count = 0usize;
        for reading in ReadingReader::open(path)? {
            store.insert_latest(ComponentRecord::from_reading(reading?));
            count += 1;
        }
        info!(
            path = %path.display(),
            readings = count,
            components = store.records.len(),
            "Component store seeded"
        );
        Ok(store)
    }

    fn insert_latest(&self, record: ComponentRecord) {
        self.records
            .entry(record.component_id.clone())
            .and_modify(|existing| {
                if record.reading.timestamp >= existing.reading.timestamp {
                    let previous_decision = existing.last_decision.take();
                    *existing = record.clone();
                    if existing.last_decision.is_none() {
                        existing.last_decision = previous_decision;
                    }
                }
            })
            .or_insert_with(|| record.clone());
    }
}

#[async_trait]
impl ComponentStore for InMemoryComponentStore {
    async fn component_status(&self, component_id: &str) -> Result<Option<ComponentRecord>, StoreError> {
        Ok(self.records.get(component_id).map(|entry| entry.clone()))
    }

    async fn list_components(&self) -> Result<Vec<ComponentSummary>, StoreError> {
        let mut summaries: Vec<ComponentSummary> = self
            .records
            .iter()
            .map(|entry| ComponentSummary {
                component_id: entry.component_id.clone(),
                vehicle_id: entry.vehicle_id.clone(),
            })
            .collect();
        summaries.sort_by(|a, b| a.component_id.cmp(&b.component_id));
        Ok(summaries)
    }

    async fn upsert(&self, record: ComponentRecord) -> Result<(), StoreError> {
        debug!(component_id = %record.component_id, "Component record upserted");
        self.insert_latest(record);
        Ok(())
    }

    async fn len(&self) -> Result<usize, StoreError> {
        Ok(self.records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::write_ndjson;
    use crate::models::fixtures::reading;
    use crate::models::{DecisionRule, MaintenanceAction, Probability};
    use chrono::Duration;
    use tempfile::TempDir;

    fn reading_for(id: &str, minutes: i64) -> SensorReading {
        let mut r = reading("OK", "OK", "OK");
        r.component_id = id.to_string();
        r.timestamp += Duration::minutes(minutes);
        r
    }

    fn decision(id: &str) -> MaintenanceDecision {
        MaintenanceDecision {
            component_id: id.to_string(),
            vehicle_id: "VH-4821".to_string(),
            failure_probability: Probability::new(0.7).unwrap(),
            action: MaintenanceAction::FixNow,
            rule: DecisionRule::ExpectedCostAndThreshold,
            expected_failure_cost: 3500.0,
            explanation: "test".to_string(),
        }
    }

    #[tokio::test]
    async fn test_unknown_component_is_none() {
        let store = InMemoryComponentStore::new();
        assert!(store.component_status("missing").await.unwrap().is_none());
        assert!(store.list_components().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_keeps_latest_reading() {
        let store = InMemoryComponentStore::new();
        store.upsert(ComponentRecord::from_reading(reading_for("c1", 10))).await.unwrap();
        store.upsert(ComponentRecord::from_reading(reading_for("c1", 0))).await.unwrap();

        let record = store.component_status("c1").await.unwrap().unwrap();
        assert_eq!(record.reading.timestamp, reading_for("c1", 10).timestamp);
        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_newer_reading_keeps_previous_decision() {
        let store = InMemoryComponentStore::new();
        store
            .upsert(ComponentRecord::from_reading(reading_for("c1", 0)).with_decision(decision("c1")))
            .await
            .unwrap();
        store.upsert(ComponentRecord::from_reading(reading_for("c1", 5))).await.unwrap();

        let record = store.component_status("c1").await.unwrap().unwrap();
        assert_eq!(record.last_decision, Some(decision("c1")));
        assert_eq!(record.reading.timestamp, reading_for("c1", 5).timestamp);
    }

    #[tokio::test]
    async fn test_list_is_sorted() {
        let store = InMemoryComponentStore::new();
        for id in ["c3", "c1", "c2"] {
            store.upsert(ComponentRecord::from_reading(reading_for(id, 0))).await.unwrap();
        }
        let ids: Vec<_> = store
            .list_components()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.component_id)
            .collect();
        assert_eq!(ids, ["c1", "c2", "c3"]);
    }

    #[tokio::test]
    async fn test_seed_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("telemetry.jsonl");
        write_ndjson(&path, &[reading_for("a", 0), reading_for("b", 0), reading_for("a", 30)]).unwrap();

        let store = InMemoryComponentStore::seeded_from(&path).unwrap();
        assert_eq!(store.len().await.unwrap(), 2);
        let a = store.component_status("a").await.unwrap().unwrap();
        assert_eq!(a.reading.timestamp, reading_for("a", 30).timestamp);
    }
}
