use std::path::Path;

use async_trait::async_trait;
use cadence_engine::{
    Entity, Policy, ScheduleAssignment, ShiftRecord, StaticProfile, TimestampedRecord,
};

use crate::error::SourceError;
use crate::record::SnapshotDocument;
use crate::traits::RecordSource;

/// A record source backed by one exported JSON snapshot.
///
/// The document is converted into engine types once, at load time; every
/// fetch afterwards clones the converted collections.
#[derive(Debug, Clone, Default)]
pub struct SnapshotSource {
    entities: Vec<Entity>,
    sales: Vec<TimestampedRecord>,
    shifts: Vec<ShiftRecord>,
    policies: Vec<Policy>,
    assignments: Vec<ScheduleAssignment>,
    profiles: Vec<StaticProfile>,
}

impl SnapshotSource {
    /// Create a `SnapshotSource` with no records.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_document(document: SnapshotDocument) -> Self {
        let source = SnapshotSource {
            entities: document
                .entities
                .into_iter()
                .map(|e| e.into_entity())
                .collect(),
            sales: document
                .sales
                .into_iter()
                .map(|s| s.into_record())
                .collect(),
            shifts: document
                .shifts
                .into_iter()
                .map(|s| s.into_shift())
                .collect(),
            policies: document
                .policies
                .into_iter()
                .map(|p| p.into_policy())
                .collect(),
            assignments: document
                .assignments
                .into_iter()
                .filter_map(|a| a.into_assignment())
                .collect(),
            profiles: document
                .profiles
                .into_iter()
                .map(|p| p.into_profile())
                .collect(),
        };
        tracing::debug!(
            entities = source.entities.len(),
            sales = source.sales.len(),
            shifts = source.shifts.len(),
            policies = source.policies.len(),
            assignments = source.assignments.len(),
            profiles = source.profiles.len(),
            "snapshot loaded"
        );
        source
    }

    /// Parse a snapshot document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, SourceError> {
        let document: SnapshotDocument = serde_json::from_str(json)?;
        Ok(Self::from_document(document))
    }

    /// Read and parse a snapshot document from disk.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| SourceError::Io {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_json(&contents)
    }
}

#[async_trait]
impl RecordSource for SnapshotSource {
    async fn entity(&self, entity_id: &str) -> Result<Entity, SourceError> {
        self.entities
            .iter()
            .find(|e| e.id == entity_id)
            .cloned()
            .ok_or_else(|| SourceError::EntityNotFound {
                entity_id: entity_id.to_string(),
            })
    }

    async fn entities(&self) -> Result<Vec<Entity>, SourceError> {
        Ok(self.entities.clone())
    }

    async fn sales(&self) -> Result<Vec<TimestampedRecord>, SourceError> {
        Ok(self.sales.clone())
    }

    async fn shifts(&self) -> Result<Vec<ShiftRecord>, SourceError> {
        Ok(self.shifts.clone())
    }

    async fn policies(&self) -> Result<Vec<Policy>, SourceError> {
        Ok(self.policies.clone())
    }

    async fn assignments(&self) -> Result<Vec<ScheduleAssignment>, SourceError> {
        Ok(self.assignments.clone())
    }

    async fn profiles(&self) -> Result<Vec<StaticProfile>, SourceError> {
        Ok(self.profiles.clone())
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
