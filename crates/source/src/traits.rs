use async_trait::async_trait;

use cadence_engine::{
    Entity, Policy, ScheduleAssignment, ShiftRecord, StaticProfile, TimestampedRecord,
};

use crate::error::SourceError;

/// Read-only access to the record store that feeds the derivation engine.
///
/// Implementations fetch raw records (over the network, from a database,
/// from an exported snapshot) and hand them over already converted into
/// engine types. Fetching may be slow, paginated, or retried; everything
/// downstream of a `RecordSource` is pure computation over the returned
/// collections.
///
/// ## Ordering
///
/// Collections are returned in store order. The engine sorts what it needs
/// to sort (status logs, assignment dates) and relies on input order only
/// for tie-breaks.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync` so one source can serve several
/// concurrent derivations.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch one entity with its status log.
    ///
    /// Returns `Err(SourceError::EntityNotFound)` if no such entity exists.
    async fn entity(&self, entity_id: &str) -> Result<Entity, SourceError>;

    /// Fetch every entity.
    async fn entities(&self) -> Result<Vec<Entity>, SourceError>;

    /// Fetch sales (payments) as timestamped records.
    async fn sales(&self) -> Result<Vec<TimestampedRecord>, SourceError>;

    /// Fetch shift clock-ins.
    async fn shifts(&self) -> Result<Vec<ShiftRecord>, SourceError>;

    /// Fetch punctuality policies.
    async fn policies(&self) -> Result<Vec<Policy>, SourceError>;

    /// Fetch schedule assignments.
    async fn assignments(&self) -> Result<Vec<ScheduleAssignment>, SourceError>;

    /// Fetch static profiles.
    async fn profiles(&self) -> Result<Vec<StaticProfile>, SourceError>;
}
