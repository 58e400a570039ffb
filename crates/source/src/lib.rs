//! Record-store boundary for the Cadence engine.
//!
//! The engine itself never performs I/O. This crate defines the
//! [`RecordSource`] trait callers fetch through, the wire shape of exported
//! records, and [`SnapshotSource`], a backend over a JSON snapshot document.

mod error;
mod record;
mod snapshot;
mod traits;

pub use error::SourceError;
pub use record::{
    AssignmentRecord, ClockInRecord, EntityRecord, PolicyRecord, ProfileRecord, SaleRecord,
    SnapshotDocument, StatusEventRecord,
};
pub use snapshot::SnapshotSource;
pub use traits::RecordSource;
