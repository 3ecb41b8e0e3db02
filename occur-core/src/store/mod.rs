//! Persistence of exceptional occurrences.
//!
//! Stores hold one record per `OccurrenceKey`; saving a record whose key is
//! already present replaces it. That upsert is what keeps two writers from
//! creating duplicate overrides for the same instance.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::OccurrenceResult;
use crate::occurrence::OccurrenceRecord;

pub trait ExceptionStore {
    /// All stored exceptions for an event, in no particular order.
    fn exceptions(&self, event_id: &str) -> OccurrenceResult<Vec<OccurrenceRecord>>;

    /// Insert or replace the record with the same identity key.
    fn save(&self, record: &OccurrenceRecord) -> OccurrenceResult<()>;
}
