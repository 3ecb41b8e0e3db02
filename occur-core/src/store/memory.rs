use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::ExceptionStore;
use crate::error::{OccurrenceError, OccurrenceResult};
use crate::occurrence::{OccurrenceKey, OccurrenceRecord};

/// In-memory exception store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<OccurrenceKey, OccurrenceRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &OccurrenceKey) -> Option<OccurrenceRecord> {
        self.lock().ok()?.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> OccurrenceResult<MutexGuard<'_, HashMap<OccurrenceKey, OccurrenceRecord>>> {
        self.records
            .lock()
            .map_err(|_| OccurrenceError::Store("memory store lock poisoned".to_string()))
    }
}

impl ExceptionStore for MemoryStore {
    fn exceptions(&self, event_id: &str) -> OccurrenceResult<Vec<OccurrenceRecord>> {
        Ok(self
            .lock()?
            .values()
            .filter(|r| r.event_id == event_id)
            .cloned()
            .collect())
    }

    fn save(&self, record: &OccurrenceRecord) -> OccurrenceResult<()> {
        let key = record.key()?;
        self.lock()?.insert(key, record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::occurrence::Occurrence;
    use crate::occurrence::tests::{dt, fixed_event};

    #[test]
    fn test_save_replaces_record_with_same_key() {
        let store = MemoryStore::new();
        let mut occ = Occurrence::new(fixed_event(), dt("2024-01-01 09:00"), dt("2024-01-01 10:00"));

        occ.save(&store).unwrap();
        occ.set_varied_start(dt("2024-01-01 09:30"));
        occ.save(&store).unwrap();

        assert_eq!(store.len(), 1);
        let stored = store.get(&occ.key()).unwrap();
        assert_eq!(stored.varied_start_time, Some(dt("2024-01-01 09:30").time()));
    }

    #[test]
    fn test_exceptions_filtered_by_event() {
        let store = MemoryStore::new();
        Occurrence::new(fixed_event(), dt("2024-01-01 09:00"), dt("2024-01-01 10:00"))
            .save(&store)
            .unwrap();

        assert_eq!(store.exceptions("standup").unwrap().len(), 1);
        assert!(store.exceptions("retro").unwrap().is_empty());
    }

    #[test]
    fn test_save_rejects_record_without_start() {
        let store = MemoryStore::new();
        let mut record = Occurrence::new(fixed_event(), dt("2024-01-01 09:00"), dt("2024-01-01 10:00"))
            .to_record();
        record.unvaried_start_date = None;

        assert!(store.save(&record).is_err());
        assert!(store.is_empty());
    }
}
