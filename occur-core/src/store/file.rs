use std::path::{Path, PathBuf};

use super::ExceptionStore;
use crate::constants::EXCEPTIONS_DIR;
use crate::error::{OccurrenceError, OccurrenceResult};
use crate::occurrence::{OccurrenceKey, OccurrenceRecord};

/// Exception store backed by one TOML file per identity key.
///
/// Layout: `<root>/<event_id>/exceptions/<key file stem>.toml`. The file name
/// is derived from the key, so a key can only ever have one file.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn event_dir(&self, event_id: &str) -> PathBuf {
        self.root.join(event_id).join(EXCEPTIONS_DIR)
    }

    pub fn path_for(&self, key: &OccurrenceKey) -> PathBuf {
        self.event_dir(&key.event_id)
            .join(format!("{}.toml", key.file_stem()))
    }

    fn read_record(path: &Path) -> OccurrenceResult<OccurrenceRecord> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            OccurrenceError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
        })
    }
}

impl ExceptionStore for FileStore {
    #[tracing::instrument(skip(self), fields(root = %self.root.display()))]
    fn exceptions(&self, event_id: &str) -> OccurrenceResult<Vec<OccurrenceRecord>> {
        let dir = self.event_dir(event_id);

        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut paths: Vec<PathBuf> = std::fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|e| e == "toml"))
            .collect();
        paths.sort();

        let mut records = Vec::with_capacity(paths.len());
        for path in paths {
            let record = Self::read_record(&path)?;
            if record.event_id != event_id {
                tracing::warn!(path = %path.display(), found = %record.event_id, "Skipping exception filed under the wrong event");
                continue;
            }
            records.push(record);
        }

        tracing::debug!(count = records.len(), "Loaded exceptions");
        Ok(records)
    }

    #[tracing::instrument(skip(self, record), fields(event = %record.event_id))]
    fn save(&self, record: &OccurrenceRecord) -> OccurrenceResult<()> {
        let key = record.key()?;
        let path = self.path_for(&key);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(record)
            .map_err(|e| OccurrenceError::Serialization(e.to_string()))?;

        // Write then rename so readers never see a half-written file
        let tmp_path = path.with_extension("toml.tmp");
        std::fs::write(&tmp_path, content)?;
        std::fs::rename(&tmp_path, &path)?;

        tracing::info!(key = %key, "Saved exception");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::occurrence::Occurrence;
    use crate::occurrence::tests::{dt, fixed_event};

    #[test_log::test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let mut occ = Occurrence::new(fixed_event(), dt("2024-01-01 09:00"), dt("2024-01-01 10:00"));
        occ.cancel(&store).unwrap();

        let path = store.path_for(&occ.key());
        assert!(path.ends_with("standup/exceptions/20240101T090000__20240101T100000.toml"));
        assert!(path.exists());

        let records = store.exceptions("standup").unwrap();
        assert_eq!(records, vec![occ.to_record()]);
        assert!(store.exceptions("retro").unwrap().is_empty());
    }

    #[test_log::test]
    fn test_save_overwrites_same_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let mut occ = Occurrence::new(fixed_event(), dt("2024-01-01 09:00"), dt("2024-01-01 10:00"));

        occ.cancel(&store).unwrap();
        occ.set_varied_start(dt("2024-01-01 11:00"));
        occ.set_varied_end(dt("2024-01-01 12:00"));
        occ.uncancel(&store).unwrap();

        let records = store.exceptions("standup").unwrap();
        assert_eq!(records.len(), 1);
        assert!(!records[0].cancelled);
        assert_eq!(records[0].varied_start_time, Some(dt("2024-01-01 11:00").time()));

        let leftovers: Vec<_> = std::fs::read_dir(store.path_for(&occ.key()).parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|x| x == "tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test_log::test]
    fn test_unreadable_exception_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let exceptions = dir.path().join("standup").join(EXCEPTIONS_DIR);
        std::fs::create_dir_all(&exceptions).unwrap();
        std::fs::write(exceptions.join("broken.toml"), "not = [valid").unwrap();

        assert!(matches!(
            store.exceptions("standup"),
            Err(OccurrenceError::Serialization(_))
        ));
    }
}
