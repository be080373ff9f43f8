//! In-memory record storage.
//!
//! Used by tests and by callers that seed a catalog for a single run.

use std::sync::RwLock;

use crate::error::{DojoError, Result};
use crate::storage::{RecordStore, Records};

/// In-memory record store.
///
/// Thread-safe implementation using `RwLock<Records>`. Transactions hold
/// the write lock for their whole duration and work on a draft copy.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: RwLock<Records>,
}

impl MemoryRecordStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Records::new()),
        }
    }

    /// Create a store pre-populated with `records`.
    pub fn with_records(records: Records) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }
}

fn poisoned() -> DojoError {
    DojoError::invalid_state("record store lock poisoned")
}

impl RecordStore for MemoryRecordStore {
    fn load(&self) -> Result<Records> {
        let records = self.records.read().map_err(|_| poisoned())?;
        Ok(records.clone())
    }

    fn transact(&self, work: &mut dyn FnMut(&mut Records) -> Result<()>) -> Result<()> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        let mut draft = records.clone();
        work(&mut draft)?;
        *records = draft;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ProficiencyLevel, Skill};
    use crate::storage::traits::tests::test_record_store_transactions;

    #[test]
    fn test_memory_store_transactions() {
        let store = MemoryRecordStore::new();
        test_record_store_transactions(&store);
    }

    #[test]
    fn test_default_is_empty() {
        let store = MemoryRecordStore::default();
        assert!(store.load().unwrap().skills().is_empty());
    }

    #[test]
    fn test_with_records() {
        let mut records = Records::new();
        records.upsert_skill(Skill::new("sql", "SQL", "", "Databases"));
        let store = MemoryRecordStore::with_records(records);
        assert!(store.load().unwrap().skill("sql").is_some());
    }

    #[test]
    fn test_concurrent_raises_keep_highest_level() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(MemoryRecordStore::new());
        let profile_id = store
            .transaction(|records| Ok(records.ensure_profile("ada").0))
            .unwrap();

        let levels = [
            ProficiencyLevel::Master,
            ProficiencyLevel::Novice,
            ProficiencyLevel::Apprentice,
            ProficiencyLevel::Journeyman,
        ];
        let mut handles = vec![];
        for level in levels.into_iter().cycle().take(16) {
            let store_clone = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                store_clone
                    .transaction(|records| records.raise_proficiency(profile_id, "sql", level))
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let records = store.load().unwrap();
        assert_eq!(
            records
                .find_proficiency(profile_id, "sql")
                .unwrap()
                .proficiency_level,
            ProficiencyLevel::Master
        );
        let (_, list) = records.profile_with_proficiencies("ada").unwrap();
        assert_eq!(list.len(), 1);
    }
}
