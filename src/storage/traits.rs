//! Record storage traits.
//!
//! This module defines the `RecordStore` trait: every read works on a
//! snapshot, every write goes through a transaction that either publishes
//! all of its changes or none of them.

use std::sync::Arc;

use crate::error::{DojoError, Result};
use crate::storage::Records;

/// Trait for record storage backends.
pub trait RecordStore: Send + Sync {
    /// Load a snapshot of all records.
    fn load(&self) -> Result<Records>;

    /// Run `work` against the records atomically.
    ///
    /// Transactions are serialized. If `work` returns an error nothing is
    /// persisted and the error is returned unchanged.
    fn transact(&self, work: &mut dyn FnMut(&mut Records) -> Result<()>) -> Result<()>;

    /// Typed wrapper over [`RecordStore::transact`] that hands back the
    /// closure's result.
    fn transaction<T, F>(&self, mut work: F) -> Result<T>
    where
        Self: Sized,
        F: FnMut(&mut Records) -> Result<T>,
    {
        let mut output = None;
        self.transact(&mut |records| {
            output = Some(work(records)?);
            Ok(())
        })?;
        output.ok_or_else(|| DojoError::invalid_state("transaction committed without running"))
    }
}

/// Blanket implementation of RecordStore for Arc-wrapped stores.
///
/// This allows sharing one store between the tracker, reporter and
/// completion handler.
impl<T: RecordStore + ?Sized> RecordStore for Arc<T> {
    fn load(&self) -> Result<Records> {
        (**self).load()
    }

    fn transact(&self, work: &mut dyn FnMut(&mut Records) -> Result<()>) -> Result<()> {
        (**self).transact(work)
    }
}

/// Test utilities for RecordStore implementations.
#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::core::{ProficiencyLevel, Skill};

    /// Verify snapshot, commit and rollback behaviour of a store.
    pub fn test_record_store_transactions<S: RecordStore>(store: &S) {
        // Initially empty
        let records = store.load().unwrap();
        assert!(records.skills().is_empty());

        // Committed transaction is visible
        store
            .transaction(|records| {
                records.upsert_skill(Skill::new("sql", "SQL", "", "Databases"));
                Ok(())
            })
            .unwrap();
        assert!(store.load().unwrap().skill("sql").is_some());

        // Return values pass through
        let profile_id = store
            .transaction(|records| Ok(records.ensure_profile("ada").0))
            .unwrap();
        assert_eq!(
            store.load().unwrap().find_profile("ada").unwrap().id,
            profile_id
        );

        // Failed transaction leaves no trace
        let result: Result<()> = store.transaction(|records| {
            records.upsert_skill(Skill::new("viz", "Charts", "", "Visualization"));
            records.raise_proficiency(profile_id, "sql", ProficiencyLevel::Master)?;
            Err(DojoError::invalid_input("abort"))
        });
        assert!(matches!(result, Err(DojoError::InvalidInput { .. })));

        let records = store.load().unwrap();
        assert!(records.skill("viz").is_none());
        assert!(records.find_proficiency(profile_id, "sql").is_none());

        // Snapshots are detached copies
        let mut snapshot = store.load().unwrap();
        snapshot.upsert_skill(Skill::new("detached", "Detached", "", "None"));
        assert!(store.load().unwrap().skill("detached").is_none());
    }
}
