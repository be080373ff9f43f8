//! Skill proficiency tracker.
//!
//! Advances a learner's proficiency in every skill tagged on an activity
//! they have just completed, following [`crate::core::TRANSITIONS`].

use serde::{Deserialize, Serialize};

use crate::core::{candidate_level, validate_score, ProficiencyLevel};
use crate::error::Result;
use crate::storage::{RaiseOutcome, RecordStore, Records};

/// A proficiency write performed by the tracker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProficiencyChange {
    pub skill_id: String,
    /// Stored level before the write; `None` when the record was created.
    pub from: Option<ProficiencyLevel>,
    pub to: ProficiencyLevel,
}

/// Apply one activity completion to the proficiency records.
///
/// Runs inside the caller's transaction. Missing profile, unknown activity
/// and activities without skills are no-ops. Each tagged skill is evaluated
/// independently against its own stored level; new records start from
/// NOVICE.
pub fn apply_advancement(
    records: &mut Records,
    user_id: &str,
    activity_id: &str,
    passed: bool,
    score: u8,
) -> Result<Vec<ProficiencyChange>> {
    let score = validate_score(score)?;
    if !passed {
        return Ok(Vec::new());
    }

    let Some(profile_id) = records.find_profile(user_id).map(|p| p.id) else {
        tracing::debug!(user_id, "no profile, skipping proficiency update");
        return Ok(Vec::new());
    };
    let Some(activity) = records.activity(activity_id) else {
        tracing::debug!(activity_id, "unknown activity, skipping proficiency update");
        return Ok(Vec::new());
    };
    let activity_type = activity.activity_type;
    let skill_ids: Vec<String> = records
        .activity_skills(activity_id)
        .iter()
        .map(|s| s.id.clone())
        .collect();

    let mut changes = Vec::new();
    for skill_id in skill_ids {
        let current = records
            .find_proficiency(profile_id, &skill_id)
            .map(|p| p.proficiency_level)
            .unwrap_or_default();
        let candidate = candidate_level(current, activity_type, score);

        let outcome = records.raise_proficiency(profile_id, &skill_id, candidate)?;
        if !outcome.is_write() {
            continue;
        }
        let from = match outcome {
            RaiseOutcome::Raised { from, .. } => Some(from),
            _ => None,
        };

        tracing::debug!(user_id, skill_id = %skill_id, to = %candidate, "proficiency updated");
        changes.push(ProficiencyChange {
            skill_id,
            from,
            to: candidate,
        });
    }

    Ok(changes)
}

/// Tracker bound to a record store.
#[derive(Debug, Clone)]
pub struct ProficiencyTracker<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> ProficiencyTracker<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Advance proficiency for `user_id` after an attempt on `activity_id`.
    ///
    /// Scores above 100 are rejected before storage is touched. Failed
    /// attempts never change anything. Returns the writes performed.
    pub fn advance_proficiency(
        &self,
        user_id: &str,
        activity_id: &str,
        passed: bool,
        score: u8,
    ) -> Result<Vec<ProficiencyChange>> {
        validate_score(score)?;
        if !passed {
            return Ok(Vec::new());
        }
        self.store.transaction(|records| {
            apply_advancement(records, user_id, activity_id, passed, score)
        })
    }
}
