//! Per-learner state: profile, skill proficiency and activity progress.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::proficiency::ProficiencyLevel;

/// Record id assigned by the store.
pub type RecordId = u64;

/// Gamification profile owned by exactly one user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: RecordId,
    /// External user identifier (1:1 owner).
    pub user_id: String,
    pub level: u32,
    pub xp: u32,
    pub current_module_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// A fresh level-1 profile with no XP.
    pub fn new(
        id: RecordId,
        user_id: impl Into<String>,
        current_module_id: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id: user_id.into(),
            level: 1,
            xp: 0,
            current_module_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Add XP and recompute the level. Returns the new level if it changed.
    pub fn award_xp(&mut self, xp: u32, xp_per_level: u32) -> Option<u32> {
        self.xp = self.xp.saturating_add(xp);
        let level = level_for_xp(self.xp, xp_per_level);
        self.updated_at = Utc::now();
        if level != self.level {
            self.level = level;
            Some(level)
        } else {
            None
        }
    }
}

/// Level reached with `xp` points: one level per `xp_per_level`, starting at 1.
pub fn level_for_xp(xp: u32, xp_per_level: u32) -> u32 {
    1 + xp / xp_per_level.max(1)
}

/// A learner's standing in one skill. Unique per (profile, skill).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSkillProficiency {
    pub id: RecordId,
    pub profile_id: RecordId,
    pub skill_id: String,
    pub proficiency_level: ProficiencyLevel,
    pub updated_at: DateTime<Utc>,
}

/// A learner's progress on one activity. Unique per (profile, activity).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserActivityProgress {
    pub id: RecordId,
    pub profile_id: RecordId,
    pub activity_id: String,
    /// Sticky once true.
    pub completed: bool,
    /// Best score seen so far.
    pub score: u8,
    pub attempts: u32,
    pub updated_at: DateTime<Utc>,
}

impl UserActivityProgress {
    pub fn new(id: RecordId, profile_id: RecordId, activity_id: impl Into<String>) -> Self {
        Self {
            id,
            profile_id,
            activity_id: activity_id.into(),
            completed: false,
            score: 0,
            attempts: 0,
            updated_at: Utc::now(),
        }
    }

    /// Register one attempt. Returns true if this attempt completed the
    /// activity for the first time.
    pub fn record_attempt(&mut self, score: u8, passed: bool) -> bool {
        let newly_completed = passed && !self.completed;
        self.attempts = self.attempts.saturating_add(1);
        self.score = self.score.max(score);
        self.completed |= passed;
        self.updated_at = Utc::now();
        newly_completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_profile() {
        let profile = UserProfile::new(1, "ada", Some("mod-01".to_string()));
        assert_eq!(profile.level, 1);
        assert_eq!(profile.xp, 0);
        assert_eq!(profile.current_module_id.as_deref(), Some("mod-01"));
    }

    #[test]
    fn test_level_for_xp() {
        assert_eq!(level_for_xp(0, 100), 1);
        assert_eq!(level_for_xp(99, 100), 1);
        assert_eq!(level_for_xp(100, 100), 2);
        assert_eq!(level_for_xp(250, 100), 3);
        // Zero divisor is clamped
        assert_eq!(level_for_xp(5, 0), 6);
    }

    #[test]
    fn test_award_xp_reports_level_up() {
        let mut profile = UserProfile::new(1, "ada", None);
        assert_eq!(profile.award_xp(50, 100), None);
        assert_eq!(profile.award_xp(60, 100), Some(2));
        assert_eq!(profile.xp, 110);
        assert_eq!(profile.level, 2);
    }

    #[test]
    fn test_record_attempt_completed_is_sticky() {
        let mut progress = UserActivityProgress::new(1, 1, "mod-01-learn");

        assert!(!progress.record_attempt(40, false));
        assert!(!progress.completed);

        assert!(progress.record_attempt(90, true));
        assert!(progress.completed);

        // A later failure neither un-completes nor lowers the best score
        assert!(!progress.record_attempt(10, false));
        assert!(progress.completed);
        assert_eq!(progress.score, 90);
        assert_eq!(progress.attempts, 3);
    }

    #[test]
    fn test_record_attempt_first_completion_only_once() {
        let mut progress = UserActivityProgress::new(1, 1, "mod-01-learn");
        assert!(progress.record_attempt(80, true));
        assert!(!progress.record_attempt(100, true));
        assert_eq!(progress.score, 100);
    }
}
