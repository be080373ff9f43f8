//! Activity completion handling.
//!
//! Grades a submission and then, inside a single transaction, records the
//! attempt, awards XP, moves the learner along the module sequence and runs
//! the proficiency tracker. Either all of it is committed or none of it.

use serde::{Deserialize, Serialize};

use crate::core::{validate_score, RecordId, UserActivityProgress, UserProfile};
use crate::error::{DojoError, Result};
use crate::grading::{Grade, Grader, Submission};
use crate::storage::{RecordStore, Records};
use crate::tracker::events::{ProgressEvent, ProgressEventType};
use crate::tracker::proficiency::{apply_advancement, ProficiencyChange};

/// Default XP needed per level.
pub const DEFAULT_XP_PER_LEVEL: u32 = 100;

/// Everything that changed because of one completion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionReport {
    pub user_id: String,
    pub activity_id: String,
    pub grade: Grade,
    pub progress: UserActivityProgress,
    pub profile_created: bool,
    /// True only for the attempt that first completed the activity.
    pub first_completion: bool,
    pub xp_awarded: u32,
    pub xp_total: u32,
    pub level: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_up: Option<u32>,
    pub current_module_id: Option<String>,
    pub proficiency_changes: Vec<ProficiencyChange>,
}

impl CompletionReport {
    /// Progress events describing this completion, in causal order.
    pub fn events(&self) -> Vec<ProgressEvent> {
        let mut events = vec![ProgressEvent::new(ProgressEventType::Attempted {
            user_id: self.user_id.clone(),
            activity_id: self.activity_id.clone(),
            score: self.grade.score,
            passed: self.grade.passed,
        })];
        if let Some(level) = self.level_up {
            events.push(ProgressEvent::new(ProgressEventType::LevelUp {
                user_id: self.user_id.clone(),
                level,
            }));
        }
        for change in &self.proficiency_changes {
            events.push(ProgressEvent::new(ProgressEventType::Advanced {
                user_id: self.user_id.clone(),
                skill_id: change.skill_id.clone(),
                from: change.from,
                to: change.to,
            }));
        }
        events
    }
}

/// Move `current_module_id` past every module the learner has finished.
fn advance_module(records: &mut Records, profile_id: RecordId, user_id: &str) -> Option<String> {
    let mut current = records
        .find_profile(user_id)
        .and_then(|p| p.current_module_id.clone())
        .or_else(|| records.first_module_id());

    // Bounded by the module count so a malformed order can never spin
    for _ in 0..records.modules().len() {
        let Some(module_id) = current.clone() else {
            break;
        };
        if !records.module_completed(profile_id, &module_id) {
            break;
        }
        match records.next_module_id(&module_id) {
            Some(next) => current = Some(next),
            None => break,
        }
    }

    if let Some(profile) = records.find_profile_mut(user_id) {
        if profile.current_module_id != current {
            tracing::debug!(user_id, module = ?current, "current module changed");
            profile.current_module_id = current.clone();
        }
    }
    current
}

/// Apply a graded attempt to the records. Runs inside the caller's
/// transaction.
///
/// A learner without a profile gets one here, before the tracker step runs.
pub fn record_completion(
    records: &mut Records,
    user_id: &str,
    activity_id: &str,
    grade: Grade,
    xp_per_level: u32,
) -> Result<CompletionReport> {
    let score = validate_score(grade.score)?;
    let activity = records
        .activity(activity_id)
        .cloned()
        .ok_or_else(|| DojoError::not_found("activity", activity_id))?;

    let (profile_id, profile_created) = records.ensure_profile(user_id);

    let progress = records.progress_entry(profile_id, activity_id);
    let first_completion = progress.record_attempt(score, grade.passed);
    let progress = progress.clone();

    let profile = records
        .find_profile_mut(user_id)
        .ok_or_else(|| DojoError::invalid_state(format!("profile for {user_id} vanished")))?;
    let (xp_awarded, level_up) = if first_completion {
        let level_up = profile.award_xp(activity.xp_reward, xp_per_level);
        (activity.xp_reward, level_up)
    } else {
        (0, None)
    };
    let (xp_total, level) = (profile.xp, profile.level);

    let current_module_id = advance_module(records, profile_id, user_id);
    let proficiency_changes = apply_advancement(records, user_id, activity_id, grade.passed, score)?;

    Ok(CompletionReport {
        user_id: user_id.to_string(),
        activity_id: activity_id.to_string(),
        grade,
        progress,
        profile_created,
        first_completion,
        xp_awarded,
        xp_total,
        level,
        level_up,
        current_module_id,
        proficiency_changes,
    })
}

/// Return the profile for `user_id`, creating it on first visit.
pub fn open_profile<S: RecordStore>(store: &S, user_id: &str) -> Result<(UserProfile, bool)> {
    store.transaction(|records| {
        let (_, created) = records.ensure_profile(user_id);
        let profile = records
            .find_profile(user_id)
            .cloned()
            .ok_or_else(|| DojoError::invalid_state(format!("profile for {user_id} vanished")))?;
        Ok((profile, created))
    })
}

/// Grades submissions and records completions against a store.
#[derive(Debug, Clone)]
pub struct CompletionHandler<S: RecordStore, G: Grader> {
    store: S,
    grader: G,
    xp_per_level: u32,
}

impl<S: RecordStore, G: Grader> CompletionHandler<S, G> {
    pub fn new(store: S, grader: G) -> Self {
        Self {
            store,
            grader,
            xp_per_level: DEFAULT_XP_PER_LEVEL,
        }
    }

    /// Override the XP needed per level.
    pub fn with_xp_per_level(mut self, xp_per_level: u32) -> Self {
        self.xp_per_level = xp_per_level.max(1);
        self
    }

    /// Grade `submission` and record the result.
    pub fn submit(
        &self,
        user_id: &str,
        activity_id: &str,
        submission: &Submission,
    ) -> Result<CompletionReport> {
        let records = self.store.load()?;
        let activity = records
            .activity(activity_id)
            .ok_or_else(|| DojoError::not_found("activity", activity_id))?;
        let grade = self.grader.grade(activity, submission)?;
        self.complete_activity(user_id, activity_id, grade)
    }

    /// Record an already graded attempt.
    pub fn complete_activity(
        &self,
        user_id: &str,
        activity_id: &str,
        grade: Grade,
    ) -> Result<CompletionReport> {
        validate_score(grade.score)?;
        let report = self.store.transaction(|records| {
            record_completion(records, user_id, activity_id, grade, self.xp_per_level)
        })?;
        tracing::debug!(
            user_id,
            activity_id,
            passed = grade.passed,
            changes = report.proficiency_changes.len(),
            "recorded completion"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ProficiencyLevel;
    use crate::grading::ThresholdGrader;
    use crate::storage::records::fixtures::seeded;
    use crate::storage::MemoryRecordStore;
    use std::sync::Arc;

    fn handler() -> CompletionHandler<Arc<MemoryRecordStore>, ThresholdGrader> {
        let store = Arc::new(MemoryRecordStore::with_records(seeded()));
        CompletionHandler::new(store, ThresholdGrader::default())
    }

    fn pass(score: u8) -> Grade {
        Grade::new(true, score).unwrap()
    }

    #[test]
    fn test_first_completion_creates_profile_and_awards_xp() {
        let handler = handler();
        let report = handler.complete_activity("ada", "mod-01-learn", pass(90)).unwrap();

        assert!(report.profile_created);
        assert!(report.first_completion);
        assert_eq!(report.xp_awarded, 10);
        assert_eq!(report.xp_total, 10);
        assert_eq!(report.level, 1);
        assert_eq!(report.progress.attempts, 1);
        assert!(report.progress.completed);
        assert_eq!(report.proficiency_changes.len(), 2);
        assert_eq!(report.current_module_id.as_deref(), Some("mod-01"));
    }

    #[test]
    fn test_xp_awarded_once() {
        let handler = handler();
        handler.complete_activity("ada", "mod-01-learn", pass(90)).unwrap();
        let again = handler.complete_activity("ada", "mod-01-learn", pass(100)).unwrap();

        assert!(!again.first_completion);
        assert_eq!(again.xp_awarded, 0);
        assert_eq!(again.xp_total, 10);
        assert_eq!(again.progress.attempts, 2);
        assert_eq!(again.progress.score, 100);
    }

    #[test]
    fn test_failed_attempt_counts_but_changes_no_proficiency() {
        let handler = handler();
        let report = handler
            .complete_activity("ada", "mod-01-learn", Grade::new(false, 95).unwrap())
            .unwrap();

        assert!(!report.progress.completed);
        assert_eq!(report.progress.attempts, 1);
        assert_eq!(report.xp_awarded, 0);
        assert!(report.proficiency_changes.is_empty());
    }

    #[test]
    fn test_level_up_and_module_advance() {
        let handler = handler().with_xp_per_level(50);
        let mut last = None;
        for stage in ["learn", "practice", "apply", "assess"] {
            last = Some(
                handler
                    .complete_activity("ada", &format!("mod-01-{stage}"), pass(100))
                    .unwrap(),
            );
        }
        let last = last.unwrap();

        // 10 + 20 + 30 + 40 XP from the fixture
        assert_eq!(last.xp_total, 100);
        assert_eq!(last.level, 3);
        assert_eq!(last.level_up, Some(3));
        assert_eq!(last.current_module_id.as_deref(), Some("mod-02"));
    }

    #[test]
    fn test_full_progression_reaches_master() {
        let handler = handler();
        for stage in ["learn", "practice", "apply", "assess"] {
            handler
                .complete_activity("ada", &format!("mod-01-{stage}"), pass(95))
                .unwrap();
        }
        let records = handler.store.load().unwrap();
        let pid = records.find_profile("ada").unwrap().id;
        // learn: -> APPRENTICE, practice: -> JOURNEYMAN, apply: tie, assess: -> MASTER
        assert_eq!(
            records.find_proficiency(pid, "cleaning").unwrap().proficiency_level,
            ProficiencyLevel::Master
        );
    }

    #[test]
    fn test_unknown_activity_is_not_found() {
        let handler = handler();
        let err = handler
            .complete_activity("ada", "nope", pass(100))
            .unwrap_err();
        assert!(matches!(err, DojoError::NotFound { .. }));
        // Nothing was committed, not even the lazy profile
        assert!(handler.store.load().unwrap().find_profile("ada").is_none());
    }

    #[test]
    fn test_rollback_spans_progress_and_proficiency() {
        let store = Arc::new(MemoryRecordStore::with_records(seeded()));
        let before = store.load().unwrap();

        let result: Result<()> = store.transaction(|records| {
            record_completion(records, "ada", "mod-01-learn", pass(100), 100)?;
            Err(DojoError::invalid_state("simulated failure after tracker"))
        });

        assert!(result.is_err());
        assert_eq!(store.load().unwrap(), before);
    }

    #[test]
    fn test_submit_grades_quiz_answers() {
        let handler = handler();
        let report = handler
            .submit("ada", "mod-01-learn", &Submission::with_answers(vec![0]))
            .unwrap();
        assert_eq!(report.grade, Grade { passed: true, score: 100 });
    }

    #[test]
    fn test_submit_unknown_activity() {
        let handler = handler();
        assert!(handler
            .submit("ada", "missing", &Submission::with_score(100))
            .is_err());
    }

    #[test]
    fn test_report_events() {
        let handler = handler().with_xp_per_level(10);
        let report = handler.complete_activity("ada", "mod-01-learn", pass(90)).unwrap();
        let names: Vec<&str> = report
            .events()
            .iter()
            .map(|e| e.data.event_name())
            .collect();
        assert_eq!(names, vec!["attempted", "level_up", "advanced", "advanced"]);
    }

    #[test]
    fn test_open_profile_is_lazy() {
        let store = MemoryRecordStore::with_records(seeded());
        let (profile, created) = open_profile(&store, "ada").unwrap();
        assert!(created);
        assert_eq!(profile.level, 1);
        let (again, created) = open_profile(&store, "ada").unwrap();
        assert!(!created);
        assert_eq!(again.id, profile.id);
    }
}
