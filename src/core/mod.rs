//! Core domain types for the dojo.
//!
//! The catalog (skills, modules, activities), learner records and the
//! proficiency ladder with its advancement rules.

pub mod catalog;
pub mod learner;
pub mod proficiency;

pub use catalog::{Activity, ActivityContent, Module, Question, Skill};
pub use learner::{
    level_for_xp, RecordId, UserActivityProgress, UserProfile, UserSkillProficiency,
};
pub use proficiency::{
    candidate_level, validate_score, ActivityType, ProficiencyLevel, Transition, MAX_SCORE,
    TRANSITIONS,
};
