//! Learner progress tracking.
//!
//! This module advances skill proficiency, records activity completions,
//! summarizes proficiency for dashboards and keeps the progress event log.

pub mod completion;
pub mod events;
pub mod proficiency;
pub mod summary;

pub use completion::{
    open_profile, record_completion, CompletionHandler, CompletionReport, DEFAULT_XP_PER_LEVEL,
};
pub use events::{ProgressEvent, ProgressEventType, ProgressLog, PROGRESS_SCHEMA_VERSION};
pub use proficiency::{apply_advancement, ProficiencyChange, ProficiencyTracker};
pub use summary::{
    summarize_records, CategoryGroup, ProficiencySummary, SkillStanding, SummaryReporter,
    UNCATEGORIZED,
};
