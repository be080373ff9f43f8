//! Dojo - skill progression engine for the Data Analysis Dojo
//!
//! Dojo tracks per-skill proficiency as learners complete activities in a
//! Learn, Practice, Apply and Assess progression, awards XP and levels, and
//! summarizes proficiency for dashboards.

pub mod cli;
pub mod config;
pub mod core;
pub mod curriculum;
pub mod error;
pub mod grading;
pub mod storage;
pub mod tracker;
pub mod util;

pub use config::Config;
pub use core::{
    candidate_level, Activity, ActivityContent, ActivityType, Module, ProficiencyLevel, Skill,
    UserActivityProgress, UserProfile, UserSkillProficiency,
};
pub use curriculum::{generate_curriculum, Curriculum, BOOK};
pub use error::{DojoError, Result};
pub use grading::{Grade, Grader, Submission, ThresholdGrader};
pub use storage::{FileRecordStore, MemoryRecordStore, RecordStore, Records};
pub use tracker::{
    CompletionHandler, CompletionReport, ProficiencyChange, ProficiencySummary,
    ProficiencyTracker, ProgressLog, SummaryReporter,
};

// CLI commands
pub use cli::{
    CatalogCommand, CompleteCommand, DashboardCommand, HistoryCommand, InitCommand, SkillsCommand,
};
