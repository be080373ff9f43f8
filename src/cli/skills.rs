//! Skills command.
//!
//! Prints the proficiency summary without touching the profile.

use serde::{Deserialize, Serialize};

use crate::cli::dashboard::format_summary;
use crate::storage::RecordStore;
use crate::tracker::{ProficiencySummary, SummaryReporter};

/// Options for the skills command.
#[derive(Debug, Clone, Default)]
pub struct SkillsOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the skills command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillsOutput {
    pub success: bool,
    pub user_id: String,
    pub summary: ProficiencySummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The skills command implementation.
pub struct SkillsCommand<S: RecordStore> {
    reporter: SummaryReporter<S>,
}

impl<S: RecordStore> SkillsCommand<S> {
    pub fn new(store: S) -> Self {
        Self {
            reporter: SummaryReporter::new(store),
        }
    }

    /// Run the skills command.
    pub fn run(&self, user_id: &str, _options: &SkillsOptions) -> SkillsOutput {
        match self.reporter.summarize(user_id) {
            Ok(summary) => SkillsOutput {
                success: true,
                user_id: user_id.to_string(),
                summary,
                error: None,
            },
            Err(e) => SkillsOutput {
                success: false,
                user_id: user_id.to_string(),
                summary: ProficiencySummary::default(),
                error: Some(e.to_string()),
            },
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &SkillsOutput, options: &SkillsOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            return serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string());
        }

        if !output.success {
            return format!(
                "Skills failed: {}",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        if output.summary.total_skills == 0 {
            return format!("No skills tracked yet for {}.", output.user_id);
        }

        let mut lines = Vec::new();
        format_summary(&output.summary, &mut lines);
        lines.join("\n")
    }
}
