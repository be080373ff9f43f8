//! Complete command.
//!
//! Grades a submission, records the completion and appends the resulting
//! progress events to the log.

use serde::{Deserialize, Serialize};

use crate::error::{FailOpen, Result};
use crate::grading::{Grade, Grader, Submission};
use crate::storage::RecordStore;
use crate::tracker::{CompletionHandler, CompletionReport, ProgressLog};

/// Options for the complete command.
#[derive(Debug, Clone, Default)]
pub struct CompleteOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Self-reported score.
    pub score: Option<u8>,
    /// Selected answer per question for quizzes and tests.
    pub answers: Vec<usize>,
    /// Skip grading and record this outcome with `score` (default 0).
    pub passed: Option<bool>,
}

impl CompleteOptions {
    fn submission(&self) -> Submission {
        Submission {
            score: self.score,
            answers: self.answers.clone(),
            code: None,
        }
    }
}

/// Output format for the complete command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteOutput {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<CompletionReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CompleteOutput {
    pub fn success(report: CompletionReport) -> Self {
        Self {
            success: true,
            report: Some(report),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            report: None,
            error: Some(error.into()),
        }
    }
}

/// The complete command implementation.
pub struct CompleteCommand<S: RecordStore, G: Grader> {
    handler: CompletionHandler<S, G>,
    log: Option<ProgressLog>,
}

impl<S: RecordStore, G: Grader> CompleteCommand<S, G> {
    pub fn new(handler: CompletionHandler<S, G>) -> Self {
        Self { handler, log: None }
    }

    /// Append progress events to `log` after each completion.
    pub fn with_log(mut self, log: ProgressLog) -> Self {
        self.log = Some(log);
        self
    }

    fn record(
        &self,
        user_id: &str,
        activity_id: &str,
        options: &CompleteOptions,
    ) -> Result<CompletionReport> {
        match options.passed {
            Some(passed) => {
                let grade = Grade::new(passed, options.score.unwrap_or(0))?;
                self.handler.complete_activity(user_id, activity_id, grade)
            }
            None => self
                .handler
                .submit(user_id, activity_id, &options.submission()),
        }
    }

    /// Run the complete command.
    pub fn run(&self, user_id: &str, activity_id: &str, options: &CompleteOptions) -> CompleteOutput {
        let report = match self.record(user_id, activity_id, options) {
            Ok(report) => report,
            Err(e) => return CompleteOutput::failure(e.to_string()),
        };

        // The store is the source of truth; a lost history line is tolerable
        if let Some(log) = &self.log {
            log.append_all(&report.events())
                .fail_open_default("appending progress events");
        }

        CompleteOutput::success(report)
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &CompleteOutput, options: &CompleteOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            return serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string());
        }

        let Some(report) = output.report.as_ref().filter(|_| output.success) else {
            return format!(
                "Completion failed: {}",
                output.error.as_deref().unwrap_or("unknown error")
            );
        };

        let mut lines = vec![format!(
            "{} {} with score {} (attempt {})",
            if report.grade.passed { "Passed" } else { "Did not pass" },
            report.activity_id,
            report.grade.score,
            report.progress.attempts
        )];

        if report.xp_awarded > 0 {
            lines.push(format!(
                "   +{} XP (total {}, level {})",
                report.xp_awarded, report.xp_total, report.level
            ));
        }
        if let Some(level) = report.level_up {
            lines.push(format!("   Level up! Now level {}", level));
        }
        for change in &report.proficiency_changes {
            match change.from {
                Some(from) => lines.push(format!("   {}: {} -> {}", change.skill_id, from, change.to)),
                None => lines.push(format!("   {}: now {}", change.skill_id, change.to)),
            }
        }
        if let Some(module) = &report.current_module_id {
            lines.push(format!("   Current module: {}", module));
        }

        lines.join("\n")
    }
}
