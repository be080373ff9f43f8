//! History command.
//!
//! Shows a learner's recent progress events, newest first.

use serde::{Deserialize, Serialize};

use crate::tracker::{ProgressEvent, ProgressLog};

/// Default number of events shown.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Options for the history command.
#[derive(Debug, Clone)]
pub struct HistoryOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Maximum number of events.
    pub limit: usize,
}

impl Default for HistoryOptions {
    fn default() -> Self {
        Self {
            json: false,
            quiet: false,
            limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// Output format for the history command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryOutput {
    pub success: bool,
    pub user_id: String,
    pub events: Vec<ProgressEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The history command implementation.
pub struct HistoryCommand {
    log: ProgressLog,
}

impl HistoryCommand {
    pub fn new(log: ProgressLog) -> Self {
        Self { log }
    }

    /// Run the history command.
    pub fn run(&self, user_id: &str, options: &HistoryOptions) -> HistoryOutput {
        match self.log.read_for_user(user_id, options.limit) {
            Ok(events) => HistoryOutput {
                success: true,
                user_id: user_id.to_string(),
                events,
                error: None,
            },
            Err(e) => HistoryOutput {
                success: false,
                user_id: user_id.to_string(),
                events: Vec::new(),
                error: Some(e.to_string()),
            },
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &HistoryOutput, options: &HistoryOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            return serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string());
        }

        if !output.success {
            return format!(
                "History failed: {}",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        if output.events.is_empty() {
            return format!("No history for {}.", output.user_id);
        }

        output
            .events
            .iter()
            .map(|e| {
                format!(
                    "{}  {:<10} {}",
                    e.ts.format("%Y-%m-%d %H:%M"),
                    e.data.event_name(),
                    e.data.describe()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
