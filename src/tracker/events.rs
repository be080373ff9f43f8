//! Progress event types and JSONL log writer.
//!
//! Events are stored in an append-only JSONL file
//! (`<dojo_home>/progress.log`). The record store remains the source of
//! truth; the log is a history for the `history` command.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::ProficiencyLevel;
use crate::error::{DojoError, Result};
use crate::util::{read_to_string_limited, MAX_FILE_SIZE};

/// Schema version for progress events.
///
/// Increment when the event schema changes in a breaking way.
pub const PROGRESS_SCHEMA_VERSION: u8 = 1;

/// A progress event as written to the JSONL log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressEvent {
    /// Schema version for forward compatibility.
    pub v: u8,
    pub ts: DateTime<Utc>,
    #[serde(flatten)]
    pub data: ProgressEventType,
}

impl ProgressEvent {
    /// Create a new event with the current timestamp.
    pub fn new(data: ProgressEventType) -> Self {
        Self::with_timestamp(data, Utc::now())
    }

    /// Create an event with a specific timestamp (for testing).
    pub fn with_timestamp(data: ProgressEventType, ts: DateTime<Utc>) -> Self {
        Self {
            v: PROGRESS_SCHEMA_VERSION,
            ts,
            data,
        }
    }
}

/// The type of progress event and its associated data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEventType {
    /// An activity was attempted and graded.
    Attempted {
        user_id: String,
        activity_id: String,
        score: u8,
        passed: bool,
    },

    /// A skill proficiency was created or raised.
    Advanced {
        user_id: String,
        skill_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        from: Option<ProficiencyLevel>,
        to: ProficiencyLevel,
    },

    /// The learner reached a new XP level.
    LevelUp { user_id: String, level: u32 },
}

impl ProgressEventType {
    /// The user the event belongs to.
    pub fn user_id(&self) -> &str {
        match self {
            Self::Attempted { user_id, .. }
            | Self::Advanced { user_id, .. }
            | Self::LevelUp { user_id, .. } => user_id,
        }
    }

    /// Get the event name as a string.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Attempted { .. } => "attempted",
            Self::Advanced { .. } => "advanced",
            Self::LevelUp { .. } => "level_up",
        }
    }

    /// One-line human description.
    pub fn describe(&self) -> String {
        match self {
            Self::Attempted {
                activity_id,
                score,
                passed,
                ..
            } => format!(
                "{} {} with score {}",
                if *passed { "passed" } else { "failed" },
                activity_id,
                score
            ),
            Self::Advanced {
                skill_id, from, to, ..
            } => match from {
                Some(from) => format!("{skill_id}: {from} -> {to}"),
                None => format!("{skill_id}: started at {to}"),
            },
            Self::LevelUp { level, .. } => format!("reached level {level}"),
        }
    }
}

/// JSONL log writer and reader for progress events.
#[derive(Debug, Clone)]
pub struct ProgressLog {
    path: PathBuf,
}

impl ProgressLog {
    /// Create a log handle for the given path. Nothing is created until the
    /// first append.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one event.
    pub fn append(&self, event: &ProgressEvent) -> Result<()> {
        self.append_all(std::slice::from_ref(event))
    }

    /// Append several events with a single open.
    pub fn append_all(&self, events: &[ProgressEvent]) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| DojoError::storage(parent, e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| DojoError::storage(&self.path, e))?;

        for event in events {
            let json = serde_json::to_string(event).map_err(|e| {
                DojoError::serde(format!("Failed to serialize progress event: {}", e))
            })?;
            writeln!(file, "{}", json).map_err(|e| DojoError::storage(&self.path, e))?;
        }

        Ok(())
    }

    /// Read every event. Malformed lines are skipped with a warning; a
    /// missing file reads as empty.
    pub fn read_all(&self) -> Result<Vec<ProgressEvent>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = read_to_string_limited(&self.path, MAX_FILE_SIZE)?;
        let mut events = Vec::new();
        for (line_no, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<ProgressEvent>(line) {
                Ok(event) => events.push(event),
                Err(e) => tracing::warn!(
                    line = line_no + 1,
                    error = %e,
                    "skipping malformed progress event"
                ),
            }
        }
        Ok(events)
    }

    /// The most recent `limit` events for `user_id`, newest first.
    pub fn read_for_user(&self, user_id: &str, limit: usize) -> Result<Vec<ProgressEvent>> {
        let mut events: Vec<ProgressEvent> = self
            .read_all()?
            .into_iter()
            .filter(|e| e.data.user_id() == user_id)
            .collect();
        events.reverse();
        events.truncate(limit);
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn attempted(user: &str, activity: &str, score: u8) -> ProgressEvent {
        ProgressEvent::new(ProgressEventType::Attempted {
            user_id: user.to_string(),
            activity_id: activity.to_string(),
            score,
            passed: score >= 70,
        })
    }

    #[test]
    fn test_event_json_shape() {
        let event = ProgressEvent::new(ProgressEventType::Advanced {
            user_id: "ada".to_string(),
            skill_id: "sql".to_string(),
            from: None,
            to: ProficiencyLevel::Apprentice,
        });
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["v"], PROGRESS_SCHEMA_VERSION);
        assert_eq!(json["event"], "advanced");
        assert_eq!(json["to"], "APPRENTICE");
        assert!(json.get("from").is_none());
    }

    #[test]
    fn test_append_and_read() {
        let dir = TempDir::new().unwrap();
        let log = ProgressLog::new(dir.path().join("nested").join("progress.log"));

        log.append(&attempted("ada", "mod-01-learn", 85)).unwrap();
        log.append_all(&[
            attempted("bob", "mod-01-learn", 40),
            ProgressEvent::new(ProgressEventType::LevelUp {
                user_id: "ada".to_string(),
                level: 2,
            }),
        ])
        .unwrap();

        let events = log.read_all().unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[2].data.event_name(), "level_up");
    }

    #[test]
    fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        let log = ProgressLog::new(dir.path().join("progress.log"));
        assert!(log.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_read_skips_malformed_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("progress.log");
        let log = ProgressLog::new(&path);

        log.append(&attempted("ada", "mod-01-learn", 85)).unwrap();
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "{{not json").unwrap();
        writeln!(file).unwrap();
        log.append(&attempted("ada", "mod-01-practice", 90)).unwrap();

        assert_eq!(log.read_all().unwrap().len(), 2);
    }

    #[test]
    fn test_read_for_user_newest_first_with_limit() {
        let dir = TempDir::new().unwrap();
        let log = ProgressLog::new(dir.path().join("progress.log"));
        log.append_all(&[
            attempted("ada", "a1", 10),
            attempted("bob", "a2", 20),
            attempted("ada", "a3", 30),
            attempted("ada", "a4", 40),
        ])
        .unwrap();

        let events = log.read_for_user("ada", 2).unwrap();
        let ids: Vec<String> = events
            .iter()
            .map(|e| match &e.data {
                ProgressEventType::Attempted { activity_id, .. } => activity_id.clone(),
                other => panic!("unexpected event {other:?}"),
            })
            .collect();
        assert_eq!(ids, vec!["a4", "a3"]);
    }

    #[test]
    fn test_describe() {
        let advanced = ProgressEventType::Advanced {
            user_id: "ada".to_string(),
            skill_id: "sql".to_string(),
            from: Some(ProficiencyLevel::Novice),
            to: ProficiencyLevel::Apprentice,
        };
        assert_eq!(advanced.describe(), "sql: NOVICE -> APPRENTICE");

        let failed = attempted("ada", "mod-01-learn", 40).data;
        assert_eq!(failed.describe(), "failed mod-01-learn with score 40");
    }
}
