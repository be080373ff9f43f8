//! Init command.
//!
//! Seeds the record store with the curriculum generated from the built-in
//! book.

use serde::{Deserialize, Serialize};

use crate::curriculum::{generate_curriculum, Book, BOOK};
use crate::storage::RecordStore;

/// Options for the init command.
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Reinstall the catalog even if one exists.
    pub force: bool,
}

/// Output format for the init command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitOutput {
    /// Whether initialization was successful.
    pub success: bool,
    /// Whether the catalog was written. False when one already existed.
    pub installed: bool,
    pub skills: usize,
    pub modules: usize,
    pub activities: usize,
    /// Error message if initialization failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InitOutput {
    pub fn success(installed: bool, skills: usize, modules: usize, activities: usize) -> Self {
        Self {
            success: true,
            installed,
            skills,
            modules,
            activities,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            installed: false,
            skills: 0,
            modules: 0,
            activities: 0,
            error: Some(error.into()),
        }
    }
}

/// The init command implementation.
pub struct InitCommand<S: RecordStore> {
    store: S,
    book: &'static Book,
}

impl<S: RecordStore> InitCommand<S> {
    /// Create a new init command seeding from [`BOOK`].
    pub fn new(store: S) -> Self {
        Self { store, book: &BOOK }
    }

    /// Run the init command.
    pub fn run(&self, options: &InitOptions) -> InitOutput {
        let curriculum = generate_curriculum(self.book);
        let force = options.force;

        let result = self.store.transaction(|records| {
            if !records.activities().is_empty() && !force {
                return Ok(false);
            }
            curriculum.install(records)?;
            Ok(true)
        });

        match result {
            Ok(installed) => {
                tracing::debug!(installed, force, "init finished");
                InitOutput::success(
                    installed,
                    curriculum.skills.len(),
                    curriculum.modules.len(),
                    curriculum.activities.len(),
                )
            }
            Err(e) => InitOutput::failure(e.to_string()),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &InitOutput, options: &InitOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            return serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string());
        }

        if !output.success {
            return format!(
                "Init failed: {}",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        if output.installed {
            format!(
                "Installed {} modules, {} activities and {} skills.",
                output.modules, output.activities, output.skills
            )
        } else {
            "Catalog already present. Use --force to reinstall.".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryRecordStore;
    use std::sync::Arc;

    #[test]
    fn test_init_installs_catalog() {
        let store = Arc::new(MemoryRecordStore::new());
        let cmd = InitCommand::new(Arc::clone(&store));
        let output = cmd.run(&InitOptions::default());

        assert!(output.success);
        assert!(output.installed);
        assert_eq!(output.modules, BOOK.chapters.len());
        assert_eq!(store.load().unwrap().activities().len(), output.activities);
    }

    #[test]
    fn test_init_is_skipped_when_catalog_exists() {
        let store = Arc::new(MemoryRecordStore::new());
        let cmd = InitCommand::new(Arc::clone(&store));
        cmd.run(&InitOptions::default());

        let again = cmd.run(&InitOptions::default());
        assert!(again.success);
        assert!(!again.installed);

        let forced = cmd.run(&InitOptions {
            force: true,
            ..InitOptions::default()
        });
        assert!(forced.installed);
    }

    #[test]
    fn test_force_keeps_learner_records() {
        let store = Arc::new(MemoryRecordStore::new());
        let cmd = InitCommand::new(Arc::clone(&store));
        cmd.run(&InitOptions::default());
        store
            .transaction(|records| {
                records.ensure_profile("ada");
                Ok(())
            })
            .unwrap();

        cmd.run(&InitOptions {
            force: true,
            ..InitOptions::default()
        });
        assert!(store.load().unwrap().find_profile("ada").is_some());
    }

    #[test]
    fn test_format_output() {
        let cmd = InitCommand::new(MemoryRecordStore::new());
        let output = InitOutput::success(true, 8, 5, 20);

        let quiet = InitOptions {
            quiet: true,
            ..InitOptions::default()
        };
        assert!(cmd.format_output(&output, &quiet).is_empty());

        let json = InitOptions {
            json: true,
            ..InitOptions::default()
        };
        let parsed: serde_json::Value =
            serde_json::from_str(&cmd.format_output(&output, &json)).unwrap();
        assert_eq!(parsed["activities"], 20);

        let text = cmd.format_output(&output, &InitOptions::default());
        assert!(text.contains("5 modules"));

        let failed = cmd.format_output(&InitOutput::failure("disk full"), &InitOptions::default());
        assert!(failed.contains("disk full"));
    }
}
