//! Catalog command.
//!
//! Lists modules in order with their activities.

use serde::{Deserialize, Serialize};

use crate::core::{Activity, ActivityType, Module};
use crate::storage::{RecordStore, Records};

/// Options for the catalog command.
#[derive(Debug, Clone, Default)]
pub struct CatalogOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Simplified activity info for output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityInfo {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub xp_reward: u32,
    /// Names of the skills this activity trains.
    pub skills: Vec<String>,
}

impl ActivityInfo {
    fn from_activity(activity: &Activity, records: &Records) -> Self {
        Self {
            id: activity.id.clone(),
            title: activity.title.clone(),
            activity_type: activity.activity_type,
            xp_reward: activity.xp_reward,
            skills: records
                .activity_skills(&activity.id)
                .into_iter()
                .map(|s| s.name.clone())
                .collect(),
        }
    }
}

/// Module with its activities in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleInfo {
    pub id: String,
    pub title: String,
    pub order: u32,
    pub activities: Vec<ActivityInfo>,
}

impl ModuleInfo {
    fn from_module(module: &Module, records: &Records) -> Self {
        Self {
            id: module.id.clone(),
            title: module.title.clone(),
            order: module.order,
            activities: records
                .activities_in_module(&module.id)
                .into_iter()
                .map(|a| ActivityInfo::from_activity(a, records))
                .collect(),
        }
    }
}

/// Output format for the catalog command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogOutput {
    pub success: bool,
    pub modules: Vec<ModuleInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CatalogOutput {
    pub fn success(modules: Vec<ModuleInfo>) -> Self {
        Self {
            success: true,
            modules,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            modules: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// The catalog command implementation.
pub struct CatalogCommand<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> CatalogCommand<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Run the catalog command.
    pub fn run(&self, _options: &CatalogOptions) -> CatalogOutput {
        match self.store.load() {
            Ok(records) => CatalogOutput::success(
                records
                    .modules()
                    .into_iter()
                    .map(|m| ModuleInfo::from_module(m, &records))
                    .collect(),
            ),
            Err(e) => CatalogOutput::failure(e.to_string()),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &CatalogOutput, options: &CatalogOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            return serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string());
        }

        if !output.success {
            return format!(
                "Catalog failed: {}",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        if output.modules.is_empty() {
            return "No modules installed. Run 'dojo init' first.".to_string();
        }

        let mut lines = Vec::new();
        for module in &output.modules {
            lines.push(format!("{}. {} [{}]", module.order, module.title, module.id));
            for activity in &module.activities {
                lines.push(format!(
                    "   {:<22} {:<16} {:>3} XP  {}",
                    activity.id,
                    activity.activity_type.as_str(),
                    activity.xp_reward,
                    activity.skills.join(", ")
                ));
            }
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::records::fixtures::seeded;
    use crate::storage::MemoryRecordStore;

    #[test]
    fn test_catalog_lists_modules_in_order() {
        let cmd = CatalogCommand::new(MemoryRecordStore::with_records(seeded()));
        let output = cmd.run(&CatalogOptions::default());

        assert!(output.success);
        let ids: Vec<&str> = output.modules.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["mod-01", "mod-02"]);

        let first = &output.modules[0].activities[0];
        assert_eq!(first.id, "mod-01-learn");
        assert_eq!(first.skills, vec!["Data Cleaning", "Charts"]);
    }

    #[test]
    fn test_empty_catalog_hint() {
        let cmd = CatalogCommand::new(MemoryRecordStore::new());
        let output = cmd.run(&CatalogOptions::default());
        assert!(output.success);
        assert!(cmd
            .format_output(&output, &CatalogOptions::default())
            .contains("dojo init"));
    }

    #[test]
    fn test_json_output_uses_wire_names() {
        let cmd = CatalogCommand::new(MemoryRecordStore::with_records(seeded()));
        let options = CatalogOptions {
            json: true,
            ..CatalogOptions::default()
        };
        let output = cmd.run(&options);
        let json: serde_json::Value =
            serde_json::from_str(&cmd.format_output(&output, &options)).unwrap();
        assert_eq!(json["modules"][0]["activities"][0]["type"], "LEARN_QUIZ");
    }
}
