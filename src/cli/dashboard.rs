//! Dashboard command.
//!
//! Shows a learner's profile (created on first visit) together with the
//! proficiency summary.

use serde::{Deserialize, Serialize};

use crate::core::{ProficiencyLevel, UserProfile};
use crate::error::Result;
use crate::storage::{RecordStore, Records};
use crate::tracker::{open_profile, summarize_records, ProficiencySummary};

/// Options for the dashboard command.
#[derive(Debug, Clone, Default)]
pub struct DashboardOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Profile fields shown on the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileInfo {
    pub user_id: String,
    pub level: u32,
    pub xp: u32,
    /// XP still needed for the next level.
    pub xp_to_next_level: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_module_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_module_title: Option<String>,
    pub completed_activities: usize,
    pub total_activities: usize,
    pub created: String,
}

impl ProfileInfo {
    fn from_profile(profile: &UserProfile, records: &Records, xp_per_level: u32) -> Self {
        let xp_per_level = xp_per_level.max(1);
        let completed_activities = records
            .activities()
            .iter()
            .filter(|a| {
                records
                    .find_progress(profile.id, &a.id)
                    .is_some_and(|p| p.completed)
            })
            .count();

        Self {
            user_id: profile.user_id.clone(),
            level: profile.level,
            xp: profile.xp,
            xp_to_next_level: xp_per_level - profile.xp % xp_per_level,
            current_module_id: profile.current_module_id.clone(),
            current_module_title: profile
                .current_module_id
                .as_deref()
                .and_then(|id| records.module(id))
                .map(|m| m.title.clone()),
            completed_activities,
            total_activities: records.activities().len(),
            created: profile.created_at.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Output format for the dashboard command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardOutput {
    pub success: bool,
    /// True when this visit created the profile.
    pub profile_created: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<ProfileInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ProficiencySummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DashboardOutput {
    pub fn success(profile: ProfileInfo, summary: ProficiencySummary, created: bool) -> Self {
        Self {
            success: true,
            profile_created: created,
            profile: Some(profile),
            summary: Some(summary),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            profile_created: false,
            profile: None,
            summary: None,
            error: Some(error.into()),
        }
    }
}

/// Render the per-level counts and category groups.
pub(crate) fn format_summary(summary: &ProficiencySummary, lines: &mut Vec<String>) {
    let counts: Vec<String> = ProficiencyLevel::ALL
        .into_iter()
        .map(|level| format!("{}: {}", level, summary.count(level)))
        .collect();
    lines.push(format!(
        "Skills tracked: {} ({})",
        summary.total_skills,
        counts.join(" | ")
    ));

    for group in &summary.by_category {
        lines.push(format!("  {}", group.category));
        for skill in &group.skills {
            lines.push(format!(
                "    {:<24} {}",
                skill.skill_name, skill.proficiency_level
            ));
        }
    }
}

/// The dashboard command implementation.
pub struct DashboardCommand<S: RecordStore> {
    store: S,
    xp_per_level: u32,
}

impl<S: RecordStore> DashboardCommand<S> {
    pub fn new(store: S, xp_per_level: u32) -> Self {
        Self {
            store,
            xp_per_level,
        }
    }

    fn load(&self, user_id: &str) -> Result<DashboardOutput> {
        let (profile, created) = open_profile(&self.store, user_id)?;
        let records = self.store.load()?;
        let summary = summarize_records(&records, user_id);
        Ok(DashboardOutput::success(
            ProfileInfo::from_profile(&profile, &records, self.xp_per_level),
            summary,
            created,
        ))
    }

    /// Run the dashboard command.
    pub fn run(&self, user_id: &str, _options: &DashboardOptions) -> DashboardOutput {
        self.load(user_id)
            .unwrap_or_else(|e| DashboardOutput::failure(e.to_string()))
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &DashboardOutput, options: &DashboardOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            return serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string());
        }

        let (Some(profile), Some(summary)) = (&output.profile, &output.summary) else {
            return format!(
                "Dashboard failed: {}",
                output.error.as_deref().unwrap_or("unknown error")
            );
        };

        let mut lines = vec![format!("=== Dojo Dashboard: {} ===", profile.user_id)];
        if output.profile_created {
            lines.push("Welcome! A new profile was created.".to_string());
        }
        lines.push(format!(
            "Level {} | {} XP ({} to next level)",
            profile.level, profile.xp, profile.xp_to_next_level
        ));
        lines.push(format!(
            "Activities completed: {}/{}",
            profile.completed_activities, profile.total_activities
        ));
        match (&profile.current_module_title, &profile.current_module_id) {
            (Some(title), Some(id)) => lines.push(format!("Current module: {} [{}]", title, id)),
            (None, Some(id)) => lines.push(format!("Current module: {}", id)),
            _ => lines.push("Current module: none".to_string()),
        }
        lines.push(String::new());
        format_summary(summary, &mut lines);

        lines.join("\n")
    }
}
