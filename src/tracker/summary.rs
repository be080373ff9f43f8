//! Summary reporter: aggregate view of a learner's proficiency records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::ProficiencyLevel;
use crate::error::Result;
use crate::storage::{RecordStore, Records};

/// Category used for records whose skill has left the catalog.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// One skill as shown on the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkillStanding {
    pub skill_name: String,
    pub proficiency_level: ProficiencyLevel,
}

/// Skills of one category in record insertion order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryGroup {
    pub category: String,
    pub skills: Vec<SkillStanding>,
}

/// Aggregate proficiency view for one learner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProficiencySummary {
    pub total_skills: u32,
    /// Always holds all four levels.
    pub by_level: BTreeMap<ProficiencyLevel, u32>,
    /// Categories in order of first appearance.
    pub by_category: Vec<CategoryGroup>,
}

impl Default for ProficiencySummary {
    fn default() -> Self {
        Self {
            total_skills: 0,
            by_level: ProficiencyLevel::ALL.into_iter().map(|l| (l, 0)).collect(),
            by_category: Vec::new(),
        }
    }
}

impl ProficiencySummary {
    /// Count for a single level.
    pub fn count(&self, level: ProficiencyLevel) -> u32 {
        self.by_level.get(&level).copied().unwrap_or(0)
    }

    /// Skills listed under a category, if any.
    pub fn category(&self, name: &str) -> Option<&[SkillStanding]> {
        self.by_category
            .iter()
            .find(|g| g.category == name)
            .map(|g| g.skills.as_slice())
    }
}

/// Build the summary for `user_id` from a record snapshot.
///
/// A user without a profile gets the zero-valued summary.
pub fn summarize_records(records: &Records, user_id: &str) -> ProficiencySummary {
    let mut summary = ProficiencySummary::default();

    let Some((_, proficiencies)) = records.profile_with_proficiencies(user_id) else {
        return summary;
    };

    for record in proficiencies {
        summary.total_skills += 1;
        *summary.by_level.entry(record.proficiency_level).or_insert(0) += 1;

        let (category, skill_name) = match records.skill(&record.skill_id) {
            Some(skill) => (skill.category.clone(), skill.name.clone()),
            None => {
                tracing::warn!(
                    skill_id = %record.skill_id,
                    "proficiency references a skill missing from the catalog"
                );
                (UNCATEGORIZED.to_string(), record.skill_id.clone())
            }
        };

        let standing = SkillStanding {
            skill_name,
            proficiency_level: record.proficiency_level,
        };
        match summary
            .by_category
            .iter_mut()
            .find(|g| g.category == category)
        {
            Some(group) => group.skills.push(standing),
            None => summary.by_category.push(CategoryGroup {
                category,
                skills: vec![standing],
            }),
        }
    }

    summary
}

/// Reporter bound to a record store.
#[derive(Debug, Clone)]
pub struct SummaryReporter<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> SummaryReporter<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Summarize the proficiency records of `user_id`.
    pub fn summarize(&self, user_id: &str) -> Result<ProficiencySummary> {
        let records = self.store.load()?;
        Ok(summarize_records(&records, user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ProficiencyLevel::*;
    use crate::storage::records::fixtures::seeded;
    use crate::storage::MemoryRecordStore;

    fn reporter_with(levels: &[(&str, ProficiencyLevel)]) -> SummaryReporter<MemoryRecordStore> {
        let mut records = seeded();
        let (pid, _) = records.ensure_profile("ada");
        for (skill, level) in levels {
            records.create_proficiency(pid, skill, *level).unwrap();
        }
        SummaryReporter::new(MemoryRecordStore::with_records(records))
    }

    #[test]
    fn test_summary_totals() {
        let reporter = reporter_with(&[
            ("cleaning", Apprentice),
            ("viz", Master),
            ("sql", Novice),
        ]);

        let summary = reporter.summarize("ada").unwrap();

        assert_eq!(summary.total_skills, 3);
        assert_eq!(summary.count(Novice), 1);
        assert_eq!(summary.count(Apprentice), 1);
        assert_eq!(summary.count(Journeyman), 0);
        assert_eq!(summary.count(Master), 1);
        assert_eq!(summary.by_level.len(), 4);
    }

    #[test]
    fn test_summary_groups_by_category_in_insertion_order() {
        let mut records = seeded();
        records.upsert_skill(crate::core::Skill::new(
            "pivot",
            "Pivot Tables",
            "",
            "Data Wrangling",
        ));
        let (pid, _) = records.ensure_profile("ada");
        records.create_proficiency(pid, "viz", Novice).unwrap();
        records.create_proficiency(pid, "pivot", Master).unwrap();
        records.create_proficiency(pid, "cleaning", Apprentice).unwrap();
        let reporter = SummaryReporter::new(MemoryRecordStore::with_records(records));

        let summary = reporter.summarize("ada").unwrap();

        let categories: Vec<&str> = summary
            .by_category
            .iter()
            .map(|g| g.category.as_str())
            .collect();
        assert_eq!(categories, vec!["Visualization", "Data Wrangling"]);
        assert_eq!(
            summary.category("Data Wrangling").unwrap(),
            &[
                SkillStanding {
                    skill_name: "Pivot Tables".to_string(),
                    proficiency_level: Master
                },
                SkillStanding {
                    skill_name: "Data Cleaning".to_string(),
                    proficiency_level: Apprentice
                },
            ]
        );
    }

    #[test]
    fn test_summary_without_profile_is_zeroed() {
        let reporter = reporter_with(&[("sql", Master)]);
        let summary = reporter.summarize("nobody").unwrap();

        assert_eq!(summary, ProficiencySummary::default());
        assert_eq!(summary.total_skills, 0);
        for level in ProficiencyLevel::ALL {
            assert_eq!(summary.count(level), 0);
        }
        assert!(summary.by_category.is_empty());
    }

    #[test]
    fn test_summary_only_counts_own_records() {
        let mut records = seeded();
        let (ada, _) = records.ensure_profile("ada");
        let (bob, _) = records.ensure_profile("bob");
        records.create_proficiency(ada, "sql", Master).unwrap();
        records.create_proficiency(bob, "sql", Novice).unwrap();
        records.create_proficiency(bob, "viz", Novice).unwrap();

        let summary = summarize_records(&records, "ada");
        assert_eq!(summary.total_skills, 1);
        assert_eq!(summary.count(Master), 1);
        assert_eq!(summary.count(Novice), 0);
    }

    #[test]
    fn test_missing_skill_is_uncategorized() {
        let mut records = seeded();
        let (pid, _) = records.ensure_profile("ada");
        records.create_proficiency(pid, "retired-skill", Journeyman).unwrap();

        let summary = summarize_records(&records, "ada");
        assert_eq!(summary.count(Journeyman), 1);
        let group = summary.category(UNCATEGORIZED).unwrap();
        assert_eq!(group[0].skill_name, "retired-skill");
    }

    #[test]
    fn test_summary_json_shape() {
        let reporter = reporter_with(&[("sql", Master)]);
        let json = serde_json::to_value(reporter.summarize("ada").unwrap()).unwrap();

        assert_eq!(json["total_skills"], 1);
        assert_eq!(json["by_level"]["MASTER"], 1);
        assert_eq!(json["by_level"]["NOVICE"], 0);
        assert_eq!(json["by_category"][0]["category"], "Databases");
        assert_eq!(
            json["by_category"][0]["skills"][0]["proficiency_level"],
            "MASTER"
        );
    }
}
