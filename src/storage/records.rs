//! The record set held by every store.
//!
//! `Records` is the unit a transaction operates on. It plays the role of the
//! relational tables: catalog tables are keyed by string id, learner tables
//! by store-assigned [`RecordId`] with composite-key lookups on
//! (profile, skill) and (profile, activity). Rows are kept in insertion
//! order.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::core::{
    Activity, Module, ProficiencyLevel, RecordId, Skill, UserActivityProgress, UserProfile,
    UserSkillProficiency,
};
use crate::error::{DojoError, Result};

/// Schema version written with every record set.
///
/// Increment when the persisted layout changes in a breaking way.
pub const RECORDS_SCHEMA_VERSION: u8 = 1;

/// Result of a conditional proficiency write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaiseOutcome {
    /// No record existed; one was created at this level.
    Created(ProficiencyLevel),
    /// The stored level was strictly lower and has been replaced.
    Raised {
        from: ProficiencyLevel,
        to: ProficiencyLevel,
    },
    /// The stored level already ranked at or above the candidate.
    Unchanged(ProficiencyLevel),
}

impl RaiseOutcome {
    /// Whether anything was written.
    pub fn is_write(&self) -> bool {
        !matches!(self, Self::Unchanged(_))
    }
}

/// All persisted tables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Records {
    pub schema_version: u8,
    next_id: RecordId,
    skills: Vec<Skill>,
    modules: Vec<Module>,
    activities: Vec<Activity>,
    profiles: Vec<UserProfile>,
    proficiencies: Vec<UserSkillProficiency>,
    progress: Vec<UserActivityProgress>,
}

impl Default for Records {
    fn default() -> Self {
        Self {
            schema_version: RECORDS_SCHEMA_VERSION,
            next_id: 1,
            skills: Vec::new(),
            modules: Vec::new(),
            activities: Vec::new(),
            profiles: Vec::new(),
            proficiencies: Vec::new(),
            progress: Vec::new(),
        }
    }
}

impl Records {
    /// An empty record set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject record sets written by a newer schema.
    pub fn check_schema(&self) -> Result<()> {
        if self.schema_version > RECORDS_SCHEMA_VERSION {
            return Err(DojoError::invalid_state(format!(
                "records use schema v{} but this build understands up to v{}",
                self.schema_version, RECORDS_SCHEMA_VERSION
            )));
        }
        Ok(())
    }

    fn allocate_id(&mut self) -> RecordId {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        id
    }

    // -------------------------------------------------------------------------
    // Catalog
    // -------------------------------------------------------------------------

    pub fn skills(&self) -> &[Skill] {
        &self.skills
    }

    pub fn skill(&self, id: &str) -> Option<&Skill> {
        self.skills.iter().find(|s| s.id == id)
    }

    /// Modules sorted by their `order` field.
    pub fn modules(&self) -> Vec<&Module> {
        let mut modules: Vec<&Module> = self.modules.iter().collect();
        modules.sort_by_key(|m| m.order);
        modules
    }

    pub fn module(&self, id: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.id == id)
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn activity(&self, id: &str) -> Option<&Activity> {
        self.activities.iter().find(|a| a.id == id)
    }

    /// Activities of a module sorted by their `order` field.
    pub fn activities_in_module(&self, module_id: &str) -> Vec<&Activity> {
        let mut activities: Vec<&Activity> = self
            .activities
            .iter()
            .filter(|a| a.module_id == module_id)
            .collect();
        activities.sort_by_key(|a| a.order);
        activities
    }

    /// Skills tagged on an activity. Unknown activity yields an empty list.
    pub fn activity_skills(&self, activity_id: &str) -> Vec<&Skill> {
        self.activity(activity_id)
            .map(|a| a.skill_ids.iter().filter_map(|id| self.skill(id)).collect())
            .unwrap_or_default()
    }

    /// The lowest-ordered module, if any.
    pub fn first_module_id(&self) -> Option<String> {
        self.modules().first().map(|m| m.id.clone())
    }

    /// The module following `module_id` in order.
    pub fn next_module_id(&self, module_id: &str) -> Option<String> {
        let modules = self.modules();
        let pos = modules.iter().position(|m| m.id == module_id)?;
        modules.get(pos + 1).map(|m| m.id.clone())
    }

    /// Insert or replace a skill by id.
    pub fn upsert_skill(&mut self, skill: Skill) {
        match self.skills.iter_mut().find(|s| s.id == skill.id) {
            Some(existing) => *existing = skill,
            None => self.skills.push(skill),
        }
    }

    /// Insert or replace a module by id.
    pub fn upsert_module(&mut self, module: Module) {
        match self.modules.iter_mut().find(|m| m.id == module.id) {
            Some(existing) => *existing = module,
            None => self.modules.push(module),
        }
    }

    /// Insert or replace an activity by id.
    ///
    /// The activity must be well formed and reference an existing module
    /// and existing skills.
    pub fn upsert_activity(&mut self, activity: Activity) -> Result<()> {
        activity.validate()?;

        if self.module(&activity.module_id).is_none() {
            return Err(DojoError::catalog(format!(
                "activity {} references unknown module {}",
                activity.id, activity.module_id
            )));
        }
        if let Some(missing) = activity.skill_ids.iter().find(|id| self.skill(id).is_none()) {
            return Err(DojoError::catalog(format!(
                "activity {} references unknown skill {}",
                activity.id, missing
            )));
        }

        match self.activities.iter_mut().find(|a| a.id == activity.id) {
            Some(existing) => *existing = activity,
            None => self.activities.push(activity),
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Profiles
    // -------------------------------------------------------------------------

    pub fn find_profile(&self, user_id: &str) -> Option<&UserProfile> {
        self.profiles.iter().find(|p| p.user_id == user_id)
    }

    pub fn find_profile_mut(&mut self, user_id: &str) -> Option<&mut UserProfile> {
        self.profiles.iter_mut().find(|p| p.user_id == user_id)
    }

    /// Return the profile id for `user_id`, creating the profile if absent.
    /// The flag is true when a profile was created.
    pub fn ensure_profile(&mut self, user_id: &str) -> (RecordId, bool) {
        if let Some(profile) = self.find_profile(user_id) {
            return (profile.id, false);
        }
        let id = self.allocate_id();
        let first_module = self.first_module_id();
        self.profiles
            .push(UserProfile::new(id, user_id, first_module));
        (id, true)
    }

    /// A profile with its proficiency records in insertion order.
    pub fn profile_with_proficiencies(
        &self,
        user_id: &str,
    ) -> Option<(&UserProfile, Vec<&UserSkillProficiency>)> {
        let profile = self.find_profile(user_id)?;
        let records = self
            .proficiencies
            .iter()
            .filter(|p| p.profile_id == profile.id)
            .collect();
        Some((profile, records))
    }

    // -------------------------------------------------------------------------
    // Skill proficiency
    // -------------------------------------------------------------------------

    /// Find by the (profile, skill) composite key.
    pub fn find_proficiency(
        &self,
        profile_id: RecordId,
        skill_id: &str,
    ) -> Option<&UserSkillProficiency> {
        self.proficiencies
            .iter()
            .find(|p| p.profile_id == profile_id && p.skill_id == skill_id)
    }

    /// Create a proficiency record. Fails if the composite key is taken.
    pub fn create_proficiency(
        &mut self,
        profile_id: RecordId,
        skill_id: &str,
        level: ProficiencyLevel,
    ) -> Result<RecordId> {
        if self.find_proficiency(profile_id, skill_id).is_some() {
            return Err(DojoError::invalid_state(format!(
                "proficiency for profile {profile_id} and skill {skill_id} already exists"
            )));
        }
        let id = self.allocate_id();
        self.proficiencies.push(UserSkillProficiency {
            id,
            profile_id,
            skill_id: skill_id.to_string(),
            proficiency_level: level,
            updated_at: Utc::now(),
        });
        Ok(id)
    }

    /// Compare-and-set: store `candidate` only if it strictly outranks the
    /// stored level, creating the record if none exists.
    pub fn raise_proficiency(
        &mut self,
        profile_id: RecordId,
        skill_id: &str,
        candidate: ProficiencyLevel,
    ) -> Result<RaiseOutcome> {
        let existing = self
            .proficiencies
            .iter_mut()
            .find(|p| p.profile_id == profile_id && p.skill_id == skill_id);

        match existing {
            Some(record) if candidate.outranks(record.proficiency_level) => {
                let from = record.proficiency_level;
                record.proficiency_level = candidate;
                record.updated_at = Utc::now();
                Ok(RaiseOutcome::Raised { from, to: candidate })
            }
            Some(record) => Ok(RaiseOutcome::Unchanged(record.proficiency_level)),
            None => {
                self.create_proficiency(profile_id, skill_id, candidate)?;
                Ok(RaiseOutcome::Created(candidate))
            }
        }
    }

    // -------------------------------------------------------------------------
    // Activity progress
    // -------------------------------------------------------------------------

    /// Find by the (profile, activity) composite key.
    pub fn find_progress(
        &self,
        profile_id: RecordId,
        activity_id: &str,
    ) -> Option<&UserActivityProgress> {
        self.progress
            .iter()
            .find(|p| p.profile_id == profile_id && p.activity_id == activity_id)
    }

    /// Progress record for (profile, activity), created empty if absent.
    pub fn progress_entry(
        &mut self,
        profile_id: RecordId,
        activity_id: &str,
    ) -> &mut UserActivityProgress {
        let pos = match self
            .progress
            .iter()
            .position(|p| p.profile_id == profile_id && p.activity_id == activity_id)
        {
            Some(pos) => pos,
            None => {
                let id = self.allocate_id();
                self.progress
                    .push(UserActivityProgress::new(id, profile_id, activity_id));
                self.progress.len() - 1
            }
        };
        &mut self.progress[pos]
    }

    /// Whether every activity in the module is completed by the profile.
    /// A module without activities is never complete.
    pub fn module_completed(&self, profile_id: RecordId, module_id: &str) -> bool {
        let activities = self.activities_in_module(module_id);
        !activities.is_empty()
            && activities.iter().all(|a| {
                self.find_progress(profile_id, &a.id)
                    .is_some_and(|p| p.completed)
            })
    }
}
