//! Proficiency levels, activity types and the advancement rule table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DojoError, Result};

/// Highest score an activity can award.
pub const MAX_SCORE: u8 = 100;

/// Mastery of one skill by one learner.
///
/// Variants are declared in rank order, so the derived `Ord` matches
/// [`ProficiencyLevel::rank`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProficiencyLevel {
    #[default]
    Novice,
    Apprentice,
    Journeyman,
    Master,
}

impl ProficiencyLevel {
    /// All levels, lowest first.
    pub const ALL: [ProficiencyLevel; 4] = [
        ProficiencyLevel::Novice,
        ProficiencyLevel::Apprentice,
        ProficiencyLevel::Journeyman,
        ProficiencyLevel::Master,
    ];

    /// Ordinal rank, NOVICE=1 through MASTER=4.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Novice => 1,
            Self::Apprentice => 2,
            Self::Journeyman => 3,
            Self::Master => 4,
        }
    }

    /// Whether `self` strictly outranks `other`.
    pub fn outranks(&self, other: ProficiencyLevel) -> bool {
        self.rank() > other.rank()
    }

    /// Wire name, e.g. `"APPRENTICE"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Novice => "NOVICE",
            Self::Apprentice => "APPRENTICE",
            Self::Journeyman => "JOURNEYMAN",
            Self::Master => "MASTER",
        }
    }
}

impl fmt::Display for ProficiencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProficiencyLevel {
    type Err = DojoError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DojoError::invalid_input(format!("unknown proficiency level: {s}")))
    }
}

/// The four stages of the Learn → Practice → Apply → Assess progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityType {
    LearnQuiz,
    PracticeDrill,
    ApplyChallenge,
    AssessTest,
}

impl ActivityType {
    /// All activity types in progression order.
    pub const ALL: [ActivityType; 4] = [
        ActivityType::LearnQuiz,
        ActivityType::PracticeDrill,
        ActivityType::ApplyChallenge,
        ActivityType::AssessTest,
    ];

    /// Wire name, e.g. `"LEARN_QUIZ"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LearnQuiz => "LEARN_QUIZ",
            Self::PracticeDrill => "PRACTICE_DRILL",
            Self::ApplyChallenge => "APPLY_CHALLENGE",
            Self::AssessTest => "ASSESS_TEST",
        }
    }

    /// Short stage name used in generated ids and titles.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::LearnQuiz => "learn",
            Self::PracticeDrill => "practice",
            Self::ApplyChallenge => "apply",
            Self::AssessTest => "assess",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the advancement table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: ProficiencyLevel,
    pub activity: ActivityType,
    pub min_score: u8,
    pub to: ProficiencyLevel,
}

/// Advancement rules. NOVICE has no Apply/Assess rows: learners must pass a
/// quiz or drill before challenges count toward a skill.
pub const TRANSITIONS: [Transition; 5] = [
    Transition {
        from: ProficiencyLevel::Novice,
        activity: ActivityType::LearnQuiz,
        min_score: 80,
        to: ProficiencyLevel::Apprentice,
    },
    Transition {
        from: ProficiencyLevel::Novice,
        activity: ActivityType::PracticeDrill,
        min_score: 70,
        to: ProficiencyLevel::Apprentice,
    },
    Transition {
        from: ProficiencyLevel::Apprentice,
        activity: ActivityType::PracticeDrill,
        min_score: 90,
        to: ProficiencyLevel::Journeyman,
    },
    Transition {
        from: ProficiencyLevel::Apprentice,
        activity: ActivityType::ApplyChallenge,
        min_score: 80,
        to: ProficiencyLevel::Journeyman,
    },
    Transition {
        from: ProficiencyLevel::Journeyman,
        activity: ActivityType::AssessTest,
        min_score: 90,
        to: ProficiencyLevel::Master,
    },
];

/// Candidate level after passing an activity of `activity` type with `score`.
///
/// Applies at most one step. Combinations missing from [`TRANSITIONS`]
/// return `current` unchanged.
pub fn candidate_level(
    current: ProficiencyLevel,
    activity: ActivityType,
    score: u8,
) -> ProficiencyLevel {
    TRANSITIONS
        .iter()
        .find(|t| t.from == current && t.activity == activity && score >= t.min_score)
        .map(|t| t.to)
        .unwrap_or(current)
}

/// Reject scores above [`MAX_SCORE`].
pub fn validate_score(score: u8) -> Result<u8> {
    if score > MAX_SCORE {
        return Err(DojoError::invalid_input(format!(
            "score {score} is outside 0..={MAX_SCORE}"
        )));
    }
    Ok(score)
}
