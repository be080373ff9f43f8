//! Catalog reference data: skills, modules and activities.
//!
//! Catalog entries are created by curriculum authors and are read-only to
//! learners. Activity content is a tagged union so every activity type
//! carries exactly the payload it needs.

use serde::{Deserialize, Serialize};

use crate::core::proficiency::ActivityType;
use crate::error::{DojoError, Result};

/// A skill that activities can train.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Skill {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Grouping used by the skills dashboard, e.g. "Data Wrangling".
    pub category: String,
}

impl Skill {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            category: category.into(),
        }
    }
}

/// An ordered collection of activities grouped around a topic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Module {
    pub id: String,
    pub title: String,
    pub description: String,
    pub order: u32,
}

/// A multiple-choice question used by quizzes and tests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Question {
    pub prompt: String,
    pub options: Vec<String>,
    /// Index into `options` of the correct answer.
    pub answer_index: usize,
}

/// Activity payload, one variant per [`ActivityType`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActivityContent {
    Quiz {
        questions: Vec<Question>,
    },
    Drill {
        instructions: String,
        starter_code: String,
        expected_output: String,
    },
    Challenge {
        brief: String,
        steps: Vec<String>,
    },
    Test {
        questions: Vec<Question>,
        time_limit_minutes: u32,
    },
}

impl ActivityContent {
    /// The activity type this payload belongs to.
    pub fn kind(&self) -> ActivityType {
        match self {
            Self::Quiz { .. } => ActivityType::LearnQuiz,
            Self::Drill { .. } => ActivityType::PracticeDrill,
            Self::Challenge { .. } => ActivityType::ApplyChallenge,
            Self::Test { .. } => ActivityType::AssessTest,
        }
    }

    /// Multiple-choice questions, if this payload is gradable by answers.
    pub fn questions(&self) -> Option<&[Question]> {
        match self {
            Self::Quiz { questions } | Self::Test { questions, .. } => Some(questions),
            Self::Drill { .. } | Self::Challenge { .. } => None,
        }
    }
}

/// A single learning activity inside a module.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Activity {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub module_id: String,
    /// Position inside the module, starting at 1.
    pub order: u32,
    pub xp_reward: u32,
    pub content: ActivityContent,
    /// Skills trained by this activity. May be empty.
    #[serde(default)]
    pub skill_ids: Vec<String>,
}

impl Activity {
    /// Check that the content payload matches the declared type and that
    /// quiz answers point at real options.
    pub fn validate(&self) -> Result<()> {
        if self.content.kind() != self.activity_type {
            return Err(DojoError::catalog(format!(
                "activity {} is {} but carries {} content",
                self.id,
                self.activity_type,
                self.content.kind()
            )));
        }

        if let Some(questions) = self.content.questions() {
            for (i, question) in questions.iter().enumerate() {
                if question.answer_index >= question.options.len() {
                    return Err(DojoError::catalog(format!(
                        "activity {} question {} has answer index {} but {} options",
                        self.id,
                        i + 1,
                        question.answer_index,
                        question.options.len()
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiz(answer_index: usize) -> ActivityContent {
        ActivityContent::Quiz {
            questions: vec![Question {
                prompt: "What does df.head() return?".to_string(),
                options: vec!["First rows".to_string(), "Last rows".to_string()],
                answer_index,
            }],
        }
    }

    fn activity(activity_type: ActivityType, content: ActivityContent) -> Activity {
        Activity {
            id: "a1".to_string(),
            title: "Intro".to_string(),
            activity_type,
            module_id: "mod-01".to_string(),
            order: 1,
            xp_reward: 10,
            content,
            skill_ids: vec!["pandas".to_string()],
        }
    }

    #[test]
    fn test_content_kind() {
        assert_eq!(quiz(0).kind(), ActivityType::LearnQuiz);
        let drill = ActivityContent::Drill {
            instructions: String::new(),
            starter_code: String::new(),
            expected_output: String::new(),
        };
        assert_eq!(drill.kind(), ActivityType::PracticeDrill);
        assert!(drill.questions().is_none());
    }

    #[test]
    fn test_validate_accepts_matching_content() {
        assert!(activity(ActivityType::LearnQuiz, quiz(0)).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_mismatched_content() {
        let err = activity(ActivityType::AssessTest, quiz(0))
            .validate()
            .unwrap_err();
        assert!(matches!(err, DojoError::Catalog { .. }));
    }

    #[test]
    fn test_validate_rejects_bad_answer_index() {
        assert!(activity(ActivityType::LearnQuiz, quiz(5)).validate().is_err());
    }

    #[test]
    fn test_activity_json_shape() {
        let json = serde_json::to_value(activity(ActivityType::LearnQuiz, quiz(0))).unwrap();
        assert_eq!(json["type"], "LEARN_QUIZ");
        assert_eq!(json["content"]["kind"], "quiz");
    }

    #[test]
    fn test_skill_ids_default_to_empty() {
        let json = r#"{
            "id": "a2", "title": "Brief", "type": "APPLY_CHALLENGE",
            "module_id": "mod-01", "order": 3, "xp_reward": 30,
            "content": {"kind": "challenge", "brief": "Clean it", "steps": []}
        }"#;
        let parsed: Activity = serde_json::from_str(json).unwrap();
        assert!(parsed.skill_ids.is_empty());
        assert!(parsed.validate().is_ok());
    }
}
