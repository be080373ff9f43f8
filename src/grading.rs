//! Submission grading.
//!
//! Grading is mocked: no learner code is ever executed. Quizzes and tests
//! are scored by comparing selected answers with the answer key; drills and
//! challenges take the score reported with the submission.

use serde::{Deserialize, Serialize};

use crate::core::{validate_score, Activity};
use crate::error::{DojoError, Result};

/// Default passing score.
pub const DEFAULT_PASS_THRESHOLD: u8 = 70;

/// What a learner handed in for an activity.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Submission {
    /// Self-reported or externally computed score.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    /// Selected option index per question, for quizzes and tests.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub answers: Vec<usize>,
    /// Submitted code for drills and challenges. Recorded, never run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl Submission {
    pub fn with_score(score: u8) -> Self {
        Self {
            score: Some(score),
            ..Self::default()
        }
    }

    pub fn with_answers(answers: Vec<usize>) -> Self {
        Self {
            answers,
            ..Self::default()
        }
    }
}

/// Outcome of grading a submission.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Grade {
    pub passed: bool,
    pub score: u8,
}

impl Grade {
    /// Build a grade, rejecting scores above 100.
    pub fn new(passed: bool, score: u8) -> Result<Self> {
        Ok(Self {
            passed,
            score: validate_score(score)?,
        })
    }
}

/// Scores a submission for an activity.
pub trait Grader {
    fn grade(&self, activity: &Activity, submission: &Submission) -> Result<Grade>;
}

/// Grader that passes any score at or above a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdGrader {
    pass_threshold: u8,
}

impl Default for ThresholdGrader {
    fn default() -> Self {
        Self {
            pass_threshold: DEFAULT_PASS_THRESHOLD,
        }
    }
}

impl ThresholdGrader {
    pub fn new(pass_threshold: u8) -> Result<Self> {
        Ok(Self {
            pass_threshold: validate_score(pass_threshold)?,
        })
    }

    pub fn pass_threshold(&self) -> u8 {
        self.pass_threshold
    }

    fn answer_score(activity: &Activity, answers: &[usize]) -> Option<Result<u8>> {
        let questions = activity.content.questions()?;
        if answers.is_empty() {
            return None;
        }
        if questions.is_empty() {
            return Some(Err(DojoError::catalog(format!(
                "activity {} has no questions to grade",
                activity.id
            ))));
        }
        if answers.len() > questions.len() {
            return Some(Err(DojoError::invalid_input(format!(
                "{} answers submitted for {} questions",
                answers.len(),
                questions.len()
            ))));
        }

        let correct = questions
            .iter()
            .zip(answers)
            .filter(|(q, a)| q.answer_index == **a)
            .count();
        let pct = (correct * 100 / questions.len()) as u8;
        Some(Ok(pct))
    }
}

impl Grader for ThresholdGrader {
    fn grade(&self, activity: &Activity, submission: &Submission) -> Result<Grade> {
        let score = match Self::answer_score(activity, &submission.answers) {
            Some(score) => score?,
            None => validate_score(submission.score.unwrap_or(0))?,
        };
        tracing::debug!(activity_id = %activity.id, score, "graded submission");
        Grade::new(score >= self.pass_threshold, score)
    }
}
