//! Deterministic curriculum generation from a [`Book`].
//!
//! Each chapter becomes a module with four activities in fixed
//! Learn/Practice/Apply/Assess order. Every activity is tagged with the
//! skills of the chapter's sections.

use serde::{Deserialize, Serialize};

use crate::core::{Activity, ActivityContent, ActivityType, Module, Question, Skill};
use crate::curriculum::book::{Book, Chapter};
use crate::error::Result;
use crate::storage::Records;
use crate::util::slugify;

/// XP granted for the first completion of each activity type.
pub fn xp_reward(activity_type: ActivityType) -> u32 {
    match activity_type {
        ActivityType::LearnQuiz => 10,
        ActivityType::PracticeDrill => 20,
        ActivityType::ApplyChallenge => 30,
        ActivityType::AssessTest => 50,
    }
}

const DISTRACTOR: &str = "None of these sections";

/// Generated catalog content.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Curriculum {
    pub skills: Vec<Skill>,
    pub modules: Vec<Module>,
    pub activities: Vec<Activity>,
}

impl Curriculum {
    /// Write the curriculum into `records`, replacing entries with the same
    /// ids. Learner records are untouched.
    pub fn install(&self, records: &mut Records) -> Result<()> {
        for skill in &self.skills {
            records.upsert_skill(skill.clone());
        }
        for module in &self.modules {
            records.upsert_module(module.clone());
        }
        for activity in &self.activities {
            records.upsert_activity(activity.clone())?;
        }
        Ok(())
    }
}

fn module_id(index: usize) -> String {
    format!("mod-{:02}", index + 1)
}

/// One question per concept: which section of the chapter covers it.
fn section_questions(chapter: &Chapter, phrasing: impl Fn(&str) -> String) -> Vec<Question> {
    let mut options: Vec<String> = chapter.sections.iter().map(|s| s.title.to_string()).collect();
    options.push(DISTRACTOR.to_string());

    chapter
        .sections
        .iter()
        .enumerate()
        .flat_map(|(answer_index, section)| {
            let options = options.clone();
            let phrasing = &phrasing;
            section.concepts.iter().map(move |&concept| Question {
                prompt: phrasing(concept),
                options: options.clone(),
                answer_index,
            })
        })
        .collect()
}

fn all_concepts(chapter: &Chapter) -> Vec<&'static str> {
    chapter
        .sections
        .iter()
        .flat_map(|s| s.concepts.iter().copied())
        .collect()
}

fn content_for(chapter: &Chapter, activity_type: ActivityType) -> ActivityContent {
    let concepts = all_concepts(chapter);
    let dataset = format!("{}.csv", slugify(chapter.title));

    match activity_type {
        ActivityType::LearnQuiz => ActivityContent::Quiz {
            questions: section_questions(chapter, |concept| {
                format!("Which section introduces \"{concept}\"?")
            }),
        },
        ActivityType::PracticeDrill => ActivityContent::Drill {
            instructions: format!(
                "Load {} and practise: {}.",
                dataset,
                concepts.join(", ")
            ),
            starter_code: format!(
                "import pandas as pd\n\ndf = pd.read_csv(\"{dataset}\")\n\n# your code here\n"
            ),
            expected_output: format!(
                "A DataFrame demonstrating {}",
                concepts.first().copied().unwrap_or("the chapter topics")
            ),
        },
        ActivityType::ApplyChallenge => {
            let mut steps: Vec<String> = chapter
                .sections
                .iter()
                .map(|s| format!("{}: apply {}", s.title, s.concepts.join(", ")))
                .collect();
            steps.push("Summarize your findings in three sentences".to_string());
            ActivityContent::Challenge {
                brief: format!("Use {} on {} to answer a business question.", chapter.title, dataset),
                steps,
            }
        }
        ActivityType::AssessTest => {
            let questions = section_questions(chapter, |concept| {
                format!("In \"{}\", where is \"{concept}\" covered?", chapter.title)
            });
            let time_limit_minutes = (questions.len() as u32 * 2).max(10);
            ActivityContent::Test {
                questions,
                time_limit_minutes,
            }
        }
    }
}

fn stage_title(activity_type: ActivityType) -> &'static str {
    match activity_type {
        ActivityType::LearnQuiz => "Learn",
        ActivityType::PracticeDrill => "Practice",
        ActivityType::ApplyChallenge => "Apply",
        ActivityType::AssessTest => "Assess",
    }
}

/// Generate modules, activities and skills from `book`.
pub fn generate_curriculum(book: &Book) -> Curriculum {
    let mut curriculum = Curriculum::default();

    for (index, chapter) in book.chapters.iter().enumerate() {
        let module_id = module_id(index);
        curriculum.modules.push(Module {
            id: module_id.clone(),
            title: chapter.title.to_string(),
            description: chapter.summary.to_string(),
            order: index as u32 + 1,
        });

        let mut skill_ids: Vec<String> = Vec::new();
        for section in chapter.sections {
            let skill_id = slugify(section.skill.name);
            if !curriculum.skills.iter().any(|s| s.id == skill_id) {
                curriculum.skills.push(Skill::new(
                    skill_id.clone(),
                    section.skill.name,
                    section.skill.description,
                    section.skill.category,
                ));
            }
            if !skill_ids.contains(&skill_id) {
                skill_ids.push(skill_id);
            }
        }

        for (position, activity_type) in ActivityType::ALL.into_iter().enumerate() {
            curriculum.activities.push(Activity {
                id: format!("{}-{}", module_id, activity_type.stage()),
                title: format!("{}: {}", chapter.title, stage_title(activity_type)),
                activity_type,
                module_id: module_id.clone(),
                order: position as u32 + 1,
                xp_reward: xp_reward(activity_type),
                content: content_for(chapter, activity_type),
                skill_ids: skill_ids.clone(),
            });
        }
    }

    tracing::debug!(
        book = book.title,
        modules = curriculum.modules.len(),
        skills = curriculum.skills.len(),
        "generated curriculum"
    );
    curriculum
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curriculum::book::BOOK;

    #[test]
    fn test_one_module_per_chapter() {
        let curriculum = generate_curriculum(&BOOK);
        assert_eq!(curriculum.modules.len(), BOOK.chapters.len());
        assert_eq!(curriculum.modules[0].id, "mod-01");
        assert_eq!(curriculum.modules[0].order, 1);
        assert_eq!(curriculum.activities.len(), BOOK.chapters.len() * 4);
    }

    #[test]
    fn test_activity_sequence_per_module() {
        let curriculum = generate_curriculum(&BOOK);
        let first: Vec<(&str, ActivityType, u32)> = curriculum
            .activities
            .iter()
            .filter(|a| a.module_id == "mod-01")
            .map(|a| (a.id.as_str(), a.activity_type, a.xp_reward))
            .collect();
        assert_eq!(
            first,
            vec![
                ("mod-01-learn", ActivityType::LearnQuiz, 10),
                ("mod-01-practice", ActivityType::PracticeDrill, 20),
                ("mod-01-apply", ActivityType::ApplyChallenge, 30),
                ("mod-01-assess", ActivityType::AssessTest, 50),
            ]
        );
    }

    #[test]
    fn test_shared_skill_emitted_once() {
        let curriculum = generate_curriculum(&BOOK);
        let cleaning: Vec<&Skill> = curriculum
            .skills
            .iter()
            .filter(|s| s.id == "data-cleaning")
            .collect();
        assert_eq!(cleaning.len(), 1);

        let learn = curriculum
            .activities
            .iter()
            .find(|a| a.id == "mod-02-learn")
            .unwrap();
        assert_eq!(learn.skill_ids, vec!["data-cleaning"]);
    }

    #[test]
    fn test_generation_is_deterministic() {
        assert_eq!(generate_curriculum(&BOOK), generate_curriculum(&BOOK));
    }

    #[test]
    fn test_content_matches_type_and_validates() {
        let curriculum = generate_curriculum(&BOOK);
        for activity in &curriculum.activities {
            assert_eq!(activity.content.kind(), activity.activity_type);
            activity.validate().unwrap();
        }
    }

    #[test]
    fn test_quiz_covers_every_concept() {
        let curriculum = generate_curriculum(&BOOK);
        let quiz = &curriculum.activities[0];
        let questions = quiz.content.questions().unwrap();
        let concept_count: usize = BOOK.chapters[0].sections.iter().map(|s| s.concepts.len()).sum();
        assert_eq!(questions.len(), concept_count);
        assert!(questions[0].prompt.contains("rows and columns"));
        assert_eq!(questions[0].options.last().map(String::as_str), Some(DISTRACTOR));
    }

    #[test]
    fn test_install_into_records() {
        let curriculum = generate_curriculum(&BOOK);
        let mut records = Records::new();
        curriculum.install(&mut records).unwrap();

        assert_eq!(records.modules().len(), curriculum.modules.len());
        assert_eq!(records.activities().len(), curriculum.activities.len());
        assert_eq!(records.first_module_id().as_deref(), Some("mod-01"));

        // Installing twice replaces rather than duplicates
        curriculum.install(&mut records).unwrap();
        assert_eq!(records.skills().len(), curriculum.skills.len());
    }
}
