//! The built-in content tree the curriculum is generated from.

/// A skill named by a book section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkillEntry {
    pub name: &'static str,
    pub category: &'static str,
    pub description: &'static str,
}

/// A section of a chapter: one skill and the concepts that train it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub title: &'static str,
    pub skill: SkillEntry,
    pub concepts: &'static [&'static str],
}

/// A chapter becomes one module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chapter {
    pub title: &'static str,
    pub summary: &'static str,
    pub sections: &'static [Section],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Book {
    pub title: &'static str,
    pub chapters: &'static [Chapter],
}

const DATA_CLEANING: SkillEntry = SkillEntry {
    name: "Data Cleaning",
    category: "Data Wrangling",
    description: "Detect and repair missing, malformed and mistyped values.",
};

pub const BOOK: Book = Book {
    title: "Data Analysis Dojo",
    chapters: &[
        Chapter {
            title: "Foundations of Data Analysis",
            summary: "Load tabular data and describe it with summary statistics.",
            sections: &[
                Section {
                    title: "Tabular Data",
                    skill: SkillEntry {
                        name: "DataFrames",
                        category: "Data Wrangling",
                        description: "Load, inspect and select from tabular data.",
                    },
                    concepts: &["rows and columns", "index labels", "column dtypes"],
                },
                Section {
                    title: "Descriptive Statistics",
                    skill: SkillEntry {
                        name: "Summary Statistics",
                        category: "Statistics",
                        description: "Summarize distributions with center and spread.",
                    },
                    concepts: &["mean", "median", "standard deviation"],
                },
            ],
        },
        Chapter {
            title: "Cleaning Data",
            summary: "Turn messy exports into analysis-ready tables.",
            sections: &[
                Section {
                    title: "Missing Values",
                    skill: DATA_CLEANING,
                    concepts: &["dropna", "fillna", "imputation"],
                },
                Section {
                    title: "Type Conversion",
                    skill: DATA_CLEANING,
                    concepts: &["astype", "to_datetime", "categorical columns"],
                },
            ],
        },
        Chapter {
            title: "Reshaping and Aggregation",
            summary: "Group, pivot and join tables to answer questions.",
            sections: &[
                Section {
                    title: "Group By",
                    skill: SkillEntry {
                        name: "Aggregation",
                        category: "Data Wrangling",
                        description: "Split-apply-combine with groupby and pivot tables.",
                    },
                    concepts: &["groupby", "agg", "pivot_table"],
                },
                Section {
                    title: "Joins",
                    skill: SkillEntry {
                        name: "Joining Data",
                        category: "Data Wrangling",
                        description: "Combine tables on shared keys.",
                    },
                    concepts: &["merge keys", "inner join", "left join"],
                },
            ],
        },
        Chapter {
            title: "Visualization",
            summary: "Choose the right chart and tell a clear story with it.",
            sections: &[
                Section {
                    title: "Charts",
                    skill: SkillEntry {
                        name: "Charting",
                        category: "Visualization",
                        description: "Plot distributions, comparisons and relationships.",
                    },
                    concepts: &["bar charts", "histograms", "scatter plots"],
                },
                Section {
                    title: "Storytelling",
                    skill: SkillEntry {
                        name: "Data Storytelling",
                        category: "Communication",
                        description: "Shape findings for a specific audience.",
                    },
                    concepts: &["audience", "annotations"],
                },
            ],
        },
        Chapter {
            title: "Inferential Statistics",
            summary: "Draw conclusions about populations from samples.",
            sections: &[Section {
                title: "Hypothesis Testing",
                skill: SkillEntry {
                    name: "Hypothesis Testing",
                    category: "Statistics",
                    description: "Frame and test claims with p-values and intervals.",
                },
                concepts: &["null hypothesis", "p-values", "confidence intervals"],
            }],
        },
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_section_has_concepts() {
        for chapter in BOOK.chapters {
            assert!(!chapter.sections.is_empty(), "{} is empty", chapter.title);
            for section in chapter.sections {
                assert!(!section.concepts.is_empty(), "{} has no concepts", section.title);
            }
        }
    }

    #[test]
    fn test_shared_skill_entry() {
        let cleaning = &BOOK.chapters[1];
        assert_eq!(cleaning.sections[0].skill, cleaning.sections[1].skill);
    }
}
