use std::collections::{HashMap, HashSet};

use crate::quiz::fallback::builtin_questions;
use crate::quiz::source::{QuestionSource, RawRow};
use crate::quiz::{AnswerKey, Options, Question, QuizError};

/// Used by `list_categories` when the bank holds nothing.
pub const CANONICAL_CATEGORIES: [&str; 7] = [
    "funfacts",
    "psychology",
    "math",
    "science",
    "history",
    "english",
    "general",
];

/// All loaded questions plus the per-category counts derived from them.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    questions: Vec<Question>,
    counts: HashMap<String, usize>,
}

/// Outcome of loading a bank from a source.
#[derive(Debug)]
pub enum BankLoadResult {
    Loaded(QuestionBank),
    /// The source couldn't be used; `bank` holds the built-in set.
    Fallback {
        reason: QuizError,
        bank: QuestionBank,
    },
}

impl BankLoadResult {
    pub fn into_bank(self) -> QuestionBank {
        match self {
            BankLoadResult::Loaded(bank) => bank,
            BankLoadResult::Fallback { bank, .. } => bank,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, BankLoadResult::Fallback { .. })
    }
}

impl QuestionBank {
    pub fn new(questions: Vec<Question>) -> Self {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for question in &questions {
            *counts.entry(question.category.clone()).or_default() += 1;
        }
        Self { questions, counts }
    }

    pub fn builtin() -> Self {
        Self::new(builtin_questions())
    }

    /// Builds a bank from `source`. Never fails: an unreadable, malformed or
    /// empty source yields the built-in set instead.
    pub fn load(source: &impl QuestionSource) -> BankLoadResult {
        let rows = match source.rows() {
            Ok(rows) => rows,
            Err(reason) => {
                log::warn!("Falling back to built-in questions: {}", reason);
                return BankLoadResult::Fallback {
                    reason,
                    bank: Self::builtin(),
                };
            }
        };

        let total_rows = rows.len();
        let mut seen = HashSet::new();
        let questions: Vec<Question> = rows
            .iter()
            .filter_map(question_from_row)
            .filter(|q| {
                if seen.insert(q.id.clone()) {
                    return true;
                }
                log::warn!("Dropping duplicate question id '{}'", q.id);
                false
            })
            .collect();

        if questions.is_empty() {
            log::warn!(
                "None of the {} source rows were usable, falling back to built-in questions",
                total_rows
            );
            return BankLoadResult::Fallback {
                reason: QuizError::ParseFailure("no valid rows in source".to_string()),
                bank: Self::builtin(),
            };
        }

        log::info!(
            "Loaded {} questions ({} rows read) in {} categories",
            questions.len(),
            total_rows,
            questions
                .iter()
                .map(|q| q.category.as_str())
                .collect::<HashSet<_>>()
                .len()
        );
        BankLoadResult::Loaded(Self::new(questions))
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Every question in `category`, in bank order.
    pub fn pool(&self, category: &str) -> Vec<&Question> {
        self.questions
            .iter()
            .filter(|q| q.category == category)
            .collect()
    }

    pub fn count_of(&self, category: &str) -> usize {
        self.counts.get(category).copied().unwrap_or(0)
    }

    /// Distinct categories in order of first appearance.
    pub fn list_categories(&self) -> Vec<String> {
        if self.questions.is_empty() {
            return CANONICAL_CATEGORIES.iter().map(|c| c.to_string()).collect();
        }

        let mut seen = HashSet::new();
        self.questions
            .iter()
            .filter(|q| seen.insert(q.category.as_str()))
            .map(|q| q.category.clone())
            .collect()
    }
}

fn cell(row: &RawRow, column: &str) -> String {
    row.get(column)
        .map(|value| value.trim().to_string())
        .unwrap_or_default()
}

fn question_from_row(row: &RawRow) -> Option<Question> {
    let id = cell(row, "id");
    let text = cell(row, "question");
    if id.is_empty() || text.is_empty() {
        return None;
    }

    let correct_answer = match cell(row, "correctAnswer").parse::<AnswerKey>() {
        Ok(key) => key,
        Err(err) => {
            log::warn!("Skipping question '{}': {}", id, err);
            return None;
        }
    };

    Some(Question {
        id,
        category: cell(row, "category"),
        text,
        options: Options {
            a: cell(row, "optionA"),
            b: cell(row, "optionB"),
            c: cell(row, "optionC"),
            d: cell(row, "optionD"),
        },
        correct_answer,
        explanation: cell(row, "explanation"),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::quiz::Result;

    pub(crate) fn row(id: &str, category: &str, question: &str) -> RawRow {
        [
            ("id", id),
            ("category", category),
            ("question", question),
            ("optionA", "one"),
            ("optionB", "two"),
            ("optionC", "three"),
            ("optionD", "four"),
            ("correctAnswer", "C"),
            ("explanation", "because"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    struct BrokenSource;

    impl QuestionSource for BrokenSource {
        fn rows(&self) -> Result<Vec<RawRow>> {
            Err(QuizError::SourceUnavailable("gone".to_string()))
        }
    }

    #[test]
    fn loads_rows_and_counts_categories() {
        let rows = vec![
            row("F1", "funfacts", "q1"),
            row("F2", "funfacts", "q2"),
            row("M1", "math", "q3"),
        ];
        let result = QuestionBank::load(&rows);
        assert!(!result.is_fallback());

        let bank = result.into_bank();
        assert_eq!(bank.len(), 3);
        assert_eq!(bank.count_of("funfacts"), 2);
        assert_eq!(bank.count_of("math"), 1);
        assert_eq!(bank.count_of("history"), 0);
        assert_eq!(bank.get("M1").unwrap().correct_answer, AnswerKey::C);
        assert_eq!(bank.list_categories(), vec!["funfacts", "math"]);
    }

    #[test]
    fn rows_without_id_or_question_are_dropped() {
        let mut no_id = row("", "funfacts", "q1");
        no_id.remove("id");
        let rows = vec![
            no_id,
            row("F2", "funfacts", "   "),
            row("F3", "funfacts", "kept"),
        ];
        let bank = QuestionBank::load(&rows).into_bank();
        assert_eq!(bank.len(), 1);
        assert_eq!(bank.questions()[0].id, "F3");
    }

    #[test]
    fn bad_answer_key_and_duplicates_are_dropped() {
        let mut bad = row("F1", "funfacts", "q1");
        bad.insert("correctAnswer".to_string(), "Z".to_string());
        let rows = vec![
            bad,
            row("F2", "funfacts", "first"),
            row("F2", "funfacts", "second"),
        ];
        let bank = QuestionBank::load(&rows).into_bank();
        assert_eq!(bank.len(), 1);
        assert_eq!(bank.get("F2").unwrap().text, "first");
        assert_eq!(bank.count_of("funfacts"), 1);
    }

    #[test]
    fn all_invalid_rows_fall_back_to_builtin() {
        let rows = vec![row("", "funfacts", "q1"), row("F2", "funfacts", "")];
        let result = QuestionBank::load(&rows);
        assert!(result.is_fallback());

        let bank = result.into_bank();
        assert_eq!(bank.questions(), QuestionBank::builtin().questions());
        let categories = bank.list_categories();
        assert!(categories.contains(&"funfacts".to_string()));
        assert!(categories.contains(&"psychology".to_string()));
    }

    #[test]
    fn unreadable_source_falls_back() {
        match QuestionBank::load(&BrokenSource) {
            BankLoadResult::Fallback { reason, bank } => {
                assert!(matches!(reason, QuizError::SourceUnavailable(_)));
                assert_eq!(bank.len(), 2);
            }
            BankLoadResult::Loaded(_) => panic!("expected fallback"),
        }
    }

    #[test]
    fn empty_bank_lists_canonical_categories() {
        let bank = QuestionBank::default();
        assert_eq!(
            bank.list_categories(),
            vec!["funfacts", "psychology", "math", "science", "history", "english", "general"]
        );
    }
}
