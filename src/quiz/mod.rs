pub mod bank;
pub mod error;
pub mod fallback;
pub mod sampler;
pub mod service;
pub mod source;
pub mod storage;
pub mod usage;

use std::fmt;
use std::str::FromStr;

pub use error::{QuizError, Result};

/// One of the four answer slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum AnswerKey {
    A,
    B,
    C,
    D,
}

impl FromStr for AnswerKey {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(AnswerKey::A),
            "B" => Ok(AnswerKey::B),
            "C" => Ok(AnswerKey::C),
            "D" => Ok(AnswerKey::D),
            other => Err(QuizError::ParseFailure(format!(
                "'{}' is not one of A, B, C, D",
                other
            ))),
        }
    }
}

impl fmt::Display for AnswerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = match self {
            AnswerKey::A => "A",
            AnswerKey::B => "B",
            AnswerKey::C => "C",
            AnswerKey::D => "D",
        };
        f.write_str(key)
    }
}

/// The four answer texts, serialized with `A`..`D` as keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Options {
    #[serde(rename = "A")]
    pub a: String,
    #[serde(rename = "B")]
    pub b: String,
    #[serde(rename = "C")]
    pub c: String,
    #[serde(rename = "D")]
    pub d: String,
}

impl Options {
    pub fn get(&self, key: AnswerKey) -> &str {
        match key {
            AnswerKey::A => &self.a,
            AnswerKey::B => &self.b,
            AnswerKey::C => &self.c,
            AnswerKey::D => &self.d,
        }
    }
}

/// A question as it lives in the bank. Never mutated after loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: String,
    pub category: String,
    pub text: String,
    pub options: Options,
    pub correct_answer: AnswerKey,
    pub explanation: String,
}

impl Question {
    pub fn view(&self) -> QuestionView {
        QuestionView {
            id: self.id.clone(),
            question: self.text.clone(),
            options: self.options.clone(),
            correct_answer: self.correct_answer,
            explanation: self.explanation.clone(),
        }
    }
}

/// What callers get back from the service.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub id: String,
    pub question: String,
    pub options: Options,
    pub correct_answer: AnswerKey,
    pub explanation: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_key_parses_loosely() {
        assert_eq!(" b ".parse::<AnswerKey>().unwrap(), AnswerKey::B);
        assert_eq!("D".parse::<AnswerKey>().unwrap(), AnswerKey::D);
        assert!("E".parse::<AnswerKey>().is_err());
        assert!("".parse::<AnswerKey>().is_err());
    }

    #[test]
    fn view_serializes_to_output_shape() {
        let question = Question {
            id: "S1".to_string(),
            category: "science".to_string(),
            text: "What is H2O?".to_string(),
            options: Options {
                a: "Water".to_string(),
                b: "Salt".to_string(),
                c: "Air".to_string(),
                d: "Gold".to_string(),
            },
            correct_answer: AnswerKey::A,
            explanation: "Two hydrogens, one oxygen.".to_string(),
        };

        let json = serde_json::to_value(question.view()).unwrap();
        assert_eq!(json["id"], "S1");
        assert_eq!(json["question"], "What is H2O?");
        assert_eq!(json["options"]["A"], "Water");
        assert_eq!(json["options"]["D"], "Gold");
        assert_eq!(json["correctAnswer"], "A");
        assert_eq!(json["explanation"], "Two hydrogens, one oxygen.");
        assert!(json.get("category").is_none());
        assert_eq!(question.options.get(question.correct_answer), "Water");
        assert_eq!(question.options.get(AnswerKey::C), "Air");
    }
}
