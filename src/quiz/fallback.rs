//! Hard-coded questions for when the bank or the store lets us down.

use crate::quiz::{AnswerKey, Options, Question};

fn question(
    id: &str,
    category: &str,
    text: &str,
    options: [&str; 4],
    correct_answer: AnswerKey,
    explanation: &str,
) -> Question {
    let [a, b, c, d] = options;
    Question {
        id: id.to_string(),
        category: category.to_string(),
        text: text.to_string(),
        options: Options {
            a: a.to_string(),
            b: b.to_string(),
            c: c.to_string(),
            d: d.to_string(),
        },
        correct_answer,
        explanation: explanation.to_string(),
    }
}

/// The question served for `category` when normal selection can't proceed.
///
/// Pure and total: unknown categories get the generic entry.
pub fn fallback_for(category: &str) -> Question {
    match category {
        "funfacts" => question(
            "fallback_funfacts",
            "funfacts",
            "Which animal has three hearts?",
            ["Octopus", "Elephant", "Shark", "Giraffe"],
            AnswerKey::A,
            "An octopus has two hearts pumping blood to the gills and one for the rest of the body.",
        ),
        "psychology" => question(
            "fallback_psychology",
            "psychology",
            "What is the tendency to favor information that confirms what you already believe?",
            [
                "Anchoring",
                "Confirmation bias",
                "Hindsight bias",
                "The halo effect",
            ],
            AnswerKey::B,
            "Confirmation bias makes us seek out and remember evidence that supports our existing views.",
        ),
        _ => question(
            "fallback_default",
            category,
            "How many minutes are there in a day?",
            ["1,440", "1,240", "2,400", "3,600"],
            AnswerKey::A,
            "24 hours times 60 minutes gives 1,440 minutes.",
        ),
    }
}

/// The minimal bank used when the data source yields nothing usable.
pub fn builtin_questions() -> Vec<Question> {
    vec![
        question(
            "F001",
            "funfacts",
            "What is the only food that never spoils?",
            ["Bread", "Honey", "Cheese", "Rice"],
            AnswerKey::B,
            "Honey's low moisture and high acidity keep bacteria out; edible honey has been found in ancient tombs.",
        ),
        question(
            "P001",
            "psychology",
            "Roughly how many items can the average person hold in short-term memory?",
            ["3", "7", "15", "30"],
            AnswerKey::B,
            "Miller's 'magical number seven, plus or minus two' describes short-term memory capacity.",
        ),
    ]
}
