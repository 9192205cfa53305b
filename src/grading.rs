//! Scoring a practice test against a student's answers.

use crate::artifact::TestItem;
use serde::{Deserialize, Serialize};

/// A student's answer to one [`TestItem`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TestAnswer {
    /// 0-based option index, for `multiple`.
    Choice(usize),
    /// For `truefalse`.
    Bool(bool),
    /// Free text, for `fill`.
    Text(String),
    /// Chosen definition per term, for `match`, in `options` order.
    Pairs(Vec<String>),
}

impl TestItem {
    /// Whether `answer` is correct for this item.
    ///
    /// An answer of the wrong shape (a boolean for a `fill` item, say) is
    /// simply wrong. Fill answers compare case-insensitively; match answers
    /// must agree at every position.
    pub fn is_correct(&self, answer: &TestAnswer) -> bool {
        match (self, answer) {
            (TestItem::Multiple { correct_answer, .. }, TestAnswer::Choice(choice)) => {
                choice == correct_answer
            }
            (TestItem::TrueFalse { correct_answer, .. }, TestAnswer::Bool(value)) => {
                value == correct_answer
            }
            (TestItem::Fill { correct_answer, .. }, TestAnswer::Text(text)) => {
                text.to_lowercase() == correct_answer.to_lowercase()
            }
            (TestItem::Match { correct_answer, .. }, TestAnswer::Pairs(pairs)) => {
                pairs == correct_answer
            }
            _ => false,
        }
    }
}

/// Outcome of [`score_test`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestScore {
    pub correct: usize,
    pub total: usize,
    /// Rounded to the nearest whole percent.
    pub percentage: u32,
    /// `percentage / 10`, one decimal place.
    pub score_out_of_10: f64,
}

/// Grade `answers` against `items`, position by position.
///
/// Missing answers (`None`, or fewer answers than items) count as wrong;
/// extra answers are ignored. An empty test scores zero.
pub fn score_test(items: &[TestItem], answers: &[Option<TestAnswer>]) -> TestScore {
    let correct = items
        .iter()
        .enumerate()
        .filter(|(i, item)| {
            answers
                .get(*i)
                .and_then(Option::as_ref)
                .is_some_and(|answer| item.is_correct(answer))
        })
        .count();
    let total = items.len();

    let percentage = if total == 0 {
        0
    } else {
        (correct as f64 / total as f64 * 100.0).round() as u32
    };
    let score_out_of_10 = percentage as f64 / 10.0;

    TestScore {
        correct,
        total,
        percentage,
        score_out_of_10,
    }
}
