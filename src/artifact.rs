//! Study artifacts and the enums that select them.
//!
//! The field names here are the wire format shared with the prompts in
//! [`crate::prompts`]: the model is told to answer with exactly these keys,
//! so renaming a field means changing the prompt in the same commit.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which kind of study material to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Flashcards,
    Quiz,
    Test,
}

impl ArtifactKind {
    /// Response-size ceiling sent as `max_tokens`.
    ///
    /// Practice tests carry four item shapes and longer explanations, so each
    /// step up in richness gets another thousand tokens.
    pub fn max_tokens(self) -> u32 {
        match self {
            ArtifactKind::Flashcards => 2000,
            ArtifactKind::Quiz => 3000,
            ArtifactKind::Test => 4000,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactKind::Flashcards => "flashcards",
            ArtifactKind::Quiz => "quiz",
            ArtifactKind::Test => "test",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the caller supplied the source material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceMode {
    /// A free-form topic description ("Capitales de Europa").
    Topic,
    /// Text pasted by the user.
    PastedText,
    /// Text extracted from an uploaded document.
    FileText,
}

/// The two prompt families: generate from a named topic, or extract from
/// supplied text. Pasted and file text share the extraction family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptSource {
    Topic,
    SuppliedText,
}

impl SourceMode {
    pub fn prompt_source(self) -> PromptSource {
        match self {
            SourceMode::Topic => PromptSource::Topic,
            SourceMode::PastedText | SourceMode::FileText => PromptSource::SuppliedText,
        }
    }
}

// ── Entities ─────────────────────────────────────────────────────────────

/// A term on the front, its definition on the back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub front: String,
    pub back: String,
}

/// A four-option multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    #[serde(rename = "correctAnswer")]
    pub correct_answer: usize,
    pub explanation: String,
}

/// Number of options a multiple-choice question must offer.
pub const QUIZ_OPTION_COUNT: usize = 4;

impl QuizQuestion {
    /// `true` when `choice` (0-based) is the correct option.
    pub fn is_correct(&self, choice: usize) -> bool {
        choice == self.correct_answer
    }

    /// The text of the correct option, if the index is in range.
    pub fn correct_option(&self) -> Option<&str> {
        self.options.get(self.correct_answer).map(String::as_str)
    }
}

/// One item of a mixed-format practice test, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TestItem {
    #[serde(rename = "multiple")]
    Multiple {
        question: String,
        options: Vec<String>,
        #[serde(rename = "correctAnswer")]
        correct_answer: usize,
        explanation: String,
    },
    #[serde(rename = "truefalse")]
    TrueFalse {
        question: String,
        #[serde(rename = "correctAnswer")]
        correct_answer: bool,
        explanation: String,
    },
    #[serde(rename = "fill")]
    Fill {
        question: String,
        #[serde(rename = "correctAnswer")]
        correct_answer: String,
        explanation: String,
    },
    #[serde(rename = "match")]
    Match {
        question: String,
        /// Terms, in display order.
        options: Vec<String>,
        /// Candidate definitions offered to the student.
        matches: Vec<String>,
        /// Definitions aligned positionally with `options`.
        #[serde(rename = "correctAnswer")]
        correct_answer: Vec<String>,
        explanation: String,
    },
}

impl TestItem {
    pub fn question(&self) -> &str {
        match self {
            TestItem::Multiple { question, .. }
            | TestItem::TrueFalse { question, .. }
            | TestItem::Fill { question, .. }
            | TestItem::Match { question, .. } => question,
        }
    }

    pub fn explanation(&self) -> &str {
        match self {
            TestItem::Multiple { explanation, .. }
            | TestItem::TrueFalse { explanation, .. }
            | TestItem::Fill { explanation, .. }
            | TestItem::Match { explanation, .. } => explanation,
        }
    }

    /// The wire tag of this item (`multiple`, `truefalse`, `fill`, `match`).
    pub fn type_tag(&self) -> &'static str {
        match self {
            TestItem::Multiple { .. } => "multiple",
            TestItem::TrueFalse { .. } => "truefalse",
            TestItem::Fill { .. } => "fill",
            TestItem::Match { .. } => "match",
        }
    }
}

// ── Validation ───────────────────────────────────────────────────────────

/// How strictly decoded artifacts are checked against their invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationPolicy {
    /// The first invalid item fails the whole generation. (default)
    #[default]
    Strict,
    /// Invalid items are dropped with a warning.
    Lenient,
    /// Items pass through unchecked.
    Off,
}

/// A generated study artifact that can be decoded from the model reply and
/// checked against its invariants.
pub trait Artifact: Serialize + DeserializeOwned + Send + 'static {
    const KIND: ArtifactKind;

    /// Returns a human-readable reason when an invariant is broken.
    fn check(&self) -> Result<(), String>;
}

fn non_empty(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("`{field}` is empty"))
    } else {
        Ok(())
    }
}

fn check_choice(options: &[String], correct_answer: usize) -> Result<(), String> {
    if options.len() != QUIZ_OPTION_COUNT {
        return Err(format!(
            "expected {QUIZ_OPTION_COUNT} options, got {}",
            options.len()
        ));
    }
    if correct_answer >= options.len() {
        return Err(format!(
            "correctAnswer {correct_answer} is out of range 0..={}",
            options.len() - 1
        ));
    }
    Ok(())
}

impl Artifact for Flashcard {
    const KIND: ArtifactKind = ArtifactKind::Flashcards;

    fn check(&self) -> Result<(), String> {
        non_empty("front", &self.front)?;
        non_empty("back", &self.back)
    }
}

impl Artifact for QuizQuestion {
    const KIND: ArtifactKind = ArtifactKind::Quiz;

    fn check(&self) -> Result<(), String> {
        non_empty("question", &self.question)?;
        check_choice(&self.options, self.correct_answer)
    }
}

impl Artifact for TestItem {
    const KIND: ArtifactKind = ArtifactKind::Test;

    fn check(&self) -> Result<(), String> {
        non_empty("question", self.question())?;
        match self {
            TestItem::Multiple {
                options,
                correct_answer,
                ..
            } => check_choice(options, *correct_answer),
            TestItem::TrueFalse { .. } => Ok(()),
            TestItem::Fill { correct_answer, .. } => non_empty("correctAnswer", correct_answer),
            TestItem::Match {
                options,
                matches,
                correct_answer,
                ..
            } => {
                if options.is_empty() {
                    return Err("`options` is empty".into());
                }
                if matches.len() != options.len() {
                    return Err(format!(
                        "{} matches for {} options",
                        matches.len(),
                        options.len()
                    ));
                }
                if correct_answer.len() != options.len() {
                    return Err(format!(
                        "correctAnswer has {} entries for {} options",
                        correct_answer.len(),
                        options.len()
                    ));
                }
                Ok(())
            }
        }
    }
}

// ── Artifact set ─────────────────────────────────────────────────────────

/// The result of one generation call. Serialises as the bare JSON array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ArtifactSet {
    Flashcards(Vec<Flashcard>),
    Quiz(Vec<QuizQuestion>),
    Test(Vec<TestItem>),
}

impl ArtifactSet {
    pub fn kind(&self) -> ArtifactKind {
        match self {
            ArtifactSet::Flashcards(_) => ArtifactKind::Flashcards,
            ArtifactSet::Quiz(_) => ArtifactKind::Quiz,
            ArtifactSet::Test(_) => ArtifactKind::Test,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ArtifactSet::Flashcards(v) => v.len(),
            ArtifactSet::Quiz(v) => v.len(),
            ArtifactSet::Test(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
