//! Question payload produced by the editor.
//!
//! The editor hands questions over as JSON, either directly or inside a
//! `#questions=<percent-encoded JSON>` URL fragment:
//!
//! ```json
//! {"questions": [
//!   {"type": "single", "text": "7 x 6?", "answer": "42", "alternates": ["forty-two"]},
//!   {"type": "multi", "text": "Primes?", "options": ["1", "2", "3", "4"], "correct": [1, 2]}
//! ]}
//! ```
//!
//! Entries are normalized on the way in: multiple-choice questions keep at
//! most four options and their answer becomes the correct options joined
//! by ", "; blank alternates are dropped; questions without text are
//! discarded.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};

use crate::core::MatchError;

/// Options shown for a multiple-choice question.
pub const MAX_OPTIONS: usize = 4;

/// One normalized question.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    pub answer: String,
    /// Empty for open-answer questions.
    pub options: Vec<String>,
    /// Indexes into `options` that are correct.
    pub correct: Vec<usize>,
    /// Other accepted spellings of an open answer.
    pub alternates: Vec<String>,
    pub image: Option<String>,
}

impl Question {
    /// Open-answer question.
    pub fn open(text: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            answer: answer.into(),
            options: Vec::new(),
            correct: Vec::new(),
            alternates: Vec::new(),
            image: None,
        }
    }

    /// Multiple-choice question; the answer text is derived from `correct`.
    pub fn choice(text: impl Into<String>, options: &[&str], correct: &[usize]) -> Self {
        let options: Vec<String> = options.iter().map(|o| (*o).to_owned()).collect();
        Self {
            text: text.into(),
            answer: join_correct(&options, correct),
            correct: correct.iter().copied().filter(|&i| i < options.len().min(MAX_OPTIONS)).collect(),
            options: options.into_iter().take(MAX_OPTIONS).collect(),
            alternates: Vec::new(),
            image: None,
        }
    }

    #[must_use]
    pub fn is_multiple_choice(&self) -> bool {
        !self.options.is_empty()
    }

    /// Whether option `index` is one of the correct ones.
    ///
    /// Open-answer questions have no options, so this is always `false`.
    #[must_use]
    pub fn is_correct_option(&self, index: usize) -> bool {
        self.correct.contains(&index)
    }
}

fn join_correct(options: &[String], correct: &[usize]) -> String {
    options
        .iter()
        .enumerate()
        .filter(|(i, _)| correct.contains(i))
        .map(|(_, o)| o.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A payload entry as the editor writes it. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawQuestion {
    #[serde(rename = "type")]
    kind: Option<String>,
    text: Option<String>,
    answer: Option<String>,
    alternates: Option<Vec<String>>,
    options: Option<Vec<String>>,
    #[serde(alias = "correctIndexes", alias = "correct_indexes")]
    correct: Option<Vec<usize>>,
    image: Option<String>,
}

impl RawQuestion {
    fn normalize(self) -> Option<Question> {
        let text = self.text.unwrap_or_default();
        if text.trim().is_empty() {
            return None;
        }

        let question = if self.kind.as_deref() == Some("multi") {
            let all_options = self.options.unwrap_or_default();
            let correct = self.correct.unwrap_or_default();
            let answer = if correct.is_empty() {
                self.answer.unwrap_or_default()
            } else {
                join_correct(&all_options, &correct)
            };
            let options: Vec<String> = all_options.into_iter().take(MAX_OPTIONS).collect();
            Question {
                text,
                answer,
                correct: correct.into_iter().filter(|&i| i < options.len()).collect(),
                options,
                alternates: Vec::new(),
                image: self.image,
            }
        } else {
            Question {
                text,
                answer: self.answer.unwrap_or_default(),
                options: Vec::new(),
                correct: Vec::new(),
                alternates: self
                    .alternates
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|a| !a.trim().is_empty())
                    .collect(),
                image: self.image,
            }
        };
        Some(question)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPayload {
    Wrapped { questions: Vec<RawQuestion> },
    Bare(Vec<RawQuestion>),
}

/// Parse and normalize a JSON payload.
pub fn parse_questions(json: &str) -> Result<Vec<Question>, MatchError> {
    let raw: RawPayload = serde_json::from_str(json)?;
    let entries = match raw {
        RawPayload::Wrapped { questions } | RawPayload::Bare(questions) => questions,
    };
    Ok(entries.into_iter().filter_map(RawQuestion::normalize).collect())
}

/// Extract the JSON from a `#questions=...` fragment.
///
/// The leading `#` is optional.
pub fn decode_fragment(fragment: &str) -> Result<String, MatchError> {
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
    let encoded = fragment
        .strip_prefix("questions=")
        .ok_or_else(|| MatchError::Payload("fragment has no questions= key".into()))?;
    percent_decode_str(encoded)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|e| MatchError::Payload(format!("fragment is not UTF-8: {e}")))
}
