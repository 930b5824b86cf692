//! Questions for the penalty round.
//!
//! A [`QuestionDeck`] serves questions round-robin: each penalty loser gets
//! the next one, wrapping around at the end. The deck position carries
//! over between rounds.

pub mod payload;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::MatchError;

pub use payload::{decode_fragment, parse_questions, Question, MAX_OPTIONS};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDeck {
    questions: Vec<Question>,
    cursor: usize,
}

impl QuestionDeck {
    /// Deck from already normalized questions. Fails when empty.
    pub fn new(questions: Vec<Question>) -> Result<Self, MatchError> {
        if questions.is_empty() {
            return Err(MatchError::Payload("question deck is empty".into()));
        }
        Ok(Self { questions, cursor: 0 })
    }

    /// Deck from editor JSON.
    pub fn from_json(json: &str) -> Result<Self, MatchError> {
        let questions = parse_questions(json)?;
        debug!(count = questions.len(), "question payload parsed");
        Self::new(questions)
    }

    /// Deck from a `#questions=...` URL fragment.
    ///
    /// ```
    /// use run_run_rabbit::questions::QuestionDeck;
    ///
    /// let deck = QuestionDeck::from_fragment(
    ///     "#questions=%7B%22questions%22%3A%5B%7B%22text%22%3A%22Hi%3F%22%2C%22answer%22%3A%22Hello%22%7D%5D%7D",
    /// )
    /// .unwrap();
    /// assert_eq!(deck.len(), 1);
    /// ```
    pub fn from_fragment(fragment: &str) -> Result<Self, MatchError> {
        Self::from_json(&decode_fragment(fragment)?)
    }

    /// Next question, wrapping around.
    pub fn next(&mut self) -> &Question {
        let index = self.cursor % self.questions.len();
        self.cursor = (index + 1) % self.questions.len();
        &self.questions[index]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }

    pub fn rewind(&mut self) {
        self.cursor = 0;
    }
}

impl Default for QuestionDeck {
    /// The built-in general-knowledge deck.
    fn default() -> Self {
        let questions = vec![
            Question::open("What is 7 × 6?", "42"),
            Question::choice("Which of the following is not a prime number?", &["1", "2", "3", "5"], &[0]),
            Question::open("What planet is known as the Red Planet?", "Mars"),
            Question::choice("Which of these animals are mammals?", &["Penguin", "Dolphin", "Crocodile", "Eagle"], &[1]),
            Question::open("Who wrote 'Romeo and Juliet'?", "William Shakespeare"),
            Question::choice("Which is not a primary color?", &["Red", "Blue", "Yellow", "Green"], &[3]),
            Question::open("What is the chemical symbol for water?", "H2O"),
            Question::choice("Which countries are in Europe?", &["France", "Germany", "Spain", "Brazil"], &[0, 1, 2]),
            Question::open("How many continents are there on Earth?", "7"),
            Question::choice("Which of these numbers is not even?", &["1", "2", "4", "8"], &[0]),
        ];
        Self { questions, cursor: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_robin() {
        let mut deck = QuestionDeck::new(vec![Question::open("a", "1"), Question::open("b", "2")]).unwrap();
        let texts: Vec<_> = (0..5).map(|_| deck.next().text.clone()).collect();
        assert_eq!(texts, vec!["a", "b", "a", "b", "a"]);
        deck.rewind();
        assert_eq!(deck.next().text, "a");
    }

    #[test]
    fn test_default_deck() {
        let deck = QuestionDeck::default();
        assert_eq!(deck.len(), 10);
        let europe = deck.iter().find(|q| q.text.contains("Europe")).unwrap();
        assert_eq!(europe.answer, "France, Germany, Spain");
    }

    #[test]
    fn test_empty_payload_rejected() {
        assert!(QuestionDeck::new(Vec::new()).is_err());
        assert!(QuestionDeck::from_json(r#"{"questions": [{"text": ""}]}"#).is_err());
    }
}
