//! Core data models for Daily Trivia
//!
//! This module contains the question model shared by the network client,
//! the persistent store, and the session controller.

pub mod trivia;

pub use trivia::{TriviaClient, TriviaError};

use rand::seq::SliceRandom;
use rand::thread_rng;
use serde::{Deserialize, Serialize};

/// A single multiple-choice trivia question
///
/// Field names map to the Open Trivia DB wire names via serde renames, so the
/// same type decodes API payloads and round-trips through the persisted
/// record losslessly. `category`, `kind`, and `difficulty` are opaque
/// passthrough strings; nothing in the core interprets them.
///
/// Invariant: `incorrect_answers` never contains `correct_answer`; the union
/// of the two is the full answer set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Category label as reported by the API
    pub category: String,
    /// Question type reported by the API ("multiple"); `type` is a keyword
    #[serde(rename = "type")]
    pub kind: String,
    /// Difficulty label as reported by the API
    pub difficulty: String,
    /// The question text
    #[serde(rename = "question")]
    pub prompt: String,
    /// The correct answer
    pub correct_answer: String,
    /// All incorrect answers, order preserved through persistence
    pub incorrect_answers: Vec<String>,
}

impl Question {
    /// Returns the full answer set in a freshly randomized order
    ///
    /// Recomputed on every call; the ordering carries no meaning.
    pub fn shuffled_answers(&self) -> Vec<String> {
        let mut answers = self.incorrect_answers.clone();
        answers.push(self.correct_answer.clone());
        answers.shuffle(&mut thread_rng());
        answers
    }
}

/// Difficulty filter forwarded to the API when a new question is fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Parses a difficulty name, case-insensitively
    ///
    /// # Returns
    /// * `Some(Difficulty)` if the string matches a valid difficulty
    /// * `None` otherwise
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// The query-parameter value understood by the API
    pub fn as_param(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}
