//! Open Trivia Database API client
//!
//! This module provides functionality to fetch a single multiple-choice
//! question from the Open Trivia DB API and map the wire payload into our
//! Question data structure.

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use super::{Difficulty, Question};

/// Base URL for the Open Trivia DB API
const OPEN_TRIVIA_BASE_URL: &str = "https://opentdb.com/api.php";

/// Errors that can occur when fetching a question
#[derive(Debug, Error)]
pub enum TriviaError {
    /// HTTP request failed
    #[error("Network error: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Decoding error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The API reported a non-success response code
    #[error("Invalid API response (code {0})")]
    InvalidResponse(i64),

    /// The API reported success but returned no questions
    #[error("Invalid API response: no question returned")]
    EmptyResults,
}

/// Envelope around the question payload
///
/// `response_code == 0` signals success; any other value is a failure.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    response_code: i64,
    results: Vec<Question>,
}

/// Client for fetching questions from the Open Trivia DB API
#[derive(Debug, Clone)]
pub struct TriviaClient {
    /// HTTP client for making requests
    client: Client,
    /// Base URL for the API (allows override for testing)
    base_url: String,
}

impl Default for TriviaClient {
    fn default() -> Self {
        Self::new()
    }
}

impl TriviaClient {
    /// Creates a new TriviaClient with the default endpoint
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: OPEN_TRIVIA_BASE_URL.to_string(),
        }
    }

    /// Creates a new TriviaClient with a custom base URL (for testing)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Fetches one multiple-choice question
    ///
    /// # Arguments
    /// * `difficulty` - Optional difficulty filter forwarded to the API
    ///
    /// # Returns
    /// * `Ok(Question)` - The question returned by the API
    /// * `Err(TriviaError)` - If the request, decoding, or the API contract fails
    pub async fn fetch_question(
        &self,
        difficulty: Option<Difficulty>,
    ) -> Result<Question, TriviaError> {
        let mut url = format!("{}?amount=1&type=multiple", self.base_url);
        if let Some(difficulty) = difficulty {
            url.push_str("&difficulty=");
            url.push_str(difficulty.as_param());
        }

        let response = self.client.get(&url).send().await?;
        let text = response.text().await?;

        parse_payload(&text)
    }
}

/// Decodes an API payload and enforces the success contract
///
/// Requires `response_code == 0` and a non-empty result list; the first
/// question in the list wins.
pub(crate) fn parse_payload(text: &str) -> Result<Question, TriviaError> {
    let api_response: ApiResponse = serde_json::from_str(text)?;

    if api_response.response_code != 0 {
        return Err(TriviaError::InvalidResponse(api_response.response_code));
    }

    api_response
        .results
        .into_iter()
        .next()
        .ok_or(TriviaError::EmptyResults)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_PAYLOAD: &str = r#"{
        "response_code": 0,
        "results": [
            {
                "category": "General Knowledge",
                "type": "multiple",
                "difficulty": "easy",
                "question": "What is the capital of France?",
                "correct_answer": "Paris",
                "incorrect_answers": ["London", "Berlin", "Madrid"]
            }
        ]
    }"#;

    #[test]
    fn test_parse_payload_returns_first_question() {
        let question = parse_payload(VALID_PAYLOAD).expect("Should parse valid payload");

        assert_eq!(question.prompt, "What is the capital of France?");
        assert_eq!(question.correct_answer, "Paris");
        assert_eq!(question.incorrect_answers.len(), 3);
    }

    #[test]
    fn test_parse_payload_takes_first_of_multiple_results() {
        let payload = r#"{
            "response_code": 0,
            "results": [
                {
                    "category": "A",
                    "type": "multiple",
                    "difficulty": "easy",
                    "question": "First?",
                    "correct_answer": "Yes",
                    "incorrect_answers": ["No"]
                },
                {
                    "category": "B",
                    "type": "multiple",
                    "difficulty": "easy",
                    "question": "Second?",
                    "correct_answer": "No",
                    "incorrect_answers": ["Yes"]
                }
            ]
        }"#;

        let question = parse_payload(payload).expect("Should parse payload");

        assert_eq!(question.prompt, "First?");
    }

    #[test]
    fn test_parse_payload_rejects_non_zero_response_code() {
        let payload = r#"{"response_code": 1, "results": []}"#;

        let result = parse_payload(payload);

        assert!(matches!(result, Err(TriviaError::InvalidResponse(1))));
    }

    #[test]
    fn test_parse_payload_rejects_empty_results() {
        let payload = r#"{"response_code": 0, "results": []}"#;

        let result = parse_payload(payload);

        assert!(matches!(result, Err(TriviaError::EmptyResults)));
    }

    #[test]
    fn test_parse_payload_rejects_malformed_json() {
        let result = parse_payload("not json at all");

        assert!(matches!(result, Err(TriviaError::Decode(_))));
    }

    #[test]
    fn test_parse_payload_rejects_schema_mismatch() {
        // Valid JSON, wrong shape
        let result = parse_payload(r#"{"unexpected": true}"#);

        assert!(matches!(result, Err(TriviaError::Decode(_))));
    }

    #[test]
    fn test_error_messages_are_human_readable() {
        assert_eq!(
            TriviaError::InvalidResponse(4).to_string(),
            "Invalid API response (code 4)"
        );
        assert_eq!(
            TriviaError::EmptyResults.to_string(),
            "Invalid API response: no question returned"
        );
    }
}
