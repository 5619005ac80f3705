//! Daily trivia session controller
//!
//! Owns the observable session state and the single-fetch-per-day policy: a
//! question cached today is reused without touching the network; anything
//! else triggers one fetch whose outcome is applied when the owner drains
//! it. Selection tracking and correctness live here too.

use chrono::{Local, NaiveDate};
use tokio::sync::mpsc;

use crate::data::{Difficulty, Question, TriviaClient, TriviaError};
use crate::store::{CacheRecord, QuestionStore};

/// Observer callback invoked with the state after every applied mutation
type Listener = Box<dyn Fn(&SessionState) + Send>;

/// The four observable fields of a session
///
/// Invariant: `is_correct` is `Some` exactly when `selected_answer` is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    /// Today's question, once loaded
    pub current_question: Option<Question>,
    /// Human-readable description of the last fetch failure
    pub error_message: Option<String>,
    /// The user's current answer selection
    pub selected_answer: Option<String>,
    /// Whether the selection matches the correct answer
    pub is_correct: Option<bool>,
}

/// Controller for the daily question lifecycle
///
/// All mutations happen on the owning context: the cache-hit path and
/// `select_answer` apply immediately, while fetch outcomes arrive over a
/// channel and are applied by `poll_fetch` / `wait_for_fetch`. Dropping the
/// session closes the channel, so a fetch completing afterwards is a silent
/// no-op rather than a mutation of a discarded session.
pub struct TriviaSession {
    /// The observable state
    state: SessionState,
    /// Persistent store for the daily record, if one could be set up
    store: Option<QuestionStore>,
    /// API client used on cache-miss
    client: TriviaClient,
    /// Difficulty filter forwarded on cache-miss fetches
    difficulty: Option<Difficulty>,
    /// Sender cloned into each spawned fetch task
    outcome_tx: mpsc::Sender<Result<Question, TriviaError>>,
    /// Receiver drained by the owning context
    outcome_rx: mpsc::Receiver<Result<Question, TriviaError>>,
    /// Number of spawned fetches whose outcome has not been applied yet
    in_flight: usize,
    /// Observers notified after every applied mutation
    listeners: Vec<Listener>,
}

impl Default for TriviaSession {
    fn default() -> Self {
        Self::new()
    }
}

impl TriviaSession {
    /// Creates a session against the platform store and the real API
    pub fn new() -> Self {
        Self::with_parts(QuestionStore::new(), TriviaClient::new(), None)
    }

    /// Creates a session from explicit collaborators
    ///
    /// `store` may be `None` when no durable directory is available; the
    /// session then fetches every day without caching.
    pub fn with_parts(
        store: Option<QuestionStore>,
        client: TriviaClient,
        difficulty: Option<Difficulty>,
    ) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::channel(4);
        Self {
            state: SessionState::default(),
            store,
            client,
            difficulty,
            outcome_tx,
            outcome_rx,
            in_flight: 0,
            listeners: Vec::new(),
        }
    }

    /// Returns the current observable state
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Registers an observer invoked after every applied mutation
    ///
    /// The callback always sees the state with the mutation fully applied.
    pub fn subscribe(&mut self, listener: impl Fn(&SessionState) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Whether a spawned fetch has not yet been applied
    pub fn fetch_in_flight(&self) -> bool {
        self.in_flight > 0
    }

    /// Loads today's question
    ///
    /// A record fetched on today's local calendar date applies synchronously
    /// with no network activity. Otherwise a single fetch is spawned and the
    /// caller observes its outcome after draining with `poll_fetch` or
    /// `wait_for_fetch`. Overlapping calls are not coalesced; outcomes apply
    /// in arrival order and the last one wins.
    ///
    /// Must be called from within a tokio runtime.
    pub fn load_today(&mut self) {
        if let Some(record) = self.read_cached_today() {
            self.state.current_question = Some(record.question);
            self.state.selected_answer = None;
            self.state.is_correct = None;
            self.state.error_message = None;
            self.notify();
            return;
        }

        let client = self.client.clone();
        let difficulty = self.difficulty;
        let tx = self.outcome_tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            let outcome = client.fetch_question(difficulty).await;
            // The channel is closed once the session is dropped; a late
            // outcome is discarded instead of mutating freed state.
            let _ = tx.send(outcome).await;
        });
    }

    /// Applies one completed fetch outcome if available, without blocking
    ///
    /// Returns `true` if an outcome was applied.
    pub fn poll_fetch(&mut self) -> bool {
        match self.outcome_rx.try_recv() {
            Ok(outcome) => {
                self.apply_outcome(outcome);
                true
            }
            Err(_) => false,
        }
    }

    /// Waits for the next in-flight fetch and applies its outcome
    ///
    /// Returns `false` immediately when no fetch is in flight.
    pub async fn wait_for_fetch(&mut self) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        match self.outcome_rx.recv().await {
            Some(outcome) => {
                self.apply_outcome(outcome);
                true
            }
            None => false,
        }
    }

    /// Records the user's answer selection for the current question
    ///
    /// A no-op when no question is loaded. Correctness is pure string
    /// equality against the correct answer; selecting again overwrites the
    /// previous pick.
    pub fn select_answer(&mut self, answer: &str) {
        let Some(question) = &self.state.current_question else {
            return;
        };
        self.state.is_correct = Some(answer == question.correct_answer);
        self.state.selected_answer = Some(answer.to_string());
        self.notify();
    }

    /// Reads the persisted record if it was fetched today
    fn read_cached_today(&self) -> Option<CacheRecord> {
        let record = self.store.as_ref()?.read_record()?;
        (record.fetched_on == today()).then_some(record)
    }

    /// Applies a fetch outcome to the state
    ///
    /// Success replaces the question, clears the selection, and writes
    /// through to the store dated today. Failure only sets the error
    /// message; a previously loaded question is never cleared.
    fn apply_outcome(&mut self, outcome: Result<Question, TriviaError>) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match outcome {
            Ok(question) => {
                if let Some(store) = &self.store {
                    let record = CacheRecord {
                        fetched_on: today(),
                        question: question.clone(),
                    };
                    // A failed write reads as an absent record next launch;
                    // it never turns a successful fetch into an error.
                    let _ = store.write_record(&record);
                }
                self.state.current_question = Some(question);
                self.state.selected_answer = None;
                self.state.is_correct = None;
                self.state.error_message = None;
            }
            Err(error) => {
                self.state.error_message = Some(error.to_string());
            }
        }
        self.notify();
    }

    fn notify(&self) {
        for listener in &self.listeners {
            listener(&self.state);
        }
    }
}

/// Today's local calendar date
fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn sample_question() -> Question {
        Question {
            category: "Geography".to_string(),
            kind: "multiple".to_string(),
            difficulty: "easy".to_string(),
            prompt: "What is the capital of France?".to_string(),
            correct_answer: "Paris".to_string(),
            incorrect_answers: vec![
                "London".to_string(),
                "Berlin".to_string(),
                "Madrid".to_string(),
            ],
        }
    }

    fn other_question() -> Question {
        Question {
            category: "Science".to_string(),
            kind: "multiple".to_string(),
            difficulty: "medium".to_string(),
            prompt: "What is the chemical symbol for gold?".to_string(),
            correct_answer: "Au".to_string(),
            incorrect_answers: vec!["Ag".to_string(), "Go".to_string(), "Gd".to_string()],
        }
    }

    fn store_in(temp_dir: &TempDir) -> QuestionStore {
        QuestionStore::with_dir(temp_dir.path().to_path_buf())
    }

    /// A client whose requests fail fast with a transport error
    fn unroutable_client() -> TriviaClient {
        TriviaClient::with_base_url("http://127.0.0.1:9/api.php")
    }

    fn session_with(store: QuestionStore, client: TriviaClient) -> TriviaSession {
        TriviaSession::with_parts(Some(store), client, None)
    }

    /// Spawns a loopback HTTP stub serving one canned body, counting hits
    async fn stub_api_server(body: String) -> (String, Arc<AtomicUsize>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub server");
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                counter.fetch_add(1, Ordering::SeqCst);
                let body = body.clone();
                tokio::spawn(async move {
                    let mut buf = [0u8; 2048];
                    let _ = socket.read(&mut buf).await;
                    let response = format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        (format!("http://{}/api.php", addr), hits)
    }

    fn success_payload(question: &Question) -> String {
        serde_json::json!({
            "response_code": 0,
            "results": [question]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_cache_hit_loads_synchronously_without_network() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);
        store
            .write_record(&CacheRecord {
                fetched_on: today(),
                question: sample_question(),
            })
            .unwrap();
        let mut session = session_with(store, unroutable_client());

        session.load_today();

        assert_eq!(session.state().current_question, Some(sample_question()));
        assert!(session.state().error_message.is_none());
        assert!(session.state().selected_answer.is_none());
        assert!(session.state().is_correct.is_none());
        assert!(!session.fetch_in_flight(), "Cache-hit must not fetch");
    }

    #[tokio::test]
    async fn test_cache_hit_is_idempotent_across_repeated_loads() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);
        store
            .write_record(&CacheRecord {
                fetched_on: today(),
                question: sample_question(),
            })
            .unwrap();
        let (base_url, hits) = stub_api_server(success_payload(&other_question())).await;
        let mut session = session_with(store.clone(), TriviaClient::with_base_url(base_url));

        for _ in 0..3 {
            session.load_today();
            assert_eq!(session.state().current_question, Some(sample_question()));
        }

        assert!(!session.wait_for_fetch().await, "No fetch should be pending");
        assert_eq!(hits.load(Ordering::SeqCst), 0, "Zero network requests");
    }

    #[tokio::test]
    async fn test_date_rollover_fetches_exactly_once() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);
        let yesterday = today() - Days::new(1);
        store
            .write_record(&CacheRecord {
                fetched_on: yesterday,
                question: sample_question(),
            })
            .unwrap();
        let (base_url, hits) = stub_api_server(success_payload(&other_question())).await;
        let mut session = session_with(store, TriviaClient::with_base_url(base_url));

        session.load_today();
        assert!(session.fetch_in_flight());
        assert!(session.wait_for_fetch().await);

        assert_eq!(hits.load(Ordering::SeqCst), 1, "Exactly one request");
        assert_eq!(session.state().current_question, Some(other_question()));
        assert!(session.state().error_message.is_none());
    }

    #[tokio::test]
    async fn test_absent_record_fetch_persists_and_next_load_is_a_hit() {
        let temp_dir = TempDir::new().unwrap();
        let (base_url, hits) = stub_api_server(success_payload(&sample_question())).await;
        let mut session = session_with(
            store_in(&temp_dir),
            TriviaClient::with_base_url(base_url),
        );

        session.load_today();
        assert!(session.wait_for_fetch().await);
        assert_eq!(session.state().current_question, Some(sample_question()));

        // The record written through must make the next same-day load a hit
        let record = store_in(&temp_dir).read_record().expect("Record persisted");
        assert_eq!(record.fetched_on, today());
        assert_eq!(record.question, sample_question());

        session.load_today();
        assert!(!session.fetch_in_flight());
        assert_eq!(hits.load(Ordering::SeqCst), 1, "Second load hit the cache");
    }

    #[tokio::test]
    async fn test_undecodable_record_fails_open_to_a_fetch() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("question.json"), "corrupted {{{").unwrap();
        let (base_url, hits) = stub_api_server(success_payload(&sample_question())).await;
        let mut session = session_with(
            store_in(&temp_dir),
            TriviaClient::with_base_url(base_url),
        );

        session.load_today();
        assert!(session.wait_for_fetch().await);

        assert_eq!(hits.load(Ordering::SeqCst), 1, "Corrupt record triggers a fetch");
        assert_eq!(session.state().current_question, Some(sample_question()));
        assert!(
            session.state().error_message.is_none(),
            "Cache corruption must not surface as an error"
        );
    }

    #[tokio::test]
    async fn test_transport_error_sets_message_and_preserves_question() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = session_with(store_in(&temp_dir), unroutable_client());
        session.state.current_question = Some(sample_question());

        session.load_today();
        assert!(session.wait_for_fetch().await);

        let message = session
            .state()
            .error_message
            .as_deref()
            .expect("Transport failure should set an error message");
        assert!(message.contains("Network error"), "Got: {}", message);
        assert_eq!(
            session.state().current_question,
            Some(sample_question()),
            "A failed fetch must not clear a loaded question"
        );
    }

    #[tokio::test]
    async fn test_non_success_payload_sets_invalid_response_error() {
        let temp_dir = TempDir::new().unwrap();
        let (base_url, _hits) =
            stub_api_server(r#"{"response_code": 2, "results": []}"#.to_string()).await;
        let mut session = session_with(
            store_in(&temp_dir),
            TriviaClient::with_base_url(base_url),
        );

        session.load_today();
        assert!(session.wait_for_fetch().await);

        let message = session.state().error_message.as_deref().unwrap();
        assert!(message.contains("Invalid API response"), "Got: {}", message);
        assert!(session.state().current_question.is_none());
    }

    #[tokio::test]
    async fn test_empty_results_with_success_code_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let (base_url, _hits) =
            stub_api_server(r#"{"response_code": 0, "results": []}"#.to_string()).await;
        let mut session = session_with(
            store_in(&temp_dir),
            TriviaClient::with_base_url(base_url),
        );

        session.load_today();
        assert!(session.wait_for_fetch().await);

        assert!(session.state().error_message.is_some());
    }

    #[tokio::test]
    async fn test_failed_fetch_does_not_overwrite_the_persisted_record() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);
        let yesterday = today() - Days::new(1);
        let record = CacheRecord {
            fetched_on: yesterday,
            question: sample_question(),
        };
        store.write_record(&record).unwrap();
        let mut session = session_with(store, unroutable_client());

        session.load_today();
        assert!(session.wait_for_fetch().await);

        assert_eq!(store_in(&temp_dir).read_record(), Some(record));
    }

    #[test]
    fn test_select_answer_correctness_is_string_equality() {
        let mut session =
            TriviaSession::with_parts(None, unroutable_client(), None);
        session.state.current_question = Some(sample_question());

        session.select_answer("Paris");
        assert_eq!(session.state().selected_answer.as_deref(), Some("Paris"));
        assert_eq!(session.state().is_correct, Some(true));

        session.select_answer("London");
        assert_eq!(session.state().selected_answer.as_deref(), Some("London"));
        assert_eq!(session.state().is_correct, Some(false));

        // Membership in the listed answers is irrelevant
        session.select_answer("Tokyo");
        assert_eq!(session.state().is_correct, Some(false));
    }

    #[test]
    fn test_select_answer_is_a_noop_without_a_question() {
        let mut session = TriviaSession::with_parts(None, unroutable_client(), None);

        session.select_answer("Paris");

        assert!(session.state().selected_answer.is_none());
        assert!(session.state().is_correct.is_none());
    }

    #[test]
    fn test_new_question_clears_the_previous_selection() {
        let mut session = TriviaSession::with_parts(None, unroutable_client(), None);
        session.state.current_question = Some(sample_question());
        session.select_answer("Paris");

        session.apply_outcome(Ok(other_question()));

        assert_eq!(session.state().current_question, Some(other_question()));
        assert!(session.state().selected_answer.is_none());
        assert!(session.state().is_correct.is_none());
    }

    #[test]
    fn test_failed_outcome_keeps_the_selection() {
        let mut session = TriviaSession::with_parts(None, unroutable_client(), None);
        session.state.current_question = Some(sample_question());
        session.select_answer("Paris");

        session.apply_outcome(Err(TriviaError::EmptyResults));

        assert_eq!(session.state().selected_answer.as_deref(), Some("Paris"));
        assert_eq!(session.state().is_correct, Some(true));
        assert!(session.state().error_message.is_some());
    }

    #[test]
    fn test_observers_see_each_mutation_fully_applied() {
        let seen: Arc<Mutex<Vec<SessionState>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut session = TriviaSession::with_parts(None, unroutable_client(), None);
        session.subscribe(move |state| sink.lock().unwrap().push(state.clone()));

        session.apply_outcome(Ok(sample_question()));
        session.select_answer("Paris");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].current_question, Some(sample_question()));
        assert!(seen[0].selected_answer.is_none());
        assert_eq!(seen[1].selected_answer.as_deref(), Some("Paris"));
        assert_eq!(seen[1].is_correct, Some(true));
    }

    #[tokio::test]
    async fn test_overlapping_loads_apply_last_write_wins() {
        let temp_dir = TempDir::new().unwrap();
        let (base_url, hits) = stub_api_server(success_payload(&sample_question())).await;
        let mut session = session_with(
            store_in(&temp_dir),
            TriviaClient::with_base_url(base_url),
        );

        session.load_today();
        session.load_today();
        assert!(session.wait_for_fetch().await);
        assert!(session.wait_for_fetch().await);

        assert_eq!(hits.load(Ordering::SeqCst), 2, "No request coalescing");
        assert_eq!(session.state().current_question, Some(sample_question()));
        assert!(!session.fetch_in_flight());
    }
}
