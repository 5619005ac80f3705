//! Application state management for Daily Trivia
//!
//! This module contains the terminal application's display state layered on
//! top of the core session: answer display ordering, cursor position, the
//! reveal-answer toggle, and keyboard input handling.

use crossterm::event::{KeyCode, KeyEvent};

use crate::cli::StartupConfig;
use crate::data::TriviaClient;
use crate::session::TriviaSession;
use crate::store::QuestionStore;

/// Application state enum representing the current view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    /// Initial state while the first load is pending
    Loading,
    /// The daily question view (question, error, or both)
    Question,
}

/// Main application struct managing display state on top of the session
pub struct App {
    /// Core session owning the daily question state
    pub session: TriviaSession,
    /// Current application state/view
    pub state: AppState,
    /// Display order of the current question's answers
    pub answers: Vec<String>,
    /// Index of the highlighted answer row
    pub selected_index: usize,
    /// Whether the correct answer is revealed
    pub show_answer: bool,
    /// Flag to show help overlay
    pub show_help: bool,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Prompt of the question the current display order was built for
    last_prompt: Option<String>,
}

impl App {
    /// Creates a new App instance from the startup configuration
    pub fn new(config: StartupConfig) -> Self {
        let session =
            TriviaSession::with_parts(QuestionStore::new(), TriviaClient::new(), config.difficulty);
        Self::with_session(session)
    }

    /// Creates a new App instance around an existing session
    pub fn with_session(session: TriviaSession) -> Self {
        Self {
            session,
            state: AppState::Loading,
            answers: Vec::new(),
            selected_index: 0,
            show_answer: false,
            show_help: false,
            should_quit: false,
            last_prompt: None,
        }
    }

    /// Loads today's question through the session
    ///
    /// A cache-hit applies immediately; a fetch outcome is picked up by
    /// `on_tick` on a later event-loop pass.
    pub fn load_today(&mut self) {
        self.session.load_today();
        self.sync_display();
    }

    /// Drains completed fetch outcomes and refreshes display state
    ///
    /// Called once per event-loop tick.
    pub fn on_tick(&mut self) {
        let mut changed = false;
        while self.session.poll_fetch() {
            changed = true;
        }
        if changed {
            self.sync_display();
        }
    }

    /// Rebuilds display state from the session
    ///
    /// A newly loaded question gets one freshly shuffled display ordering;
    /// the ordering then stays stable while the user navigates.
    fn sync_display(&mut self) {
        let state = self.session.state();
        if let Some(question) = &state.current_question {
            if self.last_prompt.as_deref() != Some(question.prompt.as_str()) {
                self.answers = question.shuffled_answers();
                self.selected_index = 0;
                self.show_answer = false;
                self.last_prompt = Some(question.prompt.clone());
            }
            self.state = AppState::Question;
        } else if state.error_message.is_some() {
            self.state = AppState::Question;
        }
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Arguments
    /// * `key_event` - The keyboard event to handle
    ///
    /// # Key Bindings
    /// - `q` or `Esc`: Quit the application
    /// - `Up`/`k`, `Down`/`j`: Move the answer cursor
    /// - `Enter` or `Space`: Select the highlighted answer
    /// - `a`: Toggle reveal of the correct answer
    /// - `r`: Retry the fetch after a failure
    /// - `?`: Toggle the help overlay
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Handle help overlay - intercepts all keys when shown
        if self.show_help {
            match key_event.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.show_help = false;
                }
                _ => {} // Ignore other keys when help is shown
            }
            return;
        }

        match self.state {
            AppState::Loading => {
                // Only quit is allowed during loading
                if key_event.code == KeyCode::Char('q') {
                    self.should_quit = true;
                }
            }
            AppState::Question => match key_event.code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.should_quit = true;
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.move_selection_up();
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.move_selection_down();
                }
                KeyCode::Enter | KeyCode::Char(' ') => {
                    self.select_highlighted();
                }
                KeyCode::Char('a') => {
                    self.show_answer = !self.show_answer;
                }
                KeyCode::Char('r') => {
                    self.retry();
                }
                KeyCode::Char('?') => {
                    self.show_help = true;
                }
                _ => {}
            },
        }
    }

    /// Moves the cursor up in the answer list, wrapping to bottom if at top
    fn move_selection_up(&mut self) {
        let count = self.answers.len();
        if count == 0 {
            return;
        }
        if self.selected_index == 0 {
            self.selected_index = count - 1;
        } else {
            self.selected_index -= 1;
        }
    }

    /// Moves the cursor down in the answer list, wrapping to top if at bottom
    fn move_selection_down(&mut self) {
        let count = self.answers.len();
        if count == 0 {
            return;
        }
        self.selected_index = (self.selected_index + 1) % count;
    }

    /// Applies the highlighted answer to the session
    ///
    /// Selection locks after the first pick until the answer is revealed;
    /// with the answer revealed, picking again is allowed.
    fn select_highlighted(&mut self) {
        let locked = self.session.state().selected_answer.is_some() && !self.show_answer;
        if locked {
            return;
        }
        if let Some(answer) = self.answers.get(self.selected_index).cloned() {
            self.session.select_answer(&answer);
        }
    }

    /// Retries the fetch after a failure
    fn retry(&mut self) {
        if self.session.state().error_message.is_some() {
            self.session.load_today();
            self.sync_display();
        }
    }
}
