//! UI rendering module for Daily Trivia
//!
//! This module contains all the rendering logic for the terminal user
//! interface, using the ratatui library for TUI components.

pub mod help_overlay;
pub mod question_view;

pub use help_overlay::render as render_help_overlay;
pub use question_view::render as render_question;
