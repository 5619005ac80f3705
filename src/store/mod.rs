//! Persistence module for the daily question
//!
//! This module provides the question store that persists the cached question
//! together with its fetch date to the filesystem, so repeated launches
//! within the same day can reuse the question without touching the network.

mod question_store;

pub use question_store::{CacheRecord, QuestionStore};
