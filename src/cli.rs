//! Command-line interface parsing for Daily Trivia
//!
//! This module handles parsing of CLI arguments using clap, including the
//! --difficulty flag that filters the fetched question.

use clap::Parser;
use thiserror::Error;

use crate::data::Difficulty;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The specified difficulty name is not recognized
    #[error("Invalid difficulty: '{0}'. Valid difficulties: easy, medium, hard")]
    InvalidDifficulty(String),
}

/// Daily Trivia - one trivia question a day in your terminal
#[derive(Parser, Debug)]
#[command(name = "dailytrivia")]
#[command(about = "Fetch and answer one daily trivia question")]
#[command(version)]
pub struct Cli {
    /// Difficulty of the fetched question
    ///
    /// Examples:
    ///   dailytrivia                      # Any difficulty
    ///   dailytrivia --difficulty easy    # Easy questions only
    ///   dailytrivia --difficulty hard    # Hard questions only
    ///
    /// Only applies when a new question is fetched; a question already
    /// cached for today is reused as-is.
    #[arg(long, value_name = "DIFFICULTY")]
    pub difficulty: Option<String>,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, Default)]
pub struct StartupConfig {
    /// Difficulty filter for cache-miss fetches (if specified)
    pub difficulty: Option<Difficulty>,
}

/// Parses a difficulty string argument into a Difficulty enum.
///
/// # Arguments
/// * `s` - The difficulty string from CLI
///
/// # Returns
/// * `Ok(Difficulty)` if the string matches a valid difficulty
/// * `Err(CliError::InvalidDifficulty)` if the string doesn't match
pub fn parse_difficulty_arg(s: &str) -> Result<Difficulty, CliError> {
    Difficulty::from_str(s).ok_or_else(|| CliError::InvalidDifficulty(s.to_string()))
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Arguments
    /// * `cli` - The parsed CLI struct
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with appropriate settings
    /// * `Err(CliError)` if an invalid difficulty was specified
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        match &cli.difficulty {
            None => Ok(StartupConfig::default()),
            Some(difficulty_str) => {
                let difficulty = parse_difficulty_arg(difficulty_str)?;
                Ok(StartupConfig {
                    difficulty: Some(difficulty),
                })
            }
        }
    }
}
