// src/command/mod.rs

//! Command-line tokenizer.
//!
//! Turns a raw shell-like string such as
//! `VAR1=a VAR2=b echo foo "bar baz"` into a program, its argument list and
//! the inline environment assignments that precede it. No shell is involved:
//! there is no escaping, globbing or variable expansion, only whitespace
//! splitting and verbatim quote spans.
//!
//! - [`parser`] holds the pure parsing functions.

pub mod parser;

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

pub use parser::{parse_command, split_arguments};

/// Result of tokenizing one command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedCommand {
    pub program: String,
    pub arguments: Vec<String>,
    /// Leading `NAME=VALUE` assignments; the last assignment of a name wins.
    pub environment: BTreeMap<String, String>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("No command specified.")]
    NoCommand,

    #[error("Invalid command: unterminated {quote} quote at offset {offset}")]
    UnterminatedQuote { quote: char, offset: usize },
}
