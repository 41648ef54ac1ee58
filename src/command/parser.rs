// src/command/parser.rs

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use super::{CommandError, ParsedCommand};

/// A single leading `NAME=VALUE` assignment.
static ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([a-z0-9_-]+)=([a-z0-9_-]+)$").expect("assignment pattern is valid")
});

/// Parse a raw command line into program, arguments and inline environment.
///
/// Newlines are removed before anything else, so a command wrapped across
/// several lines is joined without a separator. Leading words matching
/// `NAME=VALUE` are collected as environment; the first word that does not
/// match is the program, taken verbatim. Everything after the program is split
/// with [`split_arguments`].
pub fn parse_command(input: &str) -> Result<ParsedCommand, CommandError> {
    let line: String = input.chars().filter(|c| *c != '\n' && *c != '\r').collect();

    let mut environment = BTreeMap::new();
    let mut rest = line.as_str();

    let program = loop {
        let trimmed = rest.trim_start();
        if trimmed.is_empty() {
            return Err(CommandError::NoCommand);
        }

        let end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
        let (word, tail) = trimmed.split_at(end);
        rest = tail;

        match ASSIGNMENT.captures(word) {
            Some(caps) => {
                environment.insert(caps[1].to_string(), caps[2].to_string());
            }
            None => break word.to_string(),
        }
    };

    let base = line.len() - rest.len();
    let arguments = split_arguments(rest).map_err(|err| match err {
        CommandError::UnterminatedQuote { quote, offset } => CommandError::UnterminatedQuote {
            quote,
            offset: base + offset,
        },
        other => other,
    })?;

    Ok(ParsedCommand {
        program,
        arguments,
        environment,
    })
}

/// Split an argument string on whitespace, honouring quote spans.
///
/// A `"` or `'` opens a span that runs to the next occurrence of the same
/// character; its content is appended to the current word literally. Spans
/// join with adjacent unquoted text (`a"b c"d` is one argument, `ab cd`).
/// Empty words, including the result of an empty `""`, are dropped.
pub fn split_arguments(input: &str) -> Result<Vec<String>, CommandError> {
    let mut arguments = Vec::new();
    let mut current = String::new();
    let mut chars = input.char_indices();

    while let Some((offset, ch)) = chars.next() {
        match ch {
            '"' | '\'' => {
                let mut closed = false;
                for (_, inner) in chars.by_ref() {
                    if inner == ch {
                        closed = true;
                        break;
                    }
                    current.push(inner);
                }
                if !closed {
                    return Err(CommandError::UnterminatedQuote { quote: ch, offset });
                }
            }
            c if c.is_whitespace() => {
                if !current.is_empty() {
                    arguments.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }

    if !current.is_empty() {
        arguments.push(current);
    }

    Ok(arguments)
}
