//! Best-effort parsing of two-part generated answers.
//!
//! Prompts asking for two answers (`A1. ...` then `A2. ...`) do not always get them back in the
//! requested shape. Extraction never fails: a malformed answer is logged and the missing parts
//! come back empty.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{Error, Result};

/// The two answers of a two-part generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerPair {
    pub first: String,
    /// The second answer with its leading label (`Q2. The revised claim is:`) removed.
    pub second: String,
}

/// Split `text` into its two answers.
///
/// Answers are separated by a blank line, or by a single newline when that does not give exactly
/// two parts.
pub fn split_answer_pair(text: &str) -> AnswerPair {
    let text = text.trim();
    let mut parts: Vec<&str> = text.split("\n\n").collect();
    if parts.len() != 2 {
        parts = text.split('\n').collect();
    }

    let first = parts.first().map(|p| p.trim().to_string()).unwrap_or_default();
    match second_answer(&parts) {
        Ok(second) => AnswerPair { first, second },
        Err(e) => {
            warn!(error = %e, generated = %text, "could not extract answer pair");
            AnswerPair {
                first,
                second: String::new(),
            }
        }
    }
}

fn second_answer(parts: &[&str]) -> Result<String> {
    let raw = parts
        .get(1)
        .ok_or_else(|| Error::malformed(format!("expected two answers, found {}", parts.len())))?
        .trim();
    Ok(strip_label(raw))
}

fn strip_label(answer: &str) -> String {
    let sep = if answer.contains(':') { ':' } else { '.' };
    answer.split(sep).skip(1).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_line_separated() {
        let pair = split_answer_pair(
            "\nA1. The abstract supports the claim.\n\nA2. The revised claim could be: snow is cold.",
        );
        assert_eq!(pair.first, "A1. The abstract supports the claim.");
        assert_eq!(pair.second, " snow is cold.");
    }

    #[test]
    fn falls_back_to_single_newlines() {
        let pair = split_answer_pair("related\nQ2. Colds spread by contact\nextra");
        assert_eq!(pair.first, "related");
        assert_eq!(pair.second, " Colds spread by contact");
    }

    #[test]
    fn label_without_colon_splits_on_period() {
        assert_eq!(strip_label("A2. one. two"), " one  two");
        assert_eq!(strip_label("no label here"), "");
    }

    #[test]
    fn single_answer_degrades_to_empty_second() {
        let pair = split_answer_pair("only one answer");
        assert_eq!(pair.first, "only one answer");
        assert_eq!(pair.second, "");
    }

    #[test]
    fn empty_text() {
        assert_eq!(split_answer_pair("   "), AnswerPair::default());
    }
}
