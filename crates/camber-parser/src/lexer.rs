//! Line tokenizer for G-code.
//!
//! Splits one source line into letter/number words and comment text.
//! Comments come in two styles: trailing `;...` to end of line and inline
//! parenthesized `(...)`. Both are stripped before word extraction, but the
//! caller keeps the original line verbatim for re-display.
//!
//! Tokenizing never fails: malformed input becomes a [`Diagnostic`] on the
//! line and the rest of the line is still lexed.

use winnow::{
    ModalResult, Parser,
    ascii::float,
    token::one_of,
};

use camber_core::diagnostics::{Diagnostic, DiagnosticCode};
use camber_core::program::Word;

/// The lexed form of one source line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LexedLine {
    /// Words in source order.
    pub words: Vec<Word>,
    /// Comment text with delimiters stripped; multiple comments on one line
    /// are joined with a space.
    pub comment: Option<String>,
    /// Problems found while lexing this line.
    pub diagnostics: Vec<Diagnostic>,
}

/// Parses a single `letter` + `number` word (`X10.5`, `G1`, `M3`).
fn word(input: &mut &str) -> ModalResult<Word> {
    let letter = one_of(('a'..='z', 'A'..='Z')).parse_next(input)?;
    let value: f64 = float.parse_next(input)?;
    Ok(Word::new(letter, value))
}

/// Tokenizes one line; `line_number` is 1-based and used for diagnostics.
pub fn tokenize_line(line: &str, line_number: usize) -> LexedLine {
    let mut lexed = LexedLine::default();
    let mut rest = line;

    while let Some(c) = rest.chars().next() {
        if c.is_whitespace() {
            rest = &rest[c.len_utf8()..];
            continue;
        }

        if c == ';' {
            push_comment(&mut lexed.comment, rest[1..].trim());
            break;
        }

        if c == '(' {
            match rest[1..].find(')') {
                Some(close) => {
                    push_comment(&mut lexed.comment, rest[1..1 + close].trim());
                    rest = &rest[close + 2..];
                }
                None => {
                    lexed.diagnostics.push(Diagnostic::new(
                        DiagnosticCode::E002,
                        line_number,
                        "comment `(` is never closed",
                    ));
                    push_comment(&mut lexed.comment, rest[1..].trim());
                    rest = "";
                }
            }
            continue;
        }

        if c.is_ascii_alphabetic() {
            // Parse a copy: on failure winnow has already consumed the
            // letter, and the diagnostic needs the whole bad token.
            let mut attempt = rest;
            match word.parse_next(&mut attempt) {
                Ok(w) => {
                    lexed.words.push(w);
                    rest = attempt;
                }
                Err(_) => {
                    let token = leading_token(rest);
                    lexed.diagnostics.push(Diagnostic::new(
                        DiagnosticCode::E001,
                        line_number,
                        format!("expected a number after `{token}`"),
                    ));
                    rest = &rest[token.len()..];
                }
            }
            continue;
        }

        // Anything else is garbage; diagnose and resynchronize.
        let token = leading_token(rest);
        lexed.diagnostics.push(Diagnostic::new(
            DiagnosticCode::E001,
            line_number,
            format!("unexpected `{token}`"),
        ));
        rest = &rest[token.len()..];
    }

    lexed
}

fn push_comment(slot: &mut Option<String>, text: &str) {
    if text.is_empty() {
        return;
    }
    match slot {
        Some(existing) => {
            existing.push(' ');
            existing.push_str(text);
        }
        None => *slot = Some(text.to_string()),
    }
}

/// The run of characters up to the next whitespace or comment delimiter,
/// at least one character when the input is non-empty.
fn leading_token(input: &str) -> &str {
    let end = input
        .find(|c: char| c.is_whitespace() || c == ';' || c == '(')
        .unwrap_or(input.len())
        .max(1)
        .min(input.len());
    &input[..end]
}
