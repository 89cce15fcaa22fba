//! Diagnostics shared by every stage of the pipeline.
//!
//! A [`Diagnostic`] is data, not control flow: stages collect them and the
//! compiler hands the full list back to the caller.

use std::fmt::Write;

use serde::Serialize;
use thiserror::Error;

use crate::token::{Span, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// The source ended while a construct still expected tokens.
    EndOfInput,
    Syntax,
    UndefinedVariable,
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message}")]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub position: Option<Span>,
}

impl Diagnostic {
    pub fn end_of_input() -> Self {
        Self {
            kind: DiagnosticKind::EndOfInput,
            message: "Unexpected end of file.".to_string(),
            position: None,
        }
    }

    /// `Expected <expected> instead of '<token>' at line L char C.`
    pub fn expected(expected: &str, found: &Token<'_>) -> Self {
        Self::syntax(
            format!("Expected {expected} instead of '{}'", found.text),
            found.span,
        )
    }

    pub fn syntax(message: impl AsRef<str>, span: Span) -> Self {
        Self {
            kind: DiagnosticKind::Syntax,
            message: format!(
                "{} at line {} char {}.",
                message.as_ref(),
                span.line,
                span.column
            ),
            position: Some(span),
        }
    }

    pub fn undefined_variable(name: &str, span: Span) -> Self {
        Self {
            kind: DiagnosticKind::UndefinedVariable,
            message: format!(
                "Undefined variable '{name}' at line {} char {}.",
                span.line, span.column
            ),
            position: Some(span),
        }
    }

    /// Formats the diagnostic with the offending source line and a caret
    /// under its column.
    pub fn render(&self, source: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "error: {}", self.message);
        let Some(span) = self.position else {
            return out;
        };
        let Some(line) = source.lines().nth(span.line.saturating_sub(1)) else {
            return out;
        };
        let gutter = " ".repeat(span.line.to_string().len());
        let _ = writeln!(out, "{gutter} |");
        let _ = writeln!(out, "{} | {line}", span.line);
        let _ = writeln!(out, "{gutter} | {}^", " ".repeat(span.column));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    #[test]
    fn expected_message_names_token_and_position() {
        let token = Token::new(TokenKind::Other("@"), "@", Span::new(3, 4));
        let diagnostic = Diagnostic::expected("':'", &token);
        assert_eq!(diagnostic.kind, DiagnosticKind::Syntax);
        assert_eq!(
            diagnostic.to_string(),
            "Expected ':' instead of '@' at line 3 char 4."
        );
        assert_eq!(diagnostic.position, Some(Span::new(3, 4)));
    }

    #[test]
    fn renders_caret_under_column() {
        let source = "PROG p\n    = A1 B1:\nENDPROG";
        let diagnostic = Diagnostic::undefined_variable("B1", Span::new(2, 9));
        let rendered = diagnostic.render(source);
        assert_eq!(
            rendered,
            "error: Undefined variable 'B1' at line 2 char 9.\n  |\n2 |     = A1 B1:\n  |          ^\n"
        );
    }

    #[test]
    fn end_of_input_renders_message_only() {
        let rendered = Diagnostic::end_of_input().render("PROG p");
        assert_eq!(rendered, "error: Unexpected end of file.\n");
    }

    #[test]
    fn serializes_kind_in_kebab_case() {
        let json = serde_json::to_value(Diagnostic::undefined_variable("A1", Span::new(1, 2)))
            .expect("serialize diagnostic");
        assert_eq!(json["kind"], "undefined-variable");
        assert_eq!(json["position"]["line"], 1);
        assert_eq!(json["position"]["column"], 2);
        let json = serde_json::to_value(Diagnostic::end_of_input()).expect("serialize diagnostic");
        assert_eq!(json["kind"], "end-of-input");
        assert!(json["position"].is_null());
    }
}
