use std::str::Lines;

use crate::token::{Keyword, Operator, Span, Token, TokenKind};

/// Line-oriented lexer. Every non-whitespace run becomes exactly one token;
/// comments are dropped and anything unrecognised is passed on as
/// [`TokenKind::Other`] for the parser to reject.
pub struct Lexer<'a> {
    lines: Lines<'a>,
    current: &'a str,
    offset: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut lines = input.lines();
        let current = lines.next().unwrap_or("");
        Self {
            lines,
            current,
            offset: 0,
            line: 1,
            column: 0,
        }
    }

    pub fn next_token(&mut self) -> Option<Token<'a>> {
        loop {
            self.skip_whitespace();
            if self.offset >= self.current.len() {
                let next = self.lines.next()?;
                self.current = next;
                self.offset = 0;
                self.line += 1;
                self.column = 0;
                continue;
            }

            let start = self.offset;
            let span = Span::new(self.line, self.column);
            let (kind, len) = self.classify(start);
            let text = &self.current[start..start + len];
            self.offset += len;
            self.column += text.chars().count();

            match kind {
                Some(kind) => return Some(Token::new(kind, text, span)),
                // comment
                None => continue,
            }
        }
    }

    /// Tries each token class in priority order at `start`. Returns the kind
    /// (or `None` for a comment) and the byte length of the lexeme.
    fn classify(&self, start: usize) -> (Option<TokenKind<'a>>, usize) {
        let line = self.current;

        if let Some((keyword, len)) = match_keyword(line, start) {
            return (Some(TokenKind::Keyword(keyword)), len);
        }
        if let Some((operator, len)) = match_operator(line, start) {
            return (Some(TokenKind::Operator(operator)), len);
        }
        if let Some(len) = match_string(line, start) {
            let body = &line[start + 1..start + len - 1];
            return (Some(TokenKind::String(body)), len);
        }
        if let Some(len) = match_number(line, start) {
            return (Some(TokenKind::Number(&line[start..start + len])), len);
        }
        if let Some(len) = match_variable(line, start) {
            return (Some(TokenKind::Variable(&line[start..start + len])), len);
        }
        if let Some(len) = match_identifier(line, start) {
            return (Some(TokenKind::Identifier(&line[start..start + len])), len);
        }
        if line[start..].starts_with('#') {
            return (None, line.len() - start);
        }

        let len = line[start..]
            .find(char::is_whitespace)
            .unwrap_or(line.len() - start);
        (Some(TokenKind::Other(&line[start..start + len])), len)
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.current[self.offset..];
        let trimmed = rest.trim_start();
        let skipped = &rest[..rest.len() - trimmed.len()];
        self.offset += skipped.len();
        self.column += skipped.chars().count();
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// Regex `\b` over ASCII word characters.
fn is_boundary(line: &str, index: usize) -> bool {
    let bytes = line.as_bytes();
    let before = index > 0 && is_word_byte(bytes[index - 1]);
    let after = index < bytes.len() && is_word_byte(bytes[index]);
    before != after
}

fn run_len(line: &str, start: usize, accept: impl Fn(u8) -> bool) -> usize {
    line.as_bytes()[start..]
        .iter()
        .take_while(|byte| accept(**byte))
        .count()
}

fn match_keyword(line: &str, start: usize) -> Option<(Keyword, usize)> {
    if !is_boundary(line, start) {
        return None;
    }
    let len = run_len(line, start, is_word_byte);
    Keyword::from_word(&line[start..start + len]).map(|keyword| (keyword, len))
}

fn match_operator(line: &str, start: usize) -> Option<(Operator, usize)> {
    let rest = &line[start..];
    Operator::ALL
        .into_iter()
        .find(|operator| rest.starts_with(operator.as_str()))
        .map(|operator| (operator, operator.as_str().len()))
}

fn match_string(line: &str, start: usize) -> Option<usize> {
    let bytes = line.as_bytes();
    if bytes[start] != b'"' {
        return None;
    }
    let body = run_len(line, start + 1, |byte| {
        matches!(byte, b' ' | b'!' | b'#'..=b'~')
    });
    let close = start + 1 + body;
    (bytes.get(close) == Some(&b'"')).then_some(body + 2)
}

fn match_number(line: &str, start: usize) -> Option<usize> {
    if !is_boundary(line, start) {
        return None;
    }
    let bytes = line.as_bytes();
    let whole = run_len(line, start, |byte| byte.is_ascii_digit());
    if whole == 0 {
        return None;
    }
    let end = start + whole;
    if bytes.get(end) == Some(&b'.') {
        let fraction = run_len(line, end + 1, |byte| byte.is_ascii_digit());
        if fraction > 0 && is_boundary(line, end + 1 + fraction) {
            return Some(whole + 1 + fraction);
        }
    }
    is_boundary(line, end).then_some(whole)
}

fn match_variable(line: &str, start: usize) -> Option<usize> {
    if !is_boundary(line, start) || !line.as_bytes()[start].is_ascii_uppercase() {
        return None;
    }
    let len = 1 + run_len(line, start + 1, |byte| byte.is_ascii_digit());
    is_boundary(line, start + len).then_some(len)
}

fn match_identifier(line: &str, start: usize) -> Option<usize> {
    if !is_boundary(line, start) {
        return None;
    }
    let len = run_len(line, start, |byte| byte.is_ascii_alphabetic() || byte == b'_');
    (len > 0 && is_boundary(line, start + len)).then_some(len)
}

pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}
