//! Lexer (tokenizer) for work log text.
//!
//! Fields are introduced by a sigil character; everything else is free text:
//!
//! - `@2023-01-02` - a date, starts a new entry
//! - `+1.5` - a duration
//! - `#1234` - a ticket reference
//!
//! The sigils never occur inside free text, so one character of lookahead
//! decides what comes next and the input is scanned in a single pass.
//!
//! How much input a date field covers follows the configured chrono format:
//! `%Y/%m/%d` scans `@2023/01/05`, `%d %b %Y` scans `@05 Jan 2023`.

use std::fmt;

use chrono::format::{Item, Numeric, StrftimeItems};
use tokio::sync::mpsc;

use crate::parser::DEFAULT_DATE_FORMAT;
use crate::pipeline::HANDOFF_CAPACITY;

/// Sigil that starts a duration field.
pub const DURATION_SIGIL: char = '+';

/// Sigil that starts a date field.
pub const DATE_SIGIL: char = '@';

/// Sigil that starts a ticket field.
pub const TICKET_SIGIL: char = '#';

/// The kind of a lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Unrecoverable lexical failure; `raw` holds the diagnostic.
    Error,
    /// End of input. Always the last token of a successful scan.
    EndOfInput,
    /// `@` followed by a date in the configured format.
    Date,
    /// `+n` or `+n.m`
    Duration,
    /// Free text between fields, whitespace included.
    Text,
    /// `#n`
    Ticket,
}

/// A token together with the exact input it was scanned from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The token kind.
    pub kind: TokenKind,
    /// Consumed input, sigil included.
    pub raw: String,
}

impl Token {
    /// Creates a token of the given kind.
    pub fn new(kind: TokenKind, raw: impl Into<String>) -> Self {
        Self {
            kind,
            raw: raw.into(),
        }
    }

    /// Creates an `Error` token carrying a diagnostic message.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(TokenKind::Error, message)
    }

    /// Returns the token text without its leading sigil.
    pub fn value(&self) -> &str {
        match self.kind {
            TokenKind::Date => self.raw.strip_prefix(DATE_SIGIL).unwrap_or(&self.raw),
            TokenKind::Duration => self.raw.strip_prefix(DURATION_SIGIL).unwrap_or(&self.raw),
            TokenKind::Ticket => self.raw.strip_prefix(TICKET_SIGIL).unwrap_or(&self.raw),
            _ => &self.raw,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::EndOfInput => write!(f, "EOF"),
            TokenKind::Error => write!(f, "{}", self.raw),
            kind if self.raw.chars().count() > 10 => {
                let head: String = self.raw.chars().take(10).collect();
                write!(f, "{kind:?} {head:?}...")
            }
            kind => write!(f, "{kind:?} {:?}", self.raw),
        }
    }
}

/// Scanner states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Text,
    Duration,
    Date,
    Ticket,
    Done,
}

/// One piece of a date field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateStep {
    /// Up to this many ASCII digits.
    Digits(usize),
    /// Exactly this character.
    Literal(char),
    /// A run of letters (month and weekday names, AM/PM).
    Word,
    /// A run of spaces or tabs.
    Blank,
}

/// The shape of a date field, derived from a chrono format string.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DatePattern {
    steps: Vec<DateStep>,
}

impl DatePattern {
    fn new(format: &str) -> Self {
        let mut steps = Vec::new();
        for item in StrftimeItems::new(format) {
            match item {
                Item::Literal(text) => steps.extend(text.chars().map(DateStep::Literal)),
                Item::Space(_) => steps.push(DateStep::Blank),
                Item::Numeric(numeric, _) => steps.push(DateStep::Digits(numeric_width(&numeric))),
                Item::Fixed(_) => steps.push(DateStep::Word),
                _ => {}
            }
        }
        Self { steps }
    }
}

/// Widest zero-padded rendering of a numeric field.
fn numeric_width(numeric: &Numeric) -> usize {
    match numeric {
        Numeric::Year | Numeric::IsoYear => 4,
        Numeric::Ordinal => 3,
        Numeric::NumDaysFromSun | Numeric::WeekdayFromMon => 1,
        Numeric::Nanosecond => 9,
        Numeric::Timestamp => 19,
        _ => 2,
    }
}

/// Lexer for work log text.
///
/// The lexer is an iterator: tokens are produced on demand, in input order,
/// and the sequence ends after `EndOfInput` (or `Error`).
pub struct Lexer<'a> {
    input: &'a str,
    /// Byte offset where the current token starts.
    start: usize,
    /// Current byte position in the input string.
    position: usize,
    state: State,
    date: DatePattern,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input string, scanning dates in
    /// the default `%Y-%m-%d` format.
    pub fn new(input: &'a str) -> Self {
        Self::with_date_format(input, DEFAULT_DATE_FORMAT)
    }

    /// Creates a lexer that scans dates written in `date_format`.
    pub fn with_date_format(input: &'a str, date_format: &str) -> Self {
        Self::with_pattern(input, DatePattern::new(date_format))
    }

    fn with_pattern(input: &'a str, date: DatePattern) -> Self {
        Self {
            input,
            start: 0,
            position: 0,
            state: State::Text,
            date,
        }
    }

    /// Peeks at the next character without consuming it.
    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    /// Consumes and returns the next character, updating position.
    fn next_char(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += c.len_utf8();
        Some(c)
    }

    /// Consumes the next character if it satisfies `valid`.
    fn accept(&mut self, valid: impl Fn(char) -> bool) -> bool {
        match self.peek() {
            Some(c) if valid(c) => {
                self.next_char();
                true
            }
            _ => false,
        }
    }

    /// Consumes up to `n` characters satisfying `valid`; true if all `n` matched.
    fn accept_n(&mut self, valid: impl Fn(char) -> bool, n: usize) -> bool {
        for _ in 0..n {
            if !self.accept(&valid) {
                return false;
            }
        }
        true
    }

    /// Consumes every following character satisfying `valid`.
    fn accept_run(&mut self, valid: impl Fn(char) -> bool) {
        while self.accept(&valid) {}
    }

    /// Cuts the token spanning `start..position`.
    fn emit(&mut self, kind: TokenKind) -> Token {
        let token = Token::new(kind, &self.input[self.start..self.position]);
        self.start = self.position;
        token
    }

    /// Emits pending free text, if there is any.
    fn emit_pending_text(&mut self) -> Option<Token> {
        (self.position > self.start).then(|| self.emit(TokenKind::Text))
    }

    /// Scans free text up to the next sigil or the end of input.
    ///
    /// Returns `None` when the state changed without anything to emit.
    fn scan_text(&mut self) -> Option<Token> {
        loop {
            let Some(c) = self.peek() else {
                if let Some(text) = self.emit_pending_text() {
                    return Some(text);
                }
                self.state = State::Done;
                return Some(self.emit(TokenKind::EndOfInput));
            };

            let next_state = match c {
                DURATION_SIGIL => State::Duration,
                DATE_SIGIL => State::Date,
                TICKET_SIGIL => State::Ticket,
                _ => {
                    self.next_char();
                    continue;
                }
            };
            self.state = next_state;
            return self.emit_pending_text();
        }
    }

    /// Scans `+digits[.digits]`.
    fn scan_duration(&mut self) -> Token {
        self.accept(|c| c == DURATION_SIGIL);
        self.accept_run(|c| c.is_ascii_digit());
        if self.accept(|c| c == '.') {
            self.accept_run(|c| c.is_ascii_digit());
        }
        self.state = State::Text;
        self.emit(TokenKind::Duration)
    }

    /// Scans `@` and a date shaped like the configured format.
    ///
    /// Short digit groups are not an error here: whatever matched is emitted
    /// and the parser decides whether it is a usable date.
    fn scan_date(&mut self) -> Token {
        self.accept(|c| c == DATE_SIGIL);
        for i in 0..self.date.steps.len() {
            let step = self.date.steps[i];
            match step {
                DateStep::Digits(n) => {
                    self.accept_n(|c| c.is_ascii_digit(), n);
                }
                DateStep::Literal(expected) => {
                    self.accept(|c| c == expected);
                }
                DateStep::Word => self.accept_run(char::is_alphabetic),
                DateStep::Blank => self.accept_run(|c| c == ' ' || c == '\t'),
            }
        }
        self.state = State::Text;
        self.emit(TokenKind::Date)
    }

    /// Scans `#digits`.
    fn scan_ticket(&mut self) -> Token {
        self.accept(|c| c == TICKET_SIGIL);
        self.accept_run(|c| c.is_ascii_digit());
        self.state = State::Text;
        self.emit(TokenKind::Ticket)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            match self.state {
                State::Done => return None,
                State::Text => {
                    if let Some(token) = self.scan_text() {
                        return Some(token);
                    }
                }
                State::Duration => return Some(self.scan_duration()),
                State::Date => return Some(self.scan_date()),
                State::Ticket => return Some(self.scan_ticket()),
            }
        }
    }
}

impl std::iter::FusedIterator for Lexer<'_> {}

/// Runs a lexer over `input` on its own task, scanning dates written in
/// `date_format`.
///
/// Tokens are handed over one at a time; the task stops early if the
/// receiver is dropped.
pub fn spawn(input: String, date_format: &str) -> mpsc::Receiver<Token> {
    let (tx, rx) = mpsc::channel(HANDOFF_CAPACITY);
    let date = DatePattern::new(date_format);
    tokio::spawn(async move {
        tracing::debug!(bytes = input.len(), "lexer started");
        for token in Lexer::with_pattern(&input, date) {
            if tx.send(token).await.is_err() {
                tracing::debug!("token receiver dropped, lexer stopping");
                return;
            }
        }
        tracing::debug!("lexer finished");
    });
    rx
}
