//! Folds the token stream into work entries.
//!
//! The parser keeps one in-progress entry (the accumulator). A date token
//! flushes it and starts a new one; durations, tickets and text are added to
//! it; end of input flushes it a final time. Content seen while there is no
//! dated accumulator, such as a preamble before the first `@date`, has
//! nowhere to go and is dropped.

use chrono::NaiveDate;
use tokio::sync::mpsc;

use crate::entry::WorkEntry;
use crate::error::{WorklogError, WorklogResult};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::pipeline::{self, EntryStream, Signal};

/// Date format used when none is configured.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parser settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// chrono `strftime` pattern for the text after the `@` sigil. The
    /// lexer scans date fields in the same shape.
    pub date_format: String,
}

impl ParserConfig {
    /// Creates a config with the given date format.
    pub fn with_date_format(date_format: impl Into<String>) -> Self {
        Self {
            date_format: date_format.into(),
        }
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self::with_date_format(DEFAULT_DATE_FORMAT)
    }
}

/// Entry parser state machine.
#[derive(Debug)]
pub struct EntryParser {
    config: ParserConfig,
    /// The accumulator. `None` until a valid date has been seen.
    current: Option<WorkEntry>,
    finished: bool,
}

impl EntryParser {
    /// Creates a parser with an empty accumulator.
    pub fn new(config: ParserConfig) -> Self {
        Self {
            config,
            current: None,
            finished: false,
        }
    }

    /// Returns true once `EndOfInput` or `Error` has been pushed.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Applies one token.
    ///
    /// Returns the entry flushed by this token, if any. Tokens pushed after
    /// the parser finished are ignored.
    ///
    /// # Errors
    ///
    /// Returns `WorklogError::Lexical` for an `Error` token. The parser is
    /// finished afterwards and the accumulator is discarded.
    pub fn push(&mut self, token: Token) -> WorklogResult<Option<WorkEntry>> {
        if self.finished {
            return Ok(None);
        }

        match token.kind {
            TokenKind::Date => {
                let flushed = self.current.take();
                match parse_date(token.value(), &self.config.date_format) {
                    Some(date) => self.current = Some(WorkEntry::new(date)),
                    None => tracing::warn!(
                        token = %token.raw,
                        format = %self.config.date_format,
                        "unparsable date, dropping entry"
                    ),
                }
                Ok(flushed)
            }

            TokenKind::Duration => {
                match token.value().parse::<f64>() {
                    Ok(amount) => match self.current.as_mut() {
                        Some(entry) => entry.duration += amount,
                        None => tracing::trace!(token = %token, "duration outside an entry"),
                    },
                    Err(err) => {
                        tracing::debug!(token = %token.raw, error = %err, "ignoring malformed duration")
                    }
                }
                Ok(None)
            }

            TokenKind::Ticket => {
                match self.current.as_mut() {
                    Some(entry) => entry.tickets.push(token.value().to_string()),
                    None => tracing::trace!(token = %token, "ticket outside an entry"),
                }
                Ok(None)
            }

            TokenKind::Text => {
                let text = token.raw.trim();
                if text.is_empty() {
                    return Ok(None);
                }
                match self.current.as_mut() {
                    Some(entry) if entry.body.is_empty() => entry.body.push_str(text),
                    Some(entry) => {
                        entry.body.push(' ');
                        entry.body.push_str(text);
                    }
                    None => tracing::trace!(token = %token, "text outside an entry"),
                }
                Ok(None)
            }

            TokenKind::EndOfInput => {
                self.finished = true;
                Ok(self.current.take())
            }

            TokenKind::Error => {
                self.finished = true;
                self.current = None;
                Err(WorklogError::lexical(token.raw))
            }
        }
    }
}

/// Parses a date, requiring the text to be exactly what `format` would
/// print for it. This rejects unpadded fields such as `2023-1-5`.
fn parse_date(value: &str, format: &str) -> Option<NaiveDate> {
    let date = NaiveDate::parse_from_str(value, format).ok()?;
    (date.format(format).to_string() == value).then_some(date)
}

/// Iterator adapter that parses a token sequence synchronously.
pub struct Entries<I> {
    tokens: I,
    parser: EntryParser,
}

impl<I> Entries<I>
where
    I: Iterator<Item = Token>,
{
    /// Wraps a token iterator.
    pub fn new(tokens: I, config: ParserConfig) -> Self {
        Self {
            tokens,
            parser: EntryParser::new(config),
        }
    }
}

impl<I> Iterator for Entries<I>
where
    I: Iterator<Item = Token>,
{
    type Item = WorklogResult<WorkEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.parser.is_finished() {
            let Some(token) = self.tokens.next() else {
                self.parser.finished = true;
                return Some(Err(WorklogError::stream_closed("lexer")));
            };
            match self.parser.push(token) {
                Ok(Some(entry)) => return Some(Ok(entry)),
                Ok(None) => {}
                Err(err) => return Some(Err(err)),
            }
        }
        None
    }
}

/// Tokenizes and parses `input` on the calling thread.
pub fn parse_entries<'a>(input: &'a str, config: &ParserConfig) -> Entries<Lexer<'a>> {
    Entries::new(
        Lexer::with_date_format(input, &config.date_format),
        config.clone(),
    )
}

/// Runs the parser on its own task, reading tokens from `tokens`.
pub fn spawn(mut tokens: mpsc::Receiver<Token>, config: ParserConfig) -> EntryStream {
    let (tx, stream) = pipeline::channel("parser");
    tokio::spawn(async move {
        let mut parser = EntryParser::new(config);
        let mut emitted = 0usize;

        let terminal = loop {
            let Some(token) = tokens.recv().await else {
                break Signal::Failed(WorklogError::stream_closed("lexer"));
            };
            match parser.push(token) {
                Ok(flushed) => {
                    if let Some(entry) = flushed {
                        if tx.send(Signal::Entry(entry)).await.is_err() {
                            tracing::debug!("entry receiver dropped, parser stopping");
                            return;
                        }
                        emitted += 1;
                    }
                    if parser.is_finished() {
                        break Signal::Done;
                    }
                }
                Err(err) => break Signal::Failed(err),
            }
        };

        tracing::debug!(entries = emitted, ?terminal, "parser finished");
        // The receiver may already be gone; nothing is waiting for the marker then.
        let _ = tx.send(terminal).await;
    });
    stream
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn parse(input: &str) -> Vec<WorkEntry> {
        parse_entries(input, &ParserConfig::default())
            .collect::<WorklogResult<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_parse_reference_log() {
        let entries = parse(
            "@2023-01-01 did setup +1.5 #100\n@2023-01-02 wrote code +3 +0.5 #200 #201\n",
        );
        assert_eq!(
            entries,
            vec![
                WorkEntry {
                    date: date(2023, 1, 1),
                    duration: 1.5,
                    body: "did setup".to_string(),
                    tickets: vec!["100".to_string()],
                },
                WorkEntry {
                    date: date(2023, 1, 2),
                    duration: 3.5,
                    body: "wrote code".to_string(),
                    tickets: vec!["200".to_string(), "201".to_string()],
                },
            ]
        );
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        assert!(parse("").is_empty());
        assert!(parse("   \n").is_empty());
    }

    #[test]
    fn test_preamble_before_first_date_is_dropped() {
        let entries = parse("notes +8 #1 more\n@2023-01-01 real");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].body, "real");
        assert_eq!(entries[0].duration, 0.0);
        assert!(entries[0].tickets.is_empty());
    }

    #[test]
    fn test_one_entry_per_date_marker() {
        let entries = parse("@2023-01-01\n@2023-01-02\n@2023-01-03 x\n@2023-01-04");
        let dates: Vec<NaiveDate> = entries.iter().map(|e| e.date).collect();
        assert_eq!(
            dates,
            vec![
                date(2023, 1, 1),
                date(2023, 1, 2),
                date(2023, 1, 3),
                date(2023, 1, 4)
            ]
        );
    }

    #[test]
    fn test_text_fragments_joined_by_single_space() {
        let entries = parse("@2023-01-01   first  +1\t second\n#3   third   ");
        assert_eq!(entries[0].body, "first second third");
    }

    #[test]
    fn test_whitespace_only_fragments_add_nothing() {
        let entries = parse("@2023-01-01 +1 #2 \n");
        assert_eq!(entries[0].body, "");
    }

    #[test]
    fn test_tickets_keep_order_and_duplicates() {
        let entries = parse("@2023-01-01 #3 #1 #3");
        assert_eq!(entries[0].tickets, vec!["3", "1", "3"]);
    }

    #[test]
    fn test_malformed_duration_is_ignored() {
        // A bare sigil scans as a duration with no digits.
        let entries = parse("@2023-01-01 +2 + +0.25");
        assert_eq!(entries[0].duration, 2.25);
    }

    #[test]
    fn test_unparsable_date_drops_its_segment() {
        let entries = parse("@2023-01-01 kept +1\n@2023-13-40 lost +5 #9\n@2023-01-03 also kept");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].body, "kept");
        assert_eq!(entries[0].duration, 1.0);
        assert_eq!(entries[1].date, date(2023, 1, 3));
        assert_eq!(entries[1].body, "also kept");
    }

    #[test]
    fn test_unparsable_date_does_not_clobber_previous_entry() {
        // The previous entry is flushed intact before the bad marker.
        let entries = parse("@2023-01-01 a +1\n@2023-02-30 b +2");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].body, "a");
        assert_eq!(entries[0].duration, 1.0);
    }

    #[test]
    fn test_short_date_is_rejected() {
        assert!(parse("@23-1-1 x").is_empty());
    }

    #[test]
    fn test_custom_date_format() {
        let config = ParserConfig::with_date_format("%Y/%m/%d");
        let mut parser = EntryParser::new(config);
        assert_eq!(parser.push(Token::new(TokenKind::Date, "@2023/01/05")), Ok(None));
        let entry = parser
            .push(Token::new(TokenKind::EndOfInput, ""))
            .unwrap()
            .unwrap();
        assert_eq!(entry.date, date(2023, 1, 5));
    }

    #[test]
    fn test_custom_date_format_end_to_end() {
        let config = ParserConfig::with_date_format("%Y/%m/%d");
        let entries = parse_entries("@2023/01/05 did work +2
@2023/01/06 more #4", &config)
            .collect::<WorklogResult<Vec<_>>>()
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].date, date(2023, 1, 5));
        assert_eq!(entries[0].body, "did work");
        assert_eq!(entries[0].duration, 2.0);
        assert_eq!(entries[1].tickets, vec!["4"]);
    }

    #[test]
    fn test_text_trim_handles_crlf() {
        let entries = parse("@2023-01-01 a +1\r\n@2023-01-02 b\r\n");
        assert_eq!(entries[0].body, "a");
        assert_eq!(entries[1].body, "b");
    }

    #[test]
    fn test_error_token_is_fatal() {
        let mut parser = EntryParser::new(ParserConfig::default());
        parser
            .push(Token::new(TokenKind::Date, "@2023-01-01"))
            .unwrap();
        assert_eq!(
            parser.push(Token::error("unterminated field")),
            Err(WorklogError::lexical("unterminated field"))
        );
        assert!(parser.is_finished());
        // The accumulator is gone; nothing more comes out.
        assert_eq!(parser.push(Token::new(TokenKind::EndOfInput, "")), Ok(None));
    }

    #[test]
    fn test_end_of_input_flushes_exactly_once() {
        let mut parser = EntryParser::new(ParserConfig::default());
        parser
            .push(Token::new(TokenKind::Date, "@2023-01-01"))
            .unwrap();
        assert!(parser
            .push(Token::new(TokenKind::EndOfInput, ""))
            .unwrap()
            .is_some());
        assert_eq!(parser.push(Token::new(TokenKind::EndOfInput, "")), Ok(None));
    }

    #[test]
    fn test_entries_reports_truncated_token_stream() {
        let tokens = vec![Token::new(TokenKind::Date, "@2023-01-01")];
        let results: Vec<_> = Entries::new(tokens.into_iter(), ParserConfig::default()).collect();
        assert_eq!(results, vec![Err(WorklogError::stream_closed("lexer"))]);
    }

    #[test]
    fn test_entries_stops_after_error() {
        let tokens = vec![
            Token::new(TokenKind::Date, "@2023-01-01"),
            Token::error("boom"),
            Token::new(TokenKind::Date, "@2023-01-02"),
        ];
        let results: Vec<_> = Entries::new(tokens.into_iter(), ParserConfig::default()).collect();
        assert_eq!(results, vec![Err(WorklogError::lexical("boom"))]);
    }

    #[tokio::test]
    async fn test_spawned_parser_signals_done_after_last_entry() {
        let (tx, rx) = mpsc::channel(1);
        let mut stream = spawn(rx, ParserConfig::default());
        tokio::spawn(async move {
            for token in Lexer::new("@2023-01-01 a\n@2023-01-02 b") {
                tx.send(token).await.unwrap();
            }
        });

        assert_eq!(stream.recv_signal().await, Signal::Entry(parse("@2023-01-01 a")[0].clone()));
        assert!(matches!(stream.recv_signal().await, Signal::Entry(e) if e.body == "b"));
        assert_eq!(stream.recv_signal().await, Signal::Done);
    }

    #[tokio::test]
    async fn test_spawned_parser_forwards_lexical_error() {
        let (tx, rx) = mpsc::channel(1);
        let stream = spawn(rx, ParserConfig::default());
        tokio::spawn(async move {
            tx.send(Token::new(TokenKind::Date, "@2023-01-01")).await.unwrap();
            tx.send(Token::error("boom")).await.unwrap();
        });

        assert_eq!(stream.collect().await, Err(WorklogError::lexical("boom")));
    }

    #[tokio::test]
    async fn test_spawned_parser_reports_vanished_lexer() {
        let (tx, rx) = mpsc::channel::<Token>(1);
        let stream = spawn(rx, ParserConfig::default());
        drop(tx);

        assert_eq!(
            stream.collect().await,
            Err(WorklogError::stream_closed("lexer"))
        );
    }
}
