//! Parse and filter plain-text work logs.
//!
//! A work log is free text with three kinds of inline fields:
//!
//! ```text
//! @2023-01-01 did setup +1.5 #100
//! @2023-01-02 wrote code +3 +0.5 #200 #201
//! ```
//!
//! Each `@date` starts a [`WorkEntry`]; `+n` adds to its duration, `#n`
//! records a ticket and everything else becomes its body.
//!
//! The crate is organised as a pipeline of concurrently running stages:
//!
//! - [`lexer`] - turns text into [`Token`]s
//! - [`parser`] - folds tokens into entries
//! - [`filter`] - drops entries that fail a predicate chain
//! - [`pipeline`] - the channels and end-of-stream signalling between them
//!
//! For one-shot use without a runtime, [`parse_entries`] runs the lexer and
//! parser on the calling thread:
//!
//! ```
//! use worklog::{parse_entries, ParserConfig};
//!
//! let entries: Vec<_> = parse_entries("@2023-01-01 setup +1.5 #100", &ParserConfig::default())
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(entries[0].duration, 1.5);
//! assert_eq!(entries[0].tickets, vec!["100"]);
//! ```

pub mod entry;
pub mod error;
pub mod filter;
pub mod lexer;
pub mod parser;
pub mod pipeline;

pub use entry::WorkEntry;
pub use error::{WorklogError, WorklogResult};
pub use filter::{EntryFilter, Predicate};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{parse_entries, EntryParser, ParserConfig, DEFAULT_DATE_FORMAT};
pub use pipeline::{EntryStream, Signal};
