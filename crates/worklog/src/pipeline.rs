//! Stage wiring for the tokenize → parse → filter pipeline.
//!
//! Every stage runs on its own tokio task and hands items to the next one
//! through a single-slot channel, so a slow consumer holds back everything
//! upstream of it. Completion travels downstream as an explicit
//! [`Signal::Done`] marker after the last entry; there is no way for a
//! consumer to stop a producer other than dropping its receiver.

use tokio::sync::mpsc;

use crate::entry::WorkEntry;
use crate::error::{WorklogError, WorklogResult};
use crate::lexer;
use crate::parser::{self, ParserConfig};

/// Capacity of every stage-to-stage channel.
pub(crate) const HANDOFF_CAPACITY: usize = 1;

/// An item travelling between entry stages.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    /// A completed entry.
    Entry(WorkEntry),
    /// Upstream reached the end of its input. Nothing follows.
    Done,
    /// Upstream failed. Nothing follows.
    Failed(WorklogError),
}

/// Receiving end of an entry stage.
#[derive(Debug)]
pub struct EntryStream {
    rx: mpsc::Receiver<Signal>,
    /// Name of the stage feeding this stream, for diagnostics.
    stage: &'static str,
    finished: bool,
}

/// Creates a connected sender and [`EntryStream`].
///
/// `stage` names the producer in [`WorklogError::StreamClosed`] if the
/// sender is dropped before it sends [`Signal::Done`].
pub fn channel(stage: &'static str) -> (mpsc::Sender<Signal>, EntryStream) {
    let (tx, rx) = mpsc::channel(HANDOFF_CAPACITY);
    let stream = EntryStream {
        rx,
        stage,
        finished: false,
    };
    (tx, stream)
}

impl EntryStream {
    /// Receives the next raw signal.
    ///
    /// A producer that disappears without a terminal marker shows up as
    /// [`Signal::Failed`]; after a terminal signal this keeps returning
    /// [`Signal::Done`].
    pub async fn recv_signal(&mut self) -> Signal {
        if self.finished {
            return Signal::Done;
        }
        let signal = match self.rx.recv().await {
            Some(signal) => signal,
            None => Signal::Failed(WorklogError::stream_closed(self.stage)),
        };
        if !matches!(signal, Signal::Entry(_)) {
            self.finished = true;
        }
        signal
    }

    /// Receives the next entry.
    ///
    /// Returns `Ok(None)` once the stream has completed.
    pub async fn next(&mut self) -> WorklogResult<Option<WorkEntry>> {
        match self.recv_signal().await {
            Signal::Entry(entry) => Ok(Some(entry)),
            Signal::Done => Ok(None),
            Signal::Failed(err) => Err(err),
        }
    }

    /// Drains the stream into a vector.
    pub async fn collect(mut self) -> WorklogResult<Vec<WorkEntry>> {
        let mut entries = Vec::new();
        while let Some(entry) = self.next().await? {
            entries.push(entry);
        }
        Ok(entries)
    }
}

/// Starts the lexer and parser stages over `input`.
///
/// Must be called from within a tokio runtime.
pub fn parse(input: impl Into<String>, config: ParserConfig) -> EntryStream {
    let tokens = lexer::spawn(input.into(), &config.date_format);
    parser::spawn(tokens, config)
}
