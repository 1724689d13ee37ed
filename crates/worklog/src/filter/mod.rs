//! Predicate filter stage for entry streams.
//!
//! An [`EntryFilter`] sits between an upstream [`EntryStream`] and its
//! consumer and forwards only the entries that every predicate accepts.
//! The filter knows nothing about dates or tickets; the stock predicates in
//! [`predicates`] are ordinary closures.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use worklog::filter::{predicates, EntryFilter};
//! use worklog::pipeline;
//! use worklog::ParserConfig;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let upstream = pipeline::parse(
//!     "@2023-01-01 setup +1.5 #100\n@2023-01-02 code +3 #200",
//!     ParserConfig::default(),
//! );
//!
//! let mut filter = EntryFilter::new(upstream);
//! filter.add(predicates::has_ticket("200"));
//! filter.add(predicates::after(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()));
//!
//! let entries = filter.start().collect().await.unwrap();
//! assert_eq!(entries.len(), 1);
//! assert_eq!(entries[0].body, "code");
//! # }
//! ```

pub mod predicates;

use crate::entry::WorkEntry;
use crate::pipeline::{self, EntryStream, Signal};

/// A boolean test over an entry.
pub type Predicate = Box<dyn Fn(&WorkEntry) -> bool + Send + Sync>;

/// Conjunctive predicate chain over an entry stream.
///
/// Predicates are added before [`start`](EntryFilter::start); starting
/// consumes the filter, so the chain cannot change while it runs.
pub struct EntryFilter {
    upstream: EntryStream,
    predicates: Vec<Predicate>,
}

impl EntryFilter {
    /// Creates a filter with an empty chain, which accepts everything.
    pub fn new(upstream: EntryStream) -> Self {
        Self {
            upstream,
            predicates: Vec::new(),
        }
    }

    /// Appends a predicate to the chain.
    pub fn add<P>(&mut self, predicate: P) -> &mut Self
    where
        P: Fn(&WorkEntry) -> bool + Send + Sync + 'static,
    {
        self.predicates.push(Box::new(predicate));
        self
    }

    /// Returns the number of predicates in the chain.
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Returns true if the chain has no predicates.
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Returns true if every predicate accepts the entry.
    ///
    /// Stops at the first predicate that rejects it.
    pub fn accepts(&self, entry: &WorkEntry) -> bool {
        accepts(&self.predicates, entry)
    }

    /// Starts filtering on a new task and returns the filtered stream.
    ///
    /// The upstream completion marker (or failure) is forwarded after every
    /// accepted entry that preceded it.
    pub fn start(self) -> EntryStream {
        let (tx, stream) = pipeline::channel("filter");
        let Self {
            mut upstream,
            predicates,
        } = self;

        tokio::spawn(async move {
            let (mut accepted, mut rejected) = (0usize, 0usize);
            loop {
                match upstream.recv_signal().await {
                    Signal::Entry(entry) => {
                        if !accepts(&predicates, &entry) {
                            rejected += 1;
                            continue;
                        }
                        if tx.send(Signal::Entry(entry)).await.is_err() {
                            tracing::debug!("entry receiver dropped, filter stopping");
                            return;
                        }
                        accepted += 1;
                    }
                    terminal => {
                        tracing::debug!(accepted, rejected, ?terminal, "filter finished");
                        let _ = tx.send(terminal).await;
                        return;
                    }
                }
            }
        });

        stream
    }
}

fn accepts(predicates: &[Predicate], entry: &WorkEntry) -> bool {
    predicates.iter().all(|predicate| predicate(entry))
}

impl std::fmt::Debug for EntryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryFilter")
            .field("upstream", &self.upstream)
            .field("predicates", &self.predicates.len())
            .finish()
    }
}
