//! In-memory line search: whitespace tokenization, an immutable inverted
//! index over a corpus of one-line documents, top-K lookup ranked by raw
//! hit counts, and a handle that lets a whole index be swapped while
//! lookups keep running.

pub mod handle;
pub mod index;
pub mod lines;
pub mod ranking;
pub mod tokenizer;

pub use handle::{IndexHandle, Snapshot};
pub use index::{DocHit, IndexLimits, InvertedIndex};
pub use lines::lossy_lines;
pub use ranking::{lookup, lookup_top, RankedResult, MAX_RESULTS};

pub type DocId = usize;
