//! Ranking engine for ad hoc retrieval over TREC-style collections.
//!
//! Documents are scored with two frequency signals per query term, one
//! length-independent and one length-normalized, each mapped through a
//! divergence function and blended evenly. See [`scoring::Scorer`].

pub mod config;
pub mod divergence;
pub mod error;
pub mod index;
pub mod normalize;
pub mod persist;
pub mod runner;
pub mod scoring;
pub mod stats;
pub mod tokenizer;
pub mod trec;

pub use config::{FaultPolicy, ScoringConfig, ScoringModel};
pub use divergence::Shape;
pub use error::ScoreError;
pub use index::{DocId, DocMeta, IndexBuilder, InvertedIndex, Posting, TermEntry, TermId};
pub use runner::{write_run, Query, QueryRunner, RankedHit, RunLine};
pub use scoring::{Scorer, WeightedTerm};
pub use stats::{CorpusStats, IndexReader, TermStats};
pub use tokenizer::{Analyzer, Tokenizer};
