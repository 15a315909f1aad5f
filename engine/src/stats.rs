use crate::DocId;
use serde::{Deserialize, Serialize};

/// Collection-wide aggregates, fixed once the index is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CorpusStats {
    pub doc_count: u32,
    pub avg_doc_length: f64,
}

impl CorpusStats {
    /// One pass over the document lengths of the scored field.
    pub fn from_lengths<I: IntoIterator<Item = u32>>(lengths: I) -> Self {
        let mut doc_count = 0u32;
        let mut total = 0u64;
        for len in lengths {
            doc_count += 1;
            total += len as u64;
        }
        let avg_doc_length = if doc_count == 0 { 0.0 } else { total as f64 / doc_count as f64 };
        Self { doc_count, avg_doc_length }
    }
}

/// Per-term statistics over the scored field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermStats {
    /// Number of documents containing the term.
    pub doc_frequency: u32,
    /// Occurrences of the term summed over the collection.
    pub total_term_frequency: u64,
    /// Tokens in the scored field summed over the collection.
    pub field_token_count: u64,
}

impl TermStats {
    /// Mean term frequency per field token, `None` when the term never occurs.
    pub fn mean_term_frequency(&self) -> Option<f64> {
        if self.field_token_count == 0 || self.total_term_frequency == 0 {
            return None;
        }
        Some(self.total_term_frequency as f64 / self.field_token_count as f64)
    }
}

/// Read-only view of a built index, as needed by the scorer.
///
/// Any storage backend can implement this; all methods are pure reads and
/// implementors must be shareable across scoring threads.
pub trait IndexReader: Sync {
    fn doc_count(&self) -> u32;
    fn avg_doc_length(&self) -> f64;
    fn term_stats(&self, term: &str) -> Option<TermStats>;
    fn doc_length(&self, doc_id: DocId) -> Option<u32>;
    /// Occurrences of `term` in `doc_id`, 0 when absent.
    fn term_frequency(&self, term: &str, doc_id: DocId) -> u32;
    /// Union of documents containing at least one of `terms`, ascending by doc id.
    fn candidate_docs(&self, terms: &[String]) -> Vec<DocId>;
    /// External identifier (DOCNO) used in run output.
    fn external_id(&self, doc_id: DocId) -> Option<&str>;

    fn corpus_stats(&self) -> CorpusStats {
        CorpusStats { doc_count: self.doc_count(), avg_doc_length: self.avg_doc_length() }
    }
}
