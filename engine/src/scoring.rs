use crate::config::{FaultPolicy, ScoringModel};
use crate::divergence::{divergence, idf_weight};
use crate::error::ScoreError;
use crate::normalize::normalize;
use crate::stats::{IndexReader, TermStats};
use crate::DocId;

/// A query term with the statistics it needs, resolved once per query.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedTerm {
    pub term: String,
    pub stats: TermStats,
    /// `ln(N / df)`
    pub f0: f64,
}

/// Scores documents with the two-signal divergence model.
///
/// Borrows the index and a validated model; holds no per-query state, so one
/// scorer can be shared across threads.
pub struct Scorer<'a, R: IndexReader + ?Sized> {
    index: &'a R,
    model: ScoringModel,
    adl: f64,
}

impl<'a, R: IndexReader + ?Sized> Scorer<'a, R> {
    pub fn new(index: &'a R, model: ScoringModel) -> Self {
        let adl = model.adl_override().unwrap_or_else(|| index.avg_doc_length());
        Self { index, model, adl }
    }

    pub fn model(&self) -> &ScoringModel { &self.model }

    /// Reference document length used by the length-normalized signal.
    pub fn adl(&self) -> f64 { self.adl }

    /// Resolve term statistics and idf weights for a query's terms.
    ///
    /// Terms unknown to the collection are dropped. A term whose idf weight is
    /// not positive (present in every document) cannot score any document; it
    /// is dropped with a warning, or rejected under [`FaultPolicy::Abort`].
    pub fn prepare(&self, terms: &[String]) -> Result<Vec<WeightedTerm>, ScoreError> {
        let n = self.index.doc_count();
        let mut out = Vec::with_capacity(terms.len());
        for term in terms {
            let Some(stats) = self.index.term_stats(term) else { continue };
            let f0 = match idf_weight(n, stats.doc_frequency) {
                Ok(f0) if f0 > 0.0 => f0,
                Ok(f0) => {
                    let err = ScoreError::domain(format!("idf weight for {term:?} is {f0}"));
                    self.fault(err, term, None)?;
                    continue;
                }
                Err(err) => {
                    self.fault(err, term, None)?;
                    continue;
                }
            };
            out.push(WeightedTerm { term: term.clone(), stats, f0 });
        }
        Ok(out)
    }

    /// Contribution of one term with frequency `tf` in a document of length `doc_len`.
    pub fn term_score(&self, wt: &WeightedTerm, tf: u32, doc_len: u32) -> Result<f64, ScoreError> {
        let (nf1, nf2) = normalize(tf, &wt.stats, doc_len, self.adl, self.model.delta())?;
        let shape = self.model.shape();
        let lambda = self.model.lambda();
        let d1 = divergence(nf1, wt.f0, shape, lambda)?;
        let d2 = divergence(nf2, wt.f0, shape, lambda)?;
        Ok(0.5 * d1 + 0.5 * d2)
    }

    /// Sum of term contributions for `doc_id`. Terms absent from the document
    /// contribute nothing.
    pub fn score(&self, terms: &[WeightedTerm], doc_id: DocId) -> Result<f64, ScoreError> {
        let mut acc = 0.0f64;
        let mut doc_len: Option<u32> = None;
        for wt in terms {
            let tf = self.index.term_frequency(&wt.term, doc_id);
            if tf == 0 { continue; }
            let len = match doc_len {
                Some(l) => l,
                None => {
                    let l = self.index.doc_length(doc_id).unwrap_or(0);
                    doc_len = Some(l);
                    l
                }
            };
            match self.term_score(wt, tf, len) {
                Ok(s) => acc += s,
                Err(err) => self.fault(err, &wt.term, Some(doc_id))?,
            }
        }
        Ok(acc)
    }

    /// Convenience wrapper resolving `terms` and scoring a single document.
    pub fn score_terms(&self, terms: &[String], doc_id: DocId) -> Result<f64, ScoreError> {
        let weighted = self.prepare(terms)?;
        self.score(&weighted, doc_id)
    }

    fn fault(&self, err: ScoreError, term: &str, doc_id: Option<DocId>) -> Result<(), ScoreError> {
        match self.model.fault_policy() {
            FaultPolicy::Skip => {
                tracing::warn!(term, ?doc_id, error = %err, "skipping term contribution");
                Ok(())
            }
            FaultPolicy::Abort => Err(err),
        }
    }
}
