use crate::config::ScoringModel;
use crate::error::ScoreError;
use crate::scoring::Scorer;
use crate::stats::IndexReader;
use crate::tokenizer::Tokenizer;
use crate::DocId;
use serde::Serialize;
use std::fmt;
use std::io::{self, Write};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A query with its analyzed term sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub id: String,
    pub terms: Vec<String>,
}

impl Query {
    pub fn parse<T: Tokenizer + ?Sized>(id: impl Into<String>, text: &str, tokenizer: &T) -> Self {
        Self { id: id.into(), terms: tokenizer.tokenize(text) }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedHit {
    /// 1-based.
    pub rank: usize,
    pub doc_id: DocId,
    pub external_id: String,
    pub score: f64,
}

/// Evaluates queries against an index with a fixed scoring model.
pub struct QueryRunner<'a, R: IndexReader + ?Sized, T: Tokenizer + ?Sized> {
    index: &'a R,
    tokenizer: &'a T,
    scorer: Scorer<'a, R>,
}

impl<'a, R: IndexReader + ?Sized, T: Tokenizer + ?Sized> QueryRunner<'a, R, T> {
    pub fn new(index: &'a R, tokenizer: &'a T, model: ScoringModel) -> Self {
        Self { index, tokenizer, scorer: Scorer::new(index, model) }
    }

    pub fn model(&self) -> &ScoringModel { self.scorer.model() }

    /// Analyze free text and evaluate it with the model's cutoff.
    pub fn search(&self, id: &str, text: &str) -> Result<Vec<RankedHit>, ScoreError> {
        let query = Query::parse(id, text, self.tokenizer);
        self.evaluate(&query, self.model().top_k())
    }

    /// Rank every document sharing a term with `query`, best first, at most `top_k`.
    ///
    /// Zero-score candidates are dropped. Equal scores keep retrieval order,
    /// which is ascending doc id.
    pub fn evaluate(&self, query: &Query, top_k: usize) -> Result<Vec<RankedHit>, ScoreError> {
        if query.terms.is_empty() {
            tracing::debug!(qid = %query.id, "query is empty after analysis");
            return Ok(Vec::new());
        }
        let weighted = self.scorer.prepare(&query.terms)?;
        if weighted.is_empty() {
            return Ok(Vec::new());
        }
        let lookup: Vec<String> = weighted.iter().map(|w| w.term.clone()).collect();
        let candidates = self.index.candidate_docs(&lookup);

        #[cfg(feature = "parallel")]
        let scores: Vec<f64> = candidates
            .par_iter()
            .map(|&doc_id| self.scorer.score(&weighted, doc_id))
            .collect::<Result<_, _>>()?;
        #[cfg(not(feature = "parallel"))]
        let scores: Vec<f64> = candidates
            .iter()
            .map(|&doc_id| self.scorer.score(&weighted, doc_id))
            .collect::<Result<_, _>>()?;

        let mut scored: Vec<(DocId, f64)> = candidates.into_iter().zip(scores).collect();
        scored.retain(|(_, s)| *s != 0.0);
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(top_k);

        let hits: Vec<RankedHit> = scored
            .into_iter()
            .enumerate()
            .map(|(i, (doc_id, score))| RankedHit {
                rank: i + 1,
                doc_id,
                external_id: self.index.external_id(doc_id).unwrap_or("None").to_string(),
                score,
            })
            .collect();
        tracing::debug!(qid = %query.id, hits = hits.len(), "evaluated query");
        Ok(hits)
    }

    /// Evaluate independent queries; results are returned in input order.
    pub fn evaluate_all(&self, queries: &[Query], top_k: usize) -> Result<Vec<Vec<RankedHit>>, ScoreError> {
        #[cfg(feature = "parallel")]
        let results = queries.par_iter().map(|q| self.evaluate(q, top_k)).collect();
        #[cfg(not(feature = "parallel"))]
        let results = queries.iter().map(|q| self.evaluate(q, top_k)).collect();
        results
    }
}

/// One line of a TREC run file.
pub struct RunLine<'a> {
    pub qid: &'a str,
    pub hit: &'a RankedHit,
    pub run_tag: &'a str,
}

impl fmt::Display for RunLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\tQ0\t{}\t{}\t{}\t{}", self.qid, self.hit.external_id, self.hit.rank, self.hit.score, self.run_tag)
    }
}

pub fn write_run<W: Write>(out: &mut W, qid: &str, hits: &[RankedHit], run_tag: &str) -> io::Result<()> {
    for hit in hits {
        writeln!(out, "{}", RunLine { qid, hit, run_tag })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoringConfig;
    use crate::index::{IndexBuilder, InvertedIndex};
    use crate::stats::TermStats;
    use crate::tokenizer::Analyzer;

    fn corpus() -> InvertedIndex {
        let mut b = IndexBuilder::new(Analyzer::default());
        b.add_document("DOC-1", "UNKNOWN", "solar power plants convert sunlight");
        b.add_document("DOC-2", "UNKNOWN", "wind power turbines");
        b.add_document("DOC-3", "UNKNOWN", "solar solar eclipse observed");
        b.add_document("DOC-4", "UNKNOWN", "tax reform debate");
        b.finish()
    }

    #[test]
    fn ranks_descending_and_excludes_non_matching() {
        let idx = corpus();
        let analyzer = idx.analyzer;
        let model = ScoringConfig::default().validate().unwrap();
        let runner = QueryRunner::new(&idx, &analyzer, model);
        let hits = runner.search("301", "solar power").unwrap();
        let ids: Vec<&str> = hits.iter().map(|h| h.external_id.as_str()).collect();
        assert_eq!(hits.len(), 3);
        assert!(!ids.contains(&"DOC-4"));
        for w in hits.windows(2) {
            assert!(w[0].score >= w[1].score);
        }
        assert_eq!(hits.iter().map(|h| h.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn empty_query_yields_no_hits() {
        let idx = corpus();
        let analyzer = idx.analyzer;
        let runner = QueryRunner::new(&idx, &analyzer, ScoringConfig::default().validate().unwrap());
        assert!(runner.search("302", "the and of").unwrap().is_empty());
        assert!(runner.search("303", "").unwrap().is_empty());
        assert!(runner.search("304", "unseen words").unwrap().is_empty());
    }

    #[test]
    fn top_k_truncates() {
        let idx = corpus();
        let analyzer = idx.analyzer;
        let runner = QueryRunner::new(&idx, &analyzer, ScoringConfig::default().validate().unwrap());
        let q = Query::parse("305", "solar power", &analyzer);
        assert_eq!(runner.evaluate(&q, 1).unwrap().len(), 1);
    }

    #[test]
    fn ties_keep_doc_id_order() {
        let mut b = IndexBuilder::new(Analyzer::default());
        b.add_document("X", "UNKNOWN", "alpha beta");
        b.add_document("Y", "UNKNOWN", "alpha beta");
        b.add_document("Z", "UNKNOWN", "gamma delta");
        let idx = b.finish();
        let analyzer = idx.analyzer;
        let runner = QueryRunner::new(&idx, &analyzer, ScoringConfig::default().validate().unwrap());
        let hits = runner.search("306", "beta").unwrap();
        assert_eq!(hits[0].score, hits[1].score);
        assert_eq!(hits[0].external_id, "X");
        assert_eq!(hits[1].external_id, "Y");
    }

    #[test]
    fn ties_follow_doc_id_not_query_term_order() {
        let mut b = IndexBuilder::new(Analyzer::default());
        b.add_document("D0", "UNKNOWN", "beta zz");
        b.add_document("D1", "UNKNOWN", "alpha yy");
        let idx = b.finish();
        let analyzer = idx.analyzer;
        let runner = QueryRunner::new(&idx, &analyzer, ScoringConfig::default().validate().unwrap());
        let hits = runner.search("307", "alpha beta").unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].score, hits[1].score);
        assert_eq!(hits[0].external_id, "D0");
        assert_eq!(hits[1].external_id, "D1");
    }

    /// Reports one document as empty so its term contributions fault.
    struct EmptyDoc<'a> {
        inner: &'a InvertedIndex,
        empty: DocId,
    }

    impl IndexReader for EmptyDoc<'_> {
        fn doc_count(&self) -> u32 { self.inner.doc_count() }
        fn avg_doc_length(&self) -> f64 { self.inner.avg_doc_length() }
        fn term_stats(&self, term: &str) -> Option<TermStats> { self.inner.term_stats(term) }
        fn doc_length(&self, doc_id: DocId) -> Option<u32> {
            if doc_id == self.empty { Some(0) } else { self.inner.doc_length(doc_id) }
        }
        fn term_frequency(&self, term: &str, doc_id: DocId) -> u32 { self.inner.term_frequency(term, doc_id) }
        fn candidate_docs(&self, terms: &[String]) -> Vec<DocId> { self.inner.candidate_docs(terms) }
        fn external_id(&self, doc_id: DocId) -> Option<&str> { self.inner.external_id(doc_id) }
    }

    #[test]
    fn zero_score_candidates_are_dropped() {
        let mut b = IndexBuilder::new(Analyzer::default());
        b.add_document("A", "UNKNOWN", "cat dog");
        b.add_document("B", "UNKNOWN", "cat fish");
        b.add_document("C", "UNKNOWN", "bird fish");
        let idx = b.finish();
        let reader = EmptyDoc { inner: &idx, empty: 1 };
        let analyzer = idx.analyzer;
        let runner = QueryRunner::new(&reader, &analyzer, ScoringConfig::default().validate().unwrap());
        let hits = runner.search("308", "cat").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].external_id, "A");
        assert_eq!(hits[0].rank, 1);
        assert!(hits[0].score != 0.0);
    }

    #[test]
    fn evaluate_all_keeps_input_order() {
        let idx = corpus();
        let analyzer = idx.analyzer;
        let runner = QueryRunner::new(&idx, &analyzer, ScoringConfig::default().validate().unwrap());
        let queries = vec![
            Query::parse("1", "wind", &analyzer),
            Query::parse("2", "tax", &analyzer),
            Query::parse("3", "eclipse", &analyzer),
        ];
        let results = runner.evaluate_all(&queries, 10).unwrap();
        assert_eq!(results[0][0].external_id, "DOC-2");
        assert_eq!(results[1][0].external_id, "DOC-4");
        assert_eq!(results[2][0].external_id, "DOC-3");
    }

    #[test]
    fn run_line_format() {
        let hit = RankedHit { rank: 1, doc_id: 0, external_id: "FBIS3-1".into(), score: 2.5 };
        let mut buf = Vec::new();
        write_run(&mut buf, "301", &[hit], "cs2318").unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "301\tQ0\tFBIS3-1\t1\t2.5\tcs2318\n");
    }
}
