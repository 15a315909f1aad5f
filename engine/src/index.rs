use crate::stats::{CorpusStats, IndexReader, TermStats};
use crate::tokenizer::{Analyzer, Tokenizer};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type TermId = u32;
pub type DocId = u32;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocMeta {
    /// DOCNO of the source document, printed in run files.
    pub external_id: String,
    pub ht: String,
    /// Token count of the scored field.
    pub length: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub term_frequency: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermEntry {
    pub df: u32,
    pub ttf: u64,
}

/// In-memory inverted index over the `contents` field.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    pub dictionary: HashMap<String, TermId>,
    pub terms: Vec<TermEntry>,
    pub postings: HashMap<TermId, Vec<Posting>>, // postings sorted by doc_id
    pub docs: HashMap<DocId, DocMeta>,
    pub analyzer: Analyzer,
    field_tokens: u64,
    corpus: CorpusStats,
}

impl InvertedIndex {
    /// Assemble an index from its parts and derive the collection aggregates.
    pub fn from_parts(
        dictionary: HashMap<String, TermId>,
        terms: Vec<TermEntry>,
        postings: HashMap<TermId, Vec<Posting>>,
        docs: HashMap<DocId, DocMeta>,
        analyzer: Analyzer,
    ) -> Self {
        let corpus = CorpusStats::from_lengths(docs.values().map(|d| d.length));
        let field_tokens = docs.values().map(|d| d.length as u64).sum();
        Self { dictionary, terms, postings, docs, analyzer, field_tokens, corpus }
    }

    pub fn num_docs(&self) -> u32 { self.corpus.doc_count }

    pub fn num_terms(&self) -> usize { self.dictionary.len() }

    pub fn field_tokens(&self) -> u64 { self.field_tokens }

    fn postings_for(&self, term: &str) -> Option<&[Posting]> {
        let tid = self.dictionary.get(term)?;
        self.postings.get(tid).map(Vec::as_slice)
    }

    /// Check the statistics invariants: `df <= N`, `df <= ttf`, and the
    /// collection token count bounding every document length.
    pub fn validate(&self) -> Result<()> {
        let n = self.num_docs();
        for (term, &tid) in &self.dictionary {
            let Some(entry) = self.terms.get(tid as usize) else {
                bail!("term {term:?} has id {tid} but no statistics entry");
            };
            if entry.df > n {
                bail!("term {term:?}: df {} exceeds doc count {n}", entry.df);
            }
            if entry.df as u64 > entry.ttf {
                bail!("term {term:?}: df {} exceeds total term frequency {}", entry.df, entry.ttf);
            }
        }
        if let Some(d) = self.docs.values().find(|d| d.length as u64 > self.field_tokens) {
            bail!("document {} is longer than the whole collection", d.external_id);
        }
        Ok(())
    }
}

impl IndexReader for InvertedIndex {
    fn doc_count(&self) -> u32 { self.corpus.doc_count }

    fn avg_doc_length(&self) -> f64 { self.corpus.avg_doc_length }

    fn term_stats(&self, term: &str) -> Option<TermStats> {
        let tid = *self.dictionary.get(term)?;
        let entry = self.terms.get(tid as usize)?;
        if entry.df == 0 {
            return None;
        }
        Some(TermStats {
            doc_frequency: entry.df,
            total_term_frequency: entry.ttf,
            field_token_count: self.field_tokens,
        })
    }

    fn doc_length(&self, doc_id: DocId) -> Option<u32> {
        self.docs.get(&doc_id).map(|d| d.length)
    }

    fn term_frequency(&self, term: &str, doc_id: DocId) -> u32 {
        self.postings_for(term)
            .and_then(|plist| {
                plist.binary_search_by_key(&doc_id, |p| p.doc_id).ok().map(|i| plist[i].term_frequency)
            })
            .unwrap_or(0)
    }

    fn candidate_docs(&self, terms: &[String]) -> Vec<DocId> {
        let mut out: Vec<DocId> = terms
            .iter()
            .filter_map(|t| self.postings_for(t))
            .flatten()
            .map(|p| p.doc_id)
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    fn external_id(&self, doc_id: DocId) -> Option<&str> {
        self.docs.get(&doc_id).map(|d| d.external_id.as_str())
    }
}

/// Accumulates postings and term statistics one document at a time.
pub struct IndexBuilder {
    analyzer: Analyzer,
    next_doc_id: DocId,
    dictionary: HashMap<String, TermId>,
    terms: Vec<TermEntry>,
    postings: HashMap<TermId, Vec<Posting>>,
    docs: HashMap<DocId, DocMeta>,
}

impl IndexBuilder {
    pub fn new(analyzer: Analyzer) -> Self {
        Self {
            analyzer,
            next_doc_id: 0,
            dictionary: HashMap::new(),
            terms: Vec::new(),
            postings: HashMap::new(),
            docs: HashMap::new(),
        }
    }

    /// Analyze `contents` and add it as the next document.
    pub fn add_document(&mut self, external_id: impl Into<String>, ht: impl Into<String>, contents: &str) -> DocId {
        let doc_id = self.next_doc_id;
        self.next_doc_id += 1;

        let tokens = self.analyzer.tokenize(contents);
        let length = tokens.len() as u32;
        let mut tf_counts: HashMap<TermId, u32> = HashMap::new();
        for term in tokens {
            let next = self.terms.len() as TermId;
            let tid = *self.dictionary.entry(term).or_insert(next);
            if tid == next {
                self.terms.push(TermEntry::default());
            }
            *tf_counts.entry(tid).or_insert(0) += 1;
        }

        for (tid, tf) in tf_counts {
            let entry = &mut self.terms[tid as usize];
            entry.df += 1;
            entry.ttf += tf as u64;
            self.postings.entry(tid).or_default().push(Posting { doc_id, term_frequency: tf });
        }

        self.docs.insert(doc_id, DocMeta { external_id: external_id.into(), ht: ht.into(), length });
        doc_id
    }

    pub fn finish(mut self) -> InvertedIndex {
        for plist in self.postings.values_mut() {
            plist.sort_by_key(|p| p.doc_id);
        }
        InvertedIndex::from_parts(self.dictionary, self.terms, self.postings, self.docs, self.analyzer)
    }
}
