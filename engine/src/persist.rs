use crate::index::{DocMeta, InvertedIndex, Posting, TermEntry};
use crate::tokenizer::Analyzer;
use crate::{DocId, TermId};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{create_dir_all, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const FORMAT_VERSION: u32 = 2;

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub num_terms: u32,
    pub field_tokens: u64,
    pub analyzer: Analyzer,
    pub created_at: String,
    pub version: u32,
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn dictionary(&self) -> PathBuf { self.root.join("dictionary.bin") }
    fn docs(&self) -> PathBuf { self.root.join("docs.bin") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
    fn postings_dir(&self) -> PathBuf { self.root.join("postings") }
    fn postings_file(&self, term_id: TermId) -> PathBuf {
        self.postings_dir().join(format!("{term_id:08}.postings.bin"))
    }
}

fn write_bin<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut f = BufWriter::new(File::create(path).with_context(|| format!("creating {}", path.display()))?);
    bincode::serialize_into(&mut f, value)?;
    f.flush()?;
    Ok(())
}

fn read_bin<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let value = bincode::deserialize_from(BufReader::new(f))?;
    Ok(value)
}

pub fn save_dictionary(paths: &IndexPaths, dict: &(HashMap<String, TermId>, Vec<TermEntry>)) -> Result<()> {
    create_dir_all(&paths.root)?;
    write_bin(&paths.dictionary(), dict)
}

pub fn load_dictionary(paths: &IndexPaths) -> Result<(HashMap<String, TermId>, Vec<TermEntry>)> {
    read_bin(&paths.dictionary())
}

pub fn save_docs(paths: &IndexPaths, docs: &HashMap<DocId, DocMeta>) -> Result<()> {
    write_bin(&paths.docs(), docs)
}

pub fn load_docs(paths: &IndexPaths) -> Result<HashMap<DocId, DocMeta>> {
    read_bin(&paths.docs())
}

pub fn save_postings_for_term(paths: &IndexPaths, term_id: TermId, postings: &[Posting]) -> Result<()> {
    create_dir_all(paths.postings_dir())?;
    write_bin(&paths.postings_file(term_id), &postings)
}

pub fn load_postings_for_term(paths: &IndexPaths, term_id: TermId) -> Result<Vec<Posting>> {
    read_bin(&paths.postings_file(term_id))
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let json = serde_json::to_string_pretty(meta)?;
    std::fs::write(paths.meta(), json)?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let text = std::fs::read_to_string(paths.meta()).with_context(|| format!("reading {}", paths.meta().display()))?;
    let meta: MetaFile = serde_json::from_str(&text)?;
    Ok(meta)
}

/// Write every part of `index` under `paths.root`.
pub fn save_index(paths: &IndexPaths, index: &InvertedIndex, created_at: String) -> Result<()> {
    for (term_id, plist) in &index.postings {
        save_postings_for_term(paths, *term_id, plist)?;
    }
    save_dictionary(paths, &(index.dictionary.clone(), index.terms.clone()))?;
    save_docs(paths, &index.docs)?;
    let meta = MetaFile {
        num_docs: index.num_docs(),
        num_terms: index.num_terms() as u32,
        field_tokens: index.field_tokens(),
        analyzer: index.analyzer,
        created_at,
        version: FORMAT_VERSION,
    };
    save_meta(paths, &meta)
}

/// Load a whole index into memory and check it against its metadata.
pub fn load_index(paths: &IndexPaths) -> Result<InvertedIndex> {
    let meta = load_meta(paths)?;
    if meta.version != FORMAT_VERSION {
        bail!("index format version {} is not supported (expected {FORMAT_VERSION})", meta.version);
    }
    let (dictionary, terms) = load_dictionary(paths)?;
    let docs = load_docs(paths)?;
    let mut postings = HashMap::with_capacity(dictionary.len());
    for &term_id in dictionary.values() {
        postings.insert(term_id, load_postings_for_term(paths, term_id)?);
    }
    let index = InvertedIndex::from_parts(dictionary, terms, postings, docs, meta.analyzer);
    if index.num_docs() != meta.num_docs || index.field_tokens() != meta.field_tokens {
        bail!(
            "index at {} is inconsistent: meta.json records {} docs / {} tokens, files hold {} / {}",
            paths.root.display(),
            meta.num_docs,
            meta.field_tokens,
            index.num_docs(),
            index.field_tokens()
        );
    }
    index.validate()?;
    tracing::info!(num_docs = meta.num_docs, num_terms = meta.num_terms, "loaded index");
    Ok(index)
}
