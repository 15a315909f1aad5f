use anyhow::Result;
use clap::{Parser, Subcommand};
use engine::persist::{save_index, IndexPaths};
use engine::trec::parse_documents;
use engine::{Analyzer, IndexBuilder};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct InputDoc {
    id: String,
    #[serde(default)]
    title: String,
    body: String,
}

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build an inverted index from TREC tagged or JSON/JSONL documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from a file or a directory tree
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        /// Output index directory
        #[arg(long)]
        output: String,
        /// Index surface forms instead of English stems
        #[arg(long, default_value_t = false)]
        no_stem: bool,
        /// Keep English stopwords
        #[arg(long, default_value_t = false)]
        keep_stopwords: bool,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, no_stem, keep_stopwords } => {
            let analyzer = Analyzer { stem: !no_stem, stopwords: !keep_stopwords };
            build_index(Path::new(&input), Path::new(&output), analyzer)
        }
    }
}

fn build_index(input: &Path, output: &Path, analyzer: Analyzer) -> Result<()> {
    let files = collect_files(input);
    tracing::info!(total_files = files.len(), input = %input.display(), "indexing files");

    let mut builder = IndexBuilder::new(analyzer);
    let mut failed = 0usize;
    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(progress_style());
    progress.set_prefix("Indexing");
    for file in &files {
        progress.set_message(file.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default());
        // Log and continue past files that fail to read or parse.
        match index_file(file, &mut builder) {
            Ok(added) => tracing::debug!(file = %file.display(), added, "indexed file"),
            Err(err) => {
                failed += 1;
                tracing::error!(file = %file.display(), error = %err, "error indexing file");
            }
        }
        progress.inc(1);
    }
    progress.finish_with_message(format!("{} files, {failed} failed", files.len()));

    let index = builder.finish();
    index.validate()?;
    tracing::info!(num_docs = index.num_docs(), num_terms = index.num_terms(), failed, "ingested documents");

    let paths = IndexPaths::new(output);
    let created_at = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default();
    save_index(&paths, &index, created_at)?;
    tracing::info!(output = %output.display(), "index build complete");
    Ok(())
}

fn collect_files(input: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            if entry.file_type().is_file() {
                files.push(entry.path().to_path_buf());
            }
        }
    } else if input.is_file() {
        files.push(input.to_path_buf());
    }
    files
}

fn progress_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {prefix:<12} [{bar:40.cyan/dim}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("━━╸")
}

/// Add every document in `file`. A file that fails to parse adds nothing.
fn index_file(file: &Path, builder: &mut IndexBuilder) -> Result<usize> {
    let bytes = fs::read(file)?;
    let content = String::from_utf8_lossy(&bytes);
    let added = match file.extension().and_then(|s| s.to_str()) {
        Some("jsonl") => {
            let docs = content
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(serde_json::from_str::<InputDoc>)
                .collect::<serde_json::Result<Vec<_>>>()?;
            add_json_docs(docs, builder)
        }
        Some("json") => {
            let docs: Vec<InputDoc> = match serde_json::from_str::<serde_json::Value>(&content)? {
                serde_json::Value::Array(arr) => {
                    arr.into_iter().map(serde_json::from_value).collect::<serde_json::Result<_>>()?
                }
                other => vec![serde_json::from_value(other)?],
            };
            add_json_docs(docs, builder)
        }
        _ => {
            let docs = parse_documents(&content);
            for doc in &docs {
                builder.add_document(doc.docno.clone(), doc.ht.clone(), &doc.contents());
            }
            docs.len()
        }
    };
    Ok(added)
}

fn add_json_docs(docs: Vec<InputDoc>, builder: &mut IndexBuilder) -> usize {
    let n = docs.len();
    for doc in docs {
        let contents = format!("{} {}", doc.title, doc.body);
        builder.add_document(doc.id, engine::trec::UNKNOWN, &contents);
    }
    n
}
