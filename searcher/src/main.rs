use anyhow::{Context, Result};
use clap::Parser;
use engine::config::DEFAULT_RUN_TAG;
use engine::persist::{load_index, IndexPaths};
use engine::trec::parse_topics;
use engine::IndexReader;
use searcher::{run_topics, ParamArgs};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "searcher")]
#[command(about = "Rank an index against TREC topics and print a run file", long_about = None)]
struct Args {
    /// Index directory path
    #[arg(long, default_value = "./index")]
    index: String,
    /// TREC topics file
    #[arg(long)]
    topics: String,
    /// Run tag printed in the last column
    #[arg(long, default_value = DEFAULT_RUN_TAG)]
    run_tag: String,
    /// Write the run here instead of stdout
    #[arg(long)]
    output: Option<String>,
    #[command(flatten)]
    params: ParamArgs,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let args = Args::parse();

    // Reject bad parameters before touching the index.
    let model = args.params.resolve()?.validate()?;
    tracing::info!(?model, "scoring model");

    let index = load_index(&IndexPaths::new(&args.index))?;
    tracing::info!(corpus = ?index.corpus_stats(), "corpus statistics");
    let text = std::fs::read_to_string(&args.topics).with_context(|| format!("reading topics from {}", args.topics))?;
    let topics = parse_topics(&text);
    tracing::info!(topics = topics.len(), "loaded topics");

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    run_topics(&index, &topics, model, &args.run_tag, &mut out)?;
    Ok(())
}
