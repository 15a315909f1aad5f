use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use engine::trec::Topic;
use engine::{write_run, FaultPolicy, InvertedIndex, Query, QueryRunner, ScoringConfig, ScoringModel};
use std::io::Write;
use std::path::PathBuf;

/// Scoring parameters from the command line. Flags override `--params`.
#[derive(Debug, Default, Args)]
pub struct ParamArgs {
    /// JSON file with scoring parameters
    #[arg(long)]
    pub params: Option<PathBuf>,
    /// Normalizer floor added to the mean term frequency
    #[arg(long)]
    pub delta: Option<f64>,
    /// Reference average document length (defaults to the corpus average)
    #[arg(long)]
    pub adl: Option<f64>,
    /// Divergence shape: 1, 2 or greater than 2
    #[arg(long)]
    pub m: Option<f64>,
    /// Divergence scale, non-zero
    #[arg(long)]
    pub lambda: Option<f64>,
    /// Hits kept per query
    #[arg(long)]
    pub top_k: Option<usize>,
    /// Fail the run instead of skipping a term that cannot be scored
    #[arg(long, default_value_t = false)]
    pub abort_on_fault: bool,
}

impl ParamArgs {
    pub fn resolve(&self) -> Result<ScoringConfig> {
        let mut cfg = match &self.params {
            Some(path) => ScoringConfig::from_json_file(path)
                .with_context(|| format!("loading scoring parameters from {}", path.display()))?,
            None => ScoringConfig::default(),
        };
        if let Some(v) = self.delta { cfg.delta = v; }
        if let Some(v) = self.adl { cfg.adl = Some(v); }
        if let Some(v) = self.m { cfg.m = v; }
        if let Some(v) = self.lambda { cfg.lambda = v; }
        if let Some(v) = self.top_k { cfg.top_k = v; }
        if self.abort_on_fault { cfg.fault_policy = FaultPolicy::Abort; }
        Ok(cfg)
    }
}

fn progress_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {prefix:<12} [{bar:40.cyan/dim}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("━━╸")
}

/// Evaluate every topic title and write the run in topic order.
/// Returns the number of lines written.
pub fn run_topics<W: Write>(index: &InvertedIndex, topics: &[Topic], model: ScoringModel, run_tag: &str, out: &mut W) -> Result<usize> {
    let analyzer = index.analyzer;
    let runner = QueryRunner::new(index, &analyzer, model);

    let progress = ProgressBar::new(topics.len() as u64);
    progress.set_style(progress_style());
    progress.set_prefix("Searching");
    let mut lines = 0usize;
    for topic in topics {
        progress.set_message(format!("topic {}", topic.num));
        let query = Query::parse(topic.num.as_str(), &topic.title, &analyzer);
        let hits = runner.evaluate(&query, model.top_k())?;
        if hits.is_empty() {
            tracing::warn!(qid = %query.id, "no hits for query");
        }
        write_run(out, &query.id, &hits, run_tag)?;
        lines += hits.len();
        progress.inc(1);
    }
    out.flush()?;
    progress.finish_with_message(format!("{lines} lines"));
    tracing::info!(queries = topics.len(), lines, "run complete");
    Ok(lines)
}
