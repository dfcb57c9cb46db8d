//! scenescore CLI: score Japanese captions against references.
//!
//! Usage:
//!   scenescore score --reference <R>... <CANDIDATE>
//!   scenescore batch [--input requests.json]
//!   scenescore graph <SENTENCE>

use clap::{Parser, Subcommand};
use scenescore::{ScoreConfig, ScorePair};
use serde::Deserialize;
use std::io::Read;
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "scenescore",
    version,
    about = "Scene-graph relation scoring for Japanese captions"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Parse cache database
    #[arg(long, global = true)]
    cache: Option<PathBuf>,
    /// Japanese WordNet database (wnjpn.db)
    #[arg(long, global = true)]
    wordnet: Option<PathBuf>,
    /// Do not read or write the parse cache
    #[arg(long, global = true)]
    no_cache: bool,
    /// Log more (repeat for trace output)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Score one candidate against its references
    Score {
        /// Reference sentence (repeatable)
        #[arg(short, long = "reference")]
        references: Vec<String>,
        /// Candidate sentence
        candidate: String,
        /// Print precision and recall as well
        #[arg(long)]
        detail: bool,
    },
    /// Score a JSON batch request and print a JSON array of scores
    Batch {
        /// Request file; stdin when omitted
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Print the scene graph and tuples of a sentence
    Graph {
        sentence: String,
    },
}

/// `{"references": [[...], ...], "candidates": [...], "batch_size": 16}`
#[derive(Deserialize)]
struct BatchRequest {
    references: Vec<Vec<String>>,
    candidates: Vec<String>,
    #[serde(default)]
    batch_size: Option<usize>,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();
}

fn load_config(cli: &Cli) -> Result<ScoreConfig, String> {
    let mut config = match &cli.config {
        Some(path) => ScoreConfig::from_yaml_file(path)
            .map_err(|e| format!("{}: {}", path.display(), e))?,
        None => ScoreConfig::default(),
    };
    if let Some(cache) = &cli.cache {
        config.cache_path = Some(cache.clone());
    }
    if let Some(wordnet) = &cli.wordnet {
        config.wordnet_path = Some(wordnet.clone());
    }
    if cli.no_cache {
        config.use_cache = false;
    }
    Ok(config)
}

async fn cmd_score(config: &ScoreConfig, references: &[String], candidate: &str, detail: bool) -> i32 {
    let cache = match config.open_cache() {
        Ok(cache) => cache,
        Err(e) => {
            eprintln!("Error: failed to open parse cache: {}", e);
            return 1;
        }
    };
    let scorer = config.scorer(config.open_synonyms(), cache);
    let score = scorer.evaluate(references, candidate).await;
    if detail {
        println!("precision\t{}", score.precision);
        println!("recall\t{}", score.recall);
        println!("f\t{}", score.f);
    } else {
        println!("{}", score.f);
    }
    0
}

fn read_request(input: Option<&PathBuf>) -> Result<BatchRequest, String> {
    let json = match input {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {}", path.display(), e))?,
        None => {
            let mut json = String::new();
            std::io::stdin()
                .read_to_string(&mut json)
                .map_err(|e| format!("failed to read stdin: {}", e))?;
            json
        }
    };
    let request: BatchRequest =
        serde_json::from_str(&json).map_err(|e| format!("invalid batch request: {}", e))?;
    if request.references.len() != request.candidates.len() {
        return Err(format!(
            "{} reference lists for {} candidates",
            request.references.len(),
            request.candidates.len()
        ));
    }
    Ok(request)
}

async fn cmd_batch(mut config: ScoreConfig, input: Option<&PathBuf>) -> i32 {
    let request = match read_request(input) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    if let Some(batch_size) = request.batch_size {
        config.workers = batch_size;
    }

    let scorer = match config.batch_scorer() {
        Ok(scorer) => scorer,
        Err(e) => {
            eprintln!("Error: failed to open parse cache: {}", e);
            return 1;
        }
    };
    let pairs = request
        .references
        .into_iter()
        .zip(request.candidates)
        .map(|(references, candidate)| ScorePair::new(references, candidate))
        .collect();

    let results = scorer.score_batch(pairs).await;
    scorer.shutdown().await;

    let failed = results.iter().filter(|r| r.is_failure()).count();
    if failed > 0 {
        tracing::warn!(failed, "some batch items failed");
    }
    let scores: Vec<f64> = results.iter().map(|r| r.score).collect();
    match serde_json::to_string(&scores) {
        Ok(json) => {
            println!("{}", json);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

async fn cmd_graph(config: &ScoreConfig, sentence: &str) -> i32 {
    let cache = match config.open_cache() {
        Ok(cache) => cache,
        Err(e) => {
            eprintln!("Error: failed to open parse cache: {}", e);
            return 1;
        }
    };
    let scorer = config.scorer(config.open_synonyms(), cache);
    let mut graph = scorer.graph(sentence).await;
    let tuples = graph.tuples();

    print!("{}", graph);
    println!();
    println!("objects: {}", tuples.objects.join(" "));
    println!("attributes: {}", tuples.attributes.join(" "));
    println!("relations: {}", tuples.relations.join(" "));
    0
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let code = match &cli.command {
        Commands::Score {
            references,
            candidate,
            detail,
        } => cmd_score(&config, references, candidate, *detail).await,
        Commands::Batch { input } => cmd_batch(config, input.as_ref()).await,
        Commands::Graph { sentence } => cmd_graph(&config, sentence).await,
    };
    std::process::exit(code);
}
