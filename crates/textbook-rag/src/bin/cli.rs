//! Command-line client: ask questions, inspect retrieval, check collaborators
//!
//! Run with: cargo run -p textbook-rag --features cli --bin textbook-rag -- ask "What is ROS 2?"

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use textbook_rag::{
    agent::{NoopObserver, TracingObserver},
    config::RagConfig,
    providers::{Providers, Retriever},
    retrieval::ChunkSanitizer,
    server::state::AppState,
    Confidence, QueryStatus, RagAgent,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "textbook-rag", version, about = "Ask the textbook a question")]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Show pipeline logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Answer a question
    Ask {
        question: String,
        /// Print the raw JSON response
        #[arg(long)]
        json: bool,
    },
    /// Show raw retrieval results and which chunks the sanitizer keeps
    Inspect {
        question: String,
        /// Override the similarity threshold (0.0 shows everything)
        #[arg(long)]
        threshold: Option<f32>,
    },
    /// Check the vector store and generation backend
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "textbook_rag=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let config = RagConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Ask { question, json } => ask(&config, &question, json, cli.verbose).await,
        Command::Inspect {
            question,
            threshold,
        } => inspect(&config, &question, threshold).await,
        Command::Health => health(&config).await,
    }
}

async fn ask(config: &RagConfig, question: &str, json: bool, verbose: bool) -> anyhow::Result<()> {
    let providers = Providers::from_config(config)?;
    let agent = RagAgent::from_config(config, providers.retriever, providers.llm);
    let agent = if verbose {
        agent.with_observer(Arc::new(TracingObserver))
    } else {
        agent.with_observer(Arc::new(NoopObserver))
    };

    let spinner = spinner("Thinking...");
    let response = agent.ask(question).await;
    spinner.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    match response.status {
        QueryStatus::Success => {
            println!("{}\n", style("Answer").bold().cyan());
            println!("{}\n", response.answer);
            if !response.sources.is_empty() {
                println!("{}", style("Sources").bold());
                for source in &response.sources {
                    println!("  - {}", source);
                }
            }
            let confidence = match response.confidence {
                Confidence::High => style(response.confidence.to_string()).green(),
                Confidence::Medium => style(response.confidence.to_string()).yellow(),
                Confidence::Low => style(response.confidence.to_string()).red(),
            };
            println!(
                "\nConfidence: {}  ({} chunks matched, {:.0}ms)",
                confidence,
                response.matched_chunks.len(),
                response.query_time_ms
            );
            Ok(())
        }
        QueryStatus::Error => {
            let message = response.error.unwrap_or(response.answer);
            eprintln!("{} {}", style("error:").red().bold(), message);
            std::process::exit(1);
        }
    }
}

async fn inspect(config: &RagConfig, question: &str, threshold: Option<f32>) -> anyhow::Result<()> {
    let providers = Providers::from_config(config)?;
    let sanitizer = ChunkSanitizer::new(config.sanitizer.clone());
    let threshold = threshold.unwrap_or(config.retrieval.similarity_threshold);

    let spinner = spinner("Retrieving...");
    let result = providers
        .retriever
        .retrieve(question, config.retrieval.top_k, threshold)
        .await;
    spinner.finish_and_clear();
    let result = result?;

    println!(
        "Query: '{}'  threshold={}  retrieved={}\n",
        question, threshold, result.total_results
    );

    let mut kept = 0;
    for (i, raw) in result.chunks.iter().enumerate() {
        let score = raw
            .similarity_score
            .map(|s| format!("{:.3}", s))
            .unwrap_or_else(|| "n/a".to_string());
        let verdict = match sanitizer.check(&raw.content) {
            Ok(_) => {
                kept += 1;
                style("KEEP".to_string()).green()
            }
            Err(reason) => style(format!("SKIP ({})", reason)).red(),
        };

        println!("{} Chunk {} - score {}", verdict, i + 1, score);
        println!("     URL: {}", raw.url.as_deref().unwrap_or("N/A"));
        if let Some(text) = raw.content.as_text() {
            let preview: String = text.trim().chars().take(100).collect();
            println!("     Content: {}...", preview.replace('\n', " "));
        }
    }

    println!("\nAfter filtering: {} substantive chunks", kept);
    if kept == 0 {
        println!(
            "{}",
            style("All chunks filtered out; answers will use the fallback prompt").yellow()
        );
    }
    Ok(())
}

async fn health(config: &RagConfig) -> anyhow::Result<()> {
    println!("Qdrant:      {} (collection '{}')", config.qdrant.url, config.qdrant.collection);
    println!(
        "Qdrant key:  {}",
        if config.qdrant.api_key.is_some() { "set" } else { "not set (local)" }
    );
    println!("Backend:     {:?}", config.generation.backend);

    let providers = Providers::from_config(config)?;
    let points = providers.retriever.collection_info().await;
    let state = AppState::with_agent(
        config.clone(),
        RagAgent::from_config(config, providers.retriever, providers.llm),
    );

    let spinner = spinner("Checking collaborators...");
    let health = state.health().await;
    spinner.finish_and_clear();

    for provider in [&health.retriever, &health.llm] {
        let mark = if provider.healthy {
            style("OK").green()
        } else {
            style("DOWN").red()
        };
        println!("{:<12} {}", provider.name, mark);
    }

    match points {
        Ok(info) => match info.points_count {
            Some(0) => println!("{}", style("Collection is EMPTY; run the embedding pipeline").yellow()),
            Some(n) => println!("Collection has {} points", n),
            None => println!("Collection point count unavailable"),
        },
        Err(e) => println!("{} {}", style("Collection check failed:").red(), e),
    }

    if !health.all_healthy() {
        std::process::exit(1);
    }
    Ok(())
}

fn spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
