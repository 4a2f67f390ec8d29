mod extract;
mod models;
mod report;
mod sources;
mod store;

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};

use crate::sources::{HnFeed, Source};

#[derive(Parser)]
#[command(
    name = "signal_scraper",
    about = "Mine founder pain points: fetch HN/Reddit posts, extract via a generation model, rank"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and normalize candidate posts from one source
    Fetch {
        #[arg(short, long, value_enum, default_value_t = Source::Hackernews)]
        source: Source,
        /// Story feed for the hackernews source
        #[arg(long, value_enum, default_value_t = HnFeed::Ask)]
        feed: HnFeed,
        /// Subreddit for the reddit source
        #[arg(long, default_value = "Entrepreneur")]
        subreddit: String,
        /// Max candidate posts to fetch
        #[arg(short = 'n', long, default_value_t = 30)]
        limit: usize,
        /// Posts file to write
        #[arg(short, long, default_value = store::DEFAULT_POSTS_PATH)]
        output: PathBuf,
    },
    /// Run the batch extraction call over a fetched posts file
    Extract {
        /// Posts file to read
        #[arg(short, long, default_value = store::DEFAULT_POSTS_PATH)]
        input: PathBuf,
        /// Results file to write
        #[arg(short, long, default_value = store::DEFAULT_RESULTS_PATH)]
        output: PathBuf,
        /// Generation model identifier
        #[arg(long, default_value = extract::llm::DEFAULT_MODEL)]
        model: String,
        /// Response token budget
        #[arg(long, default_value_t = extract::llm::DEFAULT_MAX_TOKENS)]
        max_tokens: u32,
    },
    /// Score, rank and report a results file
    Analyze {
        #[arg(long, default_value = store::DEFAULT_RESULTS_PATH)]
        results: PathBuf,
        /// Posts file for the display join (optional context)
        #[arg(long, default_value = store::DEFAULT_POSTS_PATH)]
        posts: PathBuf,
        /// Pass threshold in percent
        #[arg(short = 't', long, default_value_t = report::DEFAULT_PASS_THRESHOLD)]
        threshold: f64,
        /// How many ranked pain points to print
        #[arg(short = 'n', long, default_value_t = 10)]
        top: usize,
    },
    /// Fetch + extract + analyze in one pass
    Run {
        #[arg(short, long, value_enum, default_value_t = Source::Hackernews)]
        source: Source,
        #[arg(long, value_enum, default_value_t = HnFeed::Ask)]
        feed: HnFeed,
        #[arg(long, default_value = "Entrepreneur")]
        subreddit: String,
        #[arg(short = 'n', long, default_value_t = 30)]
        limit: usize,
        #[arg(short = 't', long, default_value_t = report::DEFAULT_PASS_THRESHOLD)]
        threshold: f64,
        #[arg(long, default_value = extract::llm::DEFAULT_MODEL)]
        model: String,
        #[arg(long, default_value_t = extract::llm::DEFAULT_MAX_TOKENS)]
        max_tokens: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Fetch {
            source,
            feed,
            subreddit,
            limit,
            output,
        } => cmd_fetch(source, feed, &subreddit, limit, &output).await,
        Commands::Extract {
            input,
            output,
            model,
            max_tokens,
        } => cmd_extract(&input, &output, &model, max_tokens).await,
        Commands::Analyze {
            results,
            posts,
            threshold,
            top,
        } => cmd_analyze(&results, &posts, threshold, top),
        Commands::Run {
            source,
            feed,
            subreddit,
            limit,
            threshold,
            model,
            max_tokens,
        } => {
            let posts_path = PathBuf::from(store::DEFAULT_POSTS_PATH);
            let results_path = PathBuf::from(store::DEFAULT_RESULTS_PATH);
            cmd_fetch(source, feed, &subreddit, limit, &posts_path).await?;
            cmd_extract(&posts_path, &results_path, &model, max_tokens).await?;
            cmd_analyze(&results_path, &posts_path, threshold, 10)
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

async fn cmd_fetch(
    source: Source,
    feed: HnFeed,
    subreddit: &str,
    limit: usize,
    output: &Path,
) -> anyhow::Result<()> {
    println!("Fetching up to {} posts from {}...", limit, source.label());
    let outcome = sources::fetch_posts(source, feed, subreddit, limit).await?;
    report::print_fetch_report(&outcome.posts, outcome.fetched);
    store::save_posts(output, &outcome.posts)?;
    println!("\nSaved {} posts to {}", outcome.posts.len(), output.display());
    Ok(())
}

async fn cmd_extract(
    input: &Path,
    output: &Path,
    model: &str,
    max_tokens: u32,
) -> anyhow::Result<()> {
    let posts = store::load_posts(input)?;
    if posts.is_empty() {
        println!("No posts in {}. Run 'fetch' first.", input.display());
        return Ok(());
    }
    let results = extract::run_extraction(&posts, model, max_tokens).await?;
    store::save_results(output, &results)?;

    let analysis = report::analyze(&results, report::DEFAULT_PASS_THRESHOLD);
    report::print_summary(&analysis, report::DEFAULT_PASS_THRESHOLD);
    report::print_ranked(&analysis.pain_points, &posts, 5);
    println!("\nResults saved to {}", output.display());
    Ok(())
}

fn cmd_analyze(
    results_path: &Path,
    posts_path: &Path,
    threshold: f64,
    top: usize,
) -> anyhow::Result<()> {
    let results = store::load_results(results_path)?;
    if results.is_empty() {
        println!("No results in {}. Run 'extract' first.", results_path.display());
        return Ok(());
    }
    // Posts are display context only; analysis works without the file.
    let posts = store::load_posts(posts_path).unwrap_or_default();

    let analysis = report::analyze(&results, threshold);
    report::print_summary(&analysis, threshold);
    report::print_ranked(&analysis.pain_points, &posts, top);
    report::print_categories(&analysis.pain_points);
    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
