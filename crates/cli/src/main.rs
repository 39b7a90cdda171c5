use anyhow::Result;
use clap::{Parser, Subcommand};
use matcher_core::config;
use matcher_core::config::AppConfig;
use matcher_core::models::{MatchRequest, MatchResponse};
use matcher_core::pipeline;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Match {
            query,
            keywords,
            languages,
            topics,
            topk,
            json,
        } => run_match(cfg, query, keywords, languages, topics, topk, json).await,
        Commands::Keywords {
            keywords,
            languages,
            topics,
        } => {
            for keyword in matcher_core::keywords::expand(&keywords, &languages, &topics) {
                println!("{keyword}");
            }
            Ok(())
        }
    }
}

#[derive(Parser)]
#[command(name = "issue-matcher")]
#[command(about = "Recommend open-source issues matching a developer profile", long_about = None)]
struct Cli {
    /// Path to config TOML
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, rank, and print matching issues
    Match {
        /// Free-text profile/query; synthesized from the lists when omitted
        query: Option<String>,
        /// Technical keywords/skills (comma-separated)
        #[arg(long, value_delimiter = ',', num_args = 1.., default_values_t = Vec::<String>::new())]
        keywords: Vec<String>,
        /// Programming languages (comma-separated)
        #[arg(long, value_delimiter = ',', num_args = 1.., default_values_t = Vec::<String>::new())]
        languages: Vec<String>,
        /// Topics of interest (comma-separated)
        #[arg(long, value_delimiter = ',', num_args = 1.., default_values_t = Vec::<String>::new())]
        topics: Vec<String>,
        /// Number of results; defaults to the configured value
        #[arg(short, long)]
        topk: Option<usize>,
        /// Output the full response as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the expanded search keyword set
    Keywords {
        #[arg(long, value_delimiter = ',', num_args = 1.., default_values_t = Vec::<String>::new())]
        keywords: Vec<String>,
        #[arg(long, value_delimiter = ',', num_args = 1.., default_values_t = Vec::<String>::new())]
        languages: Vec<String>,
        #[arg(long, value_delimiter = ',', num_args = 1.., default_values_t = Vec::<String>::new())]
        topics: Vec<String>,
    },
}

async fn run_match(
    cfg: AppConfig,
    query: Option<String>,
    keywords: Vec<String>,
    languages: Vec<String>,
    topics: Vec<String>,
    topk: Option<usize>,
    json: bool,
) -> Result<()> {
    let query_text = query.unwrap_or_else(|| synthesize_query(&keywords, &languages, &topics));
    let token = std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty());
    if token.is_none() {
        tracing::warn!("GITHUB_TOKEN not set; fetching unauthenticated with stricter rate limits");
    }

    let registry = pipeline::build_registry(&cfg);
    let github = pipeline::build_github(&cfg, token)?;

    let req = MatchRequest {
        query_text,
        keywords,
        languages,
        topics,
        top_k: topk.unwrap_or(cfg.matching.top_k),
    };
    let resp = pipeline::match_issues(req, &cfg, &registry, &github).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&resp)?);
    } else {
        print_human(&resp);
    }
    Ok(())
}

fn synthesize_query(keywords: &[String], languages: &[String], topics: &[String]) -> String {
    let mut parts = Vec::new();
    if !keywords.is_empty() {
        parts.push(format!("Keywords: {}", keywords.join(", ")));
    }
    if !languages.is_empty() {
        parts.push(format!("Languages: {}", languages.join(", ")));
    }
    if !topics.is_empty() {
        parts.push(format!("Topics: {}", topics.join(", ")));
    }
    if parts.is_empty() {
        "open source issues".to_string()
    } else {
        parts.join(". ")
    }
}

fn print_human(resp: &MatchResponse) {
    println!(
        "{} (fetched {}, indexed {})",
        resp.message, resp.issues_fetched, resp.issues_indexed
    );
    for (rank, rec) in resp.recommendations.iter().enumerate() {
        println!(
            "{:>2}. [{:.3}] {} {}",
            rank + 1,
            rec.similarity_score.unwrap_or_default(),
            rec.title.as_deref().unwrap_or("(untitled)"),
            rec.issue_url.as_deref().unwrap_or("")
        );
    }
}
