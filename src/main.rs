use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use chrono::Datelike;
use clap::{Parser, Subcommand};
use tracing::warn;

use grid_predict::fetch::HttpSource;
use grid_predict::parser::table::results_header;
use grid_predict::roster::RosterClient;
use grid_predict::settings::Settings;
use grid_predict::{pipeline, report};

#[derive(Parser)]
#[command(name = "grid_predict", about = "Race order prediction from scraped session results")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape race, qualifying and practice results and print the predicted order
    Predict {
        #[arg(long)]
        race_url: Option<String>,
        #[arg(long)]
        qualifying_url: Option<String>,
        #[arg(long)]
        practice_url: Option<String>,
        /// Pause between page requests, in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,
    },
    /// Driver numbers from the latest event of a season
    Roster {
        /// Season year (default: current year)
        #[arg(short, long)]
        season: Option<i32>,
        #[arg(long)]
        cache_dir: Option<PathBuf>,
        /// Ignore any cached response
        #[arg(long)]
        refresh: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load()?;

    let result = match cli.command {
        Commands::Predict {
            race_url,
            qualifying_url,
            practice_url,
            delay_ms,
        } => {
            if let Some(url) = race_url {
                settings.race_url = url;
            }
            if let Some(url) = qualifying_url {
                settings.qualifying_url = url;
            }
            if let Some(url) = practice_url {
                settings.practice_url = url;
            }
            if let Some(ms) = delay_ms {
                settings.delay_ms = ms;
            }

            let source = HttpSource::new(&settings.user_agent).context("failed to build HTTP client")?;
            let run = pipeline::run(&source, &settings, &results_header).await;

            for outcome in &run.sources {
                if let Err(e) = &outcome.result {
                    println!("Could not load {} data: {}", outcome.kind, e);
                }
            }

            match &run.ranking {
                Ok(ranked) => {
                    println!("\nModel Data:");
                    print!("{}", report::model_table(ranked));
                    println!();
                    print!("{}", report::listing(ranked, &settings.target_event));
                }
                Err(abort) => {
                    warn!(%abort, "prediction skipped");
                    println!("No model data available for prediction.");
                }
            }

            println!("\nNote: This prediction is based on {} data.", settings.source_event);
            Ok(())
        }
        Commands::Roster {
            season,
            cache_dir,
            refresh,
        } => {
            let season = season.unwrap_or_else(|| chrono::Local::now().year());
            let cache_dir = cache_dir.unwrap_or_else(|| settings.cache_dir.clone());
            let client = RosterClient::new(&settings.user_agent, &settings.roster_api, cache_dir)
                .context("failed to build HTTP client")?;

            let roster = client
                .latest(season, refresh)
                .await
                .with_context(|| format!("roster lookup for {} failed", season))?;
            print!("{}", report::roster_listing(&roster));
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }

    result
}
