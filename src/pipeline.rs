use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::error::{MergeAbort, ScrapeError};
use crate::fetch::PageSource;
use crate::merge;
use crate::model::{RankedRecord, SourceDataset, SourceKind};
use crate::parser::{self, table::HeaderPredicate};
use crate::rank;
use crate::settings::Settings;

/// What happened to one source page.
#[derive(Debug)]
pub struct SourceOutcome {
    pub kind: SourceKind,
    pub url: String,
    /// Row count on success.
    pub result: Result<usize, ScrapeError>,
}

#[derive(Debug)]
pub struct PipelineReport {
    pub sources: Vec<SourceOutcome>,
    pub ranking: Result<Vec<RankedRecord>, MergeAbort>,
}

/// Scrape race, qualifying and practice one after another, then merge and rank.
///
/// A failing source is logged and left absent; the others are still fetched.
pub async fn run<S: PageSource>(
    source: &S,
    settings: &Settings,
    predicate: &dyn HeaderPredicate,
) -> PipelineReport {
    let pb = ProgressBar::new(SourceKind::ALL.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:20.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let delay = settings.delay();
    let mut sources = Vec::with_capacity(SourceKind::ALL.len());
    let mut datasets: [Option<SourceDataset>; 3] = Default::default();

    for (i, kind) in SourceKind::ALL.into_iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let url = settings.url_for(kind);
        pb.set_message(format!("{} {}", kind, url));

        let result = match scrape_one(source, kind, url, predicate).await {
            Ok(dataset) => {
                if dataset.is_empty() {
                    warn!(source = %kind, url, "results table has no rows");
                } else {
                    info!(source = %kind, rows = dataset.len(), "dataset ready");
                }
                let rows = dataset.len();
                datasets[i] = Some(dataset);
                Ok(rows)
            }
            Err(e) => {
                warn!(source = %kind, url, error = %e, "source unavailable");
                Err(e)
            }
        };
        sources.push(SourceOutcome {
            kind,
            url: url.to_string(),
            result,
        });
        pb.inc(1);
    }
    pb.finish_and_clear();

    let [race, qualifying, practice] = datasets;
    let ranking = merge::merge(race, qualifying, practice).map(|merged| rank::rank(merged, &settings.weights()));
    if let Err(abort) = &ranking {
        warn!(%abort, "no model data");
    }

    PipelineReport { sources, ranking }
}

async fn scrape_one<S: PageSource>(
    source: &S,
    kind: SourceKind,
    url: &str,
    predicate: &dyn HeaderPredicate,
) -> Result<SourceDataset, ScrapeError> {
    let html = source.fetch(kind, url).await?;
    parser::process_page(kind, &html, predicate)
}
