pub mod rows;
pub mod table;

use scraper::Html;
use tracing::info;

use crate::error::ScrapeError;
use crate::model::{SourceDataset, SourceKind};
use table::HeaderPredicate;

/// html → results table → dataset.
pub fn process_page(
    kind: SourceKind,
    html: &str,
    predicate: &dyn HeaderPredicate,
) -> Result<SourceDataset, ScrapeError> {
    let doc = Html::parse_document(html);

    let located = table::locate(&doc, predicate).ok_or_else(|| ScrapeError::NoTableFound {
        source_kind: kind,
        tables: table::count_tables(&doc),
    })?;
    info!(source = %kind, table = located.index + 1, "found results table");

    rows::extract(kind, &located)
}
