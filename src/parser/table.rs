use std::sync::LazyLock;

use itertools::Itertools;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

static TABLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());
pub(super) static ROW_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
pub(super) static CELL_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("th, td").unwrap());

pub const POS: &str = "POS";
pub const DRIVER: &str = "DRIVER";
pub const NAME: &str = "NAME";

/// Decides whether a header row belongs to the results table.
pub trait HeaderPredicate {
    fn is_results_header(&self, header: &[String]) -> bool;
}

impl<F> HeaderPredicate for F
where
    F: Fn(&[String]) -> bool,
{
    fn is_results_header(&self, header: &[String]) -> bool {
        self(header)
    }
}

/// ESPN-style results header: a POS column plus DRIVER or NAME. Case-sensitive.
pub fn results_header(header: &[String]) -> bool {
    let has = |token: &str| header.iter().any(|h| h == token);
    has(POS) && (has(DRIVER) || has(NAME))
}

#[derive(Debug)]
pub struct LocatedTable<'a> {
    /// Zero-based position among all tables in the document.
    pub index: usize,
    pub element: ElementRef<'a>,
    pub headers: Vec<String>,
}

/// First table, in document order, whose first row satisfies `predicate`.
pub fn locate<'a>(doc: &'a Html, predicate: &dyn HeaderPredicate) -> Option<LocatedTable<'a>> {
    for (index, table) in doc.select(&TABLE_SEL).enumerate() {
        let Some(first_row) = table.select(&ROW_SEL).next() else {
            debug!(table = index + 1, "table has no rows");
            continue;
        };

        let headers: Vec<String> = first_row.select(&CELL_SEL).map(cell_text).collect();
        debug!(table = index + 1, headers = %headers.iter().join(" | "), "checking table");

        if predicate.is_results_header(&headers) {
            return Some(LocatedTable {
                index,
                element: table,
                headers,
            });
        }
    }
    None
}

pub fn count_tables(doc: &Html) -> usize {
    doc.select(&TABLE_SEL).count()
}

/// All text inside the cell, whitespace runs collapsed, trimmed.
pub fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().split_whitespace().join(" ")
}
