use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::ElementRef;
use tracing::{debug, warn};

use super::table::{cell_text, LocatedTable, CELL_SEL, DRIVER, NAME, POS, ROW_SEL};
use crate::error::ScrapeError;
use crate::model::{ResultRow, SourceDataset, SourceKind};

static DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").unwrap());

/// One body row zipped against the header: field `i` belongs to header `i`.
pub type Record = Vec<Option<String>>;

/// Body rows of `table` (header row skipped), each exactly `width` fields wide.
/// Short rows get `None` for the missing trailing cells; surplus cells are dropped.
pub fn records(table: ElementRef<'_>, width: usize) -> Vec<Record> {
    table
        .select(&ROW_SEL)
        .skip(1)
        .filter_map(|row| {
            let mut cells = row.select(&CELL_SEL).map(cell_text).peekable();
            cells.peek()?;
            Some((0..width).map(|_| cells.next()).collect())
        })
        .collect()
}

/// Rename NAME to DRIVER when the header has no DRIVER column.
pub fn normalize_headers(headers: &[String]) -> Vec<String> {
    let has_driver = headers.iter().any(|h| h == DRIVER);
    let has_name = headers.iter().any(|h| h == NAME);
    if has_name && !has_driver {
        headers
            .iter()
            .map(|h| if h == NAME { DRIVER.to_string() } else { h.clone() })
            .collect()
    } else {
        headers.to_vec()
    }
}

/// First run of digits in a POS cell: "1" -> 1, "11th" -> 11, "DNF" -> None.
pub fn parse_position(text: &str) -> Option<u32> {
    DIGITS_RE
        .find(text)?
        .as_str()
        .parse::<u32>()
        .ok()
        .filter(|&p| p >= 1)
}

/// Turn a located table into a dataset keyed by competitor name.
pub fn extract(kind: SourceKind, table: &LocatedTable<'_>) -> Result<SourceDataset, ScrapeError> {
    let headers = normalize_headers(&table.headers);
    let pos_col = headers.iter().position(|h| h == POS);
    let driver_col = headers.iter().position(|h| h == DRIVER);

    let (Some(pos_col), Some(driver_col)) = (pos_col, driver_col) else {
        let mut missing = Vec::new();
        if pos_col.is_none() {
            missing.push(POS);
        }
        if driver_col.is_none() {
            missing.push(DRIVER);
        }
        return Err(ScrapeError::SchemaMismatch {
            source_kind: kind,
            missing,
            found: headers,
        });
    };

    let mut seen = HashSet::new();
    let mut rows = Vec::new();

    for (i, record) in records(table.element, headers.len()).into_iter().enumerate() {
        let Some(name) = record[driver_col].as_deref().filter(|n| !n.is_empty()) else {
            debug!(source = %kind, row = i + 1, "skipping row without a competitor name");
            continue;
        };

        if !seen.insert(name.to_string()) {
            warn!(source = %kind, row = i + 1, competitor = name, "duplicate competitor, keeping first row");
            continue;
        }

        let position = record[pos_col].as_deref().and_then(parse_position);
        if position.is_none() {
            debug!(source = %kind, competitor = name, raw = ?record[pos_col], "unparseable position");
        }

        rows.push(ResultRow {
            competitor: name.to_string(),
            position,
        });
    }

    Ok(SourceDataset {
        kind,
        headers,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::table::{locate, results_header};
    use scraper::Html;

    fn strings(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|c| c.to_string()).collect()
    }

    fn dataset(html: &str) -> Result<SourceDataset, ScrapeError> {
        let doc = Html::parse_document(html);
        let table = locate(&doc, &results_header).unwrap();
        extract(SourceKind::Race, &table)
    }

    #[test]
    fn name_header_is_renamed() {
        assert_eq!(normalize_headers(&strings(&["POS", "NAME"])), strings(&["POS", "DRIVER"]));
    }

    #[test]
    fn driver_header_is_left_alone() {
        assert_eq!(normalize_headers(&strings(&["POS", "DRIVER"])), strings(&["POS", "DRIVER"]));
        // NAME stays when DRIVER is already present
        assert_eq!(
            normalize_headers(&strings(&["POS", "NAME", "DRIVER"])),
            strings(&["POS", "NAME", "DRIVER"])
        );
    }

    #[test]
    fn normalization_is_idempotent() {
        for cols in [&["POS", "NAME"][..], &["POS", "DRIVER"], &["NAME", "NAME"], &["TEAM"]] {
            let once = normalize_headers(&strings(cols));
            assert_eq!(normalize_headers(&once), once);
        }
    }

    #[test]
    fn positions() {
        assert_eq!(parse_position("1"), Some(1));
        assert_eq!(parse_position("11th"), Some(11));
        assert_eq!(parse_position(" 3 "), Some(3));
        assert_eq!(parse_position("DNF"), None);
        assert_eq!(parse_position(""), None);
        assert_eq!(parse_position("0"), None);
        // ASCII digits only
        assert_eq!(parse_position("٣ 5"), Some(5));
        assert_eq!(parse_position("٣"), None);
    }

    #[test]
    fn records_have_header_width() {
        let html = r#"<table>
            <tr><th>POS</th><th>DRIVER</th><th>TEAM</th></tr>
            <tr><td>1</td><td>A</td><td>X</td></tr>
            <tr><td>2</td><td>B</td></tr>
            <tr><td>3</td><td>C</td><td>Y</td><td>extra</td></tr>
            <tr></tr>
        </table>"#;
        let doc = Html::parse_document(html);
        let table = locate(&doc, &results_header).unwrap();
        let recs = records(table.element, table.headers.len());
        assert_eq!(recs.len(), 3);
        assert!(recs.iter().all(|r| r.len() == 3));
        assert_eq!(recs[1][2], None);
        assert_eq!(recs[2][2].as_deref(), Some("Y"));
    }

    #[test]
    fn unknown_position_is_kept() {
        let ds = dataset(
            "<table><tr><th>POS</th><th>DRIVER</th></tr><tr><td>1</td><td>A</td></tr><tr><td>DNF</td><td>B</td></tr></table>",
        )
        .unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.rows[1], ResultRow { competitor: "B".into(), position: None });
    }

    #[test]
    fn duplicate_and_blank_names_are_skipped() {
        let ds = dataset(
            "<table><tr><th>POS</th><th>DRIVER</th></tr>\
             <tr><td>1</td><td>A</td></tr>\
             <tr><td>2</td><td> </td></tr>\
             <tr><td>3</td><td>A</td></tr>\
             <tr><td>4</td></tr></table>",
        )
        .unwrap();
        assert_eq!(ds.rows, vec![ResultRow { competitor: "A".into(), position: Some(1) }]);
    }

    #[test]
    fn schema_mismatch_from_custom_predicate() {
        let doc = Html::parse_document("<table><tr><th>P</th><th>DRIVER</th></tr><tr><td>1</td><td>A</td></tr></table>");
        let table = locate(&doc, &|h: &[String]| h.iter().any(|c| c == "P")).unwrap();
        match extract(SourceKind::Practice, &table) {
            Err(ScrapeError::SchemaMismatch { source_kind, missing, found }) => {
                assert_eq!(source_kind, SourceKind::Practice);
                assert_eq!(missing, vec![POS]);
                assert_eq!(found, strings(&["P", "DRIVER"]));
            }
            other => panic!("expected schema mismatch, got {:?}", other),
        }
    }

    #[test]
    fn qualifying_fixture_uses_name_column() {
        let html = std::fs::read_to_string("tests/fixtures/qualifying.html").unwrap();
        let ds = dataset(&html).unwrap();
        assert!(ds.headers.contains(&"DRIVER".to_string()));
        assert!(!ds.headers.contains(&"NAME".to_string()));
        assert_eq!(ds.len(), 6);
        assert_eq!(ds.rows[0].competitor, "Lando Norris");
        assert_eq!(ds.row_of("Carlos Sainz").and_then(|r| r.position), Some(6));
    }

    #[test]
    fn race_fixture_rows() {
        let html = std::fs::read_to_string("tests/fixtures/race.html").unwrap();
        let ds = dataset(&html).unwrap();
        assert_eq!(ds.len(), 6);
        let names: Vec<&str> = ds.rows.iter().map(|r| r.competitor.as_str()).collect();
        assert_eq!(names[..3], ["Lando Norris", "Max Verstappen", "George Russell"]);
        assert_eq!(ds.row_of("Carlos Sainz").unwrap().position, None);
    }
}
