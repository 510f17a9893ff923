use std::fmt;

/// Which session page a dataset was scraped from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Race,
    Qualifying,
    Practice,
}

impl SourceKind {
    /// Fetch order used by the pipeline.
    pub const ALL: [SourceKind; 3] = [SourceKind::Race, SourceKind::Qualifying, SourceKind::Practice];

    pub fn label(self) -> &'static str {
        match self {
            SourceKind::Race => "race",
            SourceKind::Qualifying => "qualifying",
            SourceKind::Practice => "practice",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub competitor: String,
    /// `None` when the POS cell had no digits ("DNF", "DSQ", blank).
    pub position: Option<u32>,
}

/// One scraped results table. Built once per page and never mutated.
#[derive(Debug, Clone)]
pub struct SourceDataset {
    pub kind: SourceKind,
    pub headers: Vec<String>,
    pub rows: Vec<ResultRow>,
}

impl SourceDataset {
    #[cfg(test)]
    pub fn row_of(&self, competitor: &str) -> Option<&ResultRow> {
        self.rows.iter().find(|r| r.competitor == competitor)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergedRecord {
    pub competitor: String,
    pub race: Option<u32>,
    pub qualifying: Option<u32>,
    pub practice: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedRecord {
    pub record: MergedRecord,
    /// `None` if any of the three positions is unknown.
    pub score: Option<f64>,
}

impl RankedRecord {
    pub fn competitor(&self) -> &str {
        &self.record.competitor
    }
}
