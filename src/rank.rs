use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::model::{MergedRecord, RankedRecord};

/// Per-session weights for the composite score. Not normalized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightConfig {
    pub race: f64,
    pub qualifying: f64,
    pub practice: f64,
}

impl Default for WeightConfig {
    fn default() -> Self {
        WeightConfig {
            race: 0.6,
            qualifying: 0.3,
            practice: 0.1,
        }
    }
}

impl WeightConfig {
    /// Dot product of positions and weights. `None` if a position is unknown.
    pub fn score(&self, record: &MergedRecord) -> Option<f64> {
        let score = f64::from(record.race?) * self.race
            + f64::from(record.qualifying?) * self.qualifying
            + f64::from(record.practice?) * self.practice;
        Some(score).filter(|s| !s.is_nan())
    }
}

/// Score every record and sort ascending. Unscoreable records go last;
/// equal scores keep merge order.
pub fn rank(records: Vec<MergedRecord>, weights: &WeightConfig) -> Vec<RankedRecord> {
    let mut ranked: Vec<RankedRecord> = records
        .into_iter()
        .map(|record| RankedRecord {
            score: weights.score(&record),
            record,
        })
        .collect();
    ranked.sort_by(|a, b| compare_scores(a.score, b.score));
    ranked
}

fn compare_scores(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
