//! Inner join of the three session datasets on competitor name.
//!
//! Names are compared byte-for-byte. A driver rendered differently on two
//! pages ("Max Verstappen" vs "Max Verstappen (NED)") does not match and is
//! left out of the model.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::error::MergeAbort;
use crate::model::{MergedRecord, ResultRow, SourceDataset, SourceKind};

/// Whether a run may continue with the datasets it has.
///
/// Every source must be present; there is no 2-of-3 prediction.
pub fn require_all(
    race: Option<SourceDataset>,
    qualifying: Option<SourceDataset>,
    practice: Option<SourceDataset>,
) -> Result<(SourceDataset, SourceDataset, SourceDataset), MergeAbort> {
    match (race, qualifying, practice) {
        (Some(r), Some(q), Some(p)) => Ok((r, q, p)),
        (r, q, p) => {
            let missing = [
                (SourceKind::Race, r.is_none()),
                (SourceKind::Qualifying, q.is_none()),
                (SourceKind::Practice, p.is_none()),
            ]
            .into_iter()
            .filter_map(|(kind, absent)| absent.then_some(kind))
            .collect();
            Err(MergeAbort { missing })
        }
    }
}

pub fn merge(
    race: Option<SourceDataset>,
    qualifying: Option<SourceDataset>,
    practice: Option<SourceDataset>,
) -> Result<Vec<MergedRecord>, MergeAbort> {
    let (race, qualifying, practice) = require_all(race, qualifying, practice)?;
    let merged = join(&race, &qualifying, &practice);
    info!(
        race = race.len(),
        qualifying = qualifying.len(),
        practice = practice.len(),
        merged = merged.len(),
        "merged datasets"
    );
    Ok(merged)
}

/// race ⋈ qualifying, then ⋈ practice. Output follows race order.
pub fn join(race: &SourceDataset, qualifying: &SourceDataset, practice: &SourceDataset) -> Vec<MergedRecord> {
    let qualifying_pos = index(qualifying);
    let practice_pos = index(practice);

    let race_qualifying: Vec<(&ResultRow, Option<u32>)> = race
        .rows
        .iter()
        .filter_map(|row| Some((row, *qualifying_pos.get(row.competitor.as_str())?)))
        .collect();

    race_qualifying
        .into_iter()
        .filter_map(|(row, qualifying)| {
            let Some(&practice) = practice_pos.get(row.competitor.as_str()) else {
                debug!(competitor = %row.competitor, "not in every session, dropped");
                return None;
            };
            Some(MergedRecord {
                competitor: row.competitor.clone(),
                race: row.position,
                qualifying,
                practice,
            })
        })
        .collect()
}

fn index(dataset: &SourceDataset) -> HashMap<&str, Option<u32>> {
    let mut map = HashMap::with_capacity(dataset.len());
    for row in &dataset.rows {
        map.entry(row.competitor.as_str()).or_insert(row.position);
    }
    map
}
