//! Driver line-up of the latest event in a season, from an Ergast-compatible API.
//!
//! Independent of the prediction pipeline. Responses are cached as raw JSON
//! under the cache directory: one file per finished season, one file per
//! round for a season still in progress.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Local, NaiveDate};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::RosterError;

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "MRData")]
    mr_data: MrData,
}

#[derive(Deserialize)]
struct MrData {
    #[serde(rename = "RaceTable")]
    race_table: RaceTable,
}

#[derive(Deserialize)]
struct RaceTable {
    #[serde(rename = "Races", default)]
    races: Vec<Race>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Race {
    race_name: String,
    round: String,
    date: Option<String>,
    #[serde(rename = "Results", default)]
    results: Vec<RaceResult>,
}

#[derive(Deserialize)]
struct RaceResult {
    number: Option<String>,
    #[serde(rename = "Driver")]
    driver: Driver,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Driver {
    code: Option<String>,
    permanent_number: Option<String>,
    given_name: String,
    family_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RosterEntry {
    /// Car number raced at this event.
    pub number: String,
    pub code: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Roster {
    pub season: i32,
    pub round: u32,
    pub event: String,
    pub date: Option<NaiveDate>,
    pub drivers: Vec<RosterEntry>,
}

impl Roster {
    pub fn numbers(&self) -> Vec<&str> {
        self.drivers.iter().map(|d| d.number.as_str()).collect()
    }
}

pub fn parse_roster(season: i32, body: &str) -> Result<Roster, RosterError> {
    let envelope: Envelope = serde_json::from_str(body)?;
    let race = envelope
        .mr_data
        .race_table
        .races
        .into_iter()
        .next()
        .filter(|r| !r.results.is_empty())
        .ok_or(RosterError::NoEvent { season })?;

    let drivers = race
        .results
        .into_iter()
        .filter_map(|r| {
            let number = r.number.or(r.driver.permanent_number)?;
            Some(RosterEntry {
                number,
                code: r.driver.code,
                name: format!("{} {}", r.driver.given_name, r.driver.family_name),
            })
        })
        .collect();

    let round = race
        .round
        .parse()
        .map_err(|_| RosterError::InvalidRound { value: race.round.clone() })?;

    Ok(Roster {
        season,
        round,
        event: race.race_name,
        date: race.date.and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
        drivers,
    })
}

pub struct RosterClient {
    client: reqwest::Client,
    api: String,
    cache_dir: PathBuf,
}

impl RosterClient {
    pub fn new(user_agent: &str, api: &str, cache_dir: impl Into<PathBuf>) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(RosterClient {
            client,
            api: api.trim_end_matches('/').to_string(),
            cache_dir: cache_dir.into(),
        })
    }

    /// `roster-2024.json` for a whole season, `roster-2025-r07.json` for one round.
    pub fn cache_path(&self, season: i32, round: Option<u32>) -> PathBuf {
        let name = match round {
            Some(round) => format!("roster-{}-r{:02}.json", season, round),
            None => format!("roster-{}.json", season),
        };
        self.cache_dir.join(name)
    }

    /// Roster of the most recent event with results. Uses the cached response
    /// unless `refresh` is set.
    pub async fn latest(&self, season: i32, refresh: bool) -> Result<Roster, RosterError> {
        self.latest_as_of(season, refresh, Local::now().year()).await
    }

    async fn latest_as_of(&self, season: i32, refresh: bool, current_year: i32) -> Result<Roster, RosterError> {
        if season < current_year {
            // last event of a finished season is fixed
            return self.cached_or_download(season, None, refresh).await;
        }

        // season in progress: find the latest round first, then look it up by round
        let head = parse_roster(season, &self.download(season, Some(1)).await?)?;
        debug!(season, round = head.round, "latest round resolved");
        self.cached_or_download(season, Some(head.round), refresh).await
    }

    async fn cached_or_download(&self, season: i32, round: Option<u32>, refresh: bool) -> Result<Roster, RosterError> {
        if !refresh {
            let path = self.cache_path(season, round);
            if let Some(body) = read_cache(&path).await? {
                debug!(path = %path.display(), "roster cache hit");
                return parse_roster(season, &body);
            }
        }

        let body = self.download(season, None).await?;
        let roster = parse_roster(season, &body)?;
        // a round may have finished since it was resolved
        write_cache(&self.cache_path(season, round.map(|_| roster.round)), &body).await?;
        info!(
            season,
            round = roster.round,
            event = %roster.event,
            drivers = roster.drivers.len(),
            "roster cached"
        );
        Ok(roster)
    }

    async fn download(&self, season: i32, limit: Option<u32>) -> Result<String, RosterError> {
        let mut url = format!("{}/{}/last/results.json", self.api, season);
        if let Some(limit) = limit {
            url.push_str(&format!("?limit={}", limit));
        }
        info!(url = %url, "fetching roster");

        let request_err = |source: reqwest::Error| RosterError::Request {
            url: url.clone(),
            source,
        };
        self.client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(request_err)?
            .text()
            .await
            .map_err(request_err)
    }
}

async fn read_cache(path: &Path) -> Result<Option<String>, RosterError> {
    match tokio::fs::read_to_string(path).await {
        Ok(body) => Ok(Some(body)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(RosterError::Cache {
            path: path.to_path_buf(),
            source,
        }),
    }
}

async fn write_cache(path: &Path, body: &str) -> Result<(), RosterError> {
    let cache_err = |source: std::io::Error| RosterError::Cache {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await.map_err(cache_err)?;
    }
    tokio::fs::write(path, body).await.map_err(cache_err)
}
