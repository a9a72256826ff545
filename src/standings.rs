use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::debug;

use crate::cache::{TtlCache, cache_key};
use crate::model::{EnrichedData, H2hMeeting, TeamSeasonStats, Venue, VenueStats};

#[derive(Debug, Clone, PartialEq)]
pub struct StandingRow {
    pub team: String,
    pub stats: TeamSeasonStats,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StandingsTable {
    pub kind: String,
    pub rows: Vec<StandingRow>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Standings {
    pub tables: Vec<StandingsTable>,
}

impl Standings {
    /// Table for the venue, or the first table when that type is not published.
    pub fn table(&self, venue: Venue) -> Option<&StandingsTable> {
        let want = match venue {
            Venue::Home => "HOME",
            Venue::Away => "AWAY",
            Venue::Total => "TOTAL",
        };
        self.tables
            .iter()
            .find(|t| t.kind.eq_ignore_ascii_case(want))
            .or_else(|| self.tables.first())
    }

    pub fn league_size(&self) -> usize {
        self.table(Venue::Total).map_or(0, |t| t.rows.len())
    }

    /// Digest of every table's kind, teams and stats. Two standings with the
    /// same content share a fingerprint.
    pub fn fingerprint(&self) -> String {
        let rows: Vec<String> = self
            .tables
            .iter()
            .flat_map(|t| {
                t.rows
                    .iter()
                    .map(move |r| format!("{}|{}|{:?}", t.kind, r.team, r.stats))
            })
            .collect();
        cache_key("standings", &rows)
    }
}

pub fn parse_standings_json(raw: &str) -> Result<Standings> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Standings::default());
    }
    let root: Value = serde_json::from_str(trimmed).context("invalid standings json")?;
    let Some(list) = root.get("standings").and_then(|v| v.as_array()) else {
        return Ok(Standings::default());
    };

    let tables = list
        .iter()
        .map(|entry| StandingsTable {
            kind: entry
                .get("type")
                .and_then(|v| v.as_str())
                .unwrap_or("TOTAL")
                .to_string(),
            rows: parse_rows(entry.get("table")),
        })
        .collect();
    Ok(Standings { tables })
}

fn parse_rows(value: Option<&Value>) -> Vec<StandingRow> {
    let Some(list) = value.and_then(|v| v.as_array()) else {
        return Vec::new();
    };
    list.iter()
        .enumerate()
        .filter_map(|(idx, entry)| parse_row(entry, idx + 1))
        .collect()
}

fn parse_row(value: &Value, ordinal: usize) -> Option<StandingRow> {
    let team = value
        .get("team")
        .and_then(|t| t.get("name"))
        .and_then(|v| v.as_str())?
        .trim()
        .to_string();
    if team.is_empty() {
        return None;
    }
    let form = value
        .get("form")
        .and_then(|v| v.as_str())
        .map(normalize_form)
        .unwrap_or_default();

    Some(StandingRow {
        team,
        stats: TeamSeasonStats {
            played: pick_u32(value, "playedGames").unwrap_or(0),
            won: pick_u32(value, "won").unwrap_or(0),
            draw: pick_u32(value, "draw").unwrap_or(0),
            lost: pick_u32(value, "lost").unwrap_or(0),
            goals_for: pick_u32(value, "goalsFor").unwrap_or(0),
            goals_against: pick_u32(value, "goalsAgainst").unwrap_or(0),
            // Rank is the row's place in the table; the feed's `position` field is ignored.
            position: Some(ordinal as u32),
            points: pick_u32(value, "points").unwrap_or(0),
            form,
        },
    })
}

/// Feeds publish form newest-first and comma separated ("W,L,D"); the engine
/// reads it oldest-first with no separators.
fn normalize_form(raw: &str) -> String {
    let letters: Vec<char> = raw
        .chars()
        .filter(|c| matches!(c, 'W' | 'D' | 'L'))
        .collect();
    if raw.contains(',') {
        letters.into_iter().rev().collect()
    } else {
        letters.into_iter().collect()
    }
}

fn pick_u32(value: &Value, key: &str) -> Option<u32> {
    let v = value.get(key)?;
    v.as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .or_else(|| v.as_str().and_then(|s| s.trim().parse::<u32>().ok()))
}

/// Team-name lookups over parsed standings, memoised for a fixed TTL.
///
/// Entries are keyed by the standings' content, so one lookup can serve
/// several competitions.
pub struct StatsLookup {
    cache: TtlCache<Option<TeamSeasonStats>>,
}

impl StatsLookup {
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: TtlCache::new(ttl),
        }
    }

    pub fn stats_for(
        &mut self,
        standings: &Standings,
        team: &str,
        venue: Venue,
    ) -> Option<TeamSeasonStats> {
        let key = cache_key(
            "stats",
            &[standings.fingerprint(), team.to_lowercase(), format!("{venue:?}")],
        );
        if let Some(hit) = self.cache.get(&key) {
            return hit;
        }
        let found = find_team(standings, team, venue);
        self.cache.insert(key, found.clone());
        found
    }

    /// Venue split for the fixture, falling back to season totals when the split
    /// has no matches yet.
    pub fn enrich(
        &mut self,
        standings: &Standings,
        home_team: &str,
        away_team: &str,
        h2h: Vec<H2hMeeting>,
    ) -> EnrichedData {
        let home_stats = self.split_or_total(standings, home_team, Venue::Home);
        let away_stats = self.split_or_total(standings, away_team, Venue::Away);
        let size = standings.league_size();
        debug!(home_team, away_team, league_size = size, "enriched standings");

        EnrichedData {
            home_stats,
            away_stats,
            h2h,
            top_scorers: Vec::new(),
            standings: vec![Value::Null; size],
        }
    }

    pub fn venue_stats(&mut self, standings: &Standings, team: &str) -> VenueStats {
        VenueStats {
            home: self.stats_for(standings, team, Venue::Home),
            away: self.stats_for(standings, team, Venue::Away),
            total: self.stats_for(standings, team, Venue::Total),
        }
    }

    fn split_or_total(
        &mut self,
        standings: &Standings,
        team: &str,
        venue: Venue,
    ) -> Option<TeamSeasonStats> {
        self.venue_stats(standings, team).for_venue(venue).cloned()
    }
}

fn find_team(standings: &Standings, team: &str, venue: Venue) -> Option<TeamSeasonStats> {
    let needle = team.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    standings
        .table(venue)?
        .rows
        .iter()
        .find(|row| row.team.to_lowercase().contains(&needle))
        .map(|row| row.stats.clone())
}
