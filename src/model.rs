use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::overlays::{HalftimeProfile, Playstyle, WeatherReport};

/// Season snapshot for one team, from a standings table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamSeasonStats {
    #[serde(default)]
    pub played: u32,
    #[serde(default)]
    pub won: u32,
    #[serde(default)]
    pub draw: u32,
    #[serde(default)]
    pub lost: u32,
    #[serde(default)]
    pub goals_for: u32,
    #[serde(default)]
    pub goals_against: u32,
    #[serde(default)]
    pub position: Option<u32>,
    #[serde(default)]
    pub points: u32,
    /// Recent results, most recent last (`W`/`D`/`L`).
    #[serde(default)]
    pub form: String,
}

impl TeamSeasonStats {
    /// True for a blank record such as `{}`: no matches, no goals, no table position.
    pub fn is_empty(&self) -> bool {
        self.played == 0 && self.goals_for == 0 && self.goals_against == 0 && self.position.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Venue {
    Home,
    Away,
    Total,
}

/// Standings rows for one team split by venue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VenueStats {
    #[serde(default)]
    pub home: Option<TeamSeasonStats>,
    #[serde(default)]
    pub away: Option<TeamSeasonStats>,
    #[serde(default)]
    pub total: Option<TeamSeasonStats>,
}

impl VenueStats {
    /// The requested split, or the season total when the split has no matches.
    pub fn for_venue(&self, venue: Venue) -> Option<&TeamSeasonStats> {
        let split = match venue {
            Venue::Home => self.home.as_ref(),
            Venue::Away => self.away.as_ref(),
            Venue::Total => self.total.as_ref(),
        };
        match split {
            Some(s) if s.played > 0 => Some(s),
            _ => self.total.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchContext {
    #[serde(default)]
    pub match_id: Option<u64>,
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub home_id: Option<u32>,
    #[serde(default)]
    pub away_id: Option<u32>,
    #[serde(default)]
    pub league_name: String,
    /// RFC 3339 kickoff time.
    #[serde(default)]
    pub kickoff: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct H2hMeeting {
    pub home_score: u32,
    pub away_score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopScorer {
    pub name: String,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub goals: u32,
    #[serde(default)]
    pub assists: u32,
}

/// Recent-match digest from a secondary stats provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SportPerformance {
    #[serde(default)]
    pub clean_sheets: u32,
    #[serde(default)]
    pub avg_goals_scored: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichedData {
    #[serde(default)]
    pub home_stats: Option<TeamSeasonStats>,
    #[serde(default)]
    pub away_stats: Option<TeamSeasonStats>,
    #[serde(default)]
    pub h2h: Vec<H2hMeeting>,
    #[serde(default)]
    pub top_scorers: Vec<TopScorer>,
    /// Only the row count is used, as the league size.
    #[serde(default)]
    pub standings: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SidePair<T> {
    pub home: T,
    pub away: T,
}

impl<T> SidePair<T> {
    pub fn new(home: T, away: T) -> Self {
        Self { home, away }
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> SidePair<U> {
        SidePair {
            home: f(self.home),
            away: f(self.away),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Home,
    Away,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BookmakerOdds {
    #[serde(default, rename = "1")]
    pub home: Option<f64>,
    #[serde(default, rename = "X")]
    pub draw: Option<f64>,
    #[serde(default, rename = "2")]
    pub away: Option<f64>,
}

/// Decimal 1X2 odds keyed by bookmaker name.
pub type OddsTable = BTreeMap<String, BookmakerOdds>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InjuredPlayer {
    pub name: String,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Multipliers learned offline for the h2h, motivation and streak factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MlWeights {
    #[serde(default = "one", rename = "h2h_weight")]
    pub h2h: f64,
    #[serde(default = "one", rename = "motivation_weight")]
    pub motivation: f64,
    #[serde(default = "one", rename = "streak_weight")]
    pub streak: f64,
}

fn one() -> f64 {
    1.0
}

impl Default for MlWeights {
    fn default() -> Self {
        Self {
            h2h: 1.0,
            motivation: 1.0,
            streak: 1.0,
        }
    }
}

/// Everything the engine needs for one fixture.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionInput {
    #[serde(rename = "match")]
    pub context: MatchContext,
    #[serde(default)]
    pub enriched: EnrichedData,
    /// Either side may be missing; only the present side is used.
    #[serde(default)]
    pub performance: SidePair<Option<SportPerformance>>,
    #[serde(default)]
    pub weather: Option<WeatherReport>,
    /// Injured players keyed by team id.
    #[serde(default)]
    pub injuries: HashMap<u32, Vec<InjuredPlayer>>,
    #[serde(default)]
    pub halftime: Option<SidePair<HalftimeProfile>>,
    #[serde(default)]
    pub playstyle: Option<SidePair<Playstyle>>,
    #[serde(default)]
    pub odds: OddsTable,
    #[serde(default)]
    pub ml_weights: Option<MlWeights>,
}

impl PredictionInput {
    pub fn new(home_team: &str, away_team: &str, league_name: &str) -> Self {
        Self {
            context: MatchContext {
                home_team: home_team.to_string(),
                away_team: away_team.to_string(),
                league_name: league_name.to_string(),
                ..MatchContext::default()
            },
            ..Self::default()
        }
    }

    pub fn injury_count(&self, team_id: Option<u32>) -> usize {
        team_id
            .and_then(|id| self.injuries.get(&id))
            .map_or(0, Vec::len)
    }
}
