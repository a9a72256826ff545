use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

static BUILTIN: Lazy<LookupTables> = Lazy::new(LookupTables::defaults);

/// Curated reference data the factor calculators look names up in.
///
/// Lists keep their order: lookups return the first matching entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupTables {
    pub league_multipliers: Vec<(String, f64)>,
    pub team_leagues: Vec<(String, String)>,
    pub elite_clubs: Vec<String>,
    pub tournament_importance: Vec<TournamentRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentRule {
    pub keywords: Vec<String>,
    pub importance: f64,
}

impl LookupTables {
    pub fn builtin() -> &'static LookupTables {
        &BUILTIN
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read lookup tables {}", path.display()))?;
        serde_json::from_str(&raw).context("invalid lookup tables json")
    }

    pub fn is_elite(&self, team: &str) -> bool {
        let team = team.trim().to_lowercase();
        if team.is_empty() {
            return false;
        }
        self.elite_clubs.iter().any(|club| names_overlap(club, &team))
    }

    pub fn team_league(&self, team: &str) -> Option<&str> {
        let team = team.trim().to_lowercase();
        if team.is_empty() {
            return None;
        }
        self.team_leagues
            .iter()
            .find(|(name, _)| names_overlap(name, &team))
            .map(|(_, league)| league.as_str())
    }

    pub fn league_multiplier(&self, league: &str) -> f64 {
        let league = league.to_lowercase();
        if league.trim().is_empty() {
            return 1.0;
        }
        self.league_multipliers
            .iter()
            .find(|(name, _)| league.contains(&name.to_lowercase()))
            .map_or(1.0, |(_, mult)| *mult)
    }

    pub fn tournament_importance(&self, league: &str) -> f64 {
        let league = league.to_lowercase();
        if league.trim().is_empty() {
            return 1.0;
        }
        self.tournament_importance
            .iter()
            .find(|rule| rule.keywords.iter().any(|k| league.contains(&k.to_lowercase())))
            .map_or(1.0, |rule| rule.importance)
    }

    fn defaults() -> Self {
        let league_multipliers = [
            ("Premier League", 1.30),
            ("La Liga", 1.30),
            ("Serie A", 1.25),
            ("Bundesliga", 1.25),
            ("Ligue 1", 1.20),
            ("Primeira Liga", 0.85),
            ("Eredivisie", 1.05),
            ("Championship", 1.00),
            ("Belgian Pro League", 1.00),
            ("Super Lig", 0.95),
            ("Premiership", 0.90),
            ("Greek Super League", 0.85),
            // Unreachable through substring lookup: "Serie A" matches first.
            ("Brasileiro Serie A", 1.15),
        ];

        let team_leagues = [
            ("Real Madrid", "La Liga"),
            ("Barcelona", "La Liga"),
            ("Atletico Madrid", "La Liga"),
            ("Athletic Club", "La Liga"),
            ("Real Sociedad", "La Liga"),
            ("Villarreal", "La Liga"),
            ("Sevilla", "La Liga"),
            ("Real Betis", "La Liga"),
            ("Manchester City", "Premier League"),
            ("Liverpool", "Premier League"),
            ("Arsenal", "Premier League"),
            ("Manchester United", "Premier League"),
            ("Chelsea", "Premier League"),
            ("Tottenham", "Premier League"),
            ("Newcastle", "Premier League"),
            ("Aston Villa", "Premier League"),
            ("Inter", "Serie A"),
            ("AC Milan", "Serie A"),
            ("Juventus", "Serie A"),
            ("Napoli", "Serie A"),
            ("Roma", "Serie A"),
            ("Lazio", "Serie A"),
            ("Atalanta", "Serie A"),
            ("Bayern Munich", "Bundesliga"),
            ("Borussia Dortmund", "Bundesliga"),
            ("RB Leipzig", "Bundesliga"),
            ("Bayer Leverkusen", "Bundesliga"),
            ("Frankfurt", "Bundesliga"),
            ("PSG", "Ligue 1"),
            ("Monaco", "Ligue 1"),
            ("Marseille", "Ligue 1"),
            ("Lyon", "Ligue 1"),
            ("Lille", "Ligue 1"),
            ("Benfica", "Primeira Liga"),
            ("Porto", "Primeira Liga"),
            ("Sporting CP", "Primeira Liga"),
            ("Ajax", "Eredivisie"),
            ("PSV", "Eredivisie"),
            ("Feyenoord", "Eredivisie"),
            ("Olympiakos Piraeus", "Greek Super League"),
            ("Olympiacos", "Greek Super League"),
            ("Panathinaikos", "Greek Super League"),
            ("AEK Athens", "Greek Super League"),
            ("Celtic", "Premiership"),
            ("Rangers", "Premiership"),
            ("Galatasaray", "Super Lig"),
            ("Fenerbahce", "Super Lig"),
        ];

        let elite_clubs = [
            "Real Madrid",
            "Barcelona",
            "Bayern Munich",
            "Manchester City",
            "Liverpool",
            "PSG",
            "Inter",
            "AC Milan",
            "Juventus",
            "Chelsea",
            "Manchester United",
            "Arsenal",
            "Atletico Madrid",
            "Borussia Dortmund",
            "Benfica",
            "Porto",
        ];

        let tournament_importance = [
            (&["champions league", "лига чемпионов"][..], 1.25),
            (&["europa league", "лига европы"][..], 1.20),
            (&["conference league", "конференц лига"][..], 1.15),
            (&["world cup", "чемпионат мира"][..], 1.30),
            (&["european championship", "euro", "евро", "чемпионат европы"][..], 1.25),
            (&["cup", "кубок", "copa"][..], 1.10),
        ];

        Self {
            league_multipliers: league_multipliers
                .iter()
                .map(|(name, mult)| (name.to_string(), *mult))
                .collect(),
            team_leagues: team_leagues
                .iter()
                .map(|(team, league)| (team.to_string(), league.to_string()))
                .collect(),
            elite_clubs: elite_clubs.iter().map(|s| s.to_string()).collect(),
            tournament_importance: tournament_importance
                .iter()
                .map(|(keywords, importance)| TournamentRule {
                    keywords: keywords.iter().map(|k| k.to_string()).collect(),
                    importance: *importance,
                })
                .collect(),
        }
    }
}

impl Default for LookupTables {
    fn default() -> Self {
        BUILTIN.clone()
    }
}

/// Case-insensitive substring match in either direction; `lowered` is already lowercase.
fn names_overlap(entry: &str, lowered: &str) -> bool {
    let entry = entry.to_lowercase();
    entry.contains(lowered) || lowered.contains(&entry)
}
