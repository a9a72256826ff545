//! SQLite persistence for predictions and their later verification.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Duration, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use tracing::{info, warn};

use crate::engine::PredictionResult;
use crate::factors::round_to;
use crate::goals::Outcome;
use crate::tips::BettingTip;
use crate::verification::{Verification, verify};

const CACHE_DIR: &str = "matchday_oracle";
const DB_FILE: &str = "predictions.sqlite";

#[derive(Debug, Clone, PartialEq)]
pub struct StoredPrediction {
    pub id: i64,
    pub match_id: Option<u64>,
    pub home_team: String,
    pub away_team: String,
    pub league_name: String,
    pub kickoff: Option<String>,
    pub expected_result: Outcome,
    pub confidence: f64,
    pub total_goals: f64,
    pub expected_home_goals: f64,
    pub expected_away_goals: f64,
    pub tips: Vec<BettingTip>,
    pub created_at: String,
    pub verification: Option<Verification>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AccuracySummary {
    pub verified: usize,
    pub result_hits: usize,
    pub totals_settled: usize,
    pub total_hits: usize,
    /// Mean |predicted total − actual goals|, rounded to 0.01.
    pub avg_total_error: Option<f64>,
    /// Home or away win calls.
    pub win_calls: usize,
    pub win_hits: usize,
    pub draw_calls: usize,
    pub draw_hits: usize,
}

impl AccuracySummary {
    pub fn result_rate(&self) -> Option<f64> {
        rate(self.result_hits, self.verified)
    }

    pub fn total_rate(&self) -> Option<f64> {
        rate(self.total_hits, self.totals_settled)
    }

    pub fn win_rate(&self) -> Option<f64> {
        rate(self.win_hits, self.win_calls)
    }

    pub fn draw_rate(&self) -> Option<f64> {
        rate(self.draw_hits, self.draw_calls)
    }
}

/// Which predictions count towards accuracy, by when they were made.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AccuracyPeriod {
    #[default]
    All,
    LastWeek,
    LastMonth,
}

impl AccuracyPeriod {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "all" => Some(Self::All),
            "week" | "last_week" => Some(Self::LastWeek),
            "month" | "last_month" => Some(Self::LastMonth),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "all time",
            Self::LastWeek => "last 7 days",
            Self::LastMonth => "last 30 days",
        }
    }

    fn since(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let days = match self {
            Self::All => return None,
            Self::LastWeek => 7,
            Self::LastMonth => 30,
        };
        Some(now - Duration::days(days))
    }
}

fn rate(hits: usize, n: usize) -> Option<f64> {
    (n > 0).then(|| hits as f64 / n as f64)
}

pub struct PredictionStore {
    conn: Connection,
}

/// `$XDG_CACHE_HOME/matchday_oracle/predictions.sqlite`, else under `~/.cache`.
pub fn default_db_path() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR).join(DB_FILE));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR).join(DB_FILE))
}

impl PredictionStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create db directory {}", parent.display()))?;
        }
        let conn =
            Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory sqlite db")?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn save(&self, prediction: &PredictionResult) -> Result<i64> {
        let tips_json =
            serde_json::to_string(&prediction.betting_tips).context("serialize betting tips")?;
        let factors_json =
            serde_json::to_string(&prediction.factors).context("serialize factor record")?;
        let match_id = prediction.match_id.and_then(|id| i64::try_from(id).ok());

        self.conn
            .execute(
                r#"
                INSERT INTO predictions (
                    match_id, home_team, away_team, league_name, kickoff,
                    expected_result, result_label, confidence, total_goals,
                    expected_home_goals, expected_away_goals, tips_json, factors_json, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                "#,
                params![
                    match_id,
                    prediction.home_team,
                    prediction.away_team,
                    prediction.league_name,
                    prediction.kickoff,
                    prediction.expected_result.as_str(),
                    prediction.result_label,
                    prediction.confidence,
                    prediction.total_goals,
                    prediction.expected_home_goals,
                    prediction.expected_away_goals,
                    tips_json,
                    factors_json,
                    Utc::now().to_rfc3339(),
                ],
            )
            .context("insert prediction")?;
        let id = self.conn.last_insert_rowid();
        info!(
            id,
            home = %prediction.home_team,
            away = %prediction.away_team,
            "prediction stored"
        );
        Ok(id)
    }

    pub fn get(&self, id: i64) -> Result<Option<StoredPrediction>> {
        let sql = format!("{SELECT_PREDICTION} WHERE id = ?1");
        let row = self
            .conn
            .query_row(&sql, params![id], read_row)
            .optional()
            .context("query prediction")?;
        row.map(decode).transpose()
    }

    pub fn all(&self) -> Result<Vec<StoredPrediction>> {
        let sql = format!("{SELECT_PREDICTION} ORDER BY id ASC");
        self.query(&sql, params![])
    }

    /// Oldest unverified predictions first.
    pub fn unverified(&self, limit: usize) -> Result<Vec<StoredPrediction>> {
        let sql = format!("{SELECT_PREDICTION} WHERE verified_at IS NULL ORDER BY id ASC LIMIT ?1");
        self.query(&sql, params![i64::try_from(limit).unwrap_or(i64::MAX)])
    }

    /// Stores the final score and the verification derived from it.
    pub fn record_result(&self, id: i64, home_goals: u32, away_goals: u32) -> Result<Verification> {
        let stored = self
            .get(id)?
            .ok_or_else(|| anyhow!("prediction {id} not found"))?;
        if stored.verification.is_some() {
            warn!(id, "prediction already verified, overwriting");
        }
        let v = verify(stored.expected_result, &stored.tips, home_goals, away_goals);

        self.conn
            .execute(
                r#"
                UPDATE predictions
                SET actual_home_goals = ?1, actual_away_goals = ?2, actual_result = ?3,
                    result_correct = ?4, total_correct = ?5, verified_at = ?6
                WHERE id = ?7
                "#,
                params![
                    home_goals,
                    away_goals,
                    v.actual_result.as_str(),
                    v.result_correct,
                    v.total_correct,
                    Utc::now().to_rfc3339(),
                    id
                ],
            )
            .context("update prediction result")?;
        Ok(v)
    }

    /// Hit counts over verified predictions made within `period`.
    pub fn accuracy(&self, period: AccuracyPeriod) -> Result<AccuracySummary> {
        self.accuracy_at(period, Utc::now())
    }

    fn accuracy_at(&self, period: AccuracyPeriod, now: DateTime<Utc>) -> Result<AccuracySummary> {
        // created_at is always written by `save` as UTC RFC 3339, so text order is time order.
        let since = period.since(now).map(|t| t.to_rfc3339());
        self.conn
            .query_row(
                r#"
                SELECT
                    COUNT(*),
                    COALESCE(SUM(result_correct), 0),
                    COUNT(total_correct),
                    COALESCE(SUM(total_correct), 0),
                    AVG(ABS(total_goals - (actual_home_goals + actual_away_goals))),
                    COUNT(CASE WHEN expected_result != 'draw' THEN 1 END),
                    COUNT(CASE WHEN expected_result != 'draw' AND result_correct = 1 THEN 1 END),
                    COUNT(CASE WHEN expected_result = 'draw' THEN 1 END),
                    COUNT(CASE WHEN expected_result = 'draw' AND result_correct = 1 THEN 1 END)
                FROM predictions
                WHERE verified_at IS NOT NULL AND (?1 IS NULL OR created_at >= ?1)
                "#,
                params![since],
                |row| {
                    let count = |idx: usize| row.get::<_, i64>(idx).map(|n| n as usize);
                    Ok(AccuracySummary {
                        verified: count(0)?,
                        result_hits: count(1)?,
                        totals_settled: count(2)?,
                        total_hits: count(3)?,
                        avg_total_error: row.get::<_, Option<f64>>(4)?.map(|e| round_to(e, 2)),
                        win_calls: count(5)?,
                        win_hits: count(6)?,
                        draw_calls: count(7)?,
                        draw_hits: count(8)?,
                    })
                },
            )
            .context("query accuracy")
    }

    fn query(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<StoredPrediction>> {
        let mut stmt = self.conn.prepare(sql).context("prepare predictions query")?;
        let rows = stmt
            .query_map(params, read_row)
            .context("query predictions")?;

        let mut out = Vec::new();
        for row in rows {
            out.push(decode(row.context("decode prediction row")?)?);
        }
        Ok(out)
    }
}

const SELECT_PREDICTION: &str = r#"
    SELECT
        id, match_id, home_team, away_team, league_name, kickoff,
        expected_result, confidence, total_goals, expected_home_goals, expected_away_goals,
        tips_json, created_at,
        actual_home_goals, actual_away_goals, actual_result, result_correct, total_correct
    FROM predictions
"#;

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS predictions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            match_id INTEGER NULL,
            home_team TEXT NOT NULL,
            away_team TEXT NOT NULL,
            league_name TEXT NOT NULL,
            kickoff TEXT NULL,
            expected_result TEXT NOT NULL,
            result_label TEXT NOT NULL,
            confidence REAL NOT NULL,
            total_goals REAL NOT NULL,
            expected_home_goals REAL NOT NULL,
            expected_away_goals REAL NOT NULL,
            tips_json TEXT NOT NULL,
            factors_json TEXT NOT NULL,
            created_at TEXT NOT NULL,
            actual_home_goals INTEGER NULL,
            actual_away_goals INTEGER NULL,
            actual_result TEXT NULL,
            result_correct INTEGER NULL,
            total_correct INTEGER NULL,
            verified_at TEXT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_predictions_match ON predictions(match_id);
        CREATE INDEX IF NOT EXISTS idx_predictions_verified ON predictions(verified_at);
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

/// Raw column values; JSON and enum columns are decoded afterwards.
struct PredictionRow {
    id: i64,
    match_id: Option<i64>,
    home_team: String,
    away_team: String,
    league_name: String,
    kickoff: Option<String>,
    expected_result: String,
    confidence: f64,
    total_goals: f64,
    expected_home_goals: f64,
    expected_away_goals: f64,
    tips_json: String,
    created_at: String,
    actual_home_goals: Option<u32>,
    actual_away_goals: Option<u32>,
    actual_result: Option<String>,
    result_correct: Option<bool>,
    total_correct: Option<bool>,
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PredictionRow> {
    Ok(PredictionRow {
        id: row.get(0)?,
        match_id: row.get(1)?,
        home_team: row.get(2)?,
        away_team: row.get(3)?,
        league_name: row.get(4)?,
        kickoff: row.get(5)?,
        expected_result: row.get(6)?,
        confidence: row.get(7)?,
        total_goals: row.get(8)?,
        expected_home_goals: row.get(9)?,
        expected_away_goals: row.get(10)?,
        tips_json: row.get(11)?,
        created_at: row.get(12)?,
        actual_home_goals: row.get(13)?,
        actual_away_goals: row.get(14)?,
        actual_result: row.get(15)?,
        result_correct: row.get(16)?,
        total_correct: row.get(17)?,
    })
}

fn decode(row: PredictionRow) -> Result<StoredPrediction> {
    let expected_result = Outcome::parse(&row.expected_result)
        .ok_or_else(|| anyhow!("prediction {}: bad outcome {:?}", row.id, row.expected_result))?;
    let tips: Vec<BettingTip> = serde_json::from_str(&row.tips_json)
        .with_context(|| format!("prediction {}: invalid tips json", row.id))?;

    let verification = match (
        row.actual_home_goals,
        row.actual_away_goals,
        row.actual_result.as_deref().and_then(Outcome::parse),
        row.result_correct,
    ) {
        (Some(home_goals), Some(away_goals), Some(actual_result), Some(result_correct)) => {
            Some(Verification {
                home_goals,
                away_goals,
                actual_result,
                result_correct,
                total_correct: row.total_correct,
            })
        }
        _ => None,
    };

    Ok(StoredPrediction {
        id: row.id,
        match_id: row.match_id.and_then(|id| u64::try_from(id).ok()),
        home_team: row.home_team,
        away_team: row.away_team,
        league_name: row.league_name,
        kickoff: row.kickoff,
        expected_result,
        confidence: row.confidence,
        total_goals: row.total_goals,
        expected_home_goals: row.expected_home_goals,
        expected_away_goals: row.expected_away_goals,
        tips,
        created_at: row.created_at,
        verification,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::engine::predict;
    use crate::model::PredictionInput;
    use crate::tables::LookupTables;

    fn prediction(home: &str, away: &str) -> PredictionResult {
        let mut input = PredictionInput::new(home, away, "Premier League");
        input.context.match_id = Some(42);
        predict(&input, &EngineConfig::default(), LookupTables::builtin())
    }

    #[test]
    fn save_and_load_round_trip() {
        let store = PredictionStore::open_in_memory().unwrap();
        let p = prediction("Arsenal", "Chelsea");
        let id = store.save(&p).unwrap();

        let stored = store.get(id).unwrap().unwrap();
        assert_eq!(stored.match_id, Some(42));
        assert_eq!(stored.expected_result, p.expected_result);
        assert_eq!(stored.tips, p.betting_tips);
        assert!(stored.verification.is_none());
        assert!(store.get(id + 100).unwrap().is_none());
    }

    #[test]
    fn record_result_moves_out_of_unverified() {
        let store = PredictionStore::open_in_memory().unwrap();
        let a = store.save(&prediction("Arsenal", "Chelsea")).unwrap();
        let b = store.save(&prediction("Liverpool", "Everton")).unwrap();
        assert_eq!(store.unverified(10).unwrap().len(), 2);

        let v = store.record_result(a, 2, 0).unwrap();
        assert_eq!(v.actual_result, Outcome::HomeWin);

        let pending = store.unverified(10).unwrap();
        assert_eq!(pending.iter().map(|p| p.id).collect::<Vec<_>>(), vec![b]);
        assert_eq!(store.get(a).unwrap().unwrap().verification, Some(v));
        assert!(store.record_result(999, 1, 1).is_err());
    }

    #[test]
    fn accuracy_counts_hits() {
        let store = PredictionStore::open_in_memory().unwrap();
        assert_eq!(store.accuracy(AccuracyPeriod::All).unwrap(), AccuracySummary::default());

        let p = prediction("Arsenal", "Chelsea");
        let id = store.save(&p).unwrap();
        let (hg, ag) = match p.expected_result {
            Outcome::HomeWin => (2, 0),
            Outcome::Draw => (1, 1),
            Outcome::AwayWin => (0, 2),
        };
        store.record_result(id, hg, ag).unwrap();

        let summary = store.accuracy(AccuracyPeriod::All).unwrap();
        assert_eq!(summary.verified, 1);
        assert_eq!(summary.result_hits, 1);
        assert_eq!(summary.result_rate(), Some(1.0));
    }

    fn called(outcome: Outcome) -> PredictionResult {
        let mut p = prediction("Arsenal", "Chelsea");
        p.expected_result = outcome;
        p.total_goals = 2.5;
        p
    }

    #[test]
    fn accuracy_splits_calls_and_filters_by_period() {
        let store = PredictionStore::open_in_memory().unwrap();
        let now = Utc::now();
        let rows = [
            (Outcome::HomeWin, 2, Some((2, 0))),
            (Outcome::Draw, 12, Some((1, 1))),
            (Outcome::HomeWin, 45, Some((0, 4))),
            (Outcome::Draw, 1, None),
        ];
        for (outcome, days_ago, score) in rows {
            let id = store.save(&called(outcome)).unwrap();
            let made_at = (now - Duration::days(days_ago)).to_rfc3339();
            store
                .conn
                .execute(
                    "UPDATE predictions SET created_at = ?1 WHERE id = ?2",
                    params![made_at, id],
                )
                .unwrap();
            if let Some((hg, ag)) = score {
                store.record_result(id, hg, ag).unwrap();
            }
        }

        let all = store.accuracy_at(AccuracyPeriod::All, now).unwrap();
        assert_eq!((all.verified, all.result_hits), (3, 2));
        assert_eq!((all.win_calls, all.win_hits), (2, 1));
        assert_eq!((all.draw_calls, all.draw_hits), (1, 1));
        // |2.5 - 2|, |2.5 - 2|, |2.5 - 4|
        assert_eq!(all.avg_total_error, Some(0.83));
        assert_eq!(all.win_rate(), Some(0.5));

        let month = store.accuracy_at(AccuracyPeriod::LastMonth, now).unwrap();
        assert_eq!((month.verified, month.result_hits), (2, 2));
        assert_eq!(month.avg_total_error, Some(0.5));

        let week = store.accuracy_at(AccuracyPeriod::LastWeek, now).unwrap();
        assert_eq!((week.win_calls, week.draw_calls), (1, 0));
        assert_eq!(week.draw_rate(), None);
    }

    #[test]
    fn period_names() {
        assert_eq!(AccuracyPeriod::parse("Last_Week"), Some(AccuracyPeriod::LastWeek));
        assert_eq!(AccuracyPeriod::parse("month"), Some(AccuracyPeriod::LastMonth));
        assert_eq!(AccuracyPeriod::parse("all"), Some(AccuracyPeriod::All));
        assert_eq!(AccuracyPeriod::parse("fortnight"), None);
    }

    #[test]
    fn open_creates_missing_directories() {
        let dir = std::env::temp_dir().join(format!("matchday_oracle_store_{}", std::process::id()));
        let path = dir.join("nested").join(DB_FILE);
        let store = PredictionStore::open(&path).unwrap();
        store.save(&prediction("Arsenal", "Chelsea")).unwrap();
        assert!(path.exists());
        drop(store);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn open_reports_an_unusable_directory() {
        let blocker = std::env::temp_dir().join(format!("matchday_oracle_blocker_{}", std::process::id()));
        std::fs::write(&blocker, b"not a directory").unwrap();

        let err = PredictionStore::open(&blocker.join(DB_FILE)).err().unwrap();
        assert!(format!("{err:#}").contains("create db directory"), "{err:#}");
        std::fs::remove_file(&blocker).ok();
    }
}
