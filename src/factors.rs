//! Contextual factor calculators and the per-prediction factor record.
//!
//! Every calculator is independent of the others. The record keeps each
//! factor's raw value next to its ML-weighted value because the weight
//! trainer learns from the raw ones.

use serde::{Deserialize, Serialize};

use crate::model::{H2hMeeting, MlWeights, Side, SidePair};
use crate::overlays::{AttackingStyle, HalfTendency, Playstyle, PossessionStyle};
use crate::pipeline::{self, Matchup, Stage, StageName, StageOp};
use crate::tables::LookupTables;

const H2H_DOMINANT: f64 = 1.15;
const H2H_DOMINATED: f64 = 0.90;
const MOTIVATION_CAP: f64 = 1.5;
const LEAGUE_RATIO_EXPONENT: f64 = 0.6;
const INJURY_PENALTY_PER_PLAYER: f64 = 0.10;
const INJURY_PENALTY_CAP: f64 = 0.3;
const AGGRESSIVE_BONUS: f64 = 0.05;
const COUNTER_BONUS: f64 = 1.03;
const SPORT_FORM_SHARE: f64 = 0.3;

/// A factor before and after ML reweighting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    pub original: f64,
    pub weighted: f64,
}

impl Adjustment {
    /// Weight 1.0 keeps the factor, 0.0 neutralises it.
    pub fn with_weight(original: f64, weight: f64) -> Self {
        Self {
            original,
            weighted: 1.0 + (original - 1.0) * weight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct H2hAnalysis {
    pub matches: usize,
    pub home_wins: usize,
    pub away_wins: usize,
    pub draws: usize,
    pub avg_total_goals: f64,
    pub factor: SidePair<f64>,
}

pub fn analyze_h2h(meetings: &[H2hMeeting]) -> H2hAnalysis {
    let mut home_wins = 0;
    let mut away_wins = 0;
    let mut draws = 0;
    let mut goals = 0u32;
    for m in meetings {
        goals += m.home_score + m.away_score;
        if m.home_score > m.away_score {
            home_wins += 1;
        } else if m.away_score > m.home_score {
            away_wins += 1;
        } else {
            draws += 1;
        }
    }

    let avg_total_goals = if meetings.is_empty() {
        2.5
    } else {
        round_to(goals as f64 / meetings.len() as f64, 1)
    };

    let factor = if meetings.is_empty() {
        SidePair::new(1.0, 1.0)
    } else if home_wins > away_wins * 2 {
        SidePair::new(H2H_DOMINANT, H2H_DOMINATED)
    } else if away_wins > home_wins * 2 {
        SidePair::new(H2H_DOMINATED, H2H_DOMINANT)
    } else {
        SidePair::new(1.0, 1.0)
    };

    H2hAnalysis {
        matches: meetings.len(),
        home_wins,
        away_wins,
        draws,
        avg_total_goals,
        factor,
    }
}

impl H2hAnalysis {
    pub fn summary(&self, home_team: &str) -> Option<String> {
        if self.matches == 0 {
            return None;
        }
        Some(format!(
            "Последние {} встреч: {} {}П-{}Н-{}П. Средний тотал: {}",
            self.matches, home_team, self.home_wins, self.draws, self.away_wins, self.avg_total_goals
        ))
    }
}

/// Table-position incentive times competition importance, capped at 1.5.
pub fn motivation_factor(position: Option<u32>, total_teams: u32, importance: f64) -> f64 {
    let base = match position.filter(|p| *p > 0) {
        Some(p) => {
            let p = i64::from(p);
            let n = i64::from(total_teams);
            if p <= 3 {
                1.15
            } else if p <= 6 || p >= n - 2 {
                1.10
            } else if p >= n - 5 {
                1.05
            } else {
                1.0
            }
        }
        None => 1.0,
    };
    (base * importance).min(MOTIVATION_CAP)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Streak {
    pub factor: f64,
    pub description: Option<&'static str>,
}

/// Momentum from the last three results.
pub fn analyze_streak(form: &str) -> Streak {
    let chars: Vec<char> = form.chars().collect();
    if chars.len() < 3 {
        return Streak {
            factor: 1.0,
            description: None,
        };
    }
    let recent = &chars[chars.len() - 3..];
    let wins = recent.iter().filter(|c| **c == 'W').count();
    let losses = recent.iter().filter(|c| **c == 'L').count();

    let (factor, description) = if wins == 3 {
        (1.20, Some("3 победы подряд! 🔥"))
    } else if wins >= 2 && losses == 0 {
        (1.10, Some("Отличная форма"))
    } else if losses == 3 {
        (0.85, Some("3 поражения подряд 📉"))
    } else if losses >= 2 {
        (0.90, Some("Плохая форма"))
    } else if losses == 0 {
        (1.05, Some("Стабильная форма"))
    } else {
        (1.0, None)
    };
    Streak {
        factor,
        description,
    }
}

/// Attack ratios for a tie between two different known leagues.
///
/// `None` when either league is unknown or both teams play in the same one.
pub fn league_ratios(home_team: &str, away_team: &str, tables: &LookupTables) -> Option<SidePair<f64>> {
    let home_league = tables.team_league(home_team)?;
    let away_league = tables.team_league(away_team)?;
    if home_league == away_league {
        return None;
    }
    let home_mult = tables.league_multiplier(home_league);
    let away_mult = tables.league_multiplier(away_league);
    Some(SidePair::new(
        (home_mult / away_mult).powf(LEAGUE_RATIO_EXPONENT),
        (away_mult / home_mult).powf(LEAGUE_RATIO_EXPONENT),
    ))
}

pub fn injury_multiplier(injured: usize) -> f64 {
    let penalty = (injured as f64 * INJURY_PENALTY_PER_PLAYER).min(INJURY_PENALTY_CAP);
    1.0 - penalty
}

/// Extra scoring share when both sides peak in the same half.
pub fn halftime_adjustment(home: HalfTendency, away: HalfTendency) -> f64 {
    match (home, away) {
        (HalfTendency::FirstHalf, HalfTendency::FirstHalf) => 0.05,
        (HalfTendency::SecondHalf, HalfTendency::SecondHalf) => 0.03,
        _ => 0.0,
    }
}

pub fn playstyle_adjustment(style: &Playstyle) -> f64 {
    if style.attacking == AttackingStyle::Aggressive {
        AGGRESSIVE_BONUS
    } else {
        0.0
    }
}

/// The counter-attacking side when it meets a possession side.
pub fn counter_attack_side(home: &Playstyle, away: &Playstyle) -> Option<Side> {
    match (home.possession, away.possession) {
        (PossessionStyle::Possession, PossessionStyle::Counter) => Some(Side::Away),
        (PossessionStyle::Counter, PossessionStyle::Possession) => Some(Side::Home),
        _ => None,
    }
}

/// Every factor that shaped one prediction, enough to replay it exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorRecord {
    pub weights: MlWeights,
    pub base: Matchup,
    pub league_ratio: Option<SidePair<f64>>,
    pub h2h: SidePair<Adjustment>,
    pub motivation: SidePair<Adjustment>,
    pub streak: SidePair<Adjustment>,
    pub sport_avg_goals: SidePair<Option<f64>>,
    pub weather_adjustment: Option<f64>,
    pub injuries: SidePair<usize>,
    pub halftime_adjustment: Option<f64>,
    pub playstyle: Option<SidePair<f64>>,
    pub counter_attack: Option<Side>,
}

impl FactorRecord {
    /// Same raw factors with the weighted values recomputed for `weights`.
    pub fn reweighted(&self, weights: MlWeights) -> Self {
        let rew = |pair: SidePair<Adjustment>, w: f64| {
            pair.map(|a| Adjustment::with_weight(a.original, w))
        };
        Self {
            weights,
            h2h: rew(self.h2h, weights.h2h),
            motivation: rew(self.motivation, weights.motivation),
            streak: rew(self.streak, weights.streak),
            ..self.clone()
        }
    }

    /// Cross-league, weighted factors and recent-form blend, then the first clamp.
    pub fn core_stages(&self) -> Vec<Stage> {
        let mut stages = Vec::new();
        if let Some(ratio) = self.league_ratio {
            stages.push(Stage {
                name: StageName::CrossLeague,
                home: StageOp::LeagueRatio { ratio: ratio.home },
                away: StageOp::LeagueRatio { ratio: ratio.away },
            });
        }
        stages.push(Stage::scale(StageName::HeadToHead, self.h2h.map(|a| a.weighted)));
        stages.push(Stage::scale(StageName::Motivation, self.motivation.map(|a| a.weighted)));
        stages.push(Stage::scale(StageName::Streak, self.streak.map(|a| a.weighted)));

        if self.sport_avg_goals.home.is_some() || self.sport_avg_goals.away.is_some() {
            let blend = |avg: Option<f64>| match avg {
                Some(observed) if observed > 0.0 => StageOp::Blend {
                    observed,
                    own_weight: 1.0 - SPORT_FORM_SHARE,
                    observed_weight: SPORT_FORM_SHARE,
                },
                _ => StageOp::Identity,
            };
            stages.push(Stage {
                name: StageName::SportForm,
                home: blend(self.sport_avg_goals.home),
                away: blend(self.sport_avg_goals.away),
            });
        }
        stages.push(Stage::realistic_clamp());
        stages
    }

    /// Weather, injuries, half-time and playstyle, then the final clamp.
    pub fn overlay_stages(&self) -> Vec<Stage> {
        let mut stages = Vec::new();
        if let Some(adj) = self.weather_adjustment {
            stages.push(Stage::both(
                StageName::Weather,
                StageOp::Shift {
                    delta: adj / 2.0,
                    floor: pipeline::REALISTIC_ATTACK.0,
                },
            ));
        }
        if self.injuries.home > 0 || self.injuries.away > 0 {
            stages.push(Stage::scale(StageName::Injuries, self.injuries.map(injury_multiplier)));
        }
        if let Some(adj) = self.halftime_adjustment {
            stages.push(Stage::scale(StageName::Halftime, SidePair::new(1.0 + adj, 1.0 + adj)));
        }
        if let Some(style) = self.playstyle {
            stages.push(Stage::scale(StageName::Playstyle, style.map(|adj| 1.0 + adj)));
        }
        if let Some(side) = self.counter_attack {
            let bonus = match side {
                Side::Home => SidePair::new(COUNTER_BONUS, 1.0),
                Side::Away => SidePair::new(1.0, COUNTER_BONUS),
            };
            stages.push(Stage::scale(StageName::CounterAttack, bonus));
        }
        stages.push(Stage::realistic_clamp());
        stages
    }

    pub fn stages(&self) -> Vec<Stage> {
        let mut stages = self.core_stages();
        stages.extend(self.overlay_stages());
        stages
    }

    /// Final strengths implied by this record.
    pub fn replay(&self) -> Matchup {
        pipeline::run(self.base, &self.stages())
    }
}

pub(crate) fn round_to(v: f64, decimals: i32) -> f64 {
    let p = 10f64.powi(decimals);
    (v * p).round() / p
}
