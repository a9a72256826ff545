//! Ordered attack/defense adjustment stages.
//!
//! A prediction is a left fold of [`Stage`]s over the base strengths. Stage
//! order is significant: every op works on the running value.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::model::SidePair;
use crate::strength::{TeamState, clamp};

pub const REALISTIC_ATTACK: (f64, f64) = (0.2, 5.0);

pub type Matchup = SidePair<TeamState>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageName {
    CrossLeague,
    HeadToHead,
    Motivation,
    Streak,
    SportForm,
    RealisticClamp,
    Weather,
    Injuries,
    Halftime,
    Playstyle,
    CounterAttack,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StageOp {
    Identity,
    /// attack × factor
    Scale { factor: f64 },
    /// attack × ratio, defense ÷ ratio, then both back into strength range.
    LeagueRatio { ratio: f64 },
    /// attack × own_weight + observed × observed_weight
    Blend {
        observed: f64,
        own_weight: f64,
        observed_weight: f64,
    },
    /// max(floor, attack + delta)
    Shift { delta: f64, floor: f64 },
    ClampAttack { lo: f64, hi: f64 },
}

impl StageOp {
    pub fn apply(self, team: TeamState) -> TeamState {
        match self {
            StageOp::Identity => team,
            StageOp::Scale { factor } => TeamState {
                attack: team.attack * factor,
                ..team
            },
            StageOp::LeagueRatio { ratio } => TeamState {
                attack: team.attack * ratio,
                defense: team.defense / ratio,
            }
            .clamped(),
            StageOp::Blend {
                observed,
                own_weight,
                observed_weight,
            } => TeamState {
                attack: team.attack * own_weight + observed * observed_weight,
                ..team
            },
            StageOp::Shift { delta, floor } => TeamState {
                attack: (team.attack + delta).max(floor),
                ..team
            },
            StageOp::ClampAttack { lo, hi } => TeamState {
                attack: clamp(team.attack, lo, hi),
                ..team
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub name: StageName,
    pub home: StageOp,
    pub away: StageOp,
}

impl Stage {
    pub fn both(name: StageName, op: StageOp) -> Self {
        Self {
            name,
            home: op,
            away: op,
        }
    }

    pub fn scale(name: StageName, factors: SidePair<f64>) -> Self {
        Self {
            name,
            home: StageOp::Scale {
                factor: factors.home,
            },
            away: StageOp::Scale {
                factor: factors.away,
            },
        }
    }

    pub fn realistic_clamp() -> Self {
        Self::both(
            StageName::RealisticClamp,
            StageOp::ClampAttack {
                lo: REALISTIC_ATTACK.0,
                hi: REALISTIC_ATTACK.1,
            },
        )
    }

    pub fn apply(&self, m: Matchup) -> Matchup {
        let next = Matchup {
            home: self.home.apply(m.home),
            away: self.away.apply(m.away),
        };
        trace!(
            stage = ?self.name,
            home_attack = next.home.attack,
            away_attack = next.away.attack,
            "stage applied"
        );
        next
    }
}

pub fn run(base: Matchup, stages: &[Stage]) -> Matchup {
    stages.iter().fold(base, |m, stage| stage.apply(m))
}
