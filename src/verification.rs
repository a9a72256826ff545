use serde::{Deserialize, Serialize};

use crate::goals::Outcome;
use crate::tips::BettingTip;

/// A stored prediction checked against the final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    pub home_goals: u32,
    pub away_goals: u32,
    pub actual_result: Outcome,
    pub result_correct: bool,
    /// From the over/under tip; `None` on a push or when no total was tipped.
    pub total_correct: Option<bool>,
}

pub fn verify(predicted: Outcome, tips: &[BettingTip], home_goals: u32, away_goals: u32) -> Verification {
    let actual_result = Outcome::from_score(home_goals, away_goals);
    let total_correct = tips
        .iter()
        .find(|tip| matches!(tip, BettingTip::Total { .. }))
        .and_then(|tip| tip.settle_total(home_goals + away_goals));

    Verification {
        home_goals,
        away_goals,
        actual_result,
        result_correct: predicted == actual_result,
        total_correct,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tips(over: bool, line: f64) -> Vec<BettingTip> {
        vec![
            BettingTip::Result {
                label: "Ничья".to_string(),
            },
            BettingTip::Total { over, line },
            BettingTip::BothTeamsScore,
        ]
    }

    #[test]
    fn result_and_total_hits() {
        let v = verify(Outcome::HomeWin, &tips(true, 2.5), 2, 1);
        assert_eq!(v.actual_result, Outcome::HomeWin);
        assert!(v.result_correct);
        assert_eq!(v.total_correct, Some(true));

        let v = verify(Outcome::Draw, &tips(false, 2.5), 3, 0);
        assert!(!v.result_correct);
        assert_eq!(v.total_correct, Some(false));
    }

    #[test]
    fn integer_line_pushes() {
        let v = verify(Outcome::Draw, &tips(true, 2.0), 1, 1);
        assert!(v.result_correct);
        assert_eq!(v.total_correct, None);
    }

    #[test]
    fn no_total_tip() {
        let v = verify(Outcome::AwayWin, &[], 0, 1);
        assert!(v.result_correct);
        assert_eq!(v.total_correct, None);
    }
}
