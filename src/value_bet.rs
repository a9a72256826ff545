//! Model probabilities against the best bookmaker prices.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::factors::round_to;
use crate::goals::{Outcome, Probabilities};
use crate::model::{BookmakerOdds, OddsTable};

pub const DEFAULT_MIN_EDGE: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestOdds {
    pub odds: f64,
    pub bookmaker: String,
    /// Percent, rounded to 0.01.
    pub implied_probability: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BestAvailableOdds {
    pub home_win: Option<BestOdds>,
    pub draw: Option<BestOdds>,
    pub away_win: Option<BestOdds>,
}

impl BestAvailableOdds {
    pub fn get(&self, outcome: Outcome) -> Option<&BestOdds> {
        match outcome {
            Outcome::HomeWin => self.home_win.as_ref(),
            Outcome::Draw => self.draw.as_ref(),
            Outcome::AwayWin => self.away_win.as_ref(),
        }
    }

    fn slot(&mut self, outcome: Outcome) -> &mut Option<BestOdds> {
        match outcome {
            Outcome::HomeWin => &mut self.home_win,
            Outcome::Draw => &mut self.draw,
            Outcome::AwayWin => &mut self.away_win,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueBet {
    pub outcome: Outcome,
    pub outcome_name: String,
    pub bot_probability: f64,
    pub bookmaker_probability: f64,
    pub edge: f64,
    pub best_odds: f64,
    pub bookmaker: String,
}

impl ValueBet {
    pub fn recommendation(&self) -> String {
        format!("💎 Value bet на {}", self.outcome_name)
    }

    pub fn explanation(&self) -> String {
        format!(
            "Бот: {:.1}% vs Букмекер: {:.1}% (преимущество +{:.1}%)",
            self.bot_probability, self.bookmaker_probability, self.edge
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueBetReport {
    pub has_value: bool,
    /// Highest edge first.
    pub value_bets: Vec<ValueBet>,
    pub best_odds: BestAvailableOdds,
}

pub fn implied_probability(odds: f64) -> f64 {
    if odds <= 1.0 {
        return 0.0;
    }
    round_to(100.0 / odds, 2)
}

/// Highest price per outcome; the first bookmaker in key order wins ties.
///
/// Prices at or below 1.0 are not real decimal odds and are skipped.
pub fn best_odds(table: &OddsTable) -> BestAvailableOdds {
    let mut best = BestAvailableOdds::default();
    for (bookmaker, prices) in table {
        for outcome in Outcome::ALL {
            let Some(odds) = price(prices, outcome).filter(|o| o.is_finite() && *o > 1.0) else {
                continue;
            };
            let slot = best.slot(outcome);
            if slot.as_ref().is_none_or(|b| odds > b.odds) {
                *slot = Some(BestOdds {
                    odds,
                    bookmaker: bookmaker.clone(),
                    implied_probability: implied_probability(odds),
                });
            }
        }
    }
    best
}

fn price(prices: &BookmakerOdds, outcome: Outcome) -> Option<f64> {
    match outcome {
        Outcome::HomeWin => prices.home,
        Outcome::Draw => prices.draw,
        Outcome::AwayWin => prices.away,
    }
}

fn outcome_name(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::HomeWin => "П1 (Победа хозяев)",
        Outcome::Draw => "Ничья",
        Outcome::AwayWin => "П2 (Победа гостей)",
    }
}

pub fn analyze(probabilities: &Probabilities, odds: &OddsTable, min_edge: f64) -> ValueBetReport {
    let best = best_odds(odds);
    let mut value_bets = Vec::new();

    for outcome in Outcome::ALL {
        let Some(offer) = best.get(outcome) else {
            continue;
        };
        let bot = probabilities.get(outcome) * 100.0;
        let edge = bot - offer.implied_probability;
        if edge >= min_edge {
            value_bets.push(ValueBet {
                outcome,
                outcome_name: outcome_name(outcome).to_string(),
                bot_probability: round_to(bot, 1),
                bookmaker_probability: round_to(offer.implied_probability, 1),
                edge: round_to(edge, 1),
                best_odds: offer.odds,
                bookmaker: offer.bookmaker.clone(),
            });
        }
    }

    value_bets.sort_by(|a, b| b.edge.total_cmp(&a.edge));
    debug!(found = value_bets.len(), min_edge, "value bet scan");

    ValueBetReport {
        has_value: !value_bets.is_empty(),
        value_bets,
        best_odds: best,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn book(home: f64, draw: f64, away: f64) -> BookmakerOdds {
        BookmakerOdds {
            home: Some(home),
            draw: Some(draw),
            away: Some(away),
        }
    }

    fn table() -> OddsTable {
        let mut t = OddsTable::new();
        t.insert("Fonbet".to_string(), book(2.0, 3.4, 4.0));
        t.insert("Winline".to_string(), book(2.1, 3.4, 3.8));
        t
    }

    #[test]
    fn implied_probability_rounds_and_guards() {
        assert_eq!(implied_probability(2.0), 50.0);
        assert_eq!(implied_probability(3.0), 33.33);
        assert_eq!(implied_probability(1.0), 0.0);
    }

    #[test]
    fn best_odds_take_the_max_and_first_on_ties() {
        let best = best_odds(&table());
        let home = best.home_win.unwrap();
        assert_eq!((home.odds, home.bookmaker.as_str()), (2.1, "Winline"));
        assert_eq!(best.draw.unwrap().bookmaker, "Fonbet");
        assert_eq!(best.away_win.unwrap().odds, 4.0);
    }

    #[test]
    fn malformed_prices_are_skipped() {
        let mut t = OddsTable::new();
        t.insert(
            "Broken".to_string(),
            BookmakerOdds {
                home: Some(0.9),
                draw: None,
                away: Some(f64::NAN),
            },
        );
        assert_eq!(best_odds(&t), BestAvailableOdds::default());
    }

    #[test]
    fn flags_edges_sorted_descending() {
        let probs = Probabilities {
            home_win: 0.60,
            draw: 0.0,
            away_win: 0.35,
        };
        let report = analyze(&probs, &table(), DEFAULT_MIN_EDGE);
        assert!(report.has_value);
        let outcomes: Vec<Outcome> = report.value_bets.iter().map(|v| v.outcome).collect();
        // home: 60 - 47.62 = 12.38, away: 35 - 25 = 10
        assert_eq!(outcomes, vec![Outcome::HomeWin, Outcome::AwayWin]);
        assert_eq!(report.value_bets[0].edge, 12.4);
        assert_eq!(report.value_bets[0].bookmaker, "Winline");
        assert_eq!(
            report.value_bets[0].recommendation(),
            "💎 Value bet на П1 (Победа хозяев)"
        );
        assert_eq!(
            report.value_bets[1].explanation(),
            "Бот: 35.0% vs Букмекер: 25.0% (преимущество +10.0%)"
        );
        assert_eq!(
            report.value_bets[0].explanation(),
            "Бот: 60.0% vs Букмекер: 47.6% (преимущество +12.4%)"
        );
    }

    #[test]
    fn no_odds_means_no_value() {
        let probs = Probabilities {
            home_win: 0.9,
            draw: 0.0,
            away_win: 0.0,
        };
        let report = analyze(&probs, &OddsTable::new(), 5.0);
        assert!(!report.has_value);
        assert!(report.value_bets.is_empty());
    }
}
