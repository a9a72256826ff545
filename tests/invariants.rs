use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use matchday_oracle::goals::{self, DRAW_MARGIN, GoalsForecast, Outcome, WIN_MARGIN};
use matchday_oracle::pipeline::Matchup;
use matchday_oracle::strength::TeamState;
use matchday_oracle::synthetic::synthetic_inputs;
use matchday_oracle::{EngineConfig, LookupTables, ProbabilityModel, predict, predict_many};

const SWEEP: usize = 400;

#[test]
fn clamp_ranges_hold_for_random_fixtures() {
    let mut rng = StdRng::seed_from_u64(0xC0FFEE);
    let config = EngineConfig::default();
    for input in synthetic_inputs(&mut rng, SWEEP) {
        let r = predict(&input, &config, LookupTables::builtin());
        for team in [r.strengths.home, r.strengths.away] {
            assert!((0.2..=5.0).contains(&team.attack), "attack {}", team.attack);
            assert!((0.6..=2.0).contains(&team.defense), "defense {}", team.defense);
        }
        assert!((0.3..=3.0).contains(&r.expected_home_goals));
        assert!((0.3..=3.0).contains(&r.expected_away_goals));
        assert!((6.0..=14.0).contains(&r.corners), "corners {}", r.corners);
        assert!((2.0..=7.0).contains(&r.cards), "cards {}", r.cards);
        assert!((0.0..=100.0).contains(&r.confidence));
        assert_eq!(r.betting_tips.len(), 3);
    }
}

#[test]
fn decision_follows_goal_difference_thresholds() {
    let mut rng = StdRng::seed_from_u64(17);
    let config = EngineConfig::default();
    for input in synthetic_inputs(&mut rng, SWEEP) {
        let r = predict(&input, &config, LookupTables::builtin());
        let forecast = goals::resolve(&r.strengths, ProbabilityModel::Banded);
        let diff = forecast.goals_diff;
        assert_eq!(forecast.outcome, r.expected_result);

        let expected = if diff >= WIN_MARGIN {
            Outcome::HomeWin
        } else if diff <= -WIN_MARGIN {
            Outcome::AwayWin
        } else if diff.abs() <= DRAW_MARGIN {
            Outcome::Draw
        } else if diff > 0.0 {
            Outcome::HomeWin
        } else {
            Outcome::AwayWin
        };
        assert_eq!(r.expected_result, expected, "diff {diff}");

        // A banded probability is non-zero only for the decided outcome.
        for outcome in Outcome::ALL {
            if outcome != r.expected_result {
                assert_eq!(r.probabilities.get(outcome), 0.0);
            }
        }
    }
}

#[test]
fn softmax_is_a_distribution_led_by_the_decision() {
    let mut rng = StdRng::seed_from_u64(99);
    let config = EngineConfig {
        probability_model: ProbabilityModel::Softmax,
        ..EngineConfig::default()
    };
    for input in synthetic_inputs(&mut rng, SWEEP) {
        let r = predict(&input, &config, LookupTables::builtin());
        let p = r.probabilities;
        assert!((p.home_win + p.draw + p.away_win - 1.0).abs() < 0.002);
        let decided = p.get(r.expected_result);
        for outcome in Outcome::ALL {
            assert!(p.get(outcome) <= decided + 0.001);
        }
    }
}

#[test]
fn predictions_are_deterministic() {
    let mut rng = StdRng::seed_from_u64(5);
    let config = EngineConfig::default();
    let inputs = synthetic_inputs(&mut rng, 50);
    for input in &inputs {
        let a = predict(input, &config, LookupTables::builtin());
        let b = predict(input, &config, LookupTables::builtin());
        assert_eq!(a, b);
    }
}

#[test]
fn batch_matches_sequential_in_order() {
    let mut rng = StdRng::seed_from_u64(23);
    let config = EngineConfig::default();
    let tables = LookupTables::builtin();
    let inputs = synthetic_inputs(&mut rng, 64);

    let batch = predict_many(&inputs, &config, tables);
    let sequential: Vec<_> = inputs.iter().map(|i| predict(i, &config, tables)).collect();
    assert_eq!(batch, sequential);
}

#[test]
fn every_record_replays_exactly() {
    let mut rng = StdRng::seed_from_u64(31);
    let config = EngineConfig::default();
    for input in synthetic_inputs(&mut rng, SWEEP) {
        let r = predict(&input, &config, LookupTables::builtin());
        assert_eq!(r.factors.replay(), r.strengths);
    }
}

/// Walks one side's attack upward with everything else held fixed.
fn attack_walk(rng: &mut StdRng, home_moves: bool) -> Vec<GoalsForecast> {
    let home_defense = rng.gen_range(0.6..=2.0);
    let away_defense = rng.gen_range(0.6..=2.0);
    let fixed = rng.gen_range(0.2..=5.0);
    let mut attacks: Vec<f64> = (0..32).map(|_| rng.gen_range(0.2..=5.0)).collect();
    attacks.sort_by(f64::total_cmp);

    attacks
        .into_iter()
        .map(|attack| {
            let (home_attack, away_attack) = if home_moves { (attack, fixed) } else { (fixed, attack) };
            let matchup = Matchup::new(
                TeamState { attack: home_attack, defense: home_defense },
                TeamState { attack: away_attack, defense: away_defense },
            );
            goals::resolve(&matchup, ProbabilityModel::Banded)
        })
        .collect()
}

#[test]
fn confidence_grows_with_the_winning_margin() {
    let mut rng = StdRng::seed_from_u64(0x5EED);
    for _ in 0..SWEEP / 4 {
        for (home_moves, winner) in [(true, Outcome::HomeWin), (false, Outcome::AwayWin)] {
            let walk = attack_walk(&mut rng, home_moves);
            let wins: Vec<&GoalsForecast> = walk.iter().filter(|f| f.outcome == winner).collect();
            for pair in wins.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                assert!(b.goals_diff.abs() >= a.goals_diff.abs() - 1e-12);
                assert!(
                    b.confidence >= a.confidence,
                    "{winner:?}: |diff| {} -> {} but confidence {} -> {}",
                    a.goals_diff.abs(),
                    b.goals_diff.abs(),
                    a.confidence,
                    b.confidence
                );
            }
        }
    }
}
