use criterion::{Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::hint::black_box;

use matchday_oracle::model::PredictionInput;
use matchday_oracle::standings::parse_standings_json;
use matchday_oracle::synthetic::synthetic_inputs;
use matchday_oracle::{EngineConfig, LookupTables, predict, predict_many};

fn sample_inputs(n: usize) -> Vec<PredictionInput> {
    let mut rng = StdRng::seed_from_u64(2024);
    synthetic_inputs(&mut rng, n)
}

fn bench_predict_single(c: &mut Criterion) {
    let input: PredictionInput = serde_json::from_str(MATCH_INPUT_JSON).expect("valid fixture json");
    let config = EngineConfig::default();
    let tables = LookupTables::builtin();
    c.bench_function("predict_single", |b| {
        b.iter(|| {
            let r = predict(black_box(&input), &config, tables);
            black_box(r.confidence);
        })
    });
}

fn bench_predict_sequential(c: &mut Criterion) {
    let inputs = sample_inputs(500);
    let config = EngineConfig::default();
    let tables = LookupTables::builtin();
    c.bench_function("predict_sequential_500", |b| {
        b.iter(|| {
            let n = inputs
                .iter()
                .map(|i| predict(black_box(i), &config, tables))
                .filter(|r| !r.value_bets.is_empty())
                .count();
            black_box(n);
        })
    });
}

fn bench_predict_many(c: &mut Criterion) {
    let inputs = sample_inputs(500);
    let config = EngineConfig::default();
    let tables = LookupTables::builtin();
    c.bench_function("predict_many_500", |b| {
        b.iter(|| {
            let results = predict_many(black_box(&inputs), &config, tables);
            black_box(results.len());
        })
    });
}

fn bench_standings_parse(c: &mut Criterion) {
    c.bench_function("standings_parse", |b| {
        b.iter(|| {
            let s = parse_standings_json(black_box(STANDINGS_JSON)).unwrap();
            black_box(s.league_size());
        })
    });
}

criterion_group!(
    perf,
    bench_predict_single,
    bench_predict_sequential,
    bench_predict_many,
    bench_standings_parse
);
criterion_main!(perf);

static MATCH_INPUT_JSON: &str = include_str!("../tests/fixtures/match_input.json");
static STANDINGS_JSON: &str = include_str!("../tests/fixtures/standings.json");
