use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use sweeper_core::*;

/// Plays certain moves until the solver runs dry, leaving a board with plenty of numbers.
fn opened_engine(seed: u64) -> PlayEngine {
    let config = Difficulty::Expert.config();
    let mut engine = match PlayEngine::new(config, seed) {
        Ok(engine) => engine,
        Err(err) => panic!("expert preset rejected: {err}"),
    };
    let _ = engine.reveal((8, 15));
    for _ in 0..64 {
        let Some(hint) = find_certain_move(&engine.observe()) else {
            break;
        };
        let _ = match hint.kind {
            HintKind::Safe => engine.reveal(hint.target).map(|_| ()),
            HintKind::Mine => engine.toggle_flag(hint.target).map(|_| ()),
        };
    }
    engine
}

fn bench_find_certain_move(c: &mut Criterion) {
    let engine = opened_engine(7);
    let obs = engine.observe();
    c.bench_function("solver.find_certain_move.expert", |b| {
        b.iter(|| black_box(find_certain_move(black_box(&obs))))
    });
}

fn bench_encode(c: &mut Criterion) {
    let engine = opened_engine(7);
    c.bench_function("encoding.encode.expert", |b| {
        b.iter(|| black_box(encode(black_box(engine.board()))))
    });
}

fn bench_agent_choose(c: &mut Criterion) {
    let engine = opened_engine(11);
    let tensor = encode(engine.board());
    let obs = engine.observe();
    let mut agent = Agent::new(RandomPolicy::new(3), 3);
    c.bench_function("agent.choose.expert", |b| {
        b.iter(|| {
            agent.reset();
            black_box(agent.choose(&tensor, &obs).ok())
        })
    });
}

criterion_group!(benches, bench_find_certain_move, bench_encode, bench_agent_choose);
criterion_main!(benches);
