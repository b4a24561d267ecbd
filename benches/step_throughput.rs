//! Evaluator throughput benchmarks, in the spirit of `neo-vm`'s
//! `memory_optimization_bench.rs`: a handful of `Criterion::bench_function`
//! calls over representative script shapes rather than a single
//! do-everything loop, so a regression in one construct doesn't hide
//! behind the average of the others.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use uo_steam::ast::{AstBuilder, NodeKind};
use uo_steam::commands;
use uo_steam::evaluator;
use uo_steam::host::mock::MockHost;
use uo_steam::runtime::Runtime;

fn fresh_runtime() -> Runtime<MockHost> {
    let mut rt = Runtime::new();
    commands::register_all(&mut rt);
    rt
}

fn run_to_completion(rt: &mut Runtime<MockHost>, host: &mut MockHost) {
    while rt.is_running() {
        evaluator::step(rt, host).expect("benchmark script should not error");
    }
}

fn msg_chain_script(count: u32) -> uo_steam::ast::Ast {
    let mut b = AstBuilder::new();
    let root = b.root();
    for _ in 0..count {
        b.command(root, "msg", &["x"]);
    }
    b.node(root, NodeKind::Stop);
    b.build()
}

fn for_loop_script(count: &str) -> uo_steam::ast::Ast {
    let mut b = AstBuilder::new();
    let root = b.root();
    b.leaf(root, NodeKind::For, count);
    b.command(root, "msg", &["x"]);
    b.node(root, NodeKind::EndFor);
    b.build()
}

fn if_chain_script() -> uo_steam::ast::Ast {
    let mut b = AstBuilder::new();
    let root = b.root();
    let if_node = b.node(root, NodeKind::If);
    let cmp = b.node(if_node, NodeKind::BinaryExpression);
    b.leaf(cmp, NodeKind::UnaryExpression, "hits");
    b.node(cmp, NodeKind::LessThan);
    b.leaf(cmp, NodeKind::Integer, "30");
    b.command(root, "bandageself", &[]);
    b.node(root, NodeKind::EndIf);
    b.build()
}

fn bench_statement_dispatch(c: &mut Criterion) {
    c.bench_function("step_through_100_msg_statements", |b| {
        b.iter(|| {
            let mut rt = fresh_runtime();
            let mut host = MockHost::new();
            rt.start_script(msg_chain_script(black_box(100)));
            run_to_completion(&mut rt, &mut host);
            black_box(host.said.len())
        })
    });
}

fn bench_for_loop(c: &mut Criterion) {
    c.bench_function("for_loop_1000_iterations", |b| {
        b.iter(|| {
            let mut rt = fresh_runtime();
            let mut host = MockHost::new();
            rt.start_script(for_loop_script("1000"));
            run_to_completion(&mut rt, &mut host);
            black_box(host.said.len())
        })
    });
}

fn bench_condition_evaluation(c: &mut Criterion) {
    c.bench_function("if_hits_bandageself_low_health", |b| {
        b.iter(|| {
            let mut rt = fresh_runtime();
            let mut host = MockHost::new();
            host.stats.hits = 20;
            rt.start_script(if_chain_script());
            run_to_completion(&mut rt, &mut host);
            black_box(host.double_clicked.len())
        })
    });
}

fn clickobject_script() -> uo_steam::ast::Ast {
    let mut b = AstBuilder::new();
    let root = b.root();
    b.command(root, "clickobject", &["0x1"]);
    b.node(root, NodeKind::Stop);
    b.build()
}

fn bench_cooldown_retry(c: &mut Criterion) {
    c.bench_function("clickobject_cooldown_retry_loop", |b| {
        b.iter(|| {
            let mut rt = fresh_runtime();
            let mut host = MockHost::new();

            // First run consumes and arms the DClick group's 600ms cooldown.
            rt.start_script(clickobject_script());
            run_to_completion(&mut rt, &mut host);

            // Re-issued without advancing the clock: every tick below hits
            // the `Retry` path (cooldown test = Ok(Dispatch::Retry)) until
            // the loop runs out, never `Consumed`.
            rt.start_script(clickobject_script());
            for _ in 0..50 {
                evaluator::step(&mut rt, &mut host).unwrap();
            }
            black_box(host.single_clicked.len())
        })
    });
}

criterion_group!(
    evaluator_benches,
    bench_statement_dispatch,
    bench_for_loop,
    bench_condition_evaluation,
    bench_cooldown_retry,
);
criterion_main!(evaluator_benches);
