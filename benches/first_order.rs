//! Fan-out benchmarks after https://github.com/tsurucapital/frp-benchmarks

use cpsfn::{args, slots, Callback, Func, Sink, Value};
use criterion::{criterion_group, criterion_main, Bencher, Criterion};
use rand::{rngs::StdRng, seq::IteratorRandom, SeedableRng};

/// First-order benchmark.
///
/// Generate `n_sinks` sinks. Map each one to its formatted argument and print
/// nothing. At each step send the step number, as a string, into 10 randomly
/// selected sinks.
///
/// Benchmark the time required for `n_steps` steps.
fn first_order(n_sinks: usize, n_steps: usize, b: &mut Bencher<'_>) {
    // Setup network
    let sinks: Vec<Sink> = (0..n_sinks).map(|_| Sink::new(1)).collect();
    for sink in &sinks {
        sink.cps()
            .map(slots![Func::new(|args| Ok(Value::from(format!("{:?}", args.arg(0)?))))])
            .call(Callback::new(|_| Ok(())))
            .unwrap();
    }

    // Feed events
    let mut rng = StdRng::from_entropy();
    b.iter(|| {
        for k in 0..n_steps {
            let s = format!("{}", k);
            for sink in sinks.iter().choose_multiple(&mut rng, 10) {
                sink.send(0, args![s.clone()]).unwrap();
            }
        }
    });
}

/// A small reference benchmark to do the same amount of actual work without callbacks
fn first_order_1k_ref(b: &mut Bencher<'_>) {
    let mut rng = StdRng::from_entropy();
    b.iter(|| {
        for i in 0..1_000 {
            for _k in (0..1_000).choose_multiple(&mut rng, 10) {
                format!("{:?}", Value::from(format!("{}", i)));
            }
        }
    });
}

fn bench_fn(c: &mut Criterion) {
    c.bench_function("first order 1k reference", |b| first_order_1k_ref(b));
    c.bench_function("first order 100", |b| first_order(1_000, 100, b));
    c.bench_function("first order 1k", |b| first_order(1_000, 1_000, b));
}

criterion_group!(benches, bench_fn);
criterion_main!(benches);
