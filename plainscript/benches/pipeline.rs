use criterion::{black_box, criterion_group, criterion_main, Criterion};

use plainscript::{compile_str, parsing::Prog, CompileOptions};

const FIZZBUZZ: &str = include_str!("../tests/fizzbuzz.ps");
const FOLD: &str = include_str!("../tests/fold.ps");

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("fizzbuzz parse", |b| {
        b.iter(|| black_box(Prog::parse_str(black_box(FIZZBUZZ))))
    });

    {
        let options = CompileOptions::default();

        c.bench_function("fizzbuzz compile", |b| {
            b.iter(|| black_box(compile_str(black_box(FIZZBUZZ), &options)))
        });
    }

    {
        let options = CompileOptions {
            optimize: true,
            ..Default::default()
        };

        c.bench_function("fold compile optimized", |b| {
            b.iter(|| black_box(compile_str(black_box(FOLD), &options)))
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
