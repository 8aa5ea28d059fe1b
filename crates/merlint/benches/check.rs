use criterion::{Criterion, criterion_group, criterion_main};
use merlint::{ValidateOptions, check, parse, validate};
use std::hint::black_box;

fn fixtures() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "flowchart",
            include_str!("../../../fixtures/flowchart/release.mmd"),
        ),
        (
            "flowchart_problems",
            include_str!("../../../fixtures/flowchart/problems.mmd"),
        ),
        (
            "sequence",
            include_str!("../../../fixtures/sequence/checkout.mmd"),
        ),
        ("class", include_str!("../../../fixtures/class/zoo.mmd")),
        ("state", include_str!("../../../fixtures/state/traffic.mmd")),
    ]
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    group.sample_size(50);
    for (name, text) in fixtures() {
        group.bench_function(name, |b| {
            b.iter(|| parse(black_box(text)).unwrap());
        });
    }
    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate_strict");
    group.sample_size(50);
    for (name, text) in fixtures() {
        let diagram = parse(text).unwrap();
        group.bench_function(name, |b| {
            b.iter(|| validate(black_box(&diagram), true));
        });
    }
    group.finish();
}

fn bench_check(c: &mut Criterion) {
    let opts = ValidateOptions::strict();
    let mut group = c.benchmark_group("check");
    group.sample_size(50);
    for (name, text) in fixtures() {
        group.bench_function(name, |b| {
            b.iter(|| check(black_box(text), &opts).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_validate, bench_check);
criterion_main!(benches);
