mod common;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use zedc::{checker, lexer, parser};

fn bench_frontend(c: &mut Criterion) {
    for (label, source) in common::workloads() {
        let tokens = lexer::tokenize(&source);
        let program = common::load_program(&label, &source);

        c.bench_function(&format!("frontend_tokenize_{label}"), |b| {
            b.iter(|| {
                let out = lexer::tokenize(black_box(&source));
                black_box(out);
            })
        });

        c.bench_function(&format!("frontend_parse_only_{label}"), |b| {
            b.iter(|| {
                let out = parser::parse(black_box(&tokens));
                black_box(out);
            })
        });

        c.bench_function(&format!("frontend_check_only_{label}"), |b| {
            b.iter(|| {
                let out = checker::check(black_box(&program));
                black_box(out);
            })
        });

        c.bench_function(&format!("frontend_tokenize_parse_{label}"), |b| {
            b.iter(|| {
                let tokens = lexer::tokenize(black_box(&source));
                let out = parser::parse(&tokens);
                black_box(out);
            })
        });
    }
}

criterion_group!(benches, bench_frontend);
criterion_main!(benches);
