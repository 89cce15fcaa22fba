mod common;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use zedc::compile_source;
use zedc::transpiler::Transpiler;

fn bench_transpiler(c: &mut Criterion) {
    for (label, source) in common::workloads() {
        let program = common::load_program(&label, &source);

        c.bench_function(&format!("transpiler_codegen_only_{label}"), |b| {
            let transpiler = Transpiler;
            b.iter(|| {
                let out = transpiler.transpile(black_box(&program));
                black_box(out);
            })
        });

        c.bench_function(&format!("transpiler_total_{label}"), |b| {
            b.iter(|| {
                let result = compile_source(black_box(&source));
                assert!(result.success, "{label} failed to compile");
                black_box(result);
            })
        });
    }
}

criterion_group!(benches, bench_transpiler);
criterion_main!(benches);
