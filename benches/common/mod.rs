#![allow(dead_code)]
use std::path::Path;

use zedc::ast::Program;
use zedc::{lexer, parser};

pub fn workloads() -> Vec<(String, String)> {
    test_support::bench_workloads(Path::new("tests/programs"))
        .unwrap_or_else(|err| panic!("load bench workloads: {err:#}"))
}

pub fn load_program(label: &str, source: &str) -> Program {
    let tokens = lexer::tokenize(source);
    let parsed = parser::parse(&tokens);
    assert!(
        parsed.diagnostics.is_empty(),
        "bench workload {label} has diagnostics: {:?}",
        parsed.diagnostics
    );
    parsed
        .program
        .unwrap_or_else(|| panic!("bench workload {label} did not parse"))
}
