use std::fmt;
use std::time::{Duration, Instant};

use serde::{Serialize, Serializer};
use sha1::{Digest, Sha1};
use thiserror::Error;

use crate::checker;
use crate::diagnostic::Diagnostic;
use crate::lexer;
use crate::parser;
use crate::transpiler::Transpiler;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Trace each pipeline stage to stderr.
    pub verbose: bool,
}

impl CompileOptions {
    /// Reads `ZED_VERBOSE`; `1` turns tracing on.
    pub fn from_env() -> Self {
        Self::from_verbose_var(std::env::var("ZED_VERBOSE").ok().as_deref())
    }

    fn from_verbose_var(value: Option<&str>) -> Self {
        Self {
            verbose: value == Some("1"),
        }
    }

    fn trace(&self, stage: &str, detail: impl fmt::Display) {
        if self.verbose {
            eprintln!("zedc: {stage} {detail}");
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilationResult {
    /// Lowercase hex SHA-1 of `source`.
    pub hash: String,
    pub success: bool,
    #[serde(serialize_with = "as_millis")]
    pub elapsed: Duration,
    pub source: String,
    /// Generated Python, empty unless `success`.
    pub output: String,
    pub diagnostics: Vec<Diagnostic>,
    pub program_name: String,
}

impl CompilationResult {
    pub fn into_result(self) -> Result<String, CompileError> {
        if self.success {
            Ok(self.output)
        } else {
            Err(CompileError {
                program_name: self.program_name,
                diagnostics: self.diagnostics,
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("failed to compile '{program_name}': {} diagnostic(s), first: {}", .diagnostics.len(), first_message(.diagnostics))]
pub struct CompileError {
    pub program_name: String,
    pub diagnostics: Vec<Diagnostic>,
}

fn first_message(diagnostics: &[Diagnostic]) -> &str {
    diagnostics
        .first()
        .map(|diagnostic| diagnostic.message.as_str())
        .unwrap_or("none")
}

fn as_millis<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_secs_f64() * 1000.0)
}

pub fn compile_source(source: &str) -> CompilationResult {
    compile_source_with(source, &CompileOptions::default())
}

/// Lexes, parses, checks and, when no diagnostics were raised, generates
/// Python for `source`.
pub fn compile_source_with(source: &str, options: &CompileOptions) -> CompilationResult {
    let hash = format!("{:x}", Sha1::digest(source.as_bytes()));
    let start = Instant::now();

    let tokens = lexer::tokenize(source);
    options.trace("lex", format_args!("{} tokens", tokens.len()));

    let parsed = parser::parse(&tokens);
    options.trace(
        "parse",
        format_args!(
            "'{}' with {} diagnostics{}",
            parsed.program_name,
            parsed.diagnostics.len(),
            if parsed.incomplete { ", incomplete" } else { "" }
        ),
    );

    let mut diagnostics = parsed.diagnostics;
    if parsed.incomplete {
        diagnostics.push(Diagnostic::end_of_input());
    }

    let mut output = String::new();
    if let Some(program) = &parsed.program {
        let undefined = checker::check(program);
        options.trace("check", format_args!("{} undefined variables", undefined.len()));
        diagnostics.extend(undefined);

        if diagnostics.is_empty() {
            output = Transpiler.transpile(program);
            options.trace("generate", format_args!("{} bytes", output.len()));
        }
    }

    let elapsed = start.elapsed();
    let success = diagnostics.is_empty();
    options.trace(
        "done",
        format_args!("success={success} in {:.3}ms", elapsed.as_secs_f64() * 1000.0),
    );

    CompilationResult {
        hash,
        success,
        elapsed,
        source: source.to_string(),
        output,
        diagnostics,
        program_name: parsed.program_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::DiagnosticKind;
    use indoc::indoc;

    const COUNTER: &str = indoc! {"
        PROG counter
            FOR I FROM 1 TO 10 BY 1 DO
                OUT[I]:
            ENDDO ENDFOR
        ENDPROG
    "};

    #[test]
    fn compiles_valid_program() {
        let result = compile_source(COUNTER);
        assert!(result.success, "{:?}", result.diagnostics);
        assert!(result.diagnostics.is_empty());
        assert_eq!(result.program_name, "counter");
        assert_eq!(result.source, COUNTER);
        assert!(result.output.contains("for I in range(1, 10 + 1, 1):"));
        assert!(result.output.ends_with("counter()\n"));
    }

    #[test]
    fn hashes_source_with_sha1() {
        let result = compile_source("");
        assert_eq!(result.hash, "da39a3ee5e6b4b0d3255bfef95601890afd80709");
        let result = compile_source("abc");
        assert_eq!(result.hash, "a9993e364706816aba3e25717850c26c9cd0d89d");
    }

    #[test]
    fn identical_sources_compile_identically() {
        let first = compile_source(COUNTER);
        let second = compile_source(COUNTER);
        assert_eq!(first.hash, second.hash);
        assert_eq!(first.output, second.output);
        assert_eq!(first.diagnostics, second.diagnostics);
    }

    #[test]
    fn undefined_variable_suppresses_output() {
        let result = compile_source("PROG p OUT[A1]: ENDPROG");
        assert!(!result.success);
        assert!(result.output.is_empty());
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].kind, DiagnosticKind::UndefinedVariable);
    }

    #[test]
    fn checker_runs_alongside_syntax_errors() {
        let result = compile_source("PROG p ? OUT[A1]: ENDPROG");
        let kinds = result
            .diagnostics
            .iter()
            .map(|diagnostic| diagnostic.kind)
            .collect::<Vec<_>>();
        assert_eq!(kinds, vec![DiagnosticKind::Syntax]);

        let result = compile_source("PROG p ? : OUT[A1]: ENDPROG");
        let kinds = result
            .diagnostics
            .iter()
            .map(|diagnostic| diagnostic.kind)
            .collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![DiagnosticKind::Syntax, DiagnosticKind::UndefinedVariable]
        );
        assert!(result.output.is_empty());
    }

    #[test]
    fn truncated_source_reports_end_of_input_last() {
        let result = compile_source("PROG p\n  @\n  WHEN");
        assert!(!result.success);
        assert_eq!(result.program_name, "p");
        let kinds = result
            .diagnostics
            .iter()
            .map(|diagnostic| diagnostic.kind)
            .collect::<Vec<_>>();
        assert_eq!(kinds, vec![DiagnosticKind::Syntax, DiagnosticKind::EndOfInput]);
        assert_eq!(
            result.diagnostics[1].message,
            "Unexpected end of file."
        );
    }

    #[test]
    fn into_result_reports_first_diagnostic() {
        let output = compile_source(COUNTER).into_result().expect("compiles");
        assert!(output.contains("def counter():"));

        let err = compile_source("PROG p OUT[A1]: ENDPROG")
            .into_result()
            .expect_err("undefined variable");
        assert_eq!(err.program_name, "p");
        assert_eq!(
            err.to_string(),
            "failed to compile 'p': 1 diagnostic(s), first: Undefined variable 'A1' at line 1 char 11."
        );
    }

    #[test]
    fn serializes_for_host() {
        let result = compile_source("PROG p OUT[A1]: ENDPROG");
        let json = serde_json::to_value(&result).expect("serialize result");
        assert_eq!(json["programName"], "p");
        assert_eq!(json["success"], false);
        assert!(json["elapsed"].is_f64());
        assert_eq!(json["diagnostics"][0]["kind"], "undefined-variable");
        assert_eq!(json["diagnostics"][0]["position"]["line"], 1);
    }

    #[test]
    fn verbose_options_still_compile() {
        let options = CompileOptions { verbose: true };
        let result = compile_source_with(COUNTER, &options);
        assert!(result.success);
        assert_eq!(result.output, compile_source(COUNTER).output);
    }

    #[test]
    fn verbose_flag_reads_only_one() {
        assert!(CompileOptions::from_verbose_var(Some("1")).verbose);
        assert!(!CompileOptions::from_verbose_var(Some("0")).verbose);
        assert!(!CompileOptions::from_verbose_var(Some("true")).verbose);
        assert!(!CompileOptions::from_verbose_var(None).verbose);
    }
}
