pub mod ast;
pub mod checker;
pub mod compiler;
pub mod diagnostic;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod transpiler;

pub use compiler::{
    CompilationResult, CompileError, CompileOptions, compile_source, compile_source_with,
};
pub use diagnostic::{Diagnostic, DiagnosticKind};
