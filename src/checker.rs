use rustc_hash::FxHashSet;

use crate::ast::{AssignValue, CodeBlock, Condition, Operand, Program, Statement, Term, Variable};
use crate::diagnostic::Diagnostic;

/// Walks a program with a stack of scopes, one per code block, and reports
/// every variable read before it is assigned.
pub struct ScopeChecker {
    scopes: Vec<FxHashSet<String>>,
    diagnostics: Vec<Diagnostic>,
}

impl ScopeChecker {
    pub fn new() -> Self {
        Self {
            scopes: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn check_program(mut self, program: &Program) -> Vec<Diagnostic> {
        self.check_block(&program.body);
        self.diagnostics
    }

    fn check_block(&mut self, block: &CodeBlock) {
        self.scopes.push(FxHashSet::default());
        self.check_statements(&block.statements);
        self.scopes.pop();
    }

    fn check_statements(&mut self, statements: &[Statement]) {
        for statement in statements {
            self.check_statement(statement);
        }
    }

    fn check_statement(&mut self, statement: &Statement) {
        match statement {
            Statement::Assign {
                target,
                value,
                operator,
            } => {
                let mut valid = true;
                if operator.is_some() {
                    valid &= self.check_variable(target);
                }
                valid &= match value {
                    AssignValue::Term(term) => self.check_term(term),
                    AssignValue::Input(params) => self.check_terms(params),
                };
                if valid {
                    self.define(target);
                }
            }
            Statement::Output(params) => {
                self.check_terms(params);
            }
            Statement::PreTestLoop { condition, body } => {
                self.check_condition(condition);
                self.check_block(body);
            }
            Statement::PostTestLoop { body, condition } => {
                // The condition runs after the body, so it sees the body's
                // assignments.
                self.scopes.push(FxHashSet::default());
                self.check_statements(&body.statements);
                self.check_condition(condition);
                self.scopes.pop();
            }
            Statement::ForLoop { variable, body, .. } => {
                self.define(variable);
                self.check_block(body);
            }
            Statement::BinarySelection { branches } => {
                for (condition, body) in branches {
                    if let Some(condition) = condition {
                        self.check_condition(condition);
                    }
                    self.check_block(body);
                }
            }
            Statement::MultiwaySelection { variable, arms } => {
                self.check_variable(variable);
                for (_, body) in arms {
                    self.check_block(body);
                }
            }
        }
    }

    fn check_condition(&mut self, condition: &Condition) {
        for operand in [&condition.left, &condition.right] {
            match operand {
                Operand::Condition(inner) => self.check_condition(inner),
                Operand::Term(term) => {
                    self.check_term(term);
                }
            }
        }
    }

    /// Checks every variable in `terms`, reporting each undefined one.
    fn check_terms(&mut self, terms: &[Term]) -> bool {
        terms
            .iter()
            .fold(true, |valid, term| self.check_term(term) && valid)
    }

    fn check_term(&mut self, term: &Term) -> bool {
        match term {
            Term::Variable(variable) => self.check_variable(variable),
            Term::String(_) | Term::Number(_) => true,
        }
    }

    fn check_variable(&mut self, variable: &Variable) -> bool {
        if self.is_defined(&variable.name) {
            return true;
        }
        self.diagnostics
            .push(Diagnostic::undefined_variable(&variable.name, variable.span));
        false
    }

    fn is_defined(&self, name: &str) -> bool {
        self.scopes.iter().rev().any(|scope| scope.contains(name))
    }

    fn define(&mut self, variable: &Variable) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(variable.name.clone());
        }
    }
}

impl Default for ScopeChecker {
    fn default() -> Self {
        Self::new()
    }
}

pub fn check(program: &Program) -> Vec<Diagnostic> {
    ScopeChecker::new().check_program(program)
}
