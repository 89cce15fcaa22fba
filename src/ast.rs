use crate::diagnostic::Diagnostic;
use crate::token::Span;

#[derive(Debug, PartialEq, Clone)]
pub struct Variable {
    pub name: String,
    pub span: Span,
}

impl Variable {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// A variable reference or a literal.
#[derive(Debug, PartialEq, Clone)]
pub enum Term {
    Variable(Variable),
    String(String),
    Number(f64),
}

/// A `SWITCH` arm value. Variables are not allowed here.
#[derive(Debug, PartialEq, Clone)]
pub enum Literal {
    String(String),
    Number(f64),
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum MathOperator {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl MathOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            MathOperator::Add => "+",
            MathOperator::Sub => "-",
            MathOperator::Mul => "*",
            MathOperator::Div => "/",
            MathOperator::Rem => "%",
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum ConditionOperator {
    And,
    Or,
    GreaterEqual,
    LessEqual,
    Greater,
    Less,
    Equal,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Operand {
    Condition(Box<Condition>),
    Term(Term),
}

#[derive(Debug, PartialEq, Clone)]
pub struct Condition {
    pub invert: bool,
    pub operator: ConditionOperator,
    pub left: Operand,
    pub right: Operand,
}

#[derive(Debug, PartialEq, Clone)]
pub enum AssignValue {
    Term(Term),
    Input(Vec<Term>),
}

#[derive(Debug, PartialEq, Clone)]
pub struct CodeBlock {
    pub statements: Vec<Statement>,
    /// Syntax diagnostics raised in this block and every block nested in it.
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Statement {
    Assign {
        target: Variable,
        value: AssignValue,
        operator: Option<MathOperator>,
    },
    Output(Vec<Term>),
    PreTestLoop {
        condition: Condition,
        body: CodeBlock,
    },
    PostTestLoop {
        body: CodeBlock,
        condition: Condition,
    },
    ForLoop {
        variable: Variable,
        from: f64,
        to: f64,
        by: f64,
        body: CodeBlock,
    },
    BinarySelection {
        branches: Vec<(Option<Condition>, CodeBlock)>,
    },
    MultiwaySelection {
        variable: Variable,
        arms: Vec<(Literal, CodeBlock)>,
    },
}

#[derive(Debug, PartialEq, Clone)]
pub struct Program {
    pub name: String,
    pub body: CodeBlock,
}
