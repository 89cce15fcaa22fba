use crate::ast::{
    AssignValue, CodeBlock, Condition, ConditionOperator, Literal, MathOperator, Operand, Program,
    Statement, Term, Variable,
};
use crate::diagnostic::Diagnostic;
use crate::token::{Keyword, Operator, Token, TokenKind};

/// Why a construct stopped parsing. Both variants carry the diagnostics
/// gathered so far, oldest first.
#[derive(Debug, PartialEq)]
enum ParseError {
    /// A committed construct hit a token it cannot accept. The enclosing
    /// block records the diagnostics and skips to the next statement.
    Syntax(Vec<Diagnostic>),
    /// The tokens ran out mid-construct. Aborts the whole program.
    EndOfInput(Vec<Diagnostic>),
}

impl ParseError {
    fn after(self, earlier: &[Diagnostic]) -> Self {
        let prepend = |diagnostics: Vec<Diagnostic>| {
            let mut merged = earlier.to_vec();
            merged.extend(diagnostics);
            merged
        };
        match self {
            ParseError::Syntax(diagnostics) => ParseError::Syntax(prepend(diagnostics)),
            ParseError::EndOfInput(diagnostics) => ParseError::EndOfInput(prepend(diagnostics)),
        }
    }
}

type ParseResult<T> = Result<T, ParseError>;

/// Diagnostics from the blocks a construct has already finished. They are
/// kept if the construct later fails.
#[derive(Default)]
struct Nested(Vec<Diagnostic>);

impl Nested {
    fn track<T>(&self, result: ParseResult<T>) -> ParseResult<T> {
        result.map_err(|err| err.after(&self.0))
    }

    fn block(&mut self, result: ParseResult<CodeBlock>) -> ParseResult<CodeBlock> {
        let block = self.track(result)?;
        self.0.extend(block.diagnostics.iter().cloned());
        Ok(block)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutput {
    /// `None` when the header was malformed or the input ended early.
    pub program: Option<Program>,
    /// Empty unless `PROG <identifier>` was read.
    pub program_name: String,
    pub diagnostics: Vec<Diagnostic>,
    /// Set when the tokens ran out before the program was complete.
    pub incomplete: bool,
}

pub struct Parser<'t, 'a> {
    tokens: &'t [Token<'a>],
    position: usize,
}

impl<'t, 'a> Parser<'t, 'a> {
    pub fn new(tokens: &'t [Token<'a>]) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    pub fn parse_program(mut self) -> ParseOutput {
        let mut output = ParseOutput {
            program: None,
            program_name: String::new(),
            diagnostics: Vec::new(),
            incomplete: false,
        };

        let header = self
            .expect_keyword(Keyword::Prog)
            .and_then(|()| self.expect_program_name());
        let name = match header {
            Ok(name) => name,
            Err(ParseError::Syntax(diagnostics)) => {
                output.diagnostics = diagnostics;
                return output;
            }
            Err(ParseError::EndOfInput(diagnostics)) => {
                output.diagnostics = diagnostics;
                output.incomplete = true;
                return output;
            }
        };
        output.program_name = name.clone();

        let body = match self.parse_block(Keyword::EndProg) {
            Ok(body) => body,
            Err(ParseError::Syntax(diagnostics) | ParseError::EndOfInput(diagnostics)) => {
                output.diagnostics = diagnostics;
                output.incomplete = true;
                return output;
            }
        };

        output.diagnostics = body.diagnostics.clone();
        if let Some(token) = self.peek() {
            output
                .diagnostics
                .push(Diagnostic::expected("the end of the program", token));
        }
        output.program = Some(Program { name, body });
        output
    }

    /// Statements until `end`, which is consumed. Unknown tokens and failed
    /// constructs are recorded, then tokens are skipped up to the next `:`
    /// or block-closing keyword.
    fn parse_block(&mut self, end: Keyword) -> ParseResult<CodeBlock> {
        let mut statements = Vec::new();
        let mut diagnostics = Vec::new();
        let mut skipping = false;

        loop {
            let Some(token) = self.peek() else {
                return Err(ParseError::EndOfInput(diagnostics));
            };
            if token.is_keyword(end) {
                self.advance();
                break;
            }
            if token.is_operator(Operator::Colon) {
                self.advance();
                skipping = false;
                continue;
            }
            if skipping {
                if matches!(token.kind, TokenKind::Keyword(keyword) if keyword.is_block_end()) {
                    skipping = false;
                } else {
                    self.advance();
                }
                continue;
            }

            match self.parse_statement(token) {
                Ok(Some((statement, nested))) => {
                    statements.push(statement);
                    diagnostics.extend(nested);
                }
                Ok(None) => {
                    diagnostics.push(Diagnostic::expected("a statement", token));
                    self.advance();
                    skipping = true;
                }
                Err(ParseError::Syntax(found)) => {
                    diagnostics.extend(found);
                    skipping = true;
                }
                Err(ParseError::EndOfInput(found)) => {
                    diagnostics.extend(found);
                    return Err(ParseError::EndOfInput(diagnostics));
                }
            }
        }

        Ok(CodeBlock {
            statements,
            diagnostics,
        })
    }

    fn parse_do_block(&mut self) -> ParseResult<CodeBlock> {
        self.expect_keyword(Keyword::Do)?;
        self.parse_block(Keyword::EndDo)
    }

    /// Picks a production from the lookahead token. `Ok(None)` means no
    /// statement starts here.
    fn parse_statement(
        &mut self,
        token: &Token<'a>,
    ) -> ParseResult<Option<(Statement, Vec<Diagnostic>)>> {
        let parsed = match token.kind {
            TokenKind::Keyword(Keyword::Out) => {
                let statement = self.parse_output()?;
                (statement, self.end_of_statement()?)
            }
            TokenKind::Operator(Operator::Equal) => {
                let statement = self.parse_assignment()?;
                (statement, self.end_of_statement()?)
            }
            TokenKind::Keyword(Keyword::When) => self.parse_pre_test_loop()?,
            TokenKind::Keyword(Keyword::Repeat) => self.parse_post_test_loop()?,
            TokenKind::Keyword(Keyword::For) => self.parse_for_loop()?,
            TokenKind::Keyword(Keyword::If) => self.parse_binary_selection()?,
            TokenKind::Keyword(Keyword::Switch) => self.parse_multiway_selection()?,
            _ => return Ok(None),
        };
        Ok(Some(parsed))
    }

    /// A missing `:` after a simple statement is reported without skipping;
    /// the offending token starts the next statement.
    fn end_of_statement(&self) -> ParseResult<Vec<Diagnostic>> {
        let token = self.current()?;
        if token.is_operator(Operator::Colon) {
            Ok(Vec::new())
        } else {
            Ok(vec![Diagnostic::expected("':'", token)])
        }
    }

    fn parse_output(&mut self) -> ParseResult<Statement> {
        self.expect_keyword(Keyword::Out)?;
        Ok(Statement::Output(self.parse_params()?))
    }

    fn parse_assignment(&mut self) -> ParseResult<Statement> {
        self.expect_operator(Operator::Equal)?;
        let target = self.expect_variable()?;
        let value = if self.check_keyword(Keyword::In) {
            self.advance();
            AssignValue::Input(self.parse_params()?)
        } else {
            AssignValue::Term(self.expect_term()?)
        };
        let operator = self.peek().and_then(math_operator);
        if operator.is_some() {
            self.advance();
        }
        Ok(Statement::Assign {
            target,
            value,
            operator,
        })
    }

    /// `[` term (`+` term)* `]`, or `[]`.
    fn parse_params(&mut self) -> ParseResult<Vec<Term>> {
        self.expect_operator(Operator::LBracket)?;
        let mut items = Vec::new();
        if self.check_operator(Operator::RBracket) {
            self.advance();
            return Ok(items);
        }
        loop {
            items.push(self.expect_term()?);
            let token = self.current()?;
            if token.is_operator(Operator::RBracket) {
                self.advance();
                return Ok(items);
            }
            if !token.is_operator(Operator::Plus) {
                return Err(Self::error("'+' or ']'", token));
            }
            self.advance();
        }
    }

    fn parse_condition(&mut self) -> ParseResult<Condition> {
        let invert = self.check_operator(Operator::Bang);
        if invert {
            self.advance();
        }
        let token = self.current()?;
        let operator = condition_operator(token)
            .ok_or_else(|| Self::error("a logical or relational operator", token))?;
        self.advance();
        let left = self.parse_operand()?;
        let right = self.parse_operand()?;
        Ok(Condition {
            invert,
            operator,
            left,
            right,
        })
    }

    fn parse_operand(&mut self) -> ParseResult<Operand> {
        let token = self.current()?;
        if token.is_operator(Operator::Bang) || condition_operator(token).is_some() {
            Ok(Operand::Condition(Box::new(self.parse_condition()?)))
        } else {
            Ok(Operand::Term(self.expect_term()?))
        }
    }

    fn parse_pre_test_loop(&mut self) -> ParseResult<(Statement, Vec<Diagnostic>)> {
        let mut nested = Nested::default();
        self.expect_keyword(Keyword::When)?;
        let condition = self.parse_condition()?;
        let body = nested.block(self.parse_do_block())?;
        nested.track(self.expect_keyword(Keyword::EndWhen))?;
        Ok((Statement::PreTestLoop { condition, body }, nested.0))
    }

    fn parse_post_test_loop(&mut self) -> ParseResult<(Statement, Vec<Diagnostic>)> {
        let mut nested = Nested::default();
        self.expect_keyword(Keyword::Repeat)?;
        let body = nested.block(self.parse_do_block())?;
        nested.track(self.expect_keyword(Keyword::Until))?;
        let condition = nested.track(self.parse_condition())?;
        nested.track(self.expect_keyword(Keyword::EndRepeat))?;
        Ok((Statement::PostTestLoop { body, condition }, nested.0))
    }

    fn parse_for_loop(&mut self) -> ParseResult<(Statement, Vec<Diagnostic>)> {
        let mut nested = Nested::default();
        self.expect_keyword(Keyword::For)?;
        let variable = self.expect_variable()?;
        self.expect_keyword(Keyword::From)?;
        let from = self.expect_number()?;
        self.expect_keyword(Keyword::To)?;
        let to = self.expect_number()?;
        self.expect_keyword(Keyword::By)?;
        let step = self.current()?;
        let by = self.expect_number()?;
        if by == 0.0 {
            return Err(Self::error("a non-zero step", step));
        }
        let body = nested.block(self.parse_do_block())?;
        nested.track(self.expect_keyword(Keyword::EndFor))?;
        let statement = Statement::ForLoop {
            variable,
            from,
            to,
            by,
            body,
        };
        Ok((statement, nested.0))
    }

    fn parse_binary_selection(&mut self) -> ParseResult<(Statement, Vec<Diagnostic>)> {
        let mut nested = Nested::default();
        self.expect_keyword(Keyword::If)?;
        let condition = self.parse_condition()?;
        let body = nested.block(self.parse_do_block())?;
        let mut branches = vec![(Some(condition), body)];

        while self.check_keyword(Keyword::Otherwise) {
            self.advance();
            if self.check_keyword(Keyword::If) {
                self.advance();
                let condition = nested.track(self.parse_condition())?;
                let body = nested.block(self.parse_do_block())?;
                branches.push((Some(condition), body));
            } else {
                let body = nested.block(self.parse_do_block())?;
                branches.push((None, body));
                break;
            }
        }

        nested.track(self.expect_keyword(Keyword::EndIf))?;
        Ok((Statement::BinarySelection { branches }, nested.0))
    }

    fn parse_multiway_selection(&mut self) -> ParseResult<(Statement, Vec<Diagnostic>)> {
        let mut nested = Nested::default();
        self.expect_keyword(Keyword::Switch)?;
        let variable = self.expect_variable()?;
        let mut arms = Vec::new();

        loop {
            let token = nested.track(self.current())?;
            if token.is_keyword(Keyword::EndSwitch) {
                self.advance();
                break;
            }
            nested.track(self.expect_keyword(Keyword::When))?;
            let value = nested.track(self.expect_literal())?;
            let body = nested.block(self.parse_do_block())?;
            arms.push((value, body));
        }

        Ok((Statement::MultiwaySelection { variable, arms }, nested.0))
    }

    fn expect_program_name(&mut self) -> ParseResult<String> {
        let token = self.current()?;
        if let TokenKind::Identifier(name) = token.kind {
            self.advance();
            Ok(name.to_string())
        } else {
            Err(Self::error("a program identifier", token))
        }
    }

    fn expect_variable(&mut self) -> ParseResult<Variable> {
        let token = self.current()?;
        if let TokenKind::Variable(name) = token.kind {
            self.advance();
            Ok(Variable::new(name, token.span))
        } else {
            Err(Self::error("a variable", token))
        }
    }

    fn expect_term(&mut self) -> ParseResult<Term> {
        let token = self.current()?;
        let term = match token.kind {
            TokenKind::Variable(name) => Term::Variable(Variable::new(name, token.span)),
            TokenKind::String(body) => Term::String(body.to_string()),
            TokenKind::Number(text) => Term::Number(Self::number_value(text, token)?),
            _ => return Err(Self::error("a variable, string or number", token)),
        };
        self.advance();
        Ok(term)
    }

    fn expect_literal(&mut self) -> ParseResult<Literal> {
        let token = self.current()?;
        let literal = match token.kind {
            TokenKind::String(body) => Literal::String(body.to_string()),
            TokenKind::Number(text) => Literal::Number(Self::number_value(text, token)?),
            _ => return Err(Self::error("a string or number", token)),
        };
        self.advance();
        Ok(literal)
    }

    fn expect_number(&mut self) -> ParseResult<f64> {
        let token = self.current()?;
        if let TokenKind::Number(text) = token.kind {
            let value = Self::number_value(text, token)?;
            self.advance();
            Ok(value)
        } else {
            Err(Self::error("a number", token))
        }
    }

    fn number_value(text: &str, token: &Token<'_>) -> ParseResult<f64> {
        match text.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(Self::error("a finite number", token)),
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> ParseResult<()> {
        let token = self.current()?;
        if token.is_keyword(keyword) {
            self.advance();
            Ok(())
        } else {
            Err(Self::error(&format!("'{}'", keyword.as_str()), token))
        }
    }

    fn expect_operator(&mut self, operator: Operator) -> ParseResult<()> {
        let token = self.current()?;
        if token.is_operator(operator) {
            self.advance();
            Ok(())
        } else {
            Err(Self::error(&format!("'{}'", operator.as_str()), token))
        }
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        self.peek().is_some_and(|token| token.is_keyword(keyword))
    }

    fn check_operator(&self, operator: Operator) -> bool {
        self.peek().is_some_and(|token| token.is_operator(operator))
    }

    fn peek(&self) -> Option<&'t Token<'a>> {
        self.tokens.get(self.position)
    }

    /// The next token, or end of input.
    fn current(&self) -> ParseResult<&'t Token<'a>> {
        self.peek().ok_or(ParseError::EndOfInput(Vec::new()))
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    fn error(expected: &str, found: &Token<'_>) -> ParseError {
        ParseError::Syntax(vec![Diagnostic::expected(expected, found)])
    }
}

fn math_operator(token: &Token<'_>) -> Option<MathOperator> {
    match token.kind {
        TokenKind::Operator(Operator::Plus) => Some(MathOperator::Add),
        TokenKind::Operator(Operator::Minus) => Some(MathOperator::Sub),
        TokenKind::Operator(Operator::Star) => Some(MathOperator::Mul),
        TokenKind::Operator(Operator::Slash) => Some(MathOperator::Div),
        TokenKind::Operator(Operator::Percent) => Some(MathOperator::Rem),
        _ => None,
    }
}

fn condition_operator(token: &Token<'_>) -> Option<ConditionOperator> {
    match token.kind {
        TokenKind::Operator(Operator::AndAnd) => Some(ConditionOperator::And),
        TokenKind::Operator(Operator::OrOr) => Some(ConditionOperator::Or),
        TokenKind::Operator(Operator::GreaterEq) => Some(ConditionOperator::GreaterEqual),
        TokenKind::Operator(Operator::LessEq) => Some(ConditionOperator::LessEqual),
        TokenKind::Operator(Operator::Greater) => Some(ConditionOperator::Greater),
        TokenKind::Operator(Operator::Less) => Some(ConditionOperator::Less),
        TokenKind::Operator(Operator::EqualEq) => Some(ConditionOperator::Equal),
        _ => None,
    }
}

pub fn parse(tokens: &[Token<'_>]) -> ParseOutput {
    Parser::new(tokens).parse_program()
}
