use self::python_runtime::{
    PY_ASSIGN, PY_IMPORTS, PY_INPUT, decimal_places, escape_python_string, format_number,
    iteration_count, python_function_name,
};
use crate::ast::{
    AssignValue, CodeBlock, Condition, ConditionOperator, Literal, Operand, Program, Statement,
    Term,
};

mod python_runtime;

/// Renders a checked program as a standalone Python 3 script.
pub struct Transpiler;

impl Transpiler {
    pub fn transpile(&self, program: &Program) -> String {
        let mut output = String::new();
        let name = python_function_name(&program.name);

        output.push_str(PY_IMPORTS);
        output.push_str(PY_INPUT);
        output.push_str(PY_ASSIGN);

        output.push_str(&format!("\n\ndef {name}():\n"));
        self.emit_block(&program.body, 1, &mut output);
        output.push_str(&format!("\n\n{name}()\n"));

        output
    }

    fn emit_block(&self, block: &CodeBlock, indent: usize, output: &mut String) {
        if block.statements.is_empty() {
            self.push_line(output, indent, "pass");
            return;
        }
        for statement in &block.statements {
            self.emit_statement(statement, indent, output);
        }
    }

    fn emit_statement(&self, statement: &Statement, indent: usize, output: &mut String) {
        match statement {
            Statement::Assign {
                target,
                value,
                operator,
            } => {
                let value = match value {
                    AssignValue::Term(term) => self.emit_term(term),
                    AssignValue::Input(params) => self.emit_input(params),
                };
                let line = match operator {
                    Some(operator) => format!(
                        "{0} = zedAssign({0}, {value}, '{1}')",
                        target.name,
                        operator.as_str()
                    ),
                    None => format!("{} = {value}", target.name),
                };
                self.push_line(output, indent, &line);
            }
            Statement::Output(params) => {
                let mut args = params
                    .iter()
                    .map(|term| self.emit_term(term))
                    .collect::<Vec<_>>();
                args.push("sep=''".to_string());
                self.push_line(output, indent, &format!("print({})", args.join(", ")));
            }
            Statement::PreTestLoop { condition, body } => {
                let condition = self.emit_condition(condition);
                self.push_line(output, indent, &format!("while {condition}:"));
                self.emit_block(body, indent + 1, output);
            }
            Statement::PostTestLoop { body, condition } => {
                self.push_line(output, indent, "while True:");
                self.emit_block(body, indent + 1, output);
                let condition = self.emit_condition(condition);
                self.push_line(output, indent + 1, &format!("if {condition}:"));
                self.push_line(output, indent + 2, "break");
            }
            Statement::ForLoop {
                variable,
                from,
                to,
                by,
                body,
            } => {
                let name = &variable.name;
                let (from, to, by) = (*from, *to, *by);
                if [from, to, by].iter().all(|value| value.fract() == 0.0) {
                    self.push_line(
                        output,
                        indent,
                        &format!(
                            "for {name} in range({}, {} + 1, {}):",
                            format_number(from),
                            format_number(to),
                            format_number(by)
                        ),
                    );
                    self.emit_block(body, indent + 1, output);
                } else {
                    let places = decimal_places(from).max(decimal_places(by));
                    self.push_line(
                        output,
                        indent,
                        &format!("for _n in range({}):", iteration_count(from, to, by)),
                    );
                    self.push_line(
                        output,
                        indent + 1,
                        &format!(
                            "{name} = round({} + _n * {}, {places})",
                            format_number(from),
                            format_number(by)
                        ),
                    );
                    for statement in &body.statements {
                        self.emit_statement(statement, indent + 1, output);
                    }
                }
            }
            Statement::BinarySelection { branches } => {
                for (index, (condition, body)) in branches.iter().enumerate() {
                    let line = match (index, condition) {
                        (0, Some(condition)) => format!("if {}:", self.emit_condition(condition)),
                        (_, Some(condition)) => format!("elif {}:", self.emit_condition(condition)),
                        (_, None) => "else:".to_string(),
                    };
                    self.push_line(output, indent, &line);
                    self.emit_block(body, indent + 1, output);
                }
            }
            Statement::MultiwaySelection { variable, arms } => {
                if arms.is_empty() {
                    self.push_line(output, indent, "pass");
                }
                for (index, (value, body)) in arms.iter().enumerate() {
                    let keyword = if index == 0 { "if" } else { "elif" };
                    let value = self.emit_literal(value);
                    self.push_line(
                        output,
                        indent,
                        &format!("{keyword} {} == {value}:", variable.name),
                    );
                    self.emit_block(body, indent + 1, output);
                }
            }
        }
    }

    fn emit_input(&self, params: &[Term]) -> String {
        if params.is_empty() {
            return "zedInput('')".to_string();
        }
        let prompt = params
            .iter()
            .map(|term| format!("str({})", self.emit_term(term)))
            .collect::<Vec<_>>()
            .join(" + ");
        format!("zedInput({prompt})")
    }

    fn emit_condition(&self, condition: &Condition) -> String {
        let left = self.emit_operand(&condition.left);
        let right = self.emit_operand(&condition.right);
        let operator = match condition.operator {
            ConditionOperator::And => "and",
            ConditionOperator::Or => "or",
            ConditionOperator::GreaterEqual => ">=",
            ConditionOperator::LessEqual => "<=",
            ConditionOperator::Greater => ">",
            ConditionOperator::Less => "<",
            ConditionOperator::Equal => "==",
        };
        if condition.invert {
            format!("(not ({left} {operator} {right}))")
        } else {
            format!("({left} {operator} {right})")
        }
    }

    fn emit_operand(&self, operand: &Operand) -> String {
        match operand {
            Operand::Condition(condition) => self.emit_condition(condition),
            Operand::Term(term) => self.emit_term(term),
        }
    }

    fn emit_term(&self, term: &Term) -> String {
        match term {
            Term::Variable(variable) => variable.name.clone(),
            Term::String(value) => format!("\"{}\"", escape_python_string(value)),
            Term::Number(value) => format_number(*value),
        }
    }

    fn emit_literal(&self, literal: &Literal) -> String {
        match literal {
            Literal::String(value) => format!("\"{}\"", escape_python_string(value)),
            Literal::Number(value) => format_number(*value),
        }
    }

    fn push_line(&self, output: &mut String, indent: usize, line: &str) {
        for _ in 0..indent {
            output.push_str("    ");
        }
        output.push_str(line);
        output.push('\n');
    }
}

pub fn transpile(program: &Program) -> String {
    Transpiler.transpile(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse;
    use indoc::indoc;

    fn transpile_source(input: &str) -> String {
        let output = parse(&tokenize(input));
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
        transpile(&output.program.expect("program"))
    }

    /// The generated program without the runtime prelude.
    fn body(generated: &str) -> &str {
        let prelude_len = PY_IMPORTS.len() + PY_INPUT.len() + PY_ASSIGN.len();
        &generated[prelude_len..]
    }

    #[test]
    fn emits_prelude_and_entry_point() {
        let generated = transpile_source("PROG hello OUT[\"Hello\"]: ENDPROG");
        assert!(generated.starts_with("import math\n"));
        assert!(generated.contains("def zedInput(prompt):"));
        assert!(generated.contains("def zedAssign(target, value, operator):"));
        assert_eq!(
            body(&generated),
            "\n\ndef hello():\n    print(\"Hello\", sep='')\n\n\nhello()\n"
        );
    }

    #[test]
    fn transpiles_statements() {
        let input = indoc! {r#"
            PROG demo
                = A1 IN["Name" + 1]:
                = B1 2.5:
                = B1 A1 %:
                FOR I FROM 1 TO 10 BY 2 DO
                    OUT[I + " "]:
                ENDDO ENDFOR
                WHEN ! || == A1 "x" < B1 3 DO
                    = A1 "x":
                ENDDO ENDWHEN
                REPEAT DO ENDDO UNTIL >= B1 0 ENDREPEAT
            ENDPROG
        "#};
        let expected = indoc! {r#"


            def demo():
                A1 = zedInput(str("Name") + str(1))
                B1 = 2.5
                B1 = zedAssign(B1, A1, '%')
                for I in range(1, 10 + 1, 2):
                    print(I, " ", sep='')
                while (not ((A1 == "x") or (B1 < 3))):
                    A1 = "x"
                while True:
                    pass
                    if (B1 >= 0):
                        break


            demo()
        "#};
        assert_eq!(body(&transpile_source(input)), expected);
    }

    #[test]
    fn transpiles_selections() {
        let input = indoc! {r#"
            PROG pick
                = A1 1:
                IF == A1 1 DO OUT["one"]: ENDDO
                OTHERWISE IF == A1 2 DO ENDDO
                OTHERWISE DO OUT["many"]: ENDDO ENDIF
                SWITCH A1
                    WHEN 1 DO OUT[]: ENDDO
                    WHEN "a\b" DO ENDDO
                ENDSWITCH
                SWITCH A1 ENDSWITCH
            ENDPROG
        "#};
        let expected = indoc! {r#"


            def pick():
                A1 = 1
                if (A1 == 1):
                    print("one", sep='')
                elif (A1 == 2):
                    pass
                else:
                    print("many", sep='')
                if A1 == 1:
                    print(sep='')
                elif A1 == "a\\b":
                    pass
                pass


            pick()
        "#};
        assert_eq!(body(&transpile_source(input)), expected);
    }

    #[test]
    fn fractional_for_loop_counts_passes_up_front() {
        let input = indoc! {"
            PROG f
                FOR X FROM 0.5 TO 2 BY 0.5 DO OUT[X]: ENDDO ENDFOR
                FOR Y FROM 0 TO 0.3 BY 0.1 DO ENDDO ENDFOR
                FOR Z FROM 1 TO 0.5 BY 0.25 DO ENDDO ENDFOR
            ENDPROG
        "};
        let expected = indoc! {"


            def f():
                for _n in range(4):
                    X = round(0.5 + _n * 0.5, 1)
                    print(X, sep='')
                for _n in range(4):
                    Y = round(0 + _n * 0.1, 1)
                for _n in range(0):
                    Z = round(1 + _n * 0.25, 2)


            f()
        "};
        assert_eq!(body(&transpile_source(input)), expected);
    }

    #[test]
    fn inverted_condition_stays_grouped_under_comparison() {
        let generated = transpile_source(
            "PROG p = A1 5: = B1 2: IF == ! > A1 1 B1 DO ENDDO ENDIF ENDPROG",
        );
        assert!(
            generated.contains("    if ((not (A1 > 1)) == B1):\n"),
            "{}",
            body(&generated)
        );
    }

    #[test]
    fn counts_inclusive_steps() {
        assert_eq!(iteration_count(0.0, 0.3, 0.1), 4);
        assert_eq!(iteration_count(0.0, 1.0, 0.1), 11);
        assert_eq!(iteration_count(1.0, 0.5, 0.25), 0);
        assert_eq!(iteration_count(0.0, 0.95, 0.1), 10);
        assert_eq!(decimal_places(0.1), 1);
        assert_eq!(decimal_places(0.25), 2);
        assert_eq!(decimal_places(3.0), 0);
    }

    #[test]
    fn renames_reserved_program_names() {
        let generated = transpile_source("PROG print ENDPROG");
        assert!(generated.contains("def print_():\n    pass\n"));
        assert!(generated.ends_with("\n\nprint_()\n"));
        assert_eq!(python_function_name("lambda"), "lambda_");
        assert_eq!(python_function_name("main"), "main");
    }

    #[test]
    fn formats_numbers() {
        assert_eq!(format_number(42.0), "42");
        assert_eq!(format_number(3.25), "3.25");
        assert_eq!(format_number(1e20), "100000000000000000000");
    }
}
