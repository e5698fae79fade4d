use std::fmt::{Display, Write};

use crate::ast::{Expression, Literal, Statement};

/// Renders a statement as source text that parses back to the same tree.
pub fn format(statement: &Statement) -> String {
    let mut formatter = Formatter::default();
    formatter.statement(statement);
    formatter.finish()
}

/// Accumulates formatted source, tracking the block nesting depth.
#[derive(Debug, Default)]
pub struct Formatter {
    output: String,
    depth: usize,
}

impl Formatter {
    pub fn finish(self) -> String {
        self.output
    }

    /// Writes `statement` at the current position without a trailing newline.
    pub fn statement(&mut self, statement: &Statement) {
        match statement {
            Statement::Expression(expression) => self.line_end(expression),
            Statement::Print { expression, .. } => {
                self.output.push_str("print ");
                self.line_end(expression);
            }
            Statement::Assert { expression, .. } => {
                self.output.push_str("assert ");
                self.line_end(expression);
            }
            Statement::VarDeclaration {
                name, initializer, ..
            } => {
                self.output.push_str("var ");
                self.output.push_str(name);
                if let Some(initializer) = initializer {
                    self.output.push_str(" = ");
                    self.line_end(initializer);
                } else {
                    self.output.push(';');
                }
            }
            Statement::FunctionDeclaration(declaration) => {
                let _ = write!(
                    self.output,
                    "fun {}({}) ",
                    declaration.name,
                    declaration.params.join(", ")
                );
                self.block(&declaration.body);
            }
            Statement::Block(statements) => self.block(statements),
            Statement::If(condition, then_branch, else_branch) => {
                let _ = write!(self.output, "if ({}) ", Source(condition));
                self.statement(then_branch);
                if let Some(else_branch) = else_branch {
                    self.output.push_str(" else ");
                    self.statement(else_branch);
                }
            }
            Statement::While(condition, body) => {
                let _ = write!(self.output, "while ({}) ", Source(condition));
                self.statement(body);
            }
            Statement::Return { value, .. } => match value {
                Some(value) => {
                    self.output.push_str("return ");
                    self.line_end(value);
                }
                None => self.output.push_str("return;"),
            },
            Statement::End => {}
        }
    }

    fn line_end(&mut self, expression: &Expression) {
        let _ = write!(self.output, "{};", Source(expression));
    }

    fn block(&mut self, statements: &[Statement]) {
        self.output.push_str("{\n");
        self.depth += 1;
        for statement in statements {
            self.indent();
            self.statement(statement);
            self.output.push('\n');
        }
        self.depth -= 1;
        self.indent();
        self.output.push('}');
    }

    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.output.push('\t');
        }
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format(self))
    }
}

/// Source-text form of an expression. Grouping nodes are kept in the tree,
/// so no parentheses need to be invented.
pub struct Source<'a>(pub &'a Expression);

impl Display for Source<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Expression::Literal(Literal::String(s)) => write!(f, "\"{}\"", s),
            Expression::Literal(literal) => write!(f, "{}", literal),
            Expression::Grouping(expression) => write!(f, "({})", Source(expression)),
            Expression::Unary {
                operator, right, ..
            } => write!(f, "{}{}", operator, Source(right)),
            Expression::Binary {
                left,
                operator,
                right,
                ..
            } => write!(f, "{} {} {}", Source(left), operator, Source(right)),
            Expression::Logical {
                left,
                operator,
                right,
            } => write!(f, "{} {} {}", Source(left), operator, Source(right)),
            Expression::Variable { name, .. } => write!(f, "{}", name),
            Expression::Assign { name, value, .. } => write!(f, "{} = {}", name, Source(value)),
            Expression::Call {
                callee, arguments, ..
            } => {
                write!(f, "{}(", Source(callee))?;
                for (i, argument) in arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", Source(argument))?;
                }
                write!(f, ")")
            }
        }
    }
}
