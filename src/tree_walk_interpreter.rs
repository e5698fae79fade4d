mod callable;
mod environment;

use std::{
    cell::RefCell,
    fmt::{Debug, Display},
    rc::Rc,
};

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::ast::{
    Expression, ExprId, InfixOperator, Literal, LogicalOperator, Statement, UnaryOperator,
};

/// Deepest chain of active function calls before a call fails with
/// [`RuntimeErrorKind::StackOverflow`].
pub const MAX_CALL_DEPTH: usize = 256;

pub use self::{
    callable::{Callable, Function, NativeFunction},
    environment::Environment,
};

#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Boolean(bool),
    Number(f64),
    String(String),
    Callable(Rc<Callable>),
}

impl Value {
    /// `nil` and `false` are falsy, everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Boolean(b) => *b,
            _ => true,
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Callable(a), Value::Callable(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Callable(c) => write!(f, "{}", c),
        }
    }
}

impl From<&Literal> for Value {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::Number(n) => Value::Number(*n),
            Literal::String(s) => Value::String(s.clone()),
            Literal::Boolean(b) => Value::Boolean(*b),
            Literal::Nil => Value::Nil,
        }
    }
}

/// How a statement finished: fell through, or hit a `return`.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Normal,
    Return(Value),
}

#[derive(Debug, thiserror::Error)]
#[error("runtime error on line {line}: {kind}")]
pub struct RuntimeError {
    pub line: usize,
    pub kind: RuntimeErrorKind,
}

#[derive(Debug, thiserror::Error)]
pub enum RuntimeErrorKind {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("left operand must be a number")]
    LeftOperandNumber,
    #[error("right operand must be a number")]
    RightOperandNumber,
    #[error("right operand must be a string")]
    RightOperandString,
    #[error("left operand must be a number or a string")]
    LeftOperandNumberOrString,
    #[error("operand must be a number")]
    OperandNumber,
    #[error("can only call functions")]
    NotCallable,
    #[error("stack overflow")]
    StackOverflow,
    #[error("expected {expected} arguments but got {got}")]
    Arity { expected: usize, got: usize },
    #[error("assertion failed")]
    AssertionFailed,
    #[error("variable already declared")]
    AlreadyDeclared(String),
    #[error("variable not declared")]
    NotDeclared(String),
    #[error("variable not defined")]
    NotDefined(String),
}

pub(crate) trait AtLine<T> {
    fn at(self, line: usize) -> Result<T, RuntimeError>;
}

impl<T, E: Into<RuntimeErrorKind>> AtLine<T> for Result<T, E> {
    fn at(self, line: usize) -> Result<T, RuntimeError> {
        self.map_err(|kind| RuntimeError {
            line,
            kind: kind.into(),
        })
    }
}

pub struct Interpreter {
    globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    locals: FxHashMap<ExprId, usize>,
    call_depth: usize,
    stdout: Rc<RefCell<dyn std::io::Write>>,
    done: bool,
}

impl Debug for Interpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interpreter")
            .field("globals", &self.globals.as_ptr())
            .field("environment", &self.environment)
            .field("locals", &self.locals.len())
            .field("call_depth", &self.call_depth)
            .field("done", &self.done)
            .finish()
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(Rc::new(RefCell::new(std::io::stdout())))
    }
}

impl Interpreter {
    pub fn new(stdout: Rc<RefCell<dyn std::io::Write>>) -> Self {
        let natives = [NativeFunction {
            name: "clock",
            arity: 0,
            func: callable::clock,
        }];
        let values = natives
            .into_iter()
            .map(|native| {
                debug!(name = native.name, arity = native.arity, "registering native");
                let name = native.name.to_string();
                (name, Value::Callable(Rc::new(Callable::Native(native))))
            })
            .collect();
        let globals = Rc::new(RefCell::new(Environment::with_values(values, None)));

        Self {
            environment: globals.clone(),
            globals,
            locals: FxHashMap::default(),
            call_depth: 0,
            stdout,
            done: false,
        }
    }

    /// Executes one top-level statement.
    ///
    /// Returns the value of an expression statement and `nil` for everything
    /// else. Executing [`Statement::End`] marks the interpreter as done.
    pub fn interpret(&mut self, statement: &Statement) -> Result<Value, RuntimeError> {
        trace!(?statement, "interpret");
        match statement {
            Statement::Expression(expression) => self.evaluate(expression),
            statement => match self.execute(statement)? {
                Completion::Return(value) => Ok(value),
                Completion::Normal => Ok(Value::Nil),
            },
        }
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Records that the variable expression `id` refers to a binding `depth`
    /// environments out from where it is evaluated.
    pub(crate) fn resolve(&mut self, id: ExprId, depth: usize) {
        self.locals.insert(id, depth);
    }

    #[cfg(test)]
    pub(crate) fn resolved_depths(&self) -> impl Iterator<Item = usize> + '_ {
        self.locals.values().copied()
    }

    fn execute(&mut self, statement: &Statement) -> Result<Completion, RuntimeError> {
        match statement {
            Statement::Expression(expression) => {
                self.evaluate(expression)?;
            }
            Statement::Print { expression, line } => {
                let value = self.evaluate(expression)?;
                writeln!(self.stdout.borrow_mut(), "{}", value).at(*line)?;
            }
            Statement::Assert { expression, line } => {
                if !self.evaluate(expression)?.is_truthy() {
                    return Err(RuntimeErrorKind::AssertionFailed).at(*line);
                }
            }
            Statement::VarDeclaration {
                name,
                initializer,
                line,
            } => {
                let value = match initializer {
                    Some(initializer) => self.evaluate(initializer)?,
                    None => Value::Nil,
                };
                self.environment
                    .borrow_mut()
                    .define(name.clone(), value)
                    .at(*line)?;
            }
            Statement::FunctionDeclaration(declaration) => {
                let function = Callable::Function(Function {
                    declaration: declaration.clone(),
                    closure: self.environment.clone(),
                });
                self.environment
                    .borrow_mut()
                    .define(declaration.name.clone(), Value::Callable(Rc::new(function)))
                    .at(declaration.line)?;
            }
            Statement::Block(statements) => {
                let environment = Environment::boxed(Some(self.environment.clone()));
                return self.execute_block(statements, environment);
            }
            Statement::If(condition, then_branch, else_branch) => {
                if self.evaluate(condition)?.is_truthy() {
                    return self.execute(then_branch);
                } else if let Some(else_branch) = else_branch {
                    return self.execute(else_branch);
                }
            }
            Statement::While(condition, body) => {
                while self.evaluate(condition)?.is_truthy() {
                    if let Completion::Return(value) = self.execute(body)? {
                        return Ok(Completion::Return(value));
                    }
                }
            }
            Statement::Return { value, .. } => {
                let value = match value {
                    Some(value) => self.evaluate(value)?,
                    None => Value::Nil,
                };
                return Ok(Completion::Return(value));
            }
            Statement::End => self.done = true,
        }

        Ok(Completion::Normal)
    }

    /// Runs `statements` with `environment` as the current scope.
    pub(crate) fn execute_block(
        &mut self,
        statements: &[Statement],
        environment: Rc<RefCell<Environment>>,
    ) -> Result<Completion, RuntimeError> {
        self.execute_in_scope(environment, |interpreter| {
            for statement in statements {
                if let Completion::Return(value) = interpreter.execute(statement)? {
                    return Ok(Completion::Return(value));
                }
            }
            Ok(Completion::Normal)
        })
    }

    /// The previous scope is restored however `f` finishes.
    fn execute_in_scope<T>(
        &mut self,
        environment: Rc<RefCell<Environment>>,
        f: impl FnOnce(&mut Self) -> Result<T, RuntimeError>,
    ) -> Result<T, RuntimeError> {
        let prev = std::mem::replace(&mut self.environment, environment);
        let result = f(self);
        self.environment = prev;
        result
    }

    fn evaluate(&mut self, expression: &Expression) -> Result<Value, RuntimeError> {
        match expression {
            Expression::Literal(literal) => Ok(literal.into()),
            Expression::Grouping(expression) => self.evaluate(expression),
            Expression::Variable { id, name, line } => self.look_up(*id, name).at(*line),
            Expression::Assign {
                id,
                name,
                value,
                line,
            } => {
                let value = self.evaluate(value)?;
                let assigned = match self.locals.get(id) {
                    Some(&distance) => {
                        Environment::assign_at(&self.environment, distance, name, value.clone())
                    }
                    None => self.globals.borrow_mut().assign(name, value.clone()),
                };
                assigned.at(*line)?;
                Ok(value)
            }
            Expression::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                let short_circuit = match operator {
                    LogicalOperator::Or => left.is_truthy(),
                    LogicalOperator::And => !left.is_truthy(),
                };
                if short_circuit {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }
            Expression::Unary {
                operator,
                right,
                line,
            } => {
                let right = self.evaluate(right)?;
                match operator {
                    UnaryOperator::Negate => right
                        .as_number()
                        .map(|n| Value::Number(-n))
                        .ok_or(RuntimeErrorKind::OperandNumber)
                        .at(*line),
                    UnaryOperator::Not => Ok(Value::Boolean(!right.is_truthy())),
                }
            }
            Expression::Binary {
                left,
                operator,
                right,
                line,
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                binary(*operator, left, right).at(*line)
            }
            Expression::Call {
                callee,
                arguments,
                line,
            } => {
                let callee = self.evaluate(callee)?;
                let arguments = arguments
                    .iter()
                    .map(|argument| self.evaluate(argument))
                    .collect::<Result<Vec<_>, _>>()?;

                let Value::Callable(callable) = callee else {
                    return Err(RuntimeErrorKind::NotCallable).at(*line);
                };
                if arguments.len() != callable.arity() {
                    return Err(RuntimeErrorKind::Arity {
                        expected: callable.arity(),
                        got: arguments.len(),
                    })
                    .at(*line);
                }

                callable.call(self, arguments, *line)
            }
        }
    }

    /// Resolved names are read at their recorded distance, the rest from globals.
    fn look_up(&self, id: ExprId, name: &str) -> Result<Value, RuntimeErrorKind> {
        match self.locals.get(&id) {
            Some(&distance) => Environment::get_at(&self.environment, distance, name),
            None => self.globals.borrow().get(name),
        }
    }
}

fn binary(operator: InfixOperator, left: Value, right: Value) -> Result<Value, RuntimeErrorKind> {
    let numbers = |left: &Value, right: &Value| -> Result<(f64, f64), RuntimeErrorKind> {
        let a = left.as_number().ok_or(RuntimeErrorKind::LeftOperandNumber)?;
        let b = right
            .as_number()
            .ok_or(RuntimeErrorKind::RightOperandNumber)?;
        Ok((a, b))
    };

    let value = match operator {
        InfixOperator::Equal => Value::Boolean(left == right),
        InfixOperator::NotEqual => Value::Boolean(left != right),
        InfixOperator::Plus => match (left, right) {
            (Value::Number(a), Value::Number(b)) => Value::Number(a + b),
            (Value::Number(_), _) => return Err(RuntimeErrorKind::RightOperandNumber),
            (Value::String(a), Value::String(b)) => Value::String(a + &b),
            (Value::String(_), _) => return Err(RuntimeErrorKind::RightOperandString),
            _ => return Err(RuntimeErrorKind::LeftOperandNumberOrString),
        },
        InfixOperator::Minus => {
            let (a, b) = numbers(&left, &right)?;
            Value::Number(a - b)
        }
        InfixOperator::Multiply => {
            let (a, b) = numbers(&left, &right)?;
            Value::Number(a * b)
        }
        InfixOperator::Divide => {
            let (a, b) = numbers(&left, &right)?;
            Value::Number(a / b)
        }
        InfixOperator::LessThan => {
            let (a, b) = numbers(&left, &right)?;
            Value::Boolean(a < b)
        }
        InfixOperator::LessThanOrEqual => {
            let (a, b) = numbers(&left, &right)?;
            Value::Boolean(a <= b)
        }
        InfixOperator::GreaterThan => {
            let (a, b) = numbers(&left, &right)?;
            Value::Boolean(a > b)
        }
        InfixOperator::GreaterThanOrEqual => {
            let (a, b) = numbers(&left, &right)?;
            Value::Boolean(a >= b)
        }
    };

    Ok(value)
}
