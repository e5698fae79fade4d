use tracing::debug;

use crate::{
    ast::Statement,
    parser::{ParseError, Parser},
    resolver::{ResolutionError, Resolver},
    tokenizer::Tokenizer,
    tree_walk_interpreter::{Interpreter, RuntimeError, Value},
};

/// Outcome of one successful [`Session::step`].
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// A statement ran; carries its value (`nil` unless it was an expression).
    Executed(Value),
    /// The input is used up.
    Done,
}

#[derive(Debug, thiserror::Error)]
pub enum LoxError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Resolve(#[from] ResolutionError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl LoxError {
    /// Process exit code for a program that failed with this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoxError::Parse(_) | LoxError::Resolve(_) => 65,
            LoxError::Runtime(_) => 70,
        }
    }
}

/// Drives source text through parsing, resolution and execution one
/// statement at a time.
pub struct Session<I: Iterator<Item = char>> {
    parser: Parser<I>,
    resolver: Resolver,
    interpreter: Interpreter,
}

impl<'a> Session<std::str::Chars<'a>> {
    pub fn from_source(source: &'a str, interpreter: Interpreter) -> Self {
        Self::new(source.chars(), interpreter)
    }
}

impl<I: Iterator<Item = char>> Session<I> {
    pub fn new(chars: I, interpreter: Interpreter) -> Self {
        Self {
            parser: Parser::new(Tokenizer::new(chars)),
            resolver: Resolver::new(),
            interpreter,
        }
    }

    /// Parses, resolves and runs the next statement.
    ///
    /// A failed step leaves the session usable; the next call continues with
    /// the following statement.
    pub fn step(&mut self) -> Result<Step, LoxError> {
        let statement = self.next_resolved()?;
        let value = self.interpreter.interpret(&statement)?;
        if statement == Statement::End {
            return Ok(Step::Done);
        }
        Ok(Step::Executed(value))
    }

    /// Parses and resolves the next statement without running it.
    ///
    /// Returns `false` once the input is used up.
    pub fn check(&mut self) -> Result<bool, LoxError> {
        let statement = self.next_resolved()?;
        Ok(statement != Statement::End)
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    pub fn into_interpreter(self) -> Interpreter {
        self.interpreter
    }

    fn next_resolved(&mut self) -> Result<Statement, LoxError> {
        let statement = self.parser.next_statement()?;
        debug!(%statement, "parsed");
        self.resolver.resolve(&statement, &mut self.interpreter)?;
        Ok(statement)
    }
}
