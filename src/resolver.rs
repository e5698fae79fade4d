use rustc_hash::FxHashMap;
use tracing::trace;

use crate::{
    ast::{Expression, ExprId, FunctionDecl, Statement},
    tree_walk_interpreter::Interpreter,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BindingState {
    Declared,
    Defined,
}

#[derive(Debug, Clone, Copy)]
enum FunctionType {
    None,
    Function,
}

/// Static pass computing how many scopes separate each local reference from
/// its declaration.
///
/// Only block and function scopes are tracked. Names that resolve nowhere are
/// globals and are looked up dynamically at runtime.
pub struct Resolver {
    scopes: Vec<FxHashMap<String, BindingState>>,
    function_type: FunctionType,
    initializing_global: Option<String>,
    bindings: Vec<(ExprId, usize)>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("resolution error on line {line}: {kind}")]
pub struct ResolutionError {
    pub line: usize,
    pub kind: ResolutionErrorKind,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolutionErrorKind {
    #[error("variable with this name already declared in this scope")]
    AlreadyDeclared(String),
    #[error("cannot read local variable in its own initializer")]
    OwnInitializer(String),
    #[error("cannot return from top-level code")]
    ReturnFromTopLevel,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    pub fn new() -> Resolver {
        Resolver {
            scopes: Vec::new(),
            function_type: FunctionType::None,
            initializing_global: None,
            bindings: Vec::new(),
        }
    }

    /// Resolves one top-level statement and hands the distances to `interpreter`.
    ///
    /// Nothing is recorded when resolution fails.
    pub fn resolve(
        &mut self,
        statement: &Statement,
        interpreter: &mut Interpreter,
    ) -> Result<(), ResolutionError> {
        self.scopes.clear();
        self.function_type = FunctionType::None;
        self.initializing_global = None;
        self.bindings.clear();

        self.resolve_statement(statement)?;

        for (id, depth) in self.bindings.drain(..) {
            interpreter.resolve(id, depth);
        }
        Ok(())
    }

    fn resolve_statements(&mut self, statements: &[Statement]) -> Result<(), ResolutionError> {
        for statement in statements {
            self.resolve_statement(statement)?;
        }
        Ok(())
    }

    fn resolve_statement(&mut self, statement: &Statement) -> Result<(), ResolutionError> {
        match statement {
            Statement::Block(statements) => {
                self.begin_scope();
                let result = self.resolve_statements(statements);
                self.end_scope();
                result?;
            }
            Statement::Expression(expression) => self.resolve_expression(expression)?,
            Statement::VarDeclaration {
                name,
                initializer,
                line,
            } => {
                self.declare(name, *line)?;
                if let Some(initializer) = initializer {
                    if self.scopes.is_empty() {
                        self.initializing_global = Some(name.clone());
                    }
                    let result = self.resolve_expression(initializer);
                    self.initializing_global = None;
                    result?;
                }
                self.define(name);
            }
            Statement::FunctionDeclaration(decl) => {
                self.declare(&decl.name, decl.line)?;
                self.define(&decl.name);
                self.resolve_function(decl)?;
            }
            Statement::Print { expression, .. } | Statement::Assert { expression, .. } => {
                self.resolve_expression(expression)?
            }
            Statement::If(condition, then_branch, else_branch) => {
                self.resolve_expression(condition)?;
                self.resolve_statement(then_branch)?;
                if let Some(else_branch) = else_branch {
                    self.resolve_statement(else_branch)?;
                }
            }
            Statement::While(condition, body) => {
                self.resolve_expression(condition)?;
                self.resolve_statement(body)?;
            }
            Statement::Return { value, line } => {
                if matches!(self.function_type, FunctionType::None) {
                    return Err(ResolutionError {
                        line: *line,
                        kind: ResolutionErrorKind::ReturnFromTopLevel,
                    });
                }
                if let Some(value) = value {
                    self.resolve_expression(value)?;
                }
            }
            Statement::End => {}
        }

        Ok(())
    }

    fn resolve_expression(&mut self, expression: &Expression) -> Result<(), ResolutionError> {
        match expression {
            Expression::Variable { id, name, line } => {
                let in_own_initializer = match self.scopes.last() {
                    Some(scope) => scope.get(name) == Some(&BindingState::Declared),
                    None => self.initializing_global.as_deref() == Some(name.as_str()),
                };
                if in_own_initializer {
                    return Err(ResolutionError {
                        line: *line,
                        kind: ResolutionErrorKind::OwnInitializer(name.clone()),
                    });
                }
                self.resolve_local(*id, name);
            }
            Expression::Assign {
                id, name, value, ..
            } => {
                self.resolve_expression(value)?;
                self.resolve_local(*id, name);
            }
            Expression::Literal(_) => {}
            Expression::Grouping(expression) => self.resolve_expression(expression)?,
            Expression::Binary { left, right, .. } | Expression::Logical { left, right, .. } => {
                self.resolve_expression(left)?;
                self.resolve_expression(right)?;
            }
            Expression::Unary { right, .. } => self.resolve_expression(right)?,
            Expression::Call {
                callee, arguments, ..
            } => {
                self.resolve_expression(callee)?;
                for argument in arguments {
                    self.resolve_expression(argument)?;
                }
            }
        };

        Ok(())
    }

    fn resolve_local(&mut self, id: ExprId, name: &str) {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(name) {
                trace!(name, depth, "resolved local");
                self.bindings.push((id, depth));
                return;
            }
        }
    }

    /// Parameters and body share one scope, so a body-level `var` cannot
    /// shadow a parameter.
    fn resolve_function(&mut self, decl: &FunctionDecl) -> Result<(), ResolutionError> {
        let enclosing_function = self.function_type;
        self.function_type = FunctionType::Function;

        self.begin_scope();
        let result = self.resolve_function_scope(decl);
        self.end_scope();

        self.function_type = enclosing_function;
        result
    }

    fn resolve_function_scope(&mut self, decl: &FunctionDecl) -> Result<(), ResolutionError> {
        for parameter in &decl.params {
            self.declare(parameter, decl.line)?;
            self.define(parameter);
        }
        self.resolve_statements(&decl.body)
    }

    fn begin_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &str, line: usize) -> Result<(), ResolutionError> {
        let Some(scope) = self.scopes.last_mut() else {
            return Ok(());
        };
        if scope.contains_key(name) {
            return Err(ResolutionError {
                line,
                kind: ResolutionErrorKind::AlreadyDeclared(name.to_string()),
            });
        }
        scope.insert(name.to_string(), BindingState::Declared);
        Ok(())
    }

    fn define(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), BindingState::Defined);
        }
    }
}
