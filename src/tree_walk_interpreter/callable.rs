use std::{cell::RefCell, fmt::Display, rc::Rc};

use tracing::trace;

use crate::ast::FunctionDecl;

use super::{
    environment::Environment, AtLine, Completion, Interpreter, RuntimeError, RuntimeErrorKind,
    Value, MAX_CALL_DEPTH,
};

/// A user-defined function together with the environment it was declared in.
#[derive(Clone)]
pub struct Function {
    pub declaration: Rc<FunctionDecl>,
    pub closure: Rc<RefCell<Environment>>,
}

impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.declaration.name)
            .field("params", &self.declaration.params)
            .field("closure", &self.closure.as_ptr())
            .finish()
    }
}

impl Function {
    fn call(
        &self,
        interpreter: &mut Interpreter,
        arguments: Vec<Value>,
        line: usize,
    ) -> Result<Value, RuntimeError> {
        if interpreter.call_depth >= MAX_CALL_DEPTH {
            return Err(RuntimeErrorKind::StackOverflow).at(line);
        }

        let environment = Environment::boxed(Some(self.closure.clone()));
        {
            let mut environment = environment.borrow_mut();
            for (param, argument) in self.declaration.params.iter().zip(arguments) {
                environment
                    .define(param.clone(), argument)
                    .at(self.declaration.line)?;
            }
        }

        interpreter.call_depth += 1;
        let completion = interpreter.execute_block(&self.declaration.body, environment);
        interpreter.call_depth -= 1;

        match completion? {
            Completion::Return(value) => Ok(value),
            Completion::Normal => Ok(Value::Nil),
        }
    }
}

pub type NativeFn = fn(&[Value]) -> Result<Value, RuntimeErrorKind>;

#[derive(Debug, Clone)]
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub func: NativeFn,
}

#[derive(Debug, Clone)]
pub enum Callable {
    Function(Function),
    Native(NativeFunction),
}

impl Callable {
    /// Invokes the callable. The caller has already checked the argument count.
    ///
    /// Errors raised by a native are reported at `line`, the line of the call.
    pub fn call(
        &self,
        interpreter: &mut Interpreter,
        arguments: Vec<Value>,
        line: usize,
    ) -> Result<Value, RuntimeError> {
        trace!(callee = %self, arguments = arguments.len(), "call");
        match self {
            Callable::Function(function) => function.call(interpreter, arguments, line),
            Callable::Native(native) => (native.func)(&arguments).at(line),
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            Callable::Function(function) => function.declaration.params.len(),
            Callable::Native(native) => native.arity,
        }
    }
}

impl Display for Callable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Callable::Function(function) => write!(f, "<fn {}>", function.declaration.name),
            Callable::Native(native) => write!(f, "<native fn {}>", native.name),
        }
    }
}

/// Seconds since the Unix epoch.
pub fn clock(_: &[Value]) -> Result<Value, RuntimeErrorKind> {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    Ok(Value::Number(now.as_secs_f64()))
}
