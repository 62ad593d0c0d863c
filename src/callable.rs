//! Callable values: user functions (named or lambda) and native functions.
//!
//! A user function owns a shared handle to its declaration and to the
//! environment that was active where it was *defined*.  Calls are parented on
//! that closure, never on the caller's environment, and every closure created
//! in one scope sees the others' later writes to it.

use std::fmt;
use std::rc::Rc;

use chrono::Utc;
use log::{debug, trace};

use crate::environment::{Env, Environment};
use crate::error::RuntimeError;
use crate::interpreter::{Flow, Interpreter};
use crate::stmt::FunctionDecl;
use crate::token::Token;
use crate::value::Value;

/// Host function signature.  Errors are plain messages; the interpreter
/// anchors them on the call's closing parenthesis.
pub type NativeFn = fn(&[Value]) -> Result<Value, String>;

#[derive(Clone)]
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub func: NativeFn,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction({}/{})", self.name, self.arity)
    }
}

/// A function value: declaration plus captured environment.
pub struct LoxFunction {
    declaration: Rc<FunctionDecl>,
    closure: Env,
}

impl LoxFunction {
    pub fn new(declaration: Rc<FunctionDecl>, closure: Env) -> Self {
        LoxFunction {
            declaration,
            closure,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.declaration.name.as_ref().map(|t| t.lexeme.as_str())
    }

    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Value>) -> Result<Value, RuntimeError> {
        let environment: Env = Environment::with_enclosing(Rc::clone(&self.closure)).shared();

        for (param, argument) in self.declaration.params.iter().zip(arguments) {
            trace!("Binding parameter '{}' to {}", param.lexeme, argument);
            environment.borrow_mut().define(&param.lexeme, argument);
        }

        match interpreter.execute_block(&self.declaration.body, environment)? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Nil),
        }
    }
}

// The closure is left out: environments can contain this very function.
impl fmt::Debug for LoxFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoxFunction")
            .field("name", &self.name())
            .field("arity", &self.declaration.arity())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub enum Callable {
    Native(NativeFunction),
    Function(Rc<LoxFunction>),
}

impl Callable {
    pub fn arity(&self) -> usize {
        match self {
            Callable::Native(native) => native.arity,
            Callable::Function(function) => function.declaration.arity(),
        }
    }

    /// Invokes the callable.  The caller has already checked the arity.
    pub fn call(
        &self,
        interpreter: &mut Interpreter,
        arguments: Vec<Value>,
        paren: &Token,
    ) -> Result<Value, RuntimeError> {
        match self {
            Callable::Native(native) => {
                debug!("Calling native function '{}'", native.name);
                (native.func)(&arguments).map_err(|message| RuntimeError::new(paren, message))
            }
            Callable::Function(function) => {
                debug!(
                    "Calling function '{}'",
                    function.name().unwrap_or("anonymous")
                );
                function.call(interpreter, arguments)
            }
        }
    }

    /// Identity comparison: the same native, or the same function value.
    pub fn same_as(&self, other: &Callable) -> bool {
        match (self, other) {
            (Callable::Native(a), Callable::Native(b)) => a.name == b.name,
            (Callable::Function(a), Callable::Function(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Native(native) => write!(f, "<native fn {}>", native.name),
            Callable::Function(function) => match function.name() {
                Some(name) => write!(f, "<fn {}>", name),
                None => write!(f, "<fn anonymous>"),
            },
        }
    }
}

/// Functions installed in every fresh global environment.
pub fn natives() -> Vec<NativeFunction> {
    vec![NativeFunction {
        name: "clock",
        arity: 0,
        func: clock,
    }]
}

/// Seconds since the Unix epoch, with millisecond precision.
fn clock(_args: &[Value]) -> Result<Value, String> {
    let millis: i64 = Utc::now().timestamp_millis();

    Ok(Value::Number(millis as f64 / 1000.0))
}
