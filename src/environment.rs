use crate::error::RuntimeError;
use crate::token::Token;
use crate::value::Value;
use log::trace;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared handle to a scope record.  Blocks, calls and closures all hold one.
pub type Env = Rc<RefCell<Environment>>;

/// One lexical scope: bindings plus the scope that was active when it was created.
#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<Env>,
}

impl Environment {
    /// A root scope (the globals).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enclosing(enclosing: Env) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Convenience for `Rc::new(RefCell::new(..))`.
    pub fn shared(self) -> Env {
        Rc::new(RefCell::new(self))
    }

    pub fn enclosing(&self) -> Option<Env> {
        self.enclosing.clone()
    }

    /// Binds `name` in this scope, overwriting any existing binding here.
    pub fn define(&mut self, name: &str, value: Value) {
        trace!("define '{}'", name);
        self.values.insert(name.to_string(), value);
    }

    /// Looks `name` up here, then outward.
    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        if let Some(value) = self.values.get(&name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(undefined(name))
        }
    }

    /// Rebinds the nearest existing `name`; never creates one.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(undefined(name))
        }
    }

    /// The scope exactly `distance` links outward (`0` is `env` itself).
    ///
    /// Walking past the root is reported as an undefined variable: it can
    /// only happen if a resolved distance disagrees with the live chain.
    pub fn ancestor(env: &Env, distance: usize, name: &Token) -> Result<Env, RuntimeError> {
        let mut current: Env = Rc::clone(env);

        for _ in 0..distance {
            let next: Option<Env> = current.borrow().enclosing();
            current = next.ok_or_else(|| undefined(name))?;
        }

        Ok(current)
    }

    /// Direct lookup in the scope `distance` links outward.
    pub fn get_at(env: &Env, distance: usize, name: &Token) -> Result<Value, RuntimeError> {
        let scope: Env = Self::ancestor(env, distance, name)?;
        let value: Option<Value> = scope.borrow().values.get(&name.lexeme).cloned();

        value.ok_or_else(|| undefined(name))
    }

    /// Direct assignment in the scope `distance` links outward.
    pub fn assign_at(
        env: &Env,
        distance: usize,
        name: &Token,
        value: Value,
    ) -> Result<(), RuntimeError> {
        let scope: Env = Self::ancestor(env, distance, name)?;
        scope.borrow_mut().values.insert(name.lexeme.clone(), value);
        Ok(())
    }
}

fn undefined(name: &Token) -> RuntimeError {
    RuntimeError::new(name, format!("Undefined variable '{}'.", name.lexeme))
}
