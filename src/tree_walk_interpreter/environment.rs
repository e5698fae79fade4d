use std::{cell::RefCell, collections::hash_map::Entry, fmt::Debug, rc::Rc};

use rustc_hash::FxHashMap;

use super::{RuntimeErrorKind, Value};

/// One level of variable bindings, chained to the enclosing level.
///
/// Shared as `Rc<RefCell<Environment>>` between the interpreter's current
/// scope and every closure created while it was current.
#[derive(Default)]
pub struct Environment {
    values: FxHashMap<String, Value>,
    parent: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    pub fn new(parent: Option<Rc<RefCell<Environment>>>) -> Self {
        Self {
            values: FxHashMap::default(),
            parent,
        }
    }

    pub fn with_values(
        values: FxHashMap<String, Value>,
        parent: Option<Rc<RefCell<Environment>>>,
    ) -> Self {
        Self { values, parent }
    }

    pub fn boxed(parent: Option<Rc<RefCell<Environment>>>) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new(parent)))
    }

    pub fn define(&mut self, name: String, value: Value) -> Result<(), RuntimeErrorKind> {
        match self.values.entry(name) {
            Entry::Occupied(o) => Err(RuntimeErrorKind::AlreadyDeclared(o.key().clone())),
            Entry::Vacant(v) => {
                v.insert(value);
                Ok(())
            }
        }
    }

    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), RuntimeErrorKind> {
        if let Some(slot) = self.values.get_mut(name) {
            *slot = value;
            return Ok(());
        }
        match &self.parent {
            Some(parent) => parent.borrow_mut().assign(name, value),
            None => Err(RuntimeErrorKind::NotDeclared(name.to_string())),
        }
    }

    pub fn get(&self, name: &str) -> Result<Value, RuntimeErrorKind> {
        if let Some(value) = self.values.get(name) {
            return Ok(value.clone());
        }
        match &self.parent {
            Some(parent) => parent.borrow().get(name),
            None => Err(RuntimeErrorKind::NotDefined(name.to_string())),
        }
    }

    /// Reads `name` from the environment exactly `distance` levels up,
    /// without looking further.
    pub fn get_at(
        env: &Rc<RefCell<Environment>>,
        distance: usize,
        name: &str,
    ) -> Result<Value, RuntimeErrorKind> {
        let not_defined = || RuntimeErrorKind::NotDefined(name.to_string());
        let ancestor = Self::ancestor(env, distance).ok_or_else(not_defined)?;
        let ancestor = ancestor.borrow();
        ancestor.values.get(name).cloned().ok_or_else(not_defined)
    }

    pub fn assign_at(
        env: &Rc<RefCell<Environment>>,
        distance: usize,
        name: &str,
        value: Value,
    ) -> Result<(), RuntimeErrorKind> {
        let not_declared = || RuntimeErrorKind::NotDeclared(name.to_string());
        let ancestor = Self::ancestor(env, distance).ok_or_else(not_declared)?;
        let mut ancestor = ancestor.borrow_mut();
        let slot = ancestor.values.get_mut(name).ok_or_else(not_declared)?;
        *slot = value;
        Ok(())
    }

    fn ancestor(
        env: &Rc<RefCell<Environment>>,
        distance: usize,
    ) -> Option<Rc<RefCell<Environment>>> {
        let mut env = env.clone();
        for _ in 0..distance {
            let parent = env.borrow().parent.clone()?;
            env = parent;
        }
        Some(env)
    }
}

impl Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.values.keys().collect();
        names.sort();
        f.debug_struct(format!("Environment<{:?}>", std::ptr::from_ref(self)).as_str())
            .field("names", &names)
            .field("parent", &self.parent.as_ref().map(|p| p.as_ptr()))
            .finish()
    }
}
