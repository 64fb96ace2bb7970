//! Script handles to engine variables
//!
//! A [`Property`] is either unbound, the owner of a variable it created, or a
//! weak reference to a variable owned by something else (usually a game
//! object). Reads on an unbound property return `false`, `-1.0` or `""`;
//! writes are ignored.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use lumen_world::{EngineRef, VarValue, Variable};

use crate::value::Value;

/// Value category seen by scripts. Integers and reals are both numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Null,
    Bool,
    Number,
    String,
}

#[derive(Debug, Default)]
enum Binding {
    #[default]
    Null,
    Creator(Rc<RefCell<Variable>>),
    Reference(Weak<RefCell<Variable>>),
}

#[derive(Debug, Default)]
pub struct Property {
    binding: Binding,
}

impl Property {
    /// An unbound property
    pub fn null() -> Self {
        Self::default()
    }

    /// A property owning a new variable
    pub fn new(name: impl Into<String>, value: impl Into<VarValue>) -> Self {
        Self {
            binding: Binding::Creator(Rc::new(RefCell::new(Variable::new(name, value)))),
        }
    }

    /// A property viewing a variable owned elsewhere
    pub fn reference(variable: &Rc<RefCell<Variable>>) -> Self {
        Self {
            binding: Binding::Reference(Rc::downgrade(variable)),
        }
    }

    pub(crate) fn variable(&self) -> Option<Rc<RefCell<Variable>>> {
        match &self.binding {
            Binding::Null => None,
            Binding::Creator(var) => Some(var.clone()),
            Binding::Reference(weak) => weak.upgrade(),
        }
    }

    /// Whether the property has no live variable behind it
    pub fn is_null(&self) -> bool {
        self.variable().is_none()
    }

    /// Whether this property owns its variable
    pub fn is_creator(&self) -> bool {
        matches!(self.binding, Binding::Creator(_))
    }

    pub fn name(&self) -> String {
        self.variable()
            .map(|v| v.borrow().name().to_string())
            .unwrap_or_default()
    }

    pub fn kind(&self) -> PropertyKind {
        match self.variable() {
            None => PropertyKind::Null,
            Some(var) => match var.borrow().value() {
                VarValue::Bool(_) => PropertyKind::Bool,
                VarValue::Int(_) | VarValue::Real(_) => PropertyKind::Number,
                VarValue::String(_) => PropertyKind::String,
            },
        }
    }

    pub fn to_bool(&self) -> bool {
        self.variable().map(|v| v.borrow().as_bool()).unwrap_or(false)
    }

    pub fn to_number(&self) -> f32 {
        self.variable().map(|v| v.borrow().as_real()).unwrap_or(-1.0)
    }

    pub fn from_bool(&self, value: bool) {
        self.assign(VarValue::Bool(value));
    }

    pub fn from_number(&self, value: f32) {
        self.assign(VarValue::Real(value));
    }

    pub fn from_string(&self, value: &str) {
        self.assign(VarValue::String(value.to_string()));
    }

    /// Write a script value. Null and composite values are ignored.
    pub fn from_value(&self, value: &Value) {
        if let Some(value) = value.to_var_value() {
            self.assign(value);
        }
    }

    /// Current value as a script value, `Null` when unbound
    pub fn value(&self) -> Value {
        self.variable()
            .map(|v| Value::from(v.borrow().value()))
            .unwrap_or_default()
    }

    pub(crate) fn assign(&self, value: VarValue) {
        if let Some(var) = self.variable() {
            var.borrow_mut().set_value(value);
        }
    }

    pub fn is_debug(&self) -> bool {
        self.variable().is_some_and(|v| v.borrow().is_debug())
    }

    /// Show or hide the variable in the engine's debug overlay
    ///
    /// Does nothing unless the engine is initialized and the flag changes.
    pub fn make_debug(&self, engine: &EngineRef, enable: bool) {
        let Some(var) = self.variable() else {
            return;
        };
        let mut engine = engine.borrow_mut();
        if !engine.is_initialized() || var.borrow().is_debug() == enable {
            return;
        }
        var.borrow_mut().set_debug(enable);
        if enable {
            engine.debug_vars.add(&var);
        } else {
            engine.debug_vars.remove(&var);
        }
    }
}

/// Cloning takes a snapshot: the copy owns a new variable with the same
/// name and value.
impl Clone for Property {
    fn clone(&self) -> Self {
        match self.variable() {
            Some(var) => {
                let var = var.borrow();
                Self::new(var.name(), var.value().clone())
            }
            None => Self::null(),
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.variable() {
            Some(var) => f.write_str(&var.borrow().as_string()),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_world::Engine;

    #[test]
    fn test_null_defaults() {
        let p = Property::null();
        assert_eq!(p.kind(), PropertyKind::Null);
        assert!(!p.to_bool());
        assert_eq!(p.to_number(), -1.0);
        assert_eq!(p.to_string(), "");
        assert_eq!(p.name(), "");

        p.from_number(3.0);
        assert_eq!(p.to_number(), -1.0);
    }

    #[test]
    fn test_kinds_collapse_numbers() {
        assert_eq!(Property::new("i", 3).kind(), PropertyKind::Number);
        assert_eq!(Property::new("r", 0.5f32).kind(), PropertyKind::Number);
        assert_eq!(Property::new("b", true).kind(), PropertyKind::Bool);
        assert_eq!(Property::new("s", "x").kind(), PropertyKind::String);
    }

    #[test]
    fn test_reference_dies_with_target() {
        let var = Rc::new(RefCell::new(Variable::new("hp", 10)));
        let p = Property::reference(&var);
        p.from_number(4.0);
        assert_eq!(var.borrow().as_real(), 4.0);
        assert!(!p.is_creator());

        drop(var);
        assert!(p.is_null());
        assert_eq!(p.to_number(), -1.0);
    }

    #[test]
    fn test_clone_is_snapshot() {
        let var = Rc::new(RefCell::new(Variable::new("score", 1)));
        let reference = Property::reference(&var);
        let snapshot = reference.clone();

        reference.from_number(99.0);
        assert_eq!(snapshot.to_number(), 1.0);
        assert_eq!(snapshot.name(), "score");
        assert!(snapshot.is_creator());
    }

    #[test]
    fn test_make_debug_requires_initialized_engine() {
        let engine = Engine::new_ref();
        let p = Property::new("speed", 2.0f32);

        p.make_debug(&engine, true);
        assert!(!p.is_debug());

        engine.borrow_mut().initialize();
        p.make_debug(&engine, true);
        assert!(p.is_debug());
        assert_eq!(engine.borrow().debug_vars.variables().len(), 1);

        p.make_debug(&engine, false);
        assert!(engine.borrow().debug_vars.variables().is_empty());
    }
}
