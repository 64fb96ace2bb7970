//! Named, dynamically typed values attached to game objects

use std::fmt;

/// The typed payload of a [`Variable`]
#[derive(Debug, Clone, PartialEq)]
pub enum VarValue {
    Bool(bool),
    Int(i32),
    Real(f32),
    String(String),
}

impl VarValue {
    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            VarValue::Bool(_) => "bool",
            VarValue::Int(_) => "int",
            VarValue::Real(_) => "real",
            VarValue::String(_) => "string",
        }
    }
}

impl fmt::Display for VarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarValue::Bool(b) => write!(f, "{}", b),
            VarValue::Int(i) => write!(f, "{}", i),
            VarValue::Real(r) => write!(f, "{}", r),
            VarValue::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for VarValue {
    fn from(b: bool) -> Self {
        VarValue::Bool(b)
    }
}

impl From<i32> for VarValue {
    fn from(i: i32) -> Self {
        VarValue::Int(i)
    }
}

impl From<f32> for VarValue {
    fn from(r: f32) -> Self {
        VarValue::Real(r)
    }
}

impl From<&str> for VarValue {
    fn from(s: &str) -> Self {
        VarValue::String(s.to_string())
    }
}

impl From<String> for VarValue {
    fn from(s: String) -> Self {
        VarValue::String(s)
    }
}

/// A named value
///
/// Setters replace both the value and its type. Getters coerce whatever is
/// stored to the requested type.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    name: String,
    value: VarValue,
    debug: bool,
}

impl Variable {
    pub fn new(name: impl Into<String>, value: impl Into<VarValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            debug: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &VarValue {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<VarValue>) {
        self.value = value.into();
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    pub fn as_bool(&self) -> bool {
        match &self.value {
            VarValue::Bool(b) => *b,
            VarValue::Int(i) => *i != 0,
            VarValue::Real(r) => *r != 0.0,
            VarValue::String(s) => {
                let s = s.trim();
                s.eq_ignore_ascii_case("true") || s.parse::<f32>().map(|n| n != 0.0).unwrap_or(false)
            }
        }
    }

    pub fn as_int(&self) -> i32 {
        match &self.value {
            VarValue::Bool(b) => *b as i32,
            VarValue::Int(i) => *i,
            VarValue::Real(r) => *r as i32,
            VarValue::String(s) => s
                .trim()
                .parse::<i32>()
                .or_else(|_| s.trim().parse::<f32>().map(|r| r as i32))
                .unwrap_or(0),
        }
    }

    pub fn as_real(&self) -> f32 {
        match &self.value {
            VarValue::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            VarValue::Int(i) => *i as f32,
            VarValue::Real(r) => *r,
            VarValue::String(s) => s.trim().parse().unwrap_or(0.0),
        }
    }

    pub fn as_string(&self) -> String {
        self.value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setter_replaces_type() {
        let mut var = Variable::new("hp", 10);
        assert_eq!(var.value().type_name(), "int");

        var.set_value("full");
        assert_eq!(var.value(), &VarValue::String("full".to_string()));
        assert_eq!(var.as_real(), 0.0);
        assert!(!var.as_bool());
    }

    #[test]
    fn test_coercions() {
        assert_eq!(Variable::new("b", true).as_real(), 1.0);
        assert_eq!(Variable::new("b", true).as_string(), "true");
        assert_eq!(Variable::new("r", 2.5f32).as_int(), 2);
        assert_eq!(Variable::new("s", " 3.5 ").as_real(), 3.5);
        assert_eq!(Variable::new("s", "7").as_int(), 7);
        assert!(Variable::new("s", "TRUE").as_bool());
        assert!(Variable::new("s", "2").as_bool());
        assert_eq!(Variable::new("r", 0.25f32).as_string(), "0.25");
    }
}
