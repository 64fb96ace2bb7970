//! Dynamic values crossing the script boundary

use crate::{Error, Result};
use glam::Vec3;
use lumen_world::VarValue;

/// A value passed in from a script or a configuration file
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Null/empty value
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Vec3(Vec3),
    Array(Vec<Value>),
}

impl Value {
    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Vec3(_) => "vec3",
            Value::Array(_) => "array",
        }
    }

    fn type_error(&self, expected: &str) -> Error {
        Error::TypeError {
            expected: expected.to_string(),
            actual: self.type_name().to_string(),
        }
    }

    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            _ => Err(self.type_error("bool")),
        }
    }

    pub fn as_i64(&self) -> Result<i64> {
        match self {
            Value::Int(i) => Ok(*i),
            Value::Float(f) => Ok(*f as i64),
            _ => Err(self.type_error("int")),
        }
    }

    pub fn as_f64(&self) -> Result<f64> {
        match self {
            Value::Float(f) => Ok(*f),
            Value::Int(i) => Ok(*i as f64),
            _ => Err(self.type_error("float")),
        }
    }

    pub fn as_f32(&self) -> Result<f32> {
        self.as_f64().map(|f| f as f32)
    }

    pub fn as_str(&self) -> Result<&str> {
        match self {
            Value::String(s) => Ok(s.as_str()),
            _ => Err(self.type_error("string")),
        }
    }

    /// Vec3, or a three element numeric array
    pub fn as_vec3(&self) -> Result<Vec3> {
        match self {
            Value::Vec3(v) => Ok(*v),
            Value::Array(arr) if arr.len() == 3 => {
                Ok(Vec3::new(arr[0].as_f32()?, arr[1].as_f32()?, arr[2].as_f32()?))
            }
            _ => Err(self.type_error("vec3")),
        }
    }

    pub fn as_array(&self) -> Result<&[Value]> {
        match self {
            Value::Array(arr) => Ok(arr.as_slice()),
            _ => Err(self.type_error("array")),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Convert to a variable payload. Null and composite values have none.
    pub fn to_var_value(&self) -> Option<VarValue> {
        match self {
            Value::Bool(b) => Some(VarValue::Bool(*b)),
            Value::Int(i) => Some(VarValue::Int(*i as i32)),
            Value::Float(f) => Some(VarValue::Real(*f as f32)),
            Value::String(s) => Some(VarValue::String(s.clone())),
            Value::Null | Value::Vec3(_) | Value::Array(_) => None,
        }
    }
}

impl From<&VarValue> for Value {
    fn from(v: &VarValue) -> Self {
        match v {
            VarValue::Bool(b) => Value::Bool(*b),
            VarValue::Int(i) => Value::Int(*i as i64),
            VarValue::Real(r) => Value::Float(*r as f64),
            VarValue::String(s) => Value::String(s.clone()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f as f64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Vec3> for Value {
    fn from(v: Vec3) -> Self {
        Value::Vec3(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_conversions() {
        let v = Value::from(42i32);
        assert_eq!(v.as_i64().unwrap(), 42);
        assert_eq!(v.as_f64().unwrap(), 42.0);

        let v = Value::from("hello");
        assert_eq!(v.as_str().unwrap(), "hello");
        assert!(v.as_bool().is_err());
    }

    #[test]
    fn test_vec3_from_array() {
        let v = Value::Array(vec![Value::from(1.0f32), Value::from(2i32), Value::from(3.0f64)]);
        assert_eq!(v.as_vec3().unwrap(), Vec3::new(1.0, 2.0, 3.0));
        assert!(Value::Array(vec![Value::Null]).as_vec3().is_err());
    }

    #[test]
    fn test_var_value_mapping() {
        assert_eq!(Value::from(2.5f64).to_var_value(), Some(VarValue::Real(2.5)));
        assert_eq!(Value::Null.to_var_value(), None);
        assert_eq!(Value::from(&VarValue::Int(7)), Value::Int(7));
    }
}
