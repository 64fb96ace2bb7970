//! Material registry entries and their shader parameters

use indexmap::{IndexMap, IndexSet};

/// Shader stage a parameter belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(Self::Vertex),
            1 => Some(Self::Fragment),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "vertex" => Some(Self::Vertex),
            "fragment" => Some(Self::Fragment),
            _ => None,
        }
    }
}

/// A shader constant value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShaderValue {
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Material {
    pub name: String,
    pub initialized: bool,
    /// Fragment constants the program declares
    pub declared_fragment: IndexSet<String>,
    pub vertex_params: IndexMap<String, ShaderValue>,
    pub fragment_params: IndexMap<String, ShaderValue>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set a parameter. Vertex parameters always apply, fragment ones only
    /// when declared. Returns whether the value was stored.
    pub fn set_param(&mut self, stage: ShaderStage, name: &str, value: ShaderValue) -> bool {
        match stage {
            ShaderStage::Vertex => {
                self.vertex_params.insert(name.to_string(), value);
                true
            }
            ShaderStage::Fragment if self.declared_fragment.contains(name) => {
                self.fragment_params.insert(name.to_string(), value);
                true
            }
            ShaderStage::Fragment => false,
        }
    }

    pub fn param(&self, stage: ShaderStage, name: &str) -> Option<ShaderValue> {
        match stage {
            ShaderStage::Vertex => self.vertex_params.get(name).copied(),
            ShaderStage::Fragment => self.fragment_params.get(name).copied(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_param_needs_declaration() {
        let mut mat = Material::new("Glow");
        mat.declared_fragment.insert("tint".to_string());

        assert!(mat.set_param(ShaderStage::Vertex, "wave", ShaderValue::Float(1.0)));
        assert!(!mat.set_param(ShaderStage::Fragment, "missing", ShaderValue::Float(1.0)));
        assert!(mat.set_param(ShaderStage::Fragment, "tint", ShaderValue::Vec3([1.0, 0.0, 0.0])));

        assert_eq!(mat.param(ShaderStage::Fragment, "missing"), None);
        assert_eq!(mat.param(ShaderStage::Vertex, "wave"), Some(ShaderValue::Float(1.0)));
    }
}
