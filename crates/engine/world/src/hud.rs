//! Heads-up display overlays

use glam::Vec2;
use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq)]
pub struct HudElement {
    pub name: String,
    pub visible: bool,
    pub value: String,
    pub uv: [f32; 4],
    pub material_name: String,
    pub material_alpha: f32,
    pub alpha_reject: i32,
    pub alpha_reject_greater: bool,
    pub parameters: IndexMap<String, String>,
    pub position: Vec2,
}

impl HudElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            value: String::new(),
            uv: [0.0, 0.0, 1.0, 1.0],
            material_name: String::new(),
            material_alpha: 1.0,
            alpha_reject: 0,
            alpha_reject_greater: true,
            parameters: IndexMap::new(),
            position: Vec2::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    pub name: String,
    pub visible: bool,
    pub elements: IndexMap<String, HudElement>,
}

impl Hud {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible: false,
            elements: IndexMap::new(),
        }
    }

    pub fn add_element(&mut self, element: HudElement) {
        self.elements.insert(element.name.clone(), element);
    }
}
