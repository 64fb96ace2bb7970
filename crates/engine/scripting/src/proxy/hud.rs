use glam::Vec2;
use lumen_world::hud::{Hud, HudElement};
use lumen_world::EngineRef;

/// A HUD overlay, addressed by name
#[derive(Clone)]
pub struct HudProxy {
    engine: EngineRef,
    name: String,
}

impl HudProxy {
    /// Proxy for the HUD `name`, creating it hidden if it does not exist
    pub fn get_or_create(engine: EngineRef, name: &str) -> Self {
        engine.borrow_mut().hud_mut(name);
        Self {
            engine,
            name: name.to_string(),
        }
    }

    fn read<R>(&self, default: R, f: impl FnOnce(&Hud) -> R) -> R {
        self.engine.borrow().huds.get(&self.name).map(f).unwrap_or(default)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn show(&self, visible: bool) {
        if let Some(hud) = self.engine.borrow_mut().huds.get_mut(&self.name) {
            hud.visible = visible;
        }
    }

    pub fn is_visible(&self) -> bool {
        self.read(false, |h| h.visible)
    }

    pub fn child_count(&self) -> usize {
        self.read(0, |h| h.elements.len())
    }

    /// Element `name`, `None` if the HUD has no such element
    pub fn child(&self, name: &str) -> Option<HudElementProxy> {
        self.read(false, |h| h.elements.contains_key(name))
            .then(|| HudElementProxy {
                engine: self.engine.clone(),
                hud: self.name.clone(),
                element: name.to_string(),
            })
    }

    /// Add an empty element, or return the existing one
    pub fn add_child(&self, name: &str) -> Option<HudElementProxy> {
        if let Some(hud) = self.engine.borrow_mut().huds.get_mut(&self.name) {
            if !hud.elements.contains_key(name) {
                hud.add_element(HudElement::new(name));
            }
        }
        self.child(name)
    }
}

/// One element of a HUD
#[derive(Clone)]
pub struct HudElementProxy {
    engine: EngineRef,
    hud: String,
    element: String,
}

impl HudElementProxy {
    fn read<R>(&self, default: R, f: impl FnOnce(&HudElement) -> R) -> R {
        self.engine
            .borrow()
            .huds
            .get(&self.hud)
            .and_then(|h| h.elements.get(&self.element))
            .map(f)
            .unwrap_or(default)
    }

    fn edit(&self, f: impl FnOnce(&mut HudElement)) {
        if let Some(element) = self
            .engine
            .borrow_mut()
            .huds
            .get_mut(&self.hud)
            .and_then(|h| h.elements.get_mut(&self.element))
        {
            f(element);
        }
    }

    pub fn name(&self) -> &str {
        &self.element
    }

    pub fn show(&self, visible: bool) {
        self.edit(|e| e.visible = visible);
    }

    pub fn is_visible(&self) -> bool {
        self.read(false, |e| e.visible)
    }

    pub fn value(&self) -> String {
        self.read(String::new(), |e| e.value.clone())
    }

    pub fn set_value(&self, value: &str) {
        self.edit(|e| e.value = value.to_string());
    }

    /// UV rectangle as (u0, v0, u1, v1)
    pub fn uv(&self) -> [f32; 4] {
        self.read([0.0; 4], |e| e.uv)
    }

    pub fn set_uv(&self, uv: [f32; 4]) {
        self.edit(|e| e.uv = uv);
    }

    pub fn material_name(&self) -> String {
        self.read(String::new(), |e| e.material_name.clone())
    }

    pub fn set_material_name(&self, name: &str) {
        self.edit(|e| e.material_name = name.to_string());
    }

    pub fn material_alpha(&self) -> f32 {
        self.read(0.0, |e| e.material_alpha)
    }

    pub fn set_material_alpha(&self, alpha: f32) {
        self.edit(|e| e.material_alpha = alpha);
    }

    pub fn material_alpha_reject(&self) -> i32 {
        self.read(0, |e| e.alpha_reject)
    }

    /// Alpha test threshold; `greater` keeps fragments above it
    pub fn set_material_alpha_reject(&self, value: i32, greater: bool) {
        self.edit(|e| {
            e.alpha_reject = value;
            e.alpha_reject_greater = greater;
        });
    }

    pub fn parameter(&self, name: &str) -> String {
        self.read(String::new(), |e| e.parameters.get(name).cloned().unwrap_or_default())
    }

    pub fn set_parameter(&self, name: &str, value: &str) {
        self.edit(|e| {
            e.parameters.insert(name.to_string(), value.to_string());
        });
    }

    pub fn position(&self) -> Vec2 {
        self.read(Vec2::ZERO, |e| e.position)
    }

    pub fn set_position(&self, position: Vec2) {
        self.edit(|e| e.position = position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_world::Engine;

    #[test]
    fn test_hud_created_hidden() {
        let engine = Engine::new_ref();
        let hud = HudProxy::get_or_create(engine.clone(), "Overlay");
        assert!(!hud.is_visible());
        hud.show(true);
        assert!(HudProxy::get_or_create(engine.clone(), "Overlay").is_visible());
        assert_eq!(engine.borrow().huds.len(), 1);
    }

    #[test]
    fn test_elements() {
        let engine = Engine::new_ref();
        let hud = HudProxy::get_or_create(engine, "Overlay");
        assert!(hud.child("Score").is_none());

        let score = hud.add_child("Score").unwrap();
        score.set_value("42");
        score.set_uv([0.0, 0.0, 0.5, 0.5]);
        score.set_material_alpha_reject(128, false);
        score.set_parameter("font", "mono");
        score.set_position(Vec2::new(10.0, 20.0));

        let again = hud.child("Score").unwrap();
        assert_eq!(again.value(), "42");
        assert_eq!(again.uv(), [0.0, 0.0, 0.5, 0.5]);
        assert_eq!(again.material_alpha_reject(), 128);
        assert_eq!(again.parameter("font"), "mono");
        assert_eq!(again.parameter("size"), "");
        assert_eq!(again.position(), Vec2::new(10.0, 20.0));
        assert_eq!(hud.child_count(), 1);
    }
}
