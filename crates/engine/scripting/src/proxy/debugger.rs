use glam::Vec3;
use lumen_world::debug::DebugLine;
use lumen_world::{EngineRef, SceneId};

use super::{CurveProxy, GameObjectProxy};

/// Debug line drawing into one scene
#[derive(Clone)]
pub struct DebuggerProxy {
    engine: EngineRef,
    scene: Option<SceneId>,
}

impl DebuggerProxy {
    pub fn new(engine: EngineRef, scene: Option<SceneId>) -> Self {
        Self { engine, scene }
    }

    fn push(&self, lines: impl IntoIterator<Item = DebugLine>) {
        let mut engine = self.engine.borrow_mut();
        if let Some(scene) = self.scene.and_then(|id| engine.scene_mut(id)) {
            scene.debug_lines.extend(lines);
        }
    }

    pub fn draw_line(&self, from: Vec3, to: Vec3, color: Vec3) {
        self.push([DebugLine { from, to, color }]);
    }

    /// Draw the object's world axes (X red, Y green, Z blue) of length `size`
    pub fn draw_object_axis(&self, object: &GameObjectProxy, size: f32) {
        if object.is_null() {
            return;
        }
        let origin = object.world_position();
        let orientation = object.world_orientation();
        self.push([Vec3::X, Vec3::Y, Vec3::Z].map(|axis| DebugLine {
            from: origin,
            to: origin + orientation * axis * size,
            color: axis,
        }));
    }

    /// Draw a curve as a polyline, closed when the curve is cyclic
    pub fn draw_curve(&self, curve: &CurveProxy, color: Vec3) {
        let points = curve.world_points();
        let mut lines: Vec<DebugLine> = points
            .windows(2)
            .map(|pair| DebugLine {
                from: pair[0],
                to: pair[1],
                color,
            })
            .collect();
        if curve.is_cyclic() && points.len() > 2 {
            if let (Some(first), Some(last)) = (points.first(), points.last()) {
                lines.push(DebugLine {
                    from: *last,
                    to: *first,
                    color,
                });
            }
        }
        self.push(lines);
    }

    pub fn line_count(&self) -> usize {
        let engine = self.engine.borrow();
        self.scene
            .and_then(|id| engine.scene(id))
            .map(|s| s.debug_lines.len())
            .unwrap_or(0)
    }

    pub fn clear(&self) {
        let mut engine = self.engine.borrow_mut();
        if let Some(scene) = self.scene.and_then(|id| engine.scene_mut(id)) {
            scene.debug_lines.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_world::{Engine, ObjectKind, ObjectType};

    #[test]
    fn test_draw_and_clear() {
        let engine = Engine::new_ref();
        let (scene, curve) = {
            let mut e = engine.borrow_mut();
            let scene = e.create_scene("Main").unwrap();
            let mut kind = ObjectKind::new(ObjectType::Curve);
            if let ObjectKind::Curve(data) = &mut kind {
                data.points = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
                data.cyclic = true;
            }
            (scene, e.create_object(scene, "Path", kind).unwrap())
        };
        let debugger = DebuggerProxy::new(engine.clone(), Some(scene));
        let curve = GameObjectProxy::new(engine, Some(curve));

        debugger.draw_line(Vec3::ZERO, Vec3::ONE, Vec3::X);
        debugger.draw_object_axis(&curve, 2.0);
        debugger.draw_curve(&curve.as_curve().unwrap(), Vec3::ONE);
        assert_eq!(debugger.line_count(), 1 + 3 + 3);

        debugger.clear();
        assert_eq!(debugger.line_count(), 0);
    }
}
