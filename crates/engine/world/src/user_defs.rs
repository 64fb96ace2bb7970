//! Engine configuration values

use glam::{Vec2, Vec3};

/// Render backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum RenderSystem {
    #[default]
    OpenGl = 0,
    Direct3D9 = 1,
    Direct3D10 = 2,
    Direct3D11 = 3,
    OpenGlEs = 4,
}

impl RenderSystem {
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::OpenGl),
            1 => Some(Self::Direct3D9),
            2 => Some(Self::Direct3D10),
            3 => Some(Self::Direct3D11),
            4 => Some(Self::OpenGlEs),
            _ => None,
        }
    }

    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

/// Runtime configuration read by the engine on initialize and whenever it
/// is re-applied
#[derive(Debug, Clone, PartialEq)]
pub struct UserDefs {
    pub render_system: RenderSystem,
    pub scene_manager: i32,
    pub verbose: bool,
    pub win_size: Vec2,
    pub win_title: String,
    pub fullscreen: bool,
    pub blender_mat: bool,
    pub mat_blending: bool,
    pub grab_input: bool,
    pub debug_fps: bool,
    pub debug_physics: bool,
    pub debug_physics_aabb: bool,
    pub use_bullet_dbvt: bool,
    pub show_debug_props: bool,
    pub debug_sounds: bool,
    pub enable_shadows: bool,
    pub shadow_technique: String,
    pub colour_shadow: Vec3,
    pub far_distance_shadow: f32,
}

impl Default for UserDefs {
    fn default() -> Self {
        Self {
            render_system: RenderSystem::OpenGl,
            scene_manager: 0,
            verbose: false,
            win_size: Vec2::new(800.0, 600.0),
            win_title: "Lumen".to_string(),
            fullscreen: false,
            blender_mat: false,
            mat_blending: false,
            grab_input: false,
            debug_fps: false,
            debug_physics: false,
            debug_physics_aabb: false,
            use_bullet_dbvt: true,
            show_debug_props: false,
            debug_sounds: false,
            enable_shadows: false,
            shadow_technique: "stencilmodulative".to_string(),
            colour_shadow: Vec3::splat(0.8),
            far_distance_shadow: 0.0,
        }
    }
}
