use crate::object::ObjectId;

/// A viewport rendering one scene camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub camera: Option<ObjectId>,
    pub z_order: i32,
}

/// The main render window
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
    pub viewports: Vec<Viewport>,
}

impl Window {
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            fullscreen: false,
            viewports: Vec::new(),
        }
    }

    /// Highest viewport z order, if any viewport exists
    pub fn topmost_z(&self) -> Option<i32> {
        self.viewports.iter().map(|v| v.z_order).max()
    }

    pub fn bottommost_z(&self) -> Option<i32> {
        self.viewports.iter().map(|v| v.z_order).min()
    }

    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}
