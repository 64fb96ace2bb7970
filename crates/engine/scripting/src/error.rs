//! Error types for the scripting layer

use thiserror::Error;

/// Result type for scripting operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the scripting layer
#[derive(Error, Debug)]
pub enum Error {
    /// KDL parsing error
    #[error("KDL parse error: {0}")]
    KdlParse(#[from] kdl::KdlError),

    /// Lua error
    #[error("Lua error: {0}")]
    Lua(#[from] mlua::Error),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Engine object model error
    #[error(transparent)]
    World(#[from] lumen_world::Error),

    /// Type conversion error
    #[error("Type error: expected {expected}, got {actual}")]
    TypeError { expected: String, actual: String },

    /// Invalid value
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Script not found in the engine's script registry or on disk
    #[error("Script not found: {0}")]
    ScriptNotFound(String),

    /// Joystick index outside the attached joysticks
    #[error("Joystick index {index} out of range (count {count})")]
    JoystickIndex { index: i32, count: usize },

    /// Malformed package file
    #[error("Package {path}: {message}")]
    Package { path: String, message: String },
}
