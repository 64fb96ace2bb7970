//! Lumen engine object model
//!
//! The engine context ([`Engine`]) owns scenes, game objects, meshes and the
//! named registries (groups, animation clips, materials, HUDs, scripts).
//! Everything is addressed through generation-checked [`Handle`]s, so a
//! handle to something that was destroyed simply resolves to nothing.
//!
//! # Modules
//!
//! - [`engine`]: The context, lifecycle and frame stepping
//! - [`handle`]: Generational arenas
//! - [`object`], [`scene`], [`mesh`]: The object model
//! - [`package`]: Package descriptions and installed-package records
//! - [`transform`]: Transform math and spaces

pub mod animation;
pub mod debug;
pub mod engine;
mod error;
pub mod group;
pub mod handle;
pub mod hud;
mod install;
pub mod material;
pub mod mesh;
pub mod message;
pub mod object;
pub mod package;
pub mod scene;
mod spatial;
pub mod transform;
pub mod user_defs;
pub mod variable;
pub mod window;

pub use engine::{step, Engine, EngineListener, EngineRef, InstanceAction};
pub use error::{Error, Result};
pub use handle::{Arena, Handle};
pub use object::{GameObject, MeshId, ObjectId, ObjectKind, ObjectType};
pub use scene::{Scene, SceneId};
pub use spatial::{Ray, PICK_RAY_LENGTH};
pub use transform::{Transform, TransformSpace};
pub use user_defs::{RenderSystem, UserDefs};
pub use variable::{VarValue, Variable};

/// Re-export so dependents use the same input types
pub use devices;
