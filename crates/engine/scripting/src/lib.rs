//! Script-facing API for Lumen
//!
//! This crate provides:
//! - **Property**: script handles to engine variables
//! - **UserDefsTable**: the engine configuration as a table of properties
//! - **Input**: mouse, keyboard and joystick handles
//! - **Proxies**: liveness-checked handles to scenes, game objects and resources
//! - **EngineFacade**: lifecycle, tick callbacks and package loading
//! - **Lua Engine**: Lua VM wrapper with the whole API installed
//!
//! # Example
//!
//! ```rust,ignore
//! use scripting::{EngineFacade, KdlReader, LuaEngine};
//!
//! let mut facade = EngineFacade::new();
//!
//! // Configuration from KDL
//! let settings = KdlReader::from_file("config/player.kdl")?;
//! KdlReader::apply(facade.user_defs(), &settings);
//! facade.initialize();
//!
//! // Scripts drive the engine through the same facade
//! let mut lua = LuaEngine::new()?;
//! lua.install_api(facade.engine())?;
//! lua.exec_file("scripts/main.lua".as_ref())?;
//! ```

pub mod api;
mod error;
pub mod facade;
pub mod input;
mod kdl_reader;
mod lua;
mod lua_engine;
pub mod package;
pub mod property;
pub mod proxy;
pub mod user_defs;
mod value;

pub use error::{Error, Result};
pub use facade::{EngineFacade, Event, TickCallback};
pub use input::{Joystick, Keyboard, Mouse, MouseSnapshot};
pub use kdl_reader::{KdlReader, Setting};
pub use lua_engine::{extract_f32, parse_quat, parse_vec3, quat_table, vec3_table, LuaEngine};
pub use package::{KdlPackageLoader, PackageLoader};
pub use property::{Property, PropertyKind};
pub use proxy::{GameObjectProxy, ObjectProxy, ProxyKind, SceneProxy};
pub use user_defs::UserDefsTable;
pub use value::Value;

// Re-export for downstream crates
pub use lumen_world;
pub use mlua;
