//! Vitrine engine crate.
//!
//! A small real-time presentation engine: a frame ticker, an asset pipeline
//! with a single load barrier, a scene graph with per-node update hooks, and a
//! render orchestrator that composes the scene with full-screen effects.

pub mod assets;
pub mod core;
pub mod coords;
pub mod device;
pub mod effect;
pub mod error;
pub mod input;
pub mod logging;
pub mod render;
pub mod scene;
pub mod time;
pub mod window;

pub use error::{EngineError, ErrorClass, Result};
