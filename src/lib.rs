//! learn-ngin
//!
//! A small real-time 3D renderer following the LearnOpenGL lessons on top of
//! winit and wgpu. An application implements [`application::Project`] and
//! hands it to [`application::run`], which owns the window, the frame loop
//! and the [`renderer::Renderer`] with its meshes, shaders, textures and
//! lights.
//!
//! High-level modules
//! - `application`: window, event loop, frame loop and the `Project` hooks
//! - `camera`: free-look camera and its uniform
//! - `config`: window, timing and control settings
//! - `context`: surface, device and queue
//! - `controls`: keyboard movement and demo key bindings
//! - `data_structures`: meshes, textures, transforms, lights, uniform blocks
//! - `input`: keyboard and mouse state
//! - `pipelines`: render pipeline and bind group helpers
//! - `renderer`: scene ownership and draw submission
//! - `resources`: loading assets from disk
//! - `shader`: vertex + fragment programs with named uniforms
//! - `timing`: frame timer and fixed-step accumulator
//!

pub mod application;
pub mod camera;
pub mod config;
pub mod context;
pub mod controls;
pub mod data_structures;
pub mod error;
pub mod input;
pub mod pipelines;
pub mod renderer;
pub mod resources;
pub mod shader;
pub mod timing;

// Re-exports commonly used types for convenience in downstream code.
pub use application::{AppContext, Project, run};
pub use config::{AppConfig, ControlSettings};
pub use error::EngineError;
pub use cgmath;
pub use wgpu;
pub use winit;
