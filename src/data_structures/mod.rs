//! Engine data structures: meshes, textures, transforms and lights.
//!
//! - `model` holds vertex formats and GPU meshes
//! - `texture` wraps GPU textures and the bounded texture registry
//! - `transform` is the position/rotation/scale shared by lights and instances
//! - `light` defines directional, point and spot lights and their uniform layout
//! - `uniform` packs named shader uniforms into WGSL-compatible bytes

pub mod light;
pub mod model;
pub mod texture;
pub mod transform;
pub mod uniform;
