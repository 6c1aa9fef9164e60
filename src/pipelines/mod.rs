//! Render pipeline building blocks.
//!
//! `basic` creates pipelines and single-buffer bind groups, `light` owns the
//! scene light uniform shared by every lit pipeline.

pub mod basic;
pub mod light;
