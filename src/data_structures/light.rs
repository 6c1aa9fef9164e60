//! Scene lights.
//!
//! A [`Light`] is a transform plus a colour. Spot lights additionally carry a
//! cone angle in degrees and an edge blur factor; both are clamped on write.

use cgmath::{Deg, Vector3};

use crate::data_structures::transform::Transform;

pub const MAX_SPOT_ANGLE: f32 = 90.0;

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightKind {
    Directional,
    Point,
    Spot,
}

#[derive(Clone, Debug)]
pub struct Light {
    kind: LightKind,
    pub transform: Transform,
    colour: Vector3<f32>,
    // spot only
    angle: f32,
    blur: f32,
}

impl Light {
    pub fn directional(direction: Vector3<f32>, colour: Vector3<f32>) -> Self {
        Self {
            kind: LightKind::Directional,
            transform: Transform::looking(Vector3::new(0.0, 0.0, 0.0), direction),
            colour,
            angle: 0.0,
            blur: 0.0,
        }
    }

    pub fn point(position: Vector3<f32>, colour: Vector3<f32>) -> Self {
        Self {
            kind: LightKind::Point,
            transform: Transform::from(position),
            colour,
            angle: 0.0,
            blur: 0.0,
        }
    }

    pub fn spot(
        position: Vector3<f32>,
        direction: Vector3<f32>,
        colour: Vector3<f32>,
        angle: f32,
        blur: f32,
    ) -> Self {
        let mut light = Self {
            kind: LightKind::Spot,
            transform: Transform::looking(position, direction),
            colour,
            angle: 0.0,
            blur: 0.0,
        };
        light.set_angle(angle);
        light.set_blur(blur);
        light
    }

    pub fn kind(&self) -> LightKind {
        self.kind
    }

    pub fn colour(&self) -> Vector3<f32> {
        self.colour
    }

    pub fn set_colour(&mut self, colour: Vector3<f32>) {
        self.colour = colour;
    }

    pub fn position(&self) -> Vector3<f32> {
        self.transform.position
    }

    pub fn direction(&self) -> Vector3<f32> {
        self.transform.forward()
    }

    /// Sets the cone half-angle in degrees, clamped to [0, 90]. Non-finite
    /// values are ignored.
    pub fn set_angle(&mut self, degrees: f32) {
        if degrees.is_finite() {
            self.angle = degrees.clamp(0.0, MAX_SPOT_ANGLE);
        } else {
            log::warn!("Ignoring non-finite spot light angle {degrees}");
        }
    }

    /// Sets the edge blur, clamped to [0, 1]. Non-finite values are ignored.
    pub fn set_blur(&mut self, blur: f32) {
        if blur.is_finite() {
            self.blur = blur.clamp(0.0, 1.0);
        } else {
            log::warn!("Ignoring non-finite spot light blur {blur}");
        }
    }

    pub fn angle_raw(&self) -> f32 {
        self.angle
    }

    pub fn blur_raw(&self) -> f32 {
        self.blur
    }

    /// Cosine of the outer cone angle, as compared against in the shader.
    pub fn cutoff(&self) -> f32 {
        cgmath::Rad::from(Deg(self.angle)).0.cos()
    }

    /// Cosine of the angle at which the blurred edge starts.
    pub fn inner_cutoff(&self) -> f32 {
        cgmath::Rad::from(Deg(self.angle * (1.0 - self.blur))).0.cos()
    }
}

pub const MAX_POINT_LIGHTS: usize = 4;
pub const MAX_SPOT_LIGHTS: usize = 2;

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DirectionalRaw {
    direction: [f32; 4],
    colour: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointRaw {
    position: [f32; 4],
    colour: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpotRaw {
    position: [f32; 4],
    direction: [f32; 4],
    colour: [f32; 4],
    // x: cos(outer), y: cos(inner)
    cutoff: [f32; 4],
}

/// Every light in the scene, laid out for the lit shader's uniform block.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightsUniform {
    directional: DirectionalRaw,
    points: [PointRaw; MAX_POINT_LIGHTS],
    spots: [SpotRaw; MAX_SPOT_LIGHTS],
    // x: directional present, y: points, z: spots
    counts: [u32; 4],
}

impl LightsUniform {
    /// Packs `lights` and returns how many did not fit. Lights beyond the
    /// per-kind capacity are dropped; only the first directional light is used.
    pub fn from_lights<'a>(lights: impl IntoIterator<Item = &'a Light>) -> (Self, usize) {
        let mut uniform = Self::default();
        let mut dropped = 0;
        for light in lights {
            let colour = light.colour().extend(1.0).into();
            match light.kind() {
                LightKind::Directional if uniform.counts[0] == 0 => {
                    uniform.directional = DirectionalRaw {
                        direction: light.direction().extend(0.0).into(),
                        colour,
                    };
                    uniform.counts[0] = 1;
                }
                LightKind::Point if (uniform.counts[1] as usize) < MAX_POINT_LIGHTS => {
                    uniform.points[uniform.counts[1] as usize] = PointRaw {
                        position: light.position().extend(1.0).into(),
                        colour,
                    };
                    uniform.counts[1] += 1;
                }
                LightKind::Spot if (uniform.counts[2] as usize) < MAX_SPOT_LIGHTS => {
                    uniform.spots[uniform.counts[2] as usize] = SpotRaw {
                        position: light.position().extend(1.0).into(),
                        direction: light.direction().extend(0.0).into(),
                        colour,
                        cutoff: [light.cutoff(), light.inner_cutoff(), 0.0, 0.0],
                    };
                    uniform.counts[2] += 1;
                }
                _ => dropped += 1,
            }
        }
        (uniform, dropped)
    }

    pub fn counts(&self) -> [u32; 3] {
        [self.counts[0], self.counts[1], self.counts[2]]
    }
}
