//! Per-frame keyboard handling for the demo.
//!
//! Keys are sampled by state once per frame, so holding a key acts every
//! frame and there is no edge detection or key repeat.

use cgmath::{Vector3, Zero};
use winit::keyboard::KeyCode;

use crate::{camera::Camera, config::ControlSettings, data_structures::light::Light, input::Input};

/// Turns and zooms the camera for this frame.
///
/// With `raw_motion` the accumulated device motion is used. Without it (the
/// cursor could not be grabbed) the camera follows the cursor position
/// instead.
pub fn look(input: &Input, camera: &mut Camera, settings: &ControlSettings, raw_motion: bool) {
    if raw_motion {
        let (dx, dy) = input.mouse_delta();
        if dx != 0.0 || dy != 0.0 {
            camera.apply_mouse_delta(dx, dy, settings.mouse_sensitivity);
        }
    } else if let Some((x, y)) = input.cursor() {
        camera.apply_cursor(x, y, settings.mouse_sensitivity);
    }
    let scroll = input.scroll();
    if scroll != 0.0 {
        camera.modify_fov_h(-scroll * settings.scroll_fov_step);
    }
}

/// Camera translation for this frame.
pub fn movement(input: &Input, camera: &Camera, settings: &ControlSettings, dt: f64) -> Vector3<f32> {
    let speed = if input.is_down(KeyCode::ControlLeft) {
        settings.move_speed * settings.slow_multiplier
    } else if input.is_down(KeyCode::ShiftLeft) {
        settings.move_speed * settings.fast_multiplier
    } else {
        settings.move_speed
    };

    let axis = |positive: KeyCode, negative: KeyCode| -> f32 {
        input.is_down(positive) as i8 as f32 - input.is_down(negative) as i8 as f32
    };
    let direction = camera.forward() * axis(KeyCode::KeyW, KeyCode::KeyS)
        + camera.right() * axis(KeyCode::KeyD, KeyCode::KeyA)
        + camera.up() * axis(KeyCode::Space, KeyCode::KeyC);

    if direction.is_zero() {
        return direction;
    }
    direction * speed * dt as f32
}

/// Everything besides movement the keyboard asked for this frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameCommands {
    pub polygon_mode: Option<wgpu::PolygonMode>,
    pub close: bool,
    /// Change of the spot light cone angle in degrees.
    pub spot_angle: f32,
    pub spot_blur: f32,
}

impl FrameCommands {
    pub fn sample(input: &Input, settings: &ControlSettings) -> Self {
        let axis = |positive: KeyCode, negative: KeyCode| -> f32 {
            input.is_down(positive) as i8 as f32 - input.is_down(negative) as i8 as f32
        };
        let polygon_mode = if input.is_down(KeyCode::F1) {
            Some(wgpu::PolygonMode::Fill)
        } else if input.is_down(KeyCode::F2) {
            Some(wgpu::PolygonMode::Line)
        } else {
            None
        };
        Self {
            polygon_mode,
            close: input.is_down(KeyCode::End),
            spot_angle: axis(KeyCode::KeyT, KeyCode::KeyG) * settings.spot_angle_step,
            spot_blur: axis(KeyCode::KeyY, KeyCode::KeyH) * settings.spot_blur_step,
        }
    }

    /// Applies the angle and blur changes to `spot`. A change that would leave
    /// the valid range is skipped rather than clamped, so holding a key stops
    /// at the last value inside the range.
    pub fn apply_to_spot(&self, spot: &mut Light) {
        let angle = spot.angle_raw() + self.spot_angle;
        if self.spot_angle != 0.0 && (0.0..=90.0).contains(&angle) {
            spot.set_angle(angle);
        }
        let blur = spot.blur_raw() + self.spot_blur;
        if self.spot_blur != 0.0 && blur > 0.0 && blur <= 1.0 {
            spot.set_blur(blur);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_keys_no_movement() {
        let input = Input::new();
        let camera = Camera::default();
        let moved = movement(&input, &camera, &ControlSettings::default(), 0.016);
        assert!(moved.is_zero());
    }
}
