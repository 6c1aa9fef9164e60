//! Runtime configuration for the window, the frame loop and the demo controls.
//!
//! Every value has a sensible default; use the `with_*` setters to override
//! individual fields before handing the config to [`crate::application::run`].

use instant::Duration;

use crate::timing::{self, DEFAULT_FIXED_STEP};

/// Window and frame loop settings.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub fullscreen: bool,
    pub min_size: (u32, u32),
    /// Interval of `Project::fixed_update` in seconds.
    pub fixed_step: f64,
    /// Upper bound of fixed steps run in a single frame.
    pub max_fixed_steps: u32,
    /// How long a minimised window sleeps per frame instead of drawing.
    pub minimised_sleep: Duration,
    pub clear_colour: wgpu::Color,
    pub controls: ControlSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            width: 1600,
            height: 900,
            title: "OpenGL".to_string(),
            fullscreen: false,
            min_size: (320, 180),
            fixed_step: DEFAULT_FIXED_STEP,
            max_fixed_steps: 5,
            minimised_sleep: Duration::from_millis(50),
            clear_colour: wgpu::Color {
                r: 0.2,
                g: 0.2,
                b: 0.2,
                a: 1.0,
            },
            controls: ControlSettings::default(),
        }
    }
}

impl AppConfig {
    pub fn new(width: u32, height: u32, title: &str, fullscreen: bool) -> Self {
        Self {
            width,
            height,
            title: title.to_string(),
            fullscreen,
            ..Default::default()
        }
    }

    pub fn with_fixed_step(mut self, step: f64) -> Self {
        self.fixed_step = timing::checked_step(step);
        self
    }

    pub fn with_max_fixed_steps(mut self, steps: u32) -> Self {
        self.max_fixed_steps = steps.max(1);
        self
    }

    pub fn with_clear_colour(mut self, colour: wgpu::Color) -> Self {
        self.clear_colour = colour;
        self
    }

    pub fn with_controls(mut self, controls: ControlSettings) -> Self {
        self.controls = controls;
        self
    }
}

/// Tuning values for keyboard and mouse handling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlSettings {
    /// Camera units per second.
    pub move_speed: f32,
    /// Multiplier while left control is held.
    pub slow_multiplier: f32,
    /// Multiplier while left shift is held.
    pub fast_multiplier: f32,
    /// Degrees of rotation per pixel of mouse motion.
    pub mouse_sensitivity: f32,
    /// Degrees of horizontal fov per scroll notch.
    pub scroll_fov_step: f32,
    /// Degrees per frame the spot cone grows or shrinks.
    pub spot_angle_step: f32,
    /// Blur change per frame.
    pub spot_blur_step: f32,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            move_speed: 8.0,
            slow_multiplier: 0.2,
            fast_multiplier: 3.0,
            mouse_sensitivity: 0.05,
            scroll_fov_step: 3.0,
            spot_angle_step: 0.05,
            spot_blur_step: 0.005,
        }
    }
}

impl ControlSettings {
    pub fn with_move_speed(mut self, speed: f32) -> Self {
        self.move_speed = speed;
        self
    }

    pub fn with_mouse_sensitivity(mut self, sensitivity: f32) -> Self {
        self.mouse_sensitivity = sensitivity;
        self
    }
}
