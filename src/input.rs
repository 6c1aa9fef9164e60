//! Keyboard and mouse state.
//!
//! winit delivers input as events; [`Input`] folds them into plain state so the
//! frame loop can sample "is this key held right now" once per frame.

use std::collections::HashSet;

use winit::{
    event::{DeviceEvent, ElementState, MouseScrollDelta, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

/// Pixels of a touchpad scroll that count as one wheel notch.
const PIXELS_PER_LINE: f64 = 40.0;

#[derive(Debug, Default)]
pub struct Input {
    keys_down: HashSet<KeyCode>,
    mouse_delta: (f64, f64),
    scroll: f32,
    cursor: Option<(f64, f64)>,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.set_key(code, event.state == ElementState::Pressed);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.scroll += match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => (pos.y / PIXELS_PER_LINE) as f32,
                };
            }
            WindowEvent::CursorMoved { position, .. } => self.set_cursor(position.x, position.y),
            // Releases are not delivered to unfocused windows
            WindowEvent::Focused(false) => self.keys_down.clear(),
            _ => (),
        }
    }

    pub fn handle_device_event(&mut self, event: &DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            self.add_mouse_motion(*dx, *dy);
        }
    }

    pub fn set_key(&mut self, code: KeyCode, pressed: bool) {
        if pressed {
            self.keys_down.insert(code);
        } else {
            self.keys_down.remove(&code);
        }
    }

    pub fn add_mouse_motion(&mut self, dx: f64, dy: f64) {
        self.mouse_delta.0 += dx;
        self.mouse_delta.1 += dy;
    }

    pub fn set_cursor(&mut self, x: f64, y: f64) {
        self.cursor = Some((x, y));
    }

    pub fn add_scroll(&mut self, notches: f32) {
        self.scroll += notches;
    }

    pub fn is_down(&self, code: KeyCode) -> bool {
        self.keys_down.contains(&code)
    }

    /// Raw mouse motion accumulated since the last [`end_frame`](Self::end_frame).
    pub fn mouse_delta(&self) -> (f64, f64) {
        self.mouse_delta
    }

    /// Scroll notches accumulated since the last [`end_frame`](Self::end_frame).
    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    /// Last cursor position in window pixels, if the cursor has moved yet.
    pub fn cursor(&self) -> Option<(f64, f64)> {
        self.cursor
    }

    /// Clears per-frame accumulators. Held keys persist.
    pub fn end_frame(&mut self) {
        self.mouse_delta = (0.0, 0.0);
        self.scroll = 0.0;
    }
}
