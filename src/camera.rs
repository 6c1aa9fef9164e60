//! Free-look camera.
//!
//! The camera keeps yaw and pitch in degrees and derives an orthonormal
//! forward/right/up basis from them whenever the orientation changes. Mouse
//! motion is fed in either as raw deltas or as absolute cursor positions.

use cgmath::{Deg, InnerSpace, Matrix4, Point3, Rad, Vector3};

pub const WORLD_UP: Vector3<f32> = Vector3::new(0.0, 1.0, 0.0);
pub const PITCH_LIMIT: f32 = 89.0;
pub const FOV_LIMITS: (f32, f32) = (1.0, 120.0);

/// wgpu clip space has z in [0, 1] where OpenGL uses [-1, 1].
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

#[derive(Debug, Clone)]
pub struct Camera {
    position: Vector3<f32>,
    yaw: f32,
    pitch: f32,
    forward: Vector3<f32>,
    right: Vector3<f32>,
    up: Vector3<f32>,
    fov_h: f32,
    aspect: f32,
    near: f32,
    far: f32,
    last_cursor: Option<(f64, f64)>,
    pub clear_colour: wgpu::Color,
}

impl Camera {
    /// Creates a camera looking down -Z with the given horizontal fov in degrees.
    pub fn new(fov_h: f32) -> Self {
        let mut camera = Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            yaw: -90.0,
            pitch: 0.0,
            forward: -Vector3::unit_z(),
            right: Vector3::unit_x(),
            up: WORLD_UP,
            fov_h: fov_h.clamp(FOV_LIMITS.0, FOV_LIMITS.1),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 100.0,
            last_cursor: None,
            clear_colour: wgpu::Color::BLACK,
        };
        camera.update_basis();
        camera
    }

    pub fn set_clear_colour(&mut self, r: f64, g: f64, b: f64) {
        self.clear_colour = wgpu::Color { r, g, b, a: 1.0 };
    }

    pub fn set_position(&mut self, position: Vector3<f32>) {
        self.position = position;
    }

    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    pub fn translate(&mut self, translation: Vector3<f32>) {
        self.position += translation;
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn forward(&self) -> Vector3<f32> {
        self.forward
    }

    pub fn right(&self) -> Vector3<f32> {
        self.right
    }

    pub fn up(&self) -> Vector3<f32> {
        self.up
    }

    /// Sets yaw and pitch directly; pitch is clamped like mouse input.
    pub fn set_orientation(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_basis();
    }

    /// Rotates by a mouse motion in pixels. Screen y grows downwards, so
    /// moving the mouse down pitches the view down.
    pub fn apply_mouse_delta(&mut self, dx: f64, dy: f64, sensitivity: f32) {
        let yaw = self.yaw + (dx as f32) * sensitivity;
        let pitch = self.pitch - (dy as f32) * sensitivity;
        self.set_orientation(yaw, pitch);
    }

    /// Rotates by the offset between `(x, y)` and the previously seen cursor
    /// position. The first sample only records the position.
    pub fn apply_cursor(&mut self, x: f64, y: f64, sensitivity: f32) {
        if let Some((last_x, last_y)) = self.last_cursor.replace((x, y)) {
            self.apply_mouse_delta(x - last_x, y - last_y, sensitivity);
        }
    }

    fn update_basis(&mut self) {
        let (yaw, pitch) = (Rad::from(Deg(self.yaw)), Rad::from(Deg(self.pitch)));
        let forward = Vector3::new(
            yaw.0.cos() * pitch.0.cos(),
            pitch.0.sin(),
            yaw.0.sin() * pitch.0.cos(),
        )
        .normalize();
        let right = forward.cross(WORLD_UP).normalize();
        self.up = right.cross(forward);
        self.right = right;
        self.forward = forward;
    }

    /// Horizontal field of view in degrees.
    pub fn fov_h(&self) -> f32 {
        self.fov_h
    }

    /// Vertical field of view in degrees, derived from the horizontal one and the aspect ratio.
    pub fn fov_v(&self) -> f32 {
        let half_h = Rad::from(Deg(self.fov_h)).0 * 0.5;
        Deg::from(Rad(2.0 * (half_h.tan() / self.aspect).atan())).0
    }

    pub fn modify_fov_h(&mut self, delta: f32) {
        self.fov_h = (self.fov_h + delta).clamp(FOV_LIMITS.0, FOV_LIMITS.1);
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect
    }

    /// Updates the aspect ratio from a framebuffer size. Zero sizes (a
    /// minimised window) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.set_aspect_ratio(width as f32 / height as f32);
        }
    }

    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        let eye = Point3::new(self.position.x, self.position.y, self.position.z);
        Matrix4::look_to_rh(eye, self.forward, self.up)
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * cgmath::perspective(Deg(self.fov_v()), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(75.0)
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera) {
        self.view_position = camera.position().extend(1.0).into();
        self.view_proj = camera.view_projection().into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_cursor_sample_does_not_rotate() {
        let mut camera = Camera::default();
        camera.apply_cursor(400.0, 300.0, 0.05);
        assert_eq!(camera.yaw(), -90.0);
        assert_eq!(camera.pitch(), 0.0);

        camera.apply_cursor(420.0, 300.0, 0.05);
        assert!((camera.yaw() - -89.0).abs() < 1e-5);
    }

    #[test]
    fn default_camera_looks_down_negative_z() {
        let camera = Camera::default();
        assert!((camera.forward() - Vector3::new(0.0, 0.0, -1.0)).magnitude() < 1e-5);
        assert!((camera.right() - Vector3::new(1.0, 0.0, 0.0)).magnitude() < 1e-5);
        assert!((camera.up() - WORLD_UP).magnitude() < 1e-5);
    }
}
