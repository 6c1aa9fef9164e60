//! Scene ownership and draw submission.
//!
//! The [`Renderer`] owns every mesh, shader and texture the demo creates, the
//! camera and the lights. `draw` records one render pass: the textured cubes
//! at [`CUBE_POSITIONS`] followed by a small marker cube for each point and
//! spot light.

use std::collections::HashSet;

use cgmath::{Deg, Vector3};
use wgpu::util::DeviceExt;

use crate::{
    camera::{Camera, CameraUniform},
    context::ErrorLog,
    data_structures::{
        light::{Light, LightKind, MAX_POINT_LIGHTS, MAX_SPOT_LIGHTS},
        model::{self, DrawMesh, Mesh, ModelVertex, Vertex},
        texture::{TexKind, Texture, TextureRegistry},
        transform::{InstanceRaw, Transform},
        uniform::{UniformKind, UniformLayout},
    },
    pipelines::{basic, light::LightResources},
    resources,
    shader::{Shader, ShaderTarget},
};

pub const CUBE_POSITIONS: [[f32; 3]; 10] = [
    [0.0, 0.0, 0.0],
    [2.0, 5.0, -15.0],
    [-1.5, -2.2, -2.5],
    [-3.8, -2.0, -12.3],
    [2.4, -0.4, -3.5],
    [-1.7, 3.0, -7.5],
    [1.3, -2.0, -2.5],
    [1.5, 2.0, -2.5],
    [1.5, 0.2, -1.5],
    [-1.3, 1.0, -1.5],
];

/// Degrees per second the demo cubes spin by default.
pub const CUBE_SPIN: f32 = 25.0;

const MARKER_SCALE: f32 = 0.2;
const MAX_MARKERS: usize = MAX_POINT_LIGHTS + MAX_SPOT_LIGHTS;

/// Remembers which per-frame conditions were already reported.
#[derive(Debug, Default)]
struct WarnOnce(HashSet<String>);

impl WarnOnce {
    /// True the first time `key` is seen.
    fn first(&mut self, key: &str) -> bool {
        if self.0.contains(key) {
            return false;
        }
        self.0.insert(key.to_string())
    }
}

/// Uniform block of the lit shader, matching `Params` in `lit.frag.wgsl`.
pub fn lit_uniforms() -> UniformLayout {
    UniformLayout::new(&[
        ("tint", UniformKind::Vec3),
        ("shininess", UniformKind::Float),
        ("time", UniformKind::Float),
        ("use_specular", UniformKind::Bool),
    ])
}

/// Uniform block of the light marker shader.
pub fn marker_uniforms() -> UniformLayout {
    UniformLayout::new(&[("tint", UniformKind::Vec3)])
}

/// Placement of the demo cubes at `time` seconds.
pub fn cube_transforms(time: f64, spin: f32) -> Vec<Transform> {
    CUBE_POSITIONS
        .iter()
        .enumerate()
        .map(|(i, position)| {
            let mut transform = Transform::from(Vector3::from(*position));
            let angle = 20.0 * i as f32 + (time as f32) * spin;
            transform.rotate(Vector3::new(1.0, 0.3, 0.5), Deg(angle));
            transform
        })
        .collect()
}

/// Marker transforms in the order the marker shader looks up light colours:
/// point lights first, then spot lights, each capped at its capacity.
pub fn marker_transforms(lights: &[Light]) -> Vec<Transform> {
    let of_kind = |kind: LightKind, cap: usize| {
        lights
            .iter()
            .filter(move |l| l.kind() == kind)
            .take(cap)
            .map(|l| Transform::from(l.position()).with_scale(MARKER_SCALE))
    };
    of_kind(LightKind::Point, MAX_POINT_LIGHTS)
        .chain(of_kind(LightKind::Spot, MAX_SPOT_LIGHTS))
        .collect()
}

pub struct Renderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    format: wgpu::TextureFormat,
    features: wgpu::Features,
    errors: ErrorLog,

    pub camera: Camera,
    camera_uniform: CameraUniform,
    camera_buffer: wgpu::Buffer,
    camera_layout: wgpu::BindGroupLayout,
    camera_bind_group: wgpu::BindGroup,

    lights: Vec<Light>,
    light_resources: LightResources,

    material_layout: wgpu::BindGroupLayout,
    material: Option<wgpu::BindGroup>,

    meshes: Vec<Mesh>,
    shaders: Vec<Shader>,
    textures: Vec<Texture>,
    registry: TextureRegistry,

    cube_instances: wgpu::Buffer,
    marker_instances: wgpu::Buffer,
    lit_shader: Option<usize>,
    marker_shader: Option<usize>,

    polygon_mode: wgpu::PolygonMode,
    /// Degrees per second the cubes spin.
    pub cube_spin: f32,
    warned: WarnOnce,
    initialized: bool,
}

impl Renderer {
    pub fn init(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        features: wgpu::Features,
    ) -> Self {
        let errors = ErrorLog::install(device);
        let camera = Camera::default();

        let mut camera_uniform = CameraUniform::new();
        camera_uniform.update_view_proj(&camera);
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[camera_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let camera_layout = basic::mk_uniform_layout(device, "camera_bind_group_layout");
        let camera_bind_group =
            basic::mk_uniform_bind_group(device, &camera_layout, &camera_buffer, "camera_bind_group");

        let instance_buffer = |label: &str, count: usize| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: (count * std::mem::size_of::<InstanceRaw>()) as wgpu::BufferAddress,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };
        let cube_instances = instance_buffer("Cube Instance Buffer", CUBE_POSITIONS.len());
        let marker_instances = instance_buffer("Light Marker Instance Buffer", MAX_MARKERS);

        let (vertices, indices) = model::cube();
        let cube = Mesh::new(device, "cube", &vertices, &indices);

        log::info!("Renderer initialised");
        Self {
            device: device.clone(),
            queue: queue.clone(),
            format,
            features,
            errors,
            camera,
            camera_uniform,
            camera_buffer,
            camera_layout,
            camera_bind_group,
            lights: Vec::new(),
            light_resources: LightResources::new(device),
            material_layout: resources::texture::material_layout(device),
            material: None,
            meshes: vec![cube],
            shaders: Vec::new(),
            textures: Vec::new(),
            registry: TextureRegistry::new(),
            cube_instances,
            marker_instances,
            lit_shader: None,
            marker_shader: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            cube_spin: CUBE_SPIN,
            warned: WarnOnce::default(),
            initialized: true,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Loads the shader the cubes are drawn with and returns its index.
    pub fn load_lit_shader(&mut self, base: &str) -> usize {
        let mut shader = {
            let vertex_layouts = [ModelVertex::desc(), InstanceRaw::desc()];
            let shared = [
                &self.camera_layout,
                &self.light_resources.bind_group_layout,
                &self.material_layout,
            ];
            Shader::load_paths(&self.target(&vertex_layouts, &shared), base, lit_uniforms())
        };
        shader.set_vec3("tint", [1.0, 1.0, 1.0]);
        shader.set_float("shininess", 32.0);
        shader.set_bool("use_specular", true);
        let idx = self.add_shader(shader);
        self.lit_shader = Some(idx);
        idx
    }

    /// Loads the shader the light markers are drawn with and returns its index.
    pub fn load_marker_shader(&mut self, base: &str) -> usize {
        let mut shader = {
            let vertex_layouts = [ModelVertex::desc(), InstanceRaw::desc()];
            let shared = [&self.camera_layout, &self.light_resources.bind_group_layout];
            Shader::load_paths(&self.target(&vertex_layouts, &shared), base, marker_uniforms())
        };
        shader.set_vec3("tint", [1.0, 1.0, 1.0]);
        let idx = self.add_shader(shader);
        self.marker_shader = Some(idx);
        idx
    }

    fn target<'a>(
        &'a self,
        vertex_layouts: &'a [wgpu::VertexBufferLayout<'a>],
        shared_layouts: &'a [&'a wgpu::BindGroupLayout],
    ) -> ShaderTarget<'a> {
        ShaderTarget {
            device: &self.device,
            errors: &self.errors,
            color_format: self.format,
            depth_format: Some(Texture::DEPTH_FORMAT),
            vertex_layouts,
            shared_layouts,
            features: self.features,
        }
    }

    pub fn add_shader(&mut self, shader: Shader) -> usize {
        self.shaders.push(shader);
        self.shaders.len() - 1
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> usize {
        self.meshes.push(mesh);
        self.meshes.len() - 1
    }

    /// Loads every object of an OBJ file and returns the new mesh indices.
    pub fn load_obj(&mut self, file_name: &str) -> anyhow::Result<Vec<usize>> {
        let meshes = resources::mesh::load_obj_meshes(file_name, &self.device)?;
        Ok(meshes.into_iter().map(|mesh| self.add_mesh(mesh)).collect())
    }

    /// Loads an image and returns its index.
    pub fn load_texture(&mut self, file_name: &str, kind: TexKind) -> anyhow::Result<usize> {
        let texture = Texture::load(&mut self.registry, &self.device, &self.queue, file_name, kind)?;
        self.textures.push(texture);
        Ok(self.textures.len() - 1)
    }

    /// Creates a 1x1 texture of a single colour and returns its index.
    pub fn add_solid_texture(&mut self, rgba: [u8; 4], kind: TexKind) -> anyhow::Result<usize> {
        let texture = Texture::solid(&mut self.registry, &self.device, &self.queue, rgba, kind)?;
        self.textures.push(texture);
        Ok(self.textures.len() - 1)
    }

    /// Uses the textures at `diffuse` and `specular` for the cubes.
    pub fn set_material(&mut self, diffuse: usize, specular: usize) -> bool {
        let (Some(d), Some(s)) = (self.textures.get(diffuse), self.textures.get(specular)) else {
            log::warn!("No texture at {diffuse} or {specular}, keeping the current material");
            return false;
        };
        self.material = Some(resources::texture::material_bind_group(
            &self.device,
            &self.material_layout,
            d,
            s,
        ));
        true
    }

    pub fn add_light(&mut self, light: Light) -> usize {
        self.lights.push(light);
        self.lights.len() - 1
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn light_mut(&mut self, idx: usize) -> Option<&mut Light> {
        self.lights.get_mut(idx)
    }

    /// The first spot light, the one the demo keys adjust.
    pub fn spot_light_mut(&mut self) -> Option<&mut Light> {
        self.lights.iter_mut().find(|l| l.kind() == LightKind::Spot)
    }

    pub fn mesh_at(&self, idx: usize) -> Option<&Mesh> {
        self.meshes.get(idx)
    }

    pub fn shader_at(&self, idx: usize) -> Option<&Shader> {
        self.shaders.get(idx)
    }

    pub fn shader_at_mut(&mut self, idx: usize) -> Option<&mut Shader> {
        self.shaders.get_mut(idx)
    }

    pub fn texture_at(&self, idx: usize) -> Option<&Texture> {
        self.textures.get(idx)
    }

    pub fn texture_registry(&self) -> &TextureRegistry {
        &self.registry
    }

    pub fn polygon_mode(&self) -> wgpu::PolygonMode {
        self.polygon_mode
    }

    /// Switches between filled and wireframe drawing. Line mode needs
    /// `POLYGON_MODE_LINE`; without it the request is logged once and ignored.
    pub fn set_polygon_mode(&mut self, mode: wgpu::PolygonMode) {
        if mode == self.polygon_mode {
            return;
        }
        if mode == wgpu::PolygonMode::Line && !self.features.contains(wgpu::Features::POLYGON_MODE_LINE) {
            self.warn_once("line-mode", "Line polygon mode is not supported by this adapter");
            return;
        }
        log::debug!("Polygon mode {:?}", mode);
        self.polygon_mode = mode;
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.resize(width, height);
    }

    fn warn_once(&mut self, key: &str, message: &str) {
        if self.warned.first(key) {
            log::warn!("{message}");
        }
    }

    /// Which of the shader slots can draw right now. Unusable ones are
    /// reported once.
    fn usable(&mut self, slot: Option<usize>, what: &str) -> Option<usize> {
        let Some(idx) = slot else {
            self.warn_once(what, &format!("No {what} shader loaded, skipping its draws"));
            return None;
        };
        if self.shaders.get(idx).is_some_and(|s| s.is_loaded()) {
            Some(idx)
        } else {
            self.warn_once(what, &format!("The {what} shader failed to load, skipping its draws"));
            None
        }
    }

    /// Updates the uniforms and records the scene into `view`.
    pub fn draw(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        depth: &wgpu::TextureView,
        time: f64,
    ) {
        if !self.initialized {
            return;
        }

        self.camera_uniform.update_view_proj(&self.camera);
        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[self.camera_uniform]));
        let dropped = self.light_resources.update(&self.queue, &self.lights);
        if dropped > 0 {
            self.warn_once(
                "lights",
                &format!("{dropped} lights exceed the shader's capacity and are not drawn"),
            );
        }

        let cubes: Vec<InstanceRaw> = cube_transforms(time, self.cube_spin).iter().map(Transform::to_raw).collect();
        self.queue
            .write_buffer(&self.cube_instances, 0, bytemuck::cast_slice(&cubes));
        let markers: Vec<InstanceRaw> = marker_transforms(&self.lights).iter().map(Transform::to_raw).collect();
        if !markers.is_empty() {
            self.queue
                .write_buffer(&self.marker_instances, 0, bytemuck::cast_slice(&markers));
        }

        let lit = self.usable(self.lit_shader, "lit");
        let marker = self.usable(self.marker_shader, "marker");
        if lit.is_some() && self.material.is_none() {
            self.warn_once("material", "No material set, the cubes are not drawn");
        }
        if let Some(idx) = lit {
            self.shaders[idx].set_float("time", time as f32);
        }
        for shader in self.shaders.iter_mut() {
            shader.flush(&self.queue);
        }

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.camera.clear_colour),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        let Some(cube) = self.meshes.first() else {
            return;
        };
        render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
        render_pass.set_bind_group(1, &self.light_resources.bind_group, &[]);

        if let (Some(idx), Some(material)) = (lit, &self.material) {
            if self.shaders[idx].use_program(&mut render_pass, self.polygon_mode) {
                render_pass.set_bind_group(2, material, &[]);
                render_pass.set_vertex_buffer(1, self.cube_instances.slice(..));
                render_pass.draw_mesh_instanced(cube, 0..cubes.len() as u32);
            }
        }

        if let Some(idx) = marker {
            if !markers.is_empty() && self.shaders[idx].use_program(&mut render_pass, self.polygon_mode) {
                render_pass.set_vertex_buffer(1, self.marker_instances.slice(..));
                render_pass.draw_mesh_instanced(cube, 0..markers.len() as u32);
            }
        }
    }

    /// Releases every GPU resource. Only the first call does anything.
    pub fn destroy(&mut self) -> bool {
        if !self.initialized {
            return false;
        }
        self.initialized = false;

        let shaders = self.shaders.iter_mut().map(|s| s.destroy()).filter(|&destroyed| destroyed).count();
        self.shaders.clear();
        for texture in self.textures.drain(..) {
            texture.destroy(&mut self.registry);
        }
        self.registry.clear();
        self.meshes.clear();
        self.material = None;
        self.lit_shader = None;
        self.marker_shader = None;
        log::info!("Renderer destroyed ({shaders} shaders released)");
        true
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_conditions_warn_once() {
        let mut warned = WarnOnce::default();
        let reported = (0..60).filter(|_| warned.first("lights")).count();
        assert_eq!(reported, 1);
        assert!(warned.first("material"));
    }
}
