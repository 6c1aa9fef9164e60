use wgpu::util::DeviceExt;

use crate::{data_structures::light::{Light, LightsUniform}, pipelines::basic};

/// GPU side of the scene lights: one uniform buffer shared by the lit shader
/// and the light marker shader.
#[derive(Debug)]
pub struct LightResources {
    pub uniform: LightsUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl LightResources {
    pub fn new(device: &wgpu::Device) -> Self {
        let uniform = LightsUniform::default();
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group_layout = basic::mk_uniform_layout(device, "light_bind_group_layout");
        let bind_group = basic::mk_uniform_bind_group(device, &bind_group_layout, &buffer, "light_bind_group");
        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    /// Repacks `lights` and uploads them. Returns how many lights did not fit.
    pub fn update<'a>(&mut self, queue: &wgpu::Queue, lights: impl IntoIterator<Item = &'a Light>) -> usize {
        let (uniform, dropped) = LightsUniform::from_lights(lights);
        self.uniform = uniform;
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
        dropped
    }
}
