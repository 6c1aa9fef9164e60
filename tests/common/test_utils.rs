#![allow(dead_code)]

use cgmath::{InnerSpace, Vector3};

pub const EPSILON: f32 = 1e-4;

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

pub fn approx_vec(a: Vector3<f32>, b: Vector3<f32>) -> bool {
    (a - b).magnitude() < EPSILON
}

/// Headless device and queue, or `None` when the machine has no adapter.
#[cfg(feature = "integration-tests")]
pub fn headless() -> Option<(wgpu::Device, wgpu::Queue, wgpu::Features)> {
    let runtime = tokio::runtime::Runtime::new().ok()?;
    runtime.block_on(async {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok()?;
        let features = adapter.features() & wgpu::Features::POLYGON_MODE_LINE;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("test device"),
                required_features: features,
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .ok()?;
        Some((device, queue, features))
    })
}

/// Colour target the renderer can draw into without a window.
#[cfg(feature = "integration-tests")]
pub fn offscreen_target(device: &wgpu::Device, width: u32, height: u32) -> (wgpu::TextureView, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Test Output Texture"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TEST_FORMAT,
        usage: wgpu::TextureUsages::COPY_SRC | wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let depth = learn_ngin::data_structures::texture::Texture::create_depth_texture(device, [width, height], "test depth");
    (view, depth)
}

#[cfg(feature = "integration-tests")]
pub const TEST_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
