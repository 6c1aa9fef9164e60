use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

use anyhow::Context;
use winit::window::Window;

use crate::{data_structures::texture, error::EngineError};

/// Window surface plus the device and queue everything else is created from.
#[derive(Debug)]
pub struct GpuContext {
    pub window: Arc<Window>,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub depth_view: wgpu::TextureView,
    /// Optional features that were available and enabled.
    pub features: wgpu::Features,
}

impl GpuContext {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let size = window.inner_size();

        log::info!("WGPU setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("Could not create a surface for the window")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context(EngineError::NoAdapter)?;
        log::info!("Using adapter {:?}", adapter.get_info().name);

        // Wireframe mode is a nice to have
        let features = adapter.features() & wgpu::Features::POLYGON_MODE_LINE;
        if features.is_empty() {
            log::info!("Adapter does not support line polygon mode, F2 will be ignored");
        }

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("learn-ngin device"),
                required_features: features,
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
            })
            .await
            .context("Could not open the GPU device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        // Shaders write linear colours and rely on an sRGB target for the conversion
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("Surface reports no supported formats")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_view =
            texture::Texture::create_depth_texture(&device, [config.width, config.height], "depth_texture");

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            depth_view,
            features,
        })
    }

    /// Reconfigures the surface and depth buffer. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.reconfigure();
    }

    /// Applies the current config again, used after the surface was lost.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
        self.depth_view = texture::Texture::create_depth_texture(
            &self.device,
            [self.config.width, self.config.height],
            "depth_texture",
        );
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }
}

/// Collects validation errors the device reports outside an error scope.
///
/// wgpu reports invalid shader modules and pipelines through the device's
/// uncaptured error handler, which panics by default. Installing an
/// `ErrorLog` turns those reports into log lines. Errors are only kept while
/// a [`capture`](Self::capture) is running, so shader loading can tell
/// whether its own step failed; anything reported outside is logged and
/// forgotten.
#[derive(Clone, Debug, Default)]
pub struct ErrorLog(Arc<Capture>);

#[derive(Debug, Default)]
struct Capture {
    armed: AtomicBool,
    errors: Mutex<Vec<String>>,
}

impl ErrorLog {
    pub fn install(device: &wgpu::Device) -> Self {
        let sink = Self::default();
        let handler = sink.clone();
        device.on_uncaptured_error(Arc::new(move |error: wgpu::Error| {
            handler.report(error.to_string());
        }));
        sink
    }

    /// Logs `message` and keeps it if a capture is running.
    pub fn report(&self, message: String) {
        log::error!("wgpu: {message}");
        if !self.0.armed.load(Ordering::Acquire) {
            return;
        }
        if let Ok(mut errors) = self.0.errors.lock() {
            errors.push(message);
        }
    }

    /// Runs `f` and returns its result with every error reported meanwhile.
    pub fn capture<T>(&self, f: impl FnOnce() -> T) -> (T, Vec<String>) {
        self.take();
        self.0.armed.store(true, Ordering::Release);
        let value = f();
        self.0.armed.store(false, Ordering::Release);
        (value, self.take())
    }

    /// Number of errors currently kept.
    pub fn len(&self) -> usize {
        self.0.errors.lock().map(|errors| errors.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn take(&self) -> Vec<String> {
        self.0
            .errors
            .lock()
            .map(|mut errors| std::mem::take(&mut *errors))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_outside_a_capture_are_not_kept() {
        let log = ErrorLog::default();
        for _ in 0..100 {
            log.report("invalid bind group".to_string());
        }
        assert!(log.is_empty());
    }

    #[test]
    fn capture_returns_only_its_own_errors() {
        let log = ErrorLog::default();
        log.report("earlier".to_string());
        let (value, errors) = log.capture(|| {
            log.report("bad module".to_string());
            7
        });
        assert_eq!(value, 7);
        assert_eq!(errors, vec!["bad module".to_string()]);
        log.report("later".to_string());
        assert!(log.is_empty());
    }
}
