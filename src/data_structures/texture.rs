//! GPU textures and the bounded texture registry.
//!
//! Every texture created for sampling is registered in a [`TextureRegistry`]
//! that hands out unique ids and refuses to grow beyond [`MAX_TEXTURES`].
//! Depth textures are render targets and are not registered.

use anyhow::Result;
use image::{GenericImageView, ImageFormat, load_from_memory_with_format};

use crate::error::EngineError;

/// Number of texture slots; the lit shader never binds more than this.
pub const MAX_TEXTURES: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TexKind {
    Diffuse,
    Specular,
}

impl TexKind {
    /// Name of the sampler this kind is bound to in the lit shader.
    pub fn uniform_name(&self) -> &'static str {
        match self {
            TexKind::Diffuse => "texture_diffuse",
            TexKind::Specular => "texture_specular",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(u32);

impl TextureId {
    pub fn get(&self) -> u32 {
        self.0
    }
}

/// Fixed-capacity set of live texture ids.
#[derive(Debug, Default)]
pub struct TextureRegistry {
    ids: Vec<TextureId>,
    next: u32,
}

impl TextureRegistry {
    pub fn new() -> Self {
        Self {
            ids: Vec::with_capacity(MAX_TEXTURES),
            next: 1,
        }
    }

    /// Reserves a slot and returns its id.
    pub fn register(&mut self) -> Result<TextureId, EngineError> {
        if self.ids.len() >= MAX_TEXTURES {
            return Err(EngineError::TextureRegistryFull {
                capacity: MAX_TEXTURES,
            });
        }
        // Ids are never reused, so a released id cannot alias a new texture
        let id = TextureId(self.next.max(1));
        self.next = id.0 + 1;
        self.ids.push(id);
        Ok(id)
    }

    /// Frees the slot held by `id`. Returns false if it was not registered.
    pub fn release(&mut self, id: TextureId) -> bool {
        match self.ids.iter().position(|other| *other == id) {
            Some(idx) => {
                self.ids.swap_remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: TextureId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[TextureId] {
        &self.ids
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

/// Sampled texture with its view, sampler and registry id.
#[derive(Debug)]
pub struct Texture {
    #[allow(unused)]
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    id: TextureId,
    kind: TexKind,
    file: String,
}

impl Texture {
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn kind(&self) -> TexKind {
        self.kind
    }

    /// The file this texture was decoded from, empty for generated ones.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Depth buffer matching a surface of `size` pixels.
    pub fn create_depth_texture(device: &wgpu::Device, size: [u32; 2], label: &str) -> wgpu::TextureView {
        let size = wgpu::Extent3d {
            width: size[0].max(1),
            height: size[1].max(1),
            depth_or_array_layers: 1,
        };
        let desc = wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[Self::DEPTH_FORMAT],
        };
        let texture = device.create_texture(&desc);
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Loads an image file relative to the asset root.
    pub fn load(
        registry: &mut TextureRegistry,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &str,
        kind: TexKind,
    ) -> Result<Texture> {
        crate::resources::load_texture(path, kind, registry, device, queue)
    }

    /// A 1x1 texture of a single colour, used when an image fails to load.
    pub fn solid(
        registry: &mut TextureRegistry,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        rgba: [u8; 4],
        kind: TexKind,
    ) -> Result<Texture> {
        let img = image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(1, 1, image::Rgba(rgba)));
        Self::from_image(registry, device, queue, &img, "", kind)
    }

    /// Decodes an image file's bytes. `format` is an optional extension hint.
    pub fn from_bytes(
        registry: &mut TextureRegistry,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bytes: &[u8],
        file: &str,
        format: Option<&str>,
        kind: TexKind,
    ) -> Result<Self> {
        let img = match format.and_then(ImageFormat::from_extension) {
            None => image::load_from_memory(bytes)?,
            Some(fmt) => load_from_memory_with_format(bytes, fmt)?,
        };
        Self::from_image(registry, device, queue, &img, file, kind)
    }

    pub fn from_image(
        registry: &mut TextureRegistry,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        img: &image::DynamicImage,
        file: &str,
        kind: TexKind,
    ) -> Result<Self> {
        let id = registry.register()?;
        let dimensions = img.dimensions();
        let rgba = img.to_rgba8();

        let size = wgpu::Extent3d {
            width: dimensions.0,
            height: dimensions.1,
            depth_or_array_layers: 1,
        };
        // Specular maps hold intensities, not colours
        let format = match kind {
            TexKind::Diffuse => wgpu::TextureFormat::Rgba8UnormSrgb,
            TexKind::Specular => wgpu::TextureFormat::Rgba8Unorm,
        };
        let label = format!("{} #{}", kind.uniform_name(), id.get());
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            &rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * dimensions.0),
                rows_per_image: Some(dimensions.1),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = create_default_sampler(device);
        log::debug!("Loaded texture {} ({}x{}) as {:?}", file, dimensions.0, dimensions.1, id);

        Ok(Self {
            texture,
            view,
            sampler,
            id,
            kind,
            file: file.to_string(),
        })
    }

    /// Releases the registry slot. The GPU memory goes with the last handle.
    pub fn destroy(self, registry: &mut TextureRegistry) {
        if !registry.release(self.id) {
            log::warn!("Texture {} was not registered", self.file);
        }
    }
}

pub fn create_default_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        address_mode_w: wgpu::AddressMode::Repeat,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    })
}
