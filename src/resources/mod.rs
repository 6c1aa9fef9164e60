use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::data_structures::texture::{TexKind, Texture, TextureRegistry};

/**
 * This module contains all logic for loading shaders, textures and meshes from
 * the asset directory.
 */
pub mod mesh;
pub mod texture;

/// Environment variable that overrides the asset directory.
pub const ASSET_DIR_ENV: &str = "LEARN_NGIN_ASSETS";

/// The directory assets are resolved against: `$LEARN_NGIN_ASSETS`, then
/// `./assets`, then the `assets` folder next to this crate's manifest.
pub fn asset_root() -> PathBuf {
    if let Some(dir) = std::env::var_os(ASSET_DIR_ENV) {
        return PathBuf::from(dir);
    }
    let local = Path::new("./").join("assets");
    if local.is_dir() {
        return local;
    }
    Path::new(env!("CARGO_MANIFEST_DIR")).join("assets")
}

pub fn asset_path(file_name: impl AsRef<Path>) -> PathBuf {
    let file_name = file_name.as_ref();
    if file_name.is_absolute() {
        file_name.to_path_buf()
    } else {
        asset_root().join(file_name)
    }
}

pub fn load_string(file_name: impl AsRef<Path>) -> anyhow::Result<String> {
    let path = asset_path(file_name);
    std::fs::read_to_string(&path).with_context(|| format!("Could not read {}", path.display()))
}

pub fn load_binary(file_name: impl AsRef<Path>) -> anyhow::Result<Vec<u8>> {
    let path = asset_path(file_name);
    std::fs::read(&path).with_context(|| format!("Could not read {}", path.display()))
}

/// Loads an image file as a texture, taking the format hint from its extension.
pub fn load_texture(
    file_name: &str,
    kind: TexKind,
    registry: &mut TextureRegistry,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<Texture> {
    let data = load_binary(file_name)?;
    let format = Path::new(file_name).extension().and_then(|ext| ext.to_str());
    Texture::from_bytes(registry, device, queue, &data, file_name, format, kind)
        .with_context(|| format!("Could not decode texture {file_name}"))
}
