use std::io::{BufReader, Cursor};

use anyhow::Context;

use crate::data_structures::model::{Mesh, ModelVertex};

/// Geometry read from an OBJ file before it is uploaded.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
}

/**
 * Parses OBJ text into one `MeshData` per object. Faces are triangulated and
 * indices are unified, so positions, texture coordinates and normals share one
 * index stream. Materials are ignored: textures are assigned by the caller.
 */
pub fn load_obj_vertices(obj_text: &str) -> anyhow::Result<Vec<MeshData>> {
    let mut reader = BufReader::new(Cursor::new(obj_text));
    let (models, _) = tobj::load_obj_buf(
        &mut reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |_| Ok(Default::default()),
    )?;

    Ok(models
        .into_iter()
        .map(|m| {
            let vertices = (0..m.mesh.positions.len() / 3)
                .map(|i| ModelVertex {
                    position: [
                        m.mesh.positions[i * 3],
                        m.mesh.positions[i * 3 + 1],
                        m.mesh.positions[i * 3 + 2],
                    ],
                    // OBJ puts v = 0 at the bottom, wgpu at the top
                    tex_coords: [
                        m.mesh.texcoords.get(i * 2).map_or(0.0, |f| *f),
                        1.0 - m.mesh.texcoords.get(i * 2 + 1).map_or(0.0, |f| *f),
                    ],
                    normal: [
                        m.mesh.normals.get(i * 3).map_or(0.0, |f| *f),
                        m.mesh.normals.get(i * 3 + 1).map_or(0.0, |f| *f),
                        m.mesh.normals.get(i * 3 + 2).map_or(0.0, |f| *f),
                    ],
                })
                .collect();
            MeshData {
                name: m.name,
                vertices,
                indices: m.mesh.indices,
            }
        })
        .collect())
}

pub fn load_obj_meshes(file_name: &str, device: &wgpu::Device) -> anyhow::Result<Vec<Mesh>> {
    let obj_text = super::load_string(file_name)?;
    let meshes = load_obj_vertices(&obj_text).with_context(|| format!("Could not parse {file_name}"))?;
    Ok(meshes
        .iter()
        .filter(|data| {
            let empty = data.indices.is_empty();
            if empty {
                log::warn!("Skipping object {} in {} as it has no faces", data.name, file_name);
            }
            !empty
        })
        .map(|data| Mesh::new(device, &data.name, &data.vertices, &data.indices))
        .collect())
}
