use std::sync::Arc;

use glam::{Quat, Vec3};
use image::ImageFormat;

use crate::error::LoadFailure;
use crate::scene::Transform;

use super::types::{
    Asset, AssetKind, CpuMesh, EnvMapping, EnvironmentMap, ModelData, ModelNode, TextureData,
    Vertex,
};

/// Decodes raw bytes into an asset of the requested kind.
pub fn decode(kind: AssetKind, bytes: &[u8]) -> Result<Asset, LoadFailure> {
    match kind {
        AssetKind::Texture => decode_texture(bytes).map(|t| Asset::Texture(Arc::new(t))),
        AssetKind::Model => decode_model(bytes).map(|m| Asset::Model(Arc::new(m))),
        AssetKind::EnvironmentMap => {
            decode_environment_map(bytes).map(|e| Asset::EnvironmentMap(Arc::new(e)))
        }
    }
}

fn decode_texture(bytes: &[u8]) -> Result<TextureData, LoadFailure> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(TextureData {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}

fn decode_environment_map(bytes: &[u8]) -> Result<EnvironmentMap, LoadFailure> {
    let rgba = image::load_from_memory_with_format(bytes, ImageFormat::Hdr)?.to_rgba32f();
    let (width, height) = rgba.dimensions();
    let texels = rgba.pixels().map(|p| p.0).collect();
    Ok(EnvironmentMap {
        width,
        height,
        texels,
        mapping: EnvMapping::Equirectangular,
    })
}

fn decode_model(bytes: &[u8]) -> Result<ModelData, LoadFailure> {
    let (doc, buffers, _images) = gltf::import_slice(bytes)?;

    // One CpuMesh per glTF mesh so node mesh indices stay valid.
    let mut meshes = Vec::new();
    for mesh in doc.meshes() {
        let mut vertices: Vec<Vertex> = Vec::new();
        let mut indices: Vec<u32> = Vec::new();
        let mut base_color = [1.0; 4];

        for (i, prim) in mesh.primitives().enumerate() {
            if i == 0 {
                base_color = prim.material().pbr_metallic_roughness().base_color_factor();
            }

            let reader = prim.reader(|b| buffers.get(b.index()).map(|d| d.0.as_slice()));
            let Some(positions) = reader.read_positions() else { continue };
            let positions: Vec<[f32; 3]> = positions.collect();
            let normals: Vec<[f32; 3]> = match reader.read_normals() {
                Some(it) => it.collect(),
                None => vec![[0.0, 1.0, 0.0]; positions.len()],
            };
            if normals.len() != positions.len() {
                return Err(LoadFailure::invalid(format!(
                    "mesh {}: {} normals for {} positions",
                    mesh.index(),
                    normals.len(),
                    positions.len()
                )));
            }

            let start = vertices.len() as u32;
            vertices.extend(
                positions
                    .iter()
                    .zip(&normals)
                    .map(|(pos, nrm)| Vertex { pos: *pos, nrm: *nrm }),
            );

            match reader.read_indices() {
                Some(read) => indices.extend(read.into_u32().map(|v| start + v)),
                None => indices.extend(start..start + positions.len() as u32),
            }
        }

        meshes.push(CpuMesh {
            name: mesh.name().map(str::to_owned),
            vertices,
            indices,
            base_color,
        });
    }

    let nodes: Vec<ModelNode> = doc
        .nodes()
        .map(|node| {
            let (t, r, s) = node.transform().decomposed();
            ModelNode {
                name: node
                    .name()
                    .map(str::to_owned)
                    .unwrap_or_else(|| format!("node{}", node.index())),
                transform: Transform {
                    translation: Vec3::from(t),
                    rotation: Quat::from_array(r),
                    scale: Vec3::from(s),
                },
                mesh: node.mesh().map(|m| m.index()),
                children: node.children().map(|c| c.index()).collect(),
            }
        })
        .collect();

    if nodes.is_empty() {
        return Err(LoadFailure::invalid("model contains no nodes"));
    }

    let roots = match doc.default_scene().or_else(|| doc.scenes().next()) {
        Some(scene) => scene.nodes().map(|n| n.index()).collect(),
        None => {
            let mut has_parent = vec![false; nodes.len()];
            for child in nodes.iter().flat_map(|n| n.children.iter()) {
                has_parent[*child] = true;
            }
            (0..nodes.len()).filter(|i| !has_parent[*i]).collect()
        }
    };

    Ok(ModelData::new(meshes, nodes, roots))
}
