//! Asset bytes generated in-process for tests.

use std::io::Cursor;

use image::codecs::hdr::HdrEncoder;
use image::{ImageFormat, Rgb, Rgba, RgbaImage};

use super::MemorySource;

pub const PLANT_NODE: &str = "SM_MZRa_Monstera_B02";
pub const GROUND_NODE: &str = "Cube";

pub const TEXTURE_PATH: &str = "textures/glass.png";
pub const MODEL_PATH: &str = "models/monstera.glb";
pub const HDR_PATH: &str = "hdr/studio.hdr";

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 40) as u8, (y * 40) as u8, 200, 255])
    });
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).expect("png encode");
    out.into_inner()
}

pub fn hdr_bytes(width: u32, height: u32) -> Vec<u8> {
    let pixels = vec![Rgb([4.0f32, 2.0, 0.5]); (width * height) as usize];
    let mut out = Vec::new();
    HdrEncoder::new(&mut out)
        .encode(&pixels, width as usize, height as usize)
        .expect("hdr encode");
    out
}

/// Binary glTF with a root group holding two named children that share a
/// single-triangle mesh.
pub fn glb_bytes() -> Vec<u8> {
    let mut bin = Vec::new();
    for v in [[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
        for c in v {
            bin.extend_from_slice(&c.to_le_bytes());
        }
    }
    for i in [0u16, 1, 2] {
        bin.extend_from_slice(&i.to_le_bytes());
    }
    while bin.len() % 4 != 0 {
        bin.push(0);
    }

    let json = format!(
        r#"{{
  "asset": {{ "version": "2.0" }},
  "scene": 0,
  "scenes": [{{ "nodes": [0] }}],
  "nodes": [
    {{ "name": "root", "children": [1, 2] }},
    {{ "name": "{PLANT_NODE}", "mesh": 0 }},
    {{ "name": "{GROUND_NODE}", "mesh": 0, "translation": [0.0, -1.0, 0.0] }}
  ],
  "meshes": [{{ "name": "tri", "primitives": [{{ "attributes": {{ "POSITION": 0 }}, "indices": 1 }}] }}],
  "buffers": [{{ "byteLength": {len} }}],
  "bufferViews": [
    {{ "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 }},
    {{ "buffer": 0, "byteOffset": 36, "byteLength": 6, "target": 34963 }}
  ],
  "accessors": [
    {{ "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
       "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] }},
    {{ "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }}
  ]
}}"#,
        len = bin.len()
    );
    let mut json = json.into_bytes();
    while json.len() % 4 != 0 {
        json.push(b' ');
    }

    let total = 12 + 8 + json.len() + 8 + bin.len();
    let mut glb = Vec::with_capacity(total);
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total as u32).to_le_bytes());

    glb.extend_from_slice(&(json.len() as u32).to_le_bytes());
    glb.extend_from_slice(b"JSON");
    glb.extend_from_slice(&json);

    glb.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    glb.extend_from_slice(b"BIN\0");
    glb.extend_from_slice(&bin);
    glb
}

/// Source holding one valid asset of every kind at the `*_PATH` locations.
pub fn memory_source() -> MemorySource {
    MemorySource::new()
        .with(TEXTURE_PATH, png_bytes(4, 4))
        .with(MODEL_PATH, glb_bytes())
        .with(HDR_PATH, hdr_bytes(8, 4))
}
