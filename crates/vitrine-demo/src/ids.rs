//! Asset ids and paths of the showcase scene.

use vitrine_engine::assets::AssetId;

pub const GLB_MONSTERA: AssetId = AssetId::from_static("glb-monstera");
pub const HDR_STUDIO: AssetId = AssetId::from_static("hdr-studio");
pub const TEXTURE_GLASS: AssetId = AssetId::from_static("texture-glass");

pub const MONSTERA_PATH: &str = "models/monstera.glb";
pub const STUDIO_PATH: &str = "hdr/studio.hdr";
pub const GLASS_PATH: &str = "textures/glass.webp";
