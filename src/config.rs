use std::path::PathBuf;

use glam::{Vec3, Vec4};

use crate::assets::{AssetDefinition, AssetRole};
use crate::controls::OrbitSettings;

pub const ASSET_ROOT_VAR: &str = "ROOM_VIEWER_ASSET_ROOT";
pub const HIGHLIGHT_VAR: &str = "ROOM_VIEWER_HIGHLIGHT";

#[derive(Debug, Clone)]
pub struct LightConfig {
    pub position: Vec3,
    pub target: Vec3,
    pub intensity: f32,
}

#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub asset_root: PathBuf,
    pub assets: Vec<AssetDefinition>,
    /// Height of the orthographic view volume at zoom 1.
    pub frustum_size: f32,
    pub orbit: OrbitSettings,
    pub light: LightConfig,
    pub clear_color: Vec4,
    /// Paint the hovered object red for the current frame.
    pub highlight_hovered: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        let prop = |name: &str, file: &str| {
            AssetDefinition::new(name, format!("GLTF/{}", file), AssetRole::Prop)
        };

        Self {
            asset_root: PathBuf::from("assets"),
            assets: vec![
                prop("chair", "chair.gltf"),
                prop("coffeTable", "coffeTable.gltf"),
                prop("desk", "desk.gltf"),
                prop("estantes", "estantes.gltf"),
                prop("pcScreen", "pcScreen2.gltf"),
                AssetDefinition::new("pc", "GLTF/pc.gltf", AssetRole::Interactive),
                AssetDefinition::new("pcOutline", "GLTF/pcOutline.gltf", AssetRole::Outline),
                prop("plant", "plant.gltf"),
                prop("puff", "puff.gltf"),
                prop("sideTable", "sideTable.gltf"),
                prop("tapete", "tapete.gltf"),
                prop("room", "room.gltf"),
            ],
            frustum_size: 3.0,
            orbit: OrbitSettings::default(),
            light: LightConfig {
                position: Vec3::splat(1.5),
                target: Vec3::ZERO,
                intensity: 2.0,
            },
            clear_color: Vec4::new(0.93, 0.91, 0.88, 1.0),
            highlight_hovered: false,
        }
    }
}

impl ViewerConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(root) = var(ASSET_ROOT_VAR) {
            config.asset_root = PathBuf::from(root);
        }

        if let Some(highlight) = var(HIGHLIGHT_VAR) {
            config.highlight_hovered = matches!(highlight.as_str(), "1" | "true" | "yes");
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_exactly_one_interactive_and_one_outline() {
        let config = ViewerConfig::default();
        let count = |role: AssetRole| config.assets.iter().filter(|a| a.role == role).count();

        assert_eq!(config.assets.len(), 12);
        assert_eq!(count(AssetRole::Interactive), 1);
        assert_eq!(count(AssetRole::Outline), 1);
    }

    #[test]
    fn environment_overrides_root_and_highlight() {
        let config = ViewerConfig::from_vars(|name| match name {
            ASSET_ROOT_VAR => Some("/srv/room".to_string()),
            HIGHLIGHT_VAR => Some("1".to_string()),
            _ => None,
        });

        assert_eq!(config.asset_root, PathBuf::from("/srv/room"));
        assert!(config.highlight_hovered);

        let untouched = ViewerConfig::from_vars(|_| None);
        assert_eq!(untouched.asset_root, PathBuf::from("assets"));
        assert!(!untouched.highlight_hovered);
    }
}
