// config.rs — the tour description document
//
// The tour is described by a single JSON object:
// {
//   "entrySceneUid": "hall",
//   "zoomMin": 1.0, "zoomMax": 3.0, "zoomSpeed": 0.02,
//   "enableKeyboard": true,
//   "scenes": [
//     { "uid": "hall", "image": "hall.jpg", "title": "Hall",
//       "transitions": [ { "toUid": "room", "point": { "angle": 1.57, "height": 0, "radius": 0.9 } } ],
//       "photos": [ { "image": "vase.jpg", "title": "Vase", "point": { ... } } ] }
//   ]
// }
//
// Missing optional fields take the documented defaults. The object is
// constructed once at startup and passed by reference into the tour; there is
// no global configuration state.

use serde::Deserialize;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unable to read tour file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed tour document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("the tour has no scenes")]
    NoScenes,
    #[error("entry scene \"{0}\" is not declared in the scene list")]
    UnknownEntryScene(String),
}

/// Placement of a hotspot on the panorama cylinder.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PlacementPoint {
    /// Rotation around the vertical axis, radians, [0, 2π).
    #[serde(default)]
    pub angle: f32,
    /// Vertical offset in panorama pixels; sign is up/down.
    #[serde(default)]
    pub height: f32,
    /// Fraction of the scene radius, [0, 1].
    #[serde(default)]
    pub radius: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransitionConfig {
    #[serde(rename = "toUid")]
    pub to_uid: String,
    #[serde(default)]
    pub point: PlacementPoint,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoConfig {
    pub image: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub point: PlacementPoint,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SceneConfig {
    pub uid: String,
    pub image: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub transitions: Vec<TransitionConfig>,
    #[serde(default)]
    pub photos: Vec<PhotoConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourConfig {
    #[serde(default)]
    pub entry_scene_uid: String,
    #[serde(default = "default_zoom_min")]
    pub zoom_min: f32,
    #[serde(default = "default_zoom_max")]
    pub zoom_max: f32,
    #[serde(default = "default_zoom_speed")]
    pub zoom_speed: f32,
    #[serde(default = "default_true")]
    pub enable_keyboard: bool,
    #[serde(default = "default_true")]
    pub enable_informative_destination_tooltips: bool,
    #[serde(default)]
    pub exit_url: Option<String>,
    #[serde(default)]
    pub assets_path: String,
    #[serde(default)]
    pub portal_texture: Option<String>,
    #[serde(default = "default_lang")]
    pub lang: String,
    #[serde(default)]
    pub scenes: Vec<SceneConfig>,
}

fn default_zoom_min() -> f32 {
    1.0
}

fn default_zoom_max() -> f32 {
    3.0
}

fn default_zoom_speed() -> f32 {
    0.02
}

fn default_true() -> bool {
    true
}

fn default_lang() -> String {
    "en".to_string()
}

impl TourConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: TourConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Lookup a scene by uid. Transition targets are resolved through this at
    /// activation time, not up front, so a dangling `toUid` only fails the
    /// navigation action that touches it.
    pub fn scene(&self, uid: &str) -> Option<&SceneConfig> {
        self.scenes.iter().find(|s| s.uid == uid)
    }

    /// Resolves a path relative to the configured assets directory.
    pub fn asset_path(&self, file: &str) -> String {
        if self.assets_path.is_empty() {
            file.to_string()
        } else {
            format!("{}/{}", self.assets_path.trim_end_matches('/'), file)
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.scenes.is_empty() {
            return Err(ConfigError::NoScenes);
        }
        if self.scene(&self.entry_scene_uid).is_none() {
            return Err(ConfigError::UnknownEntryScene(self.entry_scene_uid.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "entrySceneUid": "a",
        "scenes": [
            { "uid": "a", "image": "a.jpg", "title": "A",
              "transitions": [ { "toUid": "b", "point": { "angle": 1.5707964, "height": 0.0, "radius": 1.0 } } ] },
            { "uid": "b", "image": "b.jpg" }
        ]
    }"#;

    #[test]
    fn defaults_fill_missing_fields() {
        let config = TourConfig::from_json(MINIMAL).unwrap();
        assert_eq!(config.zoom_min, 1.0);
        assert_eq!(config.zoom_max, 3.0);
        assert_eq!(config.zoom_speed, 0.02);
        assert!(config.enable_keyboard);
        assert!(config.enable_informative_destination_tooltips);
        assert!(config.exit_url.is_none());
        assert_eq!(config.lang, "en");
    }

    #[test]
    fn scene_lookup_by_uid() {
        let config = TourConfig::from_json(MINIMAL).unwrap();
        assert_eq!(config.scene("a").unwrap().title, "A");
        assert_eq!(config.scene("b").unwrap().transitions.len(), 0);
        assert!(config.scene("nope").is_none());
    }

    #[test]
    fn rejects_missing_entry_scene() {
        let text = r#"{ "entrySceneUid": "x", "scenes": [ { "uid": "a", "image": "a.jpg" } ] }"#;
        assert!(matches!(
            TourConfig::from_json(text),
            Err(ConfigError::UnknownEntryScene(_))
        ));
    }

    #[test]
    fn rejects_empty_scene_list() {
        let text = r#"{ "entrySceneUid": "a", "scenes": [] }"#;
        assert!(matches!(TourConfig::from_json(text), Err(ConfigError::NoScenes)));
    }

    #[test]
    fn asset_path_joins_with_assets_dir() {
        let mut config = TourConfig::from_json(MINIMAL).unwrap();
        assert_eq!(config.asset_path("a.jpg"), "a.jpg");
        config.assets_path = "tour/assets/".to_string();
        assert_eq!(config.asset_path("a.jpg"), "tour/assets/a.jpg");
    }
}
