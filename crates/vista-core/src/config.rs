//! Player configuration
//!
//! Construction-time options, deserialised from JSON (CLI, tests) or from a
//! JS object (browser).

use crate::error::{Error, Result};
use crate::layout::{CropOptions, HorizontalAnchor, VerticalAnchor};
use crate::monitor::MonitorConfig;
use crate::types::{Scene, SceneList};
use serde::{Deserialize, Serialize};

/// Player configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// DOM id of the region hosting the poster and video
    pub container_id: String,
    pub crop_width: Option<f64>,
    pub crop_height: Option<f64>,
    pub crop_vertical: Option<VerticalAnchor>,
    pub crop_horizontal: Option<HorizontalAnchor>,
    /// Replay the current scene when it ends
    #[serde(rename = "loop")]
    pub loop_scene: bool,
    /// Advance through the whole list, wrapping, when a scene ends
    pub repeat: bool,
    pub autoplay: bool,
    pub starting_video_id: usize,
    /// Scene source document location
    pub json_url: Option<String>,
    /// Pre-fetched scenes; takes precedence over `json_url`
    pub video_list: Option<Vec<Scene>>,
    /// Ignore the `stalled` media event
    pub suppress_stalled: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            container_id: String::new(),
            crop_width: None,
            crop_height: None,
            crop_vertical: None,
            crop_horizontal: None,
            loop_scene: false,
            repeat: false,
            autoplay: false,
            starting_video_id: 0,
            json_url: None,
            video_list: None,
            suppress_stalled: true,
        }
    }
}

impl PlayerConfig {
    /// Config for a container with an in-memory scene list
    pub fn with_scenes(container_id: impl Into<String>, scenes: Vec<Scene>) -> Self {
        Self {
            container_id: container_id.into(),
            video_list: Some(scenes),
            ..Default::default()
        }
    }

    /// Config for a container whose scenes are fetched from `json_url`
    pub fn with_json_url(container_id: impl Into<String>, json_url: impl Into<String>) -> Self {
        Self {
            container_id: container_id.into(),
            json_url: Some(json_url.into()),
            ..Default::default()
        }
    }

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self> {
        let config: PlayerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.container_id.trim().is_empty() {
            return Err(Error::invalid_config("container_id is required"));
        }
        if self.video_list.is_none() && self.json_url.is_none() {
            return Err(Error::invalid_config(
                "one of video_list or json_url is required",
            ));
        }
        for (name, value) in [("crop_width", self.crop_width), ("crop_height", self.crop_height)] {
            if let Some(v) = value {
                if !v.is_finite() || v <= 0.0 {
                    return Err(Error::invalid_config(format!(
                        "{} must be a positive number, got {}",
                        name, v
                    )));
                }
            }
        }
        Ok(())
    }

    /// Instance-level crop defaults
    pub fn crop_options(&self) -> CropOptions {
        CropOptions {
            width: self.crop_width,
            height: self.crop_height,
            vertical: self.crop_vertical,
            horizontal: self.crop_horizontal,
        }
    }

    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            suppress_stalled: self.suppress_stalled,
        }
    }

    /// Scenes supplied inline, if any
    pub fn scene_list(&self) -> Option<SceneList> {
        self.video_list.clone().map(SceneList::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = PlayerConfig::default();
        assert!(!config.loop_scene);
        assert!(!config.repeat);
        assert!(!config.autoplay);
        assert_eq!(config.starting_video_id, 0);
        assert!(config.suppress_stalled);
        assert_eq!(config.crop_options(), CropOptions::default());
    }

    #[test]
    fn test_config_from_json() {
        let config = PlayerConfig::from_json(
            r#"{
                "container_id": "stage",
                "crop_vertical": "top",
                "crop_width": 1200,
                "loop": true,
                "autoplay": true,
                "starting_video_id": 2,
                "json_url": "/scenes.json"
            }"#,
        )
        .unwrap();

        assert_eq!(config.container_id, "stage");
        assert!(config.loop_scene);
        assert!(config.autoplay);
        assert_eq!(config.starting_video_id, 2);
        assert_eq!(config.crop_vertical, Some(VerticalAnchor::Top));
        assert_eq!(config.crop_width, Some(1200.0));
        assert_eq!(config.json_url.as_deref(), Some("/scenes.json"));
        assert!(config.scene_list().is_none());
    }

    #[test]
    fn test_validation_errors() {
        let err = PlayerConfig::from_json(r#"{"json_url": "/s.json"}"#).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");

        let err = PlayerConfig::from_json(r#"{"container_id": "stage"}"#).unwrap_err();
        assert!(err.to_string().contains("video_list or json_url"));

        let mut config = PlayerConfig::with_json_url("stage", "/s.json");
        config.crop_height = Some(0.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_anchor_rejected() {
        let err = PlayerConfig::from_json(
            r#"{"container_id": "stage", "json_url": "/s.json", "crop_horizontal": "middle"}"#,
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "JSON");
    }
}
