//! Core types for Vista

use serde::{Deserialize, Serialize};

/// Viewport width up to which the smartphone poster is used
pub const SMARTPHONE_MAX_WIDTH: f64 = 1024.0;

/// Viewport width up to which the tablet poster is used
pub const TABLET_MAX_WIDTH: f64 = 1280.0;

/// Video codec families a scene can provide a source for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoCodec {
    H264,
    Webm,
}

impl VideoCodec {
    /// Codecs in the order they are tried when picking a source
    pub const PRIORITY: [VideoCodec; 2] = [VideoCodec::H264, VideoCodec::Webm];

    /// MIME type used to probe the browser for support
    pub fn mime_type(&self) -> &'static str {
        match self {
            VideoCodec::H264 => "video/mp4; codecs=\"avc1.42E01E\"",
            VideoCodec::Webm => "video/webm; codecs=\"vp8, vorbis\"",
        }
    }
}

impl std::fmt::Display for VideoCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VideoCodec::H264 => write!(f, "h264"),
            VideoCodec::Webm => write!(f, "webm"),
        }
    }
}

impl std::str::FromStr for VideoCodec {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "h264" | "mp4" | "avc" => Ok(VideoCodec::H264),
            "webm" | "vp8" => Ok(VideoCodec::Webm),
            other => Err(format!("unknown codec '{}'", other)),
        }
    }
}

/// Poster image variant, chosen by viewport width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PosterVariant {
    Smartphone,
    Tablet,
    Desktop,
}

impl PosterVariant {
    /// Pick the variant for a viewport width in CSS pixels
    pub fn for_width(width: f64) -> Self {
        if width <= SMARTPHONE_MAX_WIDTH {
            PosterVariant::Smartphone
        } else if width <= TABLET_MAX_WIDTH {
            PosterVariant::Tablet
        } else {
            PosterVariant::Desktop
        }
    }
}

/// One playable unit: a poster plus optional video sources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Ordinal position in the scene list
    #[serde(default, skip_serializing)]
    pub id: usize,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub category: String,
    pub poster_smartphone: String,
    pub poster_tablet: String,
    pub poster_desktop: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_h264: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_webm: Option<String>,
}

impl Scene {
    /// Poster URL for the given variant
    pub fn poster(&self, variant: PosterVariant) -> &str {
        match variant {
            PosterVariant::Smartphone => &self.poster_smartphone,
            PosterVariant::Tablet => &self.poster_tablet,
            PosterVariant::Desktop => &self.poster_desktop,
        }
    }

    /// Video URL for the given codec, if the scene provides one
    pub fn video(&self, codec: VideoCodec) -> Option<&str> {
        match codec {
            VideoCodec::H264 => self.video_h264.as_deref(),
            VideoCodec::Webm => self.video_webm.as_deref(),
        }
    }

    /// Codecs this scene has a source for, in priority order
    pub fn available_codecs(&self) -> Vec<VideoCodec> {
        VideoCodec::PRIORITY
            .into_iter()
            .filter(|codec| self.video(*codec).is_some())
            .collect()
    }

    /// First source, in codec priority order, accepted by `supports`
    pub fn select_source(&self, supports: impl Fn(VideoCodec) -> bool) -> Option<(VideoCodec, &str)> {
        VideoCodec::PRIORITY
            .into_iter()
            .filter(|codec| supports(*codec))
            .find_map(|codec| self.video(codec).map(|src| (codec, src)))
    }
}

/// Wire shape of a scene source document: `{ "videos": [...] }`
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SceneDocument {
    videos: Vec<Scene>,
}

/// Ordered, immutable list of scenes with ids assigned by position
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "SceneDocument", into = "SceneDocument")]
pub struct SceneList {
    scenes: Vec<Scene>,
}

impl SceneList {
    pub fn new(mut scenes: Vec<Scene>) -> Self {
        for (id, scene) in scenes.iter_mut().enumerate() {
            scene.id = id;
        }
        Self { scenes }
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&Scene> {
        self.scenes.get(id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Scene> {
        self.scenes.iter()
    }

    /// Successor of `id`, wrapping to the first scene
    pub fn next_id(&self, id: usize) -> usize {
        match id.checked_add(1) {
            Some(next) if next < self.scenes.len() => next,
            _ => 0,
        }
    }

    /// Predecessor of `id`, wrapping to the last scene
    pub fn prev_id(&self, id: usize) -> usize {
        if id == 0 || id > self.scenes.len() {
            self.scenes.len().saturating_sub(1)
        } else {
            id - 1
        }
    }
}

impl From<SceneDocument> for SceneList {
    fn from(doc: SceneDocument) -> Self {
        SceneList::new(doc.videos)
    }
}

impl From<SceneList> for SceneDocument {
    fn from(list: SceneList) -> Self {
        SceneDocument { videos: list.scenes }
    }
}

impl<'a> IntoIterator for &'a SceneList {
    type Item = &'a Scene;
    type IntoIter = std::slice::Iter<'a, Scene>;

    fn into_iter(self) -> Self::IntoIter {
        self.scenes.iter()
    }
}

/// Snapshot of the controller's navigation and playback state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub current_id: usize,
    pub previous_id: usize,
    pub next_id: usize,
    /// False whenever the current scene has no codec-compatible source
    pub playable: bool,
    pub is_buffering: bool,
    /// Playback time recorded at the previous progress sample
    pub prev_time: f64,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            current_id: 0,
            previous_id: 0,
            next_id: 0,
            playable: false,
            is_buffering: true,
            prev_time: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene(h264: Option<&str>, webm: Option<&str>) -> Scene {
        Scene {
            id: 0,
            title: "Harbour".to_string(),
            project: "Coastline".to_string(),
            category: "film".to_string(),
            poster_smartphone: "s.jpg".to_string(),
            poster_tablet: "t.jpg".to_string(),
            poster_desktop: "d.jpg".to_string(),
            video_h264: h264.map(String::from),
            video_webm: webm.map(String::from),
        }
    }

    #[test]
    fn test_poster_breakpoints() {
        assert_eq!(PosterVariant::for_width(320.0), PosterVariant::Smartphone);
        assert_eq!(PosterVariant::for_width(1024.0), PosterVariant::Smartphone);
        assert_eq!(PosterVariant::for_width(1025.0), PosterVariant::Tablet);
        assert_eq!(PosterVariant::for_width(1280.0), PosterVariant::Tablet);
        assert_eq!(PosterVariant::for_width(1281.0), PosterVariant::Desktop);
    }

    #[test]
    fn test_source_priority_prefers_h264() {
        let s = scene(Some("a.mp4"), Some("a.webm"));
        assert_eq!(s.select_source(|_| true), Some((VideoCodec::H264, "a.mp4")));
        assert_eq!(
            s.select_source(|c| c == VideoCodec::Webm),
            Some((VideoCodec::Webm, "a.webm"))
        );
    }

    #[test]
    fn test_source_falls_through_missing_h264() {
        let s = scene(None, Some("a.webm"));
        assert_eq!(s.select_source(|_| true), Some((VideoCodec::Webm, "a.webm")));
        assert_eq!(s.select_source(|c| c == VideoCodec::H264), None);
        assert_eq!(s.available_codecs(), vec![VideoCodec::Webm]);
    }

    #[test]
    fn test_scene_list_wraps() {
        let list = SceneList::new(vec![scene(None, None), scene(None, None), scene(None, None)]);
        assert_eq!(list.get(2).map(|s| s.id), Some(2));
        assert_eq!(list.next_id(2), 0);
        assert_eq!(list.next_id(0), 1);
        assert_eq!(list.prev_id(0), 2);
        assert_eq!(list.prev_id(1), 0);
        assert_eq!(list.next_id(usize::MAX), 0);
        assert_eq!(list.prev_id(usize::MAX), 2);
    }

    #[test]
    fn test_codec_from_str() {
        assert_eq!("H264".parse::<VideoCodec>(), Ok(VideoCodec::H264));
        assert_eq!(" webm ".parse::<VideoCodec>(), Ok(VideoCodec::Webm));
        assert!("theora".parse::<VideoCodec>().is_err());
    }
}
