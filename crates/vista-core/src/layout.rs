//! Layout engine - cover-fit crop and resize
//!
//! Scales media so it fully covers a target box while preserving aspect
//! ratio, then positions the overflow according to per-axis anchors.

use serde::{Deserialize, Serialize};

/// Width and height in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero, negative or not finite
    pub fn is_empty(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0)
    }

    pub fn ratio(&self) -> f64 {
        self.width / self.height
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl std::str::FromStr for Size {
    type Err = String;

    /// Parses `WIDTHxHEIGHT`, e.g. `1920x1080`
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
        let width = w.trim().parse::<f64>().map_err(|e| format!("bad width '{}': {}", w, e))?;
        let height = h.trim().parse::<f64>().map_err(|e| format!("bad height '{}': {}", h, e))?;
        Ok(Size::new(width, height))
    }
}

/// Vertical crop anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAnchor {
    Top,
    #[default]
    Center,
    Bottom,
}

/// Horizontal crop anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAnchor {
    Left,
    #[default]
    Center,
    Right,
}

impl std::str::FromStr for VerticalAnchor {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "top" => Ok(VerticalAnchor::Top),
            "center" => Ok(VerticalAnchor::Center),
            "bottom" => Ok(VerticalAnchor::Bottom),
            other => Err(format!("unknown vertical anchor '{}'", other)),
        }
    }
}

impl std::str::FromStr for HorizontalAnchor {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "left" => Ok(HorizontalAnchor::Left),
            "center" => Ok(HorizontalAnchor::Center),
            "right" => Ok(HorizontalAnchor::Right),
            other => Err(format!("unknown horizontal anchor '{}'", other)),
        }
    }
}

/// Fully resolved box that content is cropped to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutTarget {
    pub width: f64,
    pub height: f64,
    pub vertical: VerticalAnchor,
    pub horizontal: HorizontalAnchor,
}

impl LayoutTarget {
    /// Target covering the given size, centered on both axes
    pub fn centered(size: Size) -> Self {
        Self {
            width: size.width,
            height: size.height,
            vertical: VerticalAnchor::Center,
            horizontal: HorizontalAnchor::Center,
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Partially specified target; unset fields fall back to the viewport
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CropOptions {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub vertical: Option<VerticalAnchor>,
    pub horizontal: Option<HorizontalAnchor>,
}

impl CropOptions {
    /// Fill unset fields from the viewport size and center anchors
    pub fn resolve(&self, viewport: Size) -> LayoutTarget {
        LayoutTarget {
            width: self.width.unwrap_or(viewport.width),
            height: self.height.unwrap_or(viewport.height),
            vertical: self.vertical.unwrap_or_default(),
            horizontal: self.horizontal.unwrap_or_default(),
        }
    }
}

/// Resolve the target for one crop: explicit options win over the
/// instance defaults as a whole; either way missing fields fall back to the
/// viewport and center.
pub fn resolve_target(
    explicit: Option<&CropOptions>,
    defaults: &CropOptions,
    viewport: Size,
) -> LayoutTarget {
    explicit.unwrap_or(defaults).resolve(viewport)
}

/// Computed size and position for an element. `None` offsets mean `auto`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Placement {
    pub width: f64,
    pub height: f64,
    pub top: Option<f64>,
    pub right: Option<f64>,
    pub bottom: Option<f64>,
    pub left: Option<f64>,
}

impl Placement {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Cover-fit `content` into `target`.
///
/// Returns `None` when the scale factor is zero, NaN or infinite (zero-sized
/// content or target), in which case the element must be left untouched.
pub fn crop_resize(content: Size, target: &LayoutTarget) -> Option<Placement> {
    let content_ratio = content.ratio();
    let viewport_ratio = target.width / target.height;

    let scale = if viewport_ratio >= content_ratio {
        target.width / content.width
    } else {
        target.height / content.height
    };

    if !scale.is_finite() || scale <= 0.0 {
        return None;
    }

    let width = (scale * content.width).round();
    let height = (scale * content.height).round();

    let mut placement = Placement {
        width,
        height,
        ..Default::default()
    };

    match target.horizontal {
        HorizontalAnchor::Left => placement.left = Some(0.0),
        HorizontalAnchor::Right => placement.right = Some(0.0),
        HorizontalAnchor::Center => placement.left = Some((width - target.width) / -2.0),
    }

    match target.vertical {
        VerticalAnchor::Top => placement.top = Some(0.0),
        VerticalAnchor::Bottom => placement.bottom = Some(0.0),
        VerticalAnchor::Center => placement.top = Some((height - target.height) / -2.0),
    }

    Some(placement)
}
