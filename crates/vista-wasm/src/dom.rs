//! DOM-backed surfaces for the player controller

use tracing::{debug, warn};
use vista_core::{
    MediaSnapshot, Placement, Platform, PosterSurface, Size, Surface, VideoCodec, VideoSurface,
};
use wasm_bindgen::JsValue;
use web_sys::{CssStyleDeclaration, HtmlElement, HtmlImageElement, HtmlVideoElement, Window};

/// CSS value for an optional pixel offset
pub(crate) fn css_offset(value: Option<f64>) -> String {
    match value {
        Some(v) => css_px(v),
        None => "auto".to_string(),
    }
}

pub(crate) fn css_px(value: f64) -> String {
    format!("{}px", value + 0.0)
}

fn set_style(style: &CssStyleDeclaration, name: &str, value: &str) {
    if let Err(e) = style.set_property(name, value) {
        warn!(property = name, error = ?e, "Failed to set style");
    }
}

fn apply_style(element: &HtmlElement, placement: &Placement) {
    let style = element.style();
    set_style(&style, "width", &css_px(placement.width));
    set_style(&style, "height", &css_px(placement.height));
    set_style(&style, "top", &css_offset(placement.top));
    set_style(&style, "right", &css_offset(placement.right));
    set_style(&style, "bottom", &css_offset(placement.bottom));
    set_style(&style, "left", &css_offset(placement.left));
}

fn set_display(element: &HtmlElement, visible: bool) {
    let style = element.style();
    if visible {
        let _ = style.remove_property("display");
    } else {
        set_style(&style, "display", "none");
    }
}

fn box_size(element: &HtmlElement) -> Size {
    Size::new(element.offset_width() as f64, element.offset_height() as f64)
}

/// `preferred` unless it is empty
pub(crate) fn size_or(preferred: Size, fallback: Size) -> Size {
    if preferred.is_empty() {
        fallback
    } else {
        preferred
    }
}

/// The container's `<video>` element
pub struct DomVideo {
    element: HtmlVideoElement,
}

impl DomVideo {
    pub fn new(element: HtmlVideoElement) -> Self {
        Self { element }
    }
}

impl Surface for DomVideo {
    fn natural_size(&self) -> Size {
        let intrinsic = Size::new(
            self.element.video_width() as f64,
            self.element.video_height() as f64,
        );
        size_or(intrinsic, box_size(&self.element))
    }

    fn apply_placement(&mut self, placement: &Placement) {
        apply_style(&self.element, placement);
    }

    fn set_visible(&mut self, visible: bool) {
        set_display(&self.element, visible);
    }
}

impl VideoSurface for DomVideo {
    fn set_source(&mut self, src: Option<&str>) {
        match src {
            Some(src) => self.element.set_src(src),
            None => {
                let _ = self.element.remove_attribute("src");
                self.element.load();
            }
        }
    }

    fn play(&mut self) {
        match self.element.play() {
            Ok(promise) => {
                // Autoplay policies reject the promise; that is not fatal
                wasm_bindgen_futures::spawn_local(async move {
                    if let Err(e) = wasm_bindgen_futures::JsFuture::from(promise).await {
                        debug!(error = ?e, "Playback request rejected");
                    }
                });
            }
            Err(e) => warn!(error = ?e, "play() failed"),
        }
    }

    fn pause(&mut self) {
        if let Err(e) = self.element.pause() {
            warn!(error = ?e, "pause() failed");
        }
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.element.set_current_time(seconds);
    }

    fn has_played(&self) -> bool {
        self.element.played().length() > 0
    }

    fn snapshot(&self) -> MediaSnapshot {
        let buffered = self.element.buffered();
        let buffered_end = match buffered.length() {
            0 => None,
            n => buffered.end(n - 1).ok(),
        };

        MediaSnapshot {
            current_time: self.element.current_time(),
            duration: self.element.duration(),
            buffered_end,
            paused: self.element.paused(),
        }
    }
}

/// The container's poster `<img>` element
pub struct DomPoster {
    element: HtmlImageElement,
}

impl DomPoster {
    pub fn new(element: HtmlImageElement) -> Self {
        Self { element }
    }
}

impl Surface for DomPoster {
    /// The rendered box; the image's natural size only while the box is
    /// collapsed (hidden with `display: none`)
    fn natural_size(&self) -> Size {
        let natural = Size::new(
            self.element.natural_width() as f64,
            self.element.natural_height() as f64,
        );
        size_or(box_size(&self.element), natural)
    }

    fn apply_placement(&mut self, placement: &Placement) {
        apply_style(&self.element, placement);
    }

    fn set_visible(&mut self, visible: bool) {
        set_display(&self.element, visible);
    }
}

impl PosterSurface for DomPoster {
    fn set_source(&mut self, src: &str) {
        self.element.set_src(src);
    }
}

/// Window metrics and codec detection
pub struct BrowserPlatform {
    window: Window,
    /// Probe element for `canPlayType`
    video: HtmlVideoElement,
}

impl BrowserPlatform {
    pub fn new(window: Window, video: HtmlVideoElement) -> Self {
        Self { window, video }
    }
}

fn dimension(value: Result<JsValue, JsValue>) -> f64 {
    value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
}

impl Platform for BrowserPlatform {
    fn viewport(&self) -> Size {
        Size::new(
            dimension(self.window.inner_width()),
            dimension(self.window.inner_height()),
        )
    }

    fn supports_codec(&self, codec: VideoCodec) -> bool {
        // "" means no; "maybe" and "probably" are both accepted
        !self.video.can_play_type(codec.mime_type()).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_offsets() {
        assert_eq!(css_offset(Some(-133.5)), "-133.5px");
        assert_eq!(css_offset(Some(0.0)), "0px");
        assert_eq!(css_offset(Some(-0.0)), "0px");
        assert_eq!(css_offset(None), "auto");
        assert_eq!(css_px(1067.0), "1067px");
    }

    #[test]
    fn test_size_or_prefers_non_empty() {
        let rendered = Size::new(1067.0, 600.0);
        let natural = Size::new(1600.0, 900.0);
        assert_eq!(size_or(rendered, natural), rendered);
        // Hidden poster: collapsed box
        assert_eq!(size_or(Size::default(), natural), natural);
        assert_eq!(size_or(Size::new(f64::NAN, 600.0), natural), natural);
    }
}
