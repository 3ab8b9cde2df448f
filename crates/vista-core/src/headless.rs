//! Headless surfaces
//!
//! In-memory implementations of the host traits. The CLI simulator drives a
//! controller with these, and the test suites assert against them.

use crate::events::PlayerEvent;
use crate::layout::{Placement, Size};
use crate::monitor::MediaSnapshot;
use crate::surface::{Platform, PosterSurface, Surface, VideoSurface};
use crate::types::VideoCodec;
use std::cell::RefCell;
use std::rc::Rc;

/// In-memory `<video>`
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessVideo {
    pub src: Option<String>,
    pub paused: bool,
    pub current_time: f64,
    pub duration: f64,
    pub buffered_end: Option<f64>,
    pub played: bool,
    /// Intrinsic resolution once metadata is known
    pub intrinsic: Size,
    /// Rendered box
    pub box_size: Size,
    pub placement: Option<Placement>,
    pub visible: bool,
    pub play_calls: u32,
    pub pause_calls: u32,
}

impl HeadlessVideo {
    pub fn new(intrinsic: Size) -> Self {
        Self {
            src: None,
            paused: true,
            current_time: 0.0,
            duration: f64::NAN,
            buffered_end: None,
            played: false,
            intrinsic,
            box_size: Size::default(),
            placement: None,
            visible: true,
            play_calls: 0,
            pause_calls: 0,
        }
    }

    /// Advance the playback clock as if frames were rendered
    pub fn advance(&mut self, seconds: f64) {
        if !self.paused && seconds > 0.0 {
            self.current_time += seconds;
            self.played = true;
        }
    }
}

impl Default for HeadlessVideo {
    fn default() -> Self {
        Self::new(Size::new(1920.0, 1080.0))
    }
}

impl Surface for HeadlessVideo {
    fn natural_size(&self) -> Size {
        if self.intrinsic.is_empty() {
            self.box_size
        } else {
            self.intrinsic
        }
    }

    fn apply_placement(&mut self, placement: &Placement) {
        self.box_size = placement.size();
        self.placement = Some(*placement);
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

impl VideoSurface for HeadlessVideo {
    fn set_source(&mut self, src: Option<&str>) {
        self.src = src.map(String::from);
        self.paused = true;
        self.current_time = 0.0;
        self.buffered_end = None;
        self.played = false;
    }

    fn play(&mut self) {
        self.play_calls += 1;
        if self.src.is_some() {
            self.paused = false;
        }
    }

    fn pause(&mut self) {
        self.pause_calls += 1;
        self.paused = true;
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.current_time = seconds;
    }

    fn has_played(&self) -> bool {
        self.played
    }

    fn snapshot(&self) -> MediaSnapshot {
        MediaSnapshot {
            current_time: self.current_time,
            duration: self.duration,
            buffered_end: self.buffered_end,
            paused: self.paused,
        }
    }
}

/// In-memory poster `<img>`
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessPoster {
    pub src: Option<String>,
    pub box_size: Size,
    pub placement: Option<Placement>,
    pub visible: bool,
}

impl HeadlessPoster {
    pub fn new(box_size: Size) -> Self {
        Self {
            src: None,
            box_size,
            placement: None,
            visible: true,
        }
    }
}

impl Default for HeadlessPoster {
    fn default() -> Self {
        Self::new(Size::new(1600.0, 900.0))
    }
}

impl Surface for HeadlessPoster {
    fn natural_size(&self) -> Size {
        self.box_size
    }

    fn apply_placement(&mut self, placement: &Placement) {
        self.box_size = placement.size();
        self.placement = Some(*placement);
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

impl PosterSurface for HeadlessPoster {
    fn set_source(&mut self, src: &str) {
        self.src = Some(src.to_string());
    }
}

/// Fixed viewport with a fixed set of playable codecs
#[derive(Debug, Clone, PartialEq)]
pub struct StaticPlatform {
    pub viewport: Size,
    pub codecs: Vec<VideoCodec>,
}

impl StaticPlatform {
    pub fn new(viewport: Size, codecs: Vec<VideoCodec>) -> Self {
        Self { viewport, codecs }
    }
}

impl Default for StaticPlatform {
    fn default() -> Self {
        Self::new(Size::new(1440.0, 900.0), VideoCodec::PRIORITY.to_vec())
    }
}

impl Platform for StaticPlatform {
    fn viewport(&self) -> Size {
        self.viewport
    }

    fn supports_codec(&self, codec: VideoCodec) -> bool {
        self.codecs.contains(&codec)
    }
}

/// Shared record of emitted notifications
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<PlayerEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observer that appends to this log
    pub fn observer(&self) -> impl FnMut(&PlayerEvent) + 'static {
        let events = Rc::clone(&self.events);
        move |event: &PlayerEvent| events.borrow_mut().push(*event)
    }

    pub fn events(&self) -> Vec<PlayerEvent> {
        self.events.borrow().clone()
    }

    /// Return and clear everything recorded so far
    pub fn take(&self) -> Vec<PlayerEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub fn count(&self, event: PlayerEvent) -> usize {
        self.events.borrow().iter().filter(|e| **e == event).count()
    }
}
