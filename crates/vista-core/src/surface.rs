//! Host capabilities the controller drives
//!
//! The controller never touches a DOM directly. The host (the wasm binding,
//! the CLI's headless surfaces, or test doubles) implements these traits.

use crate::layout::{Placement, Size};
use crate::monitor::MediaSnapshot;
use crate::types::VideoCodec;

/// An element that can be cropped and shown or hidden
pub trait Surface {
    /// Natural content dimensions used for cover-fit scaling
    fn natural_size(&self) -> Size;

    /// Apply size and offsets. `None` offsets are reset to `auto`.
    fn apply_placement(&mut self, placement: &Placement);

    fn set_visible(&mut self, visible: bool);
}

/// The poster `<img>`
pub trait PosterSurface: Surface {
    fn set_source(&mut self, src: &str);
}

/// The `<video>` element
pub trait VideoSurface: Surface {
    /// Assign a source, or clear it with `None`
    fn set_source(&mut self, src: Option<&str>);

    /// Issue playback; completion is not awaited
    fn play(&mut self);

    fn pause(&mut self);

    fn set_current_time(&mut self, seconds: f64);

    /// True once the video has rendered any range
    fn has_played(&self) -> bool;

    /// Current readings for the playback monitor
    fn snapshot(&self) -> MediaSnapshot;
}

/// Viewport and feature detection queries
pub trait Platform {
    fn viewport(&self) -> Size;

    fn supports_codec(&self, codec: VideoCodec) -> bool;
}
