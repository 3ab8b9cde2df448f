//! Vista Core - Slideshow Player Library
//!
//! This crate provides the runtime-free core of the Vista scene player:
//! - Scene list loading and poster/video source selection
//! - Scene navigation with wraparound and loop/repeat policy
//! - Buffering inference from progress sampling and media events
//! - Cover-fit crop/resize layout
//! - Deferred, generation-stamped notifications
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          Vista Core                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐           │
//! │  │    Scene     │  │   Playback   │  │    Layout    │           │
//! │  │    Source    │  │   Monitor    │  │    Engine    │           │
//! │  └──────┬───────┘  └──────┬───────┘  └──────┬───────┘           │
//! │         │                 │                 │                   │
//! │         └─────────────────┼─────────────────┘                   │
//! │                           │                                     │
//! │                    ┌──────┴──────┐                              │
//! │                    │   Player    │                              │
//! │                    │ Controller  │                              │
//! │                    └──────┬──────┘                              │
//! │                           │                                     │
//! │  ┌──────────────┐  ┌──────┴──────┐  ┌──────────────┐            │
//! │  │   Deferred   │  │    Event    │  │   Surfaces   │            │
//! │  │  Task Queue  │  │     Bus     │  │   (host)     │            │
//! │  └──────────────┘  └─────────────┘  └──────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod types;
pub mod config;
pub mod layout;
pub mod monitor;
pub mod events;
pub mod queue;
pub mod surface;
pub mod source;
pub mod controller;
pub mod headless;

pub use error::{Error, Result};
pub use types::*;
pub use config::PlayerConfig;
pub use layout::{crop_resize, CropOptions, HorizontalAnchor, LayoutTarget, Placement, Size, VerticalAnchor};
pub use monitor::{MediaSnapshot, MonitorConfig, PlaybackMonitor, ProgressReport};
pub use events::{BufferHealth, EventBus, MediaEvent, PlayerEvent, PlayerObserver, SubscriptionId};
pub use queue::{LoadGeneration, TaskQueue};
pub use surface::{Platform, PosterSurface, Surface, VideoSurface};
pub use source::resolve_source_url;
#[cfg(feature = "fetch")]
pub use source::{HttpSource, SceneSource};
pub use controller::{EndPolicy, PlayerController};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log library initialization
pub fn init() {
    tracing::info!(version = VERSION, "Vista Core initialized");
}
