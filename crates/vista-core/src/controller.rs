//! Player controller - scene manager and event orchestration
//!
//! Coordinates:
//! - Scene loading (poster variant and video source selection)
//! - Navigation with wraparound and the end-of-media policy
//! - Buffering inference through the playback monitor
//! - Cover-fit layout of the poster and video
//! - Deferred `scene_loaded` notifications

use crate::{
    config::PlayerConfig,
    events::{EventBus, MediaEvent, PlayerEvent, PlayerObserver, SubscriptionId},
    layout::{self, CropOptions, LayoutTarget, Placement},
    monitor::{PlaybackMonitor, ProgressReport},
    queue::{LoadGeneration, TaskQueue},
    surface::{Platform, PosterSurface, Surface, VideoSurface},
    types::{PlayerState, PosterVariant, Scene, SceneList, VideoCodec},
    Error, Result,
};
use tracing::{debug, info, instrument, warn};

/// What happens when the current scene's video ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndPolicy {
    /// Replay the current scene
    Loop,
    /// Advance to the next scene, wrapping
    Repeat,
    /// Stop and show the poster
    Stop,
}

impl EndPolicy {
    pub fn new(loop_scene: bool, repeat: bool) -> Self {
        if loop_scene {
            EndPolicy::Loop
        } else if repeat {
            EndPolicy::Repeat
        } else {
            EndPolicy::Stop
        }
    }
}

/// Work deferred to the end of the current task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeferredTask {
    SceneLoaded(usize),
}

/// Slideshow controller driving one poster and one video element
pub struct PlayerController<V, P, H> {
    config: PlayerConfig,
    crop_defaults: CropOptions,
    end_policy: EndPolicy,
    video: V,
    poster: P,
    platform: H,
    scenes: SceneList,
    state: PlayerState,
    monitor: PlaybackMonitor,
    poster_variant: Option<PosterVariant>,
    active_codec: Option<VideoCodec>,
    generation: LoadGeneration,
    deferred: TaskQueue<DeferredTask>,
    bus: EventBus,
}

impl<V, P, H> PlayerController<V, P, H>
where
    V: VideoSurface,
    P: PosterSurface,
    H: Platform,
{
    /// Create a controller. With an inline `video_list` the starting scene
    /// is loaded immediately; otherwise the host fetches `json_url` and calls
    /// [`set_scenes`](Self::set_scenes).
    pub fn new(config: PlayerConfig, video: V, mut poster: P, platform: H) -> Result<Self> {
        config.validate()?;

        // Shown again once its image has loaded
        poster.set_visible(false);

        let mut controller = Self {
            crop_defaults: config.crop_options(),
            end_policy: EndPolicy::new(config.loop_scene, config.repeat),
            monitor: PlaybackMonitor::new(config.monitor_config()),
            state: PlayerState {
                current_id: config.starting_video_id,
                ..Default::default()
            },
            config,
            video,
            poster,
            platform,
            scenes: SceneList::default(),
            poster_variant: None,
            active_codec: None,
            generation: LoadGeneration::default(),
            deferred: TaskQueue::new(),
            bus: EventBus::new(),
        };

        info!(
            container = %controller.config.container_id,
            policy = ?controller.end_policy,
            autoplay = controller.config.autoplay,
            "Player controller created"
        );

        if let Some(scenes) = controller.config.scene_list() {
            controller.set_scenes(scenes)?;
        }

        Ok(controller)
    }

    /// Install a scene list and load the starting scene
    pub fn set_scenes(&mut self, scenes: SceneList) -> Result<()> {
        if scenes.is_empty() {
            return Err(Error::source_load("scene list is empty"));
        }
        // Keep the controller uninitialized rather than pointing past the list
        if self.config.starting_video_id >= scenes.len() {
            return Err(Error::SceneOutOfRange {
                id: self.config.starting_video_id,
                count: scenes.len(),
            });
        }
        info!(scenes = scenes.len(), "Scene list installed");
        self.scenes = scenes;
        self.load_scene(self.config.starting_video_id)
    }

    /// True while scenes still have to be fetched from `json_url`
    pub fn needs_fetch(&self) -> bool {
        self.scenes.is_empty() && self.config.json_url.is_some()
    }

    pub fn is_initialized(&self) -> bool {
        !self.scenes.is_empty()
    }

    // ------------------------------------------------------------------
    // Scene manager
    // ------------------------------------------------------------------

    /// Load the poster and video source of scene `id`
    #[instrument(skip(self), fields(generation))]
    pub fn load_scene(&mut self, id: usize) -> Result<()> {
        if self.scenes.is_empty() {
            return Err(Error::NotInitialized);
        }
        if id >= self.scenes.len() {
            return Err(Error::SceneOutOfRange {
                id,
                count: self.scenes.len(),
            });
        }

        let generation = self.generation.bump();
        tracing::Span::current().record("generation", generation.value());

        self.state.previous_id = self.state.current_id;
        self.state.current_id = id;
        self.state.next_id = self.scenes.next_id(id);
        self.monitor.reset();

        let Some(scene) = self.scenes.get(id) else {
            return Err(Error::SceneOutOfRange {
                id,
                count: self.scenes.len(),
            });
        };

        self.poster.set_visible(false);
        let variant = PosterVariant::for_width(self.platform.viewport().width);
        self.poster.set_source(scene.poster(variant));
        self.poster_variant = Some(variant);

        let platform = &self.platform;
        match scene.select_source(|codec| platform.supports_codec(codec)) {
            Some((codec, src)) => {
                self.video.set_source(Some(src));
                self.active_codec = Some(codec);
                self.state.playable = true;
            }
            None => {
                self.video.set_source(None);
                self.active_codec = None;
                self.state.playable = false;
            }
        }

        info!(
            id,
            title = %scene.title,
            poster = ?variant,
            codec = ?self.active_codec,
            playable = self.state.playable,
            "Scene loaded"
        );

        Ok(())
    }

    /// Advance to the next scene, wrapping to the first
    pub fn next(&mut self) -> Result<()> {
        if self.scenes.is_empty() {
            return Err(Error::NotInitialized);
        }
        self.load_scene(self.scenes.next_id(self.state.current_id))?;
        self.bus.emit(PlayerEvent::NextLoaded);
        Ok(())
    }

    /// Go back to the previous scene, wrapping to the last
    pub fn prev(&mut self) -> Result<()> {
        if self.scenes.is_empty() {
            return Err(Error::NotInitialized);
        }
        self.load_scene(self.scenes.prev_id(self.state.current_id))?;
        self.bus.emit(PlayerEvent::PrevLoaded);
        Ok(())
    }

    /// Start playback. Returns false, doing nothing, when the scene is not
    /// playable.
    pub fn play(&mut self) -> bool {
        self.play_then(|_| {})
    }

    /// Start playback and run `callback` right after issuing it
    pub fn play_then(&mut self, callback: impl FnOnce(&mut Self)) -> bool {
        if !self.state.playable {
            debug!(id = self.state.current_id, "Play ignored, scene not playable");
            return false;
        }
        self.video.set_visible(true);
        self.video.play();
        callback(self);
        true
    }

    pub fn pause(&mut self) {
        self.pause_then(|_| {})
    }

    /// Pause and run `callback` synchronously afterwards
    pub fn pause_then(&mut self, callback: impl FnOnce(&mut Self)) {
        self.video.pause();
        callback(self);
    }

    pub fn stop(&mut self) {
        self.stop_then(|_| {})
    }

    /// Pause and rewind, but only if the video ever rendered a range; a
    /// never-started video keeps its position. `stop` is emitted either way.
    pub fn stop_then(&mut self, callback: impl FnOnce(&mut Self)) {
        if self.state.playable && self.video.has_played() {
            self.pause_then(|controller| controller.video.set_current_time(0.0));
        }
        self.poster.set_visible(true);
        self.bus.emit(PlayerEvent::Stop);
        callback(self);
    }

    /// Apply the end-of-media policy. Exactly one branch runs.
    pub fn handle_ended(&mut self) -> Result<()> {
        debug!(id = self.state.current_id, policy = ?self.end_policy, "Media ended");
        match self.end_policy {
            EndPolicy::Loop => {
                self.play();
                Ok(())
            }
            EndPolicy::Repeat => self.next(),
            EndPolicy::Stop => {
                self.stop();
                Ok(())
            }
        }
    }

    // ------------------------------------------------------------------
    // Host events
    // ------------------------------------------------------------------

    /// Dispatch a lifecycle event from the video element
    pub fn handle_media_event(&mut self, event: MediaEvent) -> Result<()> {
        match event {
            MediaEvent::Progress => self.sample_progress(),
            MediaEvent::Ended => return self.handle_ended(),
            MediaEvent::LoadedData => self.resize(),
            MediaEvent::Playing => {
                self.poster.set_visible(false);
                self.classify(event);
            }
            _ => self.classify(event),
        }
        Ok(())
    }

    /// The poster image finished loading: show it and defer `scene_loaded`
    pub fn handle_poster_loaded(&mut self) {
        self.poster.set_visible(true);
        self.deferred
            .push(self.generation, DeferredTask::SceneLoaded(self.state.current_id));
    }

    /// Viewport resize or orientation change
    pub fn handle_viewport_change(&mut self) {
        self.resize();
    }

    /// Run deferred work queued for the current scene load. Tasks from
    /// superseded loads are discarded. Returns the number of tasks run.
    pub fn run_deferred(&mut self) -> usize {
        let tasks = self.deferred.drain(self.generation);
        let count = tasks.len();
        for task in tasks {
            match task {
                DeferredTask::SceneLoaded(id) => {
                    self.resize();
                    if self.config.autoplay {
                        self.play();
                    }
                    self.bus.emit(PlayerEvent::SceneLoaded(id));
                }
            }
        }
        count
    }

    pub fn has_deferred(&self) -> bool {
        !self.deferred.is_empty()
    }

    // ------------------------------------------------------------------
    // Playback monitor
    // ------------------------------------------------------------------

    fn sample_progress(&mut self) {
        if !self.state.playable {
            return;
        }
        let snapshot = self.video.snapshot();
        if let Some(health) = self.monitor.sample(&snapshot) {
            self.bus.emit(health.into());
        }
    }

    fn classify(&mut self, event: MediaEvent) {
        if let Some(health) = self.monitor.classify(event) {
            self.bus.emit(health.into());
        }
    }

    // ------------------------------------------------------------------
    // Layout
    // ------------------------------------------------------------------

    /// Target for a crop: explicit options, else the configured defaults,
    /// with the viewport filling anything unset
    pub fn layout_target(&self, options: Option<&CropOptions>) -> LayoutTarget {
        layout::resolve_target(options, &self.crop_defaults, self.platform.viewport())
    }

    /// Cover-fit an arbitrary surface
    pub fn crop_resize<S: Surface>(
        &self,
        surface: &mut S,
        options: Option<&CropOptions>,
    ) -> Option<Placement> {
        fit(surface, &self.layout_target(options))
    }

    /// Cover-fit the video, then the poster, to the default target
    pub fn resize(&mut self) {
        let target = self.layout_target(None);
        fit(&mut self.video, &target);
        fit(&mut self.poster, &target);
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn subscribe(&mut self, observer: impl PlayerObserver + 'static) -> SubscriptionId {
        self.bus.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    pub fn state(&self) -> PlayerState {
        PlayerState {
            is_buffering: self.monitor.is_buffering(),
            prev_time: self.monitor.prev_time(),
            ..self.state
        }
    }

    pub fn current_id(&self) -> usize {
        self.state.current_id
    }

    pub fn is_playable(&self) -> bool {
        self.state.playable
    }

    pub fn current_scene(&self) -> Option<&Scene> {
        self.scenes.get(self.state.current_id)
    }

    pub fn scenes(&self) -> &SceneList {
        &self.scenes
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn end_policy(&self) -> EndPolicy {
        self.end_policy
    }

    pub fn generation(&self) -> LoadGeneration {
        self.generation
    }

    pub fn poster_variant(&self) -> Option<PosterVariant> {
        self.poster_variant
    }

    pub fn active_codec(&self) -> Option<VideoCodec> {
        self.active_codec
    }

    /// Latest progress figures, if a sample has been taken for this scene
    pub fn progress(&self) -> Option<&ProgressReport> {
        self.monitor.last_report()
    }

    pub fn video(&self) -> &V {
        &self.video
    }

    pub fn video_mut(&mut self) -> &mut V {
        &mut self.video
    }

    pub fn poster(&self) -> &P {
        &self.poster
    }

    pub fn poster_mut(&mut self) -> &mut P {
        &mut self.poster
    }

    pub fn platform_mut(&mut self) -> &mut H {
        &mut self.platform
    }
}

/// Apply a cover-fit placement to `surface`, leaving it untouched when the
/// content has no usable size
fn fit<S: Surface>(surface: &mut S, target: &LayoutTarget) -> Option<Placement> {
    let natural = surface.natural_size();
    match layout::crop_resize(natural, target) {
        Some(placement) => {
            surface.apply_placement(&placement);
            Some(placement)
        }
        None => {
            warn!(natural = %natural, target = %target.size(), "Skipping crop of unsized content");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{EventLog, HeadlessPoster, HeadlessVideo, StaticPlatform};

    fn scene(title: &str, h264: bool) -> Scene {
        Scene {
            id: 0,
            title: title.to_string(),
            project: String::new(),
            category: String::new(),
            poster_smartphone: format!("{}-s.jpg", title),
            poster_tablet: format!("{}-t.jpg", title),
            poster_desktop: format!("{}-d.jpg", title),
            video_h264: h264.then(|| format!("{}.mp4", title)),
            video_webm: None,
        }
    }

    type Headless = PlayerController<HeadlessVideo, HeadlessPoster, StaticPlatform>;

    fn controller(config: PlayerConfig) -> Headless {
        PlayerController::new(
            config,
            HeadlessVideo::default(),
            HeadlessPoster::default(),
            StaticPlatform::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_end_policy_precedence() {
        assert_eq!(EndPolicy::new(true, true), EndPolicy::Loop);
        assert_eq!(EndPolicy::new(false, true), EndPolicy::Repeat);
        assert_eq!(EndPolicy::new(false, false), EndPolicy::Stop);
    }

    #[test]
    fn test_uninitialized_navigation_errors() {
        let mut c = controller(PlayerConfig::with_json_url("stage", "/scenes.json"));
        assert!(c.needs_fetch());
        assert!(matches!(c.next(), Err(Error::NotInitialized)));
        assert!(matches!(c.prev(), Err(Error::NotInitialized)));
        assert!(matches!(c.load_scene(0), Err(Error::NotInitialized)));
        assert!(!c.play());
    }

    #[test]
    fn test_poster_loaded_defers_scene_loaded() {
        let mut c = controller(PlayerConfig::with_scenes(
            "stage",
            vec![scene("a", true), scene("b", true)],
        ));
        let log = EventLog::new();
        c.subscribe(log.observer());

        c.handle_poster_loaded();
        assert!(c.poster().visible);
        assert!(log.events().is_empty());
        assert!(c.has_deferred());

        assert_eq!(c.run_deferred(), 1);
        assert_eq!(log.events(), vec![PlayerEvent::SceneLoaded(0)]);
    }

    #[test]
    fn test_stale_scene_loaded_discarded() {
        let mut c = controller(PlayerConfig::with_scenes(
            "stage",
            vec![scene("a", true), scene("b", true)],
        ));
        let log = EventLog::new();
        c.subscribe(log.observer());

        c.handle_poster_loaded();
        c.next().unwrap();
        assert_eq!(c.run_deferred(), 0);
        assert_eq!(log.events(), vec![PlayerEvent::NextLoaded]);
    }

    #[test]
    fn test_unplayable_scene_progress_ignored() {
        let mut c = controller(PlayerConfig::with_scenes("stage", vec![scene("still", false)]));
        let log = EventLog::new();
        c.subscribe(log.observer());

        assert!(!c.is_playable());
        assert_eq!(c.video().src, None);
        c.handle_media_event(MediaEvent::Progress).unwrap();
        assert!(log.events().is_empty());
        assert!(c.progress().is_none());
    }
}
