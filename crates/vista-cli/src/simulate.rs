//! Scripted playback simulation against headless surfaces

use crate::commands::load_scene_list;
use crate::output::{self, OutputFormat};
use serde::Serialize;
use tracing::debug;
use vista_core::headless::{EventLog, HeadlessPoster, HeadlessVideo, StaticPlatform};
use vista_core::{MediaEvent, PlayerConfig, PlayerController, PlayerEvent, Size, VideoCodec};

type HeadlessPlayer = PlayerController<HeadlessVideo, HeadlessPoster, StaticPlatform>;

/// Player settings for one simulation run
#[derive(Debug, Clone)]
pub struct SimulationOptions {
    pub viewport: String,
    pub codecs: Vec<String>,
    pub loop_scene: bool,
    pub repeat: bool,
    pub autoplay: bool,
    pub start: usize,
}

/// One scripted action
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    Next,
    Prev,
    Play,
    Pause,
    Stop,
    /// End of media
    Ended,
    /// The poster image finished loading
    Poster,
    /// Run deferred tasks
    Drain,
    Resize,
    Load(usize),
    /// Advance the clock and take a progress sample
    Tick(f64),
    Event(MediaEvent),
}

impl std::str::FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some((name, arg)) = s.split_once(':') {
            return match name {
                "load" => arg
                    .parse()
                    .map(Step::Load)
                    .map_err(|e| format!("bad scene id '{}': {}", arg, e)),
                "tick" => arg
                    .parse()
                    .map(Step::Tick)
                    .map_err(|e| format!("bad tick '{}': {}", arg, e)),
                "event" => MediaEvent::from_dom_name(arg)
                    .map(Step::Event)
                    .ok_or_else(|| format!("unknown media event '{}'", arg)),
                _ => Err(format!("unknown step '{}'", s)),
            };
        }

        match s {
            "next" => Ok(Step::Next),
            "prev" => Ok(Step::Prev),
            "play" => Ok(Step::Play),
            "pause" => Ok(Step::Pause),
            "stop" => Ok(Step::Stop),
            "ended" => Ok(Step::Ended),
            "poster" => Ok(Step::Poster),
            "drain" => Ok(Step::Drain),
            "resize" => Ok(Step::Resize),
            _ => Err(format!("unknown step '{}'", s)),
        }
    }
}

/// Outcome of one step
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: String,
    pub notifications: Vec<PlayerEvent>,
    pub current_id: usize,
    pub playable: bool,
    pub is_buffering: bool,
    pub current_time: f64,
    pub poster_visible: bool,
}

/// Apply one step to the player
pub fn apply(player: &mut HeadlessPlayer, step: Step) -> vista_core::Result<()> {
    match step {
        Step::Next => player.next()?,
        Step::Prev => player.prev()?,
        Step::Play => {
            player.play();
        }
        Step::Pause => player.pause(),
        Step::Stop => player.stop(),
        Step::Ended => player.handle_media_event(MediaEvent::Ended)?,
        Step::Poster => player.handle_poster_loaded(),
        Step::Drain => {
            let ran = player.run_deferred();
            debug!(ran, "Deferred tasks drained");
        }
        Step::Resize => player.handle_viewport_change(),
        Step::Load(id) => player.load_scene(id)?,
        Step::Tick(seconds) => {
            let video = player.video_mut();
            video.advance(seconds);
            video.buffered_end = Some(video.current_time + 5.0);
            player.handle_media_event(MediaEvent::Progress)?;
        }
        Step::Event(event) => player.handle_media_event(event)?,
    }
    Ok(())
}

fn build_player(
    options: &SimulationOptions,
    scenes: vista_core::SceneList,
) -> anyhow::Result<HeadlessPlayer> {
    let viewport: Size = options.viewport.parse().map_err(anyhow::Error::msg)?;
    let codecs = options
        .codecs
        .iter()
        .map(|c| c.parse::<VideoCodec>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(anyhow::Error::msg)?;

    let mut config = PlayerConfig::with_scenes("simulation", scenes.iter().cloned().collect());
    config.loop_scene = options.loop_scene;
    config.repeat = options.repeat;
    config.autoplay = options.autoplay;
    config.starting_video_id = options.start;

    let video = HeadlessVideo {
        duration: 30.0,
        ..HeadlessVideo::default()
    };

    Ok(PlayerController::new(
        config,
        video,
        HeadlessPoster::default(),
        StaticPlatform::new(viewport, codecs),
    )?)
}

/// Run the scripted steps and print what the player emitted
pub async fn run(
    source: &str,
    options: SimulationOptions,
    steps: &[String],
    format: &str,
) -> anyhow::Result<()> {
    let steps = parse_steps(steps).map_err(anyhow::Error::msg)?;

    let scenes = load_scene_list(source).await?;
    let mut player = build_player(&options, scenes)?;
    let log = EventLog::new();
    player.subscribe(log.observer());

    let mut reports = Vec::with_capacity(steps.len());
    for (raw, step) in steps {
        apply(&mut player, step)?;
        let state = player.state();
        reports.push(StepReport {
            step: raw,
            notifications: log.take(),
            current_id: state.current_id,
            playable: state.playable,
            is_buffering: state.is_buffering,
            current_time: player.video().current_time,
            poster_visible: player.poster().visible,
        });
    }

    if OutputFormat::from(format) == OutputFormat::Json {
        println!("{}", output::to_json(&reports));
        return Ok(());
    }

    for report in &reports {
        let notes = report
            .notifications
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{:<14} scene={} playable={} t={:.2} poster={} -> [{}]",
            report.step,
            report.current_id,
            report.playable,
            report.current_time,
            if report.poster_visible { "shown" } else { "hidden" },
            notes
        );
    }
    Ok(())
}

/// Parse steps, keeping each one's text as typed for the report
fn parse_steps(steps: &[String]) -> Result<Vec<(String, Step)>, String> {
    steps
        .iter()
        .map(|raw| raw.parse::<Step>().map(|step| (raw.clone(), step)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vista_core::{Scene, SceneList};

    fn scenes() -> SceneList {
        SceneList::new(
            ["a", "b", "c"]
                .iter()
                .map(|name| Scene {
                    id: 0,
                    title: name.to_string(),
                    project: String::new(),
                    category: String::new(),
                    poster_smartphone: format!("{}-s.jpg", name),
                    poster_tablet: format!("{}-t.jpg", name),
                    poster_desktop: format!("{}-d.jpg", name),
                    video_h264: Some(format!("{}.mp4", name)),
                    video_webm: None,
                })
                .collect(),
        )
    }

    fn options() -> SimulationOptions {
        SimulationOptions {
            viewport: "1280x720".to_string(),
            codecs: vec!["h264".to_string()],
            loop_scene: false,
            repeat: true,
            autoplay: true,
            start: 0,
        }
    }

    #[test]
    fn test_parse_steps() {
        assert_eq!("next".parse::<Step>(), Ok(Step::Next));
        assert_eq!("load:2".parse::<Step>(), Ok(Step::Load(2)));
        assert_eq!("tick:0.5".parse::<Step>(), Ok(Step::Tick(0.5)));
        assert_eq!("event:waiting".parse::<Step>(), Ok(Step::Event(MediaEvent::Waiting)));
        assert!("event:bogus".parse::<Step>().is_err());
        assert!("rewind".parse::<Step>().is_err());
    }

    #[test]
    fn test_steps_keep_typed_text() {
        let typed = ["tick:1", "event:waiting", "load:2"].map(String::from);
        let parsed = parse_steps(&typed).unwrap();
        let labels: Vec<&str> = parsed.iter().map(|(raw, _)| raw.as_str()).collect();
        assert_eq!(labels, ["tick:1", "event:waiting", "load:2"]);
        assert_eq!(parsed[0].1, Step::Tick(1.0));

        let err = parse_steps(&["next".to_string(), "rewind".to_string()]).unwrap_err();
        assert!(err.contains("rewind"));
    }

    #[test]
    fn test_scripted_session() {
        let mut player = build_player(&options(), scenes()).unwrap();
        let log = EventLog::new();
        player.subscribe(log.observer());

        for step in [Step::Poster, Step::Drain, Step::Tick(1.0), Step::Ended] {
            apply(&mut player, step).unwrap();
        }

        assert_eq!(
            log.events(),
            vec![PlayerEvent::SceneLoaded(0), PlayerEvent::Buffered, PlayerEvent::NextLoaded]
        );
        assert_eq!(player.current_id(), 1);
    }

    #[test]
    fn test_unknown_codec_rejected() {
        let mut opts = options();
        opts.codecs = vec!["theora".to_string()];
        assert!(build_player(&opts, scenes()).is_err());
    }
}
