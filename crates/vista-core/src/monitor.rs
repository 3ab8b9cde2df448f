//! Playback-state monitor
//!
//! Infers whether the video is BUFFERED (renderable) or BUFFERING (stalled)
//! from two signals: periodic progress samples and discrete lifecycle events.
//! Browser `readyState` is deliberately not consulted.

use crate::events::{BufferHealth, MediaEvent};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Raw readings taken from the video element at a progress tick
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MediaSnapshot {
    pub current_time: f64,
    pub duration: f64,
    /// End of the last buffered range, `None` when nothing is buffered
    pub buffered_end: Option<f64>,
    pub paused: bool,
}

/// Derived figures for one progress sample
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProgressReport {
    pub current_time: f64,
    /// Duration rounded to whole seconds
    pub duration: f64,
    /// Buffered end rounded to whole seconds
    pub buffered: f64,
    /// Advisory only, never used for classification
    pub percentage: f64,
}

impl ProgressReport {
    fn from_snapshot(snapshot: &MediaSnapshot) -> Self {
        let duration = snapshot.duration.round();
        let buffered = snapshot.buffered_end.unwrap_or(0.0).round();
        let percentage = if duration.is_finite() && duration > 0.0 {
            ((buffered * 100.0) / duration).round()
        } else {
            0.0
        };

        Self {
            current_time: snapshot.current_time,
            duration,
            buffered,
            percentage,
        }
    }
}

/// Monitor tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Ignore `stalled`; some engines fire it while playback is smooth
    pub suppress_stalled: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            suppress_stalled: true,
        }
    }
}

/// Buffering inference state
#[derive(Debug, Clone)]
pub struct PlaybackMonitor {
    config: MonitorConfig,
    /// Playback time at the previous sample
    prev_time: f64,
    is_buffering: bool,
    last_report: Option<ProgressReport>,
}

impl PlaybackMonitor {
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            config,
            prev_time: 0.0,
            is_buffering: true,
            last_report: None,
        }
    }

    pub fn prev_time(&self) -> f64 {
        self.prev_time
    }

    pub fn is_buffering(&self) -> bool {
        self.is_buffering
    }

    pub fn last_report(&self) -> Option<&ProgressReport> {
        self.last_report.as_ref()
    }

    /// Classify one progress sample.
    ///
    /// Returns `None` during the startup grace period: playing, but the
    /// clock has not left zero yet.
    pub fn sample(&mut self, snapshot: &MediaSnapshot) -> Option<BufferHealth> {
        let report = ProgressReport::from_snapshot(snapshot);
        self.last_report = Some(report);

        let health = if !snapshot.paused {
            if report.current_time != self.prev_time {
                self.prev_time = report.current_time;
                Some(BufferHealth::Buffered)
            } else if report.current_time != 0.0 {
                Some(BufferHealth::Buffering)
            } else {
                self.prev_time = 0.0;
                None
            }
        } else if report.buffered > report.current_time {
            // Paused with unrendered content ahead
            Some(BufferHealth::Buffered)
        } else {
            Some(BufferHealth::Buffering)
        };

        debug!(
            current_time = report.current_time,
            buffered = report.buffered,
            percentage = report.percentage,
            paused = snapshot.paused,
            health = ?health,
            "Progress sample"
        );

        if let Some(health) = health {
            self.record(health);
        }
        health
    }

    /// Classify a discrete lifecycle event
    pub fn classify(&mut self, event: MediaEvent) -> Option<BufferHealth> {
        let health = match event {
            MediaEvent::CanPlay
            | MediaEvent::Playing
            | MediaEvent::CanPlayThrough
            | MediaEvent::TimeUpdate => Some(BufferHealth::Buffered),
            MediaEvent::Waiting | MediaEvent::Error | MediaEvent::Seeking => {
                Some(BufferHealth::Buffering)
            }
            MediaEvent::Stalled if !self.config.suppress_stalled => Some(BufferHealth::Buffering),
            _ => None,
        };

        if let Some(health) = health {
            self.record(health);
        }
        health
    }

    /// Forget the time baseline, used when a new scene is loaded
    pub fn reset(&mut self) {
        self.prev_time = 0.0;
        self.last_report = None;
    }

    fn record(&mut self, health: BufferHealth) {
        self.is_buffering = health == BufferHealth::Buffering;
    }
}

impl Default for PlaybackMonitor {
    fn default() -> Self {
        Self::new(MonitorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing(t: f64) -> MediaSnapshot {
        MediaSnapshot {
            current_time: t,
            duration: 60.0,
            buffered_end: Some(30.0),
            paused: false,
        }
    }

    fn paused(t: f64, buffered_end: Option<f64>) -> MediaSnapshot {
        MediaSnapshot {
            current_time: t,
            duration: 60.0,
            buffered_end,
            paused: true,
        }
    }

    #[test]
    fn test_advancing_clock_is_buffered() {
        let mut monitor = PlaybackMonitor::default();
        assert_eq!(monitor.sample(&playing(1.5)), Some(BufferHealth::Buffered));
        assert_eq!(monitor.prev_time(), 1.5);
        assert_eq!(monitor.sample(&playing(2.0)), Some(BufferHealth::Buffered));
        assert!(!monitor.is_buffering());
    }

    #[test]
    fn test_frozen_clock_is_buffering() {
        let mut monitor = PlaybackMonitor::default();
        monitor.sample(&playing(4.25));
        assert_eq!(monitor.sample(&playing(4.25)), Some(BufferHealth::Buffering));
        assert!(monitor.is_buffering());
    }

    #[test]
    fn test_startup_grace() {
        let mut monitor = PlaybackMonitor::default();
        assert_eq!(monitor.sample(&playing(0.0)), None);
        assert_eq!(monitor.prev_time(), 0.0);
        assert_eq!(monitor.sample(&playing(0.0)), None);
    }

    #[test]
    fn test_paused_with_content_ahead() {
        let mut monitor = PlaybackMonitor::default();
        assert_eq!(monitor.sample(&paused(10.0, Some(20.2))), Some(BufferHealth::Buffered));
        assert_eq!(monitor.sample(&paused(20.0, Some(20.2))), Some(BufferHealth::Buffering));
        assert_eq!(monitor.sample(&paused(0.0, None)), Some(BufferHealth::Buffering));
    }

    #[test]
    fn test_report_figures() {
        let mut monitor = PlaybackMonitor::default();
        monitor.sample(&MediaSnapshot {
            current_time: 3.0,
            duration: 39.6,
            buffered_end: Some(9.7),
            paused: false,
        });
        let report = monitor.last_report().unwrap();
        assert_eq!(report.duration, 40.0);
        assert_eq!(report.buffered, 10.0);
        assert_eq!(report.percentage, 25.0);

        monitor.sample(&MediaSnapshot {
            current_time: 3.5,
            duration: f64::NAN,
            buffered_end: None,
            paused: false,
        });
        assert_eq!(monitor.last_report().unwrap().percentage, 0.0);
    }

    #[test]
    fn test_event_classification() {
        let mut monitor = PlaybackMonitor::default();
        for event in [
            MediaEvent::CanPlay,
            MediaEvent::Playing,
            MediaEvent::CanPlayThrough,
            MediaEvent::TimeUpdate,
        ] {
            assert_eq!(monitor.classify(event), Some(BufferHealth::Buffered));
        }
        for event in [MediaEvent::Waiting, MediaEvent::Error, MediaEvent::Seeking] {
            assert_eq!(monitor.classify(event), Some(BufferHealth::Buffering));
        }
        assert_eq!(monitor.classify(MediaEvent::VolumeChange), None);
        assert_eq!(monitor.classify(MediaEvent::Ended), None);
    }

    #[test]
    fn test_stalled_policy() {
        let mut monitor = PlaybackMonitor::default();
        assert_eq!(monitor.classify(MediaEvent::Stalled), None);

        let mut strict = PlaybackMonitor::new(MonitorConfig {
            suppress_stalled: false,
        });
        assert_eq!(strict.classify(MediaEvent::Stalled), Some(BufferHealth::Buffering));
    }
}
