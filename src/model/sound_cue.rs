use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tone the presentation layer should play for a cue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency_hz: f32,
    pub duration: Duration,
    pub volume: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    Flip,
    Match,
    Wrong,
    Win,
}

impl SoundCue {
    pub fn tone(&self) -> Tone {
        let (frequency_hz, millis, volume) = match self {
            SoundCue::Flip => (400.0, 100, 0.1),
            SoundCue::Match => (600.0, 200, 0.15),
            SoundCue::Wrong => (200.0, 150, 0.1),
            SoundCue::Win => (800.0, 300, 0.2),
        };
        Tone {
            frequency_hz,
            duration: Duration::from_millis(millis),
            volume,
        }
    }
}
