use serde::Serialize;
use std::fmt;

/// The two independent assistant request tracks of a viewing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Track {
    Chat,
    Report,
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Track::Chat => f.write_str("chat"),
            Track::Report => f.write_str("report"),
        }
    }
}

/// Idle -> Awaiting -> Idle. At most one request in flight per track.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrackState {
    #[default]
    Idle,
    Awaiting,
}

impl TrackState {
    pub fn is_busy(&self) -> bool {
        *self == TrackState::Awaiting
    }
}
