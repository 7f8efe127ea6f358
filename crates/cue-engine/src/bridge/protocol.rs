/// Shared-buffer layout.
/// Must stay in sync with the host's `protocol.ts`.
///
/// Layout (all values in f32 / 4 bytes):
/// ```text
/// [Header: 16 floats]
/// [Camera: 20 floats]            view_proj (16) + eye (4)
/// [Balls: max_balls × 12 floats]
/// [Dots: max_dots × 4 floats]
/// [Sounds: max_sounds × 1 float]
/// [Events: max_events × 4 floats]
/// ```
///
/// Capacities are written once into the header at init.
/// The host reads them from the header to compute offsets dynamically.

use crate::api::game::GameConfig;

/// Number of floats in the header section.
pub const HEADER_FLOATS: usize = 16;

/// Header field indices.
pub const HEADER_LOCK: usize = 0;
pub const HEADER_FRAME_COUNTER: usize = 1;
pub const HEADER_MAX_BALLS: usize = 2;
pub const HEADER_BALL_COUNT: usize = 3;
pub const HEADER_MAX_DOTS: usize = 4;
pub const HEADER_DOT_COUNT: usize = 5;
pub const HEADER_VIEWPORT_WIDTH: usize = 6;
pub const HEADER_VIEWPORT_HEIGHT: usize = 7;
pub const HEADER_MAX_SOUNDS: usize = 8;
pub const HEADER_SOUND_COUNT: usize = 9;
pub const HEADER_MAX_EVENTS: usize = 10;
pub const HEADER_EVENT_COUNT: usize = 11;
pub const HEADER_PROTOCOL_VERSION: usize = 12;

/// Protocol version written into the header.
pub const PROTOCOL_VERSION: f32 = 1.0;

/// Floats for the camera block (fixed wire format).
pub const CAMERA_FLOATS: usize = 20;

/// Floats per ball instance (fixed wire format).
pub const BALL_FLOATS: usize = 12;

/// Floats per trajectory dot: x, y, z, size.
pub const DOT_FLOATS: usize = 4;

/// Floats per game event: kind, a, b, c.
pub const EVENT_FLOATS: usize = 4;

/// Runtime-computed buffer layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolLayout {
    pub max_balls: usize,
    pub max_dots: usize,
    pub max_sounds: usize,
    pub max_events: usize,

    /// Offset (in floats) where the camera block begins.
    pub camera_offset: usize,
    /// Offset (in floats) where ball data begins.
    pub ball_data_offset: usize,
    /// Offset (in floats) where dot data begins.
    pub dot_data_offset: usize,
    /// Offset (in floats) where sound data begins.
    pub sound_data_offset: usize,
    /// Offset (in floats) where event data begins.
    pub event_data_offset: usize,

    /// Total buffer size in floats.
    pub buffer_total_floats: usize,
    /// Total buffer size in bytes.
    pub buffer_total_bytes: usize,
}

impl ProtocolLayout {
    /// Compute layout from raw capacity values.
    pub fn new(max_balls: usize, max_dots: usize, max_sounds: usize, max_events: usize) -> Self {
        let camera_offset = HEADER_FLOATS;
        let ball_data_offset = camera_offset + CAMERA_FLOATS;
        let dot_data_offset = ball_data_offset + max_balls * BALL_FLOATS;
        let sound_data_offset = dot_data_offset + max_dots * DOT_FLOATS;
        let event_data_offset = sound_data_offset + max_sounds;
        let buffer_total_floats = event_data_offset + max_events * EVENT_FLOATS;

        Self {
            max_balls,
            max_dots,
            max_sounds,
            max_events,
            camera_offset,
            ball_data_offset,
            dot_data_offset,
            sound_data_offset,
            event_data_offset,
            buffer_total_floats,
            buffer_total_bytes: buffer_total_floats * 4,
        }
    }

    /// Compute layout from a GameConfig.
    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.max_balls, config.max_dots, config.max_sounds, config.max_events)
    }

    /// Header values the host reads at startup and again after each asset load.
    pub fn header(&self, config: &GameConfig) -> [f32; HEADER_FLOATS] {
        let mut header = [0.0; HEADER_FLOATS];
        header[HEADER_MAX_BALLS] = self.max_balls as f32;
        header[HEADER_MAX_DOTS] = self.max_dots as f32;
        header[HEADER_VIEWPORT_WIDTH] = config.viewport_width;
        header[HEADER_VIEWPORT_HEIGHT] = config.viewport_height;
        header[HEADER_MAX_SOUNDS] = self.max_sounds as f32;
        header[HEADER_MAX_EVENTS] = self.max_events as f32;
        header[HEADER_PROTOCOL_VERSION] = PROTOCOL_VERSION;
        header
    }
}
