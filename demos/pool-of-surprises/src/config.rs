//! Tuning knobs, loadable from `config.json`. Every field has a default, so a
//! partial file only overrides what it names.

use serde::{Deserialize, Serialize};

/// How balls are placed at the start of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BallLayout {
    /// Random positions across the table.
    Scattered,
    /// Cue ball plus a triangle rack.
    Rack,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Side of the cube the scene is scaled into; sets the ball size.
    pub view_volume_side: f32,
    pub num_balls: usize,
    pub layout: BallLayout,
    pub seed: u64,
    pub table: TableTuning,
    pub physics: PhysicsTuning,
    pub aiming: AimTuning,
    pub chaos: ChaosTuning,
    /// Seconds before the intro hands over to play.
    pub intro_seconds: f32,
    /// Seconds a chaos or congratulation banner stays up.
    pub banner_seconds: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableTuning {
    /// Extent along x, used until a table mesh is loaded.
    pub length: f32,
    /// Extent along y.
    pub width: f32,
    /// Rail thickness subtracted (in total) from each extent for the play area.
    pub rail_margin: f32,
    /// Pocket distance in from each table edge.
    pub pocket_inset: f32,
    /// Margin kept free of balls when scattering.
    pub spawn_margin: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    /// Velocity retained per tick.
    pub friction: f32,
    /// Velocity retained per tick under Friction Affliction.
    pub heavy_friction: f32,
    /// Speeds below this snap to zero.
    pub rest_speed: f32,
    /// Planar capture radius around each pocket.
    pub pocket_radius: f32,
    /// Where sinking balls fly to.
    pub capture_target: [f32; 3],
    pub capture_speed: f32,
    /// Distance from the capture target at which a ball is parked.
    pub capture_distance: f32,
    /// Off-table resting place for parked balls.
    pub parked_position: [f32; 3],
    /// Sideways drift per second under Tilt-a-Table.
    pub tilt_drift: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AimTuning {
    /// Cursor distance (pixels) within which a ball can be picked.
    pub pick_radius_px: f32,
    /// Launch speed per pixel of drag.
    pub launch_gain: f32,
    pub max_launch_speed: f32,
    /// Seconds of travel the trajectory preview covers.
    pub preview_seconds: f32,
    pub trajectory_dots: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChaosTuning {
    pub enabled: bool,
    /// Ticks between transitions are drawn from [min, max).
    pub period_min_frames: u32,
    pub period_max_frames: u32,
    /// Each ball is affected with probability 1 / odds.
    pub selection_odds: u32,
    pub hover_height: f32,
    pub hover_amplitude: f32,
    pub grow_factor: f32,
    pub shrink_factor: f32,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            view_volume_side: 500.0,
            num_balls: 16,
            layout: BallLayout::Scattered,
            seed: 0x5eed_ba11,
            table: TableTuning::default(),
            physics: PhysicsTuning::default(),
            aiming: AimTuning::default(),
            chaos: ChaosTuning::default(),
            intro_seconds: 3.0,
            banner_seconds: 3.0,
        }
    }
}

impl Default for TableTuning {
    fn default() -> Self {
        Self {
            length: 500.0,
            width: 250.0,
            rail_margin: 75.0,
            pocket_inset: 50.0,
            spawn_margin: 100.0,
        }
    }
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            friction: 0.99,
            heavy_friction: 0.8,
            rest_speed: 0.5,
            pocket_radius: 20.0,
            capture_target: [0.0, 0.0, 200.0],
            capture_speed: 400.0,
            capture_distance: 25.0,
            parked_position: [0.0, 0.0, -1000.0],
            tilt_drift: 60.0,
        }
    }
}

impl Default for AimTuning {
    fn default() -> Self {
        Self {
            pick_radius_px: 30.0,
            launch_gain: 2.0,
            max_launch_speed: 900.0,
            preview_seconds: 0.5,
            trajectory_dots: 5,
        }
    }
}

impl Default for ChaosTuning {
    fn default() -> Self {
        Self {
            enabled: true,
            period_min_frames: 300,
            period_max_frames: 450,
            selection_odds: 4,
            hover_height: 50.0,
            hover_amplitude: 10.0,
            grow_factor: 3.0,
            shrink_factor: 0.5,
        }
    }
}

impl PoolConfig {
    /// Upper bound on balls: one texture per number, 0 through 15.
    pub const MAX_BALLS: usize = 16;

    /// Parse a tuning file. Values are clamped into workable ranges.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: PoolConfig = serde_json::from_str(json)?;
        Ok(config.normalized())
    }

    /// Default ball radius-scale.
    pub fn default_ball_size(&self) -> f32 {
        self.view_volume_side / 20.0
    }

    /// Clamp values that would break the simulation.
    pub fn normalized(mut self) -> Self {
        self.num_balls = self.num_balls.clamp(1, Self::MAX_BALLS);
        self.view_volume_side = self.view_volume_side.max(1.0);
        self.physics.friction = self.physics.friction.clamp(0.0, 1.0);
        self.physics.heavy_friction = self.physics.heavy_friction.clamp(0.0, 1.0);
        self.physics.capture_speed = self.physics.capture_speed.max(1.0);
        self.aiming.trajectory_dots = self.aiming.trajectory_dots.min(32);
        self.chaos.period_min_frames = self.chaos.period_min_frames.max(1);
        self.chaos.period_max_frames = self.chaos.period_max_frames.max(self.chaos.period_min_frames + 1);
        self.chaos.selection_odds = self.chaos.selection_odds.max(1);
        self
    }
}
