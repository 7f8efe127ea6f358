//! Pool ball state: palette, phases, and starting layouts.

use cue_engine::{BallInstance, Rng};
use glam::{Vec2, Vec3, Vec4};

use crate::config::{BallLayout, PoolConfig};
use crate::table::Table;

/// Radius of the unit sphere mesh every ball is drawn with. A ball's world
/// radius is `SPHERE_RADIUS * size`.
pub const SPHERE_RADIUS: f32 = 0.5;

/// Attempts at finding a non-overlapping scatter position before giving up.
const SCATTER_ATTEMPTS: usize = 32;

/// Ball type: solid (1-8) or striped (9-15)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallType {
    Cue,
    Solid,
    Striped,
}

/// Pool ball definition
#[derive(Debug, Clone, Copy)]
pub struct BallDef {
    pub number: u8,
    pub ball_type: BallType,
    pub color: [f32; 3],
}

/// All 16 pool balls (cue + 15 numbered)
pub const BALLS: [BallDef; 16] = [
    BallDef { number: 0, ball_type: BallType::Cue, color: [1.0, 1.0, 1.0] },
    BallDef { number: 1, ball_type: BallType::Solid, color: [1.0, 0.84, 0.0] },      // Yellow
    BallDef { number: 2, ball_type: BallType::Solid, color: [0.0, 0.0, 0.7] },       // Blue
    BallDef { number: 3, ball_type: BallType::Solid, color: [0.86, 0.0, 0.0] },      // Red
    BallDef { number: 4, ball_type: BallType::Solid, color: [0.39, 0.0, 0.55] },     // Purple
    BallDef { number: 5, ball_type: BallType::Solid, color: [1.0, 0.39, 0.0] },      // Orange
    BallDef { number: 6, ball_type: BallType::Solid, color: [0.0, 0.47, 0.0] },      // Green
    BallDef { number: 7, ball_type: BallType::Solid, color: [0.51, 0.12, 0.12] },    // Maroon
    BallDef { number: 8, ball_type: BallType::Solid, color: [0.04, 0.04, 0.04] },    // Black
    BallDef { number: 9, ball_type: BallType::Striped, color: [1.0, 0.84, 0.0] },
    BallDef { number: 10, ball_type: BallType::Striped, color: [0.0, 0.0, 0.7] },
    BallDef { number: 11, ball_type: BallType::Striped, color: [0.86, 0.0, 0.0] },
    BallDef { number: 12, ball_type: BallType::Striped, color: [0.39, 0.0, 0.55] },
    BallDef { number: 13, ball_type: BallType::Striped, color: [1.0, 0.39, 0.0] },
    BallDef { number: 14, ball_type: BallType::Striped, color: [0.0, 0.47, 0.0] },
    BallDef { number: 15, ball_type: BallType::Striped, color: [0.51, 0.12, 0.12] },
];

/// Where a ball is in its lifecycle. Only `Rolling` balls take part in
/// collisions, walls, pockets and aiming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallPhase {
    Rolling,
    /// Captured by a pocket, flying to the capture target.
    Sinking,
    /// Off the table for the rest of the game.
    Parked,
}

#[derive(Debug, Clone)]
pub struct Ball {
    pub number: u8,
    pub pos: Vec3,
    pub vel: Vec3,
    /// Accumulated rolling rotation, radians per axis.
    pub rot: Vec3,
    /// Tint; halved while the ball is being aimed.
    pub color: Vec4,
    pub base_color: Vec4,
    /// Radius scale. World radius is `SPHERE_RADIUS * size`.
    pub size: f32,
    pub phase: BallPhase,
}

impl Ball {
    pub fn new(number: u8, pos: Vec3, size: f32) -> Self {
        let [r, g, b] = BALLS[number as usize % BALLS.len()].color;
        let base_color = Vec4::new(r, g, b, 1.0);
        Self {
            number,
            pos,
            vel: Vec3::ZERO,
            rot: Vec3::ZERO,
            color: base_color,
            base_color,
            size,
            phase: BallPhase::Rolling,
        }
    }

    pub fn radius(&self) -> f32 {
        SPHERE_RADIUS * self.size
    }

    pub fn is_rolling(&self) -> bool {
        self.phase == BallPhase::Rolling
    }

    pub fn ball_type(&self) -> BallType {
        BALLS[self.number as usize % BALLS.len()].ball_type
    }

    /// Dim the tint while the ball is held for a launch.
    pub fn dim(&mut self) {
        self.color = (self.base_color.truncate() * 0.5).extend(self.base_color.w);
    }

    pub fn restore_color(&mut self) {
        self.color = self.base_color;
    }

    /// Change the size while keeping the ball's underside where it was.
    pub fn resize(&mut self, size: f32) {
        self.pos.z += SPHERE_RADIUS * (size - self.size);
        self.size = size;
    }

    pub fn to_instance(&self) -> BallInstance {
        BallInstance {
            x: self.pos.x,
            y: self.pos.y,
            z: self.pos.z,
            rot_x: self.rot.x,
            rot_y: self.rot.y,
            rot_z: self.rot.z,
            radius: self.radius(),
            r: self.color.x,
            g: self.color.y,
            b: self.color.z,
            a: self.color.w,
            number: self.number as f32,
        }
    }
}

/// Standard 8-ball triangle rack layout.
/// Returns positions for balls 1-15, indexed by number - 1.
/// The apex points toward -X (the cue ball), rows spread toward +X.
///
/// ```text
///  1
///  9   2
///  3   8  10
/// 11  4  5  12
///  6 13 14  7 15
/// ```
pub fn rack_positions(apex: Vec2, ball_radius: f32) -> [Vec2; 15] {
    // Tight rack with a hairline gap
    let gap = ball_radius * 2.0 + 1.0;
    let row_offset = gap * 0.866;

    let mut positions = [Vec2::ZERO; 15];

    // (ball_number, row, offset across the table)
    let layout: [(u8, usize, f32); 15] = [
        (1, 0, 0.0),
        (9, 1, -0.5), (2, 1, 0.5),
        (3, 2, -1.0), (8, 2, 0.0), (10, 2, 1.0),
        (11, 3, -1.5), (4, 3, -0.5), (5, 3, 0.5), (12, 3, 1.5),
        (6, 4, -2.0), (13, 4, -1.0), (14, 4, 0.0), (7, 4, 1.0), (15, 4, 2.0),
    ];

    for (ball_num, row, offset) in layout {
        let x = apex.x + (row as f32) * row_offset;
        let y = apex.y + offset * gap;
        positions[(ball_num - 1) as usize] = Vec2::new(x, y);
    }

    positions
}

/// Build the starting set of balls, numbered from 0 (cue) upward.
pub fn spawn_balls(config: &PoolConfig, table: &Table, rng: &mut Rng) -> Vec<Ball> {
    let size = config.default_ball_size();
    let count = config.num_balls.min(BALLS.len());
    match config.layout {
        BallLayout::Scattered => scatter(count, size, table, rng),
        BallLayout::Rack => rack(count, size, table),
    }
}

fn scatter(count: usize, size: f32, table: &Table, rng: &mut Rng) -> Vec<Ball> {
    let extent = table.spawn_extent();
    let min_gap = 2.0 * SPHERE_RADIUS * size;
    let mut balls: Vec<Ball> = Vec::with_capacity(count);

    for number in 0..count {
        let mut pos = Vec3::ZERO;
        for _ in 0..SCATTER_ATTEMPTS {
            pos = Vec3::new(
                rng.range_f32(-extent.x, extent.x),
                rng.range_f32(-extent.y, extent.y),
                0.0,
            );
            if balls.iter().all(|b| b.pos.distance(pos) >= min_gap) {
                break;
            }
        }
        balls.push(Ball::new(number as u8, pos, size));
    }
    balls
}

fn rack(count: usize, size: f32, table: &Table) -> Vec<Ball> {
    let quarter = table.dims.length * 0.25;
    let radius = SPHERE_RADIUS * size;
    let rack = rack_positions(Vec2::new(quarter, 0.0), radius);

    let mut balls = Vec::with_capacity(count);
    balls.push(Ball::new(0, Vec3::new(-quarter, 0.0, 0.0), size));
    for number in 1..count {
        let p = rack[number - 1];
        balls.push(Ball::new(number as u8, p.extend(0.0), size));
    }
    balls
}
