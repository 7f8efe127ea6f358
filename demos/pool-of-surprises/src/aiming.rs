//! Click-and-drag launching.
//!
//! Holding the left button and dragging from a ball charges a launch in the
//! opposite direction of the drag; dragging from empty space orbits the
//! camera instead.

use cue_engine::{DotInstance, OrbitCamera};
use glam::{Vec2, Vec3};

use crate::balls::Ball;
use crate::config::AimTuning;

/// Base size of the trajectory dot nearest the ball's landing point.
const DOT_SIZE: f32 = 5.0;

/// What a pointer event turned into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AimOutcome {
    Idle,
    /// A ball was grabbed for launching.
    Picked(usize),
    /// The held launch changed.
    Charging,
    /// Drag on empty space; the camera should orbit by this many pixels.
    Orbit { dx: f32, dy: f32 },
    Launched { ball: usize, velocity: Vec3 },
    OrbitEnded,
}

/// Pointer state for the launch-or-orbit gesture.
#[derive(Debug, Clone, Default)]
pub struct Aimer {
    left_down: bool,
    orbiting: bool,
    /// Ball being aimed, if any.
    active: Option<usize>,
    launch_vel: Vec3,
    last_pointer: Option<Vec2>,
}

impl Aimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn is_launching(&self) -> bool {
        self.active.is_some()
    }

    pub fn is_orbiting(&self) -> bool {
        self.orbiting
    }

    pub fn launch_velocity(&self) -> Vec3 {
        self.launch_vel
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.left_down = true;
        self.last_pointer = Some(Vec2::new(x, y));
    }

    /// Track a pointer move. With `can_aim` false every drag orbits.
    pub fn pointer_move(
        &mut self,
        x: f32,
        y: f32,
        balls: &mut [Ball],
        camera: &OrbitCamera,
        tuning: &AimTuning,
        can_aim: bool,
    ) -> AimOutcome {
        let cursor = Vec2::new(x, y);
        let delta = self.last_pointer.map_or(Vec2::ZERO, |last| cursor - last);
        self.last_pointer = Some(cursor);

        if !self.left_down {
            return AimOutcome::Idle;
        }

        // Dragging left launches right; screen y grows downward
        let pull = camera.screen_to_table(Vec3::new(-delta.x, delta.y, 0.0)) * tuning.launch_gain;

        if let Some(i) = self.active {
            self.launch_vel = (self.launch_vel + pull).clamp_length_max(tuning.max_launch_speed);
            if balls.get(i).is_some_and(|b| b.is_rolling()) {
                balls[i].vel = Vec3::ZERO;
            }
            return AimOutcome::Charging;
        }

        if !self.orbiting && can_aim {
            if let Some(i) = launch_detection(balls, camera, cursor, tuning.pick_radius_px) {
                let ball = &mut balls[i];
                ball.vel = Vec3::ZERO;
                ball.dim();
                self.active = Some(i);
                self.launch_vel = pull.clamp_length_max(tuning.max_launch_speed);
                log::debug!("Picked ball {} at ({:.0}, {:.0})", ball.number, x, y);
                return AimOutcome::Picked(i);
            }
        }

        self.orbiting = true;
        AimOutcome::Orbit { dx: delta.x, dy: delta.y }
    }

    /// Release the left button. With `mirror_y` the launch leaves with its
    /// y component flipped.
    pub fn pointer_up(&mut self, x: f32, y: f32, balls: &mut [Ball], mirror_y: bool) -> AimOutcome {
        self.left_down = false;
        self.last_pointer = Some(Vec2::new(x, y));

        if let Some(i) = self.active.take() {
            let mut velocity = std::mem::take(&mut self.launch_vel);
            if mirror_y {
                velocity.y = -velocity.y;
            }
            return match balls.get_mut(i) {
                Some(ball) if ball.is_rolling() => {
                    ball.restore_color();
                    ball.vel = velocity;
                    AimOutcome::Launched { ball: i, velocity }
                }
                _ => AimOutcome::Idle,
            };
        }

        if std::mem::take(&mut self.orbiting) {
            return AimOutcome::OrbitEnded;
        }
        AimOutcome::Idle
    }

    /// Drop any held launch without firing it.
    pub fn cancel(&mut self, balls: &mut [Ball]) {
        if let Some(ball) = self.active.take().and_then(|i| balls.get_mut(i)) {
            ball.restore_color();
        }
        self.launch_vel = Vec3::ZERO;
        self.left_down = false;
        self.orbiting = false;
    }

    /// Preview points along the held launch, largest nearest the ball.
    pub fn trajectory(&self, balls: &[Ball], tuning: &AimTuning) -> Vec<DotInstance> {
        let Some(ball) = self.active.and_then(|i| balls.get(i)) else {
            return Vec::new();
        };
        let n = tuning.trajectory_dots;
        (1..=n)
            .map(|k| {
                let p = ball.pos + self.launch_vel * tuning.preview_seconds * (k as f32 / n as f32);
                DotInstance { x: p.x, y: p.y, z: p.z, size: DOT_SIZE + (n - k) as f32 }
            })
            .collect()
    }
}

/// Closest rolling ball whose projected center lies within `radius_px` of
/// `cursor` (window coordinates).
pub fn launch_detection(balls: &[Ball], camera: &OrbitCamera, cursor: Vec2, radius_px: f32) -> Option<usize> {
    balls
        .iter()
        .enumerate()
        .filter(|(_, b)| b.is_rolling())
        .filter_map(|(i, b)| {
            let screen = camera.world_to_screen(b.pos, true)?;
            let d = screen.distance(cursor);
            (d < radius_px).then_some((i, d))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balls::BallPhase;

    fn camera() -> OrbitCamera {
        OrbitCamera::new(500.0, 5000.0, Vec2::new(500.0, 500.0))
    }

    fn setup() -> (Vec<Ball>, OrbitCamera) {
        let balls = vec![
            Ball::new(0, Vec3::ZERO, 25.0),
            Ball::new(1, Vec3::new(150.0, 60.0, 0.0), 25.0),
        ];
        (balls, camera())
    }

    #[test]
    fn picks_closest_ball_under_cursor() {
        let (balls, cam) = setup();
        let on_ball = cam.world_to_screen(balls[1].pos, true).unwrap();
        assert_eq!(launch_detection(&balls, &cam, on_ball + Vec2::new(5.0, 0.0), 30.0), Some(1));
        assert_eq!(launch_detection(&balls, &cam, Vec2::new(10.0, 10.0), 30.0), None);
    }

    #[test]
    fn parked_balls_cannot_be_picked() {
        let (mut balls, cam) = setup();
        let at = cam.world_to_screen(balls[0].pos, true).unwrap();
        balls[0].phase = BallPhase::Parked;
        assert_eq!(launch_detection(&balls, &cam, at, 30.0), None);
    }

    #[test]
    fn drag_from_ball_launches_opposite_direction() {
        let (mut balls, cam) = setup();
        let tuning = AimTuning::default();
        let start = cam.world_to_screen(balls[0].pos, true).unwrap();
        balls[0].vel = Vec3::new(3.0, 3.0, 0.0);

        let mut aim = Aimer::new();
        aim.pointer_down(start.x, start.y);
        let picked = aim.pointer_move(start.x - 10.0, start.y, &mut balls, &cam, &tuning, true);
        assert_eq!(picked, AimOutcome::Picked(0));
        assert_eq!(balls[0].vel, Vec3::ZERO);
        assert!(balls[0].color.x < balls[0].base_color.x);

        let charging = aim.pointer_move(start.x - 20.0, start.y, &mut balls, &cam, &tuning, true);
        assert_eq!(charging, AimOutcome::Charging);
        assert_eq!(aim.trajectory(&balls, &tuning).len(), tuning.trajectory_dots);

        match aim.pointer_up(start.x - 20.0, start.y, &mut balls, false) {
            AimOutcome::Launched { ball, velocity } => {
                assert_eq!(ball, 0);
                assert!((velocity.x - 40.0).abs() < 1e-3);
                assert!(velocity.y.abs() < 1e-3);
            }
            other => panic!("expected launch, got {:?}", other),
        }
        assert_eq!(balls[0].color, balls[0].base_color);
        assert!(!aim.is_launching());
        assert!(aim.trajectory(&balls, &tuning).is_empty());
    }

    #[test]
    fn mirrored_launch_flips_y() {
        let (mut balls, cam) = setup();
        let tuning = AimTuning::default();
        let start = cam.world_to_screen(balls[0].pos, true).unwrap();
        let mut aim = Aimer::new();
        aim.pointer_down(start.x, start.y);
        // drag down the screen: launch toward +y
        aim.pointer_move(start.x, start.y + 10.0, &mut balls, &cam, &tuning, true);
        let AimOutcome::Launched { velocity, .. } = aim.pointer_up(start.x, start.y + 10.0, &mut balls, true) else {
            panic!("expected launch");
        };
        assert!((velocity.y + 20.0).abs() < 1e-3);
        assert_eq!(balls[0].vel, velocity);
    }

    #[test]
    fn drag_on_empty_space_orbits() {
        let (mut balls, cam) = setup();
        let tuning = AimTuning::default();
        let mut aim = Aimer::new();
        aim.pointer_down(10.0, 10.0);
        let outcome = aim.pointer_move(14.0, 7.0, &mut balls, &cam, &tuning, true);
        assert_eq!(outcome, AimOutcome::Orbit { dx: 4.0, dy: -3.0 });
        assert!(aim.is_orbiting());

        // sweeping over a ball mid-orbit does not grab it
        let over = cam.world_to_screen(balls[0].pos, true).unwrap();
        let outcome = aim.pointer_move(over.x, over.y, &mut balls, &cam, &tuning, true);
        assert!(matches!(outcome, AimOutcome::Orbit { .. }));
        assert_eq!(aim.pointer_up(over.x, over.y, &mut balls, false), AimOutcome::OrbitEnded);
    }

    #[test]
    fn aiming_disabled_turns_drag_into_orbit() {
        let (mut balls, cam) = setup();
        let tuning = AimTuning::default();
        let start = cam.world_to_screen(balls[0].pos, true).unwrap();
        let mut aim = Aimer::new();
        aim.pointer_down(start.x, start.y);
        let outcome = aim.pointer_move(start.x - 5.0, start.y, &mut balls, &cam, &tuning, false);
        assert!(matches!(outcome, AimOutcome::Orbit { .. }));
        assert!(!aim.is_launching());
    }

    #[test]
    fn launch_speed_is_capped() {
        let (mut balls, cam) = setup();
        let tuning = AimTuning { max_launch_speed: 50.0, ..AimTuning::default() };
        let start = cam.world_to_screen(balls[0].pos, true).unwrap();
        let mut aim = Aimer::new();
        aim.pointer_down(start.x, start.y);
        aim.pointer_move(start.x - 10.0, start.y, &mut balls, &cam, &tuning, true);
        for step in 2..40 {
            aim.pointer_move(start.x - 10.0 * step as f32, start.y, &mut balls, &cam, &tuning, true);
        }
        assert!(aim.launch_velocity().length() <= 50.0 + 1e-3);
    }

    #[test]
    fn hover_without_button_does_nothing() {
        let (mut balls, cam) = setup();
        let tuning = AimTuning::default();
        let mut aim = Aimer::new();
        let at = cam.world_to_screen(balls[0].pos, true).unwrap();
        assert_eq!(aim.pointer_move(at.x, at.y, &mut balls, &cam, &tuning, true), AimOutcome::Idle);
        assert_eq!(aim.pointer_up(at.x, at.y, &mut balls, false), AimOutcome::Idle);
    }

    #[test]
    fn cancel_restores_tint() {
        let (mut balls, cam) = setup();
        let tuning = AimTuning::default();
        let start = cam.world_to_screen(balls[0].pos, true).unwrap();
        let mut aim = Aimer::new();
        aim.pointer_down(start.x, start.y);
        aim.pointer_move(start.x - 3.0, start.y, &mut balls, &cam, &tuning, true);
        assert!(aim.is_launching());
        aim.cancel(&mut balls);
        assert!(!aim.is_launching());
        assert_eq!(balls[0].color, balls[0].base_color);
    }
}
