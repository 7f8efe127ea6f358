//! Ball-ball contact, rail reflection, pocket capture and integration.
//!
//! Everything here is a pure function over the ball slice; the game turns the
//! returned `StepReport` into sounds and events.

use glam::Vec3;

use crate::balls::{Ball, BallPhase};
use crate::config::PhysicsTuning;
use crate::table::Table;

/// Chaos-driven tweaks the step honours.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Rails stop balls dead instead of reflecting them.
    pub sticky_walls: bool,
    pub heavy_friction: bool,
    /// Balls drift along +x.
    pub tilted: bool,
}

/// What happened during one step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    /// (ball, other) for every contact resolved.
    pub collisions: Vec<(usize, usize)>,
    /// Balls clamped back inside the rails.
    pub wall_hits: Vec<usize>,
    /// (ball, pocket) for balls captured this step.
    pub pocketed: Vec<(usize, usize)>,
    /// Balls that finished sinking and left the table.
    pub parked: Vec<usize>,
}

impl StepReport {
    pub fn is_quiet(&self) -> bool {
        self.collisions.is_empty()
            && self.wall_hits.is_empty()
            && self.pocketed.is_empty()
            && self.parked.is_empty()
    }
}

/// Advance every ball by `dt`.
pub fn step(
    balls: &mut [Ball],
    table: &Table,
    tuning: &PhysicsTuning,
    default_size: f32,
    mods: Modifiers,
    dt: f32,
) -> StepReport {
    let mut report = StepReport::default();
    let friction = if mods.heavy_friction { tuning.heavy_friction } else { tuning.friction };

    for i in 0..balls.len() {
        match balls[i].phase {
            BallPhase::Parked => continue,
            BallPhase::Sinking => {
                if advance_sinking(&mut balls[i], tuning, dt) {
                    report.parked.push(i);
                }
                continue;
            }
            BallPhase::Rolling => {}
        }

        if let Some(pocket) = hole_detection(&mut balls[i], table, tuning, default_size) {
            report.pocketed.push((i, pocket));
            continue;
        }

        if let Some(j) = collision_detection(balls, i) {
            report.collisions.push((i, j));
        }

        let ball = &mut balls[i];
        ball.pos += ball.vel * dt;
        if mods.tilted {
            ball.pos.x += tuning.tilt_drift * dt;
        }

        if boundary_detection(ball, table, mods.sticky_walls) {
            report.wall_hits.push(i);
        }

        ball.vel *= friction;
        if ball.vel.length() < tuning.rest_speed {
            ball.vel = Vec3::ZERO;
        }

        roll(ball, dt);
    }

    // A contact resolved late in the loop can push an earlier ball into a rail
    for i in 0..balls.len() {
        if balls[i].is_rolling()
            && boundary_detection(&mut balls[i], table, mods.sticky_walls)
            && !report.wall_hits.contains(&i)
        {
            report.wall_hits.push(i);
        }
    }

    report
}

/// Resolve the first rolling ball overlapping ball `i`, if any.
///
/// Only one contact per ball per step is handled; a ball wedged between two
/// others sorts out the second contact on a later step.
pub fn collision_detection(balls: &mut [Ball], i: usize) -> Option<usize> {
    if !balls[i].is_rolling() {
        return None;
    }
    for j in 0..balls.len() {
        if j == i || !balls[j].is_rolling() {
            continue;
        }
        let (a, b) = pair_mut(balls, i, j);
        if resolve_contact(a, b) {
            return Some(j);
        }
    }
    None
}

/// Separate two overlapping balls and swap their normal velocities.
/// Returns false (and leaves both untouched) when they do not overlap.
pub fn resolve_contact(a: &mut Ball, b: &mut Ball) -> bool {
    let delta = a.pos - b.pos;
    let dist = delta.length();
    let reach = a.radius() + b.radius();
    if dist >= reach {
        return false;
    }

    let normal = if dist > f32::EPSILON { delta / dist } else { Vec3::X };
    let half_overlap = (reach - dist) * 0.5;
    a.pos += normal * half_overlap;
    b.pos -= normal * half_overlap;

    let va = a.vel.dot(normal);
    let vb = b.vel.dot(normal);
    a.vel += normal * (vb - va);
    b.vel += normal * (va - vb);
    true
}

/// Clamp a ball inside the rails and point its velocity back into play.
/// Returns true if it touched one.
pub fn boundary_detection(ball: &mut Ball, table: &Table, sticky: bool) -> bool {
    let r = ball.radius();
    let mut hit = false;

    let x_limit = (table.x_thresh - r).max(0.0);
    if ball.pos.x.abs() > x_limit {
        let side = ball.pos.x.signum();
        ball.pos.x = side * x_limit;
        if sticky {
            ball.vel.x = 0.0;
            ball.vel.y = 0.0;
        } else {
            ball.vel.x = -side * ball.vel.x.abs();
        }
        hit = true;
    }

    let y_limit = (table.y_thresh - r).max(0.0);
    if ball.pos.y.abs() > y_limit {
        let side = ball.pos.y.signum();
        ball.pos.y = side * y_limit;
        if sticky {
            ball.vel.x = 0.0;
            ball.vel.y = 0.0;
        } else {
            ball.vel.y = -side * ball.vel.y.abs();
        }
        hit = true;
    }

    hit
}

/// Capture a rolling ball that rests on the table over a pocket.
/// Floating balls pass over pockets.
pub fn hole_detection(
    ball: &mut Ball,
    table: &Table,
    tuning: &PhysicsTuning,
    default_size: f32,
) -> Option<usize> {
    if !ball.is_rolling() || ball.pos.z > ball.radius() {
        return None;
    }
    let pocket = table.pocket_near(ball.pos, tuning.pocket_radius)?;

    ball.phase = BallPhase::Sinking;
    ball.size = 2.0 * default_size;
    ball.restore_color();
    let target = Vec3::from(tuning.capture_target);
    ball.vel = (target - ball.pos).normalize_or_zero() * tuning.capture_speed;
    Some(pocket)
}

/// Move a sinking ball toward the capture target. Returns true once parked.
fn advance_sinking(ball: &mut Ball, tuning: &PhysicsTuning, dt: f32) -> bool {
    let target = Vec3::from(tuning.capture_target);
    let to_target = target - ball.pos;
    let travel = tuning.capture_speed * dt;

    if to_target.length() <= tuning.capture_distance.max(travel) {
        park(ball, tuning);
        return true;
    }

    ball.vel = to_target.normalize_or_zero() * tuning.capture_speed;
    ball.pos += ball.vel * dt;
    roll(ball, dt);
    false
}

fn park(ball: &mut Ball, tuning: &PhysicsTuning) {
    ball.phase = BallPhase::Parked;
    ball.size = 0.0;
    ball.vel = Vec3::ZERO;
    ball.rot = Vec3::ZERO;
    ball.pos = Vec3::from(tuning.parked_position);
}

/// Accumulate rolling rotation for the distance travelled.
fn roll(ball: &mut Ball, dt: f32) {
    let r = ball.radius();
    if r > f32::EPSILON {
        ball.rot += Vec3::new(-ball.vel.y, ball.vel.x, 0.0) * (dt / r);
    }
}

fn pair_mut(balls: &mut [Ball], i: usize, j: usize) -> (&mut Ball, &mut Ball) {
    if i < j {
        let (head, tail) = balls.split_at_mut(j);
        (&mut head[i], &mut tail[0])
    } else {
        let (head, tail) = balls.split_at_mut(i);
        (&mut tail[0], &mut head[j])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TableTuning;
    use crate::table::TableDimensions;
    use cue_engine::Rng;

    const DT: f32 = 1.0 / 60.0;
    const SIZE: f32 = 25.0;

    fn table() -> Table {
        Table::new(TableDimensions::new(500.0, 250.0), &TableTuning::default())
    }

    fn ball(number: u8, x: f32, y: f32) -> Ball {
        Ball::new(number, Vec3::new(x, y, 0.0), SIZE)
    }

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn head_on_contact_swaps_velocities() {
        let mut a = ball(0, 0.0, 0.0);
        let mut b = ball(1, 20.0, 0.0);
        a.vel = Vec3::new(10.0, 0.0, 0.0);
        assert!(resolve_contact(&mut a, &mut b));
        assert!(approx(a.vel, Vec3::ZERO));
        assert!(approx(b.vel, Vec3::new(10.0, 0.0, 0.0)));
        assert!((a.pos.distance(b.pos) - 25.0).abs() < 1e-4);
        // pushed apart symmetrically
        assert!((a.pos.x + 2.5).abs() < 1e-4);
        assert!((b.pos.x - 22.5).abs() < 1e-4);
    }

    #[test]
    fn glancing_contact_conserves_momentum_and_energy() {
        let mut a = ball(0, 0.0, 0.0);
        let mut b = ball(1, 15.0, 12.0);
        a.vel = Vec3::new(30.0, 5.0, 0.0);
        b.vel = Vec3::new(-4.0, 8.0, 0.0);
        let momentum = a.vel + b.vel;
        let energy = a.vel.length_squared() + b.vel.length_squared();
        assert!(resolve_contact(&mut a, &mut b));
        assert!(approx(a.vel + b.vel, momentum));
        assert!((a.vel.length_squared() + b.vel.length_squared() - energy).abs() < 1e-2);
    }

    #[test]
    fn separated_balls_are_untouched() {
        let mut a = ball(0, 0.0, 0.0);
        let mut b = ball(1, 25.0, 0.0);
        a.vel = Vec3::X;
        assert!(!resolve_contact(&mut a, &mut b));
        assert_eq!(a.vel, Vec3::X);
        assert_eq!(b.pos.x, 25.0);
    }

    #[test]
    fn coincident_centers_fall_back_to_x_axis() {
        let mut a = ball(0, 5.0, 5.0);
        let mut b = ball(1, 5.0, 5.0);
        assert!(resolve_contact(&mut a, &mut b));
        assert!(a.pos.is_finite() && b.pos.is_finite());
        assert!((a.pos.x - b.pos.x - 25.0).abs() < 1e-4);
    }

    #[test]
    fn only_first_contact_is_resolved() {
        let mut balls = vec![ball(0, 0.0, 0.0), ball(1, 20.0, 0.0), ball(2, -20.0, 0.0)];
        assert_eq!(collision_detection(&mut balls, 0), Some(1));
        // ball 2 still overlaps
        assert!(balls[0].pos.distance(balls[2].pos) < 25.0);
    }

    #[test]
    fn sinking_balls_do_not_collide() {
        let mut balls = vec![ball(0, 0.0, 0.0), ball(1, 20.0, 0.0)];
        balls[1].phase = BallPhase::Sinking;
        assert_eq!(collision_detection(&mut balls, 0), None);
        assert_eq!(collision_detection(&mut balls, 1), None);
    }

    #[test]
    fn rail_reflects_velocity() {
        let table = table();
        let mut b = ball(0, 210.0, 0.0);
        b.vel = Vec3::new(50.0, 10.0, 0.0);
        assert!(boundary_detection(&mut b, &table, false));
        assert_eq!(b.pos.x, 200.0);
        assert_eq!(b.vel, Vec3::new(-50.0, 10.0, 0.0));

        let mut b = ball(0, 0.0, -90.0);
        b.vel = Vec3::new(5.0, -20.0, 0.0);
        assert!(boundary_detection(&mut b, &table, false));
        assert_eq!(b.pos.y, -75.0);
        assert_eq!(b.vel, Vec3::new(5.0, 20.0, 0.0));
    }

    #[test]
    fn sticky_rail_stops_ball() {
        let table = table();
        let mut b = ball(0, -300.0, 0.0);
        b.vel = Vec3::new(-50.0, 10.0, 0.0);
        assert!(boundary_detection(&mut b, &table, true));
        assert_eq!(b.vel, Vec3::ZERO);
    }

    #[test]
    fn balls_stay_inside_rails() {
        let table = table();
        let tuning = PhysicsTuning::default();
        let mut rng = Rng::new(77);
        let mut balls: Vec<Ball> = (0..8)
            .map(|n| {
                let mut b = ball(n, -150.0 + 40.0 * n as f32, if n % 2 == 0 { 20.0 } else { -20.0 });
                b.vel = Vec3::new(rng.range_f32(-800.0, 800.0), rng.range_f32(-800.0, 800.0), 0.0);
                b
            })
            .collect();
        for _ in 0..600 {
            step(&mut balls, &table, &tuning, SIZE, Modifiers::default(), DT);
            for b in balls.iter().filter(|b| b.is_rolling()) {
                assert!(b.pos.x.abs() + b.radius() <= table.x_thresh + 1e-3);
                assert!(b.pos.y.abs() + b.radius() <= table.y_thresh + 1e-3);
            }
        }
    }

    #[test]
    fn pocket_capture_then_park() {
        let table = table();
        let tuning = PhysicsTuning::default();
        let mut balls = vec![ball(3, 0.0, 70.0), ball(4, 0.0, -30.0)];
        balls[0].dim();

        let report = step(&mut balls, &table, &tuning, SIZE, Modifiers::default(), DT);
        assert_eq!(report.pocketed, vec![(0, 1)]);
        assert_eq!(balls[0].phase, BallPhase::Sinking);
        assert_eq!(balls[0].size, 50.0);
        assert_eq!(balls[0].color, balls[0].base_color);

        let mut parked_at = None;
        for frame in 0..120 {
            let report = step(&mut balls, &table, &tuning, SIZE, Modifiers::default(), DT);
            if !report.parked.is_empty() {
                assert_eq!(report.parked, vec![0]);
                parked_at = Some(frame);
                break;
            }
        }
        assert!(parked_at.is_some());
        assert_eq!(balls[0].phase, BallPhase::Parked);
        assert_eq!(balls[0].size, 0.0);
        assert_eq!(balls[0].pos, Vec3::from(tuning.parked_position));
        assert!(balls[1].is_rolling());
    }

    #[test]
    fn hovering_ball_passes_over_pocket() {
        let table = table();
        let tuning = PhysicsTuning::default();
        let mut b = ball(1, 0.0, 75.0);
        b.pos.z = 50.0;
        assert_eq!(hole_detection(&mut b, &table, &tuning, SIZE), None);
        assert!(b.is_rolling());
    }

    #[test]
    fn heavy_friction_slows_faster() {
        let table = table();
        let tuning = PhysicsTuning::default();
        let mut normal = vec![ball(0, 0.0, 0.0)];
        let mut heavy = vec![ball(0, 0.0, 0.0)];
        normal[0].vel = Vec3::new(100.0, 0.0, 0.0);
        heavy[0].vel = Vec3::new(100.0, 0.0, 0.0);
        step(&mut normal, &table, &tuning, SIZE, Modifiers::default(), DT);
        let mods = Modifiers { heavy_friction: true, ..Modifiers::default() };
        step(&mut heavy, &table, &tuning, SIZE, mods, DT);
        assert!((normal[0].vel.x - 99.0).abs() < 1e-3);
        assert!((heavy[0].vel.x - 80.0).abs() < 1e-3);
    }

    #[test]
    fn slow_ball_comes_to_rest() {
        let table = table();
        let tuning = PhysicsTuning::default();
        let mut balls = vec![ball(0, 0.0, 0.0)];
        balls[0].vel = Vec3::new(0.4, 0.0, 0.0);
        step(&mut balls, &table, &tuning, SIZE, Modifiers::default(), DT);
        assert_eq!(balls[0].vel, Vec3::ZERO);
    }

    #[test]
    fn tilt_drifts_resting_balls() {
        let table = table();
        let tuning = PhysicsTuning::default();
        let mut balls = vec![ball(0, 0.0, 0.0)];
        let mods = Modifiers { tilted: true, ..Modifiers::default() };
        step(&mut balls, &table, &tuning, SIZE, mods, DT);
        assert!((balls[0].pos.x - tuning.tilt_drift * DT).abs() < 1e-4);
    }

    #[test]
    fn rolling_accumulates_rotation() {
        let table = table();
        let tuning = PhysicsTuning::default();
        let mut balls = vec![ball(0, 0.0, 0.0)];
        balls[0].vel = Vec3::new(0.0, 60.0, 0.0);
        let report = step(&mut balls, &table, &tuning, SIZE, Modifiers::default(), DT);
        assert!(report.is_quiet());
        assert!(balls[0].rot.x < 0.0);
        assert_eq!(balls[0].rot.y, 0.0);
    }
}
