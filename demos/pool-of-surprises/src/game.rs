//! Pool of Surprises - 3D pool on an orbiting camera, with chaos effects that
//! rewrite the rules every few seconds.

use anyhow::Context;
use cue_engine::{
    Aabb, EngineContext, Game, GameConfig, GameEvent, InputEvent, InputQueue, OrbitCamera, PlyMesh,
    PointerButton, RenderContext, Rng,
};
use glam::{Vec2, Vec3};

use crate::aiming::{AimOutcome, Aimer};
use crate::balls::{spawn_balls, Ball, BallPhase};
use crate::chaos::{ChaosEffect, ChaosMachine};
use crate::config::PoolConfig;
use crate::physics::{self, StepReport};
use crate::table::{Table, TableDimensions};

const FIXED_DT: f32 = 1.0 / 60.0;

/// Viewport assumed until the host reports its size.
const INITIAL_VIEWPORT: f32 = 500.0;

/// Asset names the host may hand over.
pub const CONFIG_ASSET: &str = "config.json";
pub const TABLE_ASSET: &str = "pool-table.ply";

/// Custom event kinds from the UI
mod events {
    pub const RESET: u32 = 1;
}

/// Game event kinds to the host
pub mod game_events {
    pub const BALLS_REMAINING: f32 = 1.0;
    /// a = ball number, b = balls sunk so far
    pub const BALL_SUNK: f32 = 2.0;
    /// a = effect index
    pub const CHAOS_CHANGED: f32 = 3.0;
    /// a = balls sunk, b = seconds played
    pub const GAME_OVER: f32 = 4.0;
    pub const SCREENSHOT: f32 = 5.0;
    /// a = phase
    pub const PHASE_CHANGED: f32 = 6.0;
    /// a = message index
    pub const CONGRATULATIONS: f32 = 7.0;
}

/// Sound ids the host maps to audio clips
pub mod sounds {
    use cue_engine::SoundEvent;

    pub const COLLISION: SoundEvent = SoundEvent(0);
    pub const POCKET: SoundEvent = SoundEvent(1);
    pub const BOUNDARY: SoundEvent = SoundEvent(2);
    pub const EXPLOSION: SoundEvent = SoundEvent(3);
    pub const LAUNCH: SoundEvent = SoundEvent(4);
    pub const MUSIC: SoundEvent = SoundEvent(5);
}

/// Browser keyCodes
mod keys {
    pub const SPACE: u32 = 32;
    pub const E: u32 = 69;
    pub const P: u32 = 80;
    pub const R: u32 = 82;
}

const CONGRATULATIONS: [&str; 10] = [
    "\"The pocket sends its regards!\"",
    "\"Textbook. Somebody write that down.\"",
    "\"The glorb thanks you for the snack!\"",
    "\"Was that planned? Don't answer.\"",
    "\"Physics had nothing to do with that one.\"",
    "\"Smooth as fresh felt!\"",
    "\"The other balls are getting nervous.\"",
    "\"Another one bites the dust!\"",
    "\"You make the chaos look tame!\"",
    "\"Down the hatch!\"",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Title card; drags orbit but cannot launch.
    Intro = 0,
    Playing = 1,
    Over = 2,
}

/// Timed overlay text.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Banner {
    text: &'static str,
    until: f32,
}

pub struct PoolOfSurprises {
    config: PoolConfig,
    /// Bounds of the table mesh, once one has been loaded.
    mesh_bounds: Option<Aabb>,
    table: Table,
    balls: Vec<Ball>,
    camera: OrbitCamera,
    aim: Aimer,
    chaos: ChaosMachine,
    phase: GamePhase,
    phase_started: f32,
    /// Clock time at the last restart.
    game_started: f32,
    sunk: usize,
    banner: Option<Banner>,
    /// Set when an asset changed the setup; the next update starts over.
    needs_restart: bool,
}

impl PoolOfSurprises {
    pub fn new() -> Self {
        let config = PoolConfig::default();
        let table = Table::new(
            TableDimensions::new(config.table.length, config.table.width),
            &config.table,
        );
        let camera = Self::camera_for(&config);
        let chaos = ChaosMachine::new(&config.chaos, config.default_ball_size(), &mut Rng::new(config.seed));
        Self {
            config,
            mesh_bounds: None,
            table,
            balls: Vec::new(),
            camera,
            aim: Aimer::new(),
            chaos,
            phase: GamePhase::Intro,
            phase_started: 0.0,
            game_started: 0.0,
            sunk: 0,
            banner: None,
            needs_restart: false,
        }
    }

    fn camera_for(config: &PoolConfig) -> OrbitCamera {
        let side = config.view_volume_side;
        OrbitCamera::new(side, side * 10.0, Vec2::splat(INITIAL_VIEWPORT))
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn sunk(&self) -> usize {
        self.sunk
    }

    pub fn chaos_effect(&self) -> ChaosEffect {
        self.chaos.current()
    }

    pub fn pool_config(&self) -> &PoolConfig {
        &self.config
    }

    /// Overlay text visible at time `t`, if any.
    pub fn banner(&self, t: f32) -> Option<&'static str> {
        self.banner.filter(|b| t < b.until).map(|b| b.text)
    }

    fn balls_remaining(&self) -> usize {
        self.balls.iter().filter(|b| b.phase != BallPhase::Parked).count()
    }

    /// Rack up a fresh game with the current config and table.
    fn restart(&mut self, ctx: &mut EngineContext) {
        let dims = match &self.mesh_bounds {
            Some(bounds) => TableDimensions::from_bounds(bounds, self.config.view_volume_side),
            None => TableDimensions::new(self.config.table.length, self.config.table.width),
        };
        self.table = Table::new(dims, &self.config.table);
        self.balls = spawn_balls(&self.config, &self.table, &mut ctx.rng);
        self.aim = Aimer::new();
        self.chaos = ChaosMachine::new(&self.config.chaos, self.config.default_ball_size(), &mut ctx.rng);
        self.sunk = 0;
        self.banner = None;
        self.needs_restart = false;
        self.game_started = ctx.elapsed();

        let viewport = self.camera.viewport;
        self.camera = Self::camera_for(&self.config);
        self.camera.viewport = viewport;

        log::info!(
            "New game: {} balls, {:?} layout, table {:.0}x{:.0}",
            self.balls.len(),
            self.config.layout,
            dims.length,
            dims.width
        );
        ctx.emit_sound(sounds::MUSIC);
        self.set_phase(GamePhase::Intro, ctx);
    }

    fn set_phase(&mut self, phase: GamePhase, ctx: &mut EngineContext) {
        self.phase = phase;
        self.phase_started = ctx.elapsed();
        ctx.emit_event(GameEvent::new(game_events::PHASE_CHANGED, phase as u32 as f32));
        log::info!("Phase: {:?}", phase);
    }

    fn end_game(&mut self, ctx: &mut EngineContext) {
        if self.phase == GamePhase::Over {
            return;
        }
        self.aim.cancel(&mut self.balls);
        self.chaos.reset(&mut self.balls, &self.config.chaos, &mut ctx.rng);
        self.set_phase(GamePhase::Over, ctx);
        let played = ctx.elapsed() - self.game_started;
        ctx.emit_event(GameEvent {
            kind: game_events::GAME_OVER,
            a: self.sunk as f32,
            b: played,
            c: 0.0,
        });
        log::info!("Game over: {} sunk in {:.1}s", self.sunk, played);
    }

    fn stop_all(&mut self) {
        for ball in self.balls.iter_mut().filter(|b| b.is_rolling()) {
            ball.vel = Vec3::ZERO;
        }
    }

    fn handle_input(&mut self, event: &InputEvent, ctx: &mut EngineContext) {
        if let InputEvent::Resize { width, height } = *event {
            self.camera.set_viewport(width, height);
            return;
        }
        if self.phase == GamePhase::Over {
            return;
        }

        match *event {
            InputEvent::PointerDown { x, y, button: PointerButton::Left } => {
                self.aim.pointer_down(x, y);
            }
            InputEvent::PointerMove { x, y } => {
                let can_aim = self.phase == GamePhase::Playing;
                let outcome = self.aim.pointer_move(
                    x,
                    y,
                    &mut self.balls,
                    &self.camera,
                    &self.config.aiming,
                    can_aim,
                );
                if let AimOutcome::Orbit { dx, dy } = outcome {
                    self.camera.orbit(dx, dy);
                }
            }
            InputEvent::PointerUp { x, y, button: PointerButton::Left } => {
                let gaslit = self.chaos.status().is_active(ChaosEffect::GetGaslit);
                if let AimOutcome::Launched { ball, velocity } =
                    self.aim.pointer_up(x, y, &mut self.balls, gaslit)
                {
                    log::debug!("Launched ball {} at {:.0} u/s", ball, velocity.length());
                    ctx.emit_sound(sounds::LAUNCH);
                }
            }
            InputEvent::Scroll { dx, dy } => self.camera.scroll(dx, dy),
            InputEvent::KeyDown { key_code } => match key_code {
                keys::R => self.stop_all(),
                keys::E => self.end_game(ctx),
                keys::SPACE if self.phase == GamePhase::Intro => self.set_phase(GamePhase::Playing, ctx),
                keys::P => ctx.emit_event(GameEvent::new(game_events::SCREENSHOT, ctx.frame() as f32)),
                _ => {}
            },
            _ => {}
        }
    }

    /// Turn physics results into sounds, events and banners.
    fn apply_report(&mut self, report: &StepReport, ctx: &mut EngineContext) {
        if report.is_quiet() {
            return;
        }
        for _ in &report.collisions {
            ctx.emit_sound(sounds::COLLISION);
        }
        for _ in &report.wall_hits {
            ctx.emit_sound(sounds::BOUNDARY);
        }

        let t = ctx.elapsed();
        for &(i, pocket) in &report.pocketed {
            if self.aim.active() == Some(i) {
                self.aim.cancel(&mut self.balls);
            }
            ctx.emit_sound(sounds::POCKET);
            let pick = ctx.rng.next_int(CONGRATULATIONS.len() as u32) as usize;
            self.banner = Some(Banner { text: CONGRATULATIONS[pick], until: t + self.config.banner_seconds });
            ctx.emit_event(GameEvent::new(game_events::CONGRATULATIONS, pick as f32));
            log::info!("Ball {} dropped into pocket {}", self.balls[i].number, pocket);
        }

        for &i in &report.parked {
            self.sunk += 1;
            ctx.emit_sound(sounds::POCKET);
            ctx.emit_event(GameEvent {
                kind: game_events::BALL_SUNK,
                a: self.balls[i].number as f32,
                b: self.sunk as f32,
                c: 0.0,
            });
        }
    }
}

impl Default for PoolOfSurprises {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for PoolOfSurprises {
    fn config(&self) -> GameConfig {
        GameConfig {
            fixed_dt: FIXED_DT,
            viewport_width: self.camera.viewport.x,
            viewport_height: self.camera.viewport.y,
            max_balls: PoolConfig::MAX_BALLS,
            max_dots: self.config.aiming.trajectory_dots.max(1),
            seed: self.config.seed,
            ..GameConfig::default()
        }
    }

    fn load_asset(&mut self, name: &str, contents: &str) -> anyhow::Result<()> {
        match name {
            CONFIG_ASSET => {
                self.config = PoolConfig::from_json(contents).with_context(|| format!("parsing {}", name))?;
            }
            TABLE_ASSET => {
                let mesh = PlyMesh::parse(contents).with_context(|| format!("parsing {}", name))?;
                let dims = TableDimensions::from_mesh(&mesh, self.config.view_volume_side);
                log::info!(
                    "Table mesh: {} vertices, {} triangles, {:.0}x{:.0}",
                    mesh.num_vertices(),
                    mesh.num_triangles(),
                    dims.length,
                    dims.width
                );
                self.mesh_bounds = Some(mesh.bounds());
            }
            _ => {
                log::debug!("Ignoring asset '{}'", name);
                return Ok(());
            }
        }
        self.needs_restart = true;
        Ok(())
    }

    fn init(&mut self, ctx: &mut EngineContext) {
        self.restart(ctx);
    }

    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue) {
        if self.needs_restart {
            self.restart(ctx);
        }

        for event in input.iter() {
            if let InputEvent::Custom { kind, .. } = event {
                if *kind == events::RESET {
                    self.restart(ctx);
                    return;
                }
            }
            self.handle_input(event, ctx);
        }

        if self.phase == GamePhase::Over {
            return;
        }

        let t = ctx.elapsed();
        if self.phase == GamePhase::Intro && t - self.phase_started >= self.config.intro_seconds {
            self.set_phase(GamePhase::Playing, ctx);
        }

        if self.phase == GamePhase::Playing {
            if let Some(effect) = self.chaos.update(&mut self.balls, &self.config.chaos, &mut ctx.rng, t) {
                ctx.emit_sound(sounds::EXPLOSION);
                ctx.emit_event(GameEvent::new(game_events::CHAOS_CHANGED, effect.index() as f32));
                self.banner = Some(Banner { text: effect.name(), until: t + self.config.banner_seconds });
            }
        }

        let report = physics::step(
            &mut self.balls,
            &self.table,
            &self.config.physics,
            self.config.default_ball_size(),
            self.chaos.status().modifiers(),
            FIXED_DT,
        );
        self.apply_report(&report, ctx);

        let remaining = self.balls_remaining();
        if remaining == 0 {
            self.end_game(ctx);
        }
        ctx.emit_event(GameEvent::new(game_events::BALLS_REMAINING, remaining as f32));
    }

    fn render(&self, ctx: &mut RenderContext) {
        for ball in &self.balls {
            ctx.render_buffer.push_ball(ball.to_instance());
        }
        for dot in self.aim.trajectory(&self.balls, &self.config.aiming) {
            ctx.render_buffer.push_dot(dot);
        }
        ctx.render_buffer.set_camera(self.camera.uniform());
    }
}
