use crate::api::types::{GameEvent, SoundEvent};
use crate::core::time::FrameClock;
use crate::input::queue::InputQueue;
use crate::renderer::instance::RenderBuffer;
use crate::systems::rng::Rng;

/// Configuration for the engine, provided by the game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Fixed timestep in seconds (default: 1/60).
    pub fixed_dt: f32,
    /// Initial viewport width in pixels, until the host reports a resize.
    pub viewport_width: f32,
    /// Initial viewport height in pixels.
    pub viewport_height: f32,
    /// Maximum number of ball instances (default: 16).
    pub max_balls: usize,
    /// Maximum number of trajectory dots (default: 8).
    pub max_dots: usize,
    /// Maximum number of sound events per frame (default: 32).
    pub max_sounds: usize,
    /// Maximum number of game events per frame (default: 32).
    pub max_events: usize,
    /// Seed for the context RNG.
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            viewport_width: 500.0,
            viewport_height: 500.0,
            max_balls: 16,
            max_dots: 8,
            max_sounds: 32,
            max_events: 32,
            seed: 42,
        }
    }
}

/// The core contract every game must fulfill.
pub trait Game {
    /// Return engine configuration. Read before init and again after each asset load.
    fn config(&self) -> GameConfig {
        GameConfig::default()
    }

    /// Accept a text asset handed over by the host (tuning JSON, meshes).
    /// May be called before or after `init`. Unknown names are ignored.
    fn load_asset(&mut self, _name: &str, _contents: &str) -> anyhow::Result<()> {
        Ok(())
    }

    /// Setup initial state.
    fn init(&mut self, ctx: &mut EngineContext);

    /// The game loop tick: consume input, step the simulation, emit events.
    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue);

    /// Read-only render pass that fills the per-frame buffers.
    fn render(&self, _ctx: &mut RenderContext) {}
}

/// Mutable access to engine state, passed to Game::init and Game::update.
pub struct EngineContext {
    pub sounds: Vec<SoundEvent>,
    pub events: Vec<GameEvent>,
    pub rng: Rng,
    pub clock: FrameClock,
}

impl EngineContext {
    pub fn new() -> Self {
        Self::with_seed(GameConfig::default().seed)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            sounds: Vec::new(),
            events: Vec::new(),
            rng: Rng::new(seed),
            clock: FrameClock::new(),
        }
    }

    /// Emit a sound event to be forwarded to the host.
    pub fn emit_sound(&mut self, event: SoundEvent) {
        self.sounds.push(event);
    }

    /// Emit a game event to be forwarded to the host.
    pub fn emit_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Clear per-frame transient data (sounds, events).
    pub fn clear_frame_data(&mut self) {
        self.sounds.clear();
        self.events.clear();
    }

    /// Seconds of simulated time since init.
    pub fn elapsed(&self) -> f32 {
        self.clock.elapsed()
    }

    /// Fixed ticks since init.
    pub fn frame(&self) -> u64 {
        self.clock.frame()
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Render context for filling the per-frame buffers.
pub struct RenderContext<'a> {
    pub render_buffer: &'a mut RenderBuffer,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_frame_data_keeps_clock_and_rng() {
        let mut ctx = EngineContext::with_seed(9);
        ctx.emit_sound(SoundEvent(1));
        ctx.emit_event(GameEvent::new(2.0, 0.0));
        ctx.clock.tick(0.5);
        ctx.clear_frame_data();
        assert!(ctx.sounds.is_empty());
        assert!(ctx.events.is_empty());
        assert_eq!(ctx.frame(), 1);
        assert_eq!(ctx.elapsed(), 0.5);
    }

    #[test]
    fn same_seed_same_stream() {
        let mut a = EngineContext::with_seed(5);
        let mut b = EngineContext::with_seed(5);
        assert_eq!(a.rng.next_int(1000), b.rng.next_int(1000));
    }
}
