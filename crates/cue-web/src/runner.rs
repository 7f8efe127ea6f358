use cue_engine::{
    Game, GameConfig, EngineContext, RenderContext,
    InputEvent, InputQueue, RenderBuffer,
    FixedTimestep, ProtocolLayout,
};

/// Generic game runner that wires up the engine loop.
///
/// Each concrete game creates a `thread_local!` GameRunner and exports free
/// functions via `#[wasm_bindgen]`, because wasm-bindgen cannot export
/// generic structs directly.
pub struct GameRunner<G: Game> {
    game: G,
    ctx: EngineContext,
    input: InputQueue,
    render_buffer: RenderBuffer,
    timestep: FixedTimestep,
    config: GameConfig,
    layout: ProtocolLayout,
    initialized: bool,
    /// Flat buffer of sound event IDs for shared-buffer reads.
    sound_buffer: Vec<u8>,
    /// Frames rendered since init, mirrored into the header.
    frame_counter: u32,
}

impl<G: Game> GameRunner<G> {
    pub fn new(game: G) -> Self {
        let config = game.config();
        let timestep = FixedTimestep::new(config.fixed_dt);
        let layout = ProtocolLayout::from_config(&config);

        let render_buffer = RenderBuffer::with_capacity(config.max_balls, config.max_dots);
        let sound_buffer = Vec::with_capacity(config.max_sounds);

        Self {
            game,
            ctx: EngineContext::with_seed(config.seed),
            input: InputQueue::new(),
            render_buffer,
            timestep,
            layout,
            config,
            initialized: false,
            sound_buffer,
            frame_counter: 0,
        }
    }

    /// Initialize the game. Call once after construction.
    pub fn init(&mut self) {
        self.refresh_config();
        self.game.init(&mut self.ctx);
        self.initialized = true;
        self.rebuild_render_buffer();
    }

    /// Hand a text asset to the game. A rejected asset leaves the game untouched.
    pub fn load_asset(&mut self, name: &str, contents: &str) -> bool {
        match self.game.load_asset(name, contents) {
            Ok(()) => {
                log::info!("Loaded asset '{}' ({} bytes)", name, contents.len());
                self.refresh_config();
                if self.initialized {
                    self.rebuild_render_buffer();
                }
                true
            }
            Err(err) => {
                log::warn!("Rejected asset '{}': {:#}", name, err);
                false
            }
        }
    }

    /// Re-read the game's config and size the buffers and layout to match.
    /// The host re-reads the header after every asset load.
    fn refresh_config(&mut self) {
        let config = self.game.config();
        if config == self.config {
            return;
        }
        if config.fixed_dt != self.config.fixed_dt {
            self.timestep = FixedTimestep::new(config.fixed_dt);
        }
        self.layout = ProtocolLayout::from_config(&config);
        self.render_buffer = RenderBuffer::with_capacity(config.max_balls, config.max_dots);
        self.sound_buffer = Vec::with_capacity(config.max_sounds);
        log::debug!(
            "Runner capacities: {} balls, {} dots, {} sounds, {} events",
            config.max_balls,
            config.max_dots,
            config.max_sounds,
            config.max_events
        );
        self.config = config;
    }

    /// Push an input event into the queue.
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Run one host frame: fixed-step updates, then rebuild the frame buffers.
    pub fn tick(&mut self, dt: f32) {
        if !self.initialized {
            return;
        }

        // Clear per-frame transient data
        self.ctx.clear_frame_data();

        // Input is seen by the first fixed step only; later steps see an empty queue
        let steps = self.timestep.accumulate(dt);
        let empty = InputQueue::new();
        for step in 0..steps {
            let input = if step == 0 { &self.input } else { &empty };
            self.game.update(&mut self.ctx, input);
            self.ctx.clock.tick(self.timestep.dt());
        }
        if steps > 0 {
            self.input.drain();
        }

        self.rebuild_render_buffer();

        // Pack sound events into flat buffer
        self.sound_buffer.clear();
        for sound in self.ctx.sounds.iter().take(self.config.max_sounds) {
            self.sound_buffer.push(sound.0 as u8);
        }
        self.ctx.events.truncate(self.config.max_events);
        self.frame_counter = self.frame_counter.wrapping_add(1);
    }

    fn rebuild_render_buffer(&mut self) {
        self.render_buffer.clear();
        let mut render_ctx = RenderContext {
            render_buffer: &mut self.render_buffer,
        };
        self.game.render(&mut render_ctx);
        self.render_buffer.balls.truncate(self.config.max_balls);
        self.render_buffer.dots.truncate(self.config.max_dots);
    }

    // ---- Accessors ----

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn context(&self) -> &EngineContext {
        &self.ctx
    }

    pub fn render_buffer(&self) -> &RenderBuffer {
        &self.render_buffer
    }

    // ---- Pointer accessors for shared-buffer reads ----

    pub fn balls_ptr(&self) -> *const f32 {
        self.render_buffer.balls_ptr()
    }

    pub fn ball_count(&self) -> u32 {
        self.render_buffer.ball_count()
    }

    pub fn dots_ptr(&self) -> *const f32 {
        self.render_buffer.dots_ptr()
    }

    pub fn dot_count(&self) -> u32 {
        self.render_buffer.dot_count()
    }

    pub fn camera_ptr(&self) -> *const f32 {
        self.render_buffer.camera_floats().as_ptr()
    }

    pub fn sound_events_ptr(&self) -> *const u8 {
        self.sound_buffer.as_ptr()
    }

    pub fn sound_events_len(&self) -> u32 {
        self.sound_buffer.len() as u32
    }

    pub fn game_events_ptr(&self) -> *const f32 {
        self.ctx.events.as_ptr() as *const f32
    }

    pub fn game_events_len(&self) -> u32 {
        self.ctx.events.len() as u32
    }

    pub fn frame_counter(&self) -> u32 {
        self.frame_counter
    }

    // ---- Capacity accessors (read by the host via wasm_bindgen exports) ----

    pub fn header(&self) -> Vec<f32> {
        self.layout.header(&self.config).to_vec()
    }

    pub fn max_balls(&self) -> u32 {
        self.layout.max_balls as u32
    }

    pub fn max_dots(&self) -> u32 {
        self.layout.max_dots as u32
    }

    pub fn max_sounds(&self) -> u32 {
        self.layout.max_sounds as u32
    }

    pub fn max_events(&self) -> u32 {
        self.layout.max_events as u32
    }

    pub fn buffer_total_floats(&self) -> u32 {
        self.layout.buffer_total_floats as u32
    }
}
