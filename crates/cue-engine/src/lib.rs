pub mod api;
pub mod core;
pub mod systems;
pub mod renderer;
pub mod bridge;
pub mod input;
pub mod assets;

// Re-export key types at crate root for convenience
pub use api::game::{Game, GameConfig, EngineContext, RenderContext};
pub use api::types::{SoundEvent, GameEvent};
pub use core::time::{FixedTimestep, FrameClock};
pub use renderer::camera::{OrbitCamera, CameraUniform};
pub use renderer::instance::{BallInstance, DotInstance, RenderBuffer};
pub use input::queue::{InputEvent, InputQueue, PointerButton};
pub use assets::ply::{Aabb, PlyMesh};
pub use bridge::protocol::ProtocolLayout;
pub use systems::rng::Rng;
