pub mod camera;
pub mod instance;

pub use camera::{CameraUniform, OrbitCamera};
pub use instance::{BallInstance, DotInstance, RenderBuffer};
