use bytemuck::{Pod, Zeroable};

use crate::renderer::camera::CameraUniform;

/// Per-sphere render data written to the shared buffer for the host renderer.
/// Must match the host protocol: 12 floats = 48 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct BallInstance {
    /// World-space center.
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Accumulated rolling rotation (radians per axis).
    pub rot_x: f32,
    pub rot_y: f32,
    pub rot_z: f32,
    /// Rendered radius in world units. Zero hides the sphere.
    pub radius: f32,
    /// Tint (RGBA). Values below the base color mark a ball being aimed.
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
    /// Ball number, used by the host to select the ball texture.
    pub number: f32,
}

impl BallInstance {
    pub const FLOATS: usize = 12;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;
}

/// Small billboard marker (trajectory preview dots).
/// 4 floats = 16 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct DotInstance {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub size: f32,
}

impl DotInstance {
    pub const FLOATS: usize = 4;
}

/// Everything the host needs to draw one frame.
pub struct RenderBuffer {
    pub balls: Vec<BallInstance>,
    pub dots: Vec<DotInstance>,
    pub camera: CameraUniform,
}

impl RenderBuffer {
    pub fn new() -> Self {
        Self::with_capacity(16, 8)
    }

    pub fn with_capacity(max_balls: usize, max_dots: usize) -> Self {
        Self {
            balls: Vec::with_capacity(max_balls),
            dots: Vec::with_capacity(max_dots),
            camera: CameraUniform::zeroed(),
        }
    }

    pub fn clear(&mut self) {
        self.balls.clear();
        self.dots.clear();
    }

    pub fn push_ball(&mut self, instance: BallInstance) {
        self.balls.push(instance);
    }

    pub fn push_dot(&mut self, dot: DotInstance) {
        self.dots.push(dot);
    }

    pub fn set_camera(&mut self, camera: CameraUniform) {
        self.camera = camera;
    }

    pub fn ball_count(&self) -> u32 {
        self.balls.len() as u32
    }

    pub fn dot_count(&self) -> u32 {
        self.dots.len() as u32
    }

    /// Raw pointer to ball data for shared-buffer reads.
    pub fn balls_ptr(&self) -> *const f32 {
        self.balls.as_ptr() as *const f32
    }

    pub fn dots_ptr(&self) -> *const f32 {
        self.dots.as_ptr() as *const f32
    }

    /// Camera uniform as a flat float slice (16 matrix + 4 eye).
    pub fn camera_floats(&self) -> &[f32] {
        bytemuck::cast_slice(std::slice::from_ref(&self.camera))
    }
}

impl Default for RenderBuffer {
    fn default() -> Self {
        Self::new()
    }
}
