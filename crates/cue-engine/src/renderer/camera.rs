use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};
use std::f32::consts::{FRAC_PI_2, TAU};

/// Perspective orbit camera circling a target on a Z-up table plane.
///
/// At azimuth 0 the camera sits on the -Y side of the target, so screen-right
/// is world +X and screen-up (projected onto the table) is world +Y.
/// Increasing elevation raises the camera toward looking straight down.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    /// Rotation around the world Z axis (radians), kept in [0, 2π).
    pub azimuth: f32,
    /// Angle above the table plane (radians), clamped short of the poles.
    pub elevation: f32,
    /// Distance from the target.
    pub distance: f32,
    /// Point the camera looks at.
    pub target: Vec3,
    /// Vertical field of view (radians).
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    /// Viewport size in pixels.
    pub viewport: Vec2,
}

/// GPU-side uniform data for the camera.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub eye: [f32; 4],
}

impl OrbitCamera {
    /// One degree short of straight up/down.
    pub const MAX_ELEVATION: f32 = FRAC_PI_2 - 0.017;
    pub const MIN_DISTANCE: f32 = 1.0;
    /// Radians of orbit per pixel of drag.
    const ORBIT_SENSITIVITY: f32 = TAU / 360.0;
    /// Distance change per scroll notch.
    const ZOOM_STEP: f32 = 10.0;
    /// Azimuth change per horizontal scroll notch.
    const SCROLL_PAN: f32 = 10.0 * TAU / 360.0;

    pub fn new(distance: f32, far: f32, viewport: Vec2) -> Self {
        Self {
            azimuth: 0.0,
            elevation: Self::MAX_ELEVATION,
            distance,
            target: Vec3::ZERO,
            fov_y: 60f32.to_radians(),
            near: 0.1,
            far,
            viewport,
        }
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width.max(1.0), height.max(1.0));
    }

    /// Camera position in world space.
    pub fn position(&self) -> Vec3 {
        let (sin_az, cos_az) = self.azimuth.sin_cos();
        let (sin_el, cos_el) = self.elevation.sin_cos();
        self.target + self.distance * Vec3::new(cos_el * sin_az, -cos_el * cos_az, sin_el)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Z)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        let aspect = self.viewport.x / self.viewport.y;
        Mat4::perspective_rh_gl(self.fov_y, aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_proj().to_cols_array_2d(),
            eye: self.position().extend(1.0).to_array(),
        }
    }

    /// Project a world position to viewport pixels.
    ///
    /// With `flip_y` the result is in window coordinates (origin top-left),
    /// otherwise y grows upward from the bottom edge. Points at or behind the
    /// camera plane have no screen position.
    pub fn world_to_screen(&self, world: Vec3, flip_y: bool) -> Option<Vec2> {
        let clip = self.view_proj() * world.extend(1.0);
        if clip.w <= 1e-6 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        let x = (ndc.x + 1.0) * 0.5 * self.viewport.x;
        let mut y = (ndc.y + 1.0) * 0.5 * self.viewport.y;
        if flip_y {
            y = self.viewport.y - y;
        }
        Some(Vec2::new(x, y))
    }

    /// Rotate a screen-aligned vector (x right, y up, z unchanged) into the
    /// table plane for the current azimuth.
    pub fn screen_to_table(&self, v: Vec3) -> Vec3 {
        let (sin_az, cos_az) = self.azimuth.sin_cos();
        Vec3::new(v.x * cos_az - v.y * sin_az, v.x * sin_az + v.y * cos_az, v.z)
    }

    /// Orbit by a pointer drag in pixels.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.elevation = (self.elevation + dy * Self::ORBIT_SENSITIVITY)
            .clamp(-Self::MAX_ELEVATION, Self::MAX_ELEVATION);
        self.azimuth = wrap_angle(self.azimuth - dx * Self::ORBIT_SENSITIVITY);
    }

    /// Scroll: vertical zooms, horizontal swings around the table.
    pub fn scroll(&mut self, dx: f32, dy: f32) {
        self.distance = (self.distance - Self::ZOOM_STEP * dy).max(Self::MIN_DISTANCE);
        self.azimuth = wrap_angle(self.azimuth - Self::SCROLL_PAN * dx);
    }
}

fn wrap_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> OrbitCamera {
        OrbitCamera::new(500.0, 5000.0, Vec2::new(500.0, 500.0))
    }

    #[test]
    fn target_projects_to_center() {
        let cam = camera();
        let p = cam.world_to_screen(Vec3::ZERO, true).unwrap();
        assert!((p.x - 250.0).abs() < 0.5, "x={}", p.x);
        assert!((p.y - 250.0).abs() < 0.5, "y={}", p.y);
    }

    #[test]
    fn plus_x_is_screen_right_and_plus_y_is_screen_up() {
        let cam = camera();
        let right = cam.world_to_screen(Vec3::new(50.0, 0.0, 0.0), true).unwrap();
        let up = cam.world_to_screen(Vec3::new(0.0, 50.0, 0.0), true).unwrap();
        assert!(right.x > 250.0);
        // flipped: up on screen means smaller y
        assert!(up.y < 250.0);

        let unflipped = cam.world_to_screen(Vec3::new(0.0, 50.0, 0.0), false).unwrap();
        assert!((unflipped.y - (500.0 - up.y)).abs() < 1e-3);
    }

    #[test]
    fn screen_to_table_matches_projection_for_any_azimuth() {
        let mut cam = camera();
        cam.elevation = 1.0;
        for i in 0..8 {
            cam.azimuth = i as f32 * TAU / 8.0;
            let center = cam.world_to_screen(Vec3::ZERO, false).unwrap();
            let right = cam.screen_to_table(Vec3::new(40.0, 0.0, 0.0));
            let p = cam.world_to_screen(right, false).unwrap();
            assert!(p.x > center.x + 1.0, "azimuth {}: {:?} vs {:?}", cam.azimuth, p, center);
            assert!((p.y - center.y).abs() < 1.0);
        }
    }

    #[test]
    fn behind_camera_has_no_screen_position() {
        let cam = camera();
        let behind = cam.position() + (cam.position() - cam.target);
        assert!(cam.world_to_screen(behind, true).is_none());
    }

    #[test]
    fn orbit_clamps_elevation_and_wraps_azimuth() {
        let mut cam = camera();
        cam.orbit(0.0, 10_000.0);
        assert!(cam.elevation <= OrbitCamera::MAX_ELEVATION);
        cam.orbit(0.0, -20_000.0);
        assert!(cam.elevation >= -OrbitCamera::MAX_ELEVATION);

        cam.azimuth = 0.0;
        cam.orbit(1.0, 0.0);
        assert!(cam.azimuth > 6.0 && cam.azimuth < TAU);
    }

    #[test]
    fn scroll_zoom_has_floor() {
        let mut cam = camera();
        cam.scroll(0.0, 1000.0);
        assert_eq!(cam.distance, OrbitCamera::MIN_DISTANCE);
        cam.scroll(0.0, -2.0);
        assert!((cam.distance - 21.0).abs() < 1e-4);
    }

    #[test]
    fn uniform_carries_eye_position() {
        let cam = camera();
        let u = cam.uniform();
        let eye = cam.position();
        assert_eq!(u.eye[..3], eye.to_array());
    }
}
