//! Table extents, rail thresholds and pocket positions.

use cue_engine::{Aabb, PlyMesh};
use glam::{Vec2, Vec3};

use crate::config::TableTuning;

/// Playing-surface size plus the transform that fits the table mesh into
/// the view volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableDimensions {
    /// Extent along x.
    pub length: f32,
    /// Extent along y.
    pub width: f32,
    /// Uniform mesh scale, splatted.
    pub scale: Vec3,
    /// Translation that centers the mesh on the origin (applied before scale).
    pub center: Vec3,
}

impl TableDimensions {
    pub fn new(length: f32, width: f32) -> Self {
        Self { length, width, scale: Vec3::ONE, center: Vec3::ZERO }
    }

    /// Fit a table mesh's bounding box into a cube of `view_volume_side`.
    /// The mesh is modelled lying along its y axis and drawn rotated a
    /// quarter turn, so its y extent becomes the table length.
    pub fn from_bounds(bounds: &Aabb, view_volume_side: f32) -> Self {
        let extents = bounds.extents();
        let largest = extents.max_element().max(f32::EPSILON);
        let scale = view_volume_side / largest;
        Self {
            length: extents.y * scale,
            width: extents.x * scale,
            scale: Vec3::splat(scale),
            center: -bounds.center(),
        }
    }

    pub fn from_mesh(mesh: &PlyMesh, view_volume_side: f32) -> Self {
        Self::from_bounds(&mesh.bounds(), view_volume_side)
    }
}

/// The play area derived from `TableDimensions`.
#[derive(Debug, Clone)]
pub struct Table {
    pub dims: TableDimensions,
    /// Ball surfaces must stay within `|x| <= x_thresh`.
    pub x_thresh: f32,
    pub y_thresh: f32,
    pub pockets: [Vec3; 6],
    spawn_margin: f32,
}

impl Table {
    pub fn new(dims: TableDimensions, tuning: &TableTuning) -> Self {
        Self {
            x_thresh: ((dims.length - tuning.rail_margin) * 0.5).max(0.0),
            y_thresh: ((dims.width - tuning.rail_margin) * 0.5).max(0.0),
            pockets: pocket_positions(dims.length, dims.width, tuning.pocket_inset),
            spawn_margin: tuning.spawn_margin,
            dims,
        }
    }

    /// Half-extents of the rectangle new balls are scattered in.
    pub fn spawn_extent(&self) -> Vec2 {
        Vec2::new(
            ((self.dims.length - self.spawn_margin) * 0.5).max(0.0).min(self.x_thresh),
            ((self.dims.width - self.spawn_margin) * 0.5).max(0.0).min(self.y_thresh),
        )
    }

    /// Index of the pocket within `radius` of `pos` on the table plane.
    pub fn pocket_near(&self, pos: Vec3, radius: f32) -> Option<usize> {
        self.pockets
            .iter()
            .position(|p| p.truncate().distance(pos.truncate()) < radius)
    }
}

/// Six pockets: three along the +y rail, three along the -y rail.
fn pocket_positions(length: f32, width: f32, inset: f32) -> [Vec3; 6] {
    let hl = length * 0.5 - inset;
    let hw = width * 0.5 - inset;
    [
        Vec3::new(-hl, hw, 0.0),
        Vec3::new(0.0, hw, 0.0),
        Vec3::new(hl, hw, 0.0),
        Vec3::new(-hl, -hw, 0.0),
        Vec3::new(0.0, -hw, 0.0),
        Vec3::new(hl, -hw, 0.0),
    ]
}
