//! Heightfield terrain sampled under placement ghosts.

use bevy::prelude::*;

/// Regular grid of ground heights on the XZ plane.
///
/// Heights are stored row-major, `depth` rows of `width` samples, with
/// sample `(0, 0)` at `origin`. Outside the grid the ground sits at
/// `base_height`.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct Heightfield {
    origin: Vec2,
    cell_size: f32,
    width: usize,
    depth: usize,
    heights: Vec<f32>,
    /// Height used outside the grid and for unmatched layers.
    pub base_height: f32,
    /// Layer mask this heightfield answers for.
    pub layers: u32,
}

impl Default for Heightfield {
    fn default() -> Self {
        Self::flat(Vec2::splat(-512.0), 8.0, 129, 129, 0.0)
    }
}

impl Heightfield {
    /// A flat grid at `height`.
    #[must_use]
    pub fn flat(origin: Vec2, cell_size: f32, width: usize, depth: usize, height: f32) -> Self {
        Self::from_heights(origin, cell_size, width, vec![height; width * depth])
    }

    /// Build a grid from row-major samples. Trailing samples that do not
    /// fill a whole row are dropped.
    #[must_use]
    pub fn from_heights(origin: Vec2, cell_size: f32, width: usize, mut heights: Vec<f32>) -> Self {
        let width = width.max(1);
        let depth = heights.len() / width;
        heights.truncate(width * depth);
        Self {
            origin,
            cell_size: cell_size.max(f32::EPSILON),
            width,
            depth,
            heights,
            base_height: 0.0,
            layers: u32::MAX,
        }
    }

    /// Whether `(x, z)` lies over the grid.
    #[must_use]
    pub fn contains(&self, x: f32, z: f32) -> bool {
        let max = self.origin
            + Vec2::new(
                (self.width.saturating_sub(1)) as f32,
                (self.depth.saturating_sub(1)) as f32,
            ) * self.cell_size;
        x >= self.origin.x && z >= self.origin.y && x <= max.x && z <= max.y
    }

    /// Bilinear height at `(x, z)`.
    #[must_use]
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        if self.depth == 0 || !self.contains(x, z) {
            return self.base_height;
        }

        let gx = (x - self.origin.x) / self.cell_size;
        let gz = (z - self.origin.y) / self.cell_size;
        let x0 = (gx.floor() as usize).min(self.width - 1);
        let z0 = (gz.floor() as usize).min(self.depth - 1);
        let x1 = (x0 + 1).min(self.width - 1);
        let z1 = (z0 + 1).min(self.depth - 1);
        let tx = gx - x0 as f32;
        let tz = gz - z0 as f32;

        let h = |cx: usize, cz: usize| self.heights[cz * self.width + cx];
        let near = h(x0, z0) + (h(x1, z0) - h(x0, z0)) * tx;
        let far = h(x0, z1) + (h(x1, z1) - h(x0, z1)) * tx;
        near + (far - near) * tz
    }

    /// Highest ground under a circular footprint: the center plus four
    /// points on its rim.
    #[must_use]
    pub fn sample(&self, position: Vec3, radius: f32, layer: u32) -> f32 {
        if layer & self.layers == 0 {
            return self.base_height;
        }

        let offsets = [
            Vec2::ZERO,
            Vec2::new(radius, 0.0),
            Vec2::new(-radius, 0.0),
            Vec2::new(0.0, radius),
            Vec2::new(0.0, -radius),
        ];
        offsets
            .iter()
            .map(|o| self.height_at(position.x + o.x, position.z + o.y))
            .fold(f32::NEG_INFINITY, f32::max)
    }
}
