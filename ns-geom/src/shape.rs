use bevy::prelude::Vec3;

use crate::aabb::{Aabb, calculate_x_offset, calculate_y_offset, calculate_z_offset};

/// Bit-grid of filled sub-cells. Coordinates are cell indices, not world
/// units; the owning `VoxelShape` supplies the breakpoints.
#[derive(Clone, Debug, PartialEq)]
pub struct DiscreteVoxelShape {
    size_x: usize,
    size_y: usize,
    size_z: usize,
    bits: Vec<u64>,
}

impl DiscreteVoxelShape {
    pub fn new(size_x: usize, size_y: usize, size_z: usize) -> Self {
        let words = (size_x * size_y * size_z).div_ceil(64);
        Self {
            size_x,
            size_y,
            size_z,
            bits: vec![0; words.max(1)],
        }
    }

    pub fn filled(size_x: usize, size_y: usize, size_z: usize) -> Self {
        let mut shape = Self::new(size_x, size_y, size_z);
        for y in 0..size_y {
            for z in 0..size_z {
                for x in 0..size_x {
                    shape.fill(x, y, z);
                }
            }
        }
        shape
    }

    pub fn size(&self) -> (usize, usize, usize) {
        (self.size_x, self.size_y, self.size_z)
    }

    fn index(&self, x: usize, y: usize, z: usize) -> usize {
        (y * self.size_z + z) * self.size_x + x
    }

    pub fn is_full(&self, x: usize, y: usize, z: usize) -> bool {
        if x >= self.size_x || y >= self.size_y || z >= self.size_z {
            return false;
        }
        let i = self.index(x, y, z);
        self.bits[i / 64] & (1 << (i % 64)) != 0
    }

    pub fn fill(&mut self, x: usize, y: usize, z: usize) {
        debug_assert!(x < self.size_x && y < self.size_y && z < self.size_z);
        let i = self.index(x, y, z);
        self.bits[i / 64] |= 1 << (i % 64);
    }

    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|w| *w == 0)
    }
}

/// A cell-local collision volume: a bit-grid plus the world-unit
/// breakpoints of its grid lines per axis (`len = size + 1`).
#[derive(Clone, Debug, PartialEq)]
pub struct VoxelShape {
    pub(crate) grid: DiscreteVoxelShape,
    pub(crate) xs: Vec<f32>,
    pub(crate) ys: Vec<f32>,
    pub(crate) zs: Vec<f32>,
}

impl VoxelShape {
    pub fn empty() -> Self {
        Self {
            grid: DiscreteVoxelShape::new(0, 0, 0),
            xs: vec![0.0],
            ys: vec![0.0],
            zs: vec![0.0],
        }
    }

    /// The full unit cube.
    pub fn block() -> Self {
        Self::cuboid(Aabb::new(Vec3::ZERO, Vec3::ONE))
    }

    /// A single box. Degenerate boxes collapse to the empty shape.
    pub fn cuboid(bb: Aabb) -> Self {
        if bb.max.x - bb.min.x <= 0.0 || bb.max.y - bb.min.y <= 0.0 || bb.max.z - bb.min.z <= 0.0 {
            return Self::empty();
        }
        Self {
            grid: DiscreteVoxelShape::filled(1, 1, 1),
            xs: vec![bb.min.x, bb.max.x],
            ys: vec![bb.min.y, bb.max.y],
            zs: vec![bb.min.z, bb.max.z],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    /// Height of the highest filled cell, if any. Used for top-face
    /// support queries (slabs, snow layers).
    pub fn max_y(&self) -> Option<f32> {
        let (sx, sy, sz) = self.grid.size();
        for y in (0..sy).rev() {
            for z in 0..sz {
                for x in 0..sx {
                    if self.grid.is_full(x, y, z) {
                        return Some(self.ys[y + 1]);
                    }
                }
            }
        }
        None
    }

    /// Decomposes into the boxes of the filled cells.
    pub fn to_aabbs(&self) -> Vec<Aabb> {
        let (sx, sy, sz) = self.grid.size();
        let mut out = Vec::new();
        for y in 0..sy {
            for z in 0..sz {
                for x in 0..sx {
                    if self.grid.is_full(x, y, z) {
                        out.push(Aabb::new(
                            Vec3::new(self.xs[x], self.ys[y], self.zs[z]),
                            Vec3::new(self.xs[x + 1], self.ys[y + 1], self.zs[z + 1]),
                        ));
                    }
                }
            }
        }
        out
    }

    /// Boxes translated to world coordinates at `origin`.
    pub fn to_world_aabbs(&self, origin: Vec3) -> Vec<Aabb> {
        self.to_aabbs()
            .into_iter()
            .map(|bb| bb.offset(origin))
            .collect()
    }

    /// How far `moving` can travel along the Y axis (by `desired`) before
    /// hitting this shape. Returns the clipped delta.
    pub fn collide_y(&self, moving: &Aabb, mut desired: f32) -> f32 {
        for bb in self.to_aabbs() {
            desired = calculate_y_offset(moving, &bb, desired);
        }
        desired
    }

    pub fn collide_x(&self, moving: &Aabb, mut desired: f32) -> f32 {
        for bb in self.to_aabbs() {
            desired = calculate_x_offset(moving, &bb, desired);
        }
        desired
    }

    pub fn collide_z(&self, moving: &Aabb, mut desired: f32) -> f32 {
        for bb in self.to_aabbs() {
            desired = calculate_z_offset(moving, &bb, desired);
        }
        desired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::{BoolOp, intersects, join};

    #[test]
    fn block_has_unit_bounds() {
        let shape = VoxelShape::block();
        let boxes = shape.to_aabbs();
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].min, Vec3::ZERO);
        assert_eq!(boxes[0].max, Vec3::ONE);
        assert_eq!(shape.max_y(), Some(1.0));
    }

    #[test]
    fn degenerate_cuboid_is_empty() {
        let shape = VoxelShape::cuboid(Aabb::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 1.0)));
        assert!(shape.is_empty());
        assert_eq!(shape.max_y(), None);
    }

    #[test]
    fn slab_union_fills_block() {
        let bottom = VoxelShape::cuboid(Aabb::new(Vec3::ZERO, Vec3::new(1.0, 0.5, 1.0)));
        let top = VoxelShape::cuboid(Aabb::new(Vec3::new(0.0, 0.5, 0.0), Vec3::ONE));
        let both = join(&bottom, &top, BoolOp::Or);
        assert_eq!(both.max_y(), Some(1.0));
        let boxes = both.to_aabbs();
        let volume: f32 = boxes
            .iter()
            .map(|bb| {
                (bb.max.x - bb.min.x) * (bb.max.y - bb.min.y) * (bb.max.z - bb.min.z)
            })
            .sum();
        assert!((volume - 1.0).abs() < 1e-6);
    }

    #[test]
    fn disjoint_halves_do_not_intersect() {
        let bottom = VoxelShape::cuboid(Aabb::new(Vec3::ZERO, Vec3::new(1.0, 0.5, 1.0)));
        let top = VoxelShape::cuboid(Aabb::new(Vec3::new(0.0, 0.5, 0.0), Vec3::ONE));
        assert!(!intersects(&bottom, &top));
        assert!(intersects(&bottom, &VoxelShape::block()));
    }

    #[test]
    fn collide_y_clips_fall_onto_slab() {
        let slab = VoxelShape::cuboid(Aabb::new(Vec3::ZERO, Vec3::new(1.0, 0.5, 1.0)));
        let body = Aabb::new(Vec3::new(0.2, 1.0, 0.2), Vec3::new(0.8, 2.8, 0.8));
        let dy = slab.collide_y(&body, -1.0);
        assert!((dy - -0.5).abs() < 1e-6);
    }
}
