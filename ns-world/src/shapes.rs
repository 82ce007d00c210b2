//! Per-state collision volumes, assembled from the geometry kernel.

use bevy::prelude::Vec3;
use ns_geom::{Aabb, BoolOp, VoxelShape, join};
use ns_utils::BlockPos;

use crate::block::{
    BlockModelKind, block_model_kind, block_state_id, block_state_meta, is_solid, snow_layers,
};
use crate::chunk::WorldGrid;

fn boxed(min: [f32; 3], max: [f32; 3]) -> VoxelShape {
    VoxelShape::cuboid(Aabb::new(Vec3::from_array(min), Vec3::from_array(max)))
}

/// Cell-local collision shape of the block at `pos`. Fences look at their
/// neighbors, which is why the world is a parameter.
pub fn collision_shape(world: &WorldGrid, pos: BlockPos, state: u16) -> VoxelShape {
    if !is_solid(state) {
        return VoxelShape::empty();
    }
    let id = block_state_id(state);
    let meta = block_state_meta(state);
    match block_model_kind(id) {
        BlockModelKind::Slab => {
            if (meta & 0x8) != 0 {
                boxed([0.0, 0.5, 0.0], [1.0, 1.0, 1.0])
            } else {
                boxed([0.0, 0.0, 0.0], [1.0, 0.5, 1.0])
            }
        }
        BlockModelKind::Stairs => stair_shape(meta),
        BlockModelKind::Snow => {
            let h = (snow_layers(state) as f32 / 8.0).clamp(0.125, 1.0);
            boxed([0.0, 0.0, 0.0], [1.0, h, 1.0])
        }
        BlockModelKind::Fence => fence_shape(world, pos),
        BlockModelKind::Custom => match id {
            60 => boxed([0.0, 0.0, 0.0], [1.0, 0.9375, 1.0]),
            88 => boxed([0.0, 0.0, 0.0], [1.0, 0.875, 1.0]),
            _ => VoxelShape::block(),
        },
        _ => VoxelShape::block(),
    }
}

fn stair_shape(meta: u16) -> VoxelShape {
    let top = (meta & 0x4) != 0;
    let facing = meta & 0x3;

    let base = if top {
        boxed([0.0, 0.5, 0.0], [1.0, 1.0, 1.0])
    } else {
        boxed([0.0, 0.0, 0.0], [1.0, 0.5, 1.0])
    };

    let (min_x, max_x, min_z, max_z) = match facing {
        0 => (0.5, 1.0, 0.0, 1.0), // east
        1 => (0.0, 0.5, 0.0, 1.0), // west
        2 => (0.0, 1.0, 0.5, 1.0), // south
        _ => (0.0, 1.0, 0.0, 0.5), // north
    };
    let quarter = if top {
        boxed([min_x, 0.0, min_z], [max_x, 0.5, max_z])
    } else {
        boxed([min_x, 0.5, min_z], [max_x, 1.0, max_z])
    };

    join(&base, &quarter, BoolOp::Or)
}

fn fence_shape(world: &WorldGrid, pos: BlockPos) -> VoxelShape {
    let connects = |p: BlockPos| {
        world
            .state(p)
            .is_some_and(|neighbor| fence_connects_to(neighbor))
    };
    let east = connects(pos + (1, 0, 0));
    let west = connects(pos + (-1, 0, 0));
    let south = connects(pos + (0, 0, 1));
    let north = connects(pos + (0, 0, -1));

    let mut shape = boxed([0.375, 0.0, 0.375], [0.625, 1.5, 0.625]);
    if north {
        shape = join(&shape, &boxed([0.4375, 0.0, 0.0], [0.5625, 1.5, 0.5]), BoolOp::Or);
    }
    if south {
        shape = join(&shape, &boxed([0.4375, 0.0, 0.5], [0.5625, 1.5, 1.0]), BoolOp::Or);
    }
    if west {
        shape = join(&shape, &boxed([0.0, 0.0, 0.4375], [0.5, 1.5, 0.5625]), BoolOp::Or);
    }
    if east {
        shape = join(&shape, &boxed([0.5, 0.0, 0.4375], [1.0, 1.5, 0.5625]), BoolOp::Or);
    }
    shape
}

fn fence_connects_to(neighbor_state: u16) -> bool {
    let neighbor_id = block_state_id(neighbor_state);
    if neighbor_id == 0 || matches!(neighbor_id, 8 | 9 | 10 | 11) {
        return false;
    }
    if matches!(block_model_kind(neighbor_id), BlockModelKind::Fence) {
        return true;
    }
    is_solid(neighbor_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::block_state;

    #[test]
    fn air_and_water_have_no_shape() {
        let world = WorldGrid::default();
        let p = BlockPos::new(0, 64, 0);
        assert!(collision_shape(&world, p, block_state(0, 0)).is_empty());
        assert!(collision_shape(&world, p, block_state(9, 0)).is_empty());
        assert!(collision_shape(&world, p, block_state(65, 2)).is_empty());
    }

    #[test]
    fn bottom_slab_is_half_height() {
        let world = WorldGrid::default();
        let shape = collision_shape(&world, BlockPos::new(0, 64, 0), block_state(44, 0));
        assert_eq!(shape.max_y(), Some(0.5));
        let top = collision_shape(&world, BlockPos::new(0, 64, 0), block_state(44, 8));
        assert_eq!(top.max_y(), Some(1.0));
    }

    #[test]
    fn stair_shape_reaches_full_height() {
        let world = WorldGrid::default();
        let shape = collision_shape(&world, BlockPos::new(0, 64, 0), block_state(53, 0));
        assert_eq!(shape.max_y(), Some(1.0));
        assert!(shape.to_aabbs().len() >= 2);
    }

    #[test]
    fn snow_layers_scale_height() {
        let world = WorldGrid::default();
        let one = collision_shape(&world, BlockPos::new(0, 64, 0), block_state(78, 0));
        assert_eq!(one.max_y(), Some(0.125));
        let full = collision_shape(&world, BlockPos::new(0, 64, 0), block_state(78, 7));
        assert_eq!(full.max_y(), Some(1.0));
    }

    #[test]
    fn lone_fence_is_tall_post() {
        let world = WorldGrid::default();
        let shape = collision_shape(&world, BlockPos::new(0, 64, 0), block_state(85, 0));
        assert_eq!(shape.max_y(), Some(1.5));
        assert_eq!(shape.to_aabbs().len(), 1);
    }
}
