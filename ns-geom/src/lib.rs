pub mod aabb;
pub mod merge;
pub mod shape;

pub use aabb::{Aabb, calculate_x_offset, calculate_y_offset, calculate_z_offset};
pub use merge::{BoolOp, intersects, join};
pub use shape::{DiscreteVoxelShape, VoxelShape};
