pub mod block;
pub mod chunk;
pub mod shapes;

pub use block::{
    BlockInfo, BlockModelKind, block_model_kind, block_state, block_state_id, block_state_meta,
    hardness, is_climbable, is_lava, is_liquid, is_solid, is_water, slipperiness, snow_layers,
    speed_factor,
};
pub use chunk::{CHUNK_SIZE, ChunkData, ChunkSection, WORLD_HEIGHT, WorldGrid};
pub use shapes::collision_shape;
