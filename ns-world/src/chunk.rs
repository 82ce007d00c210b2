use std::collections::HashMap;

use bevy::prelude::Resource;
use ns_utils::BlockPos;

pub const CHUNK_SIZE: i32 = 16;
pub const SECTION_HEIGHT: i32 = 16;
pub const WORLD_HEIGHT: i32 = 256;

#[derive(Clone, Debug)]
pub struct ChunkSection {
    pub y: u8,
    pub blocks: Vec<u16>,
}

#[derive(Clone, Debug)]
pub struct ChunkData {
    pub x: i32,
    pub z: i32,
    pub full: bool,
    pub sections: Vec<ChunkSection>,
}

#[derive(Clone)]
struct ChunkColumn {
    sections: Vec<Option<Vec<u16>>>,
}

impl ChunkColumn {
    fn new() -> Self {
        Self {
            sections: vec![None; (WORLD_HEIGHT / SECTION_HEIGHT) as usize],
        }
    }

    fn set_section(&mut self, y: u8, blocks: Vec<u16>) {
        let idx = y as usize;
        if idx >= self.sections.len() {
            return;
        }
        self.sections[idx] = Some(blocks);
    }
}

/// Block-state store keyed by chunk column. Queries into unloaded columns
/// or outside the Y domain return `None`; the planner treats that as
/// non-traversable, the sim as empty air over a bedrock floor.
#[derive(Resource, Default, Clone)]
pub struct WorldGrid {
    chunks: HashMap<(i32, i32), ChunkColumn>,
}

impl WorldGrid {
    pub fn update_chunk(&mut self, chunk: ChunkData) {
        let key = (chunk.x, chunk.z);
        if chunk.full {
            self.chunks.insert(key, ChunkColumn::new());
        }
        // Delta updates patch an already-loaded column; with no column
        // underneath there is nothing to apply them against.
        let Some(entry) = self.chunks.get_mut(&key) else {
            return;
        };
        for section in chunk.sections {
            entry.set_section(section.y, section.blocks);
        }
    }

    pub fn unload_chunk(&mut self, chunk_x: i32, chunk_z: i32) {
        self.chunks.remove(&(chunk_x, chunk_z));
    }

    pub fn is_chunk_loaded(&self, chunk_x: i32, chunk_z: i32) -> bool {
        self.chunks.contains_key(&(chunk_x, chunk_z))
    }

    pub fn is_position_loaded(&self, x: i32, z: i32) -> bool {
        self.is_chunk_loaded(x.div_euclid(CHUNK_SIZE), z.div_euclid(CHUNK_SIZE))
    }

    pub fn block_at(&self, x: i32, y: i32, z: i32) -> Option<u16> {
        if y < 0 || y >= WORLD_HEIGHT {
            return None;
        }

        let chunk_x = x.div_euclid(CHUNK_SIZE);
        let chunk_z = z.div_euclid(CHUNK_SIZE);
        let local_x = x.rem_euclid(CHUNK_SIZE);
        let local_z = z.rem_euclid(CHUNK_SIZE);

        let column = self.chunks.get(&(chunk_x, chunk_z))?;

        let section_index = (y / SECTION_HEIGHT) as usize;
        let local_y = (y % SECTION_HEIGHT) as usize;
        let Some(section) = column.sections.get(section_index).and_then(|v| v.as_ref()) else {
            // Loaded column with an all-air section.
            return Some(0);
        };

        let idx = local_y * 16 * 16 + local_z as usize * 16 + local_x as usize;
        Some(*section.get(idx).unwrap_or(&0))
    }

    pub fn state(&self, pos: BlockPos) -> Option<u16> {
        self.block_at(pos.x, pos.y, pos.z)
    }

    /// Writes one block state, materializing the column and section if
    /// needed. Test and demo worlds are built through this.
    pub fn set_block(&mut self, pos: BlockPos, state: u16) {
        if pos.y < 0 || pos.y >= WORLD_HEIGHT {
            return;
        }
        let chunk_x = pos.x.div_euclid(CHUNK_SIZE);
        let chunk_z = pos.z.div_euclid(CHUNK_SIZE);
        let column = self
            .chunks
            .entry((chunk_x, chunk_z))
            .or_insert_with(ChunkColumn::new);
        let section_index = (pos.y / SECTION_HEIGHT) as usize;
        let section = column.sections[section_index]
            .get_or_insert_with(|| vec![0; (16 * 16 * SECTION_HEIGHT) as usize]);
        let local_x = pos.x.rem_euclid(CHUNK_SIZE) as usize;
        let local_z = pos.z.rem_euclid(CHUNK_SIZE) as usize;
        let local_y = (pos.y % SECTION_HEIGHT) as usize;
        section[local_y * 16 * 16 + local_z * 16 + local_x] = state;
    }

    /// Fills a solid horizontal layer across the given chunk-aligned
    /// region. Convenience for synthetic worlds.
    pub fn fill_layer(&mut self, min: BlockPos, max: BlockPos, state: u16) {
        for x in min.x..=max.x {
            for y in min.y..=max.y {
                for z in min.z..=max.z {
                    self.set_block(BlockPos::new(x, y, z), state);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::block_state;

    #[test]
    fn unloaded_chunk_is_unknown() {
        let grid = WorldGrid::default();
        assert_eq!(grid.block_at(0, 64, 0), None);
        assert!(!grid.is_chunk_loaded(0, 0));
    }

    #[test]
    fn out_of_range_y_is_unknown() {
        let mut grid = WorldGrid::default();
        grid.set_block(BlockPos::new(0, 64, 0), block_state(1, 0));
        assert_eq!(grid.block_at(0, -1, 0), None);
        assert_eq!(grid.block_at(0, WORLD_HEIGHT, 0), None);
    }

    #[test]
    fn set_then_get_roundtrip() {
        let mut grid = WorldGrid::default();
        let pos = BlockPos::new(-17, 70, 33);
        grid.set_block(pos, block_state(4, 0));
        assert_eq!(grid.state(pos), Some(block_state(4, 0)));
        // Same column, untouched section reads as air.
        assert_eq!(grid.block_at(-17, 200, 33), Some(0));
        assert!(grid.is_position_loaded(-17, 33));
    }

    #[test]
    fn update_chunk_installs_sections() {
        let mut grid = WorldGrid::default();
        let mut blocks = vec![0u16; 16 * 16 * 16];
        blocks[0] = block_state(1, 0);
        grid.update_chunk(ChunkData {
            x: 0,
            z: 0,
            full: true,
            sections: vec![ChunkSection { y: 4, blocks }],
        });
        assert_eq!(grid.block_at(0, 64, 0), Some(block_state(1, 0)));
        assert_eq!(grid.block_at(1, 64, 0), Some(0));
    }

    #[test]
    fn delta_update_without_a_column_is_dropped() {
        let mut grid = WorldGrid::default();
        let mut blocks = vec![0u16; 16 * 16 * 16];
        blocks[0] = block_state(1, 0);
        grid.update_chunk(ChunkData {
            x: 0,
            z: 0,
            full: false,
            sections: vec![ChunkSection { y: 4, blocks }],
        });
        assert!(!grid.is_chunk_loaded(0, 0));
        assert_eq!(grid.block_at(0, 64, 0), None);
    }

    #[test]
    fn full_update_replaces_prior_content() {
        let mut grid = WorldGrid::default();
        grid.set_block(BlockPos::new(0, 64, 0), block_state(1, 0));
        grid.update_chunk(ChunkData {
            x: 0,
            z: 0,
            full: true,
            sections: vec![],
        });
        assert!(grid.is_chunk_loaded(0, 0));
        assert_eq!(grid.block_at(0, 64, 0), Some(0));
    }
}
