//! Per-id physical attributes of the 1.8 block palette, in the packed
//! `id << 4 | meta` state encoding.

pub const AIR: u16 = 0;

pub const fn block_state(id: u16, meta: u16) -> u16 {
    (id << 4) | (meta & 0xF)
}

pub const fn block_state_id(state: u16) -> u16 {
    state >> 4
}

pub const fn block_state_meta(state: u16) -> u16 {
    state & 0xF
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockModelKind {
    Empty,
    Full,
    Slab,
    Stairs,
    Snow,
    Fence,
    Liquid,
    Ladder,
    Custom,
}

pub fn block_model_kind(id: u16) -> BlockModelKind {
    match id {
        0 | 31 | 37 | 38 | 50 | 106 => BlockModelKind::Empty,
        8 | 9 | 10 | 11 => BlockModelKind::Liquid,
        44 | 126 | 182 => BlockModelKind::Slab,
        53 | 67 | 108 | 109 | 114 | 128 | 134 | 135 | 136 | 156 | 163 | 164 | 180 => {
            BlockModelKind::Stairs
        }
        78 => BlockModelKind::Snow,
        85 | 113 | 188 | 189 | 190 | 191 | 192 => BlockModelKind::Fence,
        65 => BlockModelKind::Ladder,
        60 | 88 => BlockModelKind::Custom,
        _ => BlockModelKind::Full,
    }
}

/// Whether the cell contributes collision volume at all.
pub fn is_solid(state: u16) -> bool {
    !matches!(
        block_model_kind(block_state_id(state)),
        BlockModelKind::Empty | BlockModelKind::Liquid | BlockModelKind::Ladder
    )
}

/// Whether the cell stops a moving body. In this palette everything that
/// is collidable also blocks motion, so this is `is_solid` with the
/// invariant spelled out at the call sites that need it.
pub fn blocks_motion(state: u16) -> bool {
    is_solid(state)
}

pub fn is_liquid(state: u16) -> bool {
    matches!(block_state_id(state), 8..=11)
}

pub fn is_water(state: u16) -> bool {
    matches!(block_state_id(state), 8 | 9)
}

pub fn is_lava(state: u16) -> bool {
    matches!(block_state_id(state), 10 | 11)
}

pub fn is_climbable(state: u16) -> bool {
    matches!(block_state_id(state), 65 | 106)
}

pub fn slipperiness(state: u16) -> f32 {
    match block_state_id(state) {
        79 | 174 => 0.98,
        165 => 0.8,
        _ => 0.6,
    }
}

/// Horizontal speed multiplier an agent suffers while standing on the
/// block. Soul sand is the only slow block in this palette.
pub fn speed_factor(state: u16) -> f32 {
    match block_state_id(state) {
        88 => 0.4,
        _ => 1.0,
    }
}

/// Jump-impulse multiplier. Constant across the 1.8 palette; kept as a
/// query so the movement model reads every physical attribute the same way.
pub fn jump_factor(_state: u16) -> f32 {
    1.0
}

/// Break hardness. Negative means unbreakable, zero means instant.
pub fn hardness(state: u16) -> f32 {
    match block_state_id(state) {
        0 => 0.0,
        7 | 119 | 120 | 166 => -1.0,
        8..=11 => -1.0,
        2 => 0.6,
        3 | 60 => 0.5,
        12 | 13 => 0.5,
        18 | 161 => 0.2,
        31 | 37 | 38 | 50 | 78 | 106 => 0.0,
        1 => 1.5,
        4 | 5 | 53 | 67 | 85 | 98 => 2.0,
        14 | 15 | 16 | 21 | 56 | 73 | 74 => 3.0,
        17 | 162 => 2.0,
        20 | 102 => 0.3,
        49 => 50.0,
        42 | 41 | 57 => 5.0,
        _ => 1.5,
    }
}

pub fn snow_layers(state: u16) -> u16 {
    if block_state_id(state) == 78 {
        (block_state_meta(state) & 0x7) + 1
    } else {
        0
    }
}

/// Snapshot of the physical attributes of one queried cell.
#[derive(Clone, Copy, Debug)]
pub struct BlockInfo {
    pub state: u16,
    pub collidable: bool,
    pub blocks_motion: bool,
    pub friction: f32,
    pub speed_factor: f32,
    pub jump_factor: f32,
    pub hardness: f32,
    pub liquid: bool,
    pub water: bool,
    pub lava: bool,
    pub climbable: bool,
    pub model: BlockModelKind,
    pub snow_layers: u16,
}

impl BlockInfo {
    pub fn of(state: u16) -> BlockInfo {
        let blocks = blocks_motion(state);
        BlockInfo {
            state,
            // blocks_motion implies collidable
            collidable: is_solid(state) || blocks,
            blocks_motion: blocks,
            friction: slipperiness(state),
            speed_factor: speed_factor(state),
            jump_factor: jump_factor(state),
            hardness: hardness(state),
            liquid: is_liquid(state),
            water: is_water(state),
            lava: is_lava(state),
            climbable: is_climbable(state),
            model: block_model_kind(block_state_id(state)),
            snow_layers: snow_layers(state),
        }
    }

    pub fn is_air(&self) -> bool {
        block_state_id(self.state) == 0
    }

    pub fn unbreakable(&self) -> bool {
        self.hardness < 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_packing_roundtrip() {
        let state = block_state(44, 0x9);
        assert_eq!(block_state_id(state), 44);
        assert_eq!(block_state_meta(state), 9);
    }

    #[test]
    fn air_does_not_block_motion() {
        let info = BlockInfo::of(AIR);
        assert!(!info.blocks_motion);
        assert!(info.is_air());
    }

    #[test]
    fn blocks_motion_implies_collidable() {
        for id in 0..=198u16 {
            let info = BlockInfo::of(block_state(id, 0));
            if info.blocks_motion {
                assert!(info.collidable, "id {} blocks motion but not collidable", id);
            }
        }
    }

    #[test]
    fn bedrock_and_liquids_are_unbreakable() {
        assert!(BlockInfo::of(block_state(7, 0)).unbreakable());
        assert!(BlockInfo::of(block_state(9, 0)).unbreakable());
        assert!(!BlockInfo::of(block_state(1, 0)).unbreakable());
    }

    #[test]
    fn snow_layer_count_from_meta() {
        assert_eq!(snow_layers(block_state(78, 0)), 1);
        assert_eq!(snow_layers(block_state(78, 7)), 8);
        assert_eq!(snow_layers(block_state(1, 7)), 0);
    }
}
