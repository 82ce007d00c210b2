use std::sync::Arc;

use ns_utils::BlockPos;
use ns_world::{BlockInfo, WORLD_HEIGHT, WorldGrid, collision_shape};

use crate::cost::{COST_INF, fall_cost_table};
use crate::settings::PathSettings;

/// External inventory lookups the planner is allowed to make. Implemented
/// outside this crate; the planner only snapshots and queries.
pub trait InventoryQuery: Send + Sync {
    fn has_throwaway_item(&self) -> bool;
    fn has_water_bucket(&self) -> bool;
    /// Break speed multiplier of the best held tool against the state.
    fn tool_speed_against(&self, state: u16) -> f32;
}

/// Inventory that has nothing. Useful default and test stand-in.
pub struct EmptyInventory;

impl InventoryQuery for EmptyInventory {
    fn has_throwaway_item(&self) -> bool {
        false
    }
    fn has_water_bucket(&self) -> bool {
        false
    }
    fn tool_speed_against(&self, _state: u16) -> f32 {
        1.0
    }
}

/// Immutable per-search bundle: a world snapshot, the settings, the
/// inventory snapshot, and the coordinate domain.
pub struct CalculationContext {
    pub world: Arc<WorldGrid>,
    pub settings: PathSettings,
    pub inventory: Arc<dyn InventoryQuery>,
    pub has_throwaway: bool,
    pub has_water_bucket: bool,
    pub min_y: i32,
    pub max_y: i32,
    fall_cost: Vec<f32>,
}

impl CalculationContext {
    pub fn new(
        world: Arc<WorldGrid>,
        settings: PathSettings,
        inventory: Arc<dyn InventoryQuery>,
    ) -> Self {
        let max_fall = settings
            .max_fall_with_bucket
            .max(settings.max_fall_no_water)
            .max(1) as usize;
        let has_throwaway = inventory.has_throwaway_item();
        let has_water_bucket = inventory.has_water_bucket();
        Self {
            world,
            settings,
            inventory,
            has_throwaway,
            has_water_bucket,
            min_y: 0,
            max_y: WORLD_HEIGHT - 1,
            fall_cost: fall_cost_table(max_fall + 1),
        }
    }

    pub fn in_bounds(&self, pos: BlockPos) -> bool {
        pos.y >= self.min_y && pos.y <= self.max_y
    }

    pub fn is_loaded(&self, pos: BlockPos) -> bool {
        self.world.is_position_loaded(pos.x, pos.z)
    }

    /// `None` for unloaded or out-of-domain cells: unknown space is never
    /// traversed.
    pub fn state(&self, pos: BlockPos) -> Option<u16> {
        self.world.state(pos)
    }

    pub fn info(&self, pos: BlockPos) -> Option<BlockInfo> {
        self.state(pos).map(BlockInfo::of)
    }

    /// Whether an agent can stand on top of this cell. Requires a known,
    /// motion-blocking block whose shape carries the body at (nearly) full
    /// cell height; soul sand's 7/8 top counts.
    pub fn can_walk_on(&self, pos: BlockPos) -> bool {
        let Some(state) = self.state(pos) else {
            return false;
        };
        let info = BlockInfo::of(state);
        if !info.blocks_motion {
            return false;
        }
        let shape = collision_shape(&self.world, pos, state);
        shape.max_y().is_some_and(|top| top >= 0.875)
    }

    /// Whether the agent's body can occupy this cell. Water is passable
    /// (swimming costs are charged by the movements); lava never is. Thin
    /// snow is stepped over.
    pub fn can_walk_through(&self, pos: BlockPos) -> bool {
        let Some(state) = self.state(pos) else {
            return false;
        };
        let info = BlockInfo::of(state);
        if info.lava {
            return false;
        }
        if !info.blocks_motion {
            return true;
        }
        if info.snow_layers > 0 && info.snow_layers <= 2 {
            return true;
        }
        false
    }

    /// Mining-duration addition for clearing this cell: zero if already
    /// passable, `+∞` if breaking is disallowed or the block unbreakable.
    pub fn break_cost(&self, pos: BlockPos) -> f32 {
        if self.can_walk_through(pos) {
            return 0.0;
        }
        let Some(info) = self.info(pos) else {
            return COST_INF;
        };
        if !self.settings.allow_break {
            return COST_INF;
        }
        if info.unbreakable() {
            return COST_INF;
        }
        if info.hardness == 0.0 {
            return self.settings.break_overhead;
        }
        let speed = self.inventory.tool_speed_against(info.state).max(f32::EPSILON);
        info.hardness * 30.0 / speed + self.settings.break_overhead
    }

    /// Cost of scaffolding one block, or `+∞` when placing is disallowed
    /// or nothing throwaway is held.
    pub fn place_cost(&self) -> f32 {
        if self.settings.allow_place && self.has_throwaway {
            self.settings.place_block_cost
        } else {
            COST_INF
        }
    }

    /// Whether something solid neighbors `pos` to place against.
    pub fn can_place_against(&self, pos: BlockPos) -> bool {
        [
            pos.down(),
            pos + (1, 0, 0),
            pos + (-1, 0, 0),
            pos + (0, 0, 1),
            pos + (0, 0, -1),
        ]
        .iter()
        .any(|p| self.state(*p).is_some_and(ns_world::is_solid))
    }

    /// Ticks airborne over an integer fall height.
    pub fn fall_cost(&self, blocks: i32) -> f32 {
        if blocks <= 0 {
            return 0.0;
        }
        match self.fall_cost.get(blocks as usize) {
            Some(cost) => *cost,
            None => COST_INF,
        }
    }

    pub fn is_water(&self, pos: BlockPos) -> bool {
        self.state(pos).is_some_and(ns_world::is_water)
    }

    pub fn is_climbable(&self, pos: BlockPos) -> bool {
        self.state(pos).is_some_and(ns_world::is_climbable)
    }
}
