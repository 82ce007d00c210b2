use std::collections::HashMap;

use ns_utils::BlockPos;

use crate::cost::COST_INF;

pub const NO_HEAP: u32 = u32::MAX;
pub const NO_PARENT: u32 = u32::MAX;

/// One discovered cell. Owned by a single search; identity is the packed
/// coordinate key.
#[derive(Clone, Debug)]
pub struct PathNode {
    pub pos: BlockPos,
    pub g: f32,
    pub h: f32,
    pub parent: u32,
    pub heap_index: u32,
}

impl PathNode {
    pub fn f(&self) -> f32 {
        self.g + self.h
    }

    pub fn in_open_set(&self) -> bool {
        self.heap_index != NO_HEAP
    }
}

/// Node storage plus the coordinate-keyed dedup table.
#[derive(Default)]
pub struct NodeArena {
    nodes: Vec<PathNode>,
    by_key: HashMap<u64, u32>,
}

impl NodeArena {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, index: u32) -> &PathNode {
        &self.nodes[index as usize]
    }

    pub fn get_mut(&mut self, index: u32) -> &mut PathNode {
        &mut self.nodes[index as usize]
    }

    /// Index of the node for `pos`, creating an undiscovered node
    /// (`g = +∞`) on first sight.
    pub fn get_or_insert(&mut self, pos: BlockPos, h: f32) -> u32 {
        let key = pos.packed_key();
        if let Some(&index) = self.by_key.get(&key) {
            return index;
        }
        let index = self.nodes.len() as u32;
        self.nodes.push(PathNode {
            pos,
            g: COST_INF,
            h,
            parent: NO_PARENT,
            heap_index: NO_HEAP,
        });
        self.by_key.insert(key, index);
        index
    }

    /// Walks parent links from `index` back to the start, returning the
    /// positions start-first.
    pub fn reconstruct(&self, mut index: u32) -> Vec<BlockPos> {
        let mut positions = Vec::new();
        loop {
            let node = self.get(index);
            positions.push(node.pos);
            if node.parent == NO_PARENT {
                break;
            }
            index = node.parent;
        }
        positions.reverse();
        positions
    }
}

/// Binary min-heap over arena indices, ordered by `f = g + h`, with
/// decrease-key support through the per-node heap slot.
#[derive(Default)]
pub struct OpenSet {
    heap: Vec<u32>,
}

impl OpenSet {
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn push(&mut self, arena: &mut NodeArena, index: u32) {
        debug_assert!(!arena.get(index).in_open_set());
        let slot = self.heap.len();
        self.heap.push(index);
        arena.get_mut(index).heap_index = slot as u32;
        self.sift_up(arena, slot);
    }

    /// Re-orders a node already in the set after its `g` decreased.
    pub fn update(&mut self, arena: &mut NodeArena, index: u32) {
        let slot = arena.get(index).heap_index as usize;
        debug_assert!(self.heap[slot] == index);
        self.sift_up(arena, slot);
    }

    pub fn pop(&mut self, arena: &mut NodeArena) -> Option<u32> {
        if self.heap.is_empty() {
            return None;
        }
        let top = self.heap.swap_remove(0);
        arena.get_mut(top).heap_index = NO_HEAP;
        if !self.heap.is_empty() {
            arena.get_mut(self.heap[0]).heap_index = 0;
            self.sift_down(arena, 0);
        }
        Some(top)
    }

    fn f_at(&self, arena: &NodeArena, slot: usize) -> f32 {
        arena.get(self.heap[slot]).f()
    }

    fn swap(&mut self, arena: &mut NodeArena, a: usize, b: usize) {
        self.heap.swap(a, b);
        arena.get_mut(self.heap[a]).heap_index = a as u32;
        arena.get_mut(self.heap[b]).heap_index = b as u32;
    }

    fn sift_up(&mut self, arena: &mut NodeArena, mut slot: usize) {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if self.f_at(arena, slot) >= self.f_at(arena, parent) {
                break;
            }
            self.swap(arena, slot, parent);
            slot = parent;
        }
    }

    fn sift_down(&mut self, arena: &mut NodeArena, mut slot: usize) {
        loop {
            let left = slot * 2 + 1;
            let right = slot * 2 + 2;
            let mut smallest = slot;
            if left < self.heap.len() && self.f_at(arena, left) < self.f_at(arena, smallest) {
                smallest = left;
            }
            if right < self.heap.len() && self.f_at(arena, right) < self.f_at(arena, smallest) {
                smallest = right;
            }
            if smallest == slot {
                break;
            }
            self.swap(arena, slot, smallest);
            slot = smallest;
        }
    }
}
