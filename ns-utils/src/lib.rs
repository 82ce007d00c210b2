use std::fmt;
use std::ops;

use bevy::prelude::{IVec3, Vec3};
use serde::{Deserialize, Serialize};

/// Integer cell coordinate in the block grid.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub fn new(x: i32, y: i32, z: i32) -> BlockPos {
        BlockPos { x, y, z }
    }

    pub fn from_feet(pos: Vec3) -> BlockPos {
        BlockPos {
            x: pos.x.floor() as i32,
            y: pos.y.floor() as i32,
            z: pos.z.floor() as i32,
        }
    }

    pub fn shift(self, dir: Direction) -> BlockPos {
        let (ox, oy, oz) = dir.get_offset();
        self + (ox, oy, oz)
    }

    pub fn shift_by(self, dir: Direction, by: i32) -> BlockPos {
        let (ox, oy, oz) = dir.get_offset();
        self + (ox * by, oy * by, oz * by)
    }

    pub fn up(self) -> BlockPos {
        self + (0, 1, 0)
    }

    pub fn up_by(self, by: i32) -> BlockPos {
        self + (0, by, 0)
    }

    pub fn down(self) -> BlockPos {
        self + (0, -1, 0)
    }

    pub fn down_by(self, by: i32) -> BlockPos {
        self + (0, -by, 0)
    }

    /// Center of the cell at foot level, where an agent standing in this
    /// cell would be positioned.
    pub fn center_bottom(self) -> Vec3 {
        Vec3::new(self.x as f32 + 0.5, self.y as f32, self.z as f32 + 0.5)
    }

    /// Center of the cell volume.
    pub fn center(self) -> Vec3 {
        Vec3::new(
            self.x as f32 + 0.5,
            self.y as f32 + 0.5,
            self.z as f32 + 0.5,
        )
    }

    /// Packs the coordinate triple into a single 64-bit key. X and Z get
    /// 26 bits each (signed), Y gets 12, matching the supported world
    /// domain. Construction asserts the domain so a collision here is a
    /// programmer error.
    pub fn packed_key(self) -> u64 {
        debug_assert!((-(1 << 25)..(1 << 25)).contains(&self.x));
        debug_assert!((-(1 << 25)..(1 << 25)).contains(&self.z));
        debug_assert!((-(1 << 11)..(1 << 11)).contains(&self.y));
        let x = (self.x as u64) & 0x3FF_FFFF;
        let y = (self.y as u64) & 0xFFF;
        let z = (self.z as u64) & 0x3FF_FFFF;
        (x << 38) | (y << 26) | z
    }

    pub fn distance_sq(self, other: BlockPos) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        let dz = (self.z - other.z) as f32;
        dx * dx + dy * dy + dz * dz
    }
}

impl ops::Add<BlockPos> for BlockPos {
    type Output = BlockPos;

    fn add(self, o: BlockPos) -> BlockPos {
        BlockPos {
            x: self.x + o.x,
            y: self.y + o.y,
            z: self.z + o.z,
        }
    }
}

impl ops::Add<(i32, i32, i32)> for BlockPos {
    type Output = BlockPos;

    fn add(self, (x, y, z): (i32, i32, i32)) -> BlockPos {
        BlockPos {
            x: self.x + x,
            y: self.y + y,
            z: self.z + z,
        }
    }
}

impl ops::Sub<BlockPos> for BlockPos {
    type Output = BlockPos;

    fn sub(self, o: BlockPos) -> BlockPos {
        BlockPos {
            x: self.x - o.x,
            y: self.y - o.y,
            z: self.z - o.z,
        }
    }
}

impl From<BlockPos> for IVec3 {
    fn from(p: BlockPos) -> IVec3 {
        IVec3::new(p.x, p.y, p.z)
    }
}

impl From<IVec3> for BlockPos {
    fn from(v: IVec3) -> BlockPos {
        BlockPos::new(v.x, v.y, v.z)
    }
}

impl Default for BlockPos {
    fn default() -> BlockPos {
        BlockPos::new(0, 0, 0)
    }
}

impl fmt::Debug for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<{},{},{}>", self.x, self.y, self.z)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    Y,
    Z,
    X,
}

impl Axis {
    pub fn as_string(&self) -> &'static str {
        match *self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Down,
    Up,
    North,
    South,
    West,
    East,
}

impl Direction {
    pub fn all() -> [Direction; 6] {
        [
            Direction::Down,
            Direction::Up,
            Direction::North,
            Direction::South,
            Direction::West,
            Direction::East,
        ]
    }

    pub fn horizontal() -> [Direction; 4] {
        [
            Direction::North,
            Direction::South,
            Direction::West,
            Direction::East,
        ]
    }

    pub fn opposite(&self) -> Direction {
        match *self {
            Direction::Down => Direction::Up,
            Direction::Up => Direction::Down,
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::East => Direction::West,
        }
    }

    pub fn clockwise(&self) -> Direction {
        match *self {
            Direction::Down => Direction::Down,
            Direction::Up => Direction::Up,
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
            Direction::North => Direction::East,
        }
    }

    pub fn counter_clockwise(&self) -> Direction {
        match *self {
            Direction::Down => Direction::Down,
            Direction::Up => Direction::Up,
            Direction::East => Direction::North,
            Direction::North => Direction::West,
            Direction::West => Direction::South,
            Direction::South => Direction::East,
        }
    }

    pub fn get_offset(&self) -> (i32, i32, i32) {
        match *self {
            Direction::Down => (0, -1, 0),
            Direction::Up => (0, 1, 0),
            Direction::North => (0, 0, -1),
            Direction::South => (0, 0, 1),
            Direction::West => (-1, 0, 0),
            Direction::East => (1, 0, 0),
        }
    }

    pub fn as_string(&self) -> &'static str {
        match *self {
            Direction::Down => "down",
            Direction::Up => "up",
            Direction::North => "north",
            Direction::South => "south",
            Direction::West => "west",
            Direction::East => "east",
        }
    }

    pub fn index(&self) -> usize {
        match *self {
            Direction::Down => 0,
            Direction::Up => 1,
            Direction::North => 2,
            Direction::South => 3,
            Direction::West => 4,
            Direction::East => 5,
        }
    }

    pub fn axis(&self) -> Axis {
        match *self {
            Direction::Down | Direction::Up => Axis::Y,
            Direction::North | Direction::South => Axis::Z,
            Direction::West | Direction::East => Axis::X,
        }
    }

    /// Yaw (radians) an agent faces when looking along this horizontal
    /// direction, in the sim convention where yaw 0 looks toward -Z.
    pub fn yaw(&self) -> f32 {
        match *self {
            Direction::North => 0.0,
            Direction::South => std::f32::consts::PI,
            Direction::West => std::f32::consts::FRAC_PI_2,
            Direction::East => -std::f32::consts::FRAC_PI_2,
            _ => unreachable!(),
        }
    }
}
