//! Integer grid cells
//!
//! Placement and occupancy work on whole cells; world positions are only
//! derived for presentation.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A cell on the XZ placement grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub z: i32,
}

impl Cell {
    pub const ORIGIN: Cell = Cell { x: 0, z: 0 };

    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    pub const fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            x: self.x + dx,
            z: self.z + dz,
        }
    }

    pub fn manhattan(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x) + self.z.abs_diff(other.z)
    }

    /// The four cells one step away (N, E, S, W)
    pub fn neighbors(self) -> [Cell; 4] {
        [
            self.offset(0, 1),
            self.offset(1, 0),
            self.offset(0, -1),
            self.offset(-1, 0),
        ]
    }

    /// The eight cells at Manhattan distance exactly 2
    pub fn ring2(self) -> [Cell; 8] {
        [
            self.offset(0, 2),
            self.offset(1, 1),
            self.offset(2, 0),
            self.offset(1, -1),
            self.offset(0, -2),
            self.offset(-1, -1),
            self.offset(-2, 0),
            self.offset(-1, 1),
        ]
    }

    /// Centre of this cell in world space
    pub fn world_position(self, step: f32, height: f32) -> Vec3 {
        Vec3::new(self.x as f32 * step, height, self.z as f32 * step)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbors_are_one_step() {
        let c = Cell::new(3, -2);
        for n in c.neighbors() {
            assert_eq!(c.manhattan(n), 1);
        }
    }

    #[test]
    fn test_ring2_excludes_center_and_neighbors() {
        let c = Cell::new(-1, 4);
        let ring = c.ring2();
        for r in ring {
            assert_eq!(c.manhattan(r), 2);
        }
        let mut unique = ring.to_vec();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 8);
    }

    #[test]
    fn test_world_position() {
        let p = Cell::new(2, -1).world_position(9.0, 0.1);
        assert_eq!(p, Vec3::new(18.0, 0.1, -9.0));
    }
}
