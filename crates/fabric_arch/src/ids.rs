//! Resource handles and netlist IDs.
//!
//! Device resources are addressed by a tile index plus an index local to the
//! tile's type. A wire that belongs to a cross-tile node is always handed out
//! in its node form, so electrically identical wires compare equal. Absent
//! resources are `Option::None` at every API boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub const fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Opaque, copyable ID for a cell in the netlist.
    CellId
);

define_id!(
    /// Opaque, copyable ID for a net in the netlist.
    NetId
);

/// A placement target: a bel of a tile instance.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct BelId {
    /// Row-major tile index.
    pub tile: u32,
    /// Bel index within the tile's type.
    pub index: u32,
}

/// A pip of a tile instance.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct PipId {
    /// Row-major tile index.
    pub tile: u32,
    /// Pip index within the tile's type.
    pub index: u32,
}

/// A routing wire, either tile-local or a whole cross-tile node.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum WireId {
    /// A wire that belongs to no node.
    Tile {
        /// Row-major tile index.
        tile: u32,
        /// Wire index within the tile's type.
        index: u32,
    },
    /// A node spanning several tiles.
    Node(u32),
}

/// A grid location; `z` separates bels stacked in one tile.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct Loc {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
    /// Stacking coordinate.
    pub z: i32,
}

impl Loc {
    /// Creates a location.
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn id_roundtrip() {
        assert_eq!(NetId::from_raw(7).as_raw(), 7);
        assert_eq!(format!("{}", CellId::from_raw(3)), "3");
    }

    #[test]
    fn wire_handle_equality_is_by_value() {
        let a = WireId::Tile { tile: 4, index: 2 };
        let b = WireId::Tile { tile: 4, index: 2 };
        assert_eq!(a, b);
        assert_ne!(a, WireId::Node(4));
        let set: HashSet<WireId> = [a, b, WireId::Node(0)].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn serde_roundtrip() {
        let bel = BelId { tile: 9, index: 1 };
        let json = serde_json::to_string(&bel).unwrap();
        let back: BelId = serde_json::from_str(&json).unwrap();
        assert_eq!(bel, back);
    }
}
