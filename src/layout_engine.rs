pub mod monocle;
pub mod node;
pub mod presel;
pub mod selector;
pub mod serialize;

use serde::{Deserialize, Serialize};

pub use monocle::MonocleList;
pub use node::{BspTree, NodeId, Removal, Rotation, SplitKind};
pub use presel::Preselect;
pub use serialize::SerializedNode;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardinalDir {
    North,
    East,
    South,
    West,
}

impl CardinalDir {
    /// The split axis a window spawned in this direction would create:
    /// east/west cut the region with a vertical line, north/south with a
    /// horizontal one.
    pub fn split(self) -> SplitKind {
        match self {
            CardinalDir::East | CardinalDir::West => SplitKind::Vertical,
            CardinalDir::North | CardinalDir::South => SplitKind::Horizontal,
        }
    }

    /// Whether a window spawned in this direction lands in the first child
    /// slot (left or top).
    pub fn spawns_left(self) -> bool {
        matches!(self, CardinalDir::West | CardinalDir::North)
    }
}
