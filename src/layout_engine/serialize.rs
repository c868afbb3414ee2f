//! Stable textual form of a BSP tree: splits and ratios are preserved,
//! leaves are placeholders re-bound against the visible window set when the
//! tree is restored.

use serde::{Deserialize, Serialize};

use crate::layout_engine::node::SplitKind;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SerializedNode {
    Leaf,
    Split {
        split: SplitKind,
        ratio: f32,
        left: Box<SerializedNode>,
        right: Box<SerializedNode>,
    },
}

impl SerializedNode {
    pub fn leaf_count(&self) -> usize {
        match self {
            SerializedNode::Leaf => 1,
            SerializedNode::Split { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }

    /// Shrink the shape to its first `keep` leaves in in-order traversal
    /// order, collapsing splits left with a single child. `None` when `keep`
    /// is zero.
    pub fn pruned(&self, keep: usize) -> Option<SerializedNode> {
        let mut remaining = keep;
        self.prune_counted(&mut remaining)
    }

    fn prune_counted(&self, remaining: &mut usize) -> Option<SerializedNode> {
        if *remaining == 0 {
            return None;
        }
        match self {
            SerializedNode::Leaf => {
                *remaining -= 1;
                Some(SerializedNode::Leaf)
            }
            SerializedNode::Split { split, ratio, left, right } => {
                let left = left.prune_counted(remaining);
                let right = right.prune_counted(remaining);
                match (left, right) {
                    (Some(left), Some(right)) => Some(SerializedNode::Split {
                        split: *split,
                        ratio: *ratio,
                        left: Box::new(left),
                        right: Box::new(right),
                    }),
                    (Some(only), None) | (None, Some(only)) => Some(only),
                    (None, None) => None,
                }
            }
        }
    }

    pub fn to_text(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    pub fn from_text(text: &str) -> Result<SerializedNode, ron::error::SpannedError> {
        ron::from_str(text)
    }
}
