use std::sync::Arc;

use parking_lot::lock_api::ArcMutexGuard;
use parking_lot::{Mutex, RawMutex};
use serde::{Deserialize, Serialize};

use crate::common::collections::HashMap;
use crate::layout_engine::monocle::MonocleList;
use crate::layout_engine::node::BspTree;
use crate::sys::geometry::Rect;
use crate::sys::window_server::SpaceId;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SpaceMode {
    Bsp,
    Monocle,
    Float,
}

impl Default for SpaceMode {
    fn default() -> Self { SpaceMode::Bsp }
}

impl std::fmt::Display for SpaceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SpaceMode::Bsp => "bsp",
            SpaceMode::Monocle => "monocle",
            SpaceMode::Float => "float",
        };
        f.write_str(name)
    }
}

/// Workspace insets plus the inter-window gap applied at every split.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
#[serde(default)]
pub struct Offset {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
    pub gap: f64,
}

#[derive(Debug)]
pub enum LayoutTree {
    Bsp(BspTree),
    Monocle(MonocleList),
}

/// Per-workspace controller state. Mutated only while its registry lock is
/// held.
#[derive(Debug)]
pub struct VirtualSpace {
    pub mode: SpaceMode,
    pub tree: Option<LayoutTree>,
    offset_enabled: bool,
    pub offset: Offset,
}

impl VirtualSpace {
    fn new(mode: SpaceMode, offset: Offset) -> VirtualSpace {
        VirtualSpace {
            mode,
            tree: None,
            offset_enabled: true,
            offset,
        }
    }

    pub fn offset(&self) -> Option<&Offset> { self.offset_enabled.then_some(&self.offset) }

    pub fn gap(&self) -> f64 { self.offset().map(|o| o.gap).unwrap_or(0.0) }

    /// Flip whether the workspace inset applies; returns the new state.
    pub fn toggle_offset(&mut self) -> bool {
        self.offset_enabled = !self.offset_enabled;
        self.offset_enabled
    }

    /// The region the layout tree partitions: the display bounds with the
    /// inset carved out when enabled.
    pub fn tiling_region(&self, display: Rect) -> Rect {
        match self.offset() {
            Some(o) => Rect::new(
                display.origin.x + o.left,
                display.origin.y + o.top,
                (display.size.width - o.left - o.right).max(0.0),
                (display.size.height - o.top - o.bottom).max(0.0),
            ),
            None => display,
        }
    }

    pub fn bsp(&self) -> Option<&BspTree> {
        match &self.tree {
            Some(LayoutTree::Bsp(tree)) => Some(tree),
            _ => None,
        }
    }

    pub fn bsp_mut(&mut self) -> Option<&mut BspTree> {
        match &mut self.tree {
            Some(LayoutTree::Bsp(tree)) => Some(tree),
            _ => None,
        }
    }

    pub fn monocle(&self) -> Option<&MonocleList> {
        match &self.tree {
            Some(LayoutTree::Monocle(list)) => Some(list),
            _ => None,
        }
    }

    pub fn monocle_mut(&mut self) -> Option<&mut MonocleList> {
        match &mut self.tree {
            Some(LayoutTree::Monocle(list)) => Some(list),
            _ => None,
        }
    }
}

/// An exclusive handle on one workspace's state. Owned guard: releasing is
/// dropping, so every exit path of a command releases correctly.
pub type VirtualSpaceHandle = ArcMutexGuard<RawMutex, VirtualSpace>;

/// Lazily-populated map from OS workspace to controller state. `acquire`
/// creates the default-mode state on first touch; `destroy` drops a
/// workspace the OS removed.
pub struct VirtualSpaceRegistry {
    spaces: Mutex<HashMap<SpaceId, Arc<Mutex<VirtualSpace>>>>,
    default_mode: SpaceMode,
    default_offset: Offset,
}

impl VirtualSpaceRegistry {
    pub fn new(default_mode: SpaceMode, default_offset: Offset) -> VirtualSpaceRegistry {
        VirtualSpaceRegistry {
            spaces: Mutex::new(HashMap::default()),
            default_mode,
            default_offset,
        }
    }

    pub fn acquire(&self, space: SpaceId) -> VirtualSpaceHandle {
        let arc = {
            let mut spaces = self.spaces.lock();
            spaces
                .entry(space)
                .or_insert_with(|| {
                    Arc::new(Mutex::new(VirtualSpace::new(self.default_mode, self.default_offset)))
                })
                .clone()
        };
        arc.lock_arc()
    }

    pub fn contains(&self, space: SpaceId) -> bool { self.spaces.lock().contains_key(&space) }

    pub fn destroy(&self, space: SpaceId) -> bool { self.spaces.lock().remove(&space).is_some() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_creates_the_default_state_lazily() {
        let registry = VirtualSpaceRegistry::new(SpaceMode::Monocle, Offset::default());
        assert!(!registry.contains(SpaceId::new(1)));
        let vs = registry.acquire(SpaceId::new(1));
        assert_eq!(vs.mode, SpaceMode::Monocle);
        assert!(vs.tree.is_none());
        drop(vs);
        assert!(registry.contains(SpaceId::new(1)));
        assert!(registry.destroy(SpaceId::new(1)));
        assert!(!registry.contains(SpaceId::new(1)));
    }

    #[test]
    fn acquire_is_reentrant_across_release() {
        let registry = VirtualSpaceRegistry::new(SpaceMode::Bsp, Offset::default());
        {
            let mut vs = registry.acquire(SpaceId::new(7));
            vs.mode = SpaceMode::Float;
        }
        let vs = registry.acquire(SpaceId::new(7));
        assert_eq!(vs.mode, SpaceMode::Float);
    }

    #[test]
    fn tiling_region_applies_the_inset_only_when_enabled() {
        let mut vs = VirtualSpace::new(SpaceMode::Bsp, Offset {
            top: 20.0,
            bottom: 10.0,
            left: 5.0,
            right: 5.0,
            gap: 8.0,
        });
        let display = Rect::new(0.0, 0.0, 1000.0, 500.0);
        assert_eq!(vs.tiling_region(display), Rect::new(5.0, 20.0, 990.0, 470.0));
        assert_eq!(vs.gap(), 8.0);

        assert!(!vs.toggle_offset());
        assert_eq!(vs.tiling_region(display), display);
        assert_eq!(vs.gap(), 0.0);
    }
}
