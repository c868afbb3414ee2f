//! User-facing commands. Every operation acquires the target workspace's
//! virtual space for its duration and follows the same ordering: mutate the
//! tree, recompute regions, push frames to the host, then move focus.

pub mod ops;
pub mod query;
mod transfer;

use std::sync::Arc;

use tracing::warn;

use crate::common::config::{Cvars, FocusCycle, SplitMode};
use crate::layout_engine::monocle::MonocleList;
use crate::layout_engine::node::{BspTree, NodeId, Removal, Rotation, SplitKind};
use crate::layout_engine::selector::{self, Ordered};
use crate::layout_engine::serialize::SerializedNode;
use crate::layout_engine::{CardinalDir, Preselect};
use crate::model::virtual_space::{LayoutTree, SpaceMode, VirtualSpace, VirtualSpaceRegistry};
use crate::sys::extended_dock::{
    ExtendedDock, FLOATING_WINDOW_LEVEL_KEY, NORMAL_WINDOW_LEVEL_KEY,
};
use crate::sys::geometry::Rect;
use crate::sys::window_server::{Space, SpaceId, SpaceKind, WindowId, WindowServer};

use ops::{MonitorOp, PreselectOp, Selector, ToggleKind};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A bug or OS state race; commands abort rather than guess.
    #[error("invariant violated: {0}")]
    Invariant(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;

enum FocusAction {
    None,
    Focus(WindowId),
    Monitor(MonitorOp),
}

/// The controller context: host bridge, dock-helper client, per-workspace
/// state and configuration, threaded through every command explicitly.
pub struct Controller {
    server: Arc<dyn WindowServer>,
    dock: ExtendedDock,
    spaces: VirtualSpaceRegistry,
    cvars: Cvars,
}

impl Controller {
    pub fn new(server: Arc<dyn WindowServer>, cvars: Cvars) -> Controller {
        let spaces = VirtualSpaceRegistry::new(cvars.space_mode_default, cvars.desktop_offset);
        Controller {
            server,
            dock: ExtendedDock::default(),
            spaces,
            cvars,
        }
    }

    pub fn with_dock(mut self, dock: ExtendedDock) -> Controller {
        self.dock = dock;
        self
    }

    pub fn cvars(&self) -> &Cvars { &self.cvars }

    pub fn cvars_mut(&mut self) -> &mut Cvars { &mut self.cvars }

    pub fn set_insertion_point(&mut self, window: Option<WindowId>) {
        self.cvars.bsp_insertion_point = window;
    }

    /// Drop the controller state of a workspace the OS removed.
    pub fn space_destroyed(&mut self, space: SpaceId) {
        if self.spaces.contains(space) {
            let mut vs = self.spaces.acquire(space);
            self.free_tree(&mut vs);
            drop(vs);
            self.spaces.destroy(space);
        }
    }

    // ---- shared helpers -------------------------------------------------

    fn active_space(&self) -> Result<Space> {
        self.server.active_space().ok_or(Error::Invariant("no active workspace"))
    }

    fn insertion_window(&self) -> Option<WindowId> {
        let id = self.cvars.bsp_insertion_point?;
        self.server.window_info(id).map(|info| info.id)
    }

    fn tiling_region_for(&self, space: SpaceId, vs: &VirtualSpace) -> Option<Rect> {
        let display = self.server.display_for_space(space)?;
        Some(vs.tiling_region(self.server.usable_display_bounds(&display)))
    }

    fn apply_frames(&self, frames: &[(WindowId, Rect)]) {
        for (window, frame) in frames {
            self.server.set_window_frame(*window, *frame);
        }
    }

    fn center_mouse(&self, region: Rect) {
        if !region.contains(self.server.cursor_position()) {
            self.server.warp_cursor(region.center());
        }
    }

    fn focus_cycle_wrap(&self) -> bool {
        match self.cvars.window_focus_cycle {
            FocusCycle::All => self.server.display_count() == 1,
            FocusCycle::Monitor => true,
            FocusCycle::None => false,
        }
    }

    fn bsp_neighbor(
        &self,
        space: SpaceId,
        tree: &BspTree,
        from: NodeId,
        sel: Selector,
        wrap: bool,
    ) -> Option<WindowId> {
        match sel {
            Selector::Ordered(op) => {
                selector::ordered_neighbor(tree, from, op, wrap).and_then(|n| tree.window_at(n))
            }
            Selector::Dir(dir) => {
                let source = (tree.window_at(from)?, tree.node(from).region);
                let candidates: Vec<(WindowId, Rect)> = tree
                    .leaves()
                    .into_iter()
                    .filter_map(|leaf| Some((tree.window_at(leaf)?, tree.node(leaf).region)))
                    .collect();
                let bounds = if wrap {
                    let display = self.server.display_for_space(space)?;
                    Some(self.server.display_bounds(&display))
                } else {
                    None
                };
                selector::closest_in_direction(source, candidates, dir, bounds.as_ref())
            }
        }
    }

    /// Recompute the whole layout of a space from fresh display bounds and
    /// push every frame.
    fn refresh_space_layout(&self, space: SpaceId, vs: &mut VirtualSpace) {
        let Some(region) = self.tiling_region_for(space, vs) else {
            return;
        };
        let gap = vs.gap();
        match &mut vs.tree {
            Some(LayoutTree::Bsp(tree)) => {
                tree.compute_regions(region, gap);
                let frames = tree.window_frames();
                self.apply_frames(&frames);
            }
            Some(LayoutTree::Monocle(list)) => {
                for window in list.windows() {
                    self.server.set_window_frame(*window, region);
                }
            }
            None => {}
        }
    }

    /// Drop a space's tree, releasing every preselect hint window in it.
    fn free_tree(&self, vs: &mut VirtualSpace) {
        if let Some(LayoutTree::Bsp(tree)) = &mut vs.tree {
            for leaf in tree.leaves() {
                if let Some(presel) = tree.take_preselect(leaf) {
                    if let Some(hint) = presel.hint {
                        self.server.destroy_hint_window(hint);
                    }
                }
            }
        }
        vs.tree = None;
    }

    // ---- tiling ---------------------------------------------------------

    /// Tile a window on the active space of the display it occupies.
    pub fn tile_window(&mut self, window: WindowId) -> Result<()> {
        if !self.server.is_window_tileable(window) || self.server.window_flags(window).float {
            return Ok(());
        }
        let Some(info) = self.server.window_info(window) else {
            return Ok(());
        };
        let Some(display) = self.server.display_for_rect(info.frame) else {
            return Ok(());
        };
        let Some(space) = self.server.active_space_on_display(&display) else {
            return Ok(());
        };
        if space.kind != SpaceKind::User {
            return Ok(());
        }
        let mut vs = self.spaces.acquire(space.id);
        self.tile_window_on_space(window, space.id, &mut vs);
        Ok(())
    }

    pub fn untile_window(&mut self, window: WindowId) -> Result<()> {
        let Some(info) = self.server.window_info(window) else {
            return Ok(());
        };
        let Some(display) = self.server.display_for_rect(info.frame) else {
            return Ok(());
        };
        let Some(space) = self.server.active_space_on_display(&display) else {
            return Ok(());
        };
        if space.kind != SpaceKind::User {
            return Ok(());
        }
        let mut vs = self.spaces.acquire(space.id);
        self.untile_window_from_space(window, space.id, &mut vs);
        Ok(())
    }

    fn tile_window_on_space(&self, window: WindowId, space: SpaceId, vs: &mut VirtualSpace) {
        match vs.mode {
            SpaceMode::Float => {}
            SpaceMode::Monocle => {
                let region = self.tiling_region_for(space, vs);
                match &mut vs.tree {
                    Some(LayoutTree::Monocle(list)) => list.push(window),
                    _ => vs.tree = Some(LayoutTree::Monocle(MonocleList::new(window))),
                }
                if let Some(region) = region {
                    self.server.set_window_frame(window, region);
                }
            }
            SpaceMode::Bsp => {
                let Some(region) = self.tiling_region_for(space, vs) else {
                    return;
                };
                let gap = vs.gap();
                match &mut vs.tree {
                    Some(LayoutTree::Bsp(tree)) => {
                        if tree.find_window(window).is_some() {
                            return;
                        }
                        // Without a usable insertion point, split the most
                        // recently tiled leaf (the last in traversal order).
                        let leaf = self
                            .cvars
                            .bsp_insertion_point
                            .and_then(|w| tree.find_window(w))
                            .unwrap_or_else(|| tree.last_leaf());
                        let (split, ratio, spawn_left) = match tree.take_preselect(leaf) {
                            Some(presel) => {
                                if let Some(hint) = presel.hint {
                                    self.server.destroy_hint_window(hint);
                                }
                                (presel.split, presel.ratio, presel.spawn_left)
                            }
                            None => {
                                let split = match self.cvars.bsp_split_mode {
                                    SplitMode::Vertical => SplitKind::Vertical,
                                    SplitMode::Horizontal => SplitKind::Horizontal,
                                    SplitMode::Optimal => {
                                        let r = tree.node(leaf).region;
                                        if r.size.height <= 0.0
                                            || r.size.width / r.size.height
                                                >= self.cvars.bsp_optimal_ratio
                                        {
                                            SplitKind::Vertical
                                        } else {
                                            SplitKind::Horizontal
                                        }
                                    }
                                };
                                (split, self.cvars.bsp_split_ratio, self.cvars.bsp_spawn_left)
                            }
                        };
                        tree.split_leaf(leaf, window, split, ratio, spawn_left);
                        tree.compute_regions_below(leaf, gap);
                        let frames = tree.frames_below(leaf);
                        self.apply_frames(&frames);
                    }
                    _ => {
                        let mut tree = BspTree::new(window, region);
                        tree.compute_regions(region, gap);
                        let frames = tree.window_frames();
                        vs.tree = Some(LayoutTree::Bsp(tree));
                        self.apply_frames(&frames);
                    }
                }
            }
        }
    }

    fn untile_window_from_space(&self, window: WindowId, _space: SpaceId, vs: &mut VirtualSpace) {
        match vs.mode {
            SpaceMode::Float => {}
            SpaceMode::Monocle => {
                if let Some(list) = vs.monocle_mut() {
                    if list.remove(window) && list.is_empty() {
                        vs.tree = None;
                    }
                }
            }
            SpaceMode::Bsp => {
                let removal = match vs.bsp_mut() {
                    Some(tree) => tree.remove_window(window),
                    None => return,
                };
                match removal {
                    Removal::NotFound => {}
                    Removal::TreeEmpty { preselect } => {
                        if let Some(hint) = preselect.and_then(|p| p.hint) {
                            self.server.destroy_hint_window(hint);
                        }
                        vs.tree = None;
                    }
                    Removal::Promoted { node, preselect } => {
                        if let Some(hint) = preselect.and_then(|p| p.hint) {
                            self.server.destroy_hint_window(hint);
                        }
                        let gap = vs.gap();
                        if let Some(tree) = vs.bsp_mut() {
                            tree.compute_regions_below(node, gap);
                            let frames = tree.frames_below(node);
                            self.apply_frames(&frames);
                        }
                    }
                }
            }
        }
    }

    fn create_window_tree_for_space(&self, space: SpaceId, vs: &mut VirtualSpace) {
        for window in self.server.visible_windows(space, false, false) {
            self.tile_window_on_space(window, space, vs);
        }
    }

    /// Restore a serialized shape: bind as many visible windows as the shape
    /// has leaves (pruning the shape if windows are scarce), then tile any
    /// surplus windows normally.
    fn create_deserialized_tree_for_space(
        &self,
        space: SpaceId,
        vs: &mut VirtualSpace,
        shape: &SerializedNode,
    ) {
        let windows = self.server.visible_windows(space, false, false);
        if windows.is_empty() {
            vs.tree = None;
            return;
        }
        let Some(region) = self.tiling_region_for(space, vs) else {
            return;
        };
        let count = windows.len().min(shape.leaf_count());
        let Some(pruned) = shape.pruned(count) else {
            return;
        };
        let Some(mut tree) = BspTree::from_serialized(&pruned, &windows[..count], region) else {
            return;
        };
        tree.compute_regions(region, vs.gap());
        let frames = tree.window_frames();
        vs.tree = Some(LayoutTree::Bsp(tree));
        self.apply_frames(&frames);
        for window in &windows[count..] {
            self.tile_window_on_space(*window, space, vs);
        }
    }

    // ---- focus ----------------------------------------------------------

    pub fn focus_window(&mut self, op: &str) -> Result<()> {
        let Ok(sel) = op.parse::<Selector>() else {
            warn!("unknown focus direction '{op}'");
            return Ok(());
        };
        let space = self.active_space()?;
        if space.kind != SpaceKind::User {
            if space.kind == SpaceKind::Fullscreen {
                self.focus_window_in_fullscreen_space(space.id, sel);
            }
            return Ok(());
        }

        let vs = self.spaces.acquire(space.id);
        if vs.tree.is_none() || vs.mode == SpaceMode::Float {
            return Ok(());
        }

        let action = match self.insertion_window() {
            None => terminal_leaf_action(&vs, sel),
            Some(window) => match vs.mode {
                SpaceMode::Bsp => {
                    let Some(tree) = vs.bsp() else {
                        return Ok(());
                    };
                    let node = tree
                        .find_window(window)
                        .ok_or(Error::Invariant("insertion-point window missing from tree"))?;
                    let cycle = self.cvars.window_focus_cycle;
                    match self.bsp_neighbor(space.id, tree, node, sel, self.focus_cycle_wrap()) {
                        Some(target) => FocusAction::Focus(target),
                        None if cycle == FocusCycle::All => match sel {
                            Selector::Dir(CardinalDir::East) | Selector::Ordered(Ordered::Next) => {
                                FocusAction::Monitor(MonitorOp::Next)
                            }
                            Selector::Dir(CardinalDir::West) | Selector::Ordered(Ordered::Prev) => {
                                FocusAction::Monitor(MonitorOp::Prev)
                            }
                            _ => FocusAction::None,
                        },
                        None => FocusAction::None,
                    }
                }
                SpaceMode::Monocle => {
                    let Some(list) = vs.monocle() else {
                        return Ok(());
                    };
                    if !list.contains(window) {
                        FocusAction::None
                    } else {
                        self.monocle_focus_action(list, window, sel)
                    }
                }
                SpaceMode::Float => FocusAction::None,
            },
        };

        drop(vs);
        match action {
            FocusAction::None => Ok(()),
            FocusAction::Focus(window) => {
                self.server.focus_window(window);
                Ok(())
            }
            FocusAction::Monitor(op) => self.focus_monitor_command(op),
        }
    }

    fn monocle_focus_action(
        &self,
        list: &MonocleList,
        window: WindowId,
        sel: Selector,
    ) -> FocusAction {
        let cycle = self.cvars.window_focus_cycle;
        let (neighbor, wrapped, fallback) = match sel {
            Selector::Dir(CardinalDir::West) | Selector::Ordered(Ordered::Prev) => {
                (list.prev_of(window), list.last(), MonitorOp::Prev)
            }
            Selector::Dir(CardinalDir::East) | Selector::Ordered(Ordered::Next) => {
                (list.next_of(window), list.first(), MonitorOp::Next)
            }
            _ => return FocusAction::None,
        };
        if let Some(target) = neighbor {
            return FocusAction::Focus(target);
        }
        match cycle {
            FocusCycle::All => {
                if self.server.display_count() == 1 {
                    wrapped.map_or(FocusAction::None, FocusAction::Focus)
                } else {
                    FocusAction::Monitor(fallback)
                }
            }
            FocusCycle::Monitor => wrapped.map_or(FocusAction::None, FocusAction::Focus),
            FocusCycle::None => FocusAction::None,
        }
    }

    /// Fullscreen workspaces have no tree; neighbor search runs directly on
    /// window frames, with prev/next standing in for west/east.
    fn focus_window_in_fullscreen_space(&self, space: SpaceId, sel: Selector) {
        let Some(window) = self.server.focused_window() else {
            return;
        };
        let dir = match sel {
            Selector::Dir(dir) => dir,
            Selector::Ordered(Ordered::Prev) => CardinalDir::West,
            Selector::Ordered(Ordered::Next) => CardinalDir::East,
            Selector::Ordered(Ordered::Biggest) => return,
        };
        let Some(info) = self.server.window_info(window) else {
            return;
        };
        let candidates: Vec<(WindowId, Rect)> = self
            .server
            .visible_windows(space, true, false)
            .into_iter()
            .filter_map(|w| Some((w, self.server.window_info(w)?.frame)))
            .collect();
        let bounds = if self.focus_cycle_wrap() {
            self.server.display_for_space(space).map(|d| self.server.display_bounds(&d))
        } else {
            None
        };
        if let Some(target) =
            selector::closest_in_direction((window, info.frame), candidates, dir, bounds.as_ref())
        {
            self.server.focus_window(target);
        }
    }

    // ---- swap / warp ----------------------------------------------------

    pub fn swap_window(&mut self, op: &str) -> Result<()> {
        let Ok(sel) = op.parse::<Selector>() else {
            warn!("unknown swap direction '{op}'");
            return Ok(());
        };
        let Some(window) = self.insertion_window() else {
            return Ok(());
        };
        let space = self.active_space()?;
        if space.kind != SpaceKind::User {
            return Ok(());
        }
        let mut vs = self.spaces.acquire(space.id);
        if vs.tree.is_none() || vs.mode == SpaceMode::Float {
            return Ok(());
        }
        match vs.mode {
            SpaceMode::Bsp => {
                let Some(tree) = vs.bsp() else {
                    return Ok(());
                };
                let Some(node) = tree.find_window(window) else {
                    return Ok(());
                };
                let Some(target) = self.bsp_neighbor(space.id, tree, node, sel, false) else {
                    return Ok(());
                };
                let target_node = tree
                    .find_window(target)
                    .ok_or(Error::Invariant("neighbor window missing from tree"))?;
                let Some(tree) = vs.bsp_mut() else {
                    return Ok(());
                };
                tree.swap_windows(node, target_node);
                for leaf in [node, target_node] {
                    if let Some(w) = tree.window_at(leaf) {
                        self.server.set_window_frame(w, tree.node(leaf).region);
                    }
                }
                if self.cvars.mouse_follows_focus {
                    self.center_mouse(tree.node(target_node).region);
                }
            }
            SpaceMode::Monocle => {
                // Swapping in monocle never follows the mouse.
                let Some(list) = vs.monocle_mut() else {
                    return Ok(());
                };
                if !list.contains(window) {
                    return Ok(());
                }
                if let Some(target) = monocle_wrap_neighbor(list, window, sel) {
                    if target != window {
                        list.swap(window, target);
                    }
                }
            }
            SpaceMode::Float => {}
        }
        Ok(())
    }

    pub fn warp_window(&mut self, op: &str) -> Result<()> {
        let Ok(sel) = op.parse::<Selector>() else {
            warn!("unknown warp direction '{op}'");
            return Ok(());
        };
        let Some(window) = self.insertion_window() else {
            return Ok(());
        };
        let space = self.active_space()?;
        if space.kind != SpaceKind::User {
            return Ok(());
        }
        let mut vs = self.spaces.acquire(space.id);
        if vs.tree.is_none() || vs.mode == SpaceMode::Float {
            return Ok(());
        }
        match vs.mode {
            SpaceMode::Bsp => {
                let Some(tree) = vs.bsp() else {
                    return Ok(());
                };
                let node = tree
                    .find_window(window)
                    .ok_or(Error::Invariant("insertion-point window missing from tree"))?;
                let Some(target) = self.bsp_neighbor(space.id, tree, node, sel, false) else {
                    return Ok(());
                };
                let target_node = tree
                    .find_window(target)
                    .ok_or(Error::Invariant("neighbor window missing from tree"))?;

                let focused_region;
                if tree.node(node).parent == tree.node(target_node).parent {
                    // Same parent: a plain swap moves the window there.
                    let Some(tree) = vs.bsp_mut() else {
                        return Ok(());
                    };
                    tree.swap_windows(node, target_node);
                    for leaf in [node, target_node] {
                        if let Some(w) = tree.window_at(leaf) {
                            self.server.set_window_frame(w, tree.node(leaf).region);
                        }
                    }
                    focused_region = tree.node(target_node).region;
                } else {
                    self.untile_window_from_space(window, space.id, &mut vs);
                    self.cvars.bsp_insertion_point = Some(target);
                    self.tile_window_on_space(window, space.id, &mut vs);
                    self.cvars.bsp_insertion_point = Some(window);
                    let Some(tree) = vs.bsp() else {
                        return Ok(());
                    };
                    let leaf = tree
                        .find_window(window)
                        .ok_or(Error::Invariant("warped window missing from tree"))?;
                    focused_region = tree.node(leaf).region;
                }
                if self.cvars.mouse_follows_focus {
                    self.center_mouse(focused_region);
                }
            }
            SpaceMode::Monocle => {
                let Some(list) = vs.monocle_mut() else {
                    return Ok(());
                };
                if !list.contains(window) {
                    return Ok(());
                }
                if let Some(target) = monocle_wrap_neighbor(list, window, sel) {
                    if target != window {
                        list.swap(window, target);
                    }
                }
            }
            SpaceMode::Float => {}
        }
        Ok(())
    }

    // ---- toggles --------------------------------------------------------

    pub fn toggle_window(&mut self, kind: &str) -> Result<()> {
        let Ok(kind) = kind.parse::<ToggleKind>() else {
            warn!("unknown toggle kind '{kind}'");
            return Ok(());
        };
        match kind {
            ToggleKind::Float => self.toggle_window_float(),
            ToggleKind::Sticky => self.toggle_window_sticky(),
            ToggleKind::NativeFullscreen => self.toggle_window_native_fullscreen(),
            ToggleKind::Fullscreen => self.toggle_window_fullscreen_zoom(),
            ToggleKind::Parent => self.toggle_window_parent_zoom(),
            ToggleKind::Split => self.toggle_window_split_mode(),
        }
    }

    fn float_window(&self, window: WindowId) {
        self.server.set_window_float(window, true);
        if self.cvars.window_float_topmost {
            self.dock.set_window_level(window, FLOATING_WINDOW_LEVEL_KEY);
        }
    }

    fn unfloat_window(&self, window: WindowId) {
        self.server.set_window_float(window, false);
        if self.cvars.window_float_topmost {
            self.dock.set_window_level(window, NORMAL_WINDOW_LEVEL_KEY);
        }
    }

    fn toggle_window_float(&mut self) -> Result<()> {
        let Some(window) = self.server.focused_window() else {
            return Ok(());
        };
        if self.server.window_flags(window).float {
            self.unfloat_window(window);
            self.tile_window(window)
        } else {
            self.untile_window(window)?;
            self.float_window(window);
            Ok(())
        }
    }

    fn toggle_window_sticky(&mut self) -> Result<()> {
        let Some(window) = self.server.focused_window() else {
            return Ok(());
        };
        let flags = self.server.window_flags(window);
        if flags.sticky {
            self.dock.set_window_sticky(window, false);
            self.server.set_window_sticky(window, false);
            if flags.float {
                self.unfloat_window(window);
                self.tile_window(window)?;
            }
        } else {
            self.dock.set_window_sticky(window, true);
            self.server.set_window_sticky(window, true);
            if !flags.float {
                self.untile_window(window)?;
                self.float_window(window);
            }
        }
        Ok(())
    }

    fn toggle_window_native_fullscreen(&mut self) -> Result<()> {
        let Some(window) = self.server.focused_window() else {
            return Ok(());
        };
        if self.server.is_window_fullscreen(window) {
            self.server.set_window_fullscreen(window, false);
            self.tile_window(window)
        } else {
            self.untile_window(window)?;
            self.server.set_window_fullscreen(window, true);
            Ok(())
        }
    }

    fn toggle_window_fullscreen_zoom(&mut self) -> Result<()> {
        let space = self.active_space()?;
        if space.kind != SpaceKind::User {
            return Ok(());
        }
        let mut vs = self.spaces.acquire(space.id);
        if vs.mode != SpaceMode::Bsp {
            return Ok(());
        }
        let Some(window) = self.server.focused_window() else {
            return Ok(());
        };
        let Some(tree) = vs.bsp_mut() else {
            return Ok(());
        };
        let Some(node) = tree.find_window(window) else {
            return Ok(());
        };

        if tree.fullscreen_zoom() == Some(node) {
            tree.set_fullscreen_zoom(None);
            self.server.set_window_frame(window, tree.node(node).region);
        } else {
            // Parent zoom and fullscreen zoom are mutually exclusive.
            if let Some(parent) = tree.node(node).parent {
                if tree.node(parent).zoom == Some(node) {
                    tree.node_mut(parent).zoom = None;
                }
            }
            if let Some(prev) = tree.fullscreen_zoom() {
                if let Some(w) = tree.window_at(prev) {
                    self.server.set_window_frame(w, tree.node(prev).region);
                }
            }
            tree.set_fullscreen_zoom(Some(node));
            let root_region = tree.node(tree.root()).region;
            self.server.set_window_frame(window, root_region);
        }
        Ok(())
    }

    fn toggle_window_parent_zoom(&mut self) -> Result<()> {
        let space = self.active_space()?;
        if space.kind != SpaceKind::User {
            return Ok(());
        }
        let mut vs = self.spaces.acquire(space.id);
        if vs.mode != SpaceMode::Bsp {
            return Ok(());
        }
        let Some(window) = self.server.focused_window() else {
            return Ok(());
        };
        let Some(tree) = vs.bsp_mut() else {
            return Ok(());
        };
        let Some(node) = tree.find_window(window) else {
            return Ok(());
        };
        let Some(parent) = tree.node(node).parent else {
            return Ok(());
        };

        if tree.node(parent).zoom == Some(node) {
            tree.node_mut(parent).zoom = None;
            self.server.set_window_frame(window, tree.node(node).region);
        } else {
            if tree.fullscreen_zoom() == Some(node) {
                tree.set_fullscreen_zoom(None);
            }
            if let Some(prev) = tree.node(parent).zoom {
                if let Some(w) = tree.window_at(prev) {
                    self.server.set_window_frame(w, tree.node(prev).region);
                }
            }
            tree.node_mut(parent).zoom = Some(node);
            self.server.set_window_frame(window, tree.node(parent).region);
        }
        Ok(())
    }

    fn toggle_window_split_mode(&mut self) -> Result<()> {
        let space = self.active_space()?;
        if space.kind != SpaceKind::User {
            return Ok(());
        }
        let mut vs = self.spaces.acquire(space.id);
        if vs.mode != SpaceMode::Bsp {
            return Ok(());
        }
        let Some(window) = self.cvars.bsp_insertion_point else {
            return Ok(());
        };
        let gap = vs.gap();
        let Some(tree) = vs.bsp_mut() else {
            return Ok(());
        };
        let Some(node) = tree.find_window(window) else {
            return Ok(());
        };
        let Some(parent) = tree.node(node).parent else {
            return Ok(());
        };
        tree.toggle_split(parent);
        tree.compute_regions_below(parent, gap);
        let frames = tree.frames_below(parent);
        self.apply_frames(&frames);
        Ok(())
    }

    // ---- tree transforms ------------------------------------------------

    pub fn adjust_window_ratio(&mut self, op: &str) -> Result<()> {
        let Ok(sel) = op.parse::<Selector>() else {
            warn!("unknown ratio direction '{op}'");
            return Ok(());
        };
        let Some(window) = self.insertion_window() else {
            return Ok(());
        };
        let space = self.active_space()?;
        if space.kind != SpaceKind::User {
            return Ok(());
        }
        let mut vs = self.spaces.acquire(space.id);
        if vs.mode != SpaceMode::Bsp {
            return Ok(());
        }
        let gap = vs.gap();
        let Some(tree) = vs.bsp() else {
            return Ok(());
        };
        if tree.is_leaf(tree.root()) {
            return Ok(());
        }
        let Some(node) = tree.find_window(window) else {
            return Ok(());
        };
        let Some(target) = self.bsp_neighbor(space.id, tree, node, sel, false) else {
            return Ok(());
        };
        let target_node = tree
            .find_window(target)
            .ok_or(Error::Invariant("neighbor window missing from tree"))?;
        let Some(ancestor) = tree.lowest_common_ancestor(node, target_node) else {
            return Ok(());
        };

        let mut step = self.cvars.bsp_split_ratio;
        let in_first_subtree =
            tree.node(ancestor).left.is_some_and(|left| tree.is_descendant(left, node));
        if !in_first_subtree {
            step = -step;
        }
        let Some(ratio) = tree.ratio_of(ancestor) else {
            return Ok(());
        };
        let ratio = ratio + step;
        if (0.1..=0.9).contains(&ratio) {
            let Some(tree) = vs.bsp_mut() else {
                return Ok(());
            };
            tree.set_ratio(ancestor, ratio);
            tree.compute_regions_below(ancestor, gap);
            let frames = tree.frames_below(ancestor);
            self.apply_frames(&frames);
        }
        Ok(())
    }

    pub fn rotate_window_tree(&mut self, op: &str) -> Result<()> {
        let Ok(rotation) = op.parse::<Rotation>() else {
            warn!("unknown rotation '{op}'");
            return Ok(());
        };
        self.transform_tree(|tree| tree.rotate(rotation))
    }

    pub fn mirror_window_tree(&mut self, op: &str) -> Result<()> {
        let Ok(axis) = ops::parse_mirror_axis(op) else {
            warn!("unknown mirror axis '{op}'");
            return Ok(());
        };
        self.transform_tree(|tree| tree.mirror(axis))
    }

    pub fn equalize_window_tree(&mut self) -> Result<()> {
        self.transform_tree(|tree| tree.equalize())
    }

    fn transform_tree(&mut self, transform: impl FnOnce(&mut BspTree)) -> Result<()> {
        let space = self.active_space()?;
        if space.kind != SpaceKind::User {
            return Ok(());
        }
        let mut vs = self.spaces.acquire(space.id);
        if vs.mode != SpaceMode::Bsp || vs.tree.is_none() {
            return Ok(());
        }
        let gap = vs.gap();
        if let Some(tree) = vs.bsp_mut() {
            transform(tree);
            tree.compute_regions_below(tree.root(), gap);
            let frames = tree.window_frames();
            self.apply_frames(&frames);
        }
        Ok(())
    }

    // ---- preselect ------------------------------------------------------

    pub fn use_insertion_point(&mut self, op: &str) -> Result<()> {
        let Ok(op) = op.parse::<PreselectOp>() else {
            warn!("unknown preselect direction '{op}'");
            return Ok(());
        };
        let Some(window) = self.server.focused_window() else {
            return Ok(());
        };
        let space = self.active_space()?;
        if space.kind != SpaceKind::User {
            return Ok(());
        }
        let mut vs = self.spaces.acquire(space.id);
        if vs.mode != SpaceMode::Bsp {
            return Ok(());
        }
        let ratio = self.cvars.bsp_split_ratio;
        let border_width = self.cvars.preselect_border_width;
        let border_color = self.cvars.preselect_border_color;
        let Some(tree) = vs.bsp_mut() else {
            return Ok(());
        };
        let Some(node) = tree.find_window(window) else {
            return Ok(());
        };

        if let Some(existing) = tree.take_preselect(node) {
            if let Some(hint) = existing.hint {
                self.server.destroy_hint_window(hint);
            }
            // Re-issuing the same direction toggles the record off.
            if PreselectOp::Dir(existing.direction) == op {
                return Ok(());
            }
        }
        let PreselectOp::Dir(dir) = op else {
            return Ok(());
        };

        let mut presel = Preselect::new(dir, ratio, tree.node(node).region);
        presel.hint = self.server.create_hint_window(presel.region, border_width, border_color);
        tree.set_preselect(node, presel);
        Ok(())
    }

    // ---- space-level commands -------------------------------------------

    pub fn adjust_space_padding(&mut self, op: &str) -> Result<()> {
        let Ok(step) = op.parse::<ops::StepOp>() else {
            warn!("unknown padding adjustment '{op}'");
            return Ok(());
        };
        let space = self.active_space()?;
        if space.kind != SpaceKind::User {
            return Ok(());
        }
        let mut vs = self.spaces.acquire(space.id);
        if vs.mode == SpaceMode::Float {
            return Ok(());
        }
        let delta = match step {
            ops::StepOp::Inc => self.cvars.padding_step_size,
            ops::StepOp::Dec => -self.cvars.padding_step_size,
        };
        let o = vs.offset;
        let (top, bottom, left, right) =
            (o.top + delta, o.bottom + delta, o.left + delta, o.right + delta);
        if top >= 0.0 && bottom >= 0.0 && left >= 0.0 && right >= 0.0 {
            vs.offset.top = top;
            vs.offset.bottom = bottom;
            vs.offset.left = left;
            vs.offset.right = right;
        }
        self.refresh_space_layout(space.id, &mut vs);
        Ok(())
    }

    pub fn adjust_space_gap(&mut self, op: &str) -> Result<()> {
        let Ok(step) = op.parse::<ops::StepOp>() else {
            warn!("unknown gap adjustment '{op}'");
            return Ok(());
        };
        let space = self.active_space()?;
        if space.kind != SpaceKind::User {
            return Ok(());
        }
        let mut vs = self.spaces.acquire(space.id);
        if vs.mode == SpaceMode::Float {
            return Ok(());
        }
        let delta = match step {
            ops::StepOp::Inc => self.cvars.gap_step_size,
            ops::StepOp::Dec => -self.cvars.gap_step_size,
        };
        let gap = vs.offset.gap + delta;
        if gap >= 0.0 {
            vs.offset.gap = gap;
        }
        self.refresh_space_layout(space.id, &mut vs);
        Ok(())
    }

    pub fn toggle_space(&mut self, op: &str) -> Result<()> {
        if op != "offset" {
            warn!("unknown space toggle '{op}'");
            return Ok(());
        }
        let space = self.active_space()?;
        if space.kind != SpaceKind::User {
            return Ok(());
        }
        let mut vs = self.spaces.acquire(space.id);
        if vs.mode == SpaceMode::Float {
            return Ok(());
        }
        vs.toggle_offset();
        self.refresh_space_layout(space.id, &mut vs);
        Ok(())
    }

    pub fn activate_space_layout(&mut self, op: &str) -> Result<()> {
        let Ok(mode) = op.parse::<SpaceMode>() else {
            warn!("unknown layout '{op}'");
            return Ok(());
        };
        let space = self.active_space()?;
        if space.kind != SpaceKind::User {
            return Ok(());
        }
        let mut vs = self.spaces.acquire(space.id);
        if vs.mode == mode {
            return Ok(());
        }
        self.free_tree(&mut vs);
        vs.mode = mode;
        match mode {
            SpaceMode::Float => {}
            SpaceMode::Monocle => self.create_window_tree_for_space(space.id, &mut vs),
            SpaceMode::Bsp => {
                let pending = self
                    .server
                    .desktop_for_space(space.id)
                    .and_then(|desktop| self.cvars.tree_file_for_desktop(desktop.id))
                    .and_then(|path| std::fs::read_to_string(path).ok())
                    .and_then(|text| SerializedNode::from_text(&text).ok());
                match pending {
                    Some(shape) => {
                        self.create_deserialized_tree_for_space(space.id, &mut vs, &shape)
                    }
                    None => self.create_window_tree_for_space(space.id, &mut vs),
                }
            }
        }
        Ok(())
    }

    // ---- (de)serialization ----------------------------------------------

    pub fn serialize_desktop(&mut self, path: &str) -> Result<()> {
        let space = self.active_space()?;
        if space.kind != SpaceKind::User {
            return Ok(());
        }
        let vs = self.spaces.acquire(space.id);
        if vs.mode != SpaceMode::Bsp {
            return Ok(());
        }
        let Some(tree) = vs.bsp() else {
            return Ok(());
        };
        let shape = tree.to_serialized();
        match shape.to_text() {
            Ok(text) => {
                if let Err(err) = std::fs::write(path, text) {
                    tracing::error!("failed to open '{path}' for writing: {err}");
                }
            }
            Err(err) => tracing::error!("failed to serialize layout tree: {err}"),
        }
        Ok(())
    }

    pub fn deserialize_desktop(&mut self, path: &str) -> Result<()> {
        let space = self.active_space()?;
        if space.kind != SpaceKind::User {
            return Ok(());
        }
        let mut vs = self.spaces.acquire(space.id);
        if vs.mode != SpaceMode::Bsp {
            return Ok(());
        }
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                tracing::error!("failed to open '{path}' for reading: {err}");
                return Ok(());
            }
        };
        let shape = match SerializedNode::from_text(&text) {
            Ok(shape) => shape,
            Err(err) => {
                tracing::error!("failed to parse layout from '{path}': {err}");
                return Ok(());
            }
        };
        self.free_tree(&mut vs);
        self.create_deserialized_tree_for_space(space.id, &mut vs, &shape);
        Ok(())
    }

    // ---- grid (float windows) -------------------------------------------

    pub fn grid_layout(&mut self, op: &str) -> Result<()> {
        let Ok(grid) = op.parse::<ops::GridOp>() else {
            warn!("invalid grid operand '{op}'");
            return Ok(());
        };
        if grid.rows == 0 || grid.cols == 0 {
            warn!("grid dimensions must be non-zero");
            return Ok(());
        }
        let Some(window) = self.server.focused_window() else {
            return Ok(());
        };
        let Some(info) = self.server.window_info(window) else {
            return Ok(());
        };
        let Some(display) = self.server.display_for_rect(info.frame) else {
            return Ok(());
        };
        let space = self
            .server
            .active_space_on_display(&display)
            .ok_or(Error::Invariant("display without an active workspace"))?;
        let vs = self.spaces.acquire(space.id);
        if !info.flags.float && vs.mode != SpaceMode::Float {
            return Ok(());
        }
        drop(vs);

        let region = self.server.usable_display_bounds(&display);
        let x = grid.x.min(grid.cols - 1);
        let y = grid.y.min(grid.rows - 1);
        let width = grid.width.max(1).min(grid.cols - x);
        let height = grid.height.max(1).min(grid.rows - y);

        let cell_width = region.size.width / f64::from(grid.cols);
        let cell_height = region.size.height / f64::from(grid.rows);
        let frame = Rect::new(
            region.max_x() - cell_width * f64::from(grid.cols - x),
            region.max_y() - cell_height * f64::from(grid.rows - y),
            cell_width * f64::from(width),
            cell_height * f64::from(height),
        );
        self.server.set_window_frame(window, frame);
        Ok(())
    }

    // ---- misc -----------------------------------------------------------

    /// Overwrite the configured split ratio, affecting subsequent splits and
    /// preselects.
    pub fn set_split_ratio(&mut self, op: &str) {
        match op.parse::<f32>() {
            Ok(ratio) if (0.1..=0.9).contains(&ratio) => self.cvars.bsp_split_ratio = ratio,
            _ => warn!("invalid split ratio '{op}'"),
        }
    }

    pub fn close_focused_window(&mut self) {
        if let Some(window) = self.server.focused_window() {
            self.server.close_window(window);
        }
    }
}

fn monocle_wrap_neighbor(list: &MonocleList, window: WindowId, sel: Selector) -> Option<WindowId> {
    match sel {
        Selector::Dir(CardinalDir::West) | Selector::Ordered(Ordered::Prev) => {
            list.prev_of(window).or_else(|| list.last())
        }
        Selector::Dir(CardinalDir::East) | Selector::Ordered(Ordered::Next) => {
            list.next_of(window).or_else(|| list.first())
        }
        _ => None,
    }
}

fn terminal_leaf_action(vs: &VirtualSpace, sel: Selector) -> FocusAction {
    let target = match &vs.tree {
        Some(LayoutTree::Bsp(tree)) => match sel {
            Selector::Ordered(Ordered::Prev)
            | Selector::Dir(CardinalDir::West)
            | Selector::Dir(CardinalDir::North) => tree.window_at(tree.last_leaf()),
            Selector::Ordered(Ordered::Next)
            | Selector::Dir(CardinalDir::East)
            | Selector::Dir(CardinalDir::South) => tree.window_at(tree.first_leaf()),
            Selector::Ordered(Ordered::Biggest) => None,
        },
        Some(LayoutTree::Monocle(list)) => match sel {
            Selector::Ordered(Ordered::Prev)
            | Selector::Dir(CardinalDir::West)
            | Selector::Dir(CardinalDir::North) => list.last(),
            Selector::Ordered(Ordered::Next)
            | Selector::Dir(CardinalDir::East)
            | Selector::Dir(CardinalDir::South) => list.first(),
            Selector::Ordered(Ordered::Biggest) => None,
        },
        None => None,
    };
    target.map_or(FocusAction::None, FocusAction::Focus)
}
