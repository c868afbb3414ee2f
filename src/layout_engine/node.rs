use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};

use crate::layout_engine::presel::Preselect;
use crate::layout_engine::serialize::SerializedNode;
use crate::sys::geometry::Rect;
use crate::sys::window_server::WindowId;

new_key_type! {
    pub struct NodeId;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitKind {
    /// A horizontal cut: the children are the top and bottom slices.
    Horizontal,
    /// A vertical cut: the children are the left and right slices.
    Vertical,
}

impl SplitKind {
    pub fn toggled(self) -> SplitKind {
        match self {
            SplitKind::Horizontal => SplitKind::Vertical,
            SplitKind::Vertical => SplitKind::Horizontal,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rotation {
    Deg90,
    Deg180,
    Deg270,
}

#[derive(Debug)]
pub enum NodeKind {
    Leaf {
        window: WindowId,
        preselect: Option<Preselect>,
    },
    Split {
        split: SplitKind,
        ratio: f32,
    },
}

#[derive(Debug)]
pub struct Node {
    pub parent: Option<NodeId>,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
    /// Zoom slot: on the root this marks the fullscreen-zoomed leaf, on any
    /// internal node the parent-zoomed leaf. Weak: cleared whenever the
    /// referenced node leaves the tree.
    pub zoom: Option<NodeId>,
    pub region: Rect,
    pub kind: NodeKind,
}

/// Outcome of removing a window's leaf from the tree.
#[derive(Debug)]
pub enum Removal {
    NotFound,
    /// The removed leaf was the root; the caller drops the tree. Carries the
    /// leaf's preselect so its hint window can be released.
    TreeEmpty { preselect: Option<Preselect> },
    /// The sibling subtree was promoted into the parent slot; regions below
    /// the returned node need recomputation.
    Promoted {
        node: NodeId,
        preselect: Option<Preselect>,
    },
}

/// A recursive binary space partition over one workspace. Nodes live in a
/// slotmap arena; parent links are plain keys, so stale references can never
/// extend a node's lifetime.
#[derive(Debug)]
pub struct BspTree {
    nodes: SlotMap<NodeId, Node>,
    root: NodeId,
}

impl BspTree {
    pub fn new(window: WindowId, region: Rect) -> BspTree {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node {
            parent: None,
            left: None,
            right: None,
            zoom: None,
            region,
            kind: NodeKind::Leaf { window, preselect: None },
        });
        BspTree { nodes, root }
    }

    pub fn root(&self) -> NodeId { self.root }

    pub fn node(&self, id: NodeId) -> &Node { &self.nodes[id] }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node { &mut self.nodes[id] }

    pub fn contains(&self, id: NodeId) -> bool { self.nodes.contains_key(id) }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        matches!(self.nodes[id].kind, NodeKind::Leaf { .. })
    }

    pub fn window_at(&self, id: NodeId) -> Option<WindowId> {
        match self.nodes[id].kind {
            NodeKind::Leaf { window, .. } => Some(window),
            NodeKind::Split { .. } => None,
        }
    }

    pub fn find_window(&self, window: WindowId) -> Option<NodeId> {
        self.leaves().into_iter().find(|&id| self.window_at(id) == Some(window))
    }

    /// Leaves in in-order traversal order.
    pub fn leaves(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_leaves(self.root, &mut out);
        out
    }

    pub fn leaves_below(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_leaves(node, &mut out);
        out
    }

    fn collect_leaves(&self, node: NodeId, out: &mut Vec<NodeId>) {
        match self.nodes[node].kind {
            NodeKind::Leaf { .. } => out.push(node),
            NodeKind::Split { .. } => {
                if let Some(left) = self.nodes[node].left {
                    self.collect_leaves(left, out);
                }
                if let Some(right) = self.nodes[node].right {
                    self.collect_leaves(right, out);
                }
            }
        }
    }

    pub fn windows(&self) -> Vec<WindowId> {
        self.leaves().into_iter().filter_map(|id| self.window_at(id)).collect()
    }

    pub fn len(&self) -> usize { self.leaves().len() }

    pub fn first_leaf(&self) -> NodeId { self.first_leaf_below(self.root) }

    pub fn last_leaf(&self) -> NodeId { self.last_leaf_below(self.root) }

    pub fn first_leaf_below(&self, node: NodeId) -> NodeId {
        let mut current = node;
        while let Some(left) = self.nodes[current].left {
            current = left;
        }
        current
    }

    pub fn last_leaf_below(&self, node: NodeId) -> NodeId {
        let mut current = node;
        while let Some(right) = self.nodes[current].right {
            current = right;
        }
        current
    }

    /// In-order successor among leaves.
    pub fn next_leaf(&self, node: NodeId) -> Option<NodeId> {
        let mut current = node;
        loop {
            let parent = self.nodes[current].parent?;
            if self.nodes[parent].left == Some(current) {
                let right = self.nodes[parent].right?;
                return Some(self.first_leaf_below(right));
            }
            current = parent;
        }
    }

    /// In-order predecessor among leaves.
    pub fn prev_leaf(&self, node: NodeId) -> Option<NodeId> {
        let mut current = node;
        loop {
            let parent = self.nodes[current].parent?;
            if self.nodes[parent].right == Some(current) {
                let left = self.nodes[parent].left?;
                return Some(self.last_leaf_below(left));
            }
            current = parent;
        }
    }

    pub fn biggest_leaf(&self) -> Option<NodeId> {
        let mut best: Option<(NodeId, f64)> = None;
        for leaf in self.leaves() {
            let area = self.nodes[leaf].region.area();
            if best.map_or(true, |(_, a)| area > a) {
                best = Some((leaf, area));
            }
        }
        best.map(|(id, _)| id)
    }

    pub fn is_descendant(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes[id].parent;
        }
        false
    }

    pub fn lowest_common_ancestor(&self, a: NodeId, b: NodeId) -> Option<NodeId> {
        let mut path = Vec::new();
        let mut current = Some(a);
        while let Some(id) = current {
            path.push(id);
            current = self.nodes[id].parent;
        }
        let mut current = Some(b);
        while let Some(id) = current {
            if path.contains(&id) {
                return Some(id);
            }
            current = self.nodes[id].parent;
        }
        None
    }

    /// Turn a leaf into a split holding its previous window and `window` as
    /// two fresh leaves. Returns the new window's leaf. Any preselect on the
    /// old leaf must be taken by the caller first.
    pub fn split_leaf(
        &mut self,
        leaf: NodeId,
        window: WindowId,
        split: SplitKind,
        ratio: f32,
        spawn_left: bool,
    ) -> NodeId {
        let NodeKind::Leaf { window: existing, .. } = self.nodes[leaf].kind else {
            return leaf;
        };
        let region = self.nodes[leaf].region;

        let old_leaf = self.nodes.insert(Node {
            parent: Some(leaf),
            left: None,
            right: None,
            zoom: None,
            region,
            kind: NodeKind::Leaf { window: existing, preselect: None },
        });
        let new_leaf = self.nodes.insert(Node {
            parent: Some(leaf),
            left: None,
            right: None,
            zoom: None,
            region,
            kind: NodeKind::Leaf { window, preselect: None },
        });

        let (left, right) = if spawn_left { (new_leaf, old_leaf) } else { (old_leaf, new_leaf) };
        let node = &mut self.nodes[leaf];
        node.kind = NodeKind::Split { split, ratio };
        node.left = Some(left);
        node.right = Some(right);
        new_leaf
    }

    /// Remove a window's leaf. The sibling subtree takes over the parent's
    /// slot and region; any zoom slot that pointed into the removed nodes is
    /// cleared.
    pub fn remove_window(&mut self, window: WindowId) -> Removal {
        let Some(leaf) = self.find_window(window) else {
            return Removal::NotFound;
        };
        let preselect = self.take_preselect(leaf);

        let Some(parent) = self.nodes[leaf].parent else {
            return Removal::TreeEmpty { preselect };
        };

        let sibling = if self.nodes[parent].left == Some(leaf) {
            self.nodes[parent].right
        } else {
            self.nodes[parent].left
        };
        let Some(sibling) = sibling else {
            return Removal::TreeEmpty { preselect };
        };

        let moved = self.nodes.remove(sibling).map(|node| (node.kind, node.left, node.right, node.zoom));
        if let Some((kind, left, right, zoom)) = moved {
            let p = &mut self.nodes[parent];
            p.kind = kind;
            p.left = left;
            p.right = right;
            p.zoom = zoom;
            for child in [left, right].into_iter().flatten() {
                self.nodes[child].parent = Some(parent);
            }
        }
        self.nodes.remove(leaf);
        self.clear_dangling_zoom();

        Removal::Promoted { node: parent, preselect }
    }

    fn clear_dangling_zoom(&mut self) {
        let stale: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.zoom.is_some_and(|z| !self.nodes.contains_key(z)))
            .map(|(id, _)| id)
            .collect();
        for id in stale {
            self.nodes[id].zoom = None;
        }
    }

    pub fn preselect_of(&self, leaf: NodeId) -> Option<&Preselect> {
        match &self.nodes[leaf].kind {
            NodeKind::Leaf { preselect, .. } => preselect.as_ref(),
            NodeKind::Split { .. } => None,
        }
    }

    pub fn set_preselect(&mut self, leaf: NodeId, value: Preselect) {
        if let NodeKind::Leaf { preselect, .. } = &mut self.nodes[leaf].kind {
            *preselect = Some(value);
        }
    }

    pub fn take_preselect(&mut self, leaf: NodeId) -> Option<Preselect> {
        match &mut self.nodes[leaf].kind {
            NodeKind::Leaf { preselect, .. } => preselect.take(),
            NodeKind::Split { .. } => None,
        }
    }

    pub fn fullscreen_zoom(&self) -> Option<NodeId> { self.nodes[self.root].zoom }

    pub fn set_fullscreen_zoom(&mut self, zoom: Option<NodeId>) {
        let root = self.root;
        self.nodes[root].zoom = zoom;
    }

    pub fn ratio_of(&self, node: NodeId) -> Option<f32> {
        match self.nodes[node].kind {
            NodeKind::Split { ratio, .. } => Some(ratio),
            NodeKind::Leaf { .. } => None,
        }
    }

    pub fn set_ratio(&mut self, node: NodeId, ratio: f32) {
        if let NodeKind::Split { ratio: r, .. } = &mut self.nodes[node].kind {
            *r = ratio;
        }
    }

    pub fn split_of(&self, node: NodeId) -> Option<SplitKind> {
        match self.nodes[node].kind {
            NodeKind::Split { split, .. } => Some(split),
            NodeKind::Leaf { .. } => None,
        }
    }

    pub fn toggle_split(&mut self, node: NodeId) {
        if let NodeKind::Split { split, .. } = &mut self.nodes[node].kind {
            *split = split.toggled();
        }
    }

    pub fn equalize(&mut self) {
        let ids: Vec<NodeId> = self.nodes.keys().collect();
        for id in ids {
            if let NodeKind::Split { ratio, .. } = &mut self.nodes[id].kind {
                *ratio = 0.5;
            }
        }
    }

    pub fn rotate(&mut self, rotation: Rotation) { self.rotate_below(self.root, rotation); }

    fn rotate_below(&mut self, node: NodeId, rotation: Rotation) {
        if let NodeKind::Split { split, ratio } = self.nodes[node].kind {
            let swap = match rotation {
                Rotation::Deg90 => split == SplitKind::Vertical,
                Rotation::Deg270 => split == SplitKind::Horizontal,
                Rotation::Deg180 => true,
            };
            if swap {
                let n = &mut self.nodes[node];
                std::mem::swap(&mut n.left, &mut n.right);
                n.kind = NodeKind::Split { split, ratio: 1.0 - ratio };
            }
            if rotation != Rotation::Deg180 {
                self.toggle_split(node);
            }
            if let Some(left) = self.nodes[node].left {
                self.rotate_below(left, rotation);
            }
            if let Some(right) = self.nodes[node].right {
                self.rotate_below(right, rotation);
            }
        }
    }

    /// Swap the children of every split along `axis`.
    pub fn mirror(&mut self, axis: SplitKind) {
        let ids: Vec<NodeId> = self.nodes.keys().collect();
        for id in ids {
            if self.split_of(id) == Some(axis) {
                let n = &mut self.nodes[id];
                std::mem::swap(&mut n.left, &mut n.right);
            }
        }
    }

    pub fn swap_windows(&mut self, a: NodeId, b: NodeId) {
        if a == b {
            return;
        }
        let wa = self.window_at(a);
        let wb = self.window_at(b);
        if let (Some(wa), Some(wb)) = (wa, wb) {
            if let NodeKind::Leaf { window, .. } = &mut self.nodes[a].kind {
                *window = wb;
            }
            if let NodeKind::Leaf { window, .. } = &mut self.nodes[b].kind {
                *window = wa;
            }
        }
    }

    /// Recompute every cached region from a fresh root region.
    pub fn compute_regions(&mut self, region: Rect, gap: f64) {
        let root = self.root;
        self.nodes[root].region = region;
        self.compute_regions_below(root, gap);
    }

    /// Recompute the subtree below `node` from its current cached region.
    pub fn compute_regions_below(&mut self, node: NodeId, gap: f64) {
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            let NodeKind::Split { split, ratio } = self.nodes[id].kind else {
                continue;
            };
            let (first, second) = split_region(self.nodes[id].region, split, ratio, gap);
            if let Some(left) = self.nodes[id].left {
                self.nodes[left].region = first;
                stack.push(left);
            }
            if let Some(right) = self.nodes[id].right {
                self.nodes[right].region = second;
                stack.push(right);
            }
        }
    }

    /// Frames to push to the host, zoom overlays applied: a fullscreen-zoomed
    /// leaf renders at the root region, a parent-zoomed leaf at its parent's
    /// region, everything else at its own.
    pub fn window_frames(&self) -> Vec<(WindowId, Rect)> { self.frames_below(self.root) }

    pub fn frames_below(&self, node: NodeId) -> Vec<(WindowId, Rect)> {
        let root_zoom = self.nodes[self.root].zoom;
        let root_region = self.nodes[self.root].region;
        self.leaves_below(node)
            .into_iter()
            .filter_map(|leaf| {
                let window = self.window_at(leaf)?;
                let frame = if root_zoom == Some(leaf) {
                    root_region
                } else if let Some(parent) = self.nodes[leaf].parent {
                    if self.nodes[parent].zoom == Some(leaf) {
                        self.nodes[parent].region
                    } else {
                        self.nodes[leaf].region
                    }
                } else {
                    self.nodes[leaf].region
                };
                Some((window, frame))
            })
            .collect()
    }

    /// Rebuild a tree from a serialized shape, binding `windows` to leaves in
    /// in-order traversal order. `windows` must match the shape's leaf count.
    pub fn from_serialized(shape: &SerializedNode, windows: &[WindowId], region: Rect) -> Option<BspTree> {
        if windows.len() != shape.leaf_count() || windows.is_empty() {
            return None;
        }
        let mut nodes: SlotMap<NodeId, Node> = SlotMap::with_key();
        let mut next = 0usize;
        let root = build_node(&mut nodes, shape, windows, &mut next, None, region);
        Some(BspTree { nodes, root })
    }

    pub fn to_serialized(&self) -> SerializedNode { self.serialize_below(self.root) }

    fn serialize_below(&self, node: NodeId) -> SerializedNode {
        match self.nodes[node].kind {
            NodeKind::Leaf { .. } => SerializedNode::Leaf,
            NodeKind::Split { split, ratio } => {
                let left = self.nodes[node].left.map(|n| self.serialize_below(n));
                let right = self.nodes[node].right.map(|n| self.serialize_below(n));
                SerializedNode::Split {
                    split,
                    ratio,
                    left: Box::new(left.unwrap_or(SerializedNode::Leaf)),
                    right: Box::new(right.unwrap_or(SerializedNode::Leaf)),
                }
            }
        }
    }
}

fn build_node(
    nodes: &mut SlotMap<NodeId, Node>,
    shape: &SerializedNode,
    windows: &[WindowId],
    next: &mut usize,
    parent: Option<NodeId>,
    region: Rect,
) -> NodeId {
    match shape {
        SerializedNode::Leaf => {
            let window = windows[*next];
            *next += 1;
            nodes.insert(Node {
                parent,
                left: None,
                right: None,
                zoom: None,
                region,
                kind: NodeKind::Leaf { window, preselect: None },
            })
        }
        SerializedNode::Split { split, ratio, left, right } => {
            let ratio = ratio.clamp(0.1, 0.9);
            let id = nodes.insert(Node {
                parent,
                left: None,
                right: None,
                zoom: None,
                region,
                kind: NodeKind::Split { split: *split, ratio },
            });
            let l = build_node(nodes, left, windows, next, Some(id), region);
            let r = build_node(nodes, right, windows, next, Some(id), region);
            nodes[id].left = Some(l);
            nodes[id].right = Some(r);
            id
        }
    }
}

fn split_region(region: Rect, split: SplitKind, ratio: f32, gap: f64) -> (Rect, Rect) {
    match split {
        SplitKind::Vertical => {
            let first = (region.size.width * ratio as f64 - gap / 2.0).max(0.0);
            let second = (region.size.width - first - gap).max(0.0);
            (
                Rect::new(region.origin.x, region.origin.y, first, region.size.height),
                Rect::new(
                    region.origin.x + first + gap,
                    region.origin.y,
                    second,
                    region.size.height,
                ),
            )
        }
        SplitKind::Horizontal => {
            let first = (region.size.height * ratio as f64 - gap / 2.0).max(0.0);
            let second = (region.size.height - first - gap).max(0.0);
            (
                Rect::new(region.origin.x, region.origin.y, region.size.width, first),
                Rect::new(
                    region.origin.x,
                    region.origin.y + first + gap,
                    region.size.width,
                    second,
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(id: u32) -> WindowId { WindowId::new(id) }

    fn region() -> Rect { Rect::new(0.0, 0.0, 1280.0, 720.0) }

    fn three_leaf_tree() -> BspTree {
        // [1, [2, 3]]: vertical root, horizontal right child.
        let mut tree = BspTree::new(w(1), region());
        let root_leaf = tree.find_window(w(1)).unwrap();
        let second = tree.split_leaf(root_leaf, w(2), SplitKind::Vertical, 0.5, false);
        tree.split_leaf(second, w(3), SplitKind::Horizontal, 0.5, false);
        tree.compute_regions(region(), 0.0);
        tree
    }

    #[test]
    fn in_order_leaves_follow_insertion() {
        let tree = three_leaf_tree();
        assert_eq!(tree.windows(), vec![w(1), w(2), w(3)]);
    }

    #[test]
    fn next_and_prev_walk_in_order() {
        let tree = three_leaf_tree();
        let first = tree.first_leaf();
        let second = tree.next_leaf(first).unwrap();
        let third = tree.next_leaf(second).unwrap();
        assert_eq!(tree.window_at(first), Some(w(1)));
        assert_eq!(tree.window_at(second), Some(w(2)));
        assert_eq!(tree.window_at(third), Some(w(3)));
        assert_eq!(tree.next_leaf(third), None);
        assert_eq!(tree.prev_leaf(third), Some(second));
        assert_eq!(tree.prev_leaf(first), None);
        assert_eq!(tree.last_leaf(), third);
    }

    #[test]
    fn regions_tile_the_root_exactly() {
        let tree = three_leaf_tree();
        let leaves = tree.leaves();
        let areas: f64 = leaves.iter().map(|&l| tree.node(l).region.area()).sum();
        assert_eq!(areas, region().area());

        let left = tree.node(leaves[0]).region;
        assert_eq!(left, Rect::new(0.0, 0.0, 640.0, 720.0));
        let top_right = tree.node(leaves[1]).region;
        assert_eq!(top_right, Rect::new(640.0, 0.0, 640.0, 360.0));
        let bottom_right = tree.node(leaves[2]).region;
        assert_eq!(bottom_right, Rect::new(640.0, 360.0, 640.0, 360.0));
    }

    #[test]
    fn gap_is_split_between_siblings() {
        let mut tree = BspTree::new(w(1), region());
        let leaf = tree.find_window(w(1)).unwrap();
        tree.split_leaf(leaf, w(2), SplitKind::Vertical, 0.5, false);
        tree.compute_regions(region(), 10.0);
        let leaves = tree.leaves();
        let a = tree.node(leaves[0]).region;
        let b = tree.node(leaves[1]).region;
        assert_eq!(a.size.width, 635.0);
        assert_eq!(b.origin.x, 645.0);
        assert_eq!(b.size.width, 635.0);
    }

    #[test]
    fn biggest_leaf_prefers_area() {
        let mut tree = BspTree::new(w(1), region());
        let leaf = tree.find_window(w(1)).unwrap();
        tree.split_leaf(leaf, w(2), SplitKind::Vertical, 0.7, false);
        tree.compute_regions(region(), 0.0);
        let biggest = tree.biggest_leaf().unwrap();
        assert_eq!(tree.window_at(biggest), Some(w(1)));
    }

    #[test]
    fn removing_a_leaf_promotes_the_sibling_subtree() {
        let mut tree = three_leaf_tree();
        match tree.remove_window(w(1)) {
            Removal::Promoted { node, .. } => {
                tree.compute_regions_below(node, 0.0);
            }
            other => panic!("unexpected removal outcome: {other:?}"),
        }
        assert_eq!(tree.windows(), vec![w(2), w(3)]);
        // The promoted split takes over the whole root region.
        assert_eq!(tree.node(tree.root()).region, region());
        assert_eq!(tree.split_of(tree.root()), Some(SplitKind::Horizontal));
    }

    #[test]
    fn removing_the_last_window_empties_the_tree() {
        let mut tree = BspTree::new(w(1), region());
        assert!(matches!(tree.remove_window(w(1)), Removal::TreeEmpty { .. }));
    }

    #[test]
    fn removal_clears_zoom_into_the_removed_subtree() {
        let mut tree = three_leaf_tree();
        let leaf = tree.find_window(w(3)).unwrap();
        tree.set_fullscreen_zoom(Some(leaf));
        match tree.remove_window(w(3)) {
            Removal::Promoted { .. } => {}
            other => panic!("unexpected removal outcome: {other:?}"),
        }
        assert_eq!(tree.fullscreen_zoom(), None);
    }

    #[test]
    fn lca_of_cousins_is_the_shared_ancestor() {
        let tree = three_leaf_tree();
        let a = tree.find_window(w(1)).unwrap();
        let c = tree.find_window(w(3)).unwrap();
        assert_eq!(tree.lowest_common_ancestor(a, c), Some(tree.root()));

        let b = tree.find_window(w(2)).unwrap();
        let right = tree.node(tree.root()).right.unwrap();
        assert_eq!(tree.lowest_common_ancestor(b, c), Some(right));
    }

    #[test]
    fn rotate_90_four_times_is_identity() {
        let mut tree = three_leaf_tree();
        let before = tree.to_serialized();
        for _ in 0..4 {
            tree.rotate(Rotation::Deg90);
        }
        assert_eq!(tree.to_serialized(), before);
        assert_eq!(tree.windows(), vec![w(1), w(2), w(3)]);
    }

    #[test]
    fn rotate_180_twice_is_identity() {
        let mut tree = three_leaf_tree();
        let before = tree.to_serialized();
        let windows_before = tree.windows();
        tree.rotate(Rotation::Deg180);
        assert_eq!(tree.windows(), vec![w(3), w(2), w(1)]);
        tree.rotate(Rotation::Deg180);
        assert_eq!(tree.to_serialized(), before);
        assert_eq!(tree.windows(), windows_before);
    }

    #[test]
    fn mirror_twice_is_identity() {
        let mut tree = three_leaf_tree();
        let before = tree.windows();
        tree.mirror(SplitKind::Vertical);
        assert_ne!(tree.windows(), before);
        tree.mirror(SplitKind::Vertical);
        assert_eq!(tree.windows(), before);
    }

    #[test]
    fn mirror_only_touches_matching_axis() {
        let mut tree = three_leaf_tree();
        // Horizontal mirror swaps only the right child's leaves.
        tree.mirror(SplitKind::Horizontal);
        assert_eq!(tree.windows(), vec![w(1), w(3), w(2)]);
    }

    #[test]
    fn equalize_resets_every_ratio() {
        let mut tree = three_leaf_tree();
        tree.set_ratio(tree.root(), 0.8);
        tree.equalize();
        assert_eq!(tree.ratio_of(tree.root()), Some(0.5));
    }

    #[test]
    fn zoomed_leaf_renders_at_root_region() {
        let mut tree = three_leaf_tree();
        let b = tree.find_window(w(2)).unwrap();
        tree.set_fullscreen_zoom(Some(b));
        let frames = tree.window_frames();
        let b_frame = frames.iter().find(|(win, _)| *win == w(2)).unwrap().1;
        assert_eq!(b_frame, region());
        // Other leaves keep their own regions.
        let a_frame = frames.iter().find(|(win, _)| *win == w(1)).unwrap().1;
        assert_eq!(a_frame, tree.node(tree.find_window(w(1)).unwrap()).region);
    }

    #[test]
    fn parent_zoomed_leaf_renders_at_parent_region() {
        let mut tree = three_leaf_tree();
        let c = tree.find_window(w(3)).unwrap();
        let parent = tree.node(c).parent.unwrap();
        tree.node_mut(parent).zoom = Some(c);
        let frames = tree.window_frames();
        let c_frame = frames.iter().find(|(win, _)| *win == w(3)).unwrap().1;
        assert_eq!(c_frame, tree.node(parent).region);
    }

    #[test]
    fn serialized_round_trip_preserves_shape() {
        let tree = three_leaf_tree();
        let shape = tree.to_serialized();
        let rebuilt = BspTree::from_serialized(&shape, &[w(7), w(8), w(9)], region()).unwrap();
        assert_eq!(rebuilt.to_serialized(), shape);
        assert_eq!(rebuilt.windows(), vec![w(7), w(8), w(9)]);
    }
}
