//! Generative invariants for the BSP tree: arbitrary insert/remove sequences
//! must preserve leaf uniqueness, exact region coverage, and the algebra of
//! the whole-tree transforms.

use proptest::prelude::*;

use slate_wm::layout_engine::node::{BspTree, Rotation, SplitKind};
use slate_wm::layout_engine::serialize::SerializedNode;
use slate_wm::sys::geometry::Rect;
use slate_wm::sys::window_server::WindowId;

#[derive(Debug, Clone)]
enum Op {
    Insert {
        at: usize,
        vertical: bool,
        ratio_tenths: u8,
        spawn_left: bool,
    },
    Remove {
        at: usize,
    },
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (any::<usize>(), any::<bool>(), 1u8..=9, any::<bool>()).prop_map(
            |(at, vertical, ratio_tenths, spawn_left)| Op::Insert {
                at,
                vertical,
                ratio_tenths,
                spawn_left,
            }
        ),
        1 => any::<usize>().prop_map(|at| Op::Remove { at }),
    ]
}

fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(arb_op(), 0..40)
}

fn region() -> Rect {
    Rect::new(0.0, 0.0, 1280.0, 720.0)
}

fn build(ops: &[Op]) -> BspTree {
    let mut tree = BspTree::new(WindowId::new(1), region());
    let mut next_window = 2u32;
    for op in ops {
        match *op {
            Op::Insert { at, vertical, ratio_tenths, spawn_left } => {
                let leaves = tree.leaves();
                let leaf = leaves[at % leaves.len()];
                let split = if vertical { SplitKind::Vertical } else { SplitKind::Horizontal };
                tree.split_leaf(
                    leaf,
                    WindowId::new(next_window),
                    split,
                    f32::from(ratio_tenths) / 10.0,
                    spawn_left,
                );
                next_window += 1;
            }
            Op::Remove { at } => {
                let windows = tree.windows();
                if windows.len() > 1 {
                    tree.remove_window(windows[at % windows.len()]);
                }
            }
        }
    }
    tree.compute_regions(region(), 0.0);
    tree
}

/// Structural equality with a tolerance on ratios; flipping a ratio twice
/// (`1 - (1 - r)`) may drift by an ulp.
fn shapes_match(a: &SerializedNode, b: &SerializedNode) -> bool {
    match (a, b) {
        (SerializedNode::Leaf, SerializedNode::Leaf) => true,
        (
            SerializedNode::Split { split: sa, ratio: ra, left: la, right: rra },
            SerializedNode::Split { split: sb, ratio: rb, left: lb, right: rrb },
        ) => {
            sa == sb
                && (ra - rb).abs() < 1e-5
                && shapes_match(la, lb)
                && shapes_match(rra, rrb)
        }
        _ => false,
    }
}

fn ratios_in_bounds(shape: &SerializedNode) -> bool {
    match shape {
        SerializedNode::Leaf => true,
        SerializedNode::Split { ratio, left, right, .. } => {
            (0.1..=0.9).contains(ratio) && ratios_in_bounds(left) && ratios_in_bounds(right)
        }
    }
}

fn overlaps(a: Rect, b: Rect) -> bool {
    a.origin.x < b.max_x()
        && b.origin.x < a.max_x()
        && a.origin.y < b.max_y()
        && b.origin.y < a.max_y()
}

proptest! {
    #[test]
    fn leaf_windows_stay_unique(ops in arb_ops()) {
        let tree = build(&ops);
        let mut windows = tree.windows();
        let count = windows.len();
        windows.sort();
        windows.dedup();
        prop_assert_eq!(windows.len(), count);
    }

    #[test]
    fn ratios_stay_in_bounds(ops in arb_ops()) {
        let tree = build(&ops);
        prop_assert!(ratios_in_bounds(&tree.to_serialized()));
    }

    #[test]
    fn leaf_regions_tile_the_root(ops in arb_ops()) {
        let tree = build(&ops);
        let leaves = tree.leaves();

        let total: f64 = leaves.iter().map(|&l| tree.node(l).region.area()).sum();
        let root_area = region().area();
        prop_assert!((total - root_area).abs() < root_area * 1e-9);

        for (i, &a) in leaves.iter().enumerate() {
            for &b in &leaves[i + 1..] {
                prop_assert!(
                    !overlaps(tree.node(a).region, tree.node(b).region),
                    "leaf regions overlap",
                );
            }
        }
    }

    #[test]
    fn rotating_four_times_is_identity(ops in arb_ops()) {
        let mut tree = build(&ops);
        let before = tree.to_serialized();
        let windows = tree.windows();
        for _ in 0..4 {
            tree.rotate(Rotation::Deg90);
        }
        prop_assert!(shapes_match(&tree.to_serialized(), &before));
        prop_assert_eq!(tree.windows(), windows);
    }

    #[test]
    fn rotating_180_twice_is_identity(ops in arb_ops()) {
        let mut tree = build(&ops);
        let before = tree.to_serialized();
        let windows = tree.windows();
        tree.rotate(Rotation::Deg180);
        tree.rotate(Rotation::Deg180);
        prop_assert!(shapes_match(&tree.to_serialized(), &before));
        prop_assert_eq!(tree.windows(), windows);
    }

    #[test]
    fn mirroring_twice_is_identity(ops in arb_ops(), vertical in any::<bool>()) {
        let axis = if vertical { SplitKind::Vertical } else { SplitKind::Horizontal };
        let mut tree = build(&ops);
        let before = tree.to_serialized();
        let windows = tree.windows();
        tree.mirror(axis);
        tree.mirror(axis);
        prop_assert_eq!(tree.to_serialized(), before);
        prop_assert_eq!(tree.windows(), windows);
    }

    #[test]
    fn equalize_is_idempotent(ops in arb_ops()) {
        let mut tree = build(&ops);
        tree.equalize();
        let once = tree.to_serialized();
        tree.equalize();
        prop_assert_eq!(tree.to_serialized(), once);
    }

    #[test]
    fn serialization_round_trips(ops in arb_ops()) {
        let tree = build(&ops);
        let shape = tree.to_serialized();
        let text = shape.to_text().unwrap();
        let parsed = SerializedNode::from_text(&text).unwrap();
        prop_assert_eq!(&parsed, &shape);

        let windows = tree.windows();
        let rebuilt = BspTree::from_serialized(&parsed, &windows, region()).unwrap();
        prop_assert_eq!(rebuilt.to_serialized(), shape);
        prop_assert_eq!(rebuilt.windows(), windows);
    }
}
