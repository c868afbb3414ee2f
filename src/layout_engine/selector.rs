//! Directional neighbor selection: ordered traversal over the tree, and the
//! spatial nearest-in-direction metric shared by tiled and fullscreen
//! workspaces.

use std::f64::consts::{FRAC_PI_2, PI};

use crate::layout_engine::node::{BspTree, NodeId};
use crate::layout_engine::CardinalDir;
use crate::sys::geometry::{Point, Rect};
use crate::sys::window_server::WindowId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ordered {
    Prev,
    Next,
    Biggest,
}

/// Traversal-order neighbor. With `wrap`, falling off either end lands on the
/// opposite terminal leaf.
pub fn ordered_neighbor(tree: &BspTree, from: NodeId, op: Ordered, wrap: bool) -> Option<NodeId> {
    match op {
        Ordered::Prev => tree.prev_leaf(from).or_else(|| wrap.then(|| tree.last_leaf())),
        Ordered::Next => tree.next_leaf(from).or_else(|| wrap.then(|| tree.first_leaf())),
        Ordered::Biggest => tree.biggest_leaf(),
    }
}

/// True when `b` lies in `dir` of `a`: for north/south the x-spans must
/// overlap and the y origins differ, symmetrically for east/west.
pub fn window_is_in_direction(dir: CardinalDir, a: Rect, b: Rect) -> bool {
    match dir {
        CardinalDir::North | CardinalDir::South => {
            a.origin.y != b.origin.y && a.origin.x.max(b.origin.x) < b.max_x().min(a.max_x())
        }
        CardinalDir::East | CardinalDir::West => {
            a.origin.x != b.origin.x && a.origin.y.max(b.origin.y) < b.max_y().min(a.max_y())
        }
    }
}

/// Shift a candidate center so the far edge of the monitor acts as if it were
/// adjacent to the near edge.
pub fn wrap_monitor_edge(display: &Rect, dir: CardinalDir, a: Point, b: &mut Point) {
    match dir {
        CardinalDir::North => {
            if a.y < b.y {
                b.y -= display.size.height;
            }
        }
        CardinalDir::East => {
            if a.x > b.x {
                b.x += display.size.width;
            }
        }
        CardinalDir::South => {
            if a.y > b.y {
                b.y += display.size.height;
            }
        }
        CardinalDir::West => {
            if a.x < b.x {
                b.x -= display.size.width;
            }
        }
    }
}

/// Angle-weighted distance between two window centers. Candidates behind the
/// source score infinity.
pub fn window_distance(dir: CardinalDir, a: Point, mut b: Point, wrap: Option<&Rect>) -> f64 {
    if let Some(display) = wrap {
        wrap_monitor_edge(display, dir, a, &mut b);
    }

    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let angle = dy.atan2(dx);
    let distance = dx.hypot(dy);

    let delta = match dir {
        CardinalDir::North => {
            if dy >= 0.0 {
                return f64::INFINITY;
            }
            -FRAC_PI_2 - angle
        }
        CardinalDir::East => {
            if dx <= 0.0 {
                return f64::INFINITY;
            }
            -angle
        }
        CardinalDir::South => {
            if dy <= 0.0 {
                return f64::INFINITY;
            }
            FRAC_PI_2 - angle
        }
        CardinalDir::West => {
            if dx >= 0.0 {
                return f64::INFINITY;
            }
            PI - angle.abs()
        }
    };

    distance / (delta / 2.0).cos()
}

/// Lowest-scoring candidate in `dir` of `source`, or `None`. Candidates that
/// share the source's window id never match.
pub fn closest_in_direction(
    source: (WindowId, Rect),
    candidates: impl IntoIterator<Item = (WindowId, Rect)>,
    dir: CardinalDir,
    wrap: Option<&Rect>,
) -> Option<WindowId> {
    let (source_id, source_rect) = source;
    let mut best: Option<(WindowId, f64)> = None;
    for (id, frame) in candidates {
        if id == source_id {
            continue;
        }
        if !window_is_in_direction(dir, source_rect, frame) {
            continue;
        }
        let dist = window_distance(dir, source_rect.center(), frame.center(), wrap);
        if dist.is_finite() && best.map_or(true, |(_, d)| dist < d) {
            best = Some((id, dist));
        }
    }
    best.map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(id: u32) -> WindowId { WindowId::new(id) }

    #[test]
    fn direction_filter_requires_overlapping_spans() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let beside = Rect::new(200.0, 0.0, 100.0, 100.0);
        let diagonal = Rect::new(200.0, 200.0, 100.0, 100.0);
        assert!(window_is_in_direction(CardinalDir::East, a, beside));
        assert!(!window_is_in_direction(CardinalDir::East, a, diagonal));
        assert!(!window_is_in_direction(CardinalDir::North, a, beside));
    }

    #[test]
    fn candidates_behind_score_infinity() {
        let a = Point::new(100.0, 100.0);
        let behind = Point::new(0.0, 100.0);
        assert!(window_distance(CardinalDir::East, a, behind, None).is_infinite());
        assert!(window_distance(CardinalDir::West, a, behind, None).is_finite());
    }

    #[test]
    fn straight_ahead_beats_diagonal() {
        let source = (w(1), Rect::new(0.0, 0.0, 100.0, 300.0));
        let straight = (w(2), Rect::new(200.0, 100.0, 100.0, 100.0));
        let diagonal = (w(3), Rect::new(200.0, 250.0, 100.0, 100.0));
        let found =
            closest_in_direction(source, vec![diagonal, straight], CardinalDir::East, None);
        assert_eq!(found, Some(w(2)));
    }

    #[test]
    fn wrap_makes_the_far_edge_adjacent() {
        let display = Rect::new(0.0, 0.0, 1000.0, 500.0);
        let source = (w(1), Rect::new(0.0, 0.0, 100.0, 500.0));
        // Without wrap nothing is west of the leftmost window.
        let east_window = (w(2), Rect::new(900.0, 0.0, 100.0, 500.0));
        assert_eq!(
            closest_in_direction(source, vec![east_window], CardinalDir::West, None),
            None
        );
        assert_eq!(
            closest_in_direction(source, vec![east_window], CardinalDir::West, Some(&display)),
            Some(w(2))
        );
    }

    #[test]
    fn source_window_never_matches_itself() {
        let display = Rect::new(0.0, 0.0, 1000.0, 500.0);
        let frame = Rect::new(0.0, 0.0, 1000.0, 500.0);
        let source = (w(1), frame);
        assert_eq!(
            closest_in_direction(source, vec![(w(1), frame)], CardinalDir::West, Some(&display)),
            None
        );
    }
}
