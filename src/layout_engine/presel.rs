use crate::layout_engine::node::SplitKind;
use crate::layout_engine::CardinalDir;
use crate::sys::geometry::Rect;
use crate::sys::window_server::HintWindowId;

/// A sticky insertion hint on a leaf: directs where the next window tiled
/// onto that leaf lands. Holds the handle of the visual hint window so the
/// overlay can be torn down when the record is consumed or cleared.
#[derive(Debug, Clone, PartialEq)]
pub struct Preselect {
    pub direction: CardinalDir,
    pub split: SplitKind,
    pub spawn_left: bool,
    pub ratio: f32,
    pub region: Rect,
    pub hint: Option<HintWindowId>,
}

impl Preselect {
    /// Build the record for a leaf. `base_ratio` is the configured split
    /// ratio; it applies to the spawned side, so spawning on the second side
    /// stores the complement.
    pub fn new(direction: CardinalDir, base_ratio: f32, leaf_region: Rect) -> Preselect {
        let spawn_left = direction.spawns_left();
        let ratio = if spawn_left { base_ratio } else { 1.0 - base_ratio };
        Preselect {
            direction,
            split: direction.split(),
            spawn_left,
            ratio,
            region: preselect_region(leaf_region, direction, ratio),
            hint: None,
        }
    }
}

fn preselect_region(region: Rect, direction: CardinalDir, ratio: f32) -> Rect {
    let ratio = ratio as f64;
    match direction {
        CardinalDir::West => Rect::new(
            region.origin.x,
            region.origin.y,
            region.size.width * ratio,
            region.size.height,
        ),
        CardinalDir::East => Rect::new(
            region.origin.x + region.size.width * ratio,
            region.origin.y,
            region.size.width * (1.0 - ratio),
            region.size.height,
        ),
        CardinalDir::North => Rect::new(
            region.origin.x,
            region.origin.y,
            region.size.width,
            region.size.height * ratio,
        ),
        CardinalDir::South => Rect::new(
            region.origin.x,
            region.origin.y + region.size.height * ratio,
            region.size.width,
            region.size.height * (1.0 - ratio),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn west_takes_the_left_slice_at_the_configured_ratio() {
        let presel = Preselect::new(CardinalDir::West, 0.4, Rect::new(0.0, 0.0, 1000.0, 500.0));
        assert!(presel.spawn_left);
        assert_eq!(presel.split, SplitKind::Vertical);
        assert_eq!(presel.ratio, 0.4);
        assert_eq!(presel.region, Rect::new(0.0, 0.0, 400.0, 500.0));
    }

    #[test]
    fn south_takes_the_bottom_slice_with_the_complement_ratio() {
        let presel = Preselect::new(CardinalDir::South, 0.4, Rect::new(0.0, 0.0, 1000.0, 500.0));
        assert!(!presel.spawn_left);
        assert_eq!(presel.split, SplitKind::Horizontal);
        assert_eq!(presel.ratio, 0.6);
        // The spawned (bottom) slice covers the configured 0.4 of the height.
        assert_eq!(presel.region, Rect::new(0.0, 300.0, 1000.0, 200.0));
    }
}
