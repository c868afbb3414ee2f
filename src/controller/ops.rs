//! Command operand parsing. Operand strings are parsed exactly once, here;
//! past this boundary everything is an enum.

use std::str::FromStr;

use crate::layout_engine::node::{Rotation, SplitKind};
use crate::layout_engine::selector::Ordered;
use crate::layout_engine::CardinalDir;
use crate::model::virtual_space::SpaceMode;

/// Returned for any operand the command surface does not understand; the
/// dispatcher logs a warning and leaves all state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidOperand;

impl FromStr for CardinalDir {
    type Err = InvalidOperand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "north" => Ok(CardinalDir::North),
            "east" => Ok(CardinalDir::East),
            "south" => Ok(CardinalDir::South),
            "west" => Ok(CardinalDir::West),
            _ => Err(InvalidOperand),
        }
    }
}

/// Operand of focus/swap/warp/ratio: a compass direction or a traversal pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    Dir(CardinalDir),
    Ordered(Ordered),
}

impl FromStr for Selector {
    type Err = InvalidOperand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prev" => Ok(Selector::Ordered(Ordered::Prev)),
            "next" => Ok(Selector::Ordered(Ordered::Next)),
            "biggest" => Ok(Selector::Ordered(Ordered::Biggest)),
            _ => s.parse::<CardinalDir>().map(Selector::Dir),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreselectOp {
    Dir(CardinalDir),
    Cancel,
}

impl FromStr for PreselectOp {
    type Err = InvalidOperand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cancel" => Ok(PreselectOp::Cancel),
            _ => s.parse::<CardinalDir>().map(PreselectOp::Dir),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleKind {
    Float,
    Sticky,
    NativeFullscreen,
    Fullscreen,
    Parent,
    Split,
}

impl FromStr for ToggleKind {
    type Err = InvalidOperand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "float" => Ok(ToggleKind::Float),
            "sticky" => Ok(ToggleKind::Sticky),
            "native-fullscreen" => Ok(ToggleKind::NativeFullscreen),
            "fullscreen" => Ok(ToggleKind::Fullscreen),
            "parent" => Ok(ToggleKind::Parent),
            "split" => Ok(ToggleKind::Split),
            _ => Err(InvalidOperand),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOp {
    Inc,
    Dec,
}

impl FromStr for StepOp {
    type Err = InvalidOperand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inc" => Ok(StepOp::Inc),
            "dec" => Ok(StepOp::Dec),
            _ => Err(InvalidOperand),
        }
    }
}

/// Destination of a desktop move: relative, or an absolute 1-based id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesktopOp {
    Prev,
    Next,
    Desktop(u32),
}

impl FromStr for DesktopOp {
    type Err = InvalidOperand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prev" => Ok(DesktopOp::Prev),
            "next" => Ok(DesktopOp::Next),
            _ => s.parse::<u32>().map(DesktopOp::Desktop).map_err(|_| InvalidOperand),
        }
    }
}

/// Destination monitor: relative, or an absolute 1-based arrangement index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorOp {
    Prev,
    Next,
    Monitor(u32),
}

impl FromStr for MonitorOp {
    type Err = InvalidOperand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prev" => Ok(MonitorOp::Prev),
            "next" => Ok(MonitorOp::Next),
            _ => s.parse::<u32>().map(MonitorOp::Monitor).map_err(|_| InvalidOperand),
        }
    }
}

/// `rows:cols:x:y:width:height` cell range for the grid command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridOp {
    pub rows: u32,
    pub cols: u32,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl FromStr for GridOp {
    type Err = InvalidOperand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<u32> = s
            .split(':')
            .map(|part| part.parse::<u32>())
            .collect::<Result<_, _>>()
            .map_err(|_| InvalidOperand)?;
        let [rows, cols, x, y, width, height] = parts[..] else {
            return Err(InvalidOperand);
        };
        Ok(GridOp { rows, cols, x, y, width, height })
    }
}

impl FromStr for Rotation {
    type Err = InvalidOperand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "90" => Ok(Rotation::Deg90),
            "180" => Ok(Rotation::Deg180),
            "270" => Ok(Rotation::Deg270),
            _ => Err(InvalidOperand),
        }
    }
}

/// Mirror axis operand; reuses the split axis the transform operates on.
pub fn parse_mirror_axis(s: &str) -> Result<SplitKind, InvalidOperand> {
    match s {
        "vertical" => Ok(SplitKind::Vertical),
        "horizontal" => Ok(SplitKind::Horizontal),
        _ => Err(InvalidOperand),
    }
}

impl FromStr for SpaceMode {
    type Err = InvalidOperand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bsp" => Ok(SpaceMode::Bsp),
            "monocle" => Ok(SpaceMode::Monocle),
            "float" => Ok(SpaceMode::Float),
            _ => Err(InvalidOperand),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_accepts_directions_and_traversal_ops() {
        assert_eq!("west".parse::<Selector>(), Ok(Selector::Dir(CardinalDir::West)));
        assert_eq!("biggest".parse::<Selector>(), Ok(Selector::Ordered(Ordered::Biggest)));
        assert!("upward".parse::<Selector>().is_err());
    }

    #[test]
    fn grid_operand_requires_six_fields() {
        let op = "2:3:0:1:2:1".parse::<GridOp>().unwrap();
        assert_eq!(op.rows, 2);
        assert_eq!(op.cols, 3);
        assert_eq!(op.height, 1);
        assert!("2:3:0:1".parse::<GridOp>().is_err());
        assert!("2:3:0:1:2:1:9".parse::<GridOp>().is_err());
        assert!("2:3:a:1:2:1".parse::<GridOp>().is_err());
    }

    #[test]
    fn desktop_and_monitor_ops_parse_numbers() {
        assert_eq!("3".parse::<DesktopOp>(), Ok(DesktopOp::Desktop(3)));
        assert_eq!("prev".parse::<MonitorOp>(), Ok(MonitorOp::Prev));
        assert!("last".parse::<DesktopOp>().is_err());
    }
}
