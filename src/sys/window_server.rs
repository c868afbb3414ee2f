use serde::{Deserialize, Serialize};

use crate::sys::geometry::{Point, Rect};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct WindowId(pub u32);

impl WindowId {
    pub fn new(id: u32) -> WindowId { WindowId(id) }

    pub fn get(&self) -> u32 { self.0 }
}

impl std::fmt::Display for WindowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct SpaceId(pub u64);

impl SpaceId {
    pub fn new(id: u64) -> SpaceId { SpaceId(id) }

    pub fn get(&self) -> u64 { self.0 }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct DisplayId(pub String);

impl DisplayId {
    pub fn new(id: impl Into<String>) -> DisplayId { DisplayId(id.into()) }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct HintWindowId(pub u32);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpaceKind {
    User,
    Fullscreen,
    System,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Space {
    pub id: SpaceId,
    pub kind: SpaceKind,
}

/// Position of a workspace in the global desktop ordering: the 0-based
/// monitor arrangement index it lives on and its 1-based desktop id.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Desktop {
    pub monitor: usize,
    pub id: u32,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct WindowFlags {
    pub float: bool,
    pub sticky: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowInfo {
    pub id: WindowId,
    pub title: String,
    pub owner: String,
    pub level: i32,
    pub role: String,
    pub subrole: String,
    pub frame: Rect,
    pub movable: bool,
    pub resizable: bool,
    pub flags: WindowFlags,
}

/// The host-OS accessibility bridge. The controller drives everything through
/// this trait; production backends wrap the platform window server, while
/// [`crate::sys::fake::FakeWindowServer`] provides a headless stand-in.
///
/// Calls may fail transiently by returning `None`/empty; the controller
/// degrades the affected effect rather than propagating such failures.
pub trait WindowServer {
    fn active_space(&self) -> Option<Space>;
    fn active_space_on_display(&self, display: &DisplayId) -> Option<Space>;
    fn spaces_for_window(&self, window: WindowId) -> Vec<Space>;

    fn desktop_for_space(&self, space: SpaceId) -> Option<Desktop>;
    fn space_for_desktop(&self, desktop: u32) -> Option<(usize, SpaceId)>;
    fn desktops_for_display(&self, display: &DisplayId) -> Vec<u32>;

    fn display_for_space(&self, space: SpaceId) -> Option<DisplayId>;
    fn display_for_arrangement(&self, arrangement: usize) -> Option<DisplayId>;
    fn display_for_rect(&self, frame: Rect) -> Option<DisplayId>;
    fn display_bounds(&self, display: &DisplayId) -> Rect;
    /// Display bounds with OS chrome (dock, menu bar) carved out.
    fn usable_display_bounds(&self, display: &DisplayId) -> Rect;
    fn display_count(&self) -> usize;

    /// Windows on a workspace in the host's enumeration order. `include_invalid`
    /// keeps windows the validity predicate rejects; `include_floating` keeps
    /// windows with the float flag set.
    fn visible_windows(
        &self,
        space: SpaceId,
        include_invalid: bool,
        include_floating: bool,
    ) -> Vec<WindowId>;
    fn window_info(&self, window: WindowId) -> Option<WindowInfo>;
    fn focused_window(&self) -> Option<WindowId>;
    /// Focus the window and its owning application.
    fn focus_window(&self, window: WindowId);
    fn set_window_frame(&self, window: WindowId, frame: Rect);
    fn move_window_to_space(&self, space: SpaceId, window: WindowId);
    fn close_window(&self, window: WindowId);

    fn cursor_position(&self) -> Point;
    fn warp_cursor(&self, to: Point);

    fn is_window_fullscreen(&self, window: WindowId) -> bool;
    fn set_window_fullscreen(&self, window: WindowId, fullscreen: bool);

    fn window_flags(&self, window: WindowId) -> WindowFlags;
    fn set_window_float(&self, window: WindowId, float: bool);
    fn set_window_sticky(&self, window: WindowId, sticky: bool);

    /// The caller-provided tiling validity predicate.
    fn is_window_tileable(&self, window: WindowId) -> bool;

    fn create_hint_window(&self, frame: Rect, border_width: i32, color: u32)
        -> Option<HintWindowId>;
    fn destroy_hint_window(&self, hint: HintWindowId);
}
