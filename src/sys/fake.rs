//! Headless window server used by the test suite and for driving the
//! controller without a real OS session.

use parking_lot::Mutex;

use crate::common::collections::HashMap;
use crate::sys::geometry::{Point, Rect};
use crate::sys::window_server::{
    Desktop, DisplayId, HintWindowId, Space, SpaceId, SpaceKind, WindowFlags, WindowId, WindowInfo,
    WindowServer,
};

#[derive(Debug, Clone)]
struct FakeWindow {
    title: String,
    owner: String,
    level: i32,
    frame: Rect,
    flags: WindowFlags,
    space: SpaceId,
    tileable: bool,
    fullscreen: bool,
}

#[derive(Debug, Clone)]
struct FakeSpace {
    id: SpaceId,
    kind: SpaceKind,
    desktop: u32,
    display: usize,
}

#[derive(Debug, Clone)]
struct FakeDisplay {
    id: DisplayId,
    bounds: Rect,
    usable: Rect,
    active_space: SpaceId,
}

#[derive(Default)]
struct State {
    displays: Vec<FakeDisplay>,
    spaces: Vec<FakeSpace>,
    windows: HashMap<WindowId, FakeWindow>,
    order: Vec<WindowId>,
    focused: Option<WindowId>,
    cursor: Point,
    focus_history: Vec<WindowId>,
    hints: Vec<HintWindowId>,
    next_window: u32,
    next_space: u64,
    next_desktop: u32,
    next_hint: u32,
}

#[derive(Default)]
pub struct FakeWindowServer {
    state: Mutex<State>,
}

impl FakeWindowServer {
    pub fn new() -> Self { Self::default() }

    /// Register a display; its first (active) user space is created
    /// implicitly, mirroring how the OS always has a space per display.
    pub fn add_display(&self, bounds: Rect) -> DisplayId {
        let mut st = self.state.lock();
        let index = st.displays.len();
        let id = DisplayId::new(format!("display-{index}"));
        st.displays.push(FakeDisplay {
            id: id.clone(),
            bounds,
            usable: bounds,
            active_space: SpaceId::new(0),
        });
        drop(st);
        let space = self.add_space(&id, SpaceKind::User);
        self.state.lock().displays[index].active_space = space;
        id
    }

    pub fn set_usable_bounds(&self, display: &DisplayId, usable: Rect) {
        let mut st = self.state.lock();
        if let Some(d) = st.displays.iter_mut().find(|d| &d.id == display) {
            d.usable = usable;
        }
    }

    pub fn add_space(&self, display: &DisplayId, kind: SpaceKind) -> SpaceId {
        let mut st = self.state.lock();
        let display_index =
            st.displays.iter().position(|d| &d.id == display).expect("unknown display");
        st.next_space += 1;
        st.next_desktop += 1;
        let id = SpaceId::new(st.next_space);
        let desktop = st.next_desktop;
        st.spaces.push(FakeSpace {
            id,
            kind,
            desktop,
            display: display_index,
        });
        id
    }

    pub fn set_active_space(&self, space: SpaceId) {
        let mut st = self.state.lock();
        if let Some(display) = st.spaces.iter().find(|s| s.id == space).map(|s| s.display) {
            st.displays[display].active_space = space;
        }
    }

    pub fn add_window(&self, space: SpaceId, frame: Rect) -> WindowId {
        let mut st = self.state.lock();
        st.next_window += 1;
        let id = WindowId::new(st.next_window);
        st.windows.insert(id, FakeWindow {
            title: format!("Window {}", id.get()),
            owner: "App".to_string(),
            level: 0,
            frame,
            flags: WindowFlags::default(),
            space,
            tileable: true,
            fullscreen: false,
        });
        st.order.push(id);
        id
    }

    pub fn set_window_title(&self, window: WindowId, owner: &str, title: &str) {
        let mut st = self.state.lock();
        if let Some(w) = st.windows.get_mut(&window) {
            w.owner = owner.to_string();
            w.title = title.to_string();
        }
    }

    pub fn set_window_tileable(&self, window: WindowId, tileable: bool) {
        let mut st = self.state.lock();
        if let Some(w) = st.windows.get_mut(&window) {
            w.tileable = tileable;
        }
    }

    pub fn set_cursor(&self, cursor: Point) { self.state.lock().cursor = cursor; }

    pub fn frame_of(&self, window: WindowId) -> Rect {
        self.state.lock().windows.get(&window).map(|w| w.frame).unwrap_or_default()
    }

    pub fn focus_history(&self) -> Vec<WindowId> { self.state.lock().focus_history.clone() }

    pub fn live_hint_count(&self) -> usize { self.state.lock().hints.len() }
}

impl WindowServer for FakeWindowServer {
    fn active_space(&self) -> Option<Space> {
        let st = self.state.lock();
        let display = st.displays.first()?;
        let space = st.spaces.iter().find(|s| s.id == display.active_space)?;
        Some(Space { id: space.id, kind: space.kind })
    }

    fn active_space_on_display(&self, display: &DisplayId) -> Option<Space> {
        let st = self.state.lock();
        let d = st.displays.iter().find(|d| &d.id == display)?;
        let space = st.spaces.iter().find(|s| s.id == d.active_space)?;
        Some(Space { id: space.id, kind: space.kind })
    }

    fn spaces_for_window(&self, window: WindowId) -> Vec<Space> {
        let st = self.state.lock();
        let Some(w) = st.windows.get(&window) else {
            return Vec::new();
        };
        st.spaces
            .iter()
            .filter(|s| s.id == w.space)
            .map(|s| Space { id: s.id, kind: s.kind })
            .collect()
    }

    fn desktop_for_space(&self, space: SpaceId) -> Option<Desktop> {
        let st = self.state.lock();
        st.spaces.iter().find(|s| s.id == space).map(|s| Desktop {
            monitor: s.display,
            id: s.desktop,
        })
    }

    fn space_for_desktop(&self, desktop: u32) -> Option<(usize, SpaceId)> {
        let st = self.state.lock();
        st.spaces.iter().find(|s| s.desktop == desktop).map(|s| (s.display, s.id))
    }

    fn desktops_for_display(&self, display: &DisplayId) -> Vec<u32> {
        let st = self.state.lock();
        let Some(index) = st.displays.iter().position(|d| &d.id == display) else {
            return Vec::new();
        };
        let mut desktops: Vec<u32> =
            st.spaces.iter().filter(|s| s.display == index).map(|s| s.desktop).collect();
        desktops.sort_unstable();
        desktops
    }

    fn display_for_space(&self, space: SpaceId) -> Option<DisplayId> {
        let st = self.state.lock();
        let s = st.spaces.iter().find(|s| s.id == space)?;
        Some(st.displays[s.display].id.clone())
    }

    fn display_for_arrangement(&self, arrangement: usize) -> Option<DisplayId> {
        self.state.lock().displays.get(arrangement).map(|d| d.id.clone())
    }

    fn display_for_rect(&self, frame: Rect) -> Option<DisplayId> {
        let st = self.state.lock();
        st.displays
            .iter()
            .find(|d| d.bounds.contains(frame.center()))
            .or_else(|| st.displays.first())
            .map(|d| d.id.clone())
    }

    fn display_bounds(&self, display: &DisplayId) -> Rect {
        let st = self.state.lock();
        st.displays
            .iter()
            .find(|d| &d.id == display)
            .map(|d| d.bounds)
            .unwrap_or_default()
    }

    fn usable_display_bounds(&self, display: &DisplayId) -> Rect {
        let st = self.state.lock();
        st.displays
            .iter()
            .find(|d| &d.id == display)
            .map(|d| d.usable)
            .unwrap_or_default()
    }

    fn display_count(&self) -> usize { self.state.lock().displays.len() }

    fn visible_windows(
        &self,
        space: SpaceId,
        include_invalid: bool,
        include_floating: bool,
    ) -> Vec<WindowId> {
        let st = self.state.lock();
        st.order
            .iter()
            .filter(|id| {
                let Some(w) = st.windows.get(*id) else {
                    return false;
                };
                w.space == space
                    && (include_invalid || w.tileable)
                    && (include_floating || !w.flags.float)
            })
            .copied()
            .collect()
    }

    fn window_info(&self, window: WindowId) -> Option<WindowInfo> {
        let st = self.state.lock();
        st.windows.get(&window).map(|w| WindowInfo {
            id: window,
            title: w.title.clone(),
            owner: w.owner.clone(),
            level: w.level,
            role: "AXWindow".to_string(),
            subrole: "AXStandardWindow".to_string(),
            frame: w.frame,
            movable: true,
            resizable: true,
            flags: w.flags,
        })
    }

    fn focused_window(&self) -> Option<WindowId> { self.state.lock().focused }

    fn focus_window(&self, window: WindowId) {
        let mut st = self.state.lock();
        st.focused = Some(window);
        st.focus_history.push(window);
    }

    fn set_window_frame(&self, window: WindowId, frame: Rect) {
        let mut st = self.state.lock();
        if let Some(w) = st.windows.get_mut(&window) {
            w.frame = frame;
        }
    }

    fn move_window_to_space(&self, space: SpaceId, window: WindowId) {
        let mut st = self.state.lock();
        if let Some(w) = st.windows.get_mut(&window) {
            w.space = space;
        }
    }

    fn close_window(&self, window: WindowId) {
        let mut st = self.state.lock();
        st.windows.remove(&window);
        st.order.retain(|id| *id != window);
        if st.focused == Some(window) {
            st.focused = None;
        }
    }

    fn cursor_position(&self) -> Point { self.state.lock().cursor }

    fn warp_cursor(&self, to: Point) { self.state.lock().cursor = to; }

    fn is_window_fullscreen(&self, window: WindowId) -> bool {
        self.state.lock().windows.get(&window).map(|w| w.fullscreen).unwrap_or(false)
    }

    fn set_window_fullscreen(&self, window: WindowId, fullscreen: bool) {
        let mut st = self.state.lock();
        if let Some(w) = st.windows.get_mut(&window) {
            w.fullscreen = fullscreen;
        }
    }

    fn window_flags(&self, window: WindowId) -> WindowFlags {
        self.state.lock().windows.get(&window).map(|w| w.flags).unwrap_or_default()
    }

    fn set_window_float(&self, window: WindowId, float: bool) {
        let mut st = self.state.lock();
        if let Some(w) = st.windows.get_mut(&window) {
            w.flags.float = float;
        }
    }

    fn set_window_sticky(&self, window: WindowId, sticky: bool) {
        let mut st = self.state.lock();
        if let Some(w) = st.windows.get_mut(&window) {
            w.flags.sticky = sticky;
        }
    }

    fn is_window_tileable(&self, window: WindowId) -> bool {
        self.state.lock().windows.get(&window).map(|w| w.tileable).unwrap_or(false)
    }

    fn create_hint_window(
        &self,
        _frame: Rect,
        _border_width: i32,
        _color: u32,
    ) -> Option<HintWindowId> {
        let mut st = self.state.lock();
        st.next_hint += 1;
        let id = HintWindowId(st.next_hint);
        st.hints.push(id);
        Some(id)
    }

    fn destroy_hint_window(&self, hint: HintWindowId) {
        self.state.lock().hints.retain(|h| *h != hint);
    }
}
