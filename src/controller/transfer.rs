//! Moving windows between desktops and monitors, and monitor focus. These
//! are the only cross-workspace commands; the source workspace lock is always
//! released before the bridge moves the window or focus, so no command ever
//! holds two workspace locks at once.

use tracing::warn;

use crate::common::config::FocusCycle;
use crate::controller::ops::{DesktopOp, MonitorOp};
use crate::controller::{Controller, Error, Result};
use crate::sys::geometry::Rect;
use crate::sys::window_server::{SpaceKind, WindowId};

impl Controller {
    pub fn send_window_to_desktop(&mut self, op: &str) -> Result<()> {
        let Some(window) = self.server.focused_window() else {
            return Ok(());
        };
        self.send_window_to_desktop_for(window, op)
    }

    /// Move `window` to another desktop. Relative destinations resolve the
    /// source from the workspace set the OS reports for the window; absolute
    /// destinations assume the active workspace holds it.
    pub fn send_window_to_desktop_for(&mut self, window: WindowId, op: &str) -> Result<()> {
        let Ok(dest_op) = op.parse::<DesktopOp>() else {
            warn!("invalid destination desktop '{op}'");
            return Ok(());
        };

        let space = match dest_op {
            DesktopOp::Prev | DesktopOp::Next => {
                let spaces = self.server.spaces_for_window(window);
                let [space] = spaces[..] else {
                    return Err(Error::Invariant("window is not on exactly one workspace"));
                };
                space
            }
            DesktopOp::Desktop(_) => self.active_space()?,
        };
        if space.kind != SpaceKind::User {
            return Ok(());
        }
        let desktop = self
            .server
            .desktop_for_space(space.id)
            .ok_or(Error::Invariant("workspace without a desktop id"))?;

        let destination = match dest_op {
            DesktopOp::Prev => desktop.id.saturating_sub(1),
            DesktopOp::Next => desktop.id + 1,
            DesktopOp::Desktop(id) => id,
        };
        if destination == desktop.id {
            warn!("source desktop and destination '{destination}' are the same");
            return Ok(());
        }
        let Some((dest_monitor, dest_space)) = self.server.space_for_desktop(destination) else {
            warn!("destination desktop '{destination}' does not exist");
            return Ok(());
        };

        let tiled =
            !self.server.window_flags(window).float && self.server.is_window_tileable(window);
        if tiled {
            let mut vs = self.spaces.acquire(space.id);
            self.untile_window_from_space(window, space.id, &mut vs);
        }

        self.server.move_window_to_space(dest_space, window);

        // The OS does not move focus along with the window; hand it to the
        // highest-priority window left behind to avoid focus desync.
        for candidate in self.server.visible_windows(space.id, false, true) {
            if candidate != window {
                self.server.focus_window(candidate);
                break;
            }
        }

        if dest_monitor == desktop.monitor {
            return Ok(());
        }

        let src_display = self
            .server
            .display_for_space(space.id)
            .ok_or(Error::Invariant("source workspace without a display"))?;
        let dst_display = self
            .server
            .display_for_space(dest_space)
            .ok_or(Error::Invariant("destination workspace without a display"))?;
        if let Some(info) = self.server.window_info(window) {
            let frame = normalize_window_rect(
                info.frame,
                self.server.display_bounds(&src_display),
                self.server.display_bounds(&dst_display),
            );
            self.server.set_window_frame(window, frame);
        }

        if tiled {
            if let Some(active) = self.server.active_space_on_display(&dst_display) {
                if active.id == dest_space {
                    let mut vs = self.spaces.acquire(dest_space);
                    self.tile_window_on_space(window, dest_space, &mut vs);
                }
            }
        }
        Ok(())
    }

    pub fn send_window_to_monitor(&mut self, op: &str) -> Result<()> {
        let Ok(dest_op) = op.parse::<MonitorOp>() else {
            warn!("invalid destination monitor '{op}'");
            return Ok(());
        };
        let Some(window) = self.server.focused_window() else {
            return Ok(());
        };
        let space = self.active_space()?;
        if space.kind != SpaceKind::User {
            return Ok(());
        }
        let desktop = self
            .server
            .desktop_for_space(space.id)
            .ok_or(Error::Invariant("workspace without a desktop id"))?;

        let Some(destination) = resolve_monitor(dest_op, desktop.monitor) else {
            warn!("invalid destination monitor '{op}'");
            return Ok(());
        };
        if destination == desktop.monitor {
            warn!("source monitor and destination '{}' are the same", destination + 1);
            return Ok(());
        }
        let Some(dst_display) = self.server.display_for_arrangement(destination) else {
            warn!("destination monitor '{}' does not exist", destination + 1);
            return Ok(());
        };
        let dest_space = self
            .server
            .active_space_on_display(&dst_display)
            .ok_or(Error::Invariant("monitor without an active workspace"))?;
        if dest_space.kind != SpaceKind::User {
            return Ok(());
        }

        let tiled =
            !self.server.window_flags(window).float && self.server.is_window_tileable(window);
        if tiled {
            let mut vs = self.spaces.acquire(space.id);
            self.untile_window_from_space(window, space.id, &mut vs);
        }

        self.server.move_window_to_space(dest_space.id, window);

        for candidate in self.server.visible_windows(space.id, false, true) {
            if candidate != window {
                self.server.focus_window(candidate);
                break;
            }
        }

        let src_display = self
            .server
            .display_for_space(space.id)
            .ok_or(Error::Invariant("source workspace without a display"))?;
        if let Some(info) = self.server.window_info(window) {
            let frame = normalize_window_rect(
                info.frame,
                self.server.display_bounds(&src_display),
                self.server.display_bounds(&dst_display),
            );
            self.server.set_window_frame(window, frame);
        }

        if tiled {
            let mut vs = self.spaces.acquire(dest_space.id);
            self.tile_window_on_space(window, dest_space.id, &mut vs);
        }
        Ok(())
    }

    pub fn focus_monitor(&mut self, op: &str) -> Result<()> {
        let Ok(parsed) = op.parse::<MonitorOp>() else {
            warn!("invalid destination monitor '{op}'");
            return Ok(());
        };
        self.focus_monitor_command(parsed)
    }

    pub(crate) fn focus_monitor_command(&self, op: MonitorOp) -> Result<()> {
        let space = self.active_space()?;
        let desktop = self
            .server
            .desktop_for_space(space.id)
            .ok_or(Error::Invariant("workspace without a desktop id"))?;
        let source = desktop.monitor;
        let wrap = self.cvars.window_focus_cycle == FocusCycle::All || self.cvars.monitor_focus_cycle;

        match op {
            MonitorOp::Prev => {
                let focused = source.checked_sub(1).is_some_and(|t| self.focus_monitor_at(t));
                if !focused && wrap {
                    self.focus_monitor_at(self.server.display_count().saturating_sub(1));
                }
            }
            MonitorOp::Next => {
                if !self.focus_monitor_at(source + 1) && wrap {
                    self.focus_monitor_at(0);
                }
            }
            MonitorOp::Monitor(n) => match (n as usize).checked_sub(1) {
                Some(target) => {
                    self.focus_monitor_at(target);
                }
                None => warn!("invalid destination monitor '{n}'"),
            },
        }
        Ok(())
    }

    /// Focus the first visible window on the active workspace of a monitor.
    fn focus_monitor_at(&self, arrangement: usize) -> bool {
        let Some(display) = self.server.display_for_arrangement(arrangement) else {
            warn!("destination monitor '{}' does not exist", arrangement + 1);
            return false;
        };
        let Some(space) = self.server.active_space_on_display(&display) else {
            return false;
        };
        if space.kind != SpaceKind::User {
            return false;
        }
        let windows = self.server.visible_windows(space.id, false, true);
        let Some(first) = windows.first() else {
            return false;
        };
        self.server.focus_window(*first);
        true
    }
}

fn resolve_monitor(op: MonitorOp, source: usize) -> Option<usize> {
    match op {
        MonitorOp::Prev => source.checked_sub(1),
        MonitorOp::Next => Some(source + 1),
        MonitorOp::Monitor(n) => (n as usize).checked_sub(1),
    }
}

/// Re-map a frame from one monitor's rectangle into another's, preserving
/// the offset from the monitor origin and scaling for resolution differences.
fn normalize_window_rect(frame: Rect, src: Rect, dst: Rect) -> Rect {
    let offset_x = frame.origin.x - src.origin.x;
    let offset_y = frame.origin.y - src.origin.y;

    let scale_x = src.size.width / dst.size.width;
    let scale_y = src.size.height / dst.size.height;

    let x = if scale_x > 1.0 { offset_x / scale_x } else { offset_x } + dst.origin.x;
    let y = if scale_y > 1.0 { offset_y / scale_y } else { offset_y } + dst.origin.y;

    Rect::new(x, y, frame.size.width / scale_x, frame.size.height / scale_y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_scales_down_onto_a_smaller_monitor() {
        let src = Rect::new(0.0, 0.0, 2560.0, 1440.0);
        let dst = Rect::new(2560.0, 0.0, 1280.0, 720.0);
        let frame = Rect::new(640.0, 360.0, 1280.0, 720.0);
        let normalized = normalize_window_rect(frame, src, dst);
        assert_eq!(normalized, Rect::new(2560.0 + 320.0, 180.0, 640.0, 360.0));
    }

    #[test]
    fn normalize_keeps_offsets_onto_a_larger_monitor() {
        let src = Rect::new(0.0, 0.0, 1280.0, 720.0);
        let dst = Rect::new(1280.0, 0.0, 2560.0, 1440.0);
        let frame = Rect::new(100.0, 50.0, 640.0, 360.0);
        let normalized = normalize_window_rect(frame, src, dst);
        // Scale < 1: origin offset is kept as-is, the size still scales.
        assert_eq!(normalized, Rect::new(1380.0, 50.0, 1280.0, 720.0));
    }

    #[test]
    fn relative_monitor_resolution() {
        assert_eq!(resolve_monitor(MonitorOp::Prev, 0), None);
        assert_eq!(resolve_monitor(MonitorOp::Prev, 2), Some(1));
        assert_eq!(resolve_monitor(MonitorOp::Next, 0), Some(1));
        assert_eq!(resolve_monitor(MonitorOp::Monitor(1), 5), Some(0));
        assert_eq!(resolve_monitor(MonitorOp::Monitor(0), 5), None);
    }
}
