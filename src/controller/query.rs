//! Read-only snapshots, written newline-delimited to a caller-provided sink.
//! `?` stands for "no focused window / no active workspace".

use std::io::{self, Write};

use crate::controller::Controller;
use crate::sys::window_server::{WindowId, WindowInfo};

impl Controller {
    pub fn query_window(&self, op: &str, out: &mut dyn Write) -> io::Result<()> {
        match op {
            "owner" => self.write_focused_field(out, |info| info.owner.clone()),
            "name" => self.write_focused_field(out, |info| info.title.clone()),
            "tag" => {
                self.write_focused_field(out, |info| format!("{} - {}", info.owner, info.title))
            }
            "float" => self.write_focused_field(out, |info| u8::from(info.flags.float).to_string()),
            _ => match op.parse::<u32>() {
                Ok(id) => self.write_window_details(WindowId::new(id), out),
                Err(_) => Ok(()),
            },
        }
    }

    pub fn query_desktop(&self, op: &str, out: &mut dyn Write) -> io::Result<()> {
        match op {
            "id" => {
                let desktop = self
                    .server
                    .active_space()
                    .and_then(|space| self.server.desktop_for_space(space.id));
                match desktop {
                    Some(desktop) => writeln!(out, "{}", desktop.id),
                    None => writeln!(out, "?"),
                }
            }
            "mode" => match self.server.active_space() {
                Some(space) => {
                    let vs = self.spaces.acquire(space.id);
                    writeln!(out, "{}", vs.mode)
                }
                None => writeln!(out, "?"),
            },
            "windows" => self.write_windows_for_active_space(out),
            _ => Ok(()),
        }
    }

    pub fn query_monitor(&self, op: &str, out: &mut dyn Write) -> io::Result<()> {
        match op {
            "id" => {
                let desktop = self
                    .server
                    .active_space()
                    .and_then(|space| self.server.desktop_for_space(space.id));
                match desktop {
                    Some(desktop) => writeln!(out, "{}", desktop.monitor + 1),
                    None => writeln!(out, "?"),
                }
            }
            "count" => writeln!(out, "{}", self.server.display_count()),
            _ => Ok(()),
        }
    }

    /// Space-separated desktop ids for a 1-based monitor index.
    pub fn query_desktops_for_monitor(&self, op: &str, out: &mut dyn Write) -> io::Result<()> {
        let Ok(monitor) = op.parse::<u32>() else {
            return Ok(());
        };
        let Some(arrangement) = (monitor as usize).checked_sub(1) else {
            return Ok(());
        };
        if arrangement >= self.server.display_count() {
            return Ok(());
        }
        let Some(display) = self.server.display_for_arrangement(arrangement) else {
            return Ok(());
        };
        let desktops: Vec<String> = self
            .server
            .desktops_for_display(&display)
            .into_iter()
            .map(|id| id.to_string())
            .collect();
        writeln!(out, "{}", desktops.join(" "))
    }

    /// The 1-based monitor index holding a desktop.
    pub fn query_monitor_for_desktop(&self, op: &str, out: &mut dyn Write) -> io::Result<()> {
        let Ok(desktop) = op.parse::<u32>() else {
            return Ok(());
        };
        match self.server.space_for_desktop(desktop) {
            Some((arrangement, _)) => writeln!(out, "{}", arrangement + 1),
            None => Ok(()),
        }
    }

    fn write_focused_field(
        &self,
        out: &mut dyn Write,
        field: impl Fn(&WindowInfo) -> String,
    ) -> io::Result<()> {
        let value = self
            .server
            .focused_window()
            .and_then(|window| self.server.window_info(window))
            .map(|info| field(&info));
        match value {
            Some(value) => writeln!(out, "{value}"),
            None => writeln!(out, "?"),
        }
    }

    fn write_window_details(&self, window: WindowId, out: &mut dyn Write) -> io::Result<()> {
        match self.server.window_info(window) {
            Some(info) => {
                writeln!(out, "id: {}", info.id)?;
                writeln!(out, "level: {}", info.level)?;
                writeln!(out, "name: {}", info.title)?;
                writeln!(out, "owner: {}", info.owner)?;
                writeln!(out, "role: {}", info.role)?;
                writeln!(out, "subrole: {}", info.subrole)?;
                writeln!(out, "movable: {}", u8::from(info.movable))?;
                writeln!(out, "resizable: {}", u8::from(info.resizable))
            }
            None => writeln!(out, "window not found.."),
        }
    }

    fn write_windows_for_active_space(&self, out: &mut dyn Write) -> io::Result<()> {
        let Some(space) = self.server.active_space() else {
            return writeln!(out, "?");
        };
        let windows = self.server.visible_windows(space.id, true, true);
        if windows.is_empty() {
            return writeln!(out, "desktop is empty..");
        }
        for window in windows {
            let Some(info) = self.server.window_info(window) else {
                continue;
            };
            if self.server.is_window_tileable(window) {
                writeln!(out, "{}, {}, {}", info.id, info.owner, info.title)?;
            } else {
                writeln!(out, "{}, {}, {} (invalid)", info.id, info.owner, info.title)?;
            }
        }
        Ok(())
    }
}
