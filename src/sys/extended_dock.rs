use std::io::Write;
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use tracing::debug;

use crate::sys::window_server::WindowId;

pub const DEFAULT_PORT: u16 = 5050;

/// OS window level keys understood by the dock helper.
pub const NORMAL_WINDOW_LEVEL_KEY: i32 = 4;
pub const FLOATING_WINDOW_LEVEL_KEY: i32 = 5;

const CONNECT_TIMEOUT: Duration = Duration::from_millis(250);

/// Client for the out-of-process dock helper that adjusts window Z-order and
/// stickiness. One connection per message, best effort: a helper that is not
/// running simply means the hint is skipped.
#[derive(Debug, Clone)]
pub struct ExtendedDock {
    port: u16,
}

impl Default for ExtendedDock {
    fn default() -> Self { Self::new(DEFAULT_PORT) }
}

impl ExtendedDock {
    pub fn new(port: u16) -> Self { Self { port } }

    pub fn set_window_position(&self, window: WindowId, x: i32, y: i32) {
        self.send(&format!("window_move {} {} {}", window.get(), x, y));
    }

    pub fn set_window_level(&self, window: WindowId, level_key: i32) {
        self.send(&format!("window_level {} {}", window.get(), level_key));
    }

    pub fn set_window_sticky(&self, window: WindowId, sticky: bool) {
        self.send(&format!("window_sticky {} {}", window.get(), u32::from(sticky)));
    }

    fn send(&self, message: &str) {
        let addr = SocketAddr::from(([127, 0, 0, 1], self.port));
        let mut stream = match TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT) {
            Ok(stream) => stream,
            Err(err) => {
                debug!("dock helper not reachable on port {}: {}", self.port, err);
                return;
            }
        };
        if let Err(err) = stream.write_all(message.as_bytes()) {
            debug!("failed to write '{}' to dock helper: {}", message, err);
        }
    }
}
