pub mod extended_dock;
pub mod fake;
pub mod geometry;
pub mod window_server;
