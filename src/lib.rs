pub mod common;
pub mod controller;
pub mod layout_engine;
pub mod model;
pub mod sys;

pub use controller::{Controller, Error, Result};
