pub mod virtual_space;

pub use virtual_space::{
    LayoutTree, Offset, SpaceMode, VirtualSpace, VirtualSpaceHandle, VirtualSpaceRegistry,
};
