//! Creative nodes

pub mod sketchpad;
