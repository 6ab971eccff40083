//! Display nodes: read-only sinks that render connected values
//!
//! Display kinds execute as no-ops and never auto-refresh; they show
//! whatever propagation last copied into their input.

pub mod display_data;
pub mod display_image;
pub mod display_text;
