//! Input nodes: local value sources with no upstream dependencies

pub mod model_file_selector;
pub mod text_input;
