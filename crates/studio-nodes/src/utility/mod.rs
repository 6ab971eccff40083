//! Utility nodes

pub mod prompt_assembler;
