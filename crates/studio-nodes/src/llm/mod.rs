//! Generation nodes backed by the configured text and image services

pub mod image_generator;
pub mod llm_prompt;
pub mod local_llm_prompt;
