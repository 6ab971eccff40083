//! Studio Nodes
//!
//! Built-in node definitions for the Easel canvas. Each node lives in its
//! own module and declares a single `definition()` describing its ports,
//! palette metadata, and behavior kind; definitions are collected at link
//! time through `inventory` and can also be registered explicitly.
//!
//! # Categories
//!
//! - **Input**: Local value sources (typed text, model file names)
//! - **Llm**: Generation nodes backed by the configured services
//! - **Display**: Read-only sinks that render connected values
//! - **Creative**: The freehand sketch surface
//! - **Utility**: Prompt assembly
//! - **Specialist**: Templated agents driven by prompt templates

pub mod creative;
pub mod display;
pub mod input;
pub mod llm;
pub mod specialist;
pub mod utility;

use canvas_engine::NodeCatalog;

/// Register every built-in definition into a catalog
///
/// Equivalent to `NodeCatalog::with_builtins()` when this crate is linked,
/// but usable on a catalog that already holds other entries.
pub fn register_all(catalog: &mut NodeCatalog) {
    catalog.register(input::text_input::definition());
    catalog.register(input::model_file_selector::definition());
    catalog.register(llm::llm_prompt::definition());
    catalog.register(llm::local_llm_prompt::definition());
    catalog.register(llm::image_generator::definition());
    catalog.register(display::display_data::definition());
    catalog.register(display::display_image::definition());
    catalog.register(display::display_text::definition());
    catalog.register(creative::sketchpad::definition());
    catalog.register(utility::prompt_assembler::definition());
    catalog.register(specialist::data_adapter::definition());
    catalog.register(specialist::git_manager::definition());
    catalog.register(specialist::sentiment_analyzer::definition());
    catalog.register(specialist::prompt_refiner::definition());
    catalog.register(specialist::concept_explainer::definition());
}

#[cfg(test)]
mod tests {
    use canvas_engine::NodeCatalog;

    #[test]
    fn test_inventory_collects_all_builtins() {
        let catalog = NodeCatalog::with_builtins();
        let all = catalog.all();
        assert_eq!(all.len(), 15, "Expected 15 built-in definitions");

        // Spot-check known types
        assert!(catalog.get("Text Input").is_some());
        assert!(catalog.get("LLM Prompt").is_some());
        assert!(catalog.get("Image Generator").is_some());
        assert!(catalog.get("Sketchpad").is_some());
        assert!(catalog.get("Universal Data Adapter").is_some());
    }

    #[test]
    fn test_register_all_matches_inventory() {
        let mut explicit = NodeCatalog::new();
        super::register_all(&mut explicit);
        let collected = NodeCatalog::with_builtins();
        assert_eq!(explicit.all().len(), collected.all().len());
    }
}
