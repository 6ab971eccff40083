//! Local Model File Selector
//!
//! Emits the file name of a locally picked model so generation nodes can
//! forward it as a model identifier. Executing without a selection is an
//! error; the literal placeholder "None" passes through untouched.

use canvas_engine::{BuiltInKind, DataKind, DefinitionFn, NodeDefinition, PortSpec};

/// Port ID for the emitted model identifier
pub const PORT_MODEL_IDENTIFIER_OUT: &str = "model_identifier_out";

pub fn definition() -> NodeDefinition {
    NodeDefinition::built_in(
        "Local Model File Selector",
        "Selects a local model file and outputs its name.",
        BuiltInKind::ModelFileSelector,
    )
    .with_output(PortSpec::new(
        PORT_MODEL_IDENTIFIER_OUT,
        "Model Identifier",
        DataKind::Text,
    ))
    .with_color("bg-gray-600")
    .with_icon("📂")
    .with_category("Input")
}

inventory::submit!(DefinitionFn(definition));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_shape() {
        let def = definition();
        assert_eq!(def.kind.built_in_tag(), Some(BuiltInKind::ModelFileSelector));
        assert_eq!(def.outputs[0].id, PORT_MODEL_IDENTIFIER_OUT);
        assert_eq!(def.outputs[0].data_kind, DataKind::Text);
    }
}
