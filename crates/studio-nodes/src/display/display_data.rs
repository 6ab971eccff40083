//! Display Data

use canvas_engine::{BuiltInKind, DataKind, DefinitionFn, NodeDefinition, PortSpec};

pub const PORT_DATA_IN: &str = "data_in";

pub fn definition() -> NodeDefinition {
    NodeDefinition::built_in(
        "Display Data",
        "Displays any connected data, formatting objects/arrays as JSON.",
        BuiltInKind::DisplayData,
    )
    .with_input(PortSpec::new(PORT_DATA_IN, "Data", DataKind::Any))
    .with_color("bg-green-600")
    .with_icon("📺")
    .with_category("Display")
}

inventory::submit!(DefinitionFn(definition));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_any_kind() {
        let def = definition();
        assert_eq!(def.inputs[0].data_kind, DataKind::Any);
        assert!(def.outputs.is_empty());
        assert!(!def.kind.is_auto_reactive());
    }
}
