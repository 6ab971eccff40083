//! Universal Data Adapter
//!
//! The bridge between incompatible ports: converts whatever arrives on its
//! wildcard input into the shape the downstream port expects. The template
//! is filled with the target port's declared kind and names, discovered
//! from the adapter's first outgoing edge at execution time.

use canvas_engine::{DataKind, DefinitionFn, NodeDefinition, PortSpec, TemplateSpec};

pub const PORT_INPUT_DATA: &str = "input_data";
pub const PORT_OUTPUT_DATA: &str = "output_data";

const TEMPLATE: &str = r#"You are an intelligent data transformation AI.
Input Data (received as a string, likely JSON.stringified if complex):
{input_data_stringified}

Target Data Type Context:
The data needs to be transformed to be compatible with a target port named "{target_port_name}" on a node named "{target_node_name}" (type: "{target_node_type}"), which expects data of type: "{target_data_type}".

Your task is to convert the "Input Data" into a format suitable for this "Target Data Type Context".

Follow these guidelines:
1.  If the input data seems already compatible with the target type (e.g., input is a number string "123", target is 'number'), perform a direct conversion.
2.  For 'text' target: If input is an object/array, provide a concise JSON string representation or a human-readable summary. If it's a number/boolean, convert to string.
3.  For 'number' target: If input is a string that represents a number, parse it. If it's a boolean, true becomes 1, false becomes 0. If not possible to convert, indicate an error.
4.  For 'boolean' target: Interpret common string representations ('true', 'false', '1', '0', 'yes', 'no', 'on', 'off') as boolean. Numbers: 0 is false, non-zero is true.
5.  For 'json' target: If input is a string, try to parse it as JSON. If it's already an object/array, it's compatible. If it's a simple type (number, string, boolean), you can wrap it (e.g., {"value": data}).
6.  For 'image' target: If input is a base64 image string (starts with 'data:image/...;base64,'), pass it through. Otherwise, this transformation is not supported by default unless the input is text that clearly describes an image to be generated (which is out of scope for basic transformation).
7.  For 'any' target: Pass the input data through as is.
8.  If a direct or meaningful transformation is not possible, or if the request is ambiguous, you MUST explain the issue clearly.

Output your response as a single, valid JSON object with one key: "output_data".
The value of "output_data" should be the transformed data.
If an error occurs or transformation is not possible, the value of "output_data" should be an object like: {"error": "Detailed error message explaining why transformation failed.", "original_input_type_detected": "type_of_input_data_you_detected", "requested_target_type": "{target_data_type}"}.

Example of successful transformation (object to text):
Input Data: {"name": "Test", "value": 10} (will be stringified in the prompt)
Target Data Type Context: "text" for port "text_in" on node "Display Text"
Output: {"output_data": "{\"name\":\"Test\",\"value\":10}"} or {"output_data": "Name: Test, Value: 10"}

Example of failed transformation (text "abc" to number):
Input Data: "abc"
Target Data Type Context: "number" for port "num_in" on node "Math Node"
Output: {"output_data": {"error": "Cannot convert the text 'abc' to a number.", "original_input_type_detected": "text", "requested_target_type": "number"}}

Ensure your entire response is ONLY this JSON object."#;

pub fn definition() -> NodeDefinition {
    NodeDefinition::templated(
        "Universal Data Adapter",
        "Adapts data from any input type to any output type using AI-driven transformation. Useful for connecting nodes with incompatible data formats.",
        TemplateSpec::new(TEMPLATE).adapting_to_target(),
    )
    .with_input(
        PortSpec::new(PORT_INPUT_DATA, "Input Data", DataKind::Any)
            .with_example(serde_json::json!({ "message": "Hello", "count": 42 })),
    )
    .with_output(PortSpec::new(PORT_OUTPUT_DATA, "Output Data", DataKind::Any))
    .with_color("bg-indigo-500")
    .with_icon("🪄")
    .with_category("Utility")
}

inventory::submit!(DefinitionFn(definition));

#[cfg(test)]
mod tests {
    use super::*;
    use canvas_engine::NodeKind;

    #[test]
    fn test_marks_adapter_specialization() {
        let def = definition();
        match &def.kind {
            NodeKind::Templated { spec } => {
                assert!(spec.adapts_to_target);
                assert!(spec.template.contains("{target_data_type}"));
                assert!(spec.template.contains("{input_data_stringified}"));
            }
            NodeKind::BuiltIn { .. } => panic!("adapter must be templated"),
        }
    }

    #[test]
    fn test_wildcard_ports() {
        let def = definition();
        assert_eq!(def.inputs[0].data_kind, DataKind::Any);
        assert_eq!(def.outputs[0].data_kind, DataKind::Any);
    }
}
