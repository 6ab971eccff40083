//! Git Manager
//!
//! Translates a natural-language description of a Git action into the
//! equivalent command(s). Two outputs, so the template demands the
//! JSON-object reply contract.

use canvas_engine::{DataKind, DefinitionFn, NodeDefinition, PortSpec, TemplateSpec};

pub const PORT_ACTION_DESCRIPTION_IN: &str = "git_action_description_in";
pub const PORT_REPOSITORY_CONTEXT_IN: &str = "repository_context_in";
pub const PORT_GIT_COMMAND_OUT: &str = "git_command_out";
pub const PORT_ACTION_RESULT_OUT: &str = "action_result_description_out";

const TEMPLATE: &str = r#"You are a Git Command Assistant.
User's desired Git action: "{git_action_description_in}"
Optional repository context: "{repository_context_in}"

Your task is to:
1. Translate the user's desired action into the appropriate Git command(s). If multiple commands are typically needed (e.g., for a commit), list them.
2. Briefly describe the expected outcome or status after these commands are conceptually executed in the given context.

Return your response as a single, valid JSON object with two keys:
- "git_command_out": A string containing the Git command(s). Use one command per line if multiple.
- "action_result_description_out": A concise string describing the expected result.

Example:
Action: "Create a new branch called 'feature/new-login' and switch to it"
Context: "On 'develop' branch"
Output:
{
  "git_command_out": "git checkout -b feature/new-login",
  "action_result_description_out": "A new branch named 'feature/new-login' will be created from the current branch ('develop'), and your HEAD will be switched to 'feature/new-login'."
}

Action: "Add all new and modified files to staging"
Context: (empty)
Output:
{
  "git_command_out": "git add .",
  "action_result_description_out": "All new and modified files in the current directory and its subdirectories will be staged for the next commit."
}

Provide ONLY the JSON response."#;

pub fn definition() -> NodeDefinition {
    NodeDefinition::templated(
        "Git Manager",
        "Translates natural language to Git commands. Describes conceptual Git operations.",
        TemplateSpec::new(TEMPLATE),
    )
    .with_input(
        PortSpec::new(
            PORT_ACTION_DESCRIPTION_IN,
            "Git Action Description",
            DataKind::Text,
        )
        .with_example(serde_json::json!(
            "Commit all changes with message 'Updated README'"
        )),
    )
    .with_input(
        PortSpec::new(
            PORT_REPOSITORY_CONTEXT_IN,
            "Repo Context (opt.)",
            DataKind::Text,
        )
        .with_example(serde_json::json!(
            "Currently on 'main' branch. Remote 'origin' exists."
        )),
    )
    .with_output(PortSpec::new(
        PORT_GIT_COMMAND_OUT,
        "Equivalent Git Command(s)",
        DataKind::Text,
    ))
    .with_output(PortSpec::new(
        PORT_ACTION_RESULT_OUT,
        "Expected Result/Status",
        DataKind::Text,
    ))
    .with_color("bg-orange-700")
    .with_icon("🌿")
    .with_category("Utility / Version Control")
}

inventory::submit!(DefinitionFn(definition));
