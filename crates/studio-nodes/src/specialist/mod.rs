//! Specialist agents: templated nodes driven by prompt templates
//!
//! These ship with the catalog but behave exactly like agents defined at
//! runtime: a prompt template with `{port_id}` placeholders, filled from
//! the node's inputs and sent to the text service. Agents with more than
//! one output demand a JSON-object reply keyed by output port id.

pub mod concept_explainer;
pub mod data_adapter;
pub mod git_manager;
pub mod prompt_refiner;
pub mod sentiment_analyzer;
