//! Document validation
//!
//! Structural checks run before a document is loaded into a store.
//! Validation collects every issue found rather than stopping at the
//! first, so a caller can report all of them at once. Issues are split
//! into hard ones (the document cannot be loaded safely) and soft ones
//! (the document loads but some node will fail at execution time).

use std::collections::HashSet;

use crate::types::{CanvasDocument, NodeKind};

/// A structural problem found in a document
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    /// Two nodes share the same id
    DuplicateNodeId { node_id: String },
    /// Two edges share the same id
    DuplicateEdgeId { edge_id: String },
    /// An edge references a node that does not exist
    UnknownNode { edge_id: String, node_id: String },
    /// An edge references a port missing from its node's declared side
    UnknownPort {
        edge_id: String,
        node_id: String,
        port_id: String,
    },
    /// An edge carries a value between incompatible kinds
    IncompatibleEdgeKinds {
        edge_id: String,
        source_kind: String,
        target_kind: String,
    },
    /// More than one edge feeds the same input
    DuplicateTargetInput { node_id: String, port_id: String },
    /// A templated node has no template and will fail when executed
    MissingTemplate { node_id: String },
}

impl ValidationIssue {
    /// Hard issues make a document unloadable; soft ones merely predict a
    /// runtime node failure
    pub fn is_hard(&self) -> bool {
        !matches!(self, Self::MissingTemplate { .. })
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateNodeId { node_id } => {
                write!(f, "Duplicate node id '{}'", node_id)
            }
            Self::DuplicateEdgeId { edge_id } => {
                write!(f, "Duplicate edge id '{}'", edge_id)
            }
            Self::UnknownNode { edge_id, node_id } => {
                write!(f, "Edge '{}' references unknown node '{}'", edge_id, node_id)
            }
            Self::UnknownPort {
                edge_id,
                node_id,
                port_id,
            } => {
                write!(
                    f,
                    "Edge '{}' references unknown port '{}' on node '{}'",
                    edge_id, port_id, node_id
                )
            }
            Self::IncompatibleEdgeKinds {
                edge_id,
                source_kind,
                target_kind,
            } => {
                write!(
                    f,
                    "Edge '{}' connects incompatible kinds: {} -> {}",
                    edge_id, source_kind, target_kind
                )
            }
            Self::DuplicateTargetInput { node_id, port_id } => {
                write!(
                    f,
                    "Input '{}' on node '{}' is fed by more than one edge",
                    port_id, node_id
                )
            }
            Self::MissingTemplate { node_id } => {
                write!(
                    f,
                    "Templated node '{}' has no template and cannot execute",
                    node_id
                )
            }
        }
    }
}

/// Validate a document's structure
///
/// Returns all issues found (not just the first).
pub fn validate_document(document: &CanvasDocument) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    validate_unique_ids(document, &mut issues);
    validate_edges(document, &mut issues);
    validate_templates(document, &mut issues);

    issues
}

/// Check node and edge ids for duplicates
fn validate_unique_ids(document: &CanvasDocument, issues: &mut Vec<ValidationIssue>) {
    let mut node_ids = HashSet::new();
    for node in &document.nodes {
        if !node_ids.insert(node.id.as_str()) {
            issues.push(ValidationIssue::DuplicateNodeId {
                node_id: node.id.clone(),
            });
        }
    }

    let mut edge_ids = HashSet::new();
    for edge in &document.edges {
        if !edge_ids.insert(edge.id.as_str()) {
            issues.push(ValidationIssue::DuplicateEdgeId {
                edge_id: edge.id.clone(),
            });
        }
    }
}

/// Check that every edge names existing endpoints on the proper sides,
/// that kinds are compatible, and that no input is fed twice
fn validate_edges(document: &CanvasDocument, issues: &mut Vec<ValidationIssue>) {
    let mut fed_inputs: HashSet<(&str, &str)> = HashSet::new();

    for edge in &document.edges {
        let source = document.find_node(&edge.source_node_id);
        let target = document.find_node(&edge.target_node_id);

        if source.is_none() {
            issues.push(ValidationIssue::UnknownNode {
                edge_id: edge.id.clone(),
                node_id: edge.source_node_id.clone(),
            });
        }
        if target.is_none() {
            issues.push(ValidationIssue::UnknownNode {
                edge_id: edge.id.clone(),
                node_id: edge.target_node_id.clone(),
            });
        }

        let source_port = source.and_then(|n| n.output(&edge.source_output_id));
        let target_port = target.and_then(|n| n.input(&edge.target_input_id));

        if source.is_some() && source_port.is_none() {
            issues.push(ValidationIssue::UnknownPort {
                edge_id: edge.id.clone(),
                node_id: edge.source_node_id.clone(),
                port_id: edge.source_output_id.clone(),
            });
        }
        if target.is_some() && target_port.is_none() {
            issues.push(ValidationIssue::UnknownPort {
                edge_id: edge.id.clone(),
                node_id: edge.target_node_id.clone(),
                port_id: edge.target_input_id.clone(),
            });
        }

        if let (Some(source_port), Some(target_port)) = (source_port, target_port) {
            if !source_port.data_kind.is_compatible_with(&target_port.data_kind) {
                issues.push(ValidationIssue::IncompatibleEdgeKinds {
                    edge_id: edge.id.clone(),
                    source_kind: source_port.data_kind.as_str().to_string(),
                    target_kind: target_port.data_kind.as_str().to_string(),
                });
            }
        }

        if !fed_inputs.insert((edge.target_node_id.as_str(), edge.target_input_id.as_str())) {
            issues.push(ValidationIssue::DuplicateTargetInput {
                node_id: edge.target_node_id.clone(),
                port_id: edge.target_input_id.clone(),
            });
        }
    }
}

/// Flag templated nodes that can never execute
fn validate_templates(document: &CanvasDocument, issues: &mut Vec<ValidationIssue>) {
    for node in &document.nodes {
        if let NodeKind::Templated { spec } = &node.kind {
            if spec.template.trim().is_empty() {
                issues.push(ValidationIssue::MissingTemplate {
                    node_id: node.id.clone(),
                });
            }
        }
    }
}
