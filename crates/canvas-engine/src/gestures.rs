//! Pointer gesture disambiguation
//!
//! A single state machine turns raw pointer events into canvas intents:
//! panning the view, dragging a node, resizing a node, or dragging a wire
//! out of an output port. The host classifies what sits under the pointer
//! (hit testing is a rendering concern); this module owns the rules for
//! which gesture wins and how motion maps between coordinate spaces.
//!
//! While the drawing lock is held, every gesture is suppressed except
//! interaction with the holder's own drawing surface, which the holder
//! handles itself.

use crate::geometry::port_anchor_viewport;
use crate::types::{
    CanvasDocument, DataKind, NodeId, Point, PortId, PortRole, ViewTransform, MIN_NODE_HEIGHT,
    MIN_NODE_WIDTH,
};

/// What the host found under the pointer
#[derive(Debug, Clone, PartialEq)]
pub enum PointerTarget {
    /// Empty canvas
    Background,
    /// A node's title bar
    NodeHeader { node_id: NodeId },
    /// A node's body, outside any widget
    NodeBody { node_id: NodeId },
    /// A node's resize handle
    ResizeHandle { node_id: NodeId },
    /// An output port pill
    OutputPort { node_id: NodeId, port_id: PortId },
    /// An input port pill
    InputPort { node_id: NodeId, port_id: PortId },
    /// The drawing surface of a sketch node
    ExclusiveSurface { node_id: NodeId },
    /// An interactive widget (button, text field, picker) that handles its
    /// own input
    Control,
}

/// Which pointer button went down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Middle,
    Right,
}

/// The gesture currently in flight
#[derive(Debug, Clone, PartialEq)]
pub enum GestureState {
    Idle,
    /// Translating the view; the translation follows the total viewport
    /// delta from the press point
    Panning {
        start_cursor: Point,
        start_transform: ViewTransform,
    },
    /// Moving a node; the node follows the world-space cursor delta
    DraggingNode {
        node_id: NodeId,
        start_world_cursor: Point,
        start_node_pos: Point,
    },
    /// Resizing a node; the viewport delta is divided by the scale and
    /// clamped to the minimum size
    ResizingNode {
        node_id: NodeId,
        start_cursor: Point,
        start_width: f64,
        start_height: f64,
    },
    /// Dragging a wire out of an output port
    ConnectingEdge {
        source_node_id: NodeId,
        source_output_id: PortId,
        source_kind: DataKind,
        start_anchor: Point,
        current_end: Point,
    },
}

/// A document mutation requested by pointer motion
#[derive(Debug, Clone, PartialEq)]
pub enum GestureUpdate {
    /// Replace the view transform
    Pan { transform: ViewTransform },
    /// Move a node to a new world position
    MoveNode { node_id: NodeId, x: f64, y: f64 },
    /// Resize a node
    ResizeNode {
        node_id: NodeId,
        width: f64,
        height: f64,
    },
}

/// A connection requested by releasing a wire over an input port. The
/// store still validates kinds and applies the single-incoming-edge rule;
/// the gesture layer only reports where the wire was dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectRequest {
    pub source_node_id: NodeId,
    pub source_output_id: PortId,
    pub target_node_id: NodeId,
    pub target_input_id: PortId,
}

/// The pointer gesture state machine
#[derive(Debug, Default)]
pub struct GestureController {
    state: GestureState,
}

impl Default for GestureState {
    fn default() -> Self {
        GestureState::Idle
    }
}

impl GestureController {
    pub fn new() -> Self {
        Self {
            state: GestureState::Idle,
        }
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, GestureState::Idle)
    }

    /// Abandon any gesture in flight
    pub fn cancel(&mut self) {
        self.state = GestureState::Idle;
    }

    /// The wire being dragged, as (source anchor, cursor) viewport points
    pub fn pending_wire(&self) -> Option<(Point, Point)> {
        match &self.state {
            GestureState::ConnectingEdge {
                start_anchor,
                current_end,
                ..
            } => Some((*start_anchor, *current_end)),
            _ => None,
        }
    }

    /// Feed a pointer press. Decides which gesture, if any, begins.
    ///
    /// Priority: a held drawing lock swallows everything aimed anywhere but
    /// the holder's own surface; then resize handles beat output ports beat
    /// node headers beat background panning. Input ports, node bodies, and
    /// controls never start a gesture.
    pub fn pointer_down(
        &mut self,
        target: &PointerTarget,
        cursor: Point,
        button: PointerButton,
        document: &CanvasDocument,
        transform: &ViewTransform,
        lock_holder: Option<&str>,
    ) {
        if let Some(holder) = lock_holder {
            match target {
                PointerTarget::ExclusiveSurface { node_id } if node_id == holder => {
                    // The holder's surface handles its own strokes
                }
                _ => {
                    // Everything else is swallowed, including any gesture
                    // that was somehow still in flight
                    self.state = GestureState::Idle;
                }
            }
            return;
        }

        match target {
            PointerTarget::ResizeHandle { node_id } => {
                if let Some(node) = document.find_node(node_id) {
                    self.state = GestureState::ResizingNode {
                        node_id: node.id.clone(),
                        start_cursor: cursor,
                        start_width: node.width,
                        start_height: node.height,
                    };
                }
            }
            PointerTarget::OutputPort { node_id, port_id } => {
                if let Some(node) = document.find_node(node_id) {
                    if let Some(index) = node.outputs.iter().position(|p| &p.id == port_id) {
                        let anchor =
                            port_anchor_viewport(node, PortRole::Output, index, transform);
                        self.state = GestureState::ConnectingEdge {
                            source_node_id: node.id.clone(),
                            source_output_id: port_id.clone(),
                            source_kind: node.outputs[index].data_kind,
                            start_anchor: anchor,
                            current_end: cursor,
                        };
                    }
                }
            }
            PointerTarget::NodeHeader { node_id } => {
                if let Some(node) = document.find_node(node_id) {
                    self.state = GestureState::DraggingNode {
                        node_id: node.id.clone(),
                        start_world_cursor: transform.viewport_to_world(cursor),
                        start_node_pos: Point::new(node.x, node.y),
                    };
                }
            }
            PointerTarget::Background => {
                if button == PointerButton::Left {
                    self.state = GestureState::Panning {
                        start_cursor: cursor,
                        start_transform: *transform,
                    };
                }
            }
            // Widgets, input ports, node bodies, and idle drawing surfaces
            // handle their own input
            PointerTarget::InputPort { .. }
            | PointerTarget::NodeBody { .. }
            | PointerTarget::ExclusiveSurface { .. }
            | PointerTarget::Control => {}
        }
    }

    /// Feed pointer motion. Returns the mutation the host should apply, if
    /// any. Motion is inert while the drawing lock is held.
    pub fn pointer_move(
        &mut self,
        cursor: Point,
        transform: &ViewTransform,
        lock_held: bool,
    ) -> Option<GestureUpdate> {
        if lock_held {
            return None;
        }

        match &mut self.state {
            GestureState::Idle => None,
            GestureState::Panning {
                start_cursor,
                start_transform,
            } => Some(GestureUpdate::Pan {
                transform: start_transform
                    .panned_by(cursor.x - start_cursor.x, cursor.y - start_cursor.y),
            }),
            GestureState::DraggingNode {
                node_id,
                start_world_cursor,
                start_node_pos,
            } => {
                let world_cursor = transform.viewport_to_world(cursor);
                Some(GestureUpdate::MoveNode {
                    node_id: node_id.clone(),
                    x: start_node_pos.x + (world_cursor.x - start_world_cursor.x),
                    y: start_node_pos.y + (world_cursor.y - start_world_cursor.y),
                })
            }
            GestureState::ResizingNode {
                node_id,
                start_cursor,
                start_width,
                start_height,
            } => {
                let dx = (cursor.x - start_cursor.x) / transform.k;
                let dy = (cursor.y - start_cursor.y) / transform.k;
                Some(GestureUpdate::ResizeNode {
                    node_id: node_id.clone(),
                    width: (*start_width + dx).max(MIN_NODE_WIDTH),
                    height: (*start_height + dy).max(MIN_NODE_HEIGHT),
                })
            }
            GestureState::ConnectingEdge { current_end, .. } => {
                *current_end = cursor;
                None
            }
        }
    }

    /// Feed a pointer release. A wire released over an input port becomes a
    /// connection request; everything else just ends the gesture. The
    /// gesture always ends, lock or no lock, but a held lock prevents the
    /// connection from completing.
    pub fn pointer_up(
        &mut self,
        target: Option<&PointerTarget>,
        lock_held: bool,
    ) -> Option<ConnectRequest> {
        let state = std::mem::replace(&mut self.state, GestureState::Idle);

        if lock_held {
            return None;
        }

        if let GestureState::ConnectingEdge {
            source_node_id,
            source_output_id,
            ..
        } = state
        {
            if let Some(PointerTarget::InputPort { node_id, port_id }) = target {
                return Some(ConnectRequest {
                    source_node_id,
                    source_output_id,
                    target_node_id: node_id.clone(),
                    target_input_id: port_id.clone(),
                });
            }
        }
        None
    }

    /// The pointer left the canvas: treated as a release over nothing
    pub fn pointer_leave(&mut self) -> Option<ConnectRequest> {
        self.pointer_up(None, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BuiltInKind, NodeData, NodeKind, NodeStatus, Port};

    fn node_at(id: &str, x: f64, y: f64) -> NodeData {
        NodeData {
            id: id.to_string(),
            kind: NodeKind::built_in(BuiltInKind::TextInput),
            type_name: "Text Input".to_string(),
            name: "Text Input".to_string(),
            x,
            y,
            width: 220.0,
            height: 100.0,
            inputs: vec![Port {
                id: "in".to_string(),
                name: "In".to_string(),
                role: PortRole::Input,
                data_kind: DataKind::Any,
                example_value: None,
            }],
            outputs: vec![Port {
                id: "out".to_string(),
                name: "Out".to_string(),
                role: PortRole::Output,
                data_kind: DataKind::Text,
                example_value: None,
            }],
            data: Default::default(),
            web_augmentation: false,
            status: NodeStatus::Idle,
            error: None,
            execution_time: None,
            color: "bg-sky-600".to_string(),
            icon: "i-cursor".to_string(),
            category: "Input".to_string(),
        }
    }

    fn doc_with(nodes: Vec<NodeData>) -> CanvasDocument {
        CanvasDocument {
            nodes,
            edges: Vec::new(),
        }
    }

    #[test]
    fn test_background_press_starts_pan() {
        let doc = doc_with(vec![]);
        let transform = ViewTransform::default();
        let mut gestures = GestureController::new();

        gestures.pointer_down(
            &PointerTarget::Background,
            Point::new(10.0, 10.0),
            PointerButton::Left,
            &doc,
            &transform,
            None,
        );
        let update = gestures.pointer_move(Point::new(40.0, -5.0), &transform, false);

        match update {
            Some(GestureUpdate::Pan { transform: t }) => {
                assert_eq!(t.x, 150.0 + 30.0);
                assert_eq!(t.y, 100.0 - 15.0);
                assert_eq!(t.k, 1.0);
            }
            other => panic!("expected pan, got {other:?}"),
        }
    }

    #[test]
    fn test_middle_button_does_not_pan() {
        let doc = doc_with(vec![]);
        let mut gestures = GestureController::new();
        gestures.pointer_down(
            &PointerTarget::Background,
            Point::new(0.0, 0.0),
            PointerButton::Middle,
            &doc,
            &ViewTransform::default(),
            None,
        );
        assert!(gestures.is_idle());
    }

    #[test]
    fn test_header_drag_moves_node_by_world_delta() {
        let doc = doc_with(vec![node_at("a", 100.0, 100.0)]);
        let transform = ViewTransform {
            x: 0.0,
            y: 0.0,
            k: 1.0,
        };
        let mut gestures = GestureController::new();

        gestures.pointer_down(
            &PointerTarget::NodeHeader {
                node_id: "a".to_string(),
            },
            Point::new(200.0, 200.0),
            PointerButton::Left,
            &doc,
            &transform,
            None,
        );
        let update = gestures.pointer_move(Point::new(250.0, 180.0), &transform, false);

        assert_eq!(
            update,
            Some(GestureUpdate::MoveNode {
                node_id: "a".to_string(),
                x: 150.0,
                y: 80.0,
            })
        );
    }

    #[test]
    fn test_drag_scales_with_zoom() {
        let doc = doc_with(vec![node_at("a", 100.0, 100.0)]);
        let transform = ViewTransform {
            x: 0.0,
            y: 0.0,
            k: 2.0,
        };
        let mut gestures = GestureController::new();

        gestures.pointer_down(
            &PointerTarget::NodeHeader {
                node_id: "a".to_string(),
            },
            Point::new(200.0, 200.0),
            PointerButton::Left,
            &doc,
            &transform,
            None,
        );
        let update = gestures.pointer_move(Point::new(250.0, 180.0), &transform, false);

        // The same 50,-20 viewport motion covers half the world distance
        assert_eq!(
            update,
            Some(GestureUpdate::MoveNode {
                node_id: "a".to_string(),
                x: 125.0,
                y: 90.0,
            })
        );
    }

    #[test]
    fn test_resize_clamps_to_minimum() {
        let doc = doc_with(vec![node_at("a", 0.0, 0.0)]);
        let transform = ViewTransform {
            x: 0.0,
            y: 0.0,
            k: 1.0,
        };
        let mut gestures = GestureController::new();

        gestures.pointer_down(
            &PointerTarget::ResizeHandle {
                node_id: "a".to_string(),
            },
            Point::new(0.0, 0.0),
            PointerButton::Left,
            &doc,
            &transform,
            None,
        );
        let update = gestures.pointer_move(Point::new(-500.0, -500.0), &transform, false);

        assert_eq!(
            update,
            Some(GestureUpdate::ResizeNode {
                node_id: "a".to_string(),
                width: MIN_NODE_WIDTH,
                height: MIN_NODE_HEIGHT,
            })
        );
    }

    #[test]
    fn test_wire_completes_over_input_port() {
        let doc = doc_with(vec![node_at("a", 0.0, 0.0), node_at("b", 400.0, 0.0)]);
        let transform = ViewTransform::default();
        let mut gestures = GestureController::new();

        gestures.pointer_down(
            &PointerTarget::OutputPort {
                node_id: "a".to_string(),
                port_id: "out".to_string(),
            },
            Point::new(120.0, 80.0),
            PointerButton::Left,
            &doc,
            &transform,
            None,
        );
        assert!(gestures.pending_wire().is_some());

        gestures.pointer_move(Point::new(300.0, 90.0), &transform, false);
        let request = gestures.pointer_up(
            Some(&PointerTarget::InputPort {
                node_id: "b".to_string(),
                port_id: "in".to_string(),
            }),
            false,
        );

        assert_eq!(
            request,
            Some(ConnectRequest {
                source_node_id: "a".to_string(),
                source_output_id: "out".to_string(),
                target_node_id: "b".to_string(),
                target_input_id: "in".to_string(),
            })
        );
        assert!(gestures.is_idle());
    }

    #[test]
    fn test_wire_dropped_on_background_is_discarded() {
        let doc = doc_with(vec![node_at("a", 0.0, 0.0)]);
        let mut gestures = GestureController::new();

        gestures.pointer_down(
            &PointerTarget::OutputPort {
                node_id: "a".to_string(),
                port_id: "out".to_string(),
            },
            Point::new(120.0, 80.0),
            PointerButton::Left,
            &doc,
            &ViewTransform::default(),
            None,
        );
        let request = gestures.pointer_up(Some(&PointerTarget::Background), false);

        assert_eq!(request, None);
        assert!(gestures.is_idle());
    }

    #[test]
    fn test_pointer_leave_cancels_wire() {
        let doc = doc_with(vec![node_at("a", 0.0, 0.0)]);
        let mut gestures = GestureController::new();

        gestures.pointer_down(
            &PointerTarget::OutputPort {
                node_id: "a".to_string(),
                port_id: "out".to_string(),
            },
            Point::new(120.0, 80.0),
            PointerButton::Left,
            &doc,
            &ViewTransform::default(),
            None,
        );
        assert_eq!(gestures.pointer_leave(), None);
        assert!(gestures.is_idle());
    }

    #[test]
    fn test_lock_swallows_presses_elsewhere() {
        let doc = doc_with(vec![node_at("sketch", 0.0, 0.0), node_at("b", 400.0, 0.0)]);
        let transform = ViewTransform::default();
        let mut gestures = GestureController::new();

        // In-flight pan gets cancelled by a locked press
        gestures.pointer_down(
            &PointerTarget::Background,
            Point::new(0.0, 0.0),
            PointerButton::Left,
            &doc,
            &transform,
            None,
        );
        gestures.pointer_down(
            &PointerTarget::NodeHeader {
                node_id: "b".to_string(),
            },
            Point::new(10.0, 10.0),
            PointerButton::Left,
            &doc,
            &transform,
            Some("sketch"),
        );
        assert!(gestures.is_idle());

        // Presses on the holder's own surface pass through untouched
        gestures.pointer_down(
            &PointerTarget::ExclusiveSurface {
                node_id: "sketch".to_string(),
            },
            Point::new(10.0, 10.0),
            PointerButton::Left,
            &doc,
            &transform,
            Some("sketch"),
        );
        assert!(gestures.is_idle());
    }

    #[test]
    fn test_lock_freezes_motion_and_completion() {
        let doc = doc_with(vec![node_at("a", 100.0, 100.0), node_at("b", 400.0, 0.0)]);
        let transform = ViewTransform::default();
        let mut gestures = GestureController::new();

        gestures.pointer_down(
            &PointerTarget::OutputPort {
                node_id: "a".to_string(),
                port_id: "out".to_string(),
            },
            Point::new(120.0, 80.0),
            PointerButton::Left,
            &doc,
            &transform,
            None,
        );

        // Lock lands mid-gesture: motion is inert, release completes nothing
        assert_eq!(gestures.pointer_move(Point::new(1.0, 1.0), &transform, true), None);
        let request = gestures.pointer_up(
            Some(&PointerTarget::InputPort {
                node_id: "b".to_string(),
                port_id: "in".to_string(),
            }),
            true,
        );
        assert_eq!(request, None);
        assert!(gestures.is_idle());
    }

    #[test]
    fn test_controls_and_input_ports_start_nothing() {
        let doc = doc_with(vec![node_at("a", 0.0, 0.0)]);
        let transform = ViewTransform::default();
        let mut gestures = GestureController::new();

        for target in [
            PointerTarget::Control,
            PointerTarget::NodeBody {
                node_id: "a".to_string(),
            },
            PointerTarget::InputPort {
                node_id: "a".to_string(),
                port_id: "in".to_string(),
            },
        ] {
            gestures.pointer_down(
                &target,
                Point::new(5.0, 5.0),
                PointerButton::Left,
                &doc,
                &transform,
                None,
            );
            assert!(gestures.is_idle(), "{target:?}");
        }
    }
}
