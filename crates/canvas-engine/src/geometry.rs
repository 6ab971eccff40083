//! Canvas geometry: view transforms and port anchors
//!
//! All placement math lives here. The view transform maps world space to
//! viewport space as `v = w * k + t`; everything else (port anchor layout,
//! cursor-anchored zoom) is derived from that one equation so the rest of
//! the engine never does coordinate arithmetic of its own.

use crate::types::{
    NodeData, Point, PortRole, ViewTransform, ERROR_FOOTER_HEIGHT, MAX_ZOOM, MIN_ZOOM,
    NODE_HEADER_HEIGHT, NODE_PADDING_Y, PORT_PILL_GAP, PORT_PILL_HEIGHT, PORT_SPACING,
    TIMING_FOOTER_HEIGHT, ZOOM_SENSITIVITY,
};

impl ViewTransform {
    /// Map a world-space point into viewport space
    pub fn world_to_viewport(&self, p: Point) -> Point {
        Point::new(p.x * self.k + self.x, p.y * self.k + self.y)
    }

    /// Map a viewport-space point into world space
    pub fn viewport_to_world(&self, p: Point) -> Point {
        Point::new((p.x - self.x) / self.k, (p.y - self.y) / self.k)
    }

    /// Translate the viewport by a viewport-space delta (panning)
    pub fn panned_by(&self, dx: f64, dy: f64) -> ViewTransform {
        ViewTransform {
            x: self.x + dx,
            y: self.y + dy,
            k: self.k,
        }
    }

    /// Zoom by a wheel delta, keeping the world point under the cursor
    /// fixed on screen. The scale factor is exponential in the scroll
    /// amount and the result is clamped to [MIN_ZOOM, MAX_ZOOM]; if the
    /// clamp leaves the scale unchanged the transform is returned as-is,
    /// so grinding the wheel against a bound never drifts the view.
    pub fn zoomed_about(&self, cursor_viewport: Point, scroll_delta: f64) -> ViewTransform {
        let factor = (1.0 - ZOOM_SENSITIVITY).powf(scroll_delta);
        let new_k = (self.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        if new_k == self.k {
            return *self;
        }

        let world_under_cursor = self.viewport_to_world(cursor_viewport);
        ViewTransform {
            x: cursor_viewport.x - world_under_cursor.x * new_k,
            y: cursor_viewport.y - world_under_cursor.y * new_k,
            k: new_k,
        }
    }
}

/// Total height of a stack of `count` port pills
fn port_stack_height(count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    count as f64 * PORT_PILL_HEIGHT + (count - 1) as f64 * PORT_PILL_GAP
}

/// Height of the node body available to the port stack, after the header,
/// padding, and whichever footer is currently showing
fn content_height(node: &NodeData) -> f64 {
    let error_footer = if node.error.is_some() {
        ERROR_FOOTER_HEIGHT
    } else {
        0.0
    };
    let timing_footer = if node.execution_time.is_some() && node.error.is_none() {
        TIMING_FOOTER_HEIGHT
    } else {
        0.0
    };
    node.height - NODE_HEADER_HEIGHT - NODE_PADDING_Y * 2.0 - error_footer - timing_footer
}

/// World-space anchor of the `index`-th port on the given side of a node.
///
/// Inputs anchor on the left edge, outputs on the right. When the body is
/// tall enough the pill stack is vertically centered within it; otherwise
/// the ports fall back to a fixed spacing from the header so they stay
/// reachable on squashed nodes.
pub fn port_anchor_world(node: &NodeData, role: PortRole, index: usize) -> Point {
    let port_count = match role {
        PortRole::Input => node.inputs.len(),
        PortRole::Output => node.outputs.len(),
    };
    let stack = port_stack_height(port_count);
    let content = content_height(node);

    let rel_y = if content > stack {
        NODE_HEADER_HEIGHT
            + NODE_PADDING_Y
            + (content - stack) / 2.0
            + index as f64 * (PORT_PILL_HEIGHT + PORT_PILL_GAP)
            + PORT_PILL_HEIGHT / 2.0
    } else {
        NODE_HEADER_HEIGHT + NODE_PADDING_Y + index as f64 * PORT_SPACING + PORT_SPACING / 2.0
    };

    let rel_x = match role {
        PortRole::Input => 0.0,
        PortRole::Output => node.width,
    };

    Point::new(node.x + rel_x, node.y + rel_y)
}

/// Viewport-space anchor of a port, for hit testing and wire rendering
pub fn port_anchor_viewport(
    node: &NodeData,
    role: PortRole,
    index: usize,
    transform: &ViewTransform,
) -> Point {
    transform.world_to_viewport(port_anchor_world(node, role, index))
}

/// World position for a node placed from a client-space click (palette
/// pick, double-click affordance). `origin` is the canvas element's own
/// client offset, passed live because the embedder owns layout.
pub fn placement_world(click: Point, origin: Point, transform: &ViewTransform) -> Point {
    transform.viewport_to_world(Point::new(click.x - origin.x, click.y - origin.y))
}
