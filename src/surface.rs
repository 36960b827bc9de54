//! The drawing-and-input capability the engine calls into.
//!
//! The engine never draws. After each mutation it tells the surface which
//! node frames appeared, moved or vanished and which connectors need to be
//! redrawn; the surface mirrors that into whatever scene graph it owns.
//! Every hook except [`Surface::canvas_size`] has a no-op default.

use crate::connector::Connector;
use crate::controls::{ControlKind, ControlStyle};
use crate::geometry::{Point, Size};
use crate::tree::{Node, NodeId};

pub trait Surface {
    /// Current drawable area. The root is centered on its height.
    fn canvas_size(&self) -> Size;

    /// Size of the hosting window, when the surface can track one.
    fn window_size(&self) -> Option<Size> {
        None
    }

    /// Changes the drawable area, e.g. to follow the window in fullscreen mode.
    fn resize(&mut self, _size: Size) {}

    /// Redraws the background grid for a canvas of `size`.
    fn draw_grid(&mut self, _size: Size) {}

    /// A node frame was created inside `parent`'s frame (or on the stage for the root).
    fn attach_node(&mut self, _id: NodeId, _parent: Option<NodeId>, _node: &Node) {}

    /// The frame of `id` is gone. Descendants are always detached first.
    fn detach_node(&mut self, _id: NodeId) {}

    /// `id` moved to `position` within its parent's frame.
    fn move_node(&mut self, _id: NodeId, _position: Point) {}

    /// A joint was established: anchor dots go on both frames.
    fn attach_joint(&mut self, _child: NodeId, _parent: NodeId, _connector: &Connector) {}

    /// Redraws the connector from `id`'s parent to `id`.
    fn draw_connector(&mut self, _id: NodeId, _connector: &Connector) {}

    fn set_label(&mut self, _id: NodeId, _label: &str) {}

    /// Background opacity of the node box; dimmed while dragging.
    fn set_node_opacity(&mut self, _id: NodeId, _alpha: f32) {}

    fn style_control(&mut self, _id: NodeId, _kind: ControlKind, _style: ControlStyle) {}

    /// Blocking free-text prompt. `None` means the user cancelled.
    fn prompt(&mut self, _message: &str, _default: Option<&str>) -> Option<String> {
        None
    }
}

/// Surface with a fixed canvas that ignores every drawing request.
#[derive(Debug, Clone, Copy)]
pub struct NullSurface {
    size: Size,
}

impl NullSurface {
    pub fn new(size: Size) -> Self {
        Self { size }
    }
}

impl Default for NullSurface {
    fn default() -> Self {
        Self::new(Size::new(1200.0, 800.0))
    }
}

impl Surface for NullSurface {
    fn canvas_size(&self) -> Size {
        self.size
    }

    fn resize(&mut self, size: Size) {
        self.size = size;
    }
}
