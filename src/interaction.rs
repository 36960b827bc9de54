//! Pointer intents: drag, rename, and the add/remove controls.
//!
//! Points handed to this module are in surface coordinates. Controls are hit
//! before node boxes, so a press on a control never starts a drag and a
//! double-click on it never renames the node underneath.

use log::debug;

use crate::controls::{ControlKind, ControlStyle, LABEL_PROMPT};
use crate::diagram::Diagram;
use crate::geometry::{Anchor, Point, Size};
use crate::layout;
use crate::surface::Surface;
use crate::tree::NodeId;

/// Opacity of a node box while it is being dragged.
pub const DRAG_OPACITY: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragState {
    pub node: NodeId,
    /// Pointer minus the node's absolute top-left at grab time.
    pub offset: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Control(NodeId, ControlKind),
    Node(NodeId),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up(Point),
    DoubleClick(Point),
}

impl<S: Surface> Diagram<S> {
    /// Topmost control or node under `point`. Nodes later in pre-order are
    /// drawn above earlier ones and win ties.
    pub fn hit_test(&self, point: Point) -> Option<Hit> {
        let frames: Vec<(NodeId, Point, Size)> = self
            .tree
            .iter()
            .filter_map(|(id, node)| Some((id, self.tree.absolute_position(id)?, node.size)))
            .collect();

        for &(id, origin, size) in frames.iter().rev() {
            let local = point - origin;
            if let Some(kind) = ControlKind::ALL.into_iter().find(|kind| kind.hit(size, local)) {
                return Some(Hit::Control(id, kind));
            }
        }
        frames
            .iter()
            .rev()
            .find(|(_, origin, size)| size.contains(point - *origin))
            .map(|&(id, _, _)| Hit::Node(id))
    }

    /// Dispatches a raw pointer event. Returns whether it was consumed.
    pub fn pointer(&mut self, event: PointerEvent) -> bool {
        match event {
            PointerEvent::Down(point) => match self.hit_test(point) {
                Some(Hit::Control(owner, kind)) => {
                    self.click_control(owner, kind);
                    true
                }
                Some(Hit::Node(id)) => self.press(id, point),
                None => false,
            },
            PointerEvent::Move(point) => {
                if self.drag.is_some() {
                    return self.drag_to(point);
                }
                let target = match self.hit_test(point) {
                    Some(Hit::Control(owner, kind)) => Some((owner, kind)),
                    _ => None,
                };
                self.hover_control(target)
            }
            PointerEvent::Up(_) => self.release(),
            PointerEvent::DoubleClick(point) => match self.hit_test(point) {
                Some(Hit::Node(id)) => self.double_click(id),
                Some(Hit::Control(..)) => true,
                None => false,
            },
        }
    }

    /// Grabs a draggable node at `pointer` and dims it.
    pub fn press(&mut self, id: NodeId, pointer: Point) -> bool {
        if !self.tree.node(id).is_some_and(|node| node.draggable) {
            return false;
        }
        let Some(origin) = self.tree.absolute_position(id) else {
            return false;
        };
        self.drag = Some(DragState {
            node: id,
            offset: pointer - origin,
        });
        self.surface.set_node_opacity(id, DRAG_OPACITY);
        debug!(node:% = id; "Drag started");
        true
    }

    /// Moves the grabbed node so that the grab offset follows `pointer`.
    pub fn drag_to(&mut self, pointer: Point) -> bool {
        let Some(drag) = self.drag else {
            return false;
        };
        let frame = match self.tree.parent(drag.node) {
            Some(parent) => self.tree.absolute_position(parent).unwrap_or(Point::ORIGIN),
            None => Point::ORIGIN,
        };
        let target = pointer - drag.offset - frame;
        layout::set_position(&mut self.tree, &mut self.surface, drag.node, Anchor::TopLeft, target.x, target.y)
    }

    /// Drops the grabbed node, restoring its opacity.
    pub fn release(&mut self) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };
        if !self.tree.contains(drag.node) {
            return false;
        }
        self.surface.set_node_opacity(drag.node, 1.0);
        layout::refresh_connectors(&mut self.tree, &mut self.surface, drag.node);
        debug!(node:% = drag.node; "Drag released");
        true
    }

    /// Prompts for a new label, offering the current one. Empty answers and
    /// cancellation leave the node unchanged.
    pub fn double_click(&mut self, id: NodeId) -> bool {
        let Some(current) = self.tree.node(id).map(|node| node.label.clone()) else {
            return false;
        };
        match self.surface.prompt(LABEL_PROMPT, Some(&current)) {
            Some(label) if !label.is_empty() => self.rename(id, &label),
            _ => false,
        }
    }

    /// Runs the action behind one of `owner`'s controls.
    pub fn click_control(&mut self, owner: NodeId, kind: ControlKind) -> bool {
        if !self.tree.contains(owner) {
            return false;
        }
        match kind {
            ControlKind::Add => {
                let label = match self.surface.prompt(LABEL_PROMPT, None) {
                    Some(label) if !label.is_empty() => label,
                    _ => return false,
                };
                if self.add_child(owner, label, &[]).is_none() {
                    return false;
                }
                self.relocate(owner, true);
                self.recenter_root();
                true
            }
            ControlKind::Remove => {
                let removed = self.remove(owner);
                self.recenter_root();
                removed
            }
        }
    }

    /// Moves the hover highlight to `target`, restoring the previous control.
    pub fn hover_control(&mut self, target: Option<(NodeId, ControlKind)>) -> bool {
        if self.hovered == target {
            return target.is_some();
        }
        if let Some((owner, kind)) = self.hovered.take() {
            if self.tree.contains(owner) {
                self.surface.style_control(owner, kind, ControlStyle::Idle);
            }
        }
        if let Some((owner, kind)) = target {
            self.surface.style_control(owner, kind, ControlStyle::Hover);
            self.hovered = target;
        }
        target.is_some()
    }

    pub fn hovered_control(&self) -> Option<(NodeId, ControlKind)> {
        self.hovered
    }

    pub fn dragging(&self) -> Option<NodeId> {
        self.drag.map(|drag| drag.node)
    }
}
