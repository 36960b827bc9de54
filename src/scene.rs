//! Retained-mode surface used for headless rendering and tests.

use std::collections::{HashMap, VecDeque};

use log::trace;

use crate::connector::Connector;
use crate::controls::{ControlKind, ControlStyle};
use crate::geometry::{Point, Size};
use crate::surface::Surface;
use crate::tree::{Node, NodeId};

/// Mirror of one node frame as the surface last saw it.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub label: String,
    pub position: Point,
    pub size: Size,
    pub connector: Option<Connector>,
    pub opacity: f32,
    pub add_style: ControlStyle,
    pub remove_style: ControlStyle,
}

impl SceneNode {
    pub fn control_style(&self, kind: ControlKind) -> ControlStyle {
        match kind {
            ControlKind::Add => self.add_style,
            ControlKind::Remove => self.remove_style,
        }
    }
}

#[derive(Debug, Default)]
pub struct Scene {
    size: Size,
    window: Option<Size>,
    grid: Option<Size>,
    nodes: HashMap<NodeId, SceneNode>,
    roots: Vec<NodeId>,
    answers: VecDeque<Option<String>>,
}

impl Scene {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// Reports `window` to the diagram so fullscreen mode can fit to it.
    pub fn with_window(mut self, window: Size) -> Self {
        self.window = Some(window);
        self
    }

    pub fn set_window(&mut self, window: Size) {
        self.window = Some(window);
    }

    /// Queues the answer to the next prompt; `None` cancels it.
    pub fn queue_prompt(&mut self, answer: Option<String>) {
        self.answers.push_back(answer);
    }

    pub fn pending_prompts(&self) -> usize {
        self.answers.len()
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Canvas size the grid was last drawn for.
    pub fn grid(&self) -> Option<Size> {
        self.grid
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Frames attached directly to the stage, in attach order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map(|node| node.children.as_slice()).unwrap_or(&[])
    }
}

impl Surface for Scene {
    fn canvas_size(&self) -> Size {
        self.size
    }

    fn window_size(&self) -> Option<Size> {
        self.window
    }

    fn resize(&mut self, size: Size) {
        self.size = size;
    }

    fn draw_grid(&mut self, size: Size) {
        self.grid = Some(size);
    }

    fn attach_node(&mut self, id: NodeId, parent: Option<NodeId>, node: &Node) {
        self.nodes.insert(
            id,
            SceneNode {
                parent,
                children: Vec::new(),
                label: node.label().to_string(),
                position: node.position(),
                size: node.size(),
                connector: None,
                opacity: 1.0,
                add_style: ControlStyle::Idle,
                remove_style: ControlStyle::Idle,
            },
        );
        match parent.and_then(|parent| self.nodes.get_mut(&parent)) {
            Some(parent) => parent.children.push(id),
            None => self.roots.push(id),
        }
    }

    fn detach_node(&mut self, id: NodeId) {
        let Some(node) = self.nodes.remove(&id) else {
            return;
        };
        match node.parent.and_then(|parent| self.nodes.get_mut(&parent)) {
            Some(parent) => parent.children.retain(|&child| child != id),
            None => self.roots.retain(|&root| root != id),
        }
    }

    fn move_node(&mut self, id: NodeId, position: Point) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.position = position;
        }
    }

    fn attach_joint(&mut self, child: NodeId, _parent: NodeId, connector: &Connector) {
        if let Some(node) = self.nodes.get_mut(&child) {
            node.connector = Some(*connector);
        }
    }

    fn draw_connector(&mut self, id: NodeId, connector: &Connector) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.connector = Some(*connector);
        }
    }

    fn set_label(&mut self, id: NodeId, label: &str) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.label = label.to_string();
        }
    }

    fn set_node_opacity(&mut self, id: NodeId, alpha: f32) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.opacity = alpha;
        }
    }

    fn style_control(&mut self, id: NodeId, kind: ControlKind, style: ControlStyle) {
        if let Some(node) = self.nodes.get_mut(&id) {
            match kind {
                ControlKind::Add => node.add_style = style,
                ControlKind::Remove => node.remove_style = style,
            }
        }
    }

    fn prompt(&mut self, message: &str, default: Option<&str>) -> Option<String> {
        let answer = self.answers.pop_front().flatten();
        trace!(message, default:?, answer:?; "Prompt answered");
        answer
    }
}
