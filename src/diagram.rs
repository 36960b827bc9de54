use log::{debug, info};

use crate::config::ChartConfig;
use crate::controls::ControlKind;
use crate::geometry::{Anchor, Point, Size};
use crate::interaction::DragState;
use crate::layout;
use crate::mutation;
use crate::seed::Seed;
use crate::surface::Surface;
use crate::tree::{Node, NodeId, Tree};

/// One editable chart: the tree, its geometry and the surface it is drawn on.
pub struct Diagram<S: Surface> {
    pub(crate) tree: Tree,
    pub(crate) config: ChartConfig,
    pub(crate) surface: S,
    pub(crate) drag: Option<DragState>,
    pub(crate) hovered: Option<(NodeId, ControlKind)>,
}

impl<S: Surface> Diagram<S> {
    /// Creates an empty diagram and draws the background grid. In fullscreen
    /// mode the canvas is first fitted to the surface's window.
    pub fn new(config: ChartConfig, surface: S) -> Self {
        let mut diagram = Self {
            tree: Tree::new(),
            config,
            surface,
            drag: None,
            hovered: None,
        };
        match diagram.surface.window_size() {
            Some(window) if diagram.config.fullscreen => diagram.fit_window(window),
            _ => {
                let canvas = diagram.surface.canvas_size();
                diagram.surface.draw_grid(canvas);
            }
        }
        diagram
    }

    /// Builds a diagram and seeds it from `seed` in one go.
    pub fn from_seed(config: ChartConfig, surface: S, seed: &Seed) -> Self {
        let mut diagram = Self::new(config, surface);
        diagram.init(seed.label.clone(), &seed.children);
        diagram
    }

    /// Installs a fresh draggable root at `start_x`, seeds its children and
    /// centers it vertically on the canvas.
    pub fn init(&mut self, label: impl Into<String>, children: &[Seed]) -> NodeId {
        let root = mutation::create_root(&mut self.tree, &self.config, &mut self.surface, label.into());
        self.drag = None;
        self.hovered = None;
        mutation::add_children(&mut self.tree, &self.config, &mut self.surface, root, children);
        self.set_draggable(root, true);
        let y = self.tree.node(root).map_or(0.0, |node| node.position.y);
        let x = self.config.start_x;
        self.set_position(root, Anchor::TopLeft, x, y);
        self.recenter_vertically(root);
        info!(nodes = self.tree.len(); "Diagram initialized");
        root
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn root(&self) -> Option<NodeId> {
        self.tree.root()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.tree.node(id)
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn absolute_position(&self, id: NodeId) -> Option<Point> {
        self.tree.absolute_position(id)
    }

    /// Adds a child under `parent` without relocating `parent`.
    pub fn add_child(&mut self, parent: NodeId, label: impl Into<String>, children: &[Seed]) -> Option<NodeId> {
        mutation::add_child(&mut self.tree, &self.config, &mut self.surface, parent, label.into(), children)
    }

    pub fn add_children(&mut self, parent: NodeId, seeds: &[Seed]) -> Option<NodeId> {
        mutation::add_children(&mut self.tree, &self.config, &mut self.surface, parent, seeds)
    }

    pub fn remove(&mut self, id: NodeId) -> bool {
        if self.drag.as_ref().is_some_and(|drag| self.tree.iter_from(id).any(|(n, _)| n == drag.node)) {
            self.drag = None;
        }
        if self.hovered.is_some_and(|(owner, _)| self.tree.iter_from(id).any(|(n, _)| n == owner)) {
            self.hovered = None;
        }
        mutation::remove(&mut self.tree, &self.config, &mut self.surface, id)
    }

    pub fn rename(&mut self, id: NodeId, label: &str) -> bool {
        mutation::rename(&mut self.tree, &mut self.surface, id, label)
    }

    pub fn set_position(&mut self, id: NodeId, anchor: Anchor, x: f32, y: f32) -> bool {
        layout::set_position(&mut self.tree, &mut self.surface, id, anchor, x, y)
    }

    /// `set_position` with a textual mode: `"center"` places the box center at
    /// `(x, y)`, anything else its top-left corner.
    pub fn place(&mut self, id: NodeId, mode: &str, x: f32, y: f32) -> bool {
        self.set_position(id, Anchor::from_mode(mode), x, y)
    }

    pub fn relocate(&mut self, id: NodeId, propagate: bool) -> bool {
        layout::relocate(&mut self.tree, &self.config, &mut self.surface, id, propagate)
    }

    pub fn recenter_vertically(&mut self, id: NodeId) -> bool {
        layout::recenter_vertically(&mut self.tree, &self.config, &mut self.surface, id)
    }

    /// Recenters the root; false once the root has been removed.
    pub fn recenter_root(&mut self) -> bool {
        match self.tree.root() {
            Some(root) => self.recenter_vertically(root),
            None => false,
        }
    }

    pub fn set_draggable(&mut self, id: NodeId, draggable: bool) -> bool {
        match self.tree.node_mut(id) {
            Some(node) => {
                node.draggable = draggable;
                true
            }
            None => false,
        }
    }

    /// The canvas changed size: redraw the grid and recenter the root. The
    /// tree layout itself is untouched.
    pub fn on_resize(&mut self) {
        let canvas = self.surface.canvas_size();
        debug!(width = canvas.width, height = canvas.height; "Canvas resized");
        self.surface.draw_grid(canvas);
        self.recenter_root();
    }

    /// Fits the canvas inside `window` minus the margin on every side.
    pub fn fit_window(&mut self, window: Size) {
        let margin = self.config.margin * 2.0;
        let canvas = Size::new((window.width - margin).max(0.0), (window.height - margin).max(0.0));
        self.surface.resize(canvas);
        self.on_resize();
    }
}
