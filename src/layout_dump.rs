use crate::diagram::Diagram;
use crate::geometry::Point;
use crate::surface::Surface;
use log::info;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub root: Option<String>,
    pub nodes: Vec<NodeDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub parent: Option<String>,
    pub label: String,
    pub depth: usize,
    pub x: f32,
    pub y: f32,
    pub abs_x: f32,
    pub abs_y: f32,
    pub width: f32,
    pub height: f32,
    pub subtree_half_extent: f32,
    pub draggable: bool,
    /// Connector path in surface coordinates.
    pub connector: Vec<[f32; 2]>,
}

impl LayoutDump {
    pub fn from_diagram<S: Surface>(diagram: &Diagram<S>) -> Self {
        let tree = diagram.tree();
        let nodes = tree
            .iter()
            .map(|(id, node)| {
                let absolute = tree.absolute_position(id).unwrap_or(Point::ORIGIN);
                NodeDump {
                    id: id.to_string(),
                    parent: node.parent().map(|parent| parent.to_string()),
                    label: node.label().to_string(),
                    depth: tree.depth(id).unwrap_or(0),
                    x: node.position().x,
                    y: node.position().y,
                    abs_x: absolute.x,
                    abs_y: absolute.y,
                    width: node.size().width,
                    height: node.size().height,
                    subtree_half_extent: node.subtree_half_extent(),
                    draggable: node.is_draggable(),
                    connector: node
                        .connector()
                        .map(|connector| {
                            connector
                                .path()
                                .iter()
                                .map(|point| [point.x + absolute.x, point.y + absolute.y])
                                .collect()
                        })
                        .unwrap_or_default(),
                }
            })
            .collect();

        let canvas = diagram.surface().canvas_size();
        LayoutDump {
            canvas_width: canvas.width,
            canvas_height: canvas.height,
            root: diagram.root().map(|root| root.to_string()),
            nodes,
        }
    }
}

pub fn write_layout_dump<S: Surface>(path: &Path, diagram: &Diagram<S>) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_diagram(diagram);
    serde_json::to_writer_pretty(writer, &dump)?;
    info!(path:? = path, nodes = dump.nodes.len(); "Wrote layout dump");
    Ok(())
}
