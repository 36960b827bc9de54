#[cfg(feature = "png")]
use crate::config::RenderConfig;
use crate::controls::{CONTROL_RADIUS, ControlKind, ControlStyle};
use crate::geometry::{Point, Size};
use crate::scene::{Scene, SceneNode};
use crate::text_metrics::fit_label;
use crate::theme::Theme;
use crate::tree::NodeId;
use anyhow::Result;
use log::info;
use std::path::Path;

/// Renders the scene as nested SVG groups, one `translate` per node frame, so
/// the output mirrors the parent-relative coordinates of the tree.
pub fn render_svg(scene: &Scene, theme: &Theme) -> String {
    let Size { width, height } = scene.size();
    let mut svg = String::new();

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    if let Some(grid) = scene.grid() {
        svg.push_str(&grid_svg(grid, theme));
    }

    let mut stack: Vec<Frame> = scene.roots().iter().rev().map(|&id| Frame::Open(id)).collect();
    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Close => svg.push_str("</g>"),
            Frame::Open(id) => {
                let Some(node) = scene.node(id) else {
                    continue;
                };
                svg.push_str(&format!(
                    "<g transform=\"translate({:.2},{:.2})\">",
                    node.position.x, node.position.y
                ));
                svg.push_str(&node_svg(node, theme));
                stack.push(Frame::Close);
                stack.extend(node.children.iter().rev().map(|&child| Frame::Open(child)));
            }
        }
    }

    svg.push_str("</svg>");
    svg
}

enum Frame {
    Open(NodeId),
    Close,
}

/// Interior grid lines every `grid_spacing`, edges excluded.
fn grid_svg(size: Size, theme: &Theme) -> String {
    if theme.grid_spacing <= 0.0 || !size.width.is_finite() || !size.height.is_finite() {
        return String::new();
    }
    let mut d = String::new();
    let mut x = theme.grid_spacing;
    while x < size.width {
        d.push_str(&format!("M {x:.2} 0 L {x:.2} {:.2} ", size.height));
        x += theme.grid_spacing;
    }
    let mut y = theme.grid_spacing;
    while y < size.height {
        d.push_str(&format!("M 0 {y:.2} L {:.2} {y:.2} ", size.width));
        y += theme.grid_spacing;
    }
    if d.is_empty() {
        return String::new();
    }
    format!(
        "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"/>",
        d.trim_end(),
        theme.grid_color,
        theme.grid_width
    )
}

fn node_svg(node: &SceneNode, theme: &Theme) -> String {
    let mut out = String::new();
    let Size { width, height } = node.size;

    if let Some(connector) = &node.connector {
        out.push_str(&format!(
            "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"/>",
            points_to_path(connector.path()),
            theme.line_color,
            theme.line_width
        ));
    }

    out.push_str(&format!(
        "<rect x=\"0.5\" y=\"0.5\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{r}\" ry=\"{r}\" fill=\"{}\" fill-opacity=\"{}\" stroke=\"{}\" stroke-width=\"{}\"/>",
        (width - 1.0).max(0.0),
        (height - 1.0).max(0.0),
        theme.node_fill,
        node.opacity,
        theme.node_stroke,
        theme.node_stroke_width,
        r = theme.node_corner_radius,
    ));

    let max_label = (width - theme.label_inset * 2.0).max(0.0);
    let label = fit_label(&node.label, max_label, theme.font_size, &theme.font_family);
    out.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{:.2}\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
        theme.label_inset,
        height / 2.0,
        escape_xml(&theme.font_family),
        theme.font_size,
        theme.label_color,
        escape_xml(&label)
    ));

    if let Some(connector) = &node.connector {
        for anchor in [connector.start(), connector.end()] {
            out.push_str(&format!(
                "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{}\" fill=\"{}\" stroke=\"{}\"/>",
                anchor.x, anchor.y, theme.anchor_radius, theme.anchor_fill, theme.anchor_stroke
            ));
        }
    }

    for kind in ControlKind::ALL {
        out.push_str(&control_svg(kind, node.size, node.control_style(kind), theme));
    }
    out
}

fn control_svg(kind: ControlKind, size: Size, style: ControlStyle, theme: &Theme) -> String {
    let center = kind.center(size);
    let (fill, stroke) = match style {
        ControlStyle::Idle => (&theme.control_fill, &theme.control_stroke),
        ControlStyle::Hover => (&theme.control_hover_fill, &theme.control_hover_stroke),
    };
    let mut out = format!(
        "<g transform=\"translate({:.2},{:.2})\"><circle r=\"{CONTROL_RADIUS}\" fill=\"{fill}\" stroke=\"{stroke}\"/>",
        center.x, center.y
    );
    for (from, to) in kind.glyph() {
        out.push_str(&format!(
            "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{stroke}\" stroke-width=\"2\"/>",
            from.x, from.y, to.x, to.y
        ));
    }
    out.push_str("</g>");
    out
}

fn points_to_path(points: &[Point]) -> String {
    let mut d = String::new();
    for (idx, point) in points.iter().enumerate() {
        let cmd = if idx == 0 { "M" } else { " L" };
        d.push_str(&format!("{cmd} {:.2} {:.2}", point.x, point.y));
    }
    d
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
            info!(path:? = path, bytes = svg.len(); "Wrote SVG");
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    if let Some(size) = usvg::Size::from_wh(render_cfg.width, render_cfg.height) {
        opt.default_size = size;
    }

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    info!(path:? = output, width = size.width(), height = size.height(); "Wrote PNG");
    Ok(())
}

pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
