use crate::config::load_config;
use crate::controls::ControlKind;
use crate::diagram::Diagram;
use crate::geometry::Size;
use crate::layout_dump::write_layout_dump;
use crate::parser::parse_seed;
use crate::render::{render_svg, write_output_svg};
use crate::scene::Scene;
use crate::theme::Theme;
use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, ValueEnum};
use log::{debug, info};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "flowtree", version, about = "Editable tree flowchart renderer")]
pub struct Args {
    /// Seed file (outline or JSON5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Canvas width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Canvas height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Theme name (classic, modern)
    #[arg(long)]
    pub theme: Option<String>,

    /// Add a child under PATH, e.g. `--add "Root/Child=New label"`
    #[arg(long = "add", value_name = "PATH=LABEL")]
    pub add: Vec<String>,

    /// Remove the subtree at PATH, e.g. `--remove Root/Child`
    #[arg(long = "remove", value_name = "PATH")]
    pub remove: Vec<String>,

    /// Write a JSON snapshot of the final layout
    #[arg(long = "dump-layout", value_name = "FILE")]
    pub dump_layout: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run(args: &Args) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }
    config.render.validate().context("Invalid canvas size")?;
    if let Some(name) = args.theme.as_deref() {
        config.theme = Theme::by_name(name).ok_or_else(|| anyhow!("Unknown theme {name:?}"))?;
    }

    let input = read_input(args.input.as_deref())?;
    let seed = parse_seed(&input).context("Failed to parse seed")?;
    debug!(nodes = seed.node_count(); "Parsed seed");

    let scene = Scene::new(Size::new(config.render.width, config.render.height));
    let mut diagram = Diagram::from_seed(config.chart.clone(), scene, &seed);

    for edit in &args.add {
        apply_add(&mut diagram, edit)?;
    }
    for path in &args.remove {
        apply_remove(&mut diagram, path)?;
    }
    info!(nodes = diagram.tree().len(); "Diagram ready");

    if let Some(path) = args.dump_layout.as_deref() {
        write_layout_dump(path, &diagram)?;
    }

    let svg = render_svg(diagram.surface(), &config.theme);
    match args.output_format {
        OutputFormat::Svg => write_output_svg(&svg, args.output.as_deref())?,
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_png(&svg, &output, &config.render)?;
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, render: &crate::config::RenderConfig) -> Result<()> {
    crate::render::write_output_png(svg, output, render)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _render: &crate::config::RenderConfig) -> Result<()> {
    bail!("PNG output requires the `png` feature")
}

/// Same path the add control takes: prompt answer, insert, propagate, recenter.
fn apply_add(diagram: &mut Diagram<Scene>, edit: &str) -> Result<()> {
    let (path, label) = edit
        .split_once('=')
        .ok_or_else(|| anyhow!("Expected PATH=LABEL, got {edit:?}"))?;
    let owner = resolve_path(diagram, path)?;
    diagram.surface_mut().queue_prompt(Some(label.to_string()));
    if !diagram.click_control(owner, ControlKind::Add) {
        bail!("Could not add {label:?} under {path:?}");
    }
    Ok(())
}

fn apply_remove(diagram: &mut Diagram<Scene>, path: &str) -> Result<()> {
    let owner = resolve_path(diagram, path)?;
    diagram.click_control(owner, ControlKind::Remove);
    Ok(())
}

fn resolve_path(diagram: &Diagram<Scene>, path: &str) -> Result<crate::tree::NodeId> {
    let labels = split_path(path);
    diagram
        .tree()
        .find_path(labels.as_slice())
        .ok_or_else(|| anyhow!("No node at path {path:?}"))
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow!("Output path required for {} output", ext))
}
