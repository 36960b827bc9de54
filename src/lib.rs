#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod connector;
pub mod controls;
pub mod diagram;
pub mod error;
pub mod geometry;
pub mod interaction;
pub mod layout;
pub mod layout_dump;
pub mod mutation;
pub mod parser;
pub mod render;
pub mod scene;
pub mod seed;
pub mod surface;
pub mod text_metrics;
pub mod theme;
pub mod tree;

pub use config::{ChartConfig, Config, MAX_CANVAS_SIDE, RenderConfig, load_config, parse_config, validate_canvas};
pub use connector::Connector;
pub use controls::{ControlKind, ControlStyle};
pub use diagram::Diagram;
pub use error::{ConfigError, Error, Result, SeedError};
pub use geometry::{Anchor, Point, Size};
pub use interaction::{Hit, PointerEvent};
pub use layout_dump::{LayoutDump, write_layout_dump};
pub use parser::parse_seed;
pub use render::{render_svg, write_output_svg};
pub use scene::Scene;
pub use seed::Seed;
pub use surface::{NullSurface, Surface};
pub use theme::Theme;
pub use tree::{Node, NodeId, Tree};

/// Options for one-shot rendering of a seed.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub theme: Theme,
    pub chart: ChartConfig,
    pub render: RenderConfig,
}

impl From<Config> for RenderOptions {
    fn from(config: Config) -> Self {
        Self {
            theme: config.theme,
            chart: config.chart,
            render: config.render,
        }
    }
}

/// Builds a diagram on a headless scene and returns it together with its SVG.
pub fn render_seed(seed: &Seed, options: &RenderOptions) -> (Diagram<Scene>, String) {
    let scene = Scene::new(options.render.canvas_size());
    let diagram = Diagram::from_seed(options.chart.clone(), scene, seed);
    let svg = render_svg(diagram.surface(), &options.theme);
    (diagram, svg)
}

/// Parses `input` as a seed and renders it.
pub fn render_with_options(input: &str, options: &RenderOptions) -> std::result::Result<String, SeedError> {
    let seed = parse_seed(input)?;
    Ok(render_seed(&seed, options).1)
}
