use crate::error::{ConfigError, Error};
use crate::geometry::Size;
use crate::theme::Theme;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Geometry shared by every node of one diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Initial x of the root.
    pub start_x: f32,
    pub width: f32,
    pub height: f32,
    /// Horizontal gap between a parent's right edge and its children.
    pub distance_x: f32,
    /// Vertical gap between sibling subtrees.
    pub distance_y: f32,
    /// The canvas follows the window size (minus `margin` on each side).
    pub fullscreen: bool,
    pub margin: f32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            start_x: 100.0,
            width: 200.0,
            height: 60.0,
            distance_x: 50.0,
            distance_y: 20.0,
            fullscreen: false,
            margin: 20.0,
        }
    }
}

impl ChartConfig {
    pub fn node_size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [("width", self.width), ("height", self.height)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        for (field, value) in [
            ("distance_x", self.distance_x),
            ("distance_y", self.distance_y),
            ("margin", self.margin),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Negative { field, value });
            }
        }
        if !self.start_x.is_finite() {
            return Err(ConfigError::NotFinite { field: "start_x" });
        }
        Ok(())
    }
}

/// Canvas used when no window drives the size (CLI, tests).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
        }
    }
}

/// Largest canvas side accepted from the command line or the browser.
pub const MAX_CANVAS_SIDE: f32 = 16_384.0;

impl RenderConfig {
    pub fn canvas_size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_canvas(self.canvas_size())
    }
}

/// Rejects canvas sizes that are not finite, not positive, or above
/// [`MAX_CANVAS_SIDE`].
pub fn validate_canvas(size: Size) -> Result<(), ConfigError> {
    for (field, value) in [("render.width", size.width), ("render.height", size.height)] {
        if !(value.is_finite() && value > 0.0) {
            return Err(ConfigError::NonPositive { field, value });
        }
        if value > MAX_CANVAS_SIDE {
            return Err(ConfigError::TooLarge {
                field,
                value,
                max: MAX_CANVAS_SIDE,
            });
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub chart: ChartConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ChartConfigFile {
    start_x: Option<f32>,
    width: Option<f32>,
    height: Option<f32>,
    distance_x: Option<f32>,
    distance_y: Option<f32>,
    fullscreen: Option<bool>,
    margin: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RenderConfigFile {
    width: Option<f32>,
    height: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    theme: Option<String>,
    chart: Option<ChartConfigFile>,
    render: Option<RenderConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> Result<Config, Error> {
    let Some(path) = path else {
        return Ok(Config::default());
    };

    let contents = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&contents)?;
    info!(path:? = path; "Loaded configuration");
    Ok(config)
}

/// Applies a JSON override document on top of the defaults.
pub fn parse_config(contents: &str) -> Result<Config, ConfigError> {
    let parsed: ConfigFile = serde_json::from_str(contents)?;
    let mut config = Config::default();

    if let Some(name) = parsed.theme.as_deref() {
        config.theme = Theme::by_name(name).ok_or_else(|| ConfigError::UnknownTheme(name.to_string()))?;
    }

    if let Some(chart) = parsed.chart {
        if let Some(v) = chart.start_x {
            config.chart.start_x = v;
        }
        if let Some(v) = chart.width {
            config.chart.width = v;
        }
        if let Some(v) = chart.height {
            config.chart.height = v;
        }
        if let Some(v) = chart.distance_x {
            config.chart.distance_x = v;
        }
        if let Some(v) = chart.distance_y {
            config.chart.distance_y = v;
        }
        if let Some(v) = chart.fullscreen {
            config.chart.fullscreen = v;
        }
        if let Some(v) = chart.margin {
            config.chart.margin = v;
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.width {
            config.render.width = v;
        }
        if let Some(v) = render.height {
            config.render.height = v;
        }
    }

    config.chart.validate()?;
    config.render.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_reference_chart() {
        let chart = ChartConfig::default();
        assert_eq!(chart.start_x, 100.0);
        assert_eq!(chart.node_size(), Size::new(200.0, 60.0));
        assert_eq!(chart.distance_x, 50.0);
        assert_eq!(chart.distance_y, 20.0);
        assert!(!chart.fullscreen);
        assert_eq!(chart.margin, 20.0);
        assert!(chart.validate().is_ok());
    }

    #[test]
    fn partial_overrides_keep_other_defaults() {
        let config = parse_config(
            r#"{ "theme": "modern", "chart": { "width": 160, "distance_y": 8 }, "render": { "height": 600 } }"#,
        )
        .unwrap();
        assert_eq!(config.chart.width, 160.0);
        assert_eq!(config.chart.height, 60.0);
        assert_eq!(config.chart.distance_y, 8.0);
        assert_eq!(config.render.height, 600.0);
        assert_eq!(config.render.width, 1200.0);
        assert_eq!(config.theme.font_family, Theme::modern().font_family);
    }

    #[test]
    fn rejects_degenerate_geometry() {
        let err = parse_config(r#"{ "chart": { "height": 0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::NonPositive { field: "height", .. }));

        let err = parse_config(r#"{ "chart": { "distance_x": -5 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Negative { field: "distance_x", .. }));
    }

    #[test]
    fn rejects_unbounded_canvas() {
        let err = parse_config(r#"{ "render": { "width": 0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::NonPositive { field: "render.width", .. }));

        let err = parse_config(r#"{ "render": { "height": 1e9 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge { field: "render.height", .. }));

        let render = RenderConfig {
            width: f32::INFINITY,
            height: 800.0,
        };
        assert!(matches!(render.validate(), Err(ConfigError::NonPositive { .. })));
        assert!(validate_canvas(Size::new(f32::NAN, 10.0)).is_err());
        assert!(RenderConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_unknown_theme_and_fields() {
        assert!(matches!(
            parse_config(r#"{ "theme": "neon" }"#),
            Err(ConfigError::UnknownTheme(_))
        ));
        assert!(matches!(
            parse_config(r#"{ "chart": { "depth": 3 } }"#),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn load_config_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "chart": {{ "start_x": 40, "fullscreen": true }} }}"#).unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.chart.start_x, 40.0);
        assert!(config.chart.fullscreen);
    }

    #[test]
    fn load_config_reports_missing_file() {
        let err = load_config(Some(Path::new("/definitely/not/here.json"))).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert!(load_config(None).is_ok());
    }
}
