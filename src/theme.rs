use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    /// Left inset of the label inside its box.
    pub label_inset: f32,
    pub label_color: String,
    pub node_fill: String,
    pub node_stroke: String,
    pub node_stroke_width: f32,
    pub node_corner_radius: f32,
    pub line_color: String,
    pub line_width: f32,
    pub anchor_radius: f32,
    pub anchor_stroke: String,
    pub anchor_fill: String,
    pub control_stroke: String,
    pub control_fill: String,
    pub control_hover_stroke: String,
    pub control_hover_fill: String,
    pub grid_color: String,
    pub grid_width: f32,
    pub grid_spacing: f32,
    pub background: String,
}

impl Theme {
    /// Blue boxes with white text on a fine black grid.
    pub fn classic() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            font_size: 16.0,
            label_inset: 20.0,
            label_color: "#ffffff".to_string(),
            node_fill: "#0275d8".to_string(),
            node_stroke: "#ffffff".to_string(),
            node_stroke_width: 1.0,
            node_corner_radius: 16.0,
            line_color: "gray".to_string(),
            line_width: 1.0,
            anchor_radius: 4.0,
            anchor_stroke: "#444".to_string(),
            anchor_fill: "#ccc".to_string(),
            control_stroke: "#444".to_string(),
            control_fill: "#ccc".to_string(),
            control_hover_stroke: "#666".to_string(),
            control_hover_fill: "#eee".to_string(),
            grid_color: "#000".to_string(),
            grid_width: 0.1,
            grid_spacing: 10.0,
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            label_inset: 16.0,
            label_color: "#1C2430".to_string(),
            node_fill: "#F8FAFF".to_string(),
            node_stroke: "#C7D2E5".to_string(),
            node_stroke_width: 1.4,
            node_corner_radius: 10.0,
            line_color: "#7A8AA6".to_string(),
            line_width: 1.4,
            anchor_radius: 3.5,
            anchor_stroke: "#7A8AA6".to_string(),
            anchor_fill: "#FFFFFF".to_string(),
            control_stroke: "#7A8AA6".to_string(),
            control_fill: "#EEF2F8".to_string(),
            control_hover_stroke: "#1C2430".to_string(),
            control_hover_fill: "#FFFFFF".to_string(),
            grid_color: "#D7E0F0".to_string(),
            grid_width: 0.5,
            grid_spacing: 20.0,
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "classic" | "default" => Some(Self::classic()),
            "modern" => Some(Self::modern()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
