use flowchart_tree::{
    ChartConfig, Diagram, Point, PointerEvent, Scene, Size, Surface, Theme, parse_seed, render_svg, validate_canvas,
};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlowChartOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    width: Option<f32>,
    height: Option<f32>,
    start_x: Option<f32>,
    node_width: Option<f32>,
    node_height: Option<f32>,
    distance_x: Option<f32>,
    distance_y: Option<f32>,
    /// Treat `width`/`height` as the window and fit the canvas inside it.
    fullscreen: Option<bool>,
    margin: Option<f32>,
}

fn build_chart(options: &FlowChartOptions) -> Result<(ChartConfig, Theme), String> {
    let mut theme = match options.theme.as_deref() {
        Some(name) => Theme::by_name(name).ok_or_else(|| format!("unknown theme {name:?}"))?,
        None => Theme::classic(),
    };
    if let Some(font_family) = &options.font_family {
        theme.font_family = font_family.clone();
    }
    if let Some(font_size) = options.font_size {
        theme.font_size = font_size;
    }

    let mut chart = ChartConfig::default();
    if let Some(v) = options.start_x {
        chart.start_x = v;
    }
    if let Some(v) = options.node_width {
        chart.width = v;
    }
    if let Some(v) = options.node_height {
        chart.height = v;
    }
    if let Some(v) = options.distance_x {
        chart.distance_x = v;
    }
    if let Some(v) = options.distance_y {
        chart.distance_y = v;
    }
    if let Some(v) = options.fullscreen {
        chart.fullscreen = v;
    }
    if let Some(v) = options.margin {
        chart.margin = v;
    }
    chart.validate().map_err(|error| error.to_string())?;
    Ok((chart, theme))
}

/// Editable chart handle driven by browser pointer events.
#[wasm_bindgen]
pub struct FlowChart {
    diagram: Diagram<Scene>,
    theme: Theme,
}

#[wasm_bindgen]
impl FlowChart {
    #[wasm_bindgen(constructor)]
    pub fn new(seed: &str, options_json: Option<String>) -> Result<FlowChart, JsValue> {
        let options = match options_json {
            Some(raw) => serde_json::from_str::<FlowChartOptions>(&raw).map_err(|error| JsValue::from_str(&error.to_string()))?,
            None => FlowChartOptions::default(),
        };
        let (chart, theme) = build_chart(&options).map_err(|error| JsValue::from_str(&error))?;
        let seed = parse_seed(seed).map_err(|error| JsValue::from_str(&error.to_string()))?;
        let size = Size::new(options.width.unwrap_or(1200.0), options.height.unwrap_or(800.0));
        validate_canvas(size).map_err(|error| JsValue::from_str(&error.to_string()))?;
        let scene = if chart.fullscreen {
            Scene::new(size).with_window(size)
        } else {
            Scene::new(size)
        };
        Ok(FlowChart {
            diagram: Diagram::from_seed(chart, scene, &seed),
            theme,
        })
    }

    /// Answer handed to the next label prompt; `None` cancels it.
    #[wasm_bindgen(js_name = queuePrompt)]
    pub fn queue_prompt(&mut self, answer: Option<String>) {
        self.diagram.surface_mut().queue_prompt(answer);
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f32, y: f32) -> bool {
        self.diagram.pointer(PointerEvent::Down(Point::new(x, y)))
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        self.diagram.pointer(PointerEvent::Move(Point::new(x, y)))
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self, x: f32, y: f32) -> bool {
        self.diagram.pointer(PointerEvent::Up(Point::new(x, y)))
    }

    #[wasm_bindgen(js_name = doubleClick)]
    pub fn double_click(&mut self, x: f32, y: f32) -> bool {
        self.diagram.pointer(PointerEvent::DoubleClick(Point::new(x, y)))
    }

    /// Follows the browser window when the chart is fullscreen; a fixed
    /// canvas ignores it and reports `false`.
    pub fn resize(&mut self, window_width: f32, window_height: f32) -> Result<bool, JsValue> {
        let window = Size::new(window_width, window_height);
        validate_canvas(window).map_err(|error| JsValue::from_str(&error.to_string()))?;
        if !self.diagram.config().fullscreen {
            return Ok(false);
        }
        self.diagram.surface_mut().set_window(window);
        self.diagram.fit_window(window);
        Ok(true)
    }

    /// Moves the node at a `/`-separated label path; `mode` is `"left"` or
    /// `"center"`.
    #[wasm_bindgen(js_name = setPosition)]
    pub fn set_position(&mut self, path: &str, x: f32, y: f32, mode: &str) -> bool {
        let labels: Vec<&str> = path.split('/').map(str::trim).filter(|part| !part.is_empty()).collect();
        match self.diagram.tree().find_path(labels.as_slice()) {
            Some(id) => self.diagram.place(id, mode, x, y),
            None => false,
        }
    }

    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> usize {
        self.diagram.tree().len()
    }

    pub fn svg(&self) -> String {
        render_svg(self.diagram.surface(), &self.theme)
    }

    #[wasm_bindgen(js_name = canvasWidth)]
    pub fn canvas_width(&self) -> f32 {
        self.diagram.surface().canvas_size().width
    }
}
