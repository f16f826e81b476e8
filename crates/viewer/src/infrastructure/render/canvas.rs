//! `<canvas>` backend for browser builds

use send_wrapper::SendWrapper;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement};

use crate::error::RenderError;
use crate::ports::outbound::{
    ContainerPort, DisplayMetricsPort, DrawingContextPort, LogicalSize, PhysicalSize,
};

fn backend(e: wasm_bindgen::JsValue) -> RenderError {
    RenderError::Backend(format!("{:?}", e))
}

/// 2D context of a canvas element together with the element itself.
pub struct CanvasContext {
    canvas: SendWrapper<HtmlCanvasElement>,
    ctx: SendWrapper<CanvasRenderingContext2d>,
}

impl CanvasContext {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, RenderError> {
        let ctx = canvas
            .get_context("2d")
            .map_err(backend)?
            .ok_or_else(|| RenderError::Backend("2d context unavailable".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| RenderError::Backend("unexpected context type".to_string()))?;
        Ok(Self {
            canvas: SendWrapper::new(canvas),
            ctx: SendWrapper::new(ctx),
        })
    }
}

impl DrawingContextPort for CanvasContext {
    fn resize(&mut self, logical: LogicalSize, physical: PhysicalSize) -> Result<(), RenderError> {
        let style = self.canvas.style();
        style
            .set_property("width", &format!("{}px", logical.width))
            .map_err(backend)?;
        style
            .set_property("height", &format!("{}px", logical.height))
            .map_err(backend)?;
        self.canvas.set_width(physical.width);
        self.canvas.set_height(physical.height);
        Ok(())
    }

    fn set_scale(&mut self, factor: f64) -> Result<(), RenderError> {
        self.ctx
            .set_transform(factor, 0.0, 0.0, factor, 0.0, 0.0)
            .map_err(backend)
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ctx.clear_rect(x, y, width, height);
    }

    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn arc(
        &mut self,
        x: f64,
        y: f64,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    ) -> Result<(), RenderError> {
        self.ctx
            .arc(x, y, radius, start_angle, end_angle)
            .map_err(backend)
    }

    fn set_fill_style(&mut self, color: &str) {
        self.ctx.set_fill_style_str(color);
    }

    fn fill(&mut self) {
        self.ctx.fill();
    }
}

/// Element whose layout box the canvas fills.
pub struct ElementContainer {
    element: HtmlElement,
}

impl ElementContainer {
    pub fn new(element: HtmlElement) -> Self {
        Self { element }
    }
}

impl ContainerPort for ElementContainer {
    fn logical_size(&self) -> LogicalSize {
        LogicalSize::new(
            f64::from(self.element.offset_width()),
            f64::from(self.element.offset_height()),
        )
    }
}

/// `window.devicePixelRatio`
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowDisplay;

impl DisplayMetricsPort for WindowDisplay {
    fn pixel_density(&self) -> f64 {
        web_sys::window()
            .map(|w| w.device_pixel_ratio())
            .unwrap_or(1.0)
    }
}
