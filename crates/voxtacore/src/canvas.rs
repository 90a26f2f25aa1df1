use crate::ImageRef;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub color: String,
    pub font: String,
    pub align: TextAlign,
}

/// The slice of the host's 2D drawing context that widgets use
pub trait Canvas {
    fn fill_rect(&mut self, rect: Rect, color: &str);

    fn fill_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle);

    fn draw_image(&mut self, image: &ImageRef, rect: Rect);
}

/// One recorded drawing operation
#[derive(Debug, Clone)]
pub enum DrawCall {
    FillRect { rect: Rect, color: String },
    FillText { text: String, x: f64, y: f64, style: TextStyle },
    DrawImage { src: String, rect: Rect },
}

/// Canvas that records calls instead of drawing, for hosts without a surface
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub calls: Vec<DrawCall>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn images(&self) -> Vec<(&str, Rect)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::DrawImage { src, rect } => Some((src.as_str(), *rect)),
                _ => None,
            })
            .collect()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::FillText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Canvas for RecordingCanvas {
    fn fill_rect(&mut self, rect: Rect, color: &str) {
        self.calls.push(DrawCall::FillRect {
            rect,
            color: color.to_string(),
        });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle) {
        self.calls.push(DrawCall::FillText {
            text: text.to_string(),
            x,
            y,
            style: style.clone(),
        });
    }

    fn draw_image(&mut self, image: &ImageRef, rect: Rect) {
        self.calls.push(DrawCall::DrawImage {
            src: image.src().to_string(),
            rect,
        });
    }
}
