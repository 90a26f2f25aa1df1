//! Core abstractions for Voxta node-graph extensions
//!
//! Host-facing types (nodes, widgets, canvas, images), handler composition,
//! execution-message probing and path normalisation. Nothing here performs
//! I/O or spawns tasks.

mod canvas;
mod error;
mod handler;
mod image;
pub mod message;
mod node;
pub mod path;
mod widget;

pub use canvas::{Canvas, DrawCall, RecordingCanvas, Rect, TextAlign, TextStyle};
pub use error::{ExtensionError, FetchError};
pub use handler::{compose, Handler};
pub use image::{ImageRef, ImageSize, ImageState};
pub use node::{GraphNode, HostNode, NodeId, NodeRef};
pub use widget::{CustomWidget, TextWidget, Widget, WidgetCallback};

/// Result type for extension operations
pub type Result<T> = std::result::Result<T, ExtensionError>;
