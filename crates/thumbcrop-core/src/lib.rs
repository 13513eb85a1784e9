//! Thumbcrop Core - circular thumbnail editor
//!
//! This crate provides the core of Thumbcrop: placing an image inside a
//! square viewport, panning and zooming it, and exporting the region under
//! the circular mask as a small PNG.
//!
//! # Module Structure
//!
//! - `geometry` - Placement and draw-offset math (pure functions)
//! - `render` - Drawable surface abstraction and the software rasterizer
//! - `gesture` - Drag state machine and numeric input
//! - `export` - Latest-wins crop serialization
//! - `encode` - PNG/JPEG encoders
//! - `decode` - Source image decoding
//! - `config` - Editor configuration
//! - `session` - The editor that wires everything into one pipeline

pub mod config;
pub mod decode;
pub mod encode;
pub mod export;
pub mod geometry;
pub mod gesture;
pub mod render;
pub mod session;

pub use config::{ConfigError, EditorConfig};
pub use decode::{decode_image, DecodeError, SourceImage};
pub use encode::{EncodeError, ExportFormat};
pub use export::{Completion, EncodeJob, EncodeOutcome, ExportPipeline, RenderedCrop};
pub use geometry::{draw_offset, draw_rect, Circle, Placement, Point, Rect, ViewState};
pub use gesture::{DragState, GestureController, InputError, NumericField};
pub use render::{RasterSurface, RenderError, Surface};
pub use session::{Action, Editor, EditorError};
