//! Thumbcrop WASM - WebAssembly bindings for Thumbcrop
//!
//! This crate wires thumbcrop-core to the browser: two `<canvas>` elements,
//! mouse and touch listeners, async crop encoding and object URLs.
//!
//! # Module Structure
//!
//! - `editor` - The `ThumbnailEditor` class
//! - `canvas` - Copying raster surfaces onto canvases
//! - `download` - Object URL lifetime and file download
//! - `types` - JS-facing config and view snapshot types
//!
//! # Usage
//!
//! ```typescript
//! import init, { ThumbnailEditor } from '@thumbcrop/wasm';
//!
//! await init();
//!
//! const editor = new ThumbnailEditor(previewCanvas, cropCanvas, { viewportSize: 400 });
//! editor.attach_listeners();
//! editor.on_crop_change((url) => { img.src = url; });
//! await editor.load_default();
//!
//! zoomInput.oninput = () => editor.set_numeric('zoom', zoomInput.value);
//! ```

use wasm_bindgen::prelude::*;

mod canvas;
mod download;
mod editor;
mod types;

pub use download::{save, BrowserUrls, ObjectUrlSlot, UrlRegistry};
pub use editor::ThumbnailEditor;
pub use types::ViewSnapshot;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_ok() {
        log::info!("thumbcrop {} ready", version());
    }
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
