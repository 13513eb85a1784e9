//! JS-facing wrapper types.
//!
//! Plain data crosses the boundary as serde values via `serde-wasm-bindgen`;
//! the editor itself stays a `#[wasm_bindgen]` class in `editor.rs`.

use serde::{Deserialize, Serialize};
use thumbcrop_core::{EditorConfig, NumericField, ViewState};
use wasm_bindgen::prelude::*;

/// Snapshot of the view that the UI mirrors into its inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSnapshot {
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
    pub dragging: bool,
}

impl ViewSnapshot {
    pub(crate) fn new(view: ViewState, dragging: bool) -> Self {
        Self {
            zoom: view.zoom,
            pan_x: view.pan.x,
            pan_y: view.pan.y,
            dragging,
        }
    }
}

/// Read an editor config from JS. `undefined`/`null` give the defaults,
/// missing fields fall back to their defaults.
pub(crate) fn parse_config(value: JsValue) -> Result<EditorConfig, JsValue> {
    let config = if value.is_undefined() || value.is_null() {
        EditorConfig::default()
    } else {
        serde_wasm_bindgen::from_value(value).map_err(to_js_error)?
    };
    config.validate().map_err(to_js_error)?;
    Ok(config)
}

/// Map the input field names used by the UI to a [`NumericField`].
pub(crate) fn numeric_field(name: &str) -> Option<NumericField> {
    match name {
        "zoom" => Some(NumericField::Zoom),
        "panX" | "pan_x" => Some(NumericField::PanX),
        "panY" | "pan_y" => Some(NumericField::PanY),
        _ => None,
    }
}

pub(crate) fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use thumbcrop_core::Point;

    #[test]
    fn test_snapshot_from_view() {
        let view = ViewState::new(1.5, Point::new(-3.0, 4.0));
        let snapshot = ViewSnapshot::new(view, true);
        assert_eq!(snapshot.zoom, 1.5);
        assert_eq!(snapshot.pan_x, -3.0);
        assert_eq!(snapshot.pan_y, 4.0);
        assert!(snapshot.dragging);
    }

    #[test]
    fn test_numeric_field_names() {
        assert_eq!(numeric_field("zoom"), Some(NumericField::Zoom));
        assert_eq!(numeric_field("panX"), Some(NumericField::PanX));
        assert_eq!(numeric_field("pan_y"), Some(NumericField::PanY));
        assert_eq!(numeric_field("rotation"), None);
    }
}
