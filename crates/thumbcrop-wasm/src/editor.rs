//! The `ThumbnailEditor` class exposed to JavaScript.
//!
//! Owns one [`Editor`] plus its two canvases. Every input runs the editor's
//! pipeline synchronously, copies both surfaces to their canvases, and queues
//! the crop encode with `spawn_local` so the handler returns before encoding.
//! When the encode commits, the crop gets a fresh object URL.
//!
//! Event listener closures hold a `Weak` handle, so dropping or destroying the
//! editor does not leak it through its own listeners.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use js_sys::{Function, Uint8Array};
use thumbcrop_core::{
    Action, Completion, Editor, EditorError, EncodeJob, EncodeOutcome, Point,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, spawn_local, JsFuture};
use web_sys::{
    AddEventListenerOptions, Event, EventTarget, HtmlCanvasElement, MouseEvent, Response,
    TouchEvent,
};

use crate::canvas;
use crate::download::{self, blob_from_bytes, BrowserUrls, ObjectUrlSlot};
use crate::types::{numeric_field, parse_config, to_js_error, ViewSnapshot};

type Listener = Closure<dyn FnMut(Event)>;

struct Host {
    editor: Editor,
    preview_canvas: HtmlCanvasElement,
    crop_canvas: HtmlCanvasElement,
    crop_url: ObjectUrlSlot<BrowserUrls>,
    listeners: Vec<(&'static str, Listener)>,
    /// Number of images loaded so far.
    loads: u64,
    on_view: Option<Function>,
    on_crop: Option<Function>,
}

impl Host {
    fn present(&self) {
        canvas::blit_or_skip(self.editor.preview(), &self.preview_canvas);
        canvas::blit_or_skip(self.editor.crop(), &self.crop_canvas);
    }

    fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot::new(self.editor.view(), self.editor.is_dragging())
    }

    /// Commit an encode and refresh the crop URL. Returns the new URL.
    fn commit(&mut self, outcome: EncodeOutcome) -> Option<String> {
        if self.editor.finish_encode(outcome) != Completion::Committed {
            return None;
        }
        let crop = self.editor.rendered_crop()?;
        let blob = match blob_from_bytes(&crop.bytes, crop.mime) {
            Ok(blob) => blob,
            Err(e) => {
                log::warn!("failed to wrap crop in a blob: {:?}", e);
                return None;
            }
        };
        match self.crop_url.replace(&blob) {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                log::warn!("failed to create crop URL: {:?}", e);
                None
            }
        }
    }

    fn detach_listeners(&mut self) {
        let target: &EventTarget = self.preview_canvas.as_ref();
        for (kind, listener) in self.listeners.drain(..) {
            target
                .remove_event_listener_with_callback(kind, listener.as_ref().unchecked_ref())
                .ok();
        }
    }
}

impl Drop for Host {
    fn drop(&mut self) {
        self.detach_listeners();
    }
}

fn notify(callback: Option<Function>, value: &JsValue) {
    if let Some(f) = callback {
        if let Err(e) = f.call1(&JsValue::NULL, value) {
            log::warn!("callback threw: {:?}", e);
        }
    }
}

/// Run `action` through the editor, present the frame and queue its encode.
fn apply(shared: &Rc<RefCell<Host>>, action: Action) -> Result<(), EditorError> {
    let (job, on_view, snapshot) = {
        let mut host = shared.borrow_mut();
        let job = host.editor.dispatch(action)?;
        if job.is_some() {
            host.present();
        }
        (job, host.on_view.clone(), host.snapshot())
    };

    if let Some(job) = job {
        queue_encode(shared, job);
    }
    if let Ok(value) = serde_wasm_bindgen::to_value(&snapshot) {
        notify(on_view, &value);
    }
    Ok(())
}

fn load(shared: &Rc<RefCell<Host>>, bytes: &[u8]) -> Result<(), EditorError> {
    let (job, on_view, snapshot) = {
        let mut host = shared.borrow_mut();
        let job = host.editor.load_bytes(bytes)?;
        host.loads += 1;
        host.present();
        (job, host.on_view.clone(), host.snapshot())
    };

    queue_encode(shared, job);
    if let Ok(value) = serde_wasm_bindgen::to_value(&snapshot) {
        notify(on_view, &value);
    }
    Ok(())
}

/// The host, unless an image was loaded after the `loads` snapshot was taken.
fn unchanged_since(
    weak: &Weak<RefCell<Host>>,
    loads: u64,
) -> Result<Option<Rc<RefCell<Host>>>, JsValue> {
    let shared = weak
        .upgrade()
        .ok_or_else(|| JsValue::from_str("Editor was destroyed"))?;
    if shared.borrow().loads != loads {
        log::debug!("default image superseded by a newer load");
        return Ok(None);
    }
    Ok(Some(shared))
}

fn queue_encode(shared: &Rc<RefCell<Host>>, job: EncodeJob) {
    let weak = Rc::downgrade(shared);
    spawn_local(async move {
        let outcome = job.run();
        let Some(shared) = weak.upgrade() else {
            return;
        };
        let (url, on_crop) = {
            let mut host = shared.borrow_mut();
            (host.commit(outcome), host.on_crop.clone())
        };
        if let Some(url) = url {
            notify(on_crop, &JsValue::from_str(&url));
        }
    });
}

fn mouse_point(event: &Event) -> Option<Point> {
    let mouse = event.dyn_ref::<MouseEvent>()?;
    Some(Point::new(mouse.client_x() as f64, mouse.client_y() as f64))
}

/// Position of the first active touch.
fn touch_point(event: &Event) -> Option<Point> {
    let touch = event.dyn_ref::<TouchEvent>()?.touches().get(0)?;
    Some(Point::new(touch.client_x() as f64, touch.client_y() as f64))
}

/// Map a DOM event to an editor action.
fn action_for(kind: &str, event: &Event) -> Option<Action> {
    match kind {
        "mousedown" => mouse_point(event).map(Action::PointerDown),
        "mousemove" => mouse_point(event).map(Action::PointerMove),
        "touchstart" => touch_point(event).map(Action::PointerDown),
        "touchmove" => touch_point(event).map(Action::PointerMove),
        "mouseup" => Some(Action::PointerUp),
        "mouseleave" => Some(Action::PointerLeave),
        "touchend" => Some(Action::TouchEnd),
        "touchcancel" => Some(Action::TouchCancel),
        _ => None,
    }
}

const EVENTS: [&str; 8] = [
    "mousedown",
    "mousemove",
    "mouseup",
    "mouseleave",
    "touchstart",
    "touchmove",
    "touchend",
    "touchcancel",
];

/// Circular thumbnail editor bound to a preview and a crop canvas.
#[wasm_bindgen]
pub struct ThumbnailEditor {
    shared: Rc<RefCell<Host>>,
}

#[wasm_bindgen]
impl ThumbnailEditor {
    /// Create an editor drawing into `preview_canvas` and `crop_canvas`.
    ///
    /// `config` is an optional object with camelCase `EditorConfig` fields.
    #[wasm_bindgen(constructor)]
    pub fn new(
        preview_canvas: HtmlCanvasElement,
        crop_canvas: HtmlCanvasElement,
        config: JsValue,
    ) -> Result<ThumbnailEditor, JsValue> {
        let config = parse_config(config)?;
        let editor = Editor::new(config).map_err(to_js_error)?;

        canvas::prepare(&preview_canvas, editor.preview());
        canvas::prepare(&crop_canvas, editor.crop());

        Ok(ThumbnailEditor {
            shared: Rc::new(RefCell::new(Host {
                editor,
                preview_canvas,
                crop_canvas,
                crop_url: ObjectUrlSlot::new(BrowserUrls),
                listeners: Vec::new(),
                loads: 0,
                on_view: None,
                on_crop: None,
            })),
        })
    }

    /// Listen for mouse and touch drags on the preview canvas.
    ///
    /// Touch events are not passive so the page doesn't scroll during a drag.
    pub fn attach_listeners(&self) -> Result<(), JsValue> {
        let mut host = self.shared.borrow_mut();
        host.detach_listeners();

        let target: EventTarget = host.preview_canvas.clone().into();
        for kind in EVENTS {
            let weak: Weak<RefCell<Host>> = Rc::downgrade(&self.shared);
            let listener = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
                if kind.starts_with("touch") {
                    event.prevent_default();
                    event.stop_propagation();
                }
                let Some(shared) = weak.upgrade() else {
                    return;
                };
                if let Some(action) = action_for(kind, &event) {
                    if let Err(e) = apply(&shared, action) {
                        log::warn!("{} ignored: {}", kind, e);
                    }
                }
            });

            let options = AddEventListenerOptions::new();
            options.set_passive(false);
            target.add_event_listener_with_callback_and_add_event_listener_options(
                kind,
                listener.as_ref().unchecked_ref(),
                &options,
            )?;
            host.listeners.push((kind, listener));
        }
        Ok(())
    }

    /// Decode `bytes` and make them the current image.
    ///
    /// On failure the previous image and view are kept.
    pub fn load_file(&self, bytes: &[u8]) -> Result<(), JsValue> {
        load(&self.shared, bytes).map_err(to_js_error)
    }

    /// Fetch and load the configured default image.
    ///
    /// Resolves to `true` once loaded, or `false` if another image was loaded
    /// while the fetch was in flight (that image is kept).
    pub fn load_default(&self) -> js_sys::Promise {
        let (path, loads) = {
            let host = self.shared.borrow();
            (host.editor.config().default_image_path.clone(), host.loads)
        };
        let weak = Rc::downgrade(&self.shared);

        future_to_promise(async move {
            let window = web_sys::window()
                .ok_or_else(|| JsValue::from_str("No window"))?;
            let response: Response = JsFuture::from(window.fetch_with_str(&path))
                .await?
                .dyn_into()?;
            if unchanged_since(&weak, loads)?.is_none() {
                return Ok(JsValue::FALSE);
            }
            if !response.ok() {
                return Err(JsValue::from_str(&format!(
                    "Failed to fetch {}: HTTP {}",
                    path,
                    response.status()
                )));
            }
            let buffer = JsFuture::from(response.array_buffer()?).await?;
            let bytes = Uint8Array::new(&buffer).to_vec();

            let Some(shared) = unchanged_since(&weak, loads)? else {
                return Ok(JsValue::FALSE);
            };
            load(&shared, &bytes).map_err(to_js_error)?;
            Ok(JsValue::TRUE)
        })
    }

    pub fn set_zoom(&self, zoom: f64) -> Result<(), JsValue> {
        apply(&self.shared, Action::SetZoom(zoom)).map_err(to_js_error)
    }

    pub fn set_pan(&self, x: f64, y: f64) -> Result<(), JsValue> {
        apply(&self.shared, Action::SetPan(Point::new(x, y)))
            .map_err(to_js_error)
    }

    /// Apply the raw text of an input: `field` is `zoom`, `panX` or `panY`.
    pub fn set_numeric(&self, field: &str, text: &str) -> Result<(), JsValue> {
        let field = numeric_field(field)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown field: {}", field)))?;
        apply(&self.shared, Action::Numeric(field, text.to_string()))
            .map_err(to_js_error)
    }

    pub fn reset(&self) -> Result<(), JsValue> {
        apply(&self.shared, Action::Reset).map_err(to_js_error)
    }

    pub fn pointer_down(&self, x: f64, y: f64) -> Result<(), JsValue> {
        apply(&self.shared, Action::PointerDown(Point::new(x, y)))
            .map_err(to_js_error)
    }

    pub fn pointer_move(&self, x: f64, y: f64) -> Result<(), JsValue> {
        apply(&self.shared, Action::PointerMove(Point::new(x, y)))
            .map_err(to_js_error)
    }

    pub fn pointer_up(&self) -> Result<(), JsValue> {
        apply(&self.shared, Action::PointerUp).map_err(to_js_error)
    }

    pub fn pointer_leave(&self) -> Result<(), JsValue> {
        apply(&self.shared, Action::PointerLeave).map_err(to_js_error)
    }

    /// Current zoom, pan and drag flag as `{ zoom, panX, panY, dragging }`.
    pub fn view_state(&self) -> Result<JsValue, JsValue> {
        let snapshot = self.shared.borrow().snapshot();
        serde_wasm_bindgen::to_value(&snapshot).map_err(to_js_error)
    }

    /// Natural width of the current image.
    pub fn image_width(&self) -> Option<u32> {
        self.shared.borrow().editor.image().map(|image| image.width)
    }

    pub fn image_height(&self) -> Option<u32> {
        self.shared.borrow().editor.image().map(|image| image.height)
    }

    /// Called with the view snapshot after every input.
    pub fn on_view_change(&self, callback: Option<Function>) {
        self.shared.borrow_mut().on_view = callback;
    }

    /// Called with the new object URL whenever a crop encode commits.
    pub fn on_crop_change(&self, callback: Option<Function>) {
        self.shared.borrow_mut().on_crop = callback;
    }

    /// Object URL of the latest encoded crop.
    pub fn crop_url(&self) -> Option<String> {
        self.shared.borrow().crop_url.current().map(str::to_string)
    }

    pub fn crop_byte_size(&self) -> Option<u32> {
        let host = self.shared.borrow();
        let crop = host.editor.rendered_crop()?;
        u32::try_from(crop.size()).ok()
    }

    pub fn crop_mime(&self) -> Option<String> {
        let host = self.shared.borrow();
        host.editor.rendered_crop().map(|crop| crop.mime.to_string())
    }

    /// Encoded crop bytes as a `Uint8Array`.
    pub fn crop_bytes(&self) -> Option<Vec<u8>> {
        let host = self.shared.borrow();
        host.editor.rendered_crop().map(|crop| crop.bytes.clone())
    }

    /// Download the latest crop under the configured filename.
    pub fn save(&self) -> Result<(), JsValue> {
        let host = self.shared.borrow();
        let crop = host
            .editor
            .rendered_crop()
            .ok_or_else(|| JsValue::from_str("No crop to save yet"))?;
        download::save(&crop.bytes, crop.mime, &host.editor.config().download_filename())
    }

    /// Remove listeners and revoke the crop URL.
    pub fn destroy(&self) {
        let mut host = self.shared.borrow_mut();
        host.detach_listeners();
        host.crop_url.release();
        host.on_view = None;
        host.on_crop = None;
    }
}
