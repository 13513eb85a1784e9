//! Object URLs for the encoded crop, and the download trigger.
//!
//! Every `URL.createObjectURL` pins its blob until it is revoked, and the
//! crop is re-encoded on every frame. [`ObjectUrlSlot`] keeps at most one
//! live URL: replacing it revokes the previous one, and so does dropping it.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

/// Creates and revokes object URLs.
pub trait UrlRegistry {
    type Source: ?Sized;
    type Error;

    fn create(&self, source: &Self::Source) -> Result<String, Self::Error>;
    fn revoke(&self, url: &str);
}

/// `URL.createObjectURL` / `URL.revokeObjectURL`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserUrls;

impl UrlRegistry for BrowserUrls {
    type Source = Blob;
    type Error = JsValue;

    fn create(&self, blob: &Blob) -> Result<String, JsValue> {
        Url::create_object_url_with_blob(blob)
    }

    fn revoke(&self, url: &str) {
        if let Err(e) = Url::revoke_object_url(url) {
            log::warn!("failed to revoke {}: {:?}", url, e);
        }
    }
}

/// Holds at most one live object URL.
#[derive(Debug)]
pub struct ObjectUrlSlot<R: UrlRegistry> {
    registry: R,
    current: Option<String>,
}

impl<R: UrlRegistry> ObjectUrlSlot<R> {
    pub fn new(registry: R) -> Self {
        Self {
            registry,
            current: None,
        }
    }

    /// Create a URL for `source` and revoke the previous one.
    ///
    /// If creation fails the previous URL stays live.
    pub fn replace(&mut self, source: &R::Source) -> Result<&str, R::Error> {
        let url = self.registry.create(source)?;
        if let Some(old) = self.current.replace(url) {
            self.registry.revoke(&old);
        }
        Ok(self.current.as_deref().unwrap_or_default())
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Revoke the live URL, if any.
    pub fn release(&mut self) {
        if let Some(url) = self.current.take() {
            self.registry.revoke(&url);
        }
    }
}

impl<R: UrlRegistry> Drop for ObjectUrlSlot<R> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Wrap `bytes` in a Blob of type `mime`.
pub(crate) fn blob_from_bytes(bytes: &[u8], mime: &str) -> Result<Blob, JsValue> {
    let parts = js_sys::Array::new();
    parts.push(&js_sys::Uint8Array::from(bytes));

    let options = BlobPropertyBag::new();
    options.set_type(mime);
    Blob::new_with_u8_array_sequence_and_options(&parts, &options)
}

/// Offer `bytes` to the user as a file download named `filename`.
///
/// The temporary URL is revoked on the next task, after the click has been
/// handled.
pub fn save(bytes: &[u8], mime: &str, filename: &str) -> Result<(), JsValue> {
    let window = web_sys::window()
        .ok_or_else(|| JsValue::from_str("No window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("No document"))?;

    let blob = blob_from_bytes(bytes, mime)?;
    let url = Url::create_object_url_with_blob(&blob)?;

    let anchor = document
        .create_element("a")?
        .dyn_into::<HtmlAnchorElement>()
        .map_err(|_| JsValue::from_str("Failed to create download link"))?;
    anchor.set_href(&url);
    anchor.set_download(filename);
    anchor.click();

    log::info!("saving {} ({} bytes)", filename, bytes.len());

    let revoke = Closure::once_into_js(move || BrowserUrls.revoke(&url));
    window.set_timeout_with_callback_and_timeout_and_arguments_0(revoke.unchecked_ref(), 0)?;
    Ok(())
}
