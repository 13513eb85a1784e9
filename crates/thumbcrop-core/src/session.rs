//! The editor session: state plus the explicit render pipeline.
//!
//! Every mutation goes through [`Editor::dispatch`], [`Editor::load`] or
//! [`Editor::load_bytes`], and each of them runs the same pipeline:
//!
//! ```text
//! mutate ViewState -> draw rect -> redraw preview + crop -> encode job
//! ```
//!
//! The pipeline returns the [`EncodeJob`] instead of running it, so a host
//! can encode after its input handler returns. [`Editor::dispatch_now`] and
//! friends run the job inline for callers that don't care.

use thiserror::Error;

use crate::config::{ConfigError, EditorConfig};
use crate::decode::{decode_image, DecodeError, SourceImage};
use crate::export::{Completion, EncodeJob, EncodeOutcome, ExportPipeline, RenderedCrop};
use crate::geometry::{draw_offset, draw_rect, Placement, Point, Rect, ViewState};
use crate::gesture::{parse_numeric, GestureController, InputError, NumericField};
use crate::render::{
    crop_surface, preview_surface, render_crop, render_preview, PreviewStyle, RasterSurface,
    RenderError,
};

/// Errors surfaced by the editor session.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// A user intent that may change the view.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    PointerDown(Point),
    PointerMove(Point),
    PointerUp,
    PointerLeave,
    TouchEnd,
    TouchCancel,
    /// Raw text from a number input or slider.
    Numeric(NumericField, String),
    SetZoom(f64),
    SetPan(Point),
    Reset,
}

/// One image, one view, two surfaces.
#[derive(Debug, Clone)]
pub struct Editor {
    config: EditorConfig,
    style: PreviewStyle,
    image: Option<SourceImage>,
    placement: Placement,
    view: ViewState,
    gestures: GestureController,
    preview: RasterSurface,
    crop: RasterSurface,
    export: ExportPipeline,
}

impl Editor {
    /// Set up both surfaces (installing the crop clip) for `config`.
    pub fn new(config: EditorConfig) -> Result<Self, EditorError> {
        config.validate()?;

        let preview = preview_surface(config.viewport_size);
        let crop = crop_surface(config.viewport_size, config.crop_size);
        let export = ExportPipeline::new(config.format, config.matte);

        Ok(Self {
            style: PreviewStyle::from(&config),
            config,
            image: None,
            placement: Placement::default(),
            view: ViewState::default(),
            gestures: GestureController::new(),
            preview,
            crop,
            export,
        })
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn image(&self) -> Option<&SourceImage> {
        self.image.as_ref()
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn is_dragging(&self) -> bool {
        self.gestures.is_dragging()
    }

    pub fn preview(&self) -> &RasterSurface {
        &self.preview
    }

    pub fn crop(&self) -> &RasterSurface {
        &self.crop
    }

    /// Offset added to the placement origin for the current frame.
    pub fn draw_offset(&self) -> Point {
        draw_offset(&self.placement, &self.view, self.config.viewport())
    }

    /// Destination rectangle of the image for the current frame.
    pub fn draw_rect(&self) -> Rect {
        draw_rect(&self.placement, &self.view, self.config.viewport())
    }

    /// Latest successfully encoded crop.
    pub fn rendered_crop(&self) -> Option<&RenderedCrop> {
        self.export.latest()
    }

    /// Decode `bytes` and make them the current image.
    ///
    /// On failure nothing changes: the previous image, placement and view
    /// stay as they were.
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<EncodeJob, EditorError> {
        let image = decode_image(bytes).inspect_err(|e| {
            log::warn!("image decode failed, keeping current image: {}", e);
        })?;
        Ok(self.load(image)?)
    }

    /// Replace the current image, recompute its placement and reset the view.
    pub fn load(&mut self, image: SourceImage) -> Result<EncodeJob, RenderError> {
        self.placement = Placement::fit(image.width, image.height, self.config.viewport());
        log::info!(
            "loaded {}x{} image, placement {:?}",
            image.width,
            image.height,
            self.placement
        );
        self.image = Some(image);
        self.gestures.end_drag();
        self.view.reset();
        self.redraw()
    }

    /// Apply `action`. Returns the encode job for the new frame when the view
    /// changed and an image is loaded, `None` otherwise.
    pub fn dispatch(&mut self, action: Action) -> Result<Option<EncodeJob>, EditorError> {
        let changed = match action {
            Action::PointerDown(at) => {
                self.gestures.pointer_down(at);
                false
            }
            Action::PointerMove(at) => self.gestures.pointer_move(at, &mut self.view),
            Action::PointerUp => {
                self.gestures.pointer_up();
                false
            }
            Action::PointerLeave => {
                self.gestures.pointer_leave();
                false
            }
            Action::TouchEnd => {
                self.gestures.touch_end();
                false
            }
            Action::TouchCancel => {
                self.gestures.touch_cancel();
                false
            }
            Action::Numeric(field, text) => {
                let value = parse_numeric(&text)?;
                field.apply(&mut self.view, value)
            }
            Action::SetZoom(zoom) => NumericField::Zoom.apply(&mut self.view, zoom),
            Action::SetPan(pan) => {
                let x = NumericField::PanX.apply(&mut self.view, pan.x);
                let y = NumericField::PanY.apply(&mut self.view, pan.y);
                x || y
            }
            Action::Reset => {
                log::info!("view reset");
                let changed = !self.view.is_reset();
                self.view.reset();
                changed
            }
        };

        if !changed {
            return Ok(None);
        }

        match self.redraw() {
            Ok(job) => Ok(Some(job)),
            Err(RenderError::MissingImage) => {
                log::debug!("view changed before any image was loaded; nothing to draw");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Redraw both surfaces from the current state and snapshot the crop.
    ///
    /// Without an image the surfaces are left untouched.
    pub fn redraw(&mut self) -> Result<EncodeJob, RenderError> {
        let image = self.image.as_ref().ok_or(RenderError::MissingImage)?;
        let dest = draw_rect(&self.placement, &self.view, self.config.viewport());

        log::debug!(
            "redraw zoom={} pan=({}, {}) dest={:?}",
            self.view.zoom,
            self.view.pan.x,
            self.view.pan.y,
            dest
        );

        render_preview(
            &mut self.preview,
            image,
            dest,
            self.config.viewport(),
            &self.style,
        );
        render_crop(&mut self.crop, image, dest);

        Ok(self.export.begin(&self.crop))
    }

    /// Hand an encode result back to the export pipeline.
    pub fn finish_encode(&mut self, outcome: EncodeOutcome) -> Completion {
        self.export.complete(outcome)
    }

    /// [`Editor::dispatch`] with the encode run inline.
    pub fn dispatch_now(&mut self, action: Action) -> Result<Option<Completion>, EditorError> {
        Ok(self.dispatch(action)?.map(|job| self.finish_encode(job.run())))
    }

    /// [`Editor::load_bytes`] with the encode run inline.
    pub fn load_bytes_now(&mut self, bytes: &[u8]) -> Result<Completion, EditorError> {
        let job = self.load_bytes(bytes)?;
        Ok(self.finish_encode(job.run()))
    }

    /// [`Editor::load`] with the encode run inline.
    pub fn load_now(&mut self, image: SourceImage) -> Result<Completion, EditorError> {
        let job = self.load(image)?;
        Ok(self.finish_encode(job.run()))
    }
}
