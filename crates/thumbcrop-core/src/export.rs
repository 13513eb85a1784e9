//! Serialization of the crop surface, latest frame wins.
//!
//! Encoding is split in three steps so the browser can run the middle one
//! after the input handler has returned:
//!
//! 1. [`ExportPipeline::begin`] snapshots the crop pixels and stamps the job
//!    with a new generation number
//! 2. [`EncodeJob::run`] encodes the snapshot (no access to the pipeline)
//! 3. [`ExportPipeline::complete`] commits the result unless a newer frame
//!    has already been committed
//!
//! A failed encode never replaces the last good crop.

use crate::encode::{encode_rgba, EncodeError, ExportFormat};
use crate::render::Surface;

/// Encoded bytes of the circular crop for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedCrop {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    /// Generation of the frame these bytes were encoded from.
    pub generation: u64,
}

impl RenderedCrop {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// A snapshot of the crop surface waiting to be encoded.
#[derive(Debug, Clone)]
pub struct EncodeJob {
    generation: u64,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    format: ExportFormat,
    matte: [u8; 3],
}

impl EncodeJob {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Encode the snapshot.
    pub fn run(self) -> EncodeOutcome {
        let result = encode_rgba(
            &self.pixels,
            self.width,
            self.height,
            self.format,
            self.matte,
        );
        EncodeOutcome {
            generation: self.generation,
            mime: self.format.mime(),
            result,
        }
    }
}

/// Result of running an [`EncodeJob`].
#[derive(Debug)]
pub struct EncodeOutcome {
    generation: u64,
    mime: &'static str,
    result: Result<Vec<u8>, EncodeError>,
}

impl EncodeOutcome {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What [`ExportPipeline::complete`] did with an outcome.
#[derive(Debug, PartialEq, Eq)]
pub enum Completion {
    /// The outcome is now the latest crop.
    Committed,
    /// A newer frame was already committed; the outcome was dropped.
    Stale,
    /// Encoding failed; the previous crop is kept.
    Failed(String),
}

/// Tracks in-flight encodes and the latest committed crop.
#[derive(Debug, Clone)]
pub struct ExportPipeline {
    format: ExportFormat,
    matte: [u8; 3],
    issued: u64,
    latest: Option<RenderedCrop>,
}

impl ExportPipeline {
    pub fn new(format: ExportFormat, matte: [u8; 3]) -> Self {
        Self {
            format,
            matte,
            issued: 0,
            latest: None,
        }
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    /// Snapshot `surface` into a new job with the next generation number.
    pub fn begin<S: Surface + ?Sized>(&mut self, surface: &S) -> EncodeJob {
        self.issued += 1;
        let (width, height) = surface.dimensions();
        EncodeJob {
            generation: self.issued,
            width,
            height,
            pixels: surface.pixels().to_vec(),
            format: self.format,
            matte: self.matte,
        }
    }

    /// Commit `outcome` if it is newer than the committed crop.
    pub fn complete(&mut self, outcome: EncodeOutcome) -> Completion {
        let committed = self.latest.as_ref().map_or(0, |c| c.generation);
        if outcome.generation <= committed {
            log::debug!(
                "dropping stale crop encode (generation {} <= {})",
                outcome.generation,
                committed
            );
            return Completion::Stale;
        }

        match outcome.result {
            Ok(bytes) => {
                log::debug!(
                    "committed crop generation {} ({} bytes)",
                    outcome.generation,
                    bytes.len()
                );
                self.latest = Some(RenderedCrop {
                    bytes,
                    mime: outcome.mime,
                    generation: outcome.generation,
                });
                Completion::Committed
            }
            Err(e) => {
                log::warn!("crop encode failed, keeping previous crop: {}", e);
                Completion::Failed(e.to_string())
            }
        }
    }

    /// Latest successfully encoded crop, if any.
    pub fn latest(&self) -> Option<&RenderedCrop> {
        self.latest.as_ref()
    }

    /// True when the latest crop was encoded from the most recent frame.
    pub fn is_current(&self) -> bool {
        self.latest
            .as_ref()
            .is_some_and(|c| c.generation == self.issued)
    }
}
