//! Source image decoding for the editor.
//!
//! This module turns the raw bytes of a user-selected file (or the bundled
//! default asset) into a [`SourceImage`]:
//! - PNG, JPEG, WEBP and GIF via the `image` crate
//! - EXIF orientation correction, matching how browsers display photos
//! - RGBA output so source transparency shows through the checker background
//!
//! # Examples
//!
//! ```ignore
//! use thumbcrop_core::decode::decode_image;
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let image = decode_image(&bytes).unwrap();
//! println!("Decoded {}x{} image", image.width, image.height);
//! ```

mod source;
mod types;

pub use source::decode_image;
pub use types::{DecodeError, Orientation, SourceImage};
