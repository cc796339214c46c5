#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for I/O operations.
///
/// Defines [`error::IoError`] variants for file access and encoding/decoding failures.
pub mod error;

/// High-level image reading and writing functions.
///
/// See [`functional::read_image_rgb8`] for automatic format detection and
/// [`functional::list_images`] to collect the images of a directory.
pub mod functional;

pub use error::IoError;
