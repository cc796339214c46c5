#![deny(missing_docs)]
//! Image processing workbench and synthetic degradation pipelines.
//!
//! The building blocks live in the sub crates re-exported here; this crate wires them
//! into the two pipelines of the toolkit:
//!
//! * [`workbench::apply`] runs a contrast stage followed by a segmentation stage on a
//!   single image.
//! * [`degrade::run_batch`] writes five degraded variants of every image of a
//!   directory, stopping early when its [`CancellationToken`] is cancelled.

#[doc(inline)]
pub use imlab_image as image;

#[doc(inline)]
pub use imlab_imgproc as imgproc;

#[doc(inline)]
pub use imlab_io as io;

mod cancel;
pub use cancel::CancellationToken;

/// Batch generation of degraded images.
pub mod degrade;

mod error;
pub use error::Error;

/// Parameter records of the pipelines.
pub mod params;

/// Contrast and segmentation pipeline for a single image.
pub mod workbench;
