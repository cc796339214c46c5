#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// color transformations module.
pub mod color;

/// harris corner detection module.
pub mod corners;

/// utilities to draw on images.
pub mod draw;

/// sobel edge detection with hysteresis thresholding.
pub mod edges;

/// image enhancement module.
pub mod enhance;

/// image filtering module.
pub mod filter;

/// compute and equalize image histograms.
pub mod histogram;

/// hough line transform module.
pub mod hough;

/// synthetic noise generation.
pub mod noise;

/// module containing parallization utilities.
pub mod parallel;
