//! Filter operations
//!
//! This module provides the 2D correlation primitive and the filters built on it.

/// Filter kernels
pub mod kernels;
pub use kernels::Kernel;

/// Generic 2D convolution
mod convolution;
pub use convolution::*;

/// Filter operations
mod ops;
pub use ops::*;
