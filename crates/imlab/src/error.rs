use imlab_image::ImageError;
use imlab_io::IoError;

/// An error type for the pipelines.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Error raised by an image operation.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Error raised while reading or writing files.
    #[error(transparent)]
    Io(#[from] IoError),

    /// Error when a pipeline parameter is out of its valid range.
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// The name of the parameter.
        name: &'static str,
        /// What is wrong with its value.
        reason: String,
    },
}
