/// An error type for image creation and processing.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    /// Error when channel and shape are not valid.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when the image size is not valid.
    #[error("Invalid image size ({0}, {1}) mismatch ({2}, {3})")]
    InvalidImageSize(usize, usize, usize, usize),

    /// Error when the channel index is out of bounds.
    #[error("Channel index {0} is out of bounds {1}")]
    ChannelIndexOutOfBounds(usize, usize),

    /// Error when the pixel index is out of bounds.
    #[error("Pixel index ({0}, {1}) is out of bounds ({2}, {3})")]
    PixelIndexOutOfBounds(usize, usize, usize, usize),

    /// Error when a pixel value cannot be cast to the target type.
    #[error("Failed to cast image data to {0}")]
    CastError(String),

    /// Error when the kernel dimensions are not odd or are empty.
    #[error("Invalid kernel size {0}x{1}, both dimensions must be odd")]
    InvalidKernelSize(usize, usize),

    /// Error when the number of histogram bins is not valid.
    #[error("Invalid number of histogram bins {0}")]
    InvalidHistogramBins(usize),

    /// Error when an operation does not support the number of channels.
    #[error("Unsupported number of channels {0}")]
    UnsupportedChannels(usize),

    /// Error when a processing parameter is out of its valid range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}
