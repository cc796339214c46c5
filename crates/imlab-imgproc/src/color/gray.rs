use crate::parallel;
use imlab_image::{Image, ImageError};

/// Define the RGB weights for the grayscale conversion.
const RW: f64 = 0.2989;
const GW: f64 = 0.5870;
const BW: f64 = 0.1140;

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    // the weights sum below one, so the result never exceeds 255
    (RW * r as f64 + GW * g as f64 + BW * b as f64) as u8
}

/// Convert an RGB8 image to grayscale using the formula:
///
/// Y = 0.2989 * R + 0.5870 * G + 0.1140 * B
///
/// The weighted sum is computed in double precision and truncated.
///
/// # Arguments
///
/// * `src` - The input RGB8 image.
/// * `dst` - The output grayscale image.
///
/// Precondition: the input and output images must have the same size.
///
/// # Example
///
/// ```
/// use imlab_image::{Image, ImageSize};
/// use imlab_imgproc::color::gray_from_rgb_u8;
///
/// let image = Image::<u8, 3>::new(
///     ImageSize {
///         width: 2,
///         height: 1,
///     },
///     vec![255, 255, 255, 100, 150, 200],
/// )
/// .unwrap();
///
/// let mut gray = Image::<u8, 1>::from_size_val(image.size(), 0).unwrap();
///
/// gray_from_rgb_u8(&image, &mut gray).unwrap();
/// assert_eq!(gray.as_slice(), &[254, 140]);
/// ```
pub fn gray_from_rgb_u8(src: &Image<u8, 3>, dst: &mut Image<u8, 1>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    parallel::par_iter_rows(src, dst, |src_pixel, dst_pixel| {
        dst_pixel[0] = luma(src_pixel[0], src_pixel[1], src_pixel[2]);
    });

    Ok(())
}

/// Reduce an 8-bit image to a single intensity channel.
///
/// Single channel images are copied as they are and three channel images are converted
/// with [`gray_from_rgb_u8`].
///
/// # Errors
///
/// Returns [`ImageError::UnsupportedChannels`] for any other channel count.
pub fn gray_from_image_u8<const C: usize>(src: &Image<u8, C>) -> Result<Image<u8, 1>, ImageError> {
    if C != 1 && C != 3 {
        return Err(ImageError::UnsupportedChannels(C));
    }

    let mut gray = Image::<u8, 1>::from_size_val(src.size(), 0)?;
    parallel::par_iter_rows(src, &mut gray, |src_pixel, dst_pixel| {
        dst_pixel[0] = if C == 1 {
            src_pixel[0]
        } else {
            luma(src_pixel[0], src_pixel[1], src_pixel[2])
        };
    });

    Ok(gray)
}

/// Convert a grayscale image to an RGB image by replicating the grayscale value across all three channels.
///
/// # Arguments
///
/// * `src` - The input grayscale image.
/// * `dst` - The output RGB image.
///
/// Precondition: the input and output images must have the same size.
pub fn rgb_from_gray<T>(src: &Image<T, 1>, dst: &mut Image<T, 3>) -> Result<(), ImageError>
where
    T: Copy + Send + Sync,
{
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    parallel::par_iter_rows(src, dst, |src_pixel, dst_pixel| {
        dst_pixel[0] = src_pixel[0];
        dst_pixel[1] = src_pixel[0];
        dst_pixel[2] = src_pixel[0];
    });

    Ok(())
}
