use imlab_image::{Image, ImageError};

use crate::parallel;

/// Stretch every channel of an image linearly to the full [0, 255] range.
///
/// Each channel is mapped independently with `255 * (v - min) / (max - min)`, computed
/// in single precision and truncated. A flat channel (`min == max`) is copied
/// unchanged.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `dst` - The output image.
///
/// # Errors
///
/// Returns an error if the sizes of `src` and `dst` do not match.
///
/// # Example
///
/// ```
/// use imlab_image::Image;
/// use imlab_imgproc::enhance::linear_contrast_stretch;
///
/// let image = Image::<u8, 1>::new([3, 1].into(), vec![50, 100, 150]).unwrap();
/// let mut stretched = Image::<u8, 1>::from_size_val(image.size(), 0).unwrap();
///
/// linear_contrast_stretch(&image, &mut stretched).unwrap();
/// assert_eq!(stretched.as_slice(), &[0, 127, 255]);
/// ```
pub fn linear_contrast_stretch<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let mut min = [u8::MAX; C];
    let mut max = [u8::MIN; C];
    for pixel in src.as_slice().chunks_exact(C) {
        for (c, &v) in pixel.iter().enumerate() {
            min[c] = min[c].min(v);
            max[c] = max[c].max(v);
        }
    }

    log::debug!("linear stretch: channel ranges min={min:?} max={max:?}");

    parallel::par_iter_rows(src, dst, |src_pixel, dst_pixel| {
        for c in 0..C {
            let v = src_pixel[c];
            dst_pixel[c] = if min[c] == max[c] {
                v
            } else {
                let range = (max[c] - min[c]) as f32;
                (255.0 * (v - min[c]) as f32 / range) as u8
            };
        }
    });

    Ok(())
}

/// Pull every value of an image towards mid gray.
///
/// dst(x,y,c) = 128 + factor * (src(x,y,c) - 128)
///
/// The result is clipped to [0, 255] and truncated.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `dst` - The output image.
/// * `factor` - The contrast factor, `1.0` keeps the image unchanged.
pub fn reduce_contrast<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
    factor: f32,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    parallel::par_iter_rows_val(src, dst, |&src_val, dst_val| {
        let v = 128.0 + factor * (src_val as f32 - 128.0);
        *dst_val = v.clamp(0.0, 255.0) as u8;
    });

    Ok(())
}

/// Multiply every value of an image by a constant factor.
///
/// Factors below one darken the image and factors above one overexpose it. The result is
/// clipped to [0, 255] and truncated.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `dst` - The output image.
/// * `factor` - The intensity factor.
pub fn scale_intensity<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
    factor: f32,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    parallel::par_iter_rows_val(src, dst, |&src_val, dst_val| {
        *dst_val = (src_val as f32 * factor).clamp(0.0, 255.0) as u8;
    });

    Ok(())
}
