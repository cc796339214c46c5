use imlab_image::{Image, ImageError};
use rayon::prelude::*;

use crate::{color, parallel};

/// Compute the pixel intensity histogram of an image.
///
/// NOTE: this is limited to 8-bit 1-channel images.
///
/// # Arguments
///
/// * `src` - The input image to compute the histogram.
/// * `hist` - The output histogram, counts are added to its current values.
/// * `num_bins` - The number of bins to use for the histogram.
///
/// # Errors
///
/// Returns an error if the number of bins is invalid.
///
/// # Example
///
/// ```
/// use imlab_image::{Image, ImageSize};
/// use imlab_imgproc::histogram::compute_histogram;
///
/// let image = Image::<u8, 1>::new(
///   ImageSize {
///     width: 3,
///     height: 3,
///   },
///   vec![0, 2, 4, 128, 130, 132, 254, 255, 255],
/// ).unwrap();
///
/// let mut histogram = vec![0; 3];
///
/// compute_histogram(&image, &mut histogram, 3).unwrap();
/// assert_eq!(histogram, vec![3, 3, 3]);
/// ```
pub fn compute_histogram(
    src: &Image<u8, 1>,
    hist: &mut [usize],
    num_bins: usize,
) -> Result<(), ImageError> {
    if num_bins == 0 || num_bins > 256 {
        return Err(ImageError::InvalidHistogramBins(num_bins));
    }

    if hist.len() != num_bins {
        return Err(ImageError::InvalidHistogramBins(num_bins));
    }

    let mut bin_lut = [0usize; 256];
    for (i, bin) in bin_lut.iter_mut().enumerate() {
        *bin = (i * num_bins) >> 8;
    }

    let counts = src
        .as_slice()
        .par_chunks(4096)
        .fold(
            || vec![0usize; num_bins],
            |mut local, chunk| {
                for &px in chunk {
                    local[bin_lut[px as usize]] += 1;
                }
                local
            },
        )
        .reduce(
            || vec![0usize; num_bins],
            |mut a, b| {
                for (acc, val) in a.iter_mut().zip(b.iter()) {
                    *acc += val;
                }
                a
            },
        );

    for (h, c) in hist.iter_mut().zip(counts.iter()) {
        *h += c;
    }

    Ok(())
}

/// Build the 256 entry equalization lookup table of a grayscale image.
///
/// The table is `(cdf - cdf_min) * 255 / (cdf_max - cdf_min)`, truncated, where `cdf` is
/// the cumulative 256-bin histogram. An image whose values all fall in a single bin
/// produces an all-zero table.
fn equalization_lut(src: &Image<u8, 1>) -> Result<[u8; 256], ImageError> {
    let mut hist = vec![0usize; 256];
    compute_histogram(src, &mut hist, 256)?;

    let mut cdf = [0usize; 256];
    let mut acc = 0;
    for (c, h) in cdf.iter_mut().zip(hist.iter()) {
        acc += h;
        *c = acc;
    }

    let mut lut = [0u8; 256];

    // the cdf never decreases, so its extremes are the first and last entries
    let (cdf_min, cdf_max) = (cdf[0], cdf[255]);
    let occupied = hist.iter().filter(|&&h| h > 0).count();
    if occupied <= 1 || cdf_max == cdf_min {
        log::debug!("equalization of a flat image, mapping every value to zero");
        return Ok(lut);
    }

    let range = (cdf_max - cdf_min) as f64;
    for (l, &c) in lut.iter_mut().zip(cdf.iter()) {
        *l = ((c - cdf_min) as f64 * 255.0 / range) as u8;
    }

    Ok(lut)
}

/// Equalize the histogram of a grayscale image.
///
/// # Arguments
///
/// * `src` - The input grayscale image.
/// * `dst` - The output equalized image.
///
/// # Errors
///
/// Returns an error if the sizes of `src` and `dst` do not match.
///
/// # Example
///
/// ```
/// use imlab_image::Image;
/// use imlab_imgproc::histogram::equalize_histogram;
///
/// let image = Image::<u8, 1>::new([4, 1].into(), vec![10, 10, 20, 30]).unwrap();
/// let mut dst = Image::<u8, 1>::from_size_val(image.size(), 0).unwrap();
///
/// equalize_histogram(&image, &mut dst).unwrap();
/// assert_eq!(dst.as_slice(), &[127, 127, 191, 255]);
/// ```
pub fn equalize_histogram(src: &Image<u8, 1>, dst: &mut Image<u8, 1>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let lut = equalization_lut(src)?;
    parallel::par_iter_rows_val(src, dst, |&src_val, dst_val| {
        *dst_val = lut[src_val as usize];
    });

    Ok(())
}

/// Equalize the histogram of each channel of an RGB image independently.
pub fn equalize_histogram_rgb(src: &Image<u8, 3>, dst: &mut Image<u8, 3>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let channels = src
        .split_channels()?
        .iter()
        .map(|channel| {
            let mut eq = Image::from_size_val(channel.size(), 0u8)?;
            equalize_histogram(channel, &mut eq)?;
            Ok(eq)
        })
        .collect::<Result<Vec<_>, ImageError>>()?;

    *dst = Image::from_channels(&channels)?;

    Ok(())
}

/// Equalize the value channel of an RGB image in HSV space.
///
/// The image goes through [`color::hsv_from_rgb_u8`], the V channel is equalized and
/// the result is converted back with [`color::rgb_from_hsv_u8`]. Hue and saturation are
/// kept as stored in the 8-bit HSV image.
pub fn equalize_histogram_hsv(src: &Image<u8, 3>, dst: &mut Image<u8, 3>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let mut hsv = Image::<u8, 3>::from_size_val(src.size(), 0)?;
    color::hsv_from_rgb_u8(src, &mut hsv)?;

    let value = hsv.channel(2)?;
    let lut = equalization_lut(&value)?;
    hsv.as_slice_mut()
        .par_chunks_exact_mut(3)
        .for_each(|pixel| pixel[2] = lut[pixel[2] as usize]);

    color::rgb_from_hsv_u8(&hsv, dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use imlab_image::ImageSize;

    #[test]
    fn test_compute_histogram() -> Result<(), ImageError> {
        let image = Image::new(
            ImageSize {
                width: 3,
                height: 3,
            },
            vec![0, 2, 4, 128, 130, 132, 254, 255, 255],
        )?;

        let mut histogram = vec![0; 3];

        super::compute_histogram(&image, &mut histogram, 3)?;
        assert_eq!(histogram, vec![3, 3, 3]);

        Ok(())
    }

    #[test]
    fn test_compute_histogram_invalid_bins() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::from_size_val([2, 2].into(), 0)?;

        let mut histogram = vec![0; 4];
        assert_eq!(
            compute_histogram(&image, &mut histogram, 0),
            Err(ImageError::InvalidHistogramBins(0))
        );
        assert_eq!(
            compute_histogram(&image, &mut histogram, 3),
            Err(ImageError::InvalidHistogramBins(3))
        );

        Ok(())
    }

    #[test]
    fn test_equalize_histogram_flat() -> Result<(), ImageError> {
        for value in [0, 77, 255] {
            let image = Image::<u8, 1>::from_size_val([5, 4].into(), value)?;
            let mut dst = Image::<u8, 1>::from_size_val(image.size(), 1)?;

            equalize_histogram(&image, &mut dst)?;
            assert!(dst.as_slice().iter().all(|&v| v == 0));
        }

        Ok(())
    }

    #[test]
    fn test_equalize_histogram_spreads_values() -> Result<(), ImageError> {
        // values packed in a narrow band are spread over the whole range
        let data = (0..64).map(|i| 100 + (i % 8) as u8).collect::<Vec<_>>();
        let image = Image::<u8, 1>::new([8, 8].into(), data)?;
        let mut dst = Image::<u8, 1>::from_size_val(image.size(), 0)?;

        equalize_histogram(&image, &mut dst)?;

        // cdf_min is the count of the first bin, which is empty here
        assert_eq!(&dst.as_slice()[..8], &[31, 63, 95, 127, 159, 191, 223, 255]);

        Ok(())
    }

    #[test]
    fn test_equalize_histogram_rgb() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let image = Image::<u8, 3>::new([2, 1].into(), vec![
            10, 50, 9,
            20, 50, 0,
        ])?;
        let mut dst = Image::<u8, 3>::from_size_val(image.size(), 0)?;

        equalize_histogram_rgb(&image, &mut dst)?;

        // red spreads, green is flat, blue starts at the first bin
        assert_eq!(dst.as_slice(), &[127, 0, 255, 255, 0, 0]);

        Ok(())
    }

    #[test]
    fn test_equalize_histogram_hsv_keeps_gray() -> Result<(), ImageError> {
        // gray pixels have no hue or saturation, only their value is equalized
        #[rustfmt::skip]
        let image = Image::<u8, 3>::new([2, 1].into(), vec![
            60, 60, 60,
            90, 90, 90,
        ])?;
        let mut dst = Image::<u8, 3>::from_size_val(image.size(), 0)?;

        equalize_histogram_hsv(&image, &mut dst)?;

        let (first, second) = dst.as_slice().split_at(3);
        assert!(first.iter().all(|&v| v == first[0]));
        assert!(second.iter().all(|&v| v == 255));
        assert!(first[0] >= 126 && first[0] <= 127);

        Ok(())
    }
}
