use crate::parallel;
use imlab_image::{Image, ImageError};

/// Convert an RGB8 image to an 8-bit HSV image.
///
/// The input image is assumed to have 3 channels in the order R, G, B.
///
/// # Returns
///
/// The HSV image with the following channels:
///
/// * H: The hue in degrees, [0, 360]. Hues above 255 do not fit the byte and wrap
///   around modulo 256.
/// * S: The saturation channel in the range [0, 255].
/// * V: The value channel in the range [0, 255].
///
/// Pixels with `max == min` get zero hue and saturation. All channels are truncated.
///
/// # Arguments
///
/// * `src` - The input RGB image.
/// * `dst` - The output HSV image.
///
/// Precondition: the input and output images must have the same size.
///
/// # Example
///
/// ```
/// use imlab_image::Image;
/// use imlab_imgproc::color::hsv_from_rgb_u8;
///
/// let image = Image::<u8, 3>::new([2, 1].into(), vec![0, 255, 0, 80, 80, 80]).unwrap();
/// let mut hsv = Image::<u8, 3>::from_size_val(image.size(), 0).unwrap();
///
/// hsv_from_rgb_u8(&image, &mut hsv).unwrap();
/// assert_eq!(hsv.as_slice(), &[120, 255, 255, 0, 0, 80]);
/// ```
pub fn hsv_from_rgb_u8(src: &Image<u8, 3>, dst: &mut Image<u8, 3>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    parallel::par_iter_rows(src, dst, |src_pixel, dst_pixel| {
        // Normalize the input to the range [0, 1]
        let r = src_pixel[0] as f32 / 255.0;
        let g = src_pixel[1] as f32 / 255.0;
        let b = src_pixel[2] as f32 / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        // blue wins over green and green over red when several channels share the max
        let h = if delta == 0.0 {
            0.0
        } else if max == b {
            60.0 * ((r - g) / delta) + 240.0
        } else if max == g {
            60.0 * ((b - r) / delta) + 120.0
        } else {
            60.0 * ((g - b) / delta).rem_euclid(6.0)
        };
        let h = h.clamp(0.0, 360.0);

        let s = if delta == 0.0 { 0.0 } else { delta / max };
        let s = s.clamp(0.0, 1.0);

        dst_pixel[0] = (h as u32 % 256) as u8;
        dst_pixel[1] = (s * 255.0) as u8;
        dst_pixel[2] = (max * 255.0) as u8;
    });

    Ok(())
}

/// Convert an 8-bit HSV image, as produced by [`hsv_from_rgb_u8`], back to RGB8.
///
/// The hue byte is read as degrees. Each output channel is clipped to [0, 255] and
/// truncated.
///
/// # Arguments
///
/// * `src` - The input HSV image.
/// * `dst` - The output RGB image.
///
/// Precondition: the input and output images must have the same size.
pub fn rgb_from_hsv_u8(src: &Image<u8, 3>, dst: &mut Image<u8, 3>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    parallel::par_iter_rows(src, dst, |src_pixel, dst_pixel| {
        let h = src_pixel[0] as f32;
        let s = src_pixel[1] as f32 / 255.0;
        let v = src_pixel[2] as f32 / 255.0;

        let c = v * s;
        let x = c * (1.0 - ((h / 60.0).rem_euclid(2.0) - 1.0).abs());
        let m = v - c;

        let (r, g, b) = if h < 60.0 {
            (c, x, 0.0)
        } else if h < 120.0 {
            (x, c, 0.0)
        } else if h < 180.0 {
            (0.0, c, x)
        } else if h < 240.0 {
            (0.0, x, c)
        } else if h < 300.0 {
            (x, 0.0, c)
        } else {
            (c, 0.0, x)
        };

        dst_pixel[0] = ((r + m) * 255.0).clamp(0.0, 255.0) as u8;
        dst_pixel[1] = ((g + m) * 255.0).clamp(0.0, 255.0) as u8;
        dst_pixel[2] = ((b + m) * 255.0).clamp(0.0, 255.0) as u8;
    });

    Ok(())
}

/// Convert a single RGB color to HSV.
///
/// # Arguments
///
/// * `rgb` - The color with channels in [0, 255].
///
/// # Returns
///
/// `[h, s, v]` with the hue in degrees [0, 360) and saturation and value in percent.
pub fn hsv_from_rgb_color(rgb: [f64; 3]) -> [f64; 3] {
    let [r, g, b] = rgb.map(|c| c / 255.0);

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let d = max - min;

    let s = if max == 0.0 { 0.0 } else { d / max };

    let h = if max == min {
        0.0
    } else if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    [h / 6.0 * 360.0, s * 100.0, max * 100.0]
}

/// Convert a single HSV color to RGB.
///
/// # Arguments
///
/// * `hsv` - The hue in degrees (any value, taken modulo 360) and saturation and value
///   in percent.
///
/// # Returns
///
/// `[r, g, b]` with channels in [0, 255], not rounded.
pub fn rgb_from_hsv_color(hsv: [f64; 3]) -> [f64; 3] {
    let h = hsv[0].rem_euclid(360.0);
    let s = hsv[1] / 100.0;
    let v = hsv[2] / 100.0;

    let sector = (h / 60.0).floor();
    let f = h / 60.0 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);

    let (r, g, b) = match sector as u32 % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };

    [r * 255.0, g * 255.0, b * 255.0]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_hsv_from_rgb_u8_primaries() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let image = Image::<u8, 3>::new([4, 1].into(), vec![
            255, 0, 0,
            0, 255, 0,
            255, 255, 0,
            0, 0, 255,
        ])?;
        let mut hsv = Image::<u8, 3>::from_size_val(image.size(), 0)?;

        hsv_from_rgb_u8(&image, &mut hsv)?;

        // yellow takes the green branch, blue at 240 degrees fits the byte as is
        #[rustfmt::skip]
        assert_eq!(hsv.as_slice(), &[
            0, 255, 255,
            120, 255, 255,
            60, 255, 255,
            240, 255, 255,
        ]);

        Ok(())
    }

    #[test]
    fn test_hsv_from_rgb_u8_hue_wraps() -> Result<(), ImageError> {
        // magenta sits at 300 degrees, stored as 300 - 256
        let image = Image::<u8, 3>::new([1, 1].into(), vec![255, 0, 255])?;
        let mut hsv = Image::<u8, 3>::from_size_val(image.size(), 0)?;

        hsv_from_rgb_u8(&image, &mut hsv)?;
        assert_eq!(hsv.as_slice(), &[44, 255, 255]);

        Ok(())
    }

    #[test]
    fn test_rgb_from_hsv_u8_roundtrip() -> Result<(), ImageError> {
        // hues of these colors stay below 256 degrees
        #[rustfmt::skip]
        let image = Image::<u8, 3>::new([3, 2].into(), vec![
            200, 50, 50,
            50, 200, 50,
            50, 100, 200,
            120, 120, 120,
            10, 200, 180,
            250, 240, 30,
        ])?;
        let mut hsv = Image::<u8, 3>::from_size_val(image.size(), 0)?;
        let mut rgb = Image::<u8, 3>::from_size_val(image.size(), 0)?;

        hsv_from_rgb_u8(&image, &mut hsv)?;
        rgb_from_hsv_u8(&hsv, &mut rgb)?;

        for (a, b) in image.as_slice().iter().zip(rgb.as_slice()) {
            assert!((*a as i16 - *b as i16).abs() <= 6, "{a} vs {b}");
        }

        Ok(())
    }

    #[test]
    fn test_hsv_from_rgb_color() {
        assert_eq!(hsv_from_rgb_color([255.0, 0.0, 0.0]), [0.0, 100.0, 100.0]);
        assert_eq!(hsv_from_rgb_color([0.0, 0.0, 0.0]), [0.0, 0.0, 0.0]);

        let [h, s, v] = hsv_from_rgb_color([255.0, 0.0, 128.0]);
        assert_relative_eq!(h, 329.882_352_941, epsilon = 1e-6);
        assert_relative_eq!(s, 100.0);
        assert_relative_eq!(v, 100.0);
    }

    #[test]
    fn test_rgb_from_hsv_color() {
        let [r, g, b] = rgb_from_hsv_color([60.0, 100.0, 100.0]);
        assert_relative_eq!(r, 255.0);
        assert_relative_eq!(g, 255.0);
        assert_relative_eq!(b, 0.0);

        // hue is taken modulo 360
        let [r, g, b] = rgb_from_hsv_color([-120.0, 50.0, 80.0]);
        let [r2, g2, b2] = rgb_from_hsv_color([240.0, 50.0, 80.0]);
        assert_relative_eq!(r, r2);
        assert_relative_eq!(g, g2);
        assert_relative_eq!(b, b2);
    }

    #[test]
    fn test_hsv_color_roundtrip() {
        for rgb in [[12.0, 200.0, 99.0], [255.0, 255.0, 255.0], [90.0, 30.0, 240.0]] {
            let back = rgb_from_hsv_color(hsv_from_rgb_color(rgb));
            for (a, b) in rgb.iter().zip(back.iter()) {
                assert_relative_eq!(a, b, epsilon = 1e-9);
            }
        }
    }
}
