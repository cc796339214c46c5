use imlab_image::Image;

/// Helper function to set a pixel's color, ignoring coordinates outside of the image.
#[inline]
fn set_pixel<const C: usize>(img: &mut Image<u8, C>, x: i64, y: i64, color: [u8; C]) {
    if x >= 0 && x < img.cols() as i64 && y >= 0 && y < img.rows() as i64 {
        let start = (y as usize * img.cols() + x as usize) * C;
        img.as_slice_mut()[start..start + C].copy_from_slice(&color);
    }
}

/// Draws a line on an image inplace using a standard Bresenham's line algorithm.
///
/// Both end points may lie outside of the image, only the pixels of the walk that fall
/// inside are painted.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `p0` - The start point of the line as a tuple of (x, y).
/// * `p1` - The end point of the line as a tuple of (x, y).
/// * `color` - The color of the line as an array of `C` elements.
pub fn draw_line<const C: usize>(
    img: &mut Image<u8, C>,
    p0: (i64, i64),
    p1: (i64, i64),
    color: [u8; C],
) {
    let (mut x0, mut y0) = p0;
    let (x1, y1) = p1;

    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };

    let mut err = dx - dy;

    loop {
        set_pixel(img, x0, y0, color);

        if x0 == x1 && y0 == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 > -dy {
            err -= dy;
            x0 += sx;
        }
        if e2 < dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Draws an axis aligned cross centered at `center`.
///
/// The cross covers the pixels at most `half_size` away from the center along its row
/// and its column. Pixels outside of the image are skipped.
pub fn draw_cross<const C: usize>(
    img: &mut Image<u8, C>,
    center: (i64, i64),
    half_size: i64,
    color: [u8; C],
) {
    let (cx, cy) = center;
    for d in -half_size..=half_size {
        set_pixel(img, cx + d, cy, color);
        set_pixel(img, cx, cy + d, color);
    }
}
