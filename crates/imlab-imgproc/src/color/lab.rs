//! CIE XYZ and L*a*b* conversions of single colors.
//!
//! RGB is sRGB with channels in [0, 255], XYZ is scaled to [0, 100] and L*a*b* is
//! relative to the D65 reference white.

/// D65 reference white in XYZ.
const REF_WHITE: [f64; 3] = [95.047, 100.0, 108.883];

const RGB_TO_XYZ: [[f64; 3]; 3] = [
    [0.4124564, 0.3575761, 0.1804375],
    [0.2126729, 0.7151522, 0.0721750],
    [0.0193339, 0.1191920, 0.9503041],
];

const XYZ_TO_RGB: [[f64; 3]; 3] = [
    [3.2404542, -1.5371385, -0.4985314],
    [-0.9692660, 1.8760108, 0.0415560],
    [0.0556434, -0.2040259, 1.0572252],
];

const LAB_EPSILON: f64 = 0.008856;
const LAB_KAPPA: f64 = 7.787;
const LAB_OFFSET: f64 = 16.0 / 116.0;

fn mat_mul(m: &[[f64; 3]; 3], v: [f64; 3]) -> [f64; 3] {
    m.map(|row| row[0] * v[0] + row[1] * v[1] + row[2] * v[2])
}

fn srgb_to_linear(c: f64) -> f64 {
    if c > 0.04045 {
        ((c + 0.055) / 1.055).powf(2.4)
    } else {
        c / 12.92
    }
}

fn linear_to_srgb(c: f64) -> f64 {
    let c = c.max(0.0);
    if c > 0.0031308 {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    } else {
        12.92 * c
    }
}

/// Convert an sRGB color to CIE XYZ.
///
/// # Example
///
/// ```
/// use imlab_imgproc::color::xyz_from_rgb;
///
/// let [x, y, z] = xyz_from_rgb([255.0, 255.0, 255.0]);
/// assert!((x - 95.047).abs() < 1e-2);
/// assert!((y - 100.0).abs() < 1e-2);
/// assert!((z - 108.883).abs() < 1e-2);
/// ```
pub fn xyz_from_rgb(rgb: [f64; 3]) -> [f64; 3] {
    let linear = rgb.map(|c| srgb_to_linear(c / 255.0));
    mat_mul(&RGB_TO_XYZ, linear).map(|c| c * 100.0)
}

/// Convert a CIE XYZ color to sRGB.
///
/// Negative linear components are clamped to zero. The result is not clamped above, so
/// out of gamut colors may exceed 255.
pub fn rgb_from_xyz(xyz: [f64; 3]) -> [f64; 3] {
    let linear = mat_mul(&XYZ_TO_RGB, xyz.map(|c| c / 100.0));
    linear.map(|c| linear_to_srgb(c) * 255.0)
}

/// Convert a CIE XYZ color to CIE L*a*b*.
pub fn lab_from_xyz(xyz: [f64; 3]) -> [f64; 3] {
    let f = |t: f64| {
        if t > LAB_EPSILON {
            t.cbrt()
        } else {
            LAB_KAPPA * t + LAB_OFFSET
        }
    };

    let fx = f(xyz[0] / REF_WHITE[0]);
    let fy = f(xyz[1] / REF_WHITE[1]);
    let fz = f(xyz[2] / REF_WHITE[2]);

    [116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz)]
}

/// Convert a CIE L*a*b* color to CIE XYZ.
pub fn xyz_from_lab(lab: [f64; 3]) -> [f64; 3] {
    let [l, a, b] = lab;
    let fy = (l + 16.0) / 116.0;
    let fx = a / 500.0 + fy;
    let fz = fy - b / 200.0;

    let finv = |t: f64| {
        let t3 = t * t * t;
        if t3 > LAB_EPSILON {
            t3
        } else {
            (t - LAB_OFFSET) / LAB_KAPPA
        }
    };

    [
        REF_WHITE[0] * finv(fx),
        REF_WHITE[1] * finv(fy),
        REF_WHITE[2] * finv(fz),
    ]
}

/// Convert an sRGB color to CIE L*a*b*.
pub fn lab_from_rgb(rgb: [f64; 3]) -> [f64; 3] {
    lab_from_xyz(xyz_from_rgb(rgb))
}

/// Convert a CIE L*a*b* color to sRGB.
pub fn rgb_from_lab(lab: [f64; 3]) -> [f64; 3] {
    rgb_from_xyz(xyz_from_lab(lab))
}
