mod gray;
mod hsv;
mod lab;

pub use gray::{gray_from_image_u8, gray_from_rgb_u8, rgb_from_gray};
pub use hsv::{hsv_from_rgb_color, hsv_from_rgb_u8, rgb_from_hsv_color, rgb_from_hsv_u8};
pub use lab::{lab_from_rgb, lab_from_xyz, rgb_from_lab, rgb_from_xyz, xyz_from_lab, xyz_from_rgb};
