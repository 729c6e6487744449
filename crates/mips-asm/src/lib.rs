pub mod image;

pub use image::{load_image, save_image, Image, LabelKV};
