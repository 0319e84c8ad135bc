//! I/O layer: decoding image files into normalized `Array3<f32>` buffers and
//! `writers` for JPEG/PNG outputs. The processing core never touches files.
pub mod load;
pub use load::{array_from_rgb32f, load_image};

pub mod writers;
pub use writers::{save_image, to_rgb8};
