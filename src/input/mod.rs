pub mod image;

pub use self::image::{batch_from_paths, grayscale_tensor_from_bytes, grayscale_tensor_from_path};
