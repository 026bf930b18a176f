pub mod cnn;
pub mod summary;

pub use cnn::{Cnn, ForwardTrace};
pub use summary::LayerSummary;
