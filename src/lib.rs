pub mod error;
pub mod config;
pub mod math;
pub mod activation;
pub mod init;
pub mod layers;
pub mod network;
pub mod input;

// Convenience re-exports
pub use error::{Error, Result};
pub use config::InitConfig;
pub use math::matrix::Matrix;
pub use math::tensor::Tensor;
pub use activation::activation::ActivationFunction;
pub use init::scheme::InitScheme;
pub use layers::{conv::Conv2d, dense::Dense, pool::MaxPool2d};
pub use network::cnn::{Cnn, ForwardTrace};
pub use network::summary::LayerSummary;
