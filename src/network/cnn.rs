use log::debug;
use rand::Rng;

use crate::{
    activation::activation::ActivationFunction,
    config::{
        InitConfig, CONV1_CHANNELS, CONV1_PADDING, CONV2_CHANNELS, FLAT_FEATURES, IMAGE_SIZE,
        INPUT_CHANNELS, KERNEL_SIZE, LAYER_WIDTHS, POOL_SIZE, STRIDE,
    },
    error::Result,
    init::scheme::InitScheme,
    layers::{conv::Conv2d, dense::Dense, pool::MaxPool2d},
    math::{matrix::Matrix, tensor::Tensor},
    network::summary::LayerSummary,
};

/// LeNet-style classifier for (N, 1, 28, 28) grayscale batches.
///
/// ```text
/// conv1 5x5 (1->6, pad 2) + ReLU -> maxpool 2 -> (6, 14, 14)
/// conv2 5x5 (6->16)       + ReLU -> maxpool 2 -> (16, 5, 5)
/// flatten 400 -> fc1 120 + ReLU -> fc2 84 + ReLU -> fc3 10 (logits)
/// ```
///
/// `forward` only reads the parameters, so one instance can be shared
/// across threads.
#[derive(Debug, Clone)]
pub struct Cnn {
    pub conv1: Conv2d,
    pub conv2: Conv2d,
    pub pool: MaxPool2d,
    pub fc1: Dense,
    pub fc2: Dense,
    pub fc3: Dense,
}

/// Every intermediate value of one forward pass.
#[derive(Debug, Clone)]
pub struct ForwardTrace {
    pub conv1: Tensor,
    pub pool1: Tensor,
    pub conv2: Tensor,
    pub pool2: Tensor,
    pub flat: Matrix,
    pub fc1: Matrix,
    pub fc2: Matrix,
    pub logits: Matrix,
}

impl ForwardTrace {
    /// The outputs that went through a ReLU.
    pub fn relu_outputs(&self) -> Vec<(&'static str, Vec<f64>)> {
        vec![
            ("conv1", self.conv1.data().to_vec()),
            ("conv2", self.conv2.data().to_vec()),
            ("fc1", self.fc1.iter().copied().collect()),
            ("fc2", self.fc2.iter().copied().collect()),
        ]
    }
}

impl Cnn {
    /// Builds the network with the default init scheme and a fresh RNG.
    pub fn new() -> Cnn {
        Cnn::with_init(InitScheme::default(), &mut rand::thread_rng())
    }

    pub fn from_config(config: &InitConfig) -> Cnn {
        Cnn::with_init(config.scheme, &mut config.rng())
    }

    pub fn with_init<R: Rng + ?Sized>(init: InitScheme, rng: &mut R) -> Cnn {
        let [w1, w2, w3] = LAYER_WIDTHS;
        Cnn {
            conv1: Conv2d::new(INPUT_CHANNELS, CONV1_CHANNELS, KERNEL_SIZE, STRIDE, CONV1_PADDING, init, rng),
            conv2: Conv2d::new(CONV1_CHANNELS, CONV2_CHANNELS, KERNEL_SIZE, STRIDE, 0, init, rng),
            pool: MaxPool2d::new(POOL_SIZE),
            fc1: Dense::new(FLAT_FEATURES, w1, ActivationFunction::ReLU, init, rng),
            fc2: Dense::new(w1, w2, ActivationFunction::ReLU, init, rng),
            fc3: Dense::new(w2, w3, ActivationFunction::Identity, init, rng),
        }
    }

    /// Maps an (N, 1, 28, 28) batch to (N, 10) raw class scores.
    pub fn forward(&self, input: &Tensor) -> Result<Matrix> {
        Ok(self.forward_trace(input)?.logits)
    }

    /// Same computation as `forward`, keeping every intermediate.
    pub fn forward_trace(&self, input: &Tensor) -> Result<ForwardTrace> {
        let relu = |x: f64| ActivationFunction::ReLU.function(x);

        let conv1 = self.conv1.forward(input)?.map(relu);
        debug!("conv1: {:?} -> {:?}", input.shape(), conv1.shape());
        let pool1 = self.pool.forward(&conv1)?;
        debug!("pool1: {:?}", pool1.shape());

        let conv2 = self.conv2.forward(&pool1)?.map(relu);
        debug!("conv2: {:?}", conv2.shape());
        let pool2 = self.pool.forward(&conv2)?;
        debug!("pool2: {:?}", pool2.shape());

        let flat = pool2.flatten();
        debug!("flatten: {:?}", flat.shape());
        let fc1 = self.fc1.forward(&flat)?;
        let fc2 = self.fc2.forward(&fc1)?;
        let logits = self.fc3.forward(&fc2)?;
        debug!("logits: {:?}", logits.shape());

        Ok(ForwardTrace { conv1, pool1, conv2, pool2, flat, fc1, fc2, logits })
    }

    /// Highest-scoring class per sample.
    pub fn predict(&self, input: &Tensor) -> Result<Vec<usize>> {
        Ok(self.forward(input)?.argmax_rows())
    }

    /// Named read-only views of every learnable parameter, in layer order.
    pub fn parameters(&self) -> Vec<(&'static str, Vec<&f64>)> {
        vec![
            ("conv1.weight", self.conv1.weights.iter().collect()),
            ("conv1.bias", self.conv1.biases.iter().collect()),
            ("conv2.weight", self.conv2.weights.iter().collect()),
            ("conv2.bias", self.conv2.biases.iter().collect()),
            ("fc1.weight", self.fc1.weights.iter().collect()),
            ("fc1.bias", self.fc1.biases.iter().collect()),
            ("fc2.weight", self.fc2.weights.iter().collect()),
            ("fc2.bias", self.fc2.biases.iter().collect()),
            ("fc3.weight", self.fc3.weights.iter().collect()),
            ("fc3.bias", self.fc3.biases.iter().collect()),
        ]
    }

    /// Named mutable views of every learnable parameter, for an external
    /// training procedure.
    pub fn parameters_mut(&mut self) -> Vec<(&'static str, Vec<&mut f64>)> {
        vec![
            ("conv1.weight", self.conv1.weights.iter_mut().collect()),
            ("conv1.bias", self.conv1.biases.iter_mut().collect()),
            ("conv2.weight", self.conv2.weights.iter_mut().collect()),
            ("conv2.bias", self.conv2.biases.iter_mut().collect()),
            ("fc1.weight", self.fc1.weights.data.iter_mut().flatten().collect()),
            ("fc1.bias", self.fc1.biases.data.iter_mut().flatten().collect()),
            ("fc2.weight", self.fc2.weights.data.iter_mut().flatten().collect()),
            ("fc2.bias", self.fc2.biases.data.iter_mut().flatten().collect()),
            ("fc3.weight", self.fc3.weights.data.iter_mut().flatten().collect()),
            ("fc3.bias", self.fc3.biases.data.iter_mut().flatten().collect()),
        ]
    }

    pub fn num_parameters(&self) -> usize {
        self.conv1.num_parameters()
            + self.conv2.num_parameters()
            + self.fc1.num_parameters()
            + self.fc2.num_parameters()
            + self.fc3.num_parameters()
    }

    /// Output shape and parameter count of each stage for a single
    /// (1, 1, 28, 28) input.
    pub fn summary(&self) -> Vec<LayerSummary> {
        let conv_side = |conv: &Conv2d, side: usize| conv.output_size(side).unwrap_or(0);
        let pool_side = |side: usize| self.pool.output_size(side).unwrap_or(0);

        let c1 = conv_side(&self.conv1, IMAGE_SIZE);
        let p1 = pool_side(c1);
        let c2 = conv_side(&self.conv2, p1);
        let p2 = pool_side(c2);

        vec![
            LayerSummary::new("input", vec![INPUT_CHANNELS, IMAGE_SIZE, IMAGE_SIZE], 0),
            LayerSummary::new("conv1+relu", vec![self.conv1.out_channels, c1, c1], self.conv1.num_parameters()),
            LayerSummary::new("maxpool1", vec![self.conv1.out_channels, p1, p1], 0),
            LayerSummary::new("conv2+relu", vec![self.conv2.out_channels, c2, c2], self.conv2.num_parameters()),
            LayerSummary::new("maxpool2", vec![self.conv2.out_channels, p2, p2], 0),
            LayerSummary::new("flatten", vec![self.conv2.out_channels * p2 * p2], 0),
            LayerSummary::new("fc1+relu", vec![self.fc1.size], self.fc1.num_parameters()),
            LayerSummary::new("fc2+relu", vec![self.fc2.size], self.fc2.num_parameters()),
            LayerSummary::new("fc3", vec![self.fc3.size], self.fc3.num_parameters()),
        ]
    }
}

impl Default for Cnn {
    fn default() -> Self {
        Cnn::new()
    }
}
