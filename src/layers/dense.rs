use rand::Rng;

use crate::{
    activation::activation::ActivationFunction,
    error::{Error, Result},
    init::scheme::InitScheme,
    math::matrix::Matrix,
};

/// Fully-connected layer: `activation(x · W + b)`.
#[derive(Debug, Clone)]
pub struct Dense {
    pub input_size: usize,
    pub size: usize,
    /// Shape (input_size, size).
    pub weights: Matrix,
    /// Shape (1, size).
    pub biases: Matrix,
    pub activator: ActivationFunction,
}

impl Dense {
    pub fn new<R: Rng + ?Sized>(
        input_size: usize,
        size: usize,
        activation: ActivationFunction,
        init: InitScheme,
        rng: &mut R,
    ) -> Dense {
        let flat = init.weights(input_size * size, input_size, rng);
        let weights = Matrix {
            rows: input_size,
            cols: size,
            data: flat.chunks(size.max(1)).take(input_size).map(<[f64]>::to_vec).collect(),
        };
        let biases = Matrix {
            rows: 1,
            cols: size,
            data: vec![init.biases(size, input_size, rng)],
        };

        Dense {
            input_size,
            size,
            weights,
            biases,
            activator: activation,
        }
    }

    /// Maps a (batch, input_size) matrix to (batch, size).
    pub fn forward(&self, input: &Matrix) -> Result<Matrix> {
        if input.cols != self.input_size {
            return Err(Error::shape(
                "dense",
                format!("{} input features", self.input_size),
                format!("{} input features", input.cols),
            ));
        }

        let z = input.matmul(&self.weights)?.add_row(&self.biases)?;
        Ok(z.map(|x| self.activator.function(x)))
    }

    pub fn num_parameters(&self) -> usize {
        self.weights.len() + self.biases.len()
    }
}
