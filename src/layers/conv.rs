use rand::Rng;

use crate::{
    error::{Error, Result},
    init::scheme::InitScheme,
    math::tensor::Tensor,
};

/// 2-D convolution over NCHW input with square kernels and zero padding.
#[derive(Debug, Clone)]
pub struct Conv2d {
    pub in_channels: usize,
    pub out_channels: usize,
    pub kernel_size: usize,
    pub stride: usize,
    pub padding: usize,
    /// Flat `[out][in][kh][kw]`.
    pub weights: Vec<f64>,
    /// One per output channel.
    pub biases: Vec<f64>,
}

impl Conv2d {
    pub fn new<R: Rng + ?Sized>(
        in_channels: usize,
        out_channels: usize,
        kernel_size: usize,
        stride: usize,
        padding: usize,
        init: InitScheme,
        rng: &mut R,
    ) -> Conv2d {
        let fan_in = in_channels * kernel_size * kernel_size;
        Conv2d {
            in_channels,
            out_channels,
            kernel_size,
            stride: stride.max(1),
            padding,
            weights: init.weights(out_channels * fan_in, fan_in, rng),
            biases: init.biases(out_channels, fan_in, rng),
        }
    }

    /// Spatial output size for an input side of length `input`, or `None`
    /// when the padded input is smaller than the kernel.
    pub fn output_size(&self, input: usize) -> Option<usize> {
        let padded = input + 2 * self.padding;
        if padded < self.kernel_size {
            return None;
        }
        Some((padded - self.kernel_size) / self.stride + 1)
    }

    #[inline]
    fn weight(&self, oc: usize, ic: usize, kh: usize, kw: usize) -> f64 {
        let k = self.kernel_size;
        self.weights[((oc * self.in_channels + ic) * k + kh) * k + kw]
    }

    pub fn forward(&self, input: &Tensor) -> Result<Tensor> {
        let [n, c, h, w] = input.shape();
        if c != self.in_channels {
            return Err(Error::shape(
                "conv2d",
                format!("{} input channels", self.in_channels),
                format!("{} input channels (input {:?})", c, input.shape()),
            ));
        }
        let (out_h, out_w) = match (self.output_size(h), self.output_size(w)) {
            (Some(oh), Some(ow)) => (oh, ow),
            _ => {
                return Err(Error::shape(
                    "conv2d",
                    format!("spatial size >= {} after padding {}", self.kernel_size, self.padding),
                    format!("{}x{}", h, w),
                ))
            }
        };

        let k = self.kernel_size;
        let pad = self.padding as isize;
        let mut out = Tensor::zeros([n, self.out_channels, out_h, out_w])?;

        for b in 0..n {
            for oc in 0..self.out_channels {
                for oy in 0..out_h {
                    for ox in 0..out_w {
                        let mut sum = self.biases[oc];
                        let y0 = (oy * self.stride) as isize - pad;
                        let x0 = (ox * self.stride) as isize - pad;

                        for ic in 0..c {
                            for ky in 0..k {
                                let iy = y0 + ky as isize;
                                if iy < 0 || iy >= h as isize {
                                    continue;
                                }
                                for kx in 0..k {
                                    let ix = x0 + kx as isize;
                                    if ix < 0 || ix >= w as isize {
                                        continue;
                                    }
                                    sum += self.weight(oc, ic, ky, kx) * input.get(b, ic, iy as usize, ix as usize);
                                }
                            }
                        }

                        out.set(b, oc, oy, ox, sum);
                    }
                }
            }
        }

        Ok(out)
    }

    pub fn num_parameters(&self) -> usize {
        self.weights.len() + self.biases.len()
    }
}
