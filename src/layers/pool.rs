use crate::{
    error::{Error, Result},
    math::tensor::Tensor,
};

/// Max pooling over square windows, applied per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxPool2d {
    pub kernel_size: usize,
    pub stride: usize,
}

impl MaxPool2d {
    /// Non-overlapping `size`×`size` windows.
    pub fn new(size: usize) -> MaxPool2d {
        MaxPool2d { kernel_size: size, stride: size.max(1) }
    }

    /// Trailing rows/columns that do not fill a whole window are dropped.
    pub fn output_size(&self, input: usize) -> Option<usize> {
        if input < self.kernel_size || self.kernel_size == 0 {
            return None;
        }
        Some((input - self.kernel_size) / self.stride + 1)
    }

    pub fn forward(&self, input: &Tensor) -> Result<Tensor> {
        let [n, c, h, w] = input.shape();
        let (out_h, out_w) = match (self.output_size(h), self.output_size(w)) {
            (Some(oh), Some(ow)) => (oh, ow),
            _ => {
                return Err(Error::shape(
                    "max_pool2d",
                    format!("spatial size >= {}", self.kernel_size),
                    format!("{}x{}", h, w),
                ))
            }
        };

        let mut out = Tensor::zeros([n, c, out_h, out_w])?;
        for b in 0..n {
            for ch in 0..c {
                for oy in 0..out_h {
                    for ox in 0..out_w {
                        let mut best = f64::NEG_INFINITY;
                        for ky in 0..self.kernel_size {
                            for kx in 0..self.kernel_size {
                                let v = input.get(b, ch, oy * self.stride + ky, ox * self.stride + kx);
                                if v > best || v.is_nan() {
                                    best = v;
                                }
                            }
                        }
                        out.set(b, ch, oy, ox, best);
                    }
                }
            }
        }

        Ok(out)
    }
}
