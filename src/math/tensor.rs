use serde::{Serialize, Deserialize};

use crate::error::{Error, Result};
use crate::math::matrix::Matrix;

/// A 4-D batch of feature maps in NCHW order, stored flat and row-major.
///
/// `data.len()` always equals the product of `shape`; deserialized tensors
/// are checked the same way as `from_vec`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTensor")]
pub struct Tensor {
    shape: [usize; 4],
    data: Vec<f64>,
}

#[derive(Deserialize)]
struct RawTensor {
    shape: [usize; 4],
    data: Vec<f64>,
}

impl TryFrom<RawTensor> for Tensor {
    type Error = Error;

    fn try_from(raw: RawTensor) -> Result<Tensor> {
        Tensor::from_vec(raw.shape, raw.data)
    }
}

/// Number of elements for `shape`, or a shape error if it overflows `usize`.
fn element_count(shape: [usize; 4]) -> Result<usize> {
    shape
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| Error::shape("Tensor", "element count within usize", format!("{:?}", shape)))
}

impl Tensor {
    pub fn zeros(shape: [usize; 4]) -> Result<Tensor> {
        Ok(Tensor {
            shape,
            data: vec![0.0; element_count(shape)?],
        })
    }

    pub fn from_vec(shape: [usize; 4], data: Vec<f64>) -> Result<Tensor> {
        let expected = element_count(shape)?;
        if data.len() != expected {
            return Err(Error::shape(
                "Tensor::from_vec",
                format!("{} values for shape {:?}", expected, shape),
                format!("{} values", data.len()),
            ));
        }
        Ok(Tensor { shape, data })
    }

    /// Stacks single-sample tensors along the batch dimension.
    pub fn stack(samples: &[Tensor]) -> Result<Tensor> {
        let first = match samples.first() {
            Some(t) => t,
            None => return Err(Error::shape("Tensor::stack", "at least one sample", "none")),
        };
        let [_, c, h, w] = first.shape;

        let mut data = Vec::with_capacity(samples.iter().map(|t| t.data.len()).sum());
        let mut n = 0;
        for t in samples {
            if t.shape[1..] != first.shape[1..] {
                return Err(Error::shape(
                    "Tensor::stack",
                    format!("(_, {}, {}, {})", c, h, w),
                    format!("{:?}", t.shape),
                ));
            }
            n += t.shape[0];
            data.extend_from_slice(&t.data);
        }

        Tensor::from_vec([n, c, h, w], data)
    }

    pub fn shape(&self) -> [usize; 4] {
        self.shape
    }

    pub fn batch_size(&self) -> usize {
        self.shape[0]
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    #[inline]
    pub fn offset(&self, n: usize, c: usize, h: usize, w: usize) -> usize {
        let [_, cs, hs, ws] = self.shape;
        ((n * cs + c) * hs + h) * ws + w
    }

    #[inline]
    pub fn get(&self, n: usize, c: usize, h: usize, w: usize) -> f64 {
        self.data[self.offset(n, c, h, w)]
    }

    #[inline]
    pub fn set(&mut self, n: usize, c: usize, h: usize, w: usize, value: f64) {
        let idx = self.offset(n, c, h, w);
        self.data[idx] = value;
    }

    pub fn map<F>(&self, functor: F) -> Tensor
    where
        F: Fn(f64) -> f64,
    {
        Tensor {
            shape: self.shape,
            data: self.data.iter().map(|&x| functor(x)).collect(),
        }
    }

    /// Flattens every sample to one row, keeping the batch dimension:
    /// (N, C, H, W) -> (N, C*H*W).
    pub fn flatten(&self) -> Matrix {
        let [n, c, h, w] = self.shape;
        let features = c * h * w;
        Matrix {
            rows: n,
            cols: features,
            data: self.data.chunks(features.max(1)).take(n).map(<[f64]>::to_vec).collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.data.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_vec_checks_length() {
        assert!(Tensor::from_vec([1, 1, 2, 2], vec![0.0; 4]).is_ok());
        assert!(Tensor::from_vec([1, 1, 2, 2], vec![0.0; 5]).unwrap_err().is_shape_mismatch());
    }

    #[test]
    fn overflowing_shape_is_rejected() {
        let err = Tensor::from_vec([usize::MAX, 2, 1, 1], vec![]).unwrap_err();
        assert!(err.is_shape_mismatch());
        assert!(Tensor::zeros([usize::MAX, usize::MAX, 1, 1]).unwrap_err().is_shape_mismatch());
    }

    #[test]
    fn deserialize_checks_data_length() {
        let err = serde_json::from_str::<Tensor>(r#"{"shape":[1,1,28,28],"data":[0.0]}"#).unwrap_err();
        assert!(err.to_string().contains("shape mismatch"), "{}", err);

        let ok: Tensor = serde_json::from_str(r#"{"shape":[1,1,1,2],"data":[0.5,1.0]}"#).unwrap();
        assert_eq!(ok.shape(), [1, 1, 1, 2]);
        let back: Tensor = serde_json::from_str(&serde_json::to_string(&ok).unwrap()).unwrap();
        assert_eq!(back, ok);
    }

    #[test]
    fn indexing_is_nchw() {
        let t = Tensor::from_vec([2, 2, 2, 3], (0..24).map(f64::from).collect()).unwrap();
        assert_eq!(t.get(0, 0, 0, 2), 2.0);
        assert_eq!(t.get(0, 1, 0, 0), 6.0);
        assert_eq!(t.get(1, 0, 1, 1), 16.0);
    }

    #[test]
    fn flatten_keeps_batch() {
        let t = Tensor::from_vec([3, 2, 2, 2], (0..24).map(f64::from).collect()).unwrap();
        let m = t.flatten();
        assert_eq!(m.shape(), (3, 8));
        assert_eq!(m.data[1][0], 8.0);
        assert_eq!(m.data[2][7], 23.0);
    }

    #[test]
    fn stack_concatenates_batches() {
        let a = Tensor::from_vec([1, 1, 1, 2], vec![1.0, 2.0]).unwrap();
        let b = Tensor::from_vec([2, 1, 1, 2], vec![3.0, 4.0, 5.0, 6.0]).unwrap();
        let s = Tensor::stack(&[a, b]).unwrap();
        assert_eq!(s.shape(), [3, 1, 1, 2]);
        assert_eq!(s.data(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn stack_rejects_mixed_shapes() {
        let a = Tensor::zeros([1, 1, 28, 28]).unwrap();
        let b = Tensor::zeros([1, 1, 32, 32]).unwrap();
        assert!(Tensor::stack(&[a, b]).is_err());
        assert!(Tensor::stack(&[]).is_err());
    }
}
