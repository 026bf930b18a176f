use rand::Rng;
use serde::{Serialize, Deserialize};
use std::f64::consts::PI;

/// How freshly constructed layers fill their weights and biases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitScheme {
    /// Weights and biases drawn from U(-1/sqrt(fan_in), 1/sqrt(fan_in)).
    ///
    /// This is what common deep learning frameworks use by default for
    /// convolution and linear layers.
    #[default]
    FanInUniform,
    /// He initialization: weights from N(0, sqrt(2 / fan_in)), zero biases.
    ///
    /// Recommended before ReLU layers. The variance 2/fan_in accounts for
    /// the fact that ReLU zeroes half of its inputs on average.
    He,
    /// Xavier (Glorot) initialization: weights from N(0, sqrt(1 / fan_in)),
    /// zero biases.
    Xavier,
    /// Every parameter is 0.0.
    Zeros,
}

impl InitScheme {
    /// Samples `len` weights for a layer with the given fan-in.
    pub fn weights<R: Rng + ?Sized>(&self, len: usize, fan_in: usize, rng: &mut R) -> Vec<f64> {
        let fan_in = fan_in.max(1) as f64;
        match self {
            InitScheme::FanInUniform => uniform(len, 1.0 / fan_in.sqrt(), rng),
            InitScheme::He => normal(len, (2.0 / fan_in).sqrt(), rng),
            InitScheme::Xavier => normal(len, (1.0 / fan_in).sqrt(), rng),
            InitScheme::Zeros => vec![0.0; len],
        }
    }

    /// Samples `len` biases for a layer with the given fan-in.
    pub fn biases<R: Rng + ?Sized>(&self, len: usize, fan_in: usize, rng: &mut R) -> Vec<f64> {
        match self {
            InitScheme::FanInUniform => uniform(len, 1.0 / (fan_in.max(1) as f64).sqrt(), rng),
            InitScheme::He | InitScheme::Xavier | InitScheme::Zeros => vec![0.0; len],
        }
    }
}

fn uniform<R: Rng + ?Sized>(len: usize, bound: f64, rng: &mut R) -> Vec<f64> {
    (0..len).map(|_| rng.gen_range(-bound..bound)).collect()
}

fn normal<R: Rng + ?Sized>(len: usize, std_dev: f64, rng: &mut R) -> Vec<f64> {
    (0..len).map(|_| sample_standard_normal(rng) * std_dev).collect()
}

/// Samples a single value from N(0, 1) using the Box-Muller transform.
fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    // Both uniforms in (0, 1] to avoid log(0).
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = 1.0 - rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn fan_in_uniform_respects_bound() {
        let mut rng = StdRng::seed_from_u64(7);
        let bound = 1.0 / 25.0_f64.sqrt();
        let w = InitScheme::FanInUniform.weights(1000, 25, &mut rng);
        let b = InitScheme::FanInUniform.biases(100, 25, &mut rng);
        assert!(w.iter().chain(b.iter()).all(|x| x.abs() <= bound));
        assert!(w.iter().any(|&x| x != 0.0));
    }

    #[test]
    fn normal_schemes_have_zero_bias_and_plausible_spread() {
        let mut rng = StdRng::seed_from_u64(11);
        let w = InitScheme::He.weights(20_000, 50, &mut rng);
        let mean = w.iter().sum::<f64>() / w.len() as f64;
        let var = w.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / w.len() as f64;
        assert!(mean.abs() < 0.01);
        assert!((var - 2.0 / 50.0).abs() < 0.005);
        assert!(InitScheme::Xavier.biases(10, 50, &mut rng).iter().all(|&x| x == 0.0));
    }

    #[test]
    fn zeros_is_all_zero() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(InitScheme::Zeros.weights(64, 4, &mut rng).iter().all(|&x| x == 0.0));
    }

    #[test]
    fn scheme_names_in_json() {
        let s: InitScheme = serde_json::from_str("\"fan_in_uniform\"").unwrap();
        assert_eq!(s, InitScheme::FanInUniform);
        assert_eq!(serde_json::to_string(&InitScheme::He).unwrap(), "\"he\"");
    }
}
