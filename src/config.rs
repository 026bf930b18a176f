use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::init::scheme::InitScheme;

pub const IMAGE_SIZE: usize = 28;
pub const INPUT_CHANNELS: usize = 1;

pub const KERNEL_SIZE: usize = 5;
pub const STRIDE: usize = 1;
/// Keeps conv1 output at 28×28: (28 - 5 + 2·2) / 1 + 1 = 28.
pub const CONV1_PADDING: usize = 2;
pub const CONV1_CHANNELS: usize = 6;
pub const CONV2_CHANNELS: usize = 16;
pub const POOL_SIZE: usize = 2;

/// Widths of fc1, fc2 and fc3.
pub const LAYER_WIDTHS: [usize; 3] = [120, 84, 10];
/// Features entering fc1: 16 channels of 5×5 maps.
pub const FLAT_FEATURES: usize = CONV2_CHANNELS * KERNEL_SIZE * KERNEL_SIZE;
pub const NUM_CLASSES: usize = LAYER_WIDTHS[2];

/// Controls how a new network's parameters are drawn.
///
/// With `seed` set, construction is reproducible; otherwise the thread RNG
/// is used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitConfig {
    #[serde(default)]
    pub scheme: InitScheme,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl InitConfig {
    pub fn seeded(scheme: InitScheme, seed: u64) -> InitConfig {
        InitConfig { scheme, seed: Some(seed) }
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Reads an `InitConfig` from a JSON file.
    pub fn load_json(path: &str) -> Result<InitConfig> {
        let file = std::fs::File::open(path).map_err(|e| Error::io(path, e))?;
        let reader = std::io::BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|source| Error::Config { path: path.into(), source })
    }

    /// Writes the config as pretty-printed JSON.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path).map_err(|e| Error::io(path, e))?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|source| Error::Config { path: path.into(), source })
    }
}
