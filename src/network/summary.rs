use serde::{Deserialize, Serialize};
use std::fmt;

/// One row of an architecture summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerSummary {
    pub name: String,
    /// Per-sample output shape (batch dimension omitted).
    pub output_shape: Vec<usize>,
    pub parameters: usize,
}

impl LayerSummary {
    pub fn new(name: &str, output_shape: Vec<usize>, parameters: usize) -> LayerSummary {
        LayerSummary { name: name.to_string(), output_shape, parameters }
    }
}

impl fmt::Display for LayerSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shape = self.output_shape
            .iter()
            .map(usize::to_string)
            .collect::<Vec<_>>()
            .join("x");
        write!(f, "{:<12} {:>12} {:>8}", self.name, shape, self.parameters)
    }
}
