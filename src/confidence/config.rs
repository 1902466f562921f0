use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ALIGNMENT_WEIGHT, DEFAULT_PRECISION_WEIGHT, DEFAULT_RECALL_K, DEFAULT_RECALL_WEIGHT,
};

const WEIGHT_SUM_TOLERANCE: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceWeights {
    pub alignment: f32,
    pub recall: f32,
    pub precision: f32,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            alignment: DEFAULT_ALIGNMENT_WEIGHT,
            recall: DEFAULT_RECALL_WEIGHT,
            precision: DEFAULT_PRECISION_WEIGHT,
        }
    }
}

impl ConfidenceWeights {
    pub fn new(alignment: f32, recall: f32, precision: f32) -> Self {
        Self {
            alignment,
            recall,
            precision,
        }
    }

    pub fn sum(&self) -> f32 {
        self.alignment + self.recall + self.precision
    }

    pub fn validate(&self) -> Result<(), String> {
        for (name, weight) in [
            ("alignment", self.alignment),
            ("recall", self.recall),
            ("precision", self.precision),
        ] {
            if !(0.0..=1.0).contains(&weight) {
                return Err(format!("{name} weight must be between 0.0 and 1.0, got {weight}"));
            }
        }
        if (self.sum() - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(format!("confidence weights must sum to 1.0, got {}", self.sum()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceConfig {
    pub weights: ConfidenceWeights,
    /// Leading retrieved ids considered when computing recall.
    pub recall_k: usize,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            weights: ConfidenceWeights::default(),
            recall_k: DEFAULT_RECALL_K,
        }
    }
}

impl ConfidenceConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.weights.validate()?;
        if self.recall_k == 0 {
            return Err("recall_k must be greater than 0".to_string());
        }
        Ok(())
    }
}
