use crate::constants::DEFAULT_ATTRIBUTION_THRESHOLD;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttributionConfig {
    /// Minimum cosine similarity for a sentence to count as supported.
    pub threshold: f32,
}

impl Default for AttributionConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_ATTRIBUTION_THRESHOLD,
        }
    }
}

impl AttributionConfig {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(format!(
                "attribution threshold must be between 0.0 and 1.0, got {}",
                self.threshold
            ));
        }
        Ok(())
    }
}
