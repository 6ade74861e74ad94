//! Signal extraction configuration

use serde::{Deserialize, Serialize};

use crate::SignalError;

/// Signal extractor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Run the estimator on every Nth frame
    pub throttle_every: u64,

    /// Eye contour index used as the upper lid reference
    pub upper_lid_index: usize,

    /// Eye contour index used as the lower lid reference
    pub lower_lid_index: usize,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            throttle_every: 5,
            upper_lid_index: 2,
            lower_lid_index: 5,
        }
    }
}

impl SignalConfig {
    pub fn validate(&self) -> Result<(), SignalError> {
        if self.throttle_every == 0 {
            return Err(SignalError::Config("throttle_every must be at least 1".into()));
        }
        if self.upper_lid_index == self.lower_lid_index {
            return Err(SignalError::Config(format!(
                "upper and lower lid indices must differ (both {})",
                self.upper_lid_index
            )));
        }
        Ok(())
    }
}
