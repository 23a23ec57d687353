use serde::{Deserialize, Serialize};

use crate::params::ConfigError;

/// Ring counts of the supported spinning sensors.
pub const SUPPORTED_RING_COUNTS: [u16; 4] = [16, 32, 64, 128];

/// Scan-line layout of the spinning sensor that produced the sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorModel {
    rings: u16,
}

impl SensorModel {
    pub fn from_ring_count(rings: u16) -> Result<Self, ConfigError> {
        if SUPPORTED_RING_COUNTS.contains(&rings) {
            Ok(Self { rings })
        } else {
            Err(ConfigError::UnsupportedRingCount(rings))
        }
    }

    #[inline]
    pub fn rings(&self) -> u16 {
        self.rings
    }

    #[inline]
    pub fn contains_ring(&self, ring: u16) -> bool {
        ring < self.rings
    }
}
