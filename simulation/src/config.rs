//! Experiment configuration

use detour_core::ConfigError;
use serde::{Deserialize, Serialize};

use crate::simulation::SimConfig;
use crate::topology::GeneratorConfig;

/// Everything needed to reproduce one run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Topology generation parameters
    pub generator: GeneratorConfig,
    /// Packet count and routing randomness
    pub simulation: SimConfig,
    /// Seed for the run's random source (None = drawn from the OS)
    pub seed: Option<u64>,
}

impl ExperimentConfig {
    /// Convenience constructor for the three positional CLI parameters
    pub fn new(network_size: usize, packet_count: usize, randomness: f64) -> Self {
        Self {
            generator: GeneratorConfig {
                network_size,
                ..Default::default()
            },
            simulation: SimConfig {
                packet_count,
                randomness,
            },
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_sparseness(mut self, sparseness: usize) -> Self {
        self.generator.sparseness = sparseness;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u64) -> Self {
        self.generator.max_attempts = Some(max_attempts);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.generator.validate()?;
        self.simulation.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ExperimentConfig::default();
        assert_eq!(config.generator.network_size, 16);
        assert_eq!(config.generator.sparseness, 6);
        assert_eq!(config.simulation.packet_count, 3);
        assert_eq!(config.simulation.randomness, 0.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_covers_both_halves() {
        assert_eq!(
            ExperimentConfig::new(4, 3, 0.0).validate(),
            Err(ConfigError::NetworkTooSmall { size: 4, min: 5 })
        );
        assert_eq!(
            ExperimentConfig::new(16, 0, 0.0).validate(),
            Err(ConfigError::NoPackets)
        );
        assert_eq!(
            ExperimentConfig::new(16, 3, -0.1).validate(),
            Err(ConfigError::InvalidRandomness(-0.1))
        );
    }

    #[test]
    fn test_builder_methods() {
        let config = ExperimentConfig::new(10, 2, 0.5)
            .with_seed(7)
            .with_sparseness(3)
            .with_max_attempts(50);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.generator.sparseness, 3);
        assert_eq!(config.generator.max_attempts, Some(50));
    }

    #[test]
    fn test_config_serializes() {
        let config = ExperimentConfig::new(12, 4, 0.25).with_seed(3);
        let json = serde_json::to_string(&config).unwrap();
        let back: ExperimentConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
