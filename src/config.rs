//! Engine Configuration
//!
//! Tunable constants for the attach/penetration engine. The defaults are the
//! production values; a JSON file may override any subset of them.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::types::ComplexityLevel;
use crate::utils::percent::MIX_TOLERANCE;

/// Penetration multiplier per complexity level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComplexityFactors {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
    pub mandatory: f64,
    /// Used when a product has no complexity set
    pub unset: f64,
}

impl ComplexityFactors {
    pub const DEFAULT: Self = Self {
        low: 0.7,
        medium: 0.5,
        high: 0.3,
        mandatory: 1.0,
        unset: 1.0,
    };

    pub fn factor(&self, level: Option<ComplexityLevel>) -> f64 {
        match level {
            Some(ComplexityLevel::Low) => self.low,
            Some(ComplexityLevel::Medium) => self.medium,
            Some(ComplexityLevel::High) => self.high,
            Some(ComplexityLevel::Mandatory) => self.mandatory,
            None => self.unset,
        }
    }

    fn all(&self) -> [f64; 5] {
        [self.low, self.medium, self.high, self.mandatory, self.unset]
    }
}

impl Default for ComplexityFactors {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Engine parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Forward-looking bias applied to a known attach anchor
    pub anchor_uplift: f64,
    pub complexity_factors: ComplexityFactors,
    /// Accepted distance from 100 when validating a mix
    pub mix_tolerance: f64,
}

impl EngineConfig {
    pub const DEFAULT: Self = Self {
        anchor_uplift: 1.10,
        complexity_factors: ComplexityFactors::DEFAULT,
        mix_tolerance: MIX_TOLERANCE,
    };

    /// Load configuration from a JSON file, missing keys keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read engine config: {:?}", path))?;

        let config: EngineConfig = serde_json::from_str(&contents)
            .with_context(|| "Failed to parse engine config JSON")?;

        config.validate()?;
        tracing::debug!(?config, "Loaded engine config from {:?}", path);

        Ok(config)
    }

    /// Reject negative or non-finite multipliers
    pub fn validate(&self) -> Result<()> {
        if !self.anchor_uplift.is_finite() || self.anchor_uplift < 0.0 {
            anyhow::bail!("anchorUplift must be a non-negative number, got {}", self.anchor_uplift);
        }
        if self
            .complexity_factors
            .all()
            .iter()
            .any(|f| !f.is_finite() || *f < 0.0)
        {
            anyhow::bail!("complexity factors must be non-negative numbers: {:?}", self.complexity_factors);
        }
        if !self.mix_tolerance.is_finite() || self.mix_tolerance <= 0.0 {
            anyhow::bail!("mixTolerance must be positive, got {}", self.mix_tolerance);
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_complexity_table() {
        let factors = ComplexityFactors::default();
        assert_eq!(factors.factor(Some(ComplexityLevel::Low)), 0.7);
        assert_eq!(factors.factor(Some(ComplexityLevel::Medium)), 0.5);
        assert_eq!(factors.factor(Some(ComplexityLevel::High)), 0.3);
        assert_eq!(factors.factor(Some(ComplexityLevel::Mandatory)), 1.0);
        assert_eq!(factors.factor(None), 1.0);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"anchorUplift": 1.25, "complexityFactors": {"high": 0.2}}"#).unwrap();

        assert_eq!(config.anchor_uplift, 1.25);
        assert_eq!(config.complexity_factors.high, 0.2);
        assert_eq!(config.complexity_factors.low, 0.7);
        assert_eq!(config.mix_tolerance, 0.1);
    }

    #[test]
    fn test_load_rejects_negative_factor() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"complexityFactors": {{"low": -0.5}}}}"#).unwrap();

        let err = EngineConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("complexity factors"));
    }

    #[test]
    fn test_load_missing_file_has_context() {
        let err = EngineConfig::load(Path::new("/nonexistent/engine.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read engine config"));
    }
}
