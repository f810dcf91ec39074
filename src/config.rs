//! Parameter/configuration retrieval, modeled per spec.md §6 as an opaque
//! lookup that returns typed parameters by name. `MapConfig` is the concrete
//! adapter the CLI driver and the test suite build from; the solver core
//! only ever depends on the `ConfigSource` trait.

use std::collections::HashMap;

use crate::error::ConfigError;
use crate::grid::bc::BcKind;

/// A single configuration value. Kept as a small closed enum rather than a
/// trait object: config is read at startup, never on the hot path.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Int(i64),
    Real(f64),
    Str(String),
}

/// Typed, string-keyed configuration lookup (spec.md §6). Implementations
/// are free to back this with a file, environment variables, or (as here) an
/// in-memory map; the numerical core never knows which.
pub trait ConfigSource {
    fn get_int(&self, key: &str) -> Result<i64, ConfigError>;
    fn get_real(&self, key: &str) -> Result<f64, ConfigError>;
    fn get_str(&self, key: &str) -> Result<String, ConfigError>;

    fn get_usize(&self, key: &str) -> Result<usize, ConfigError> {
        let v = self.get_int(key)?;
        usize::try_from(v).map_err(|_| ConfigError::MissingOrMistyped {
            key: key.to_string(),
        })
    }

    fn get_bc_kind(&self, key: &str) -> Result<BcKind, ConfigError> {
        BcKind::parse(&self.get_str(key)?)
    }

    fn get_real_or(&self, key: &str, default: f64) -> f64 {
        self.get_real(key).unwrap_or(default)
    }

    fn get_usize_or(&self, key: &str, default: usize) -> usize {
        self.get_usize(key).unwrap_or(default)
    }

    fn get_str_or(&self, key: &str, default: &str) -> String {
        self.get_str(key).unwrap_or_else(|_| default.to_string())
    }
}

/// A `HashMap`-backed `ConfigSource`, populated by the CLI driver from
/// `clap` arguments and used directly by tests that need a known
/// configuration.
#[derive(Debug, Clone, Default)]
pub struct MapConfig {
    values: HashMap<String, ConfigValue>,
}

impl MapConfig {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    pub fn set_int(&mut self, key: &str, value: i64) -> &mut Self {
        self.values.insert(key.to_string(), ConfigValue::Int(value));
        self
    }

    pub fn set_real(&mut self, key: &str, value: f64) -> &mut Self {
        self.values
            .insert(key.to_string(), ConfigValue::Real(value));
        self
    }

    pub fn set_str(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        self.values
            .insert(key.to_string(), ConfigValue::Str(value.into()));
        self
    }
}

impl ConfigSource for MapConfig {
    fn get_int(&self, key: &str) -> Result<i64, ConfigError> {
        match self.values.get(key) {
            Some(ConfigValue::Int(v)) => Ok(*v),
            _ => Err(ConfigError::MissingOrMistyped {
                key: key.to_string(),
            }),
        }
    }

    fn get_real(&self, key: &str) -> Result<f64, ConfigError> {
        match self.values.get(key) {
            Some(ConfigValue::Real(v)) => Ok(*v),
            Some(ConfigValue::Int(v)) => Ok(*v as f64),
            _ => Err(ConfigError::MissingOrMistyped {
                key: key.to_string(),
            }),
        }
    }

    fn get_str(&self, key: &str) -> Result<String, ConfigError> {
        match self.values.get(key) {
            Some(ConfigValue::Str(v)) => Ok(v.clone()),
            _ => Err(ConfigError::MissingOrMistyped {
                key: key.to_string(),
            }),
        }
    }
}

/// `incompressible.limiter` (spec.md §6, §4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimiterKind {
    NoLimit,
    SecondOrder,
    FourthOrder,
}

impl LimiterKind {
    pub fn from_config(cfg: &dyn ConfigSource) -> Result<Self, ConfigError> {
        match cfg.get_int("incompressible.limiter")? {
            0 => Ok(LimiterKind::NoLimit),
            1 => Ok(LimiterKind::SecondOrder),
            2 => Ok(LimiterKind::FourthOrder),
            other => Err(ConfigError::InvalidEnumValue {
                key: "incompressible.limiter",
                value: other,
            }),
        }
    }
}

/// `incompressible.proj_type` (spec.md §6, §4.10).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjType {
    /// proj_type = 1: "approximate".
    Approximate,
    /// proj_type = 2: "pressure-free predictor".
    PressureFreePredictor,
}

impl ProjType {
    pub fn from_config(cfg: &dyn ConfigSource) -> Result<Self, ConfigError> {
        match cfg.get_int("incompressible.proj_type")? {
            1 => Ok(ProjType::Approximate),
            2 => Ok(ProjType::PressureFreePredictor),
            other => Err(ConfigError::InvalidEnumValue {
                key: "incompressible.proj_type",
                value: other,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_config_round_trips_values() {
        let mut cfg = MapConfig::new();
        cfg.set_int("mesh.nx", 32)
            .set_real("driver.cfl", 0.5)
            .set_str("mesh.xlboundary", "periodic");

        assert_eq!(cfg.get_usize("mesh.nx").unwrap(), 32);
        assert_eq!(cfg.get_real("driver.cfl").unwrap(), 0.5);
        assert_eq!(cfg.get_bc_kind("mesh.xlboundary").unwrap(), BcKind::Periodic);
    }

    #[test]
    fn missing_key_is_an_error() {
        let cfg = MapConfig::new();
        assert!(cfg.get_int("nope").is_err());
    }

    #[test]
    fn limiter_rejects_out_of_range() {
        let mut cfg = MapConfig::new();
        cfg.set_int("incompressible.limiter", 7);
        assert!(LimiterKind::from_config(&cfg).is_err());
    }
}
