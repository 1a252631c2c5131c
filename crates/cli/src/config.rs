//! Optional TOML configuration
//!
//! One knob today: the virtual memory allocator's per-`(segment, type)` cell
//! capacity. Parsed the same way the teacher's `lint::LintConfig` is —
//! `serde::Deserialize` plus `toml::from_str`, no bespoke parser.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatitoConfig {
    pub memory: Option<MemoryConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    pub segment_capacity: Option<i64>,
}

impl PatitoConfig {
    pub fn from_toml(text: &str) -> Result<Self, String> {
        toml::from_str(text).map_err(|e| e.to_string())
    }

    pub fn segment_capacity(&self) -> Option<i64> {
        self.memory.as_ref().and_then(|m| m.segment_capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_segment_capacity_override() {
        let config = PatitoConfig::from_toml("[memory]\nsegment_capacity = 50\n").unwrap();
        assert_eq!(config.segment_capacity(), Some(50));
    }

    #[test]
    fn empty_config_has_no_override() {
        let config = PatitoConfig::from_toml("").unwrap();
        assert_eq!(config.segment_capacity(), None);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(PatitoConfig::from_toml("not valid [[[ toml").is_err());
    }
}
