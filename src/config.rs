//! Engine configuration.
//!
//! A flat struct of tunables with a sensible default, cloned cheaply into
//! whichever component needs it.

use serde::{Deserialize, Serialize};

/// Tunable thresholds for region classification and structural-variant detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Distance in bases that counts as "near a gene" for upstream/downstream calls.
    pub near_gene_distance: u32,
    /// Length in bases of the splice donor window, immediately 3' of an exon.
    pub splice_donor_len: u32,
    /// Length in bases of the splice acceptor window, immediately 5' of an exon.
    pub splice_acceptor_len: u32,
    /// Exonic portion of the broader splice region window.
    pub splice_region_exonic_len: u32,
    /// Intronic portion of the broader splice region window.
    pub splice_region_intronic_len: u32,
    /// Minimum allele length (ref or alt) that marks a variant as structural.
    pub structural_variant_threshold: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            near_gene_distance: 1000,
            splice_donor_len: 2,
            splice_acceptor_len: 2,
            splice_region_exonic_len: 3,
            splice_region_intronic_len: 8,
            structural_variant_threshold: 1000,
        }
    }
}

impl Config {
    /// Parse a configuration overriding the defaults, e.g. from a deployment's
    /// config file. Fields absent from `text` fall back to [`Config::default`].
    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        let overrides: serde_json::Value = serde_json::from_str(text)?;
        let mut merged = serde_json::to_value(Self::default())?;
        if let (Some(base), Some(overrides)) = (merged.as_object_mut(), overrides.as_object()) {
            for (key, value) in overrides {
                base.insert(key.clone(), value.clone());
            }
        }
        serde_json::from_value(merged)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let config = Config::default();
        assert_eq!(config.near_gene_distance, 1000);
        assert_eq!(config.splice_donor_len, 2);
        assert_eq!(config.splice_acceptor_len, 2);
        assert_eq!(config.splice_region_exonic_len, 3);
        assert_eq!(config.splice_region_intronic_len, 8);
        assert_eq!(config.structural_variant_threshold, 1000);
    }

    #[test]
    fn partial_overrides_keep_remaining_defaults() {
        let config = Config::from_json_str(r#"{"near_gene_distance": 500}"#).unwrap();
        assert_eq!(config.near_gene_distance, 500);
        assert_eq!(config.splice_donor_len, 2);
    }
}
