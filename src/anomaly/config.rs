use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::warn;

use crate::anomaly::alias::FType;
use crate::anomaly::error::HstError;

/// Parameters of a [`HalfSpaceTree`](crate::anomaly::half_space_tree::HalfSpaceTree).
///
/// - `n_trees`: number of trees in the ensemble.
/// - `height`: height of each tree. A tree of height `h` has `h` levels of splits and one
///   level of leaves.
/// - `window_size`: number of observations per mass generation.
/// - `padding`: fraction of a feature's range that thresholds keep away from either bound.
/// - `limits`: `(low, high)` range per feature. Features that are not listed get `[0, 1]`.
/// - `seed`: seed for the tree builder. Without it the trees depend on OS entropy.
///
/// The config can be read from JSON, missing fields take their default value:
///
/// ```
/// use light_hst::anomaly::config::HalfSpaceTreeConfig;
///
/// let config: HalfSpaceTreeConfig<f64> =
///     serde_json::from_str(r#"{"n_trees": 25, "limits": {"amount": [0.0, 500.0]}}"#).unwrap();
/// assert_eq!(config.n_trees, 25);
/// assert_eq!(config.window_size, 250);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HalfSpaceTreeConfig<F: FType> {
    pub n_trees: u32,
    pub height: u32,
    pub window_size: u32,
    pub padding: F,
    pub limits: BTreeMap<String, (F, F)>,
    pub seed: Option<u64>,
}

impl<F: FType> Default for HalfSpaceTreeConfig<F> {
    fn default() -> Self {
        HalfSpaceTreeConfig {
            n_trees: 10,
            height: 8,
            window_size: 250,
            padding: F::from_f64(0.15).unwrap_or_else(F::zero),
            limits: BTreeMap::new(),
            seed: None,
        }
    }
}

impl<F: FType> HalfSpaceTreeConfig<F> {
    pub fn new(n_trees: u32, height: u32, window_size: u32) -> Self {
        HalfSpaceTreeConfig {
            n_trees,
            height,
            window_size,
            ..Default::default()
        }
    }

    pub fn with_padding(mut self, padding: F) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_limit(mut self, feature: impl Into<String>, low: F, high: F) -> Self {
        self.limits.insert(feature.into(), (low, high));
        self
    }

    pub fn with_limits(mut self, limits: BTreeMap<String, (F, F)>) -> Self {
        self.limits.extend(limits);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check every parameter, failing on the first bad one.
    pub fn validate(&self) -> Result<(), HstError> {
        let result = self.check();
        if let Err(err) = &result {
            warn!(%err, "rejecting half-space tree configuration");
        }
        result
    }

    fn check(&self) -> Result<(), HstError> {
        if self.n_trees == 0 {
            return Err(HstError::invalid("n_trees", "must be strictly positive"));
        }
        if self.height == 0 {
            return Err(HstError::invalid("height", "must be strictly positive"));
        }
        // 2^(height + 1) - 1 nodes per tree must stay addressable.
        if self.height >= usize::BITS - 1 {
            return Err(HstError::invalid(
                "height",
                format!("must be lower than {}", usize::BITS - 1),
            ));
        }
        if self.window_size == 0 {
            return Err(HstError::invalid("window_size", "must be strictly positive"));
        }
        let half = F::from_f64(0.5).unwrap_or_else(F::one);
        if !self.padding.is_finite() || self.padding < F::zero() || self.padding >= half {
            return Err(HstError::invalid(
                "padding",
                format!("{} is not in [0, 0.5)", self.padding),
            ));
        }
        for (feature, &(low, high)) in self.limits.iter() {
            if !low.is_finite() || !high.is_finite() {
                return Err(HstError::invalid(
                    format!("limits.{}", feature),
                    format!("bounds ({}, {}) must be finite", low, high),
                ));
            }
            if low >= high {
                return Err(HstError::invalid(
                    format!("limits.{}", feature),
                    format!("low bound {} must be below high bound {}", low, high),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config: HalfSpaceTreeConfig<f64> = HalfSpaceTreeConfig::default();
        assert_eq!(config.n_trees, 10);
        assert_eq!(config.height, 8);
        assert_eq!(config.window_size, 250);
        assert_eq!(config.padding, 0.15);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_parameters_are_rejected() {
        for (n_trees, height, window_size, field) in [
            (0, 3, 3, "n_trees"),
            (3, 0, 3, "height"),
            (3, 3, 0, "window_size"),
        ] {
            let config: HalfSpaceTreeConfig<f32> =
                HalfSpaceTreeConfig::new(n_trees, height, window_size);
            match config.validate() {
                Err(HstError::InvalidConfiguration { field: f, .. }) => assert_eq!(f, field),
                other => panic!("expected an error on {}, got {:?}", field, other),
            }
        }
    }

    #[test]
    fn test_degenerate_limits_are_rejected() {
        let config = HalfSpaceTreeConfig::<f64>::new(3, 3, 3).with_limit("x", 2.0, 2.0);
        assert!(config.validate().is_err());

        let config = HalfSpaceTreeConfig::<f64>::new(3, 3, 3).with_limit("x", 5.0, 1.0);
        assert!(config.validate().is_err());

        let config = HalfSpaceTreeConfig::<f64>::new(3, 3, 3).with_limit("x", 0.0, f64::INFINITY);
        assert!(config.validate().is_err());

        let config = HalfSpaceTreeConfig::<f64>::new(3, 3, 3).with_limit("x", -1.0, 1.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_padding_bounds() {
        let base = HalfSpaceTreeConfig::<f64>::new(3, 3, 3);
        assert!(base.clone().with_padding(0.0).validate().is_ok());
        assert!(base.clone().with_padding(0.49).validate().is_ok());
        assert!(base.clone().with_padding(0.5).validate().is_err());
        assert!(base.clone().with_padding(-0.1).validate().is_err());
        assert!(base.with_padding(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_from_json() {
        let config: HalfSpaceTreeConfig<f32> = serde_json::from_str(
            r#"{"n_trees": 4, "height": 5, "window_size": 100, "padding": 0.1,
                "limits": {"Amount": [0.0, 2000.0]}, "seed": 7}"#,
        )
        .unwrap();
        assert_eq!(config.n_trees, 4);
        assert_eq!(config.height, 5);
        assert_eq!(config.window_size, 100);
        assert_eq!(config.limits.get("Amount"), Some(&(0.0, 2000.0)));
        assert_eq!(config.seed, Some(7));

        let partial: HalfSpaceTreeConfig<f32> = serde_json::from_str("{}").unwrap();
        assert_eq!(partial, HalfSpaceTreeConfig::default());
    }
}
