//! Engine configuration.
//!
//! [`TableConfig`] selects how row heights are resolved, which range scan is
//! used, and what happens to visible cells on reload. Defaults reproduce the
//! reference behavior: eager heights, linear scan, visible cells destroyed.
//!
//! Hosts may also read the configuration from the environment:
//!
//! | Variable | Values |
//! |----------|--------|
//! | `VTABLE_HEIGHT_MODE` | `eager`, `lazy`, `lazy:<estimate>` |
//! | `VTABLE_RANGE_SCAN` | `linear`, `bisect` |
//! | `VTABLE_RELOAD_POLICY` | `destroy`, `recycle` |
//!
//! Unrecognized values keep the default.

/// Default height assumed for rows not yet resolved in lazy mode.
pub const DEFAULT_ESTIMATED_HEIGHT: f64 = 44.0;

/// How row heights are obtained from the data source.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HeightMode {
    /// Query every row height during reload.
    #[default]
    Eager,
    /// Query each row height on first use and memoize it. Unresolved rows
    /// contribute `estimated_height` to the total content height. The
    /// estimate must be finite and non-negative, or reload fails with
    /// [`TableError::InvalidEstimate`](crate::error::TableError::InvalidEstimate).
    Lazy { estimated_height: f64 },
}

/// Strategy for locating the visible range in the prefix-sum array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RangeScan {
    /// Accumulate heights from row 0 (O(visible end)).
    #[default]
    Linear,
    /// Binary search over the cumulative heights (O(log n)).
    ///
    /// Forces full height resolution in lazy mode.
    Bisect,
}

/// What happens to bound cells when the table reloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReloadPolicy {
    /// Drop every visible cell.
    #[default]
    Destroy,
    /// Return visible cells to the reuse pool (untagged cells are still dropped).
    Recycle,
}

/// Configuration for a [`TableView`](crate::table::TableView).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableConfig {
    /// Height resolution strategy. Default: eager.
    pub height_mode: HeightMode,
    /// Visible range scan. Default: linear.
    pub range_scan: RangeScan,
    /// Reload handling of visible cells. Default: destroy.
    pub reload_policy: ReloadPolicy,
}

impl TableConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the height resolution strategy.
    #[must_use]
    pub fn with_height_mode(mut self, mode: HeightMode) -> Self {
        self.height_mode = mode;
        self
    }

    /// Resolve heights lazily, estimating unresolved rows.
    #[must_use]
    pub fn lazy_heights(self, estimated_height: f64) -> Self {
        self.with_height_mode(HeightMode::Lazy { estimated_height })
    }

    /// Set the range scan strategy.
    #[must_use]
    pub fn with_range_scan(mut self, scan: RangeScan) -> Self {
        self.range_scan = scan;
        self
    }

    /// Set the reload policy.
    #[must_use]
    pub fn with_reload_policy(mut self, policy: ReloadPolicy) -> Self {
        self.reload_policy = policy;
        self
    }

    /// Build a configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an injected environment lookup.
    #[must_use]
    pub fn from_env_with<F>(get_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(mode) = get_env("VTABLE_HEIGHT_MODE").and_then(|v| parse_height_mode(&v)) {
            config.height_mode = mode;
        }
        if let Some(scan) = get_env("VTABLE_RANGE_SCAN").and_then(|v| parse_range_scan(&v)) {
            config.range_scan = scan;
        }
        if let Some(policy) =
            get_env("VTABLE_RELOAD_POLICY").and_then(|v| parse_reload_policy(&v))
        {
            config.reload_policy = policy;
        }
        config
    }

    /// Serialize configuration to JSONL format.
    #[must_use]
    pub fn to_jsonl(&self) -> String {
        let (mode, estimate) = match self.height_mode {
            HeightMode::Eager => ("eager", 0.0),
            HeightMode::Lazy { estimated_height } => ("lazy", estimated_height),
        };
        let scan = match self.range_scan {
            RangeScan::Linear => "linear",
            RangeScan::Bisect => "bisect",
        };
        let policy = match self.reload_policy {
            ReloadPolicy::Destroy => "destroy",
            ReloadPolicy::Recycle => "recycle",
        };
        format!(
            r#"{{"event":"table_config","height_mode":"{mode}","estimated_height":{estimate:.3},"range_scan":"{scan}","reload_policy":"{policy}"}}"#
        )
    }
}

fn parse_height_mode(value: &str) -> Option<HeightMode> {
    let lower = value.trim().to_ascii_lowercase();
    match lower.as_str() {
        "eager" => Some(HeightMode::Eager),
        "lazy" => Some(HeightMode::Lazy {
            estimated_height: DEFAULT_ESTIMATED_HEIGHT,
        }),
        other => {
            let estimate = other.strip_prefix("lazy:")?.trim().parse::<f64>().ok()?;
            (estimate.is_finite() && estimate >= 0.0).then_some(HeightMode::Lazy {
                estimated_height: estimate,
            })
        }
    }
}

fn parse_range_scan(value: &str) -> Option<RangeScan> {
    match value.trim().to_ascii_lowercase().as_str() {
        "linear" => Some(RangeScan::Linear),
        "bisect" | "binary" => Some(RangeScan::Bisect),
        _ => None,
    }
}

fn parse_reload_policy(value: &str) -> Option<ReloadPolicy> {
    match value.trim().to_ascii_lowercase().as_str() {
        "destroy" => Some(ReloadPolicy::Destroy),
        "recycle" => Some(ReloadPolicy::Recycle),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_reference_behavior() {
        let config = TableConfig::default();
        assert_eq!(config.height_mode, HeightMode::Eager);
        assert_eq!(config.range_scan, RangeScan::Linear);
        assert_eq!(config.reload_policy, ReloadPolicy::Destroy);
    }

    #[test]
    fn env_overrides_each_field() {
        let config = TableConfig::from_env_with(env(&[
            ("VTABLE_HEIGHT_MODE", "lazy:20"),
            ("VTABLE_RANGE_SCAN", "Bisect"),
            ("VTABLE_RELOAD_POLICY", " recycle "),
        ]));
        assert_eq!(
            config.height_mode,
            HeightMode::Lazy {
                estimated_height: 20.0
            }
        );
        assert_eq!(config.range_scan, RangeScan::Bisect);
        assert_eq!(config.reload_policy, ReloadPolicy::Recycle);
    }

    #[test]
    fn bare_lazy_uses_default_estimate() {
        let config = TableConfig::from_env_with(env(&[("VTABLE_HEIGHT_MODE", "lazy")]));
        assert_eq!(
            config.height_mode,
            HeightMode::Lazy {
                estimated_height: DEFAULT_ESTIMATED_HEIGHT
            }
        );
    }

    #[test]
    fn unknown_env_values_keep_defaults() {
        let config = TableConfig::from_env_with(env(&[
            ("VTABLE_HEIGHT_MODE", "lazy:-3"),
            ("VTABLE_RANGE_SCAN", "spiral"),
            ("VTABLE_RELOAD_POLICY", ""),
        ]));
        assert_eq!(config, TableConfig::default());
    }

    #[test]
    fn jsonl_is_single_line() {
        let line = TableConfig::new()
            .lazy_heights(12.5)
            .with_range_scan(RangeScan::Bisect)
            .to_jsonl();
        assert!(!line.contains('\n'));
        assert!(line.contains(r#""height_mode":"lazy""#));
        assert!(line.contains(r#""estimated_height":12.500"#));
        assert!(line.contains(r#""range_scan":"bisect""#));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_roundtrip_preserves_config() {
        let config = TableConfig::new()
            .lazy_heights(30.0)
            .with_reload_policy(ReloadPolicy::Recycle);
        let json = serde_json::to_string(&config).expect("serialize");
        let back: TableConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, config);
    }
}
