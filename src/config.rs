use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{InsightsError, InsightsResult};
use crate::models::Metric;
use crate::scoring::{Component, Direction, Scheme};
use crate::zones::ZoneTable;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Normalized value given to every record when a field is constant.
    pub degenerate_fallback: f64,
    pub zones: ZoneThresholds,
    pub risk: RiskWeights,
    pub priority: PriorityWeights,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            degenerate_fallback: 0.0,
            zones: ZoneThresholds::default(),
            risk: RiskWeights::default(),
            priority: PriorityWeights::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneThresholds {
    pub high: f64,
    pub medium: f64,
}

impl Default for ZoneThresholds {
    fn default() -> Self {
        Self {
            high: 0.7,
            medium: 0.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskWeights {
    pub stock_level: f64,
    pub units_sold: f64,
    pub lead_time: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            stock_level: 0.4,
            units_sold: 0.4,
            lead_time: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityWeights {
    pub stock_level: f64,
    pub order_quantity: f64,
    pub lead_time: f64,
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            stock_level: 0.4,
            order_quantity: 0.4,
            lead_time: 0.2,
        }
    }
}

impl ScoringConfig {
    pub fn from_toml_str(raw: &str) -> InsightsResult<Self> {
        let config: Self = toml::from_str(raw).map_err(|e| InsightsError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> InsightsResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| InsightsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> InsightsResult<()> {
        validate_unit("degenerate_fallback", self.degenerate_fallback)?;
        validate_unit("zones.high", self.zones.high)?;
        validate_unit("zones.medium", self.zones.medium)?;
        if self.zones.medium >= self.zones.high {
            return Err(InsightsError::config(format!(
                "zones.medium ({}) must be below zones.high ({})",
                self.zones.medium, self.zones.high
            )));
        }
        validate_weights(
            "risk",
            &[
                ("stock_level", self.risk.stock_level),
                ("units_sold", self.risk.units_sold),
                ("lead_time", self.risk.lead_time),
            ],
        )?;
        validate_weights(
            "priority",
            &[
                ("stock_level", self.priority.stock_level),
                ("order_quantity", self.priority.order_quantity),
                ("lead_time", self.priority.lead_time),
            ],
        )
    }

    pub fn zone_table(&self) -> ZoneTable {
        ZoneTable::three_band(self.zones.high, self.zones.medium)
    }

    /// High stock, weak sales and long lead times signal overstock exposure.
    pub fn risk_scheme(&self) -> Scheme {
        Scheme::new(
            "Risk",
            vec![
                Component::new(Metric::StockLevel, Direction::Direct, self.risk.stock_level),
                Component::new(Metric::UnitsSold, Direction::Inverted, self.risk.units_sold),
                Component::new(Metric::LeadTime, Direction::Direct, self.risk.lead_time),
            ],
            self.zone_table(),
        )
    }

    /// Low stock, large orders and long lead times signal replenishment urgency.
    pub fn priority_scheme(&self) -> Scheme {
        Scheme::new(
            "Priority",
            vec![
                Component::new(
                    Metric::StockLevel,
                    Direction::Inverted,
                    self.priority.stock_level,
                ),
                Component::new(
                    Metric::OrderQuantity,
                    Direction::Direct,
                    self.priority.order_quantity,
                ),
                Component::new(Metric::LeadTime, Direction::Direct, self.priority.lead_time),
            ],
            self.zone_table(),
        )
    }
}

fn validate_unit(name: &str, value: f64) -> InsightsResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(InsightsError::config(format!(
            "{name} must be between 0.0 and 1.0, got {value}"
        )))
    }
}

fn validate_weights(scheme: &str, weights: &[(&str, f64)]) -> InsightsResult<()> {
    for (name, weight) in weights {
        validate_unit(&format!("{scheme}.{name}"), *weight)?;
    }
    let total: f64 = weights.iter().map(|(_, weight)| weight).sum();
    if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(InsightsError::config(format!(
            "{scheme} weights must sum to 1.0, got {total}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zones::Zone;

    #[test]
    fn defaults_are_valid() {
        let config = ScoringConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.zone_table(), ZoneTable::default());
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let config = ScoringConfig::from_toml_str("").unwrap();
        assert_eq!(config, ScoringConfig::default());
    }

    #[test]
    fn partial_toml_overrides_only_given_keys() {
        let raw = r#"
degenerate_fallback = 0.5

[zones]
high = 0.8

[risk]
stock_level = 0.5
units_sold = 0.3
"#;
        let config = ScoringConfig::from_toml_str(raw).unwrap();
        assert_eq!(config.degenerate_fallback, 0.5);
        assert_eq!(config.zones.high, 0.8);
        assert_eq!(config.zones.medium, 0.4);
        assert_eq!(config.risk.lead_time, 0.2);
        assert_eq!(config.zone_table().classify(0.75), Zone::Medium);
    }

    #[test]
    fn rejects_weights_not_summing_to_one() {
        let raw = r#"
[priority]
stock_level = 0.5
order_quantity = 0.5
lead_time = 0.5
"#;
        let err = ScoringConfig::from_toml_str(raw).unwrap_err();
        assert!(err.to_string().contains("priority weights must sum to 1.0"));
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let raw = r#"
[zones]
high = 0.3
medium = 0.6
"#;
        let err = ScoringConfig::from_toml_str(raw).unwrap_err();
        assert!(err.to_string().contains("zones.medium"));
    }

    #[test]
    fn rejects_out_of_range_fallback() {
        let mut config = ScoringConfig::default();
        config.degenerate_fallback = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn schemes_use_expected_directions() {
        let config = ScoringConfig::default();
        let risk = config.risk_scheme();
        let priority = config.priority_scheme();
        assert_eq!(risk.components()[1].metric, Metric::UnitsSold);
        assert_eq!(risk.components()[1].direction, Direction::Inverted);
        assert_eq!(priority.components()[0].metric, Metric::StockLevel);
        assert_eq!(priority.components()[0].direction, Direction::Inverted);
        assert_eq!(priority.noun(), "Priority");
    }
}
