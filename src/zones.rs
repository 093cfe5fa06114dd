use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Zone {
    Low,
    Medium,
    High,
}

impl Zone {
    pub const ALL: [Zone; 3] = [Zone::Low, Zone::Medium, Zone::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::Low => "Low",
            Zone::Medium => "Medium",
            Zone::High => "High",
        }
    }

    /// Display label such as "High Risk" or "Low Priority".
    pub fn label(&self, noun: &str) -> String {
        format!("{} {}", self.as_str(), noun)
    }
}

/// Ordered `(lower_bound_exclusive, zone)` bands.
///
/// Bands are checked from the highest bound down and the first bound the
/// score strictly exceeds wins; a score that exceeds none lands in `floor`.
/// A score equal to a bound therefore falls into the band below it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneTable {
    bands: Vec<(f64, Zone)>,
    floor: Zone,
}

impl ZoneTable {
    pub fn new(mut bands: Vec<(f64, Zone)>, floor: Zone) -> Self {
        bands.sort_by(|a, b| b.0.total_cmp(&a.0));
        Self { bands, floor }
    }

    /// High above `high`, Medium above `medium`, Low otherwise.
    pub fn three_band(high: f64, medium: f64) -> Self {
        Self::new(vec![(high, Zone::High), (medium, Zone::Medium)], Zone::Low)
    }

    pub fn classify(&self, score: f64) -> Zone {
        self.bands
            .iter()
            .find(|(bound, _)| score > *bound)
            .map(|(_, zone)| *zone)
            .unwrap_or(self.floor)
    }
}

impl Default for ZoneTable {
    fn default() -> Self {
        Self::three_band(0.7, 0.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_bands_follow_thresholds() {
        let table = ZoneTable::default();
        assert_eq!(table.classify(0.95), Zone::High);
        assert_eq!(table.classify(0.55), Zone::Medium);
        assert_eq!(table.classify(0.1), Zone::Low);
    }

    #[test]
    fn bounds_are_exclusive() {
        let table = ZoneTable::default();
        assert_eq!(table.classify(0.7), Zone::Medium);
        assert_eq!(table.classify(0.4), Zone::Low);
        assert_eq!(table.classify(0.700_000_1), Zone::High);
    }

    #[test]
    fn band_order_does_not_matter() {
        let table = ZoneTable::new(vec![(0.4, Zone::Medium), (0.7, Zone::High)], Zone::Low);
        assert_eq!(table, ZoneTable::default());
        assert_eq!(table.classify(0.8), Zone::High);
    }

    #[test]
    fn labels_carry_the_scheme_noun() {
        assert_eq!(Zone::High.label("Risk"), "High Risk");
        assert_eq!(Zone::Low.label("Priority"), "Low Priority");
    }

    proptest! {
        /// Property: a higher score never lands in a lower zone.
        #[test]
        fn classification_is_monotonic(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
            let table = ZoneTable::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(table.classify(lo) <= table.classify(hi));
        }
    }
}
