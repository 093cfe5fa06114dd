//! Both rankings (overstock risk and replenishment priority) run through
//! [`score_records`]; they differ only in the [`Scheme`] they pass in.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ScoringConfig;
use crate::models::{Metric, Record};
use crate::zones::{Zone, ZoneTable};

// Weighted sums pick up float noise (0.4 + 0.2 + 0.1 > 0.7); scores are
// snapped to this many decimals before zoning.
const SCORE_DECIMALS: i32 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Larger raw values push the score up.
    Direct,
    /// Larger raw values push the score down (`1 - norm`).
    Inverted,
}

impl Direction {
    pub fn orient(&self, normalized: f64) -> f64 {
        match self {
            Direction::Direct => normalized,
            Direction::Inverted => 1.0 - normalized,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    pub metric: Metric,
    pub direction: Direction,
    pub weight: f64,
}

impl Component {
    pub fn new(metric: Metric, direction: Direction, weight: f64) -> Self {
        Self {
            metric,
            direction,
            weight,
        }
    }
}

/// A named weighting of normalized fields plus the bands used to zone it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scheme {
    noun: String,
    components: Vec<Component>,
    zones: ZoneTable,
}

impl Scheme {
    pub fn new(noun: impl Into<String>, components: Vec<Component>, zones: ZoneTable) -> Self {
        Self {
            noun: noun.into(),
            components,
            zones,
        }
    }

    pub fn noun(&self) -> &str {
        &self.noun
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn zones(&self) -> &ZoneTable {
        &self.zones
    }
}

/// Observed range of one field across the scored set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MinMax {
    pub min: f64,
    pub max: f64,
}

impl MinMax {
    pub fn over(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        values.into_iter().fold(None, |range, value| match range {
            None => Some(MinMax {
                min: value,
                max: value,
            }),
            Some(MinMax { min, max }) => Some(MinMax {
                min: min.min(value),
                max: max.max(value),
            }),
        })
    }

    pub fn is_degenerate(&self) -> bool {
        self.max <= self.min
    }

    /// `(value - min) / (max - min)`, or `fallback` when the range is empty.
    pub fn normalize(&self, value: f64, fallback: f64) -> f64 {
        if self.is_degenerate() {
            return fallback;
        }
        ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentScore {
    pub metric: Metric,
    /// Plain min-max value.
    pub normalized: f64,
    /// `normalized` after the component's direction is applied.
    pub oriented: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRecord {
    /// Position of the record in the input slice.
    pub row: usize,
    pub sku: String,
    pub components: Vec<ComponentScore>,
    pub score: f64,
    pub zone: Zone,
}

impl ScoredRecord {
    pub fn normalized(&self, metric: Metric) -> Option<f64> {
        self.components
            .iter()
            .find(|component| component.metric == metric)
            .map(|component| component.normalized)
    }

    pub fn normalized_stock(&self) -> Option<f64> {
        self.normalized(Metric::StockLevel)
    }

    /// Units sold for the risk scheme, order quantity for priority.
    pub fn normalized_sales_or_order(&self) -> Option<f64> {
        self.normalized(Metric::UnitsSold)
            .or_else(|| self.normalized(Metric::OrderQuantity))
    }

    pub fn normalized_lead_time(&self) -> Option<f64> {
        self.normalized(Metric::LeadTime)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringOutcome {
    pub noun: String,
    /// Scorable records, in input order.
    pub scored: Vec<ScoredRecord>,
    /// Records dropped because a scheme field was missing or non-numeric.
    pub skipped: usize,
    pub ranges: Vec<(Metric, MinMax)>,
}

impl ScoringOutcome {
    /// All scored records by descending score; ties keep input order.
    pub fn ranked(&self) -> Vec<&ScoredRecord> {
        let mut ranked: Vec<&ScoredRecord> = self.scored.iter().collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked
    }

    /// At most `n` records of `zone`, highest score first.
    pub fn top_in_zone(&self, zone: Zone, n: usize) -> Vec<&ScoredRecord> {
        self.ranked()
            .into_iter()
            .filter(|record| record.zone == zone)
            .take(n)
            .collect()
    }

    pub fn zone_counts(&self) -> Vec<(Zone, usize)> {
        Zone::ALL
            .iter()
            .map(|zone| {
                let count = self.scored.iter().filter(|r| r.zone == *zone).count();
                (*zone, count)
            })
            .collect()
    }

    pub fn zone_label(&self, zone: Zone) -> String {
        zone.label(&self.noun)
    }
}

pub fn compute_risk_scores(records: &[Record], config: &ScoringConfig) -> ScoringOutcome {
    score_records(records, &config.risk_scheme(), config.degenerate_fallback)
}

pub fn compute_priority_scores(records: &[Record], config: &ScoringConfig) -> ScoringOutcome {
    score_records(records, &config.priority_scheme(), config.degenerate_fallback)
}

/// Scores every record that has all of the scheme's fields.
///
/// Each field's min/max comes from every record that has that field, even
/// when the record itself is not scorable.
pub fn score_records(records: &[Record], scheme: &Scheme, fallback: f64) -> ScoringOutcome {
    let mut eligible: Vec<(usize, &Record, Vec<f64>)> = Vec::with_capacity(records.len());
    let mut skipped = 0usize;

    for (row, record) in records.iter().enumerate() {
        let values: Option<Vec<f64>> = scheme
            .components()
            .iter()
            .map(|component| record.metric(component.metric))
            .collect();
        match values {
            Some(values) => eligible.push((row, record, values)),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!(
            scheme = %scheme.noun(),
            skipped,
            "records missing a scoring field were excluded"
        );
    }

    let ranges: Vec<(Metric, MinMax)> = scheme
        .components()
        .iter()
        .filter_map(|component| {
            MinMax::over(records.iter().filter_map(|r| r.metric(component.metric)))
                .map(|range| (component.metric, range))
        })
        .collect();

    for (metric, range) in &ranges {
        debug!(
            scheme = %scheme.noun(),
            field = metric.column(),
            min = range.min,
            max = range.max,
            "normalization range"
        );
        if range.is_degenerate() {
            warn!(
                scheme = %scheme.noun(),
                field = metric.column(),
                fallback,
                "field is constant across records; using fallback normalized value"
            );
        }
    }

    let scored: Vec<ScoredRecord> = eligible
        .into_iter()
        .map(|(row, record, values)| {
            let components: Vec<ComponentScore> = scheme
                .components()
                .iter()
                .zip(&ranges)
                .zip(values)
                .map(|((component, (_, range)), value)| {
                    let normalized = range.normalize(value, fallback);
                    ComponentScore {
                        metric: component.metric,
                        normalized,
                        oriented: component.direction.orient(normalized),
                    }
                })
                .collect();
            let score = scheme
                .components()
                .iter()
                .zip(&components)
                .map(|(component, part)| component.weight * part.oriented)
                .sum::<f64>();
            let score = snap(score);
            ScoredRecord {
                row,
                sku: record.sku.clone(),
                components,
                score,
                zone: scheme.zones().classify(score),
            }
        })
        .collect();

    info!(
        scheme = %scheme.noun(),
        scored = scored.len(),
        skipped,
        "computed composite scores"
    );

    ScoringOutcome {
        noun: scheme.noun().to_string(),
        scored,
        skipped,
        ranges,
    }
}

fn snap(score: f64) -> f64 {
    let factor = 10f64.powi(SCORE_DECIMALS);
    (score * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(sku: &str, stock: f64, sold: f64, lead: f64, order: f64) -> Record {
        Record {
            sku: sku.to_string(),
            stock_level: Some(stock),
            units_sold: Some(sold),
            lead_time: Some(lead),
            order_quantity: Some(order),
            ..Record::default()
        }
    }

    fn spec_example() -> Vec<Record> {
        vec![
            record("SKU-A", 10.0, 90.0, 5.0, 10.0),
            record("SKU-B", 50.0, 50.0, 5.0, 10.0),
            record("SKU-C", 90.0, 10.0, 5.0, 10.0),
        ]
    }

    #[test]
    fn risk_is_driven_by_stock_and_sales_when_lead_time_is_constant() {
        let outcome = compute_risk_scores(&spec_example(), &ScoringConfig::default());
        assert_eq!(outcome.scored.len(), 3);
        assert_eq!(outcome.skipped, 0);

        let low = &outcome.scored[0];
        let mid = &outcome.scored[1];
        let high = &outcome.scored[2];
        assert!(low.score.abs() < 1e-12);
        assert!((high.score - 0.8).abs() < 1e-12);
        assert!(low.score < mid.score && mid.score < high.score);
        assert_eq!(high.zone, Zone::High);
        assert_eq!(low.zone, Zone::Low);
        assert_eq!(outcome.zone_label(high.zone), "High Risk");

        for scored in &outcome.scored {
            assert_eq!(scored.normalized_lead_time(), Some(0.0));
        }
    }

    #[test]
    fn priority_inverts_stock() {
        let records = vec![
            record("LOW-STOCK", 5.0, 0.0, 30.0, 100.0),
            record("HIGH-STOCK", 95.0, 0.0, 1.0, 10.0),
        ];
        let outcome = compute_priority_scores(&records, &ScoringConfig::default());
        let urgent = &outcome.scored[0];
        let relaxed = &outcome.scored[1];

        assert_eq!(urgent.normalized_stock(), Some(0.0));
        assert_eq!(urgent.components[0].oriented, 1.0);
        assert_eq!(urgent.normalized_sales_or_order(), Some(1.0));
        assert!((urgent.score - 1.0).abs() < 1e-12);
        assert_eq!(urgent.zone, Zone::High);
        assert!(relaxed.score.abs() < 1e-12);
        assert_eq!(outcome.zone_label(relaxed.zone), "Low Priority");
    }

    #[test]
    fn boundary_score_is_medium_for_both_schemes() {
        let config = ScoringConfig::default();
        assert_eq!(config.risk_scheme().zones().classify(0.7), Zone::Medium);
        assert_eq!(config.priority_scheme().zones().classify(0.7), Zone::Medium);
    }

    #[test]
    fn record_scoring_exactly_seven_tenths_is_medium_risk() {
        let records = vec![
            record("MIN", 0.0, 0.0, 0.0, 0.0),
            record("MAX", 100.0, 100.0, 10.0, 0.0),
            record("EDGE", 100.0, 50.0, 5.0, 0.0),
        ];
        let outcome = compute_risk_scores(&records, &ScoringConfig::default());
        let edge = &outcome.scored[2];
        assert_eq!(edge.score, 0.7);
        assert_eq!(edge.zone, Zone::Medium);
    }

    #[test]
    fn record_scoring_exactly_seven_tenths_is_medium_priority() {
        let records = vec![
            record("MIN", 0.0, 0.0, 0.0, 0.0),
            record("MAX", 100.0, 0.0, 10.0, 10.0),
            record("EDGE", 0.0, 0.0, 5.0, 5.0),
        ];
        let outcome = compute_priority_scores(&records, &ScoringConfig::default());
        let edge = &outcome.scored[2];
        assert_eq!(edge.score, 0.7);
        assert_eq!(edge.zone, Zone::Medium);
    }

    #[test]
    fn constant_field_uses_configured_fallback() {
        let records = vec![
            record("A", 20.0, 1.0, 4.0, 1.0),
            record("B", 20.0, 9.0, 8.0, 1.0),
        ];
        let config = ScoringConfig {
            degenerate_fallback: 0.5,
            ..ScoringConfig::default()
        };
        let outcome = compute_risk_scores(&records, &config);
        for scored in &outcome.scored {
            assert_eq!(scored.normalized_stock(), Some(0.5));
            assert!(scored.score.is_finite());
        }
        assert!(outcome.ranges[0].1.is_degenerate());
    }

    #[test]
    fn rows_missing_a_field_are_skipped_and_counted() {
        let mut records = spec_example();
        records.push(Record {
            sku: "BROKEN".to_string(),
            stock_level: None,
            units_sold: Some(1_000.0),
            lead_time: Some(99.0),
            order_quantity: Some(1.0),
            ..Record::default()
        });

        let risk = compute_risk_scores(&records, &ScoringConfig::default());
        assert_eq!(risk.scored.len(), 3);
        assert_eq!(risk.skipped, 1);
        // The unscorable row still contributes its units sold to the range.
        assert_eq!(risk.ranges[1].1.max, 1_000.0);
        assert_eq!(risk.ranges[0].1.max, 90.0);
        assert!(risk.scored.iter().all(|r| r.sku != "BROKEN"));

        let priority = compute_priority_scores(&records, &ScoringConfig::default());
        assert_eq!(priority.skipped, 1);
    }

    #[test]
    fn empty_input_is_empty_outcome() {
        let outcome = compute_risk_scores(&[], &ScoringConfig::default());
        assert!(outcome.scored.is_empty());
        assert_eq!(outcome.skipped, 0);
        assert!(outcome.top_in_zone(Zone::High, 5).is_empty());
    }

    #[test]
    fn scoring_is_idempotent() {
        let records = spec_example();
        let config = ScoringConfig::default();
        assert_eq!(
            compute_risk_scores(&records, &config),
            compute_risk_scores(&records, &config)
        );
    }

    #[test]
    fn top_five_high_risk_sorted_with_stable_ties() {
        // Anchor row fixes the low end of every range.
        let mut records = vec![record("ANCHOR", 0.0, 1_000.0, 0.0, 1.0)];
        for i in 0..20 {
            let stock = 900.0 + (i / 2) as f64;
            records.push(record(&format!("SKU{i}"), stock, 0.0, 10.0, 1.0));
        }

        let outcome = compute_risk_scores(&records, &ScoringConfig::default());
        let high = outcome
            .scored
            .iter()
            .filter(|r| r.zone == Zone::High)
            .count();
        assert_eq!(high, 20);

        let top: Vec<&str> = outcome
            .top_in_zone(Zone::High, 5)
            .iter()
            .map(|r| r.sku.as_str())
            .collect();
        assert_eq!(top, vec!["SKU18", "SKU19", "SKU16", "SKU17", "SKU14"]);
    }

    #[test]
    fn zone_counts_cover_every_zone() {
        let outcome = compute_risk_scores(&spec_example(), &ScoringConfig::default());
        let counts = outcome.zone_counts();
        assert_eq!(counts.len(), 3);
        assert_eq!(counts.iter().map(|(_, n)| n).sum::<usize>(), 3);
        assert_eq!(counts[2], (Zone::High, 1));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: normalized values and scores stay inside [0, 1].
        #[test]
        fn normalized_and_scores_are_bounded(
            rows in prop::collection::vec(
                (0.0f64..10_000.0, 0.0f64..10_000.0, 0.0f64..60.0, 0.0f64..500.0),
                1..40,
            )
        ) {
            let records: Vec<Record> = rows
                .iter()
                .enumerate()
                .map(|(i, (stock, sold, lead, order))| {
                    record(&format!("SKU{i}"), *stock, *sold, *lead, *order)
                })
                .collect();
            let config = ScoringConfig::default();

            for outcome in [
                compute_risk_scores(&records, &config),
                compute_priority_scores(&records, &config),
            ] {
                prop_assert_eq!(outcome.scored.len(), records.len());
                for scored in &outcome.scored {
                    for part in &scored.components {
                        prop_assert!((0.0..=1.0).contains(&part.normalized));
                        prop_assert!((0.0..=1.0).contains(&part.oriented));
                    }
                    prop_assert!(scored.score >= -1e-12 && scored.score <= 1.0 + 1e-12);
                }
            }
        }
    }
}
