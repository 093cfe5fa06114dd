use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use crate::models::{Dimension, Metric, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Reducer {
    Sum,
    Mean,
}

impl Reducer {
    /// Default display precision for a reduction of `metric`.
    ///
    /// Totals and money show whole numbers; time and rate means keep two
    /// decimals.
    pub fn default_precision(&self, metric: Metric) -> u32 {
        match self {
            Reducer::Mean if metric.is_time_or_rate() => 2,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub key: String,
    /// Exact reduced value; everything downstream computes from this.
    pub value: f64,
    /// `value` rounded for display.
    pub rounded: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateOutcome {
    pub group_by: Dimension,
    pub metric: Metric,
    pub reducer: Reducer,
    pub precision: u32,
    /// One row per distinct key, ascending by key.
    pub rows: Vec<AggregateRow>,
    /// Records with an empty key or a missing value.
    pub skipped: usize,
}

impl AggregateOutcome {
    /// Rows by descending exact value; ties keep key order.
    pub fn sorted_desc(mut self) -> Self {
        self.rows.sort_by(|a, b| b.value.total_cmp(&a.value));
        self
    }

    pub fn top(self, n: usize) -> Self {
        let mut sorted = self.sorted_desc();
        sorted.rows.truncate(n);
        sorted
    }
}

pub fn aggregate_by_key(
    records: &[Record],
    group_by: Dimension,
    metric: Metric,
    reducer: Reducer,
    precision: u32,
) -> AggregateOutcome {
    let mut groups: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    let mut skipped = 0usize;

    for record in records {
        let key = record.dimension(group_by);
        match (key.is_empty(), record.metric(metric)) {
            (false, Some(value)) => {
                let entry = groups.entry(key.to_string()).or_insert((0.0, 0));
                entry.0 += value;
                entry.1 += 1;
            }
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!(
            group_by = group_by.column(),
            field = metric.column(),
            skipped,
            "records without a key or value were left out of the aggregate"
        );
    }

    let rows = groups
        .into_iter()
        .map(|(key, (total, count))| {
            let value = match reducer {
                Reducer::Sum => total,
                Reducer::Mean => total / count as f64,
            };
            AggregateRow {
                key,
                value,
                rounded: round_to(value, precision),
                count,
            }
        })
        .collect();

    AggregateOutcome {
        group_by,
        metric,
        reducer,
        precision,
        rows,
        skipped,
    }
}

// f64 carries ~15 significant decimal digits; more places only overflow.
const MAX_PLACES: u32 = 15;

pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places.min(MAX_PLACES) as i32);
    (value * factor).round() / factor
}
