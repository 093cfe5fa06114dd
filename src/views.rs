use serde::Serialize;

use crate::aggregate::{aggregate_by_key, AggregateOutcome, Reducer};
use crate::config::ScoringConfig;
use crate::models::{Dimension, Metric, Record};
use crate::scoring::{compute_priority_scores, compute_risk_scores, ScoringOutcome};
use crate::zones::Zone;

const ANNOTATED_PER_ZONE: usize = 5;
const TOP_SKUS: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub rows: usize,
    pub views: Vec<View>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum View {
    Bar(BarView),
    Scatter(ScatterView),
    Zones(ZoneView),
}

impl View {
    pub fn title(&self) -> &str {
        match self {
            View::Bar(view) => &view.title,
            View::Scatter(view) => &view.title,
            View::Zones(view) => &view.title,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BarView {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub bars: AggregateOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub sku: String,
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScatterView {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<ScatterPoint>,
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub sku: String,
    pub x: f64,
    pub y: f64,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ZoneView {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<ScatterPoint>,
    pub zone_counts: Vec<ZoneCount>,
    /// Highest scoring records of the top zone, labelled on the chart.
    pub annotations: Vec<Annotation>,
    pub skipped: usize,
}

struct Axes {
    x: Metric,
    y: Metric,
    series: Option<Dimension>,
    size: Option<Metric>,
}

pub fn build_dashboard(records: &[Record], config: &ScoringConfig) -> Dashboard {
    let risk = compute_risk_scores(records, config);
    let priority = compute_priority_scores(records, config);

    let views = vec![
        bar(
            "Total Revenue by Product Type",
            "Product Type",
            "Total Revenue",
            aggregate(records, Dimension::ProductType, Metric::Revenue, Reducer::Sum),
        ),
        scatter(
            records,
            "Price vs Number of Products Sold",
            "Price",
            "Number of Products Sold",
            Axes {
                x: Metric::Price,
                y: Metric::UnitsSold,
                series: Some(Dimension::ProductType),
                size: Some(Metric::Revenue),
            },
        ),
        bar(
            "Average Lead Time by Supplier",
            "Supplier",
            "Avg Lead Time (Days)",
            aggregate(records, Dimension::Supplier, Metric::LeadTime, Reducer::Mean),
        ),
        scatter(
            records,
            "Stock Levels vs Products Sold",
            "Stock Levels",
            "Number of Products Sold",
            Axes {
                x: Metric::StockLevel,
                y: Metric::UnitsSold,
                series: None,
                size: None,
            },
        ),
        bar(
            "Defect Rates by Supplier",
            "Supplier",
            "Defect Rate (%)",
            aggregate(records, Dimension::Supplier, Metric::DefectRate, Reducer::Mean),
        ),
        bar(
            "Average Transportation Cost by Mode",
            "Transportation Mode",
            "Average Transportation Cost",
            aggregate(records, Dimension::TransportationMode, Metric::Cost, Reducer::Mean)
                .sorted_desc(),
        ),
        scatter(
            records,
            "Shipping Times vs Shipping Costs by Carrier",
            "Shipping Times (Days)",
            "Shipping Costs ($)",
            Axes {
                x: Metric::ShippingTime,
                y: Metric::ShippingCost,
                series: Some(Dimension::ShippingCarrier),
                size: Some(Metric::ShippingCost),
            },
        ),
        zone_view(
            records,
            &risk,
            "High-Risk SKU Identification",
            "Stock Levels",
            "Number of Products Sold",
            Metric::UnitsSold,
        ),
        zone_view(
            records,
            &priority,
            "Products Prioritized for Replenishment",
            "Stock Levels",
            "Order Quantities",
            Metric::OrderQuantity,
        ),
        bar(
            "Top 5 Products Sold by Quantity",
            "SKU",
            "Total Quantity Sold",
            aggregate(records, Dimension::Sku, Metric::UnitsSold, Reducer::Sum).top(TOP_SKUS),
        ),
    ];

    Dashboard {
        rows: records.len(),
        views,
    }
}

fn aggregate(
    records: &[Record],
    group_by: Dimension,
    metric: Metric,
    reducer: Reducer,
) -> AggregateOutcome {
    aggregate_by_key(
        records,
        group_by,
        metric,
        reducer,
        reducer.default_precision(metric),
    )
}

fn bar(title: &str, x_label: &str, y_label: &str, bars: AggregateOutcome) -> View {
    View::Bar(BarView {
        title: title.to_string(),
        x_label: x_label.to_string(),
        y_label: y_label.to_string(),
        bars,
    })
}

fn scatter(records: &[Record], title: &str, x_label: &str, y_label: &str, axes: Axes) -> View {
    let mut points = Vec::with_capacity(records.len());
    let mut skipped = 0usize;

    for record in records {
        let size = match axes.size {
            Some(metric) => match record.metric(metric) {
                Some(value) => Some(value),
                None => {
                    skipped += 1;
                    continue;
                }
            },
            None => None,
        };
        match (record.metric(axes.x), record.metric(axes.y)) {
            (Some(x), Some(y)) => points.push(ScatterPoint {
                sku: record.sku.clone(),
                x,
                y,
                series: axes
                    .series
                    .map(|dimension| record.dimension(dimension).to_string()),
                size,
            }),
            _ => skipped += 1,
        }
    }

    View::Scatter(ScatterView {
        title: title.to_string(),
        x_label: x_label.to_string(),
        y_label: y_label.to_string(),
        points,
        skipped,
    })
}

/// Stock on x, `y_metric` on y, lead time as marker size, zone as series.
fn zone_view(
    records: &[Record],
    outcome: &ScoringOutcome,
    title: &str,
    x_label: &str,
    y_label: &str,
    y_metric: Metric,
) -> View {
    let coordinates = |row: usize| {
        let record = &records[row];
        (
            record.stock_level.unwrap_or_default(),
            record.metric(y_metric).unwrap_or_default(),
        )
    };

    let points = outcome
        .scored
        .iter()
        .map(|scored| {
            let (x, y) = coordinates(scored.row);
            ScatterPoint {
                sku: scored.sku.clone(),
                x,
                y,
                series: Some(outcome.zone_label(scored.zone)),
                size: records[scored.row].lead_time,
            }
        })
        .collect();

    let annotations = outcome
        .top_in_zone(Zone::High, ANNOTATED_PER_ZONE)
        .into_iter()
        .map(|scored| {
            let (x, y) = coordinates(scored.row);
            Annotation {
                sku: scored.sku.clone(),
                x,
                y,
                score: scored.score,
            }
        })
        .collect();

    let zone_counts = outcome
        .zone_counts()
        .into_iter()
        .map(|(zone, count)| ZoneCount {
            label: outcome.zone_label(zone),
            count,
        })
        .collect();

    View::Zones(ZoneView {
        title: title.to_string(),
        x_label: x_label.to_string(),
        y_label: y_label.to_string(),
        points,
        zone_counts,
        annotations,
        skipped: outcome.skipped,
    })
}
