use std::io::Read;
use std::path::Path;

use tracing::info;

use crate::error::{InsightsError, InsightsResult};
use crate::models::{Dimension, Metric, Record};

const REQUIRED_DIMENSIONS: [Dimension; 5] = [
    Dimension::ProductType,
    Dimension::Sku,
    Dimension::Supplier,
    Dimension::TransportationMode,
    Dimension::ShippingCarrier,
];

const REQUIRED_METRICS: [Metric; 10] = [
    Metric::Price,
    Metric::UnitsSold,
    Metric::Revenue,
    Metric::StockLevel,
    Metric::OrderQuantity,
    Metric::ShippingTime,
    Metric::ShippingCost,
    Metric::LeadTime,
    Metric::DefectRate,
    Metric::Cost,
];

pub fn load_records<R: Read>(reader: R) -> InsightsResult<Vec<Record>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers().map_err(|e| csv_error(&e))?.clone();
    let missing = REQUIRED_DIMENSIONS
        .iter()
        .map(Dimension::column)
        .chain(REQUIRED_METRICS.iter().map(Metric::column))
        .find(|column| !headers.iter().any(|header| header == *column));
    if let Some(column) = missing {
        return Err(InsightsError::missing_column(column));
    }

    let mut records = Vec::new();
    for result in csv_reader.deserialize::<Record>() {
        records.push(result.map_err(|e| csv_error(&e))?);
    }

    info!(rows = records.len(), "loaded supply chain records");
    Ok(records)
}

pub fn load_records_file(path: &Path) -> InsightsResult<Vec<Record>> {
    let file = std::fs::File::open(path).map_err(|source| InsightsError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_records(file)
}

fn csv_error(err: &csv::Error) -> InsightsError {
    let line = err.position().map(|pos| pos.line()).unwrap_or(0);
    InsightsError::Csv {
        line,
        message: err.to_string(),
    }
}

#[cfg(test)]
pub(crate) const SAMPLE_CSV: &str = "\
Product type,SKU,Price,Availability,Number of products sold,Revenue generated,Stock levels,Lead times,Order quantities,Shipping times,Shipping carriers,Shipping costs,Supplier name,Lead time,Defect rates,Transportation modes,Costs
haircare,SKU0,69.81,55,802,8661.99,58,7,96,4,Carrier B,2.96,Supplier 3,29,0.23,Road,187.75
skincare,SKU1,14.84,95,736,7460.90,53,30,37,2,Carrier A,9.72,Supplier 3,23,4.85,Road,503.07
haircare,SKU2,11.32,34,8,9577.75,1,10,88,2,Carrier B,8.05,Supplier 1,12,4.58,Air,141.92
skincare,SKU3,61.16,68,83,7766.84,23,13,59,6,Carrier C,1.73,Supplier 5,24,4.75,Rail,254.78
skincare,SKU4,4.81,26,871,2686.51,5,3,56,8,Carrier A,3.89,Supplier 1,5,3.15,Air,923.44
cosmetics,SKU5,1.70,87,147,2828.35,90,27,66,3,Carrier B,4.44,Supplier 4,10,2.00,Road,235.46
";
