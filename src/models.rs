use serde::{Deserialize, Deserializer, Serialize};

/// One row of the supply chain table.
///
/// Numeric cells are optional: an empty or non-numeric cell loads as `None`
/// and the consumer decides whether the row can still be used.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Record {
    #[serde(rename = "Product type")]
    pub product_type: String,
    #[serde(rename = "SKU")]
    pub sku: String,
    #[serde(rename = "Price", default, deserialize_with = "lenient_number")]
    pub price: Option<f64>,
    #[serde(
        rename = "Number of products sold",
        default,
        deserialize_with = "lenient_number"
    )]
    pub units_sold: Option<f64>,
    #[serde(
        rename = "Revenue generated",
        default,
        deserialize_with = "lenient_number"
    )]
    pub revenue: Option<f64>,
    #[serde(rename = "Stock levels", default, deserialize_with = "lenient_number")]
    pub stock_level: Option<f64>,
    #[serde(
        rename = "Order quantities",
        default,
        deserialize_with = "lenient_number"
    )]
    pub order_quantity: Option<f64>,
    #[serde(rename = "Shipping times", default, deserialize_with = "lenient_number")]
    pub shipping_time: Option<f64>,
    #[serde(rename = "Shipping carriers")]
    pub shipping_carrier: String,
    #[serde(rename = "Shipping costs", default, deserialize_with = "lenient_number")]
    pub shipping_cost: Option<f64>,
    #[serde(rename = "Supplier name")]
    pub supplier_name: String,
    #[serde(rename = "Lead time", default, deserialize_with = "lenient_number")]
    pub lead_time: Option<f64>,
    #[serde(rename = "Defect rates", default, deserialize_with = "lenient_number")]
    pub defect_rate: Option<f64>,
    #[serde(rename = "Transportation modes")]
    pub transportation_mode: String,
    #[serde(rename = "Costs", default, deserialize_with = "lenient_number")]
    pub cost: Option<f64>,
}

impl Record {
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Price => self.price,
            Metric::UnitsSold => self.units_sold,
            Metric::Revenue => self.revenue,
            Metric::StockLevel => self.stock_level,
            Metric::OrderQuantity => self.order_quantity,
            Metric::ShippingTime => self.shipping_time,
            Metric::ShippingCost => self.shipping_cost,
            Metric::LeadTime => self.lead_time,
            Metric::DefectRate => self.defect_rate,
            Metric::Cost => self.cost,
        }
    }

    pub fn dimension(&self, dimension: Dimension) -> &str {
        match dimension {
            Dimension::ProductType => &self.product_type,
            Dimension::Sku => &self.sku,
            Dimension::Supplier => &self.supplier_name,
            Dimension::TransportationMode => &self.transportation_mode,
            Dimension::ShippingCarrier => &self.shipping_carrier,
        }
    }
}

/// Numeric columns of the table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Price,
    UnitsSold,
    Revenue,
    StockLevel,
    OrderQuantity,
    ShippingTime,
    ShippingCost,
    LeadTime,
    DefectRate,
    Cost,
}

impl Metric {
    pub fn column(&self) -> &'static str {
        match self {
            Metric::Price => "Price",
            Metric::UnitsSold => "Number of products sold",
            Metric::Revenue => "Revenue generated",
            Metric::StockLevel => "Stock levels",
            Metric::OrderQuantity => "Order quantities",
            Metric::ShippingTime => "Shipping times",
            Metric::ShippingCost => "Shipping costs",
            Metric::LeadTime => "Lead time",
            Metric::DefectRate => "Defect rates",
            Metric::Cost => "Costs",
        }
    }

    /// Money, counts and durations/rates round differently for display.
    pub fn is_time_or_rate(&self) -> bool {
        matches!(
            self,
            Metric::ShippingTime | Metric::LeadTime | Metric::DefectRate
        )
    }
}

/// Categorical columns records can be grouped by.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    ProductType,
    Sku,
    Supplier,
    TransportationMode,
    ShippingCarrier,
}

impl Dimension {
    pub fn column(&self) -> &'static str {
        match self {
            Dimension::ProductType => "Product type",
            Dimension::Sku => "SKU",
            Dimension::Supplier => "Supplier name",
            Dimension::TransportationMode => "Transportation modes",
            Dimension::ShippingCarrier => "Shipping carriers",
        }
    }
}

/// Accepts empty cells and junk like "n/a" as missing instead of failing the
/// whole file. Non-finite values count as missing too.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| {
        value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|number| number.is_finite())
    }))
}
