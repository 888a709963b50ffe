//! Order dataset: loading, date bounds and range filtering

pub mod aggregate;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs::File;
use thiserror::Error;

/// Timestamp format used by the dataset's two datetime columns
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open dataset {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// Missing columns and unparsable cells both surface here; csv reports
    /// the offending line in the error it carries.
    #[error("malformed dataset: {0}")]
    Csv(#[from] csv::Error),
}

/// One order line item: a single (order, product) pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: String,
    pub product_id: String,
    pub product_category_name: String,
    pub customer_id: String,
    #[serde(deserialize_with = "de_timestamp")]
    pub order_purchase_timestamp: NaiveDateTime,
    /// Empty for orders that were never delivered
    #[serde(deserialize_with = "de_opt_timestamp")]
    pub order_delivered_customer_date: Option<NaiveDateTime>,
    pub total_frequency: u64,
    pub total_revenue: f64,
}

impl OrderRecord {
    /// Calendar day the purchase was made
    pub fn purchase_date(&self) -> NaiveDate {
        self.order_purchase_timestamp.date()
    }
}

fn de_timestamp<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT)
        .map_err(|e| serde::de::Error::custom(format!("invalid timestamp '{}': {}", raw, e)))
}

fn de_opt_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT)
        .map(Some)
        .map_err(|e| serde::de::Error::custom(format!("invalid timestamp '{}': {}", raw, e)))
}

/// The full dataset, held in memory for the process lifetime.
/// Rows are sorted by purchase timestamp ascending.
#[derive(Debug)]
pub struct Dataset {
    rows: Vec<OrderRecord>,
}

impl Dataset {
    pub fn load(path: &str) -> Result<Self, LoadError> {
        let file = File::open(path).map_err(|source| LoadError::Open {
            path: path.to_string(),
            source,
        })?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, LoadError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut rows = rdr
            .deserialize()
            .collect::<Result<Vec<OrderRecord>, csv::Error>>()?;

        rows.sort_by_key(|r| r.order_purchase_timestamp);

        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[OrderRecord] {
        &self.rows
    }

    /// Min and max purchase dates, or None for an empty dataset
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.rows.first()?;
        let last = self.rows.last()?;
        Some((first.purchase_date(), last.purchase_date()))
    }

    /// Records whose purchase date falls within the closed interval
    /// `[start, end]`. A reversed range yields the empty slice.
    pub fn slice(&self, start: NaiveDate, end: NaiveDate) -> &[OrderRecord] {
        if start > end {
            return &[];
        }
        let lo = self.rows.partition_point(|r| r.purchase_date() < start);
        let hi = self.rows.partition_point(|r| r.purchase_date() <= end);
        &self.rows[lo..hi]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "order_id,product_id,product_category_name,customer_id,order_purchase_timestamp,order_delivered_customer_date,total_frequency,total_revenue";

    fn sample() -> Dataset {
        let csv = format!(
            "{HEADER}\n\
             o3,p2,beauty,c3,2018-03-05 09:00:00,2018-03-10 12:00:00,1,30.0\n\
             o1,p1,toys,c1,2018-01-01 08:30:00,2018-01-04 10:00:00,2,10.0\n\
             o2,p1,toys,c2,2018-01-01 19:45:00,,1,20.0\n"
        );
        Dataset::from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn rows_sorted_by_purchase_timestamp() {
        let dataset = sample();
        let ids: Vec<&str> = dataset.rows().iter().map(|r| r.order_id.as_str()).collect();
        assert_eq!(ids, ["o1", "o2", "o3"]);
    }

    #[test]
    fn date_bounds_span_dataset() {
        let dataset = sample();
        let (min, max) = dataset.date_bounds().unwrap();
        assert_eq!(min, NaiveDate::from_ymd_opt(2018, 1, 1).unwrap());
        assert_eq!(max, NaiveDate::from_ymd_opt(2018, 3, 5).unwrap());
    }

    #[test]
    fn missing_delivery_is_none() {
        let dataset = sample();
        assert!(dataset.rows()[1].order_delivered_customer_date.is_none());
        assert!(dataset.rows()[0].order_delivered_customer_date.is_some());
    }

    #[test]
    fn single_day_slice_keeps_whole_day() {
        let dataset = sample();
        let day = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
        let rows = dataset.slice(day, day);
        // both the 08:30 and the 19:45 record of that day
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.purchase_date() == day));
    }

    #[test]
    fn reversed_range_is_empty() {
        let dataset = sample();
        let start = NaiveDate::from_ymd_opt(2018, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
        assert!(dataset.slice(start, end).is_empty());
    }

    #[test]
    fn out_of_range_slice_is_empty() {
        let dataset = sample();
        let start = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2019, 12, 31).unwrap();
        assert!(dataset.slice(start, end).is_empty());
    }

    #[test]
    fn headers_only_loads_empty() {
        let dataset = Dataset::from_reader(format!("{HEADER}\n").as_bytes()).unwrap();
        assert!(dataset.is_empty());
        assert!(dataset.date_bounds().is_none());
    }

    #[test]
    fn missing_column_is_fatal() {
        let csv = "order_id,product_id\no1,p1\n";
        assert!(matches!(
            Dataset::from_reader(csv.as_bytes()),
            Err(LoadError::Csv(_))
        ));
    }

    #[test]
    fn bad_timestamp_is_fatal() {
        let csv = format!("{HEADER}\no1,p1,toys,c1,not-a-date,,1,10.0\n");
        let err = Dataset::from_reader(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("not-a-date"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Dataset::load("/nonexistent/orders.csv").unwrap_err();
        assert!(matches!(err, LoadError::Open { .. }));
        assert!(err.to_string().contains("/nonexistent/orders.csv"));
    }
}
