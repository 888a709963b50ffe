//! Summary tables derived from a filtered slice of order rows
//!
//! All three transforms are stateless: they take whatever slice the caller
//! filtered and fold it into a table. Empty input gives an empty table.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use super::OrderRecord;

/// Per-day order activity
#[derive(Debug, Clone, Serialize)]
pub struct DailyOrders {
    pub day: NaiveDate,
    /// Distinct products purchased that day
    pub order_count: u64,
    pub revenue: f64,
}

/// Units sold per product category
#[derive(Debug, Clone, Serialize)]
pub struct CategorySales {
    pub category: String,
    pub total_frequency: u64,
}

/// Recency / frequency / monetary row for one product
#[derive(Debug, Clone, Serialize)]
pub struct RfmEntry {
    pub product_id: String,
    /// Whole days since the product's last purchase, relative to the newest
    /// purchase date in the same slice. Never negative.
    pub recency: i64,
    /// Distinct customers that bought the product
    pub frequency: u64,
    pub monetary: f64,
}

/// Group by calendar day: distinct product count and revenue sum per day,
/// ascending by day.
pub fn daily_orders(rows: &[OrderRecord]) -> Vec<DailyOrders> {
    let mut days: BTreeMap<NaiveDate, (HashSet<&str>, f64)> = BTreeMap::new();
    for row in rows {
        let entry = days.entry(row.purchase_date()).or_default();
        entry.0.insert(row.product_id.as_str());
        entry.1 += row.total_revenue;
    }

    days.into_iter()
        .map(|(day, (products, revenue))| DailyOrders {
            day,
            order_count: products.len() as u64,
            revenue,
        })
        .collect()
}

/// Group by category, summing unit frequency, descending by total.
/// Ties fall back to category name so the order is total.
pub fn category_sales(rows: &[OrderRecord]) -> Vec<CategorySales> {
    let mut categories: BTreeMap<&str, u64> = BTreeMap::new();
    for row in rows {
        *categories
            .entry(row.product_category_name.as_str())
            .or_default() += row.total_frequency;
    }

    let mut table: Vec<CategorySales> = categories
        .into_iter()
        .map(|(category, total_frequency)| CategorySales {
            category: category.to_string(),
            total_frequency,
        })
        .collect();

    table.sort_by(|a, b| {
        b.total_frequency
            .cmp(&a.total_frequency)
            .then_with(|| a.category.cmp(&b.category))
    });

    table
}

struct ProductAcc<'a> {
    last_purchase: NaiveDate,
    customers: HashSet<&'a str>,
    revenue: f64,
}

/// Group by product: recency against the slice's newest purchase date,
/// distinct customer count, revenue sum. Ascending by product id.
pub fn rfm(rows: &[OrderRecord]) -> Vec<RfmEntry> {
    let Some(latest) = rows.iter().map(|r| r.purchase_date()).max() else {
        return Vec::new();
    };

    let mut products: BTreeMap<&str, ProductAcc<'_>> = BTreeMap::new();
    for row in rows {
        let entry = products
            .entry(row.product_id.as_str())
            .or_insert_with(|| ProductAcc {
                last_purchase: row.purchase_date(),
                customers: HashSet::new(),
                revenue: 0.0,
            });
        entry.last_purchase = entry.last_purchase.max(row.purchase_date());
        entry.customers.insert(row.customer_id.as_str());
        entry.revenue += row.total_revenue;
    }

    products
        .into_iter()
        .map(|(product_id, acc)| RfmEntry {
            product_id: product_id.to_string(),
            recency: (latest - acc.last_purchase).num_days(),
            frequency: acc.customers.len() as u64,
            monetary: acc.revenue,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn rec(
        order: &str,
        product: &str,
        category: &str,
        customer: &str,
        purchased: &str,
        frequency: u64,
        revenue: f64,
    ) -> OrderRecord {
        OrderRecord {
            order_id: order.to_string(),
            product_id: product.to_string(),
            product_category_name: category.to_string(),
            customer_id: customer.to_string(),
            order_purchase_timestamp: NaiveDateTime::parse_from_str(
                purchased,
                "%Y-%m-%d %H:%M:%S",
            )
            .unwrap(),
            order_delivered_customer_date: None,
            total_frequency: frequency,
            total_revenue: revenue,
        }
    }

    fn fixture() -> Vec<OrderRecord> {
        vec![
            rec("o1", "p1", "toys", "c1", "2018-01-01 08:00:00", 2, 10.0),
            rec("o2", "p1", "toys", "c2", "2018-01-03 12:00:00", 1, 20.0),
            rec("o3", "p2", "beauty", "c1", "2018-01-03 15:00:00", 4, 40.0),
            rec("o4", "p3", "garden", "c3", "2018-01-05 09:00:00", 4, 15.0),
        ]
    }

    #[test]
    fn daily_revenue_matches_slice_total() {
        let rows = fixture();
        let daily = daily_orders(&rows);
        let table_total: f64 = daily.iter().map(|d| d.revenue).sum();
        let raw_total: f64 = rows.iter().map(|r| r.total_revenue).sum();
        assert!((table_total - raw_total).abs() < 1e-9);
    }

    #[test]
    fn daily_counts_distinct_products() {
        let rows = vec![
            rec("o1", "p1", "toys", "c1", "2018-01-01 08:00:00", 1, 10.0),
            rec("o2", "p1", "toys", "c2", "2018-01-01 12:00:00", 1, 20.0),
            rec("o3", "p2", "toys", "c3", "2018-01-01 18:00:00", 1, 5.0),
        ];
        let daily = daily_orders(&rows);
        assert_eq!(daily.len(), 1);
        // p1 twice and p2 once is two distinct products
        assert_eq!(daily[0].order_count, 2);
        assert!((daily[0].revenue - 35.0).abs() < 1e-9);
    }

    #[test]
    fn daily_table_ascending_by_day() {
        let daily = daily_orders(&fixture());
        let days: Vec<NaiveDate> = daily.iter().map(|d| d.day).collect();
        let mut sorted = days.clone();
        sorted.sort();
        assert_eq!(days, sorted);
        assert_eq!(daily.len(), 3);
    }

    #[test]
    fn categories_strictly_descending_with_name_tiebreak() {
        let table = category_sales(&fixture());
        // beauty 4, garden 4, toys 3; tie resolved alphabetically
        let got: Vec<(&str, u64)> = table
            .iter()
            .map(|c| (c.category.as_str(), c.total_frequency))
            .collect();
        assert_eq!(got, [("beauty", 4), ("garden", 4), ("toys", 3)]);
        for pair in table.windows(2) {
            assert!(pair[0].total_frequency >= pair[1].total_frequency);
        }
    }

    #[test]
    fn rfm_monetary_sums_per_product() {
        let table = rfm(&fixture());
        let p1 = table.iter().find(|e| e.product_id == "p1").unwrap();
        assert!((p1.monetary - 30.0).abs() < 1e-9);
    }

    #[test]
    fn rfm_recency_relative_to_slice_maximum() {
        let table = rfm(&fixture());
        for entry in &table {
            assert!(entry.recency >= 0);
        }
        let p1 = table.iter().find(|e| e.product_id == "p1").unwrap();
        let p3 = table.iter().find(|e| e.product_id == "p3").unwrap();
        // last p1 purchase Jan 3, newest purchase in slice Jan 5
        assert_eq!(p1.recency, 2);
        assert_eq!(p3.recency, 0);
    }

    #[test]
    fn rfm_counts_distinct_customers() {
        let rows = vec![
            rec("o1", "p1", "toys", "c1", "2018-01-01 08:00:00", 1, 10.0),
            rec("o2", "p1", "toys", "c1", "2018-01-02 08:00:00", 1, 10.0),
            rec("o3", "p1", "toys", "c2", "2018-01-03 08:00:00", 1, 10.0),
        ];
        let table = rfm(&rows);
        assert_eq!(table[0].frequency, 2);
    }

    #[test]
    fn empty_input_empty_tables() {
        assert!(daily_orders(&[]).is_empty());
        assert!(category_sales(&[]).is_empty());
        assert!(rfm(&[]).is_empty());
    }
}
