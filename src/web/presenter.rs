//! Dashboard metrics and chart payload assembly
//!
//! Everything here is selection, ordering and formatting over tables the
//! aggregator already built. Charts are rendered client-side; this module
//! only shapes the JSON the page draws from.

use serde::Serialize;

use crate::config::DisplayConfig;
use crate::dataset::aggregate::{CategorySales, DailyOrders, RfmEntry};

/// Categories shown in the best/worst panels
const TOP_CATEGORIES: usize = 3;
/// Products shown in each RFM panel
const TOP_PRODUCTS: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct Metrics {
    pub total_orders: u64,
    pub total_revenue: f64,
    pub total_revenue_display: String,
    pub avg_recency: f64,
    pub avg_frequency: f64,
    pub avg_monetary: f64,
    pub avg_monetary_display: String,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartSpec {
    pub title: &'static str,
    pub kind: ChartKind,
    pub value_label: &'static str,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    /// Mirror the value axis (the worst-sellers panel reads right-to-left)
    pub inverted: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Charts {
    pub daily_orders: ChartSpec,
    pub best_categories: ChartSpec,
    pub worst_categories: ChartSpec,
    pub rfm_recency: ChartSpec,
    pub rfm_frequency: ChartSpec,
    pub rfm_monetary: ChartSpec,
}

pub fn metrics(daily: &[DailyOrders], rfm: &[RfmEntry], display: &DisplayConfig) -> Metrics {
    let total_orders: u64 = daily.iter().map(|d| d.order_count).sum();
    let total_revenue: f64 = daily.iter().map(|d| d.revenue).sum();

    let avg_recency = round_to(mean(rfm.iter().map(|e| e.recency as f64)), 1);
    let avg_frequency = round_to(mean(rfm.iter().map(|e| e.frequency as f64)), 2);
    let avg_monetary = mean(rfm.iter().map(|e| e.monetary));

    Metrics {
        total_orders,
        total_revenue,
        total_revenue_display: format_currency(total_revenue, display),
        avg_recency,
        avg_frequency,
        avg_monetary,
        avg_monetary_display: format_currency(avg_monetary, display),
    }
}

pub fn charts(daily: &[DailyOrders], categories: &[CategorySales], rfm: &[RfmEntry]) -> Charts {
    let daily_orders = ChartSpec {
        title: "Daily Orders",
        kind: ChartKind::Line,
        value_label: "Orders",
        labels: daily.iter().map(|d| d.day.to_string()).collect(),
        values: daily.iter().map(|d| d.order_count as f64).collect(),
        inverted: false,
    };

    // `categories` arrives descending by frequency
    let best_categories = category_bar("Best Performing Product", categories, false);

    let mut ascending = categories.to_vec();
    ascending.sort_by(|a, b| {
        a.total_frequency
            .cmp(&b.total_frequency)
            .then_with(|| a.category.cmp(&b.category))
    });
    let worst_categories = category_bar("Worst Performing Product", &ascending, true);

    let mut by_recency = rfm.to_vec();
    by_recency.sort_by(|a, b| a.recency.cmp(&b.recency));
    let rfm_recency = product_bar("By Recency (days)", &by_recency, |e| e.recency as f64);

    let mut by_frequency = rfm.to_vec();
    by_frequency.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    let rfm_frequency = product_bar("By Frequency", &by_frequency, |e| e.frequency as f64);

    let mut by_monetary = rfm.to_vec();
    by_monetary.sort_by(|a, b| b.monetary.total_cmp(&a.monetary));
    let rfm_monetary = product_bar("By Monetary", &by_monetary, |e| e.monetary);

    Charts {
        daily_orders,
        best_categories,
        worst_categories,
        rfm_recency,
        rfm_frequency,
        rfm_monetary,
    }
}

fn category_bar(title: &'static str, sorted: &[CategorySales], inverted: bool) -> ChartSpec {
    let shown = &sorted[..sorted.len().min(TOP_CATEGORIES)];
    ChartSpec {
        title,
        kind: ChartKind::Bar,
        value_label: "Number of Sales",
        labels: shown.iter().map(|c| c.category.clone()).collect(),
        values: shown.iter().map(|c| c.total_frequency as f64).collect(),
        inverted,
    }
}

fn product_bar(
    title: &'static str,
    sorted: &[RfmEntry],
    value: impl Fn(&RfmEntry) -> f64,
) -> ChartSpec {
    let shown = &sorted[..sorted.len().min(TOP_PRODUCTS)];
    ChartSpec {
        title,
        kind: ChartKind::Bar,
        value_label: "product_id",
        labels: shown.iter().map(|e| e.product_id.clone()).collect(),
        values: shown.iter().map(&value).collect(),
        inverted: false,
    }
}

/// Fixed-locale currency string, e.g. `US$1.234,50` for USD / es-CO
pub fn format_currency(amount: f64, display: &DisplayConfig) -> String {
    let (thousands, decimal) = display.separators();
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let units = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, digit) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push(thousands);
        }
        grouped.push(digit);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}{}{grouped}{decimal}{frac:02}", display.symbol())
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0u64), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
