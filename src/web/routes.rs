//! HTTP routes with response caching

use axum::{
    extract::{Query, State},
    response::Html,
    Json,
};
use cached::proc_macro::cached;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{presenter, AppState};
use crate::dataset::aggregate::{self, CategorySales, DailyOrders, RfmEntry};
use crate::dataset::Dataset;

/// Serve the dashboard page
pub async fn index() -> Html<&'static str> {
    Html(include_str!("../../static/index.html"))
}

/// Serve robots.txt
pub async fn robots_txt() -> &'static str {
    include_str!("../../static/robots.txt")
}

/// Inclusive date range; either bound defaults to the dataset's edge
#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl RangeQuery {
    fn resolve(&self, dataset: &Dataset) -> (NaiveDate, NaiveDate) {
        let (min, max) = dataset.date_bounds().unwrap_or_default();
        (self.start.unwrap_or(min), self.end.unwrap_or(max))
    }
}

/// The three summary tables for one date range
#[derive(Debug, Clone)]
struct RangeTables {
    daily: Vec<DailyOrders>,
    categories: Vec<CategorySales>,
    rfm: Vec<RfmEntry>,
}

/// Cached per range - the dataset never changes, so entries never go stale.
/// The dataset argument is deliberately not part of the key.
#[cached(size = 256, key = "String", convert = r#"{ format!("{start}|{end}") }"#)]
async fn get_range_tables(start: NaiveDate, end: NaiveDate, dataset: Arc<Dataset>) -> RangeTables {
    let rows = dataset.slice(start, end);
    RangeTables {
        daily: aggregate::daily_orders(rows),
        categories: aggregate::category_sales(rows),
        rfm: aggregate::rfm(rows),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetaResponse {
    pub rows: usize,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub currency: String,
    pub locale: String,
}

/// API: Dataset bounds the page uses to constrain its date inputs
pub async fn api_meta(State(state): State<Arc<AppState>>) -> Json<MetaResponse> {
    let bounds = state.dataset.date_bounds();
    Json(MetaResponse {
        rows: state.dataset.len(),
        start: bounds.map(|(min, _)| min),
        end: bounds.map(|(_, max)| max),
        currency: state.display.currency.clone(),
        locale: state.display.locale.clone(),
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardResponse {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub metrics: presenter::Metrics,
    pub charts: presenter::Charts,
}

/// API: Everything the dashboard page renders, in one response
pub async fn api_dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> Json<DashboardResponse> {
    let (start, end) = query.resolve(&state.dataset);
    let tables = get_range_tables(start, end, state.dataset.clone()).await;

    Json(DashboardResponse {
        start,
        end,
        metrics: presenter::metrics(&tables.daily, &tables.rfm, &state.display),
        charts: presenter::charts(&tables.daily, &tables.categories, &tables.rfm),
    })
}

/// API: Daily orders table
pub async fn api_daily_orders(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> Json<Vec<DailyOrders>> {
    let (start, end) = query.resolve(&state.dataset);
    Json(get_range_tables(start, end, state.dataset.clone()).await.daily)
}

/// API: Category sales table, descending by frequency
pub async fn api_category_sales(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> Json<Vec<CategorySales>> {
    let (start, end) = query.resolve(&state.dataset);
    Json(
        get_range_tables(start, end, state.dataset.clone())
            .await
            .categories,
    )
}

/// API: Per-product RFM table
pub async fn api_rfm(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> Json<Vec<RfmEntry>> {
    let (start, end) = query.resolve(&state.dataset);
    Json(get_range_tables(start, end, state.dataset.clone()).await.rfm)
}

/// Warm the cache for the default full-range view (called on startup)
pub async fn warm_cache(dataset: Arc<Dataset>) {
    let Some((start, end)) = dataset.date_bounds() else {
        tracing::info!("Empty dataset, nothing to warm");
        return;
    };

    tracing::info!("Warming cache for {} - {} default range...", start, end);
    let _ = get_range_tables(start, end, dataset).await;
    tracing::info!("Cache warmed successfully");
}
