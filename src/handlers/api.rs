use axum::extract::{Path, RawQuery, State};
use axum::response::Json;
use serde::Serialize;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::filters::{format_percent, DisplayUnit};
use crate::models::{Amount, BudgetKind, CategoryKey, DrillPath, FundMetric, Period};
use crate::services::charts::{self, Bar, DualSeries, LineSeries, Radar, Slice};
use crate::services::{aggregator, navigator, trend};
use crate::state::AppState;
use crate::view_state::{Crumb, ViewState};

/// Query pairs plus the view state they describe.
pub struct ApiQuery {
    pub pairs: Vec<(String, String)>,
    pub view: ViewState,
}

impl ApiQuery {
    pub fn parse(state: &AppState, query: Option<String>) -> AppResult<Self> {
        let raw = query.as_deref().unwrap_or("");
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(raw)
            .map_err(|e| AppError::Validation(format!("Invalid query string: {}", e)))?;
        let view =
            ViewState::from_pairs(&pairs, state.default_year()).map_err(AppError::Validation)?;
        Ok(Self { pairs, view })
    }

    /// Parse with the budget kind taken from the route instead of the query.
    fn for_kind(state: &AppState, kind: &str, query: Option<String>) -> AppResult<Self> {
        let kind: BudgetKind = kind.parse().map_err(AppError::Validation)?;
        let mut request = Self::parse(state, query)?;
        request.view.kind = kind;
        Ok(request)
    }

    fn param(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn parsed<T>(&self, name: &str) -> AppResult<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.param(name)
            .filter(|v| !v.is_empty())
            .map(|v| {
                v.parse()
                    .map_err(|e| AppError::Validation(format!("Invalid {}: {}", name, e)))
            })
            .transpose()
    }

    fn required<T>(&self, name: &str) -> AppResult<T>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.parsed(name)?
            .ok_or_else(|| AppError::Validation(format!("Missing {}", name)))
    }

    /// Every non-empty value of a repeated key, in order.
    fn all(&self, name: &str) -> Vec<String> {
        self.pairs
            .iter()
            .filter(|(k, v)| k == name && !v.trim().is_empty())
            .map(|(_, v)| v.trim().to_string())
            .collect()
    }

    pub fn display_unit(&self, state: &AppState) -> DisplayUnit {
        state
            .config
            .display_unit(self.view.currency, self.view.magnitude)
    }
}

#[derive(Debug, Serialize)]
pub struct YearsResponse {
    pub years: Vec<i32>,
    pub default_year: i32,
}

pub async fn years(State(state): State<AppState>) -> Json<YearsResponse> {
    Json(YearsResponse {
        years: state.dataset.years(),
        default_year: state.default_year(),
    })
}

#[derive(Debug, Serialize)]
pub struct NodeSummary {
    pub name: String,
    pub value: f64,
    pub formatted: String,
    pub has_children: bool,
}

#[derive(Debug, Serialize)]
pub struct ChildSummary {
    pub name: String,
    pub value: f64,
    pub formatted: String,
    pub percent: String,
    pub has_children: bool,
}

#[derive(Debug, Serialize)]
pub struct ViewResponse {
    pub year: i32,
    pub kind: BudgetKind,
    pub path: DrillPath,
    pub breadcrumbs: Vec<Crumb>,
    pub unit_label: String,
    pub found: bool,
    pub node: Option<NodeSummary>,
    pub children: Vec<ChildSummary>,
}

pub async fn budget_view(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    RawQuery(query): RawQuery,
) -> AppResult<Json<ViewResponse>> {
    let ApiQuery { view, .. } = ApiQuery::for_kind(&state, &kind, query)?;
    let unit = state.config.display_unit(view.currency, view.magnitude);
    let yearly = state.yearly(view.kind, view.shape);
    let budget = yearly
        .iter()
        .find(|b| b.year == view.year)
        .ok_or_else(|| {
            AppError::NotFound(format!("No {} budget for year {}", view.kind, view.year))
        })?;

    let resolved = navigator::resolve_year(budget, &view.path);
    debug!(
        year = view.year,
        kind = view.kind.as_str(),
        depth = view.path.depth(),
        found = resolved.is_some(),
        "Resolved budget view"
    );

    let (node, children) = match resolved {
        Some(node) => {
            let children = node
                .sorted_children()
                .into_iter()
                .map(|child| ChildSummary {
                    name: child.name.clone(),
                    value: unit.convert(child.value),
                    formatted: unit.format(child.value),
                    percent: format_percent(child.value, node.value),
                    has_children: !child.children.is_empty(),
                })
                .collect();
            let summary = NodeSummary {
                name: node.name.to_string(),
                value: unit.convert(node.value),
                formatted: unit.format(node.value),
                has_children: node.has_children(),
            };
            (Some(summary), children)
        }
        None => (None, Vec::new()),
    };

    Ok(Json(ViewResponse {
        year: view.year,
        kind: view.kind,
        breadcrumbs: view.breadcrumbs(),
        path: view.path,
        unit_label: unit.label(),
        found: node.is_some(),
        node,
        children,
    }))
}

pub async fn budget_trend(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    RawQuery(query): RawQuery,
) -> AppResult<Json<LineSeries>> {
    let request = ApiQuery::for_kind(&state, &kind, query)?;
    let unit = request.display_unit(&state);
    let view = &request.view;
    let points = trend::trend(&state.yearly(view.kind, view.shape), &view.path);
    Ok(Json(charts::line(&points, &unit)))
}

pub async fn budget_donut(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    RawQuery(query): RawQuery,
) -> AppResult<Json<Vec<Slice>>> {
    let request = ApiQuery::for_kind(&state, &kind, query)?;
    let unit = request.display_unit(&state);
    let view = &request.view;
    let yearly = state.yearly(view.kind, view.shape);

    let slices = yearly
        .iter()
        .find(|b| b.year == view.year)
        .and_then(|budget| navigator::resolve_year(budget, &view.path))
        .map(|node| charts::donut_from_nodes(&node.sorted_children(), &unit))
        .unwrap_or_default();
    Ok(Json(slices))
}

#[derive(Debug, Serialize)]
pub struct RankingResponse {
    pub bars: Vec<Bar>,
    pub available: usize,
    pub show_all: bool,
}

pub async fn budget_ranking(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    RawQuery(query): RawQuery,
) -> AppResult<Json<RankingResponse>> {
    let request = ApiQuery::for_kind(&state, &kind, query)?;
    let unit = request.display_unit(&state);
    let view = &request.view;
    let yearly = state.yearly(view.kind, view.shape);

    let children = yearly
        .iter()
        .find(|b| b.year == view.year)
        .and_then(|budget| navigator::resolve_year(budget, &view.path))
        .map(|node| node.sorted_children())
        .unwrap_or_default();

    Ok(Json(RankingResponse {
        bars: charts::ranking(&children, view.show_all, &unit),
        available: charts::rankable_count(&children),
        show_all: view.show_all,
    }))
}

#[derive(Debug, Serialize)]
pub struct BucketView {
    pub label: String,
    pub value: f64,
    pub formatted: String,
    pub percent: String,
}

#[derive(Debug, Serialize)]
pub struct BreakdownResponse {
    pub year: i32,
    pub kind: BudgetKind,
    pub key: &'static str,
    pub unit_label: String,
    pub total: String,
    pub buckets: Vec<BucketView>,
    pub slices: Vec<Slice>,
}

/// Category breakdown of the tabular rows for one year and type.
pub async fn breakdown(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> AppResult<Json<BreakdownResponse>> {
    let request = ApiQuery::parse(&state, query)?;
    let key: CategoryKey = request.parsed("key")?.unwrap_or_default();
    let top_n: usize = request.parsed("top_n")?.unwrap_or(state.config.top_n);
    let unit = request.display_unit(&state);
    let view = &request.view;

    let rows = aggregator::slice(&state.dataset.rows, view.year, view.kind);
    let buckets = aggregator::aggregate(rows, key, top_n);
    let total = Amount::total(buckets.iter().map(|b| b.value), state.dataset.source_unit);

    debug!(
        year = view.year,
        kind = view.kind.as_str(),
        key = key.as_str(),
        buckets = buckets.len(),
        "Built breakdown"
    );

    Ok(Json(BreakdownResponse {
        year: view.year,
        kind: view.kind,
        key: key.as_str(),
        unit_label: unit.label(),
        total: unit.format(total),
        slices: charts::donut_from_buckets(&buckets, &unit),
        buckets: buckets
            .iter()
            .map(|b| BucketView {
                label: b.label.clone(),
                value: unit.convert(b.value),
                formatted: unit.format(b.value),
                percent: format_percent(b.value, total),
            })
            .collect(),
    }))
}

pub async fn overview(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> AppResult<Json<DualSeries>> {
    let request = ApiQuery::parse(&state, query)?;
    let unit = request.display_unit(&state);
    Ok(Json(charts::overview(&state.dataset.rows, &unit)))
}

pub async fn funds(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> AppResult<Json<Vec<Bar>>> {
    let request = ApiQuery::parse(&state, query)?;
    let metric: FundMetric = request.parsed("metric")?.unwrap_or_default();
    let unit = request.display_unit(&state);
    debug!(
        year = request.view.year,
        metric = metric.as_str(),
        "Ranking funds"
    );
    Ok(Json(charts::fund_ranking(
        &state.dataset.funds,
        request.view.year,
        metric,
        &unit,
    )))
}

pub async fn funds_trend(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> AppResult<Json<DualSeries>> {
    let request = ApiQuery::parse(&state, query)?;
    let unit = request.display_unit(&state);
    Ok(Json(charts::fund_totals(&state.dataset.funds, &unit)))
}

/// Average-year comparison of two periods of the budget table, e.g.
/// `?a=105-108&b=109-112&category=社會福利`.
pub async fn compare(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> AppResult<Json<Radar>> {
    let request = ApiQuery::parse(&state, query)?;
    let periods: [Period; 2] = [request.required("a")?, request.required("b")?];
    let unit = request.display_unit(&state);
    let rows = &state.dataset.rows;

    let mut categories = request.all("category");
    if categories.is_empty() {
        categories = charts::top_categories(rows, &periods, charts::COMPARE_CATEGORY_LIMIT);
    }

    let averages: Vec<_> = periods
        .iter()
        .map(|period| {
            charts::period_average(rows, *period, &categories, state.dataset.source_unit)
        })
        .collect();

    debug!(
        a = %periods[0],
        b = %periods[1],
        categories = categories.len(),
        "Compared periods"
    );
    Ok(Json(charts::radar(&averages, &unit)))
}
