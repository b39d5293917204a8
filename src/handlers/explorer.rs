use askama::Template;
use axum::extract::{RawQuery, State};
use axum::response::Html;
use tracing::debug;

use crate::error::{AppResult, RenderHtml};
use crate::filters::{format_percent, DisplayUnit};
use crate::models::{BudgetKind, YearlyBudget};
use crate::services::{charts, navigator, trend};
use crate::state::AppState;
use crate::view_state::{ViewState, YearStep};
use crate::VERSION;

use super::api::ApiQuery;

/// Seconds between autoplay steps.
pub const AUTOPLAY_SECONDS: u32 = 2;

pub struct Link {
    pub label: String,
    pub href: String,
    pub current: bool,
}

pub struct ChildRow {
    pub name: String,
    pub formatted: String,
    pub percent: String,
    pub href: Option<String>,
}

/// Resolved node; `found` is false when the path is absent in that year.
#[derive(Default)]
pub struct NodeSection {
    pub found: bool,
    pub total: String,
    pub children: Vec<ChildRow>,
    pub hidden_count: usize,
}

pub struct TrendRow {
    pub year: i32,
    pub formatted: String,
    pub found: bool,
}

#[derive(Template)]
#[template(path = "pages/explorer.html")]
pub struct ExplorerTemplate {
    pub title: String,
    pub version: &'static str,
    pub year: i32,
    pub unit_label: String,
    pub refresh: Option<String>,
    pub kind_links: Vec<Link>,
    pub crumbs: Vec<Link>,
    pub prev_href: Option<String>,
    pub next_href: Option<String>,
    pub play_href: String,
    pub playing: bool,
    pub node: NodeSection,
    pub show_all: bool,
    pub show_all_href: String,
    pub trend: Vec<TrendRow>,
}

fn href(view: &ViewState) -> String {
    format!("/?{}", view.to_query())
}

pub async fn index(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> AppResult<Html<String>> {
    let request = ApiQuery::parse(&state, query)?;
    let unit = request.display_unit(&state);
    let view = request.view;
    let yearly = state.yearly(view.kind, view.shape);
    let years: Vec<i32> = yearly.iter().map(|b| b.year).collect();

    debug!(
        year = view.year,
        kind = view.kind.as_str(),
        depth = view.path.depth(),
        playing = view.playing,
        "Rendering explorer"
    );

    let template = ExplorerTemplate {
        title: format!("{} {}", view.year, view.kind.display_name()),
        version: VERSION,
        year: view.year,
        unit_label: unit.label(),
        refresh: view
            .playing
            .then(|| format!("{};url={}", AUTOPLAY_SECONDS, href(&view.tick(&years)))),
        kind_links: BudgetKind::all()
            .iter()
            .map(|kind| Link {
                label: kind.display_name().to_string(),
                href: href(&view.with_kind(*kind)),
                current: *kind == view.kind,
            })
            .collect(),
        crumbs: view
            .breadcrumbs()
            .into_iter()
            .map(|crumb| Link {
                href: href(&view.go_to_crumb(crumb.depth)),
                label: crumb.label,
                current: crumb.current,
            })
            .collect(),
        prev_href: step_href(&view, &years, YearStep::Prev),
        next_href: step_href(&view, &years, YearStep::Next),
        play_href: href(&view.toggle_play()),
        playing: view.playing,
        show_all: view.show_all,
        show_all_href: href(&view.toggle_show_all()),
        node: node_section(&yearly, &view, &unit),
        trend: trend_rows(&yearly, &view, &unit),
    };

    template.render_html()
}

/// Link to the neighbouring year, or `None` at either end.
fn step_href(view: &ViewState, years: &[i32], step: YearStep) -> Option<String> {
    let stepped = view.step_year(years, step);
    (stepped.year != view.year).then(|| href(&stepped))
}

fn trend_rows(yearly: &[YearlyBudget], view: &ViewState, unit: &DisplayUnit) -> Vec<TrendRow> {
    trend::trend(yearly, &view.path)
        .into_iter()
        .map(|point| TrendRow {
            year: point.year,
            formatted: unit.format(point.value),
            found: point.found,
        })
        .collect()
}

/// The resolved node and its children for the selected year.
fn node_section(yearly: &[YearlyBudget], view: &ViewState, unit: &DisplayUnit) -> NodeSection {
    let node = yearly
        .iter()
        .find(|b| b.year == view.year)
        .and_then(|budget| navigator::resolve_year(budget, &view.path));
    let Some(node) = node else {
        return NodeSection::default();
    };

    let sorted = node.sorted_children();
    let limit = if view.show_all {
        usize::MAX
    } else {
        charts::RANKING_LIMIT
    };

    NodeSection {
        found: true,
        total: unit.format(node.value),
        hidden_count: sorted.len().saturating_sub(limit),
        children: sorted
            .iter()
            .take(limit)
            .map(|child| ChildRow {
                name: child.name.clone(),
                formatted: unit.format(child.value),
                percent: format_percent(child.value, node.value),
                href: (!child.children.is_empty()).then(|| href(&view.drill_down(&child.name))),
            })
            .collect(),
    }
}
