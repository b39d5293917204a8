//! Explorer view state and its transitions.
//!
//! The state is a plain value that round-trips through the query string.
//! Every transition returns a new state, which keeps year stepping and
//! autoplay testable without a browser.

use serde::Serialize;

use crate::filters::{Currency, Magnitude};
use crate::models::{BudgetKind, DrillPath, SourceShape};
use crate::services::navigator::TOTAL_LABEL;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearStep {
    Prev,
    Next,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    pub year: i32,
    pub kind: BudgetKind,
    pub shape: SourceShape,
    pub path: DrillPath,
    pub show_all: bool,
    pub playing: bool,
    pub currency: Currency,
    pub magnitude: Magnitude,
}

/// One breadcrumb entry; `depth` 0 is the virtual root.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Crumb {
    pub label: String,
    pub depth: usize,
    pub current: bool,
}

impl ViewState {
    pub fn new(year: i32) -> Self {
        Self {
            year,
            kind: BudgetKind::default(),
            shape: SourceShape::default(),
            path: DrillPath::root(),
            show_all: false,
            playing: false,
            currency: Currency::default(),
            magnitude: Magnitude::default(),
        }
    }

    pub fn drill_down(&self, name: &str) -> Self {
        Self {
            path: self.path.child(name),
            show_all: false,
            ..self.clone()
        }
    }

    pub fn go_to_crumb(&self, depth: usize) -> Self {
        Self {
            path: self.path.ancestor(depth),
            show_all: false,
            ..self.clone()
        }
    }

    /// Switching between revenue and expenditure starts over at the root.
    pub fn with_kind(&self, kind: BudgetKind) -> Self {
        Self {
            kind,
            path: DrillPath::root(),
            show_all: false,
            ..self.clone()
        }
    }

    pub fn with_shape(&self, shape: SourceShape) -> Self {
        Self {
            shape,
            path: DrillPath::root(),
            show_all: false,
            ..self.clone()
        }
    }

    /// Changing year keeps the drill path; it may not exist in that year.
    pub fn with_year(&self, year: i32) -> Self {
        Self {
            year,
            ..self.clone()
        }
    }

    pub fn with_display(&self, currency: Currency, magnitude: Magnitude) -> Self {
        Self {
            currency,
            magnitude,
            ..self.clone()
        }
    }

    pub fn toggle_show_all(&self) -> Self {
        Self {
            show_all: !self.show_all,
            ..self.clone()
        }
    }

    pub fn toggle_play(&self) -> Self {
        Self {
            playing: !self.playing,
            ..self.clone()
        }
    }

    /// Move one year through `years` (ascending), stopping at either end.
    /// A year not in the list jumps to the closest end in that direction.
    pub fn step_year(&self, years: &[i32], step: YearStep) -> Self {
        let target = match (years.iter().position(|y| *y == self.year), step) {
            (Some(i), YearStep::Prev) => years.get(i.saturating_sub(1)),
            (Some(i), YearStep::Next) => years.get(i + 1).or_else(|| years.get(i)),
            (None, YearStep::Prev) => years.first(),
            (None, YearStep::Next) => years.last(),
        };
        match target {
            Some(&year) => self.with_year(year),
            None => self.clone(),
        }
    }

    /// Autoplay step: advance one year while playing, wrapping to the first.
    pub fn tick(&self, years: &[i32]) -> Self {
        if !self.playing || years.is_empty() {
            return self.clone();
        }
        let next = match years.iter().position(|y| *y == self.year) {
            Some(i) if i + 1 < years.len() => years[i + 1],
            _ => years[0],
        };
        self.with_year(next)
    }

    pub fn breadcrumbs(&self) -> Vec<Crumb> {
        let depth = self.path.depth();
        std::iter::once(TOTAL_LABEL)
            .chain(self.path.segments().iter().map(String::as_str))
            .enumerate()
            .map(|(i, label)| Crumb {
                label: label.to_string(),
                depth: i,
                current: i == depth,
            })
            .collect()
    }

    /// Query string that reproduces this state, `path` repeated per segment.
    pub fn to_query(&self) -> String {
        let mut pairs: Vec<(&str, String)> = vec![
            ("year", self.year.to_string()),
            ("type", self.kind.as_str().to_string()),
        ];
        if self.shape != SourceShape::default() {
            pairs.push(("shape", self.shape.as_str().to_string()));
        }
        for segment in self.path.segments() {
            pairs.push(("path", segment.clone()));
        }
        if self.show_all {
            pairs.push(("all", "1".to_string()));
        }
        if self.playing {
            pairs.push(("play", "1".to_string()));
        }
        if self.currency != Currency::default() {
            pairs.push(("currency", "USD".to_string()));
        }
        if self.magnitude != Magnitude::default() {
            pairs.push(("magnitude", magnitude_key(self.magnitude).to_string()));
        }

        pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Parse a query string. Absent keys take defaults and unknown keys are
    /// ignored; malformed values are errors.
    pub fn from_query(query: &str, default_year: i32) -> Result<Self, String> {
        let pairs: Vec<(String, String)> =
            serde_urlencoded::from_str(query).map_err(|e| e.to_string())?;
        Self::from_pairs(&pairs, default_year)
    }

    pub fn from_pairs(pairs: &[(String, String)], default_year: i32) -> Result<Self, String> {
        let mut state = Self::new(default_year);
        let mut path = Vec::new();

        for (key, value) in pairs {
            match key.as_str() {
                "year" => {
                    state.year = value
                        .trim()
                        .parse()
                        .map_err(|_| format!("Invalid year: {}", value))?
                }
                "type" => state.kind = value.parse()?,
                "shape" => state.shape = value.parse()?,
                "path" if !value.is_empty() => path.push(value.clone()),
                "all" => state.show_all = is_truthy(value),
                "play" => state.playing = is_truthy(value),
                "currency" => state.currency = value.parse()?,
                "magnitude" => state.magnitude = value.parse()?,
                _ => {}
            }
        }

        state.path = DrillPath::from(path);
        Ok(state)
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value, "1" | "true" | "on" | "yes")
}

fn magnitude_key(magnitude: Magnitude) -> &'static str {
    match magnitude {
        Magnitude::Raw => "raw",
        Magnitude::Thousand => "thousand",
        Magnitude::Million => "million",
        Magnitude::Yi => "yi",
        Magnitude::Billion => "billion",
    }
}
