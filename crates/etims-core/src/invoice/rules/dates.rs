//! Date parsing for invoice dates.

use chrono::{Datelike, NaiveDate};

/// Built-in templates, tried in order: day-month-year, then ISO and other
/// year-first forms, then textual month names.
pub const DEFAULT_TEMPLATES: &[&str] = &[
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d/%m/%y",
    "%d-%m-%y",
    "%d.%m.%y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%d %b %Y",
    "%d %B %Y",
];

/// Years outside this window are treated as a failed parse. This keeps a
/// four-digit template from accepting a two-digit year as year 24 AD.
const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 2100;

/// Ordered list of date templates.
#[derive(Debug, Clone)]
pub struct DateTemplates {
    templates: Vec<String>,
}

impl DateTemplates {
    /// Built-in templates only.
    pub fn new() -> Self {
        Self {
            templates: DEFAULT_TEMPLATES.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Append deployment-specific templates after the built-in ones.
    pub fn with_extra<S: AsRef<str>>(mut self, extra: &[S]) -> Self {
        self.templates
            .extend(extra.iter().map(|t| t.as_ref().to_string()));
        self
    }

    pub fn templates(&self) -> &[String] {
        &self.templates
    }

    /// Parse a captured date; the first template that yields a plausible
    /// date wins.
    pub fn parse(&self, raw: &str) -> Option<NaiveDate> {
        let prepared = prepare(raw)?;

        self.templates.iter().find_map(|template| {
            NaiveDate::parse_from_str(&prepared, template)
                .ok()
                .filter(|d| (MIN_YEAR..=MAX_YEAR).contains(&d.year()))
        })
    }
}

impl Default for DateTemplates {
    fn default() -> Self {
        Self::new()
    }
}

/// Drop a trailing time component from numeric dates and punctuation from
/// textual ones ("17 Dec. 2025," -> "17 Dec 2025").
fn prepare(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if raw.chars().any(|c| c.is_alphabetic()) {
        let cleaned: String = raw.chars().filter(|c| *c != ',' && *c != '.').collect();
        Some(cleaned.split_whitespace().collect::<Vec<_>>().join(" "))
    } else {
        raw.split_whitespace().next().map(str::to_string)
    }
}
