use tracing::debug;

use crate::fmt::round2;
use crate::models::{ForecastRow, MonthlySummary, Report};

/// Fewest monthly points a category needs before a trend is fitted.
pub const MIN_MONTHS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub intercept: f64,
    pub slope: f64,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Ordinary least squares over `(x, y)` points. `None` with fewer than two
/// points or when every x is the same.
pub fn fit_line(points: &[(f64, f64)]) -> Option<LinearFit> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let sum_x: f64 = points.iter().map(|(x, _)| x).sum();
    let sum_y: f64 = points.iter().map(|(_, y)| y).sum();
    let mean_x = sum_x / n;
    let mean_y = sum_y / n;

    let sxx: f64 = points.iter().map(|(x, _)| (x - mean_x).powi(2)).sum();
    if sxx == 0.0 {
        return None;
    }
    let sxy: f64 = points.iter().map(|(x, y)| (x - mean_x) * (y - mean_y)).sum();

    let slope = sxy / sxx;
    Some(LinearFit {
        intercept: mean_y - slope * mean_x,
        slope,
    })
}

/// Predict next month's spend for every category with at least two months of
/// history. Months are numbered 1..n in order, so a gap in the history does
/// not widen the spacing between points.
///
/// Expects a summary of debit transactions only.
pub fn forecast(summary: &[MonthlySummary]) -> Report<ForecastRow> {
    let mut categories: Vec<&str> = Vec::new();
    for row in summary {
        if !categories.contains(&row.category.as_str()) {
            categories.push(row.category.as_str());
        }
    }

    let mut rows = Vec::new();
    for category in categories {
        let mut history: Vec<&MonthlySummary> = summary.iter().filter(|s| s.category == category).collect();
        if history.len() < MIN_MONTHS {
            debug!(category, months = history.len(), "Skipping forecast, not enough history");
            continue;
        }
        history.sort_by_key(|s| s.month);

        let points: Vec<(f64, f64)> = history
            .iter()
            .enumerate()
            .map(|(i, s)| ((i + 1) as f64, s.total_amount))
            .collect();
        let Some(fit) = fit_line(&points) else {
            continue;
        };
        let next_index = (points.len() + 1) as f64;
        rows.push(ForecastRow {
            category: category.to_string(),
            predicted_amount: round2(fit.predict(next_index)),
        });
    }

    if rows.is_empty() {
        return Report::InsufficientData;
    }
    debug!(categories = rows.len(), "Computed spending forecast");
    Report::Rows(rows)
}
