#![allow(clippy::cast_precision_loss)]

use itertools::Itertools;

use crate::model::SampleRecord;

/// Series label for samples with no recorded response.
pub const UNKNOWN_RESPONSE: &str = "unknown";

/// Five-number summary of the B cell counts at one timepoint for one response.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub timepoint: i32,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

impl BoxStats {
    // `values` must be non-empty
    fn from_values(timepoint: i32, mut values: Vec<f64>) -> Self {
        values.sort_by(f64::total_cmp);

        let q1 = quantile(&values, 0.25);
        let median = quantile(&values, 0.5);
        let q3 = quantile(&values, 0.75);
        let iqr = q3 - q1;
        let (low_fence, high_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

        let mut inside = values
            .iter()
            .copied()
            .filter(|v| (low_fence..=high_fence).contains(v));
        let lower_whisker = inside.next().unwrap_or(q1);
        let upper_whisker = inside.last().unwrap_or(lower_whisker);
        let outliers = values
            .iter()
            .copied()
            .filter(|v| !(low_fence..=high_fence).contains(v))
            .collect();

        Self {
            timepoint,
            count: values.len(),
            min: values[0],
            q1,
            median,
            q3,
            max: values[values.len() - 1],
            lower_whisker,
            upper_whisker,
            outliers,
        }
    }
}

// Linear interpolation between closest ranks.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let (lo, hi) = (position.floor(), position.ceil());

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let (lo_value, hi_value) = (sorted[lo as usize], sorted[hi as usize]);

    lo_value + (hi_value - lo_value) * (position - lo)
}

/// The boxes of one response category, ordered by timepoint.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSeries {
    /// `None` groups the samples with no recorded response.
    pub response: Option<String>,
    pub boxes: Vec<BoxStats>,
}

impl BoxSeries {
    #[must_use]
    pub fn label(&self) -> &str {
        self.response.as_deref().unwrap_or(UNKNOWN_RESPONSE)
    }
}

/// B cell count distributions grouped by timepoint and split by response.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxPlot {
    /// Every timepoint that has at least one box, ascending.
    pub timepoints: Vec<i32>,
    /// One series per response, sorted by response with the missing one
    /// first.
    pub series: Vec<BoxSeries>,
}

impl BoxPlot {
    /// Returns `None` when there are no records to plot.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a SampleRecord>) -> Option<Self> {
        let groups = records
            .into_iter()
            .map(|r| {
                (
                    (r.response.as_deref(), r.time_from_treatment_start),
                    r.b_cell as f64,
                )
            })
            .into_group_map();

        if groups.is_empty() {
            return None;
        }

        let timepoints = groups.keys().map(|(_, t)| *t).sorted().dedup().collect();

        let series = groups
            .into_iter()
            .sorted_by(|(a, _), (b, _)| a.cmp(b))
            .chunk_by(|((response, _), _)| *response)
            .into_iter()
            .map(|(response, group)| BoxSeries {
                response: response.map(str::to_string),
                boxes: group
                    .map(|((_, timepoint), values)| BoxStats::from_values(timepoint, values))
                    .collect(),
            })
            .collect();

        Some(Self { timepoints, series })
    }

    /// The smallest and largest plotted value, outliers included.
    #[must_use]
    pub fn value_range(&self) -> (f64, f64) {
        self.series
            .iter()
            .flat_map(|s| &s.boxes)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), b| {
                (lo.min(b.min), hi.max(b.max))
            })
    }
}
