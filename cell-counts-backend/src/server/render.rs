use std::{collections::BTreeSet, fmt::Display};

use askama::Template;
use camino::Utf8Path;
use cell_counts_core::{
    dashboard::{BoxPlot, Chart, NoDataReason, ReadyView, RenderModel},
    model::Column,
};
use cell_counts_schema::TABLE_NAME;
use heck::AsTitleCase;

mod box_plot;

/// A one-off message shown above the page content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Notice {
    /// The demo store was just created with this many rows.
    Created(usize),
    Failed(String),
}

struct Banner {
    kind: &'static str,
    text: String,
}

impl Banner {
    fn new(kind: &'static str, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

#[derive(Template)]
#[template(path = "missing.html")]
struct MissingPage<'a> {
    notice: Option<Banner>,
    resolved_path: String,
    store_path: &'a str,
}

#[derive(Template)]
#[template(path = "diagnostic.html")]
struct DiagnosticPage {
    notice: Option<Banner>,
    problem: String,
    hint: Option<&'static str>,
}

struct FilterOption {
    value: String,
    selected: bool,
}

struct FilterControl {
    label: &'static str,
    name: &'static str,
    size: usize,
    options: Vec<FilterOption>,
}

impl FilterControl {
    fn new<T: Display + Ord>(
        label: &'static str,
        name: &'static str,
        options: &[T],
        selected: &BTreeSet<T>,
    ) -> Self {
        Self {
            label,
            name,
            size: options.len().clamp(2, 8),
            options: options
                .iter()
                .map(|o| FilterOption {
                    value: o.to_string(),
                    selected: selected.contains(o),
                })
                .collect(),
        }
    }
}

struct LegendEntry {
    label: String,
    color: String,
}

struct BoxRow {
    response: String,
    timepoint: i32,
    count: usize,
    min: f64,
    q1: f64,
    median: f64,
    q3: f64,
    max: f64,
    outliers: String,
}

struct ChartView {
    svg: String,
    legend: Vec<LegendEntry>,
    boxes: Vec<BoxRow>,
}

impl ChartView {
    fn new(plot: &BoxPlot, svg: String) -> Self {
        let legend = plot
            .series
            .iter()
            .enumerate()
            .map(|(i, s)| LegendEntry {
                label: s.label().to_string(),
                color: box_plot::series_color(i),
            })
            .collect();

        let boxes = plot
            .series
            .iter()
            .flat_map(|s| s.boxes.iter().map(move |b| (s.label(), b)))
            .map(|(response, b)| BoxRow {
                response: response.to_string(),
                timepoint: b.timepoint,
                count: b.count,
                min: b.min,
                q1: b.q1,
                median: b.median,
                q3: b.q3,
                max: b.max,
                outliers: b
                    .outliers
                    .iter()
                    .map(f64::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
            .collect();

        Self { svg, legend, boxes }
    }
}

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardPage {
    notice: Option<Banner>,
    controls: Vec<FilterControl>,
    shown: usize,
    matching: usize,
    total: usize,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    chart: Option<ChartView>,
    placeholder: Option<Banner>,
}

pub(super) struct Page<'a> {
    model: &'a RenderModel,
    store_path: &'a Utf8Path,
    notice: Option<&'a Notice>,
}

impl<'a> Page<'a> {
    pub(super) fn new(model: &'a RenderModel, store_path: &'a Utf8Path) -> Self {
        Self {
            model,
            store_path,
            notice: None,
        }
    }

    pub(super) fn with_notice(mut self, notice: Option<&'a Notice>) -> Self {
        self.notice = notice;
        self
    }

    /// Renders the whole HTML document. A template failure is rendered as
    /// an error page rather than returned.
    pub(super) fn render(&self) -> String {
        let rendered = match self.model {
            RenderModel::Missing | RenderModel::Diagnostic(NoDataReason::StoreAbsent) => {
                self.missing().render()
            }
            RenderModel::Diagnostic(reason) => self.diagnostic(reason).render(),
            RenderModel::Ready(view) => self.dashboard(view).render(),
        };

        rendered.unwrap_or_else(|err| {
            tracing::error!(error = %err, "failed to render page");
            format!("<pre>Template error: {err}</pre>")
        })
    }

    fn resolved_path(&self) -> String {
        std::path::absolute(self.store_path)
            .map_or_else(|_| self.store_path.to_string(), |p| p.display().to_string())
    }

    fn notice(&self) -> Option<Banner> {
        self.notice.map(|notice| match notice {
            Notice::Created(n_rows) => Banner::new(
                "success",
                format!(
                    "Created sample database at {} with {n_rows} rows.",
                    self.resolved_path()
                ),
            ),
            Notice::Failed(message) => Banner::new(
                "error",
                format!("Could not create the sample database: {message}"),
            ),
        })
    }

    fn missing(&self) -> MissingPage<'a> {
        MissingPage {
            notice: self.notice(),
            resolved_path: self.resolved_path(),
            store_path: self.store_path.as_str(),
        }
    }

    fn diagnostic(&self, reason: &NoDataReason) -> DiagnosticPage {
        let path = self.resolved_path();

        let (problem, hint) = match reason {
            NoDataReason::StoreAbsent | NoDataReason::SchemaMissing => (
                format!(
                    "Database table '{TABLE_NAME}' not found in {path}. Ensure the SQLite file exists and contains a table named '{TABLE_NAME}'."
                ),
                Some(
                    "If you need a quick test dataset, create the database or provide a CSV and import it. Example SQL to check tables: SELECT name FROM sqlite_master WHERE type='table';",
                ),
            ),
            NoDataReason::AccessError(message) => {
                (format!("Could not read database {path}: {message}"), None)
            }
            NoDataReason::EmptyTable => (
                format!("Table '{TABLE_NAME}' in {path} has no rows."),
                Some("Import a CSV file with load-cell-counts, then reload this page."),
            ),
        };

        DiagnosticPage {
            notice: self.notice(),
            problem,
            hint,
        }
    }

    fn dashboard(&self, view: &ReadyView) -> DashboardPage {
        let ReadyView {
            options,
            selection,
            total,
            matching,
            preview,
            chart,
        } = view;

        let controls = vec![
            FilterControl::new(
                "Condition",
                "condition",
                &options.conditions,
                &selection.conditions,
            ),
            FilterControl::new(
                "Treatment",
                "treatment",
                &options.treatments,
                &selection.treatments,
            ),
            FilterControl::new(
                "Sample type",
                "sample_type",
                &options.sample_types,
                &selection.sample_types,
            ),
            FilterControl::new(
                "Time from treatment start",
                "timepoint",
                &options.timepoints,
                &selection.timepoints,
            ),
        ];

        let (chart, placeholder) = match chart {
            Chart::BoxPlot(plot) => match box_plot::render_svg(plot) {
                Ok(svg) => (Some(ChartView::new(plot, svg)), None),
                Err(err) => {
                    tracing::error!(error = %err, "failed to draw box plot");
                    (
                        None,
                        Some(Banner::new(
                            "error",
                            format!("Could not draw the chart: {err}"),
                        )),
                    )
                }
            },
            Chart::NoPbmcData => (
                None,
                Some(Banner::new(
                    "info",
                    "No PBMC data for the current filter selection.",
                )),
            ),
        };

        DashboardPage {
            notice: self.notice(),
            controls,
            shown: preview.len(),
            matching: *matching,
            total: *total,
            headers: Column::PREVIEW
                .iter()
                .map(|c| AsTitleCase(c.name()).to_string())
                .collect(),
            rows: preview
                .iter()
                .map(|r| {
                    Column::PREVIEW
                        .iter()
                        .map(|c| r.display_value(*c).into_owned())
                        .collect()
                })
                .collect(),
            chart,
            placeholder,
        }
    }
}
