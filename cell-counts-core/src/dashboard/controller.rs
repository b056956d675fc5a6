use std::sync::Arc;

use super::{
    chart::BoxPlot,
    filter::{DEFAULT_SAMPLE_TYPE, FilterOptions, Selection},
};
use crate::model::{SampleRecord, SampleTable};

/// Maximum number of rows in the sample overview.
pub const PREVIEW_LIMIT: usize = 20;

/// What reading the store produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(Arc<SampleTable>),
    /// The store file does not exist.
    Absent,
    /// The store exists but has no `cell_counts` table.
    SchemaMissing,
    AccessError(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoDataReason {
    StoreAbsent,
    SchemaMissing,
    AccessError(String),
    EmptyTable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardState {
    NoData(NoDataReason),
    Ready {
        table: Arc<SampleTable>,
        options: FilterOptions,
        selection: Selection,
    },
}

impl DashboardState {
    /// Classifies a load result. A ready dashboard starts from the default
    /// selection.
    #[must_use]
    pub fn enter(outcome: LoadOutcome) -> Self {
        use NoDataReason::{AccessError, EmptyTable, SchemaMissing, StoreAbsent};

        match outcome {
            LoadOutcome::Absent => Self::NoData(StoreAbsent),
            LoadOutcome::SchemaMissing => Self::NoData(SchemaMissing),
            LoadOutcome::AccessError(message) => Self::NoData(AccessError(message)),
            LoadOutcome::Loaded(table) if table.is_empty() => Self::NoData(EmptyTable),
            LoadOutcome::Loaded(table) => {
                let options = FilterOptions::from_table(&table);
                let selection = Selection::defaults(&options);

                Self::Ready {
                    table,
                    options,
                    selection,
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The page was opened without any filter input.
    Entered,
    FiltersChanged(Selection),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Chart {
    BoxPlot(BoxPlot),
    NoPbmcData,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadyView {
    pub options: FilterOptions,
    pub selection: Selection,
    /// Rows in the table.
    pub total: usize,
    /// Rows passing the filters.
    pub matching: usize,
    /// The first `PREVIEW_LIMIT` matching rows.
    pub preview: Vec<SampleRecord>,
    pub chart: Chart,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderModel {
    /// Nothing to show, but a demo store can be created.
    Missing,
    Diagnostic(NoDataReason),
    Ready(ReadyView),
}

/// Applies `event` to `state`, producing the next state and everything needed
/// to draw the page. Has no side effects.
#[must_use]
pub fn compute_view(state: DashboardState, event: Event) -> (DashboardState, RenderModel) {
    let (table, options, selection) = match state {
        DashboardState::NoData(NoDataReason::StoreAbsent) => {
            return (
                DashboardState::NoData(NoDataReason::StoreAbsent),
                RenderModel::Missing,
            );
        }
        DashboardState::NoData(reason) => {
            let model = RenderModel::Diagnostic(reason.clone());
            return (DashboardState::NoData(reason), model);
        }
        DashboardState::Ready {
            table,
            options,
            selection,
        } => match event {
            Event::Entered => (table, options, selection),
            Event::FiltersChanged(selection) => (table, options, selection),
        },
    };

    let matching: Vec<&SampleRecord> = selection.apply(&table).collect();

    let pbmc = matching
        .iter()
        .copied()
        .filter(|r| r.sample_type == DEFAULT_SAMPLE_TYPE);
    let chart = BoxPlot::from_records(pbmc).map_or(Chart::NoPbmcData, Chart::BoxPlot);

    let view = ReadyView {
        options: options.clone(),
        selection: selection.clone(),
        total: table.len(),
        matching: matching.len(),
        preview: matching
            .iter()
            .take(PREVIEW_LIMIT)
            .map(|r| (*r).clone())
            .collect(),
        chart,
    };

    let state = DashboardState::Ready {
        table,
        options,
        selection,
    };

    (state, RenderModel::Ready(view))
}

#[cfg(test)]
mod test {
    use std::{collections::BTreeSet, sync::Arc};

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::{
        Chart, DashboardState, Event, LoadOutcome, NoDataReason, PREVIEW_LIMIT, RenderModel,
        compute_view,
    };
    use crate::model::{SampleRecord, SampleTable, demo_records};

    fn demo_table() -> Arc<SampleTable> {
        let records: Vec<SampleRecord> = demo_records()
            .into_iter()
            .zip(1..)
            .map(|(r, id)| SampleRecord {
                id,
                project: r.project,
                subject: r.subject,
                condition: r.condition,
                age: r.age,
                sex: r.sex,
                treatment: r.treatment,
                response: r.response,
                sample: r.sample,
                sample_type: r.sample_type,
                time_from_treatment_start: r.time_from_treatment_start,
                b_cell: r.b_cell,
                cd8_t_cell: r.cd8_t_cell,
                cd4_t_cell: r.cd4_t_cell,
                nk_cell: r.nk_cell,
                monocyte: r.monocyte,
            })
            .collect();

        Arc::new(records.into())
    }

    fn samples(model: &RenderModel) -> Vec<&str> {
        let RenderModel::Ready(view) = model else {
            panic!("expected a ready view, got {model:?}");
        };

        view.preview.iter().map(|r| r.sample.as_str()).collect()
    }

    #[rstest]
    #[case(LoadOutcome::Absent, RenderModel::Missing)]
    #[case(
        LoadOutcome::SchemaMissing,
        RenderModel::Diagnostic(NoDataReason::SchemaMissing)
    )]
    #[case(
        LoadOutcome::AccessError("file is not a database".to_string()),
        RenderModel::Diagnostic(NoDataReason::AccessError("file is not a database".to_string()))
    )]
    #[case(
        LoadOutcome::Loaded(Arc::default()),
        RenderModel::Diagnostic(NoDataReason::EmptyTable)
    )]
    fn no_data(#[case] outcome: LoadOutcome, #[case] expected: RenderModel) {
        let state = DashboardState::enter(outcome);
        let (state, model) = compute_view(state, Event::Entered);

        assert!(matches!(state, DashboardState::NoData(_)));
        assert_eq!(model, expected);
    }

    #[rstest]
    fn filter_changes_are_ignored_without_data() {
        let state = DashboardState::enter(LoadOutcome::Absent);
        let (_, model) = compute_view(state, Event::FiltersChanged(Default::default()));

        assert_eq!(model, RenderModel::Missing);
    }

    #[rstest]
    fn demo_defaults_show_pbmc_rows() {
        let state = DashboardState::enter(LoadOutcome::Loaded(demo_table()));
        let (state, model) = compute_view(state, Event::Entered);

        assert_eq!(samples(&model), ["SM1", "SM2", "SM3"]);

        let RenderModel::Ready(view) = model else {
            unreachable!()
        };
        assert_eq!((view.total, view.matching), (4, 3));

        let Chart::BoxPlot(plot) = view.chart else {
            panic!("expected a box plot");
        };
        assert_eq!(plot.timepoints, [0, 7, 14]);
        let charted: usize = plot
            .series
            .iter()
            .flat_map(|s| &s.boxes)
            .map(|b| b.count)
            .sum();
        assert_eq!(charted, 3);

        // the state keeps the selection it rendered with
        let DashboardState::Ready { selection, .. } = state else {
            panic!("expected a ready state");
        };
        assert_eq!(selection.sample_types, BTreeSet::from(["PBMC".to_string()]));
    }

    #[rstest]
    fn tissue_only_has_no_chart() {
        let state = DashboardState::enter(LoadOutcome::Loaded(demo_table()));
        let DashboardState::Ready { selection, .. } = &state else {
            panic!("expected a ready state");
        };

        let mut selection = selection.clone();
        selection.sample_types = BTreeSet::from(["tissue".to_string()]);

        let (_, model) = compute_view(state, Event::FiltersChanged(selection));

        assert_eq!(samples(&model), ["SM4"]);
        let RenderModel::Ready(view) = model else {
            unreachable!()
        };
        assert_eq!(view.chart, Chart::NoPbmcData);
    }

    #[rstest]
    fn preview_is_capped() {
        let template = demo_table().records()[0].clone();
        let records: Vec<SampleRecord> = (0..PREVIEW_LIMIT as i32 + 5)
            .map(|id| SampleRecord {
                id,
                sample: format!("s{id}"),
                ..template.clone()
            })
            .collect();

        let state = DashboardState::enter(LoadOutcome::Loaded(Arc::new(records.into())));
        let (_, model) = compute_view(state, Event::Entered);

        let RenderModel::Ready(view) = model else {
            panic!("expected a ready view");
        };
        assert_eq!(view.matching, PREVIEW_LIMIT + 5);
        assert_eq!(view.preview.len(), PREVIEW_LIMIT);
        assert_eq!(view.preview[0].sample, "s0");
    }
}
