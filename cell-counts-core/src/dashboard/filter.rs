use std::collections::BTreeSet;

use itertools::Itertools;

use crate::model::{SampleRecord, SampleTable};

/// The sample type selected by default, and the only one that is charted.
pub const DEFAULT_SAMPLE_TYPE: &str = "PBMC";

/// The distinct values offered by each filter control, in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub conditions: Vec<String>,
    pub treatments: Vec<String>,
    pub sample_types: Vec<String>,
    pub timepoints: Vec<i32>,
}

impl FilterOptions {
    #[must_use]
    pub fn from_table(table: &SampleTable) -> Self {
        fn distinct<'a, T: Ord + Clone + 'a>(values: impl Iterator<Item = &'a T>) -> Vec<T> {
            values.sorted().dedup().cloned().collect()
        }

        let records = table.records();

        Self {
            conditions: distinct(records.iter().map(|r| &r.condition)),
            treatments: distinct(records.iter().map(|r| &r.treatment)),
            sample_types: distinct(records.iter().map(|r| &r.sample_type)),
            timepoints: distinct(records.iter().map(|r| &r.time_from_treatment_start)),
        }
    }
}

/// The values currently chosen in each filter control.
///
/// An empty `timepoints` set means "any timepoint", whereas an empty set for
/// any of the other three controls matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub conditions: BTreeSet<String>,
    pub treatments: BTreeSet<String>,
    pub sample_types: BTreeSet<String>,
    pub timepoints: BTreeSet<i32>,
}

impl Selection {
    #[must_use]
    pub fn defaults(options: &FilterOptions) -> Self {
        let FilterOptions {
            conditions,
            treatments,
            sample_types,
            ..
        } = options;

        let sample_types = if sample_types.iter().any(|s| s == DEFAULT_SAMPLE_TYPE) {
            BTreeSet::from([DEFAULT_SAMPLE_TYPE.to_string()])
        } else {
            sample_types.iter().cloned().collect()
        };

        Self {
            conditions: conditions.iter().cloned().collect(),
            treatments: treatments.iter().cloned().collect(),
            sample_types,
            timepoints: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn matches(&self, record: &SampleRecord) -> bool {
        self.conditions.contains(&record.condition)
            && self.treatments.contains(&record.treatment)
            && self.sample_types.contains(&record.sample_type)
            && (self.timepoints.is_empty()
                || self.timepoints.contains(&record.time_from_treatment_start))
    }

    pub fn apply<'a>(&'a self, table: &'a SampleTable) -> impl Iterator<Item = &'a SampleRecord> {
        table.records().iter().filter(|r| self.matches(r))
    }
}
