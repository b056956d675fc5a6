use std::borrow::Cow;

use garde::Validate;
use strum::{Display, EnumString, IntoStaticStr, VariantArray};

#[cfg(feature = "backend")]
use {
    cell_counts_schema::cell_counts,
    diesel::{Insertable, Queryable, Selectable, sqlite::Sqlite},
};

mod demo;

pub use demo::demo_records;

/// The columns of a cell-count CSV file, named exactly as they appear in its
/// header and in the `cell_counts` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, VariantArray)]
#[strum(serialize_all = "snake_case")]
pub enum Column {
    Project,
    Subject,
    Condition,
    Age,
    Sex,
    Treatment,
    Response,
    Sample,
    SampleType,
    TimeFromTreatmentStart,
    BCell,
    #[strum(serialize = "cd8_t_cell")]
    Cd8TCell,
    #[strum(serialize = "cd4_t_cell")]
    Cd4TCell,
    NkCell,
    Monocyte,
}

impl Column {
    /// The identifying and categorical columns shown in the sample overview.
    pub const PREVIEW: [Self; 8] = [
        Self::Project,
        Self::Subject,
        Self::Sample,
        Self::Condition,
        Self::Treatment,
        Self::Response,
        Self::SampleType,
        Self::TimeFromTreatmentStart,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// One stored observation. `id` is assigned by the store.
#[cfg_attr(
    feature = "backend",
    derive(Queryable, Selectable),
    diesel(table_name = cell_counts, check_for_backend(Sqlite))
)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleRecord {
    pub id: i32,
    pub project: String,
    pub subject: String,
    pub condition: String,
    pub age: i32,
    pub sex: String,
    pub treatment: String,
    pub response: Option<String>,
    pub sample: String,
    pub sample_type: String,
    pub time_from_treatment_start: i32,
    pub b_cell: i64,
    pub cd8_t_cell: i64,
    pub cd4_t_cell: i64,
    pub nk_cell: i64,
    pub monocyte: i64,
}

impl SampleRecord {
    /// The text shown for `column` in a tabular view. A missing response is
    /// rendered as an empty cell.
    #[must_use]
    pub fn display_value(&self, column: Column) -> Cow<'_, str> {
        use Column::*;

        match column {
            Project => Cow::Borrowed(&self.project),
            Subject => Cow::Borrowed(&self.subject),
            Condition => Cow::Borrowed(&self.condition),
            Age => Cow::Owned(self.age.to_string()),
            Sex => Cow::Borrowed(&self.sex),
            Treatment => Cow::Borrowed(&self.treatment),
            Response => Cow::Borrowed(self.response.as_deref().unwrap_or_default()),
            Sample => Cow::Borrowed(&self.sample),
            SampleType => Cow::Borrowed(&self.sample_type),
            TimeFromTreatmentStart => Cow::Owned(self.time_from_treatment_start.to_string()),
            BCell => Cow::Owned(self.b_cell.to_string()),
            Cd8TCell => Cow::Owned(self.cd8_t_cell.to_string()),
            Cd4TCell => Cow::Owned(self.cd4_t_cell.to_string()),
            NkCell => Cow::Owned(self.nk_cell.to_string()),
            Monocyte => Cow::Owned(self.monocyte.to_string()),
        }
    }
}

/// A row as it is inserted: everything but the surrogate key.
// `treat_none_as_default_value = false` binds a missing response as NULL
// rather than DEFAULT, which lets SQLite take a whole chunk in one statement.
#[cfg_attr(
    feature = "backend",
    derive(Insertable),
    diesel(table_name = cell_counts, treat_none_as_default_value = false)
)]
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
#[garde(allow_unvalidated)]
pub struct NewSampleRecord {
    pub project: String,
    pub subject: String,
    pub condition: String,
    pub age: i32,
    pub sex: String,
    pub treatment: String,
    pub response: Option<String>,
    pub sample: String,
    pub sample_type: String,
    pub time_from_treatment_start: i32,
    #[garde(range(min = 0))]
    pub b_cell: i64,
    #[garde(range(min = 0))]
    pub cd8_t_cell: i64,
    #[garde(range(min = 0))]
    pub cd4_t_cell: i64,
    #[garde(range(min = 0))]
    pub nk_cell: i64,
    #[garde(range(min = 0))]
    pub monocyte: i64,
}

impl From<SampleRecord> for NewSampleRecord {
    fn from(record: SampleRecord) -> Self {
        let SampleRecord {
            project,
            subject,
            condition,
            age,
            sex,
            treatment,
            response,
            sample,
            sample_type,
            time_from_treatment_start,
            b_cell,
            cd8_t_cell,
            cd4_t_cell,
            nk_cell,
            monocyte,
            ..
        } = record;

        Self {
            project,
            subject,
            condition,
            age,
            sex,
            treatment,
            response,
            sample,
            sample_type,
            time_from_treatment_start,
            b_cell,
            cd8_t_cell,
            cd4_t_cell,
            nk_cell,
            monocyte,
        }
    }
}

/// Every row of the `cell_counts` table, in id order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleTable(Vec<SampleRecord>);

impl SampleTable {
    #[must_use]
    pub fn records(&self) -> &[SampleRecord] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<SampleRecord>> for SampleTable {
    fn from(records: Vec<SampleRecord>) -> Self {
        Self(records)
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use garde::Validate;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::{Column, demo_records};

    #[rstest]
    #[case(Column::SampleType, "sample_type")]
    #[case(Column::TimeFromTreatmentStart, "time_from_treatment_start")]
    #[case(Column::Cd8TCell, "cd8_t_cell")]
    #[case(Column::BCell, "b_cell")]
    #[case(Column::NkCell, "nk_cell")]
    fn column_names_match_csv_header(#[case] column: Column, #[case] name: &str) {
        assert_eq!(column.name(), name);
        assert_eq!(Column::from_str(name).unwrap(), column);
    }

    #[rstest]
    fn negative_count_is_invalid() {
        let mut record = demo_records().remove(0);
        record.validate().unwrap();

        record.nk_cell = -1;
        let report = record.validate().unwrap_err();
        let (path, _) = report.iter().next().unwrap();

        assert_eq!(path.to_string(), "nk_cell");
    }
}
