use std::{fmt::Display, str::FromStr};

use camino::{Utf8Path, Utf8PathBuf};
use cell_counts_core::model::{Column, NewSampleRecord};
use diesel::SqliteConnection;
use garde::Validate;
use serde::Deserialize;

use crate::db::{self, Store, Write};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("CSV file not found at {path}")]
    FileNotFound { path: Utf8PathBuf },
    #[error("row {row}, column {column}: invalid value {value:?} ({reason})")]
    Parse {
        row: usize,
        column: Column,
        value: String,
        reason: String,
    },
    #[error("malformed CSV file: {message}")]
    MalformedCsv { message: String },
    #[error(transparent)]
    Database(#[from] db::error::Error),
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Self::MalformedCsv {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// One data row exactly as it appears in the file. Integer columns are kept
/// as text so that a bad cell can be reported with its row and column.
#[derive(Deserialize, Debug)]
struct CsvRow {
    project: String,
    subject: String,
    condition: String,
    age: String,
    sex: String,
    treatment: String,
    #[serde(default)]
    response: Option<String>,
    sample: String,
    sample_type: String,
    time_from_treatment_start: String,
    b_cell: String,
    cd8_t_cell: String,
    cd4_t_cell: String,
    nk_cell: String,
    monocyte: String,
}

impl CsvRow {
    fn raw(&self, column: Column) -> &str {
        use Column::*;

        match column {
            Project => &self.project,
            Subject => &self.subject,
            Condition => &self.condition,
            Age => &self.age,
            Sex => &self.sex,
            Treatment => &self.treatment,
            Response => self.response.as_deref().unwrap_or_default(),
            Sample => &self.sample,
            SampleType => &self.sample_type,
            TimeFromTreatmentStart => &self.time_from_treatment_start,
            BCell => &self.b_cell,
            Cd8TCell => &self.cd8_t_cell,
            Cd4TCell => &self.cd4_t_cell,
            NkCell => &self.nk_cell,
            Monocyte => &self.monocyte,
        }
    }

    fn integer<T>(&self, row: usize, column: Column) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        let value = self.raw(column);

        value.trim().parse().map_err(|err: T::Err| Error::Parse {
            row,
            column,
            value: value.to_string(),
            reason: err.to_string(),
        })
    }

    /// `row` is the 1-based data row number, used only for error reporting.
    fn parse(&self, row: usize) -> Result<NewSampleRecord> {
        use Column::{Age, BCell, Cd4TCell, Cd8TCell, Monocyte, NkCell, TimeFromTreatmentStart};

        let record = NewSampleRecord {
            project: self.project.clone(),
            subject: self.subject.clone(),
            condition: self.condition.clone(),
            age: self.integer(row, Age)?,
            sex: self.sex.clone(),
            treatment: self.treatment.clone(),
            response: self.response.clone().filter(|r| !r.is_empty()),
            sample: self.sample.clone(),
            sample_type: self.sample_type.clone(),
            time_from_treatment_start: self.integer(row, TimeFromTreatmentStart)?,
            b_cell: self.integer(row, BCell)?,
            cd8_t_cell: self.integer(row, Cd8TCell)?,
            cd4_t_cell: self.integer(row, Cd4TCell)?,
            nk_cell: self.integer(row, NkCell)?,
            monocyte: self.integer(row, Monocyte)?,
        };

        if let Err(report) = record.validate() {
            let Some((path, err)) = report.iter().next() else {
                return Ok(record);
            };

            let column = Column::from_str(&path.to_string()).map_err(|_| Error::MalformedCsv {
                message: format!("row {row}: {report}"),
            })?;

            return Err(Error::Parse {
                row,
                column,
                value: self.raw(column).to_string(),
                reason: err.to_string(),
            });
        }

        Ok(record)
    }
}

/// Reads and coerces every data row of `path`, stopping at the first row that
/// cannot be parsed.
///
/// # Errors
pub fn parse_file(path: &Utf8Path) -> Result<Vec<NewSampleRecord>> {
    if !path.is_file() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut reader = csv::Reader::from_path(path)?;

    reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(i, row)| row?.parse(i + 1))
        .collect()
}

/// Parses `path` completely, then inserts every row in one transaction.
/// Nothing is inserted unless every row parses. Returns the number of rows
/// inserted.
///
/// # Errors
pub fn load_file(db_conn: &mut SqliteConnection, path: &Utf8Path) -> Result<usize> {
    let records = parse_file(path)?;
    tracing::debug!(path = %path, n_rows = records.len(), "parsed cell counts");

    let inserted = records.as_slice().write(db_conn)?;
    tracing::info!(n_rows = inserted, "inserted cell counts");

    Ok(inserted)
}

/// Replaces the `cell_counts` table in `store` with the contents of
/// `csv_path`.
///
/// The table is recreated before the file is read, so a failed load leaves
/// the store with an empty table.
///
/// # Errors
pub fn run(csv_path: &Utf8Path, store: &Store) -> Result<usize> {
    println!("Using CSV: {csv_path}");
    println!("Creating database at: {}", store.path());

    let mut db_conn = store.connect()?;
    db::initialize_schema(&mut db_conn)?;
    let inserted = load_file(&mut db_conn, csv_path)?;

    println!("Database initialization complete.");

    Ok(inserted)
}

#[cfg(test)]
mod test {
    use cell_counts_core::{
        dashboard::LoadOutcome,
        model::{Column, SampleTable},
    };
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::{Error, parse_file, run};
    use crate::test_util::{TempStore, temp_store};

    const VALID_ROWS: [&str; 3] = [
        "prj1,sbj000,melanoma,57,M,miraclib,no,s000,PBMC,0,36000,24000,41000,14000,5000",
        "prj1,sbj000,melanoma,57,M,miraclib,,s001,PBMC,7, 31000 ,23000,40000,13000,4000",
        "prj2,sbj001,healthy,34,F,none,,s002,WB,14,25000,20000,38000,15000,6000",
    ];

    fn table(temp_store: &TempStore) -> SampleTable {
        let LoadOutcome::Loaded(table) = temp_store.store.load_all() else {
            panic!("expected a loaded table");
        };

        (*table).clone()
    }

    #[rstest]
    fn loads_every_row(temp_store: TempStore) {
        let csv_path = temp_store.write_csv(&VALID_ROWS);

        assert_eq!(run(&csv_path, &temp_store.store).unwrap(), 3);

        let table = table(&temp_store);
        assert_eq!(table.len(), 3);

        let [first, second, third] = table.records() else {
            panic!("expected three rows");
        };
        assert_eq!(first.response.as_deref(), Some("no"));
        assert_eq!(first.age, 57);
        assert_eq!(second.response, None);
        assert_eq!(second.b_cell, 31000);
        assert_eq!(second.time_from_treatment_start, 7);
        assert_eq!(third.sample_type, "WB");
        assert_eq!(third.monocyte, 6000);
    }

    #[rstest]
    fn blank_response_is_kept_as_text(temp_store: TempStore) {
        let csv_path = temp_store.write_csv(&[
            "prj1,sbj000,melanoma,57,M,miraclib, ,s000,PBMC,0,1,1,1,1,1",
            "prj1,sbj001,melanoma,58,F,miraclib,,s001,PBMC,0,1,1,1,1,1",
        ]);

        let responses: Vec<Option<String>> = parse_file(&csv_path)
            .unwrap()
            .into_iter()
            .map(|r| r.response)
            .collect();

        assert_eq!(responses, [Some(" ".to_string()), None]);
    }

    #[rstest]
    fn reloading_replaces_the_table(temp_store: TempStore) {
        let csv_path = temp_store.write_csv(&VALID_ROWS);

        run(&csv_path, &temp_store.store).unwrap();
        let first = table(&temp_store);
        run(&csv_path, &temp_store.store).unwrap();
        let second = table(&temp_store);

        assert_eq!(first, second);
    }

    #[rstest]
    #[case(3, Column::Age, "fifty")]
    #[case(9, Column::TimeFromTreatmentStart, "7.5")]
    #[case(10, Column::BCell, "")]
    #[case(14, Column::Monocyte, "1e3")]
    fn non_integer_cell_fails(
        temp_store: TempStore,
        #[case] index: usize,
        #[case] column: Column,
        #[case] value: &str,
    ) {
        let mut cells: Vec<&str> = VALID_ROWS[1].split(',').collect();
        cells[index] = value;
        let bad_row = cells.join(",");

        let csv_path = temp_store.write_csv(&[VALID_ROWS[0], &bad_row, VALID_ROWS[2]]);

        let err = parse_file(&csv_path).unwrap_err();
        let Error::Parse {
            row,
            column: err_column,
            value: err_value,
            ..
        } = err
        else {
            panic!("expected a parse error");
        };

        assert_eq!((row, err_column, err_value.as_str()), (2, column, value));
    }

    #[rstest]
    fn negative_count_fails(temp_store: TempStore) {
        let csv_path = temp_store.write_csv(&[
            VALID_ROWS[0],
            "prj1,sbj002,melanoma,61,F,miraclib,yes,s003,PBMC,0,100,200,300,-4,500",
        ]);

        let err = parse_file(&csv_path).unwrap_err();
        assert!(
            matches!(
                &err,
                Error::Parse { row: 2, column: Column::NkCell, value, .. } if value == "-4"
            ),
            "{err:?}"
        );
    }

    #[rstest]
    fn first_bad_row_is_reported(temp_store: TempStore) {
        let csv_path = temp_store.write_csv(&[
            "prj1,sbj000,melanoma,x,M,miraclib,no,s000,PBMC,0,1,1,1,1,1",
            "prj1,sbj000,melanoma,57,M,miraclib,no,s001,PBMC,y,1,1,1,1,1",
        ]);

        assert!(matches!(
            parse_file(&csv_path),
            Err(Error::Parse {
                row: 1,
                column: Column::Age,
                ..
            })
        ));
    }

    #[rstest]
    fn failed_load_leaves_an_empty_table(temp_store: TempStore) {
        let csv_path = temp_store.write_csv(&VALID_ROWS);
        run(&csv_path, &temp_store.store).unwrap();

        let csv_path = temp_store.write_csv(&[VALID_ROWS[0], "prj1,sbj9,x,old,F,a,,s9,PBMC,0,1,1,1,1,1"]);
        assert!(matches!(
            run(&csv_path, &temp_store.store),
            Err(Error::Parse { .. })
        ));

        assert!(table(&temp_store).is_empty());
    }

    #[rstest]
    fn missing_file(temp_store: TempStore) {
        let csv_path = temp_store.path("nope.csv");

        assert!(matches!(
            run(&csv_path, &temp_store.store),
            Err(Error::FileNotFound { path }) if path == csv_path
        ));
    }

    #[rstest]
    fn missing_column_is_malformed(temp_store: TempStore) {
        let csv_path = temp_store.path("short.csv");
        std::fs::write(&csv_path, "project,subject\nprj1,sbj1\n").unwrap();

        assert!(matches!(
            parse_file(&csv_path),
            Err(Error::MalformedCsv { .. })
        ));
    }

    #[rstest]
    fn header_only_file_loads_nothing(temp_store: TempStore) {
        let csv_path = temp_store.write_csv(&[]);

        assert_eq!(run(&csv_path, &temp_store.store).unwrap(), 0);
        assert!(table(&temp_store).is_empty());
    }
}
