use super::NewSampleRecord;

// (project, subject, sample, condition, treatment, response, sample_type, timepoint, b_cell)
type DemoRow = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    i32,
    i64,
);

const DEMO_ROWS: [DemoRow; 4] = [
    ("P1", "S1", "SM1", "healthy", "A", "responder", "PBMC", 0, 100),
    ("P1", "S1", "SM2", "healthy", "A", "non-responder", "PBMC", 7, 80),
    ("P1", "S2", "SM3", "disease", "B", "responder", "PBMC", 14, 150),
    ("P2", "S3", "SM4", "disease", "B", "non-responder", "tissue", 7, 60),
];

/// A four-sample dataset spanning two projects, two conditions and two
/// responses, used to bootstrap an empty dashboard.
///
/// Columns the dashboard never looks at are filled with fixed values so the
/// rows satisfy the full table schema.
#[must_use]
pub fn demo_records() -> Vec<NewSampleRecord> {
    DEMO_ROWS
        .iter()
        .enumerate()
        .map(
            |(
                i,
                &(
                    project,
                    subject,
                    sample,
                    condition,
                    treatment,
                    response,
                    sample_type,
                    time_from_treatment_start,
                    b_cell,
                ),
            )| {
                let offset = i64::try_from(i).unwrap_or_default() * 10;

                NewSampleRecord {
                    project: project.to_string(),
                    subject: subject.to_string(),
                    condition: condition.to_string(),
                    age: 40 + i32::try_from(i).unwrap_or_default() * 5,
                    sex: if i % 2 == 0 { "F" } else { "M" }.to_string(),
                    treatment: treatment.to_string(),
                    response: Some(response.to_string()),
                    sample: sample.to_string(),
                    sample_type: sample_type.to_string(),
                    time_from_treatment_start,
                    b_cell,
                    cd8_t_cell: 200 + offset,
                    cd4_t_cell: 300 + offset,
                    nk_cell: 50 + offset,
                    monocyte: 120 + offset,
                }
            },
        )
        .collect()
}
