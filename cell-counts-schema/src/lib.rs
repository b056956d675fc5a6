// Kept in sync by hand with `cell_counts.sql`; the table is recreated on every
// load, so there are no migrations to generate this from.

diesel::table! {
    cell_counts (id) {
        id -> Integer,
        project -> Text,
        subject -> Text,
        condition -> Text,
        age -> Integer,
        sex -> Text,
        treatment -> Text,
        response -> Nullable<Text>,
        sample -> Text,
        sample_type -> Text,
        time_from_treatment_start -> Integer,
        b_cell -> BigInt,
        cd8_t_cell -> BigInt,
        cd4_t_cell -> BigInt,
        nk_cell -> BigInt,
        monocyte -> BigInt,
    }
}

pub const TABLE_NAME: &str = "cell_counts";

pub const DROP_TABLE: &str = "DROP TABLE IF EXISTS cell_counts";

pub const CREATE_TABLE: &str = include_str!("cell_counts.sql");
