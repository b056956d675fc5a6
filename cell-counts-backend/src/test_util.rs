use std::fs;

use camino::Utf8PathBuf;
use rstest::fixture;
use tempfile::TempDir;

use crate::db::Store;

pub const HEADER: &str = "project,subject,condition,age,sex,treatment,response,sample,sample_type,time_from_treatment_start,b_cell,cd8_t_cell,cd4_t_cell,nk_cell,monocyte";

/// A store path inside a directory that is removed on drop. The store file
/// itself is not created.
pub struct TempStore {
    pub dir: TempDir,
    pub store: Store,
}

impl TempStore {
    pub fn write_csv(&self, rows: &[&str]) -> Utf8PathBuf {
        let path = self.path("cell-count.csv");
        let mut contents = format!("{HEADER}\n");
        for row in rows {
            contents.push_str(row);
            contents.push('\n');
        }

        fs::write(&path, contents).unwrap();

        path
    }

    pub fn path(&self, name: &str) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(self.dir.path().join(name)).unwrap()
    }
}

#[fixture]
pub fn temp_store() -> TempStore {
    let dir = tempfile::tempdir().unwrap();
    let path = Utf8PathBuf::from_path_buf(dir.path().join("cell_counts.db")).unwrap();

    TempStore {
        dir,
        store: Store::new(path),
    }
}
