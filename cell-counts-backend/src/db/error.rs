use camino::Utf8PathBuf;

#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    #[error("failed to open store at {path}: {message}")]
    Connection { path: Utf8PathBuf, message: String },
    #[error("{message}")]
    Database { message: String },
    #[error("{message}")]
    Other { message: String },
}

impl From<diesel::result::Error> for Error {
    fn from(err: diesel::result::Error) -> Self {
        Self::Database {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
