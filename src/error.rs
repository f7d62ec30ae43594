use std::path::PathBuf;

/// Errors surfaced by loading, composition, export and gallery building.
#[derive(thiserror::Error, Debug)]
pub enum IvError {
    #[error("sweep data is missing required field `{0}`")]
    MissingField(&'static str),
    #[error("column `{field}` has {found} values, expected {expected}")]
    ColumnLength {
        field: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("invalid value {value:?} in column `{field}` at row {row}")]
    InvalidValue {
        field: &'static str,
        row: usize,
        value: String,
    },
    #[error("invalid option `{name}`: {reason}")]
    InvalidOption { name: &'static str, reason: String },
    #[error("cannot triangulate {points} points: {reason}")]
    Triangulation { points: usize, reason: &'static str },
    #[error("unknown view `{0}` (expected gate, drain, 3d or all)")]
    UnknownView(String),
    #[error("unknown theme `{0}` (expected light or dark)")]
    UnknownTheme(String),
    #[error("unsupported file format: .{0}")]
    UnsupportedFormat(String),
    #[error("no data found in {0}")]
    NoData(PathBuf),
    #[error("workbook error: {0}")]
    Workbook(String),
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl IvError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IvError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, IvError>;
