use thiserror::Error;

/// Why a single decoding attempt could not produce a table.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("invalid {0} byte sequence")]
    Encoding(&'static str),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("no header row")]
    MissingHeader,
    #[error("row {row} has {found} fields but the header has {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },
}

/// The uploaded content could not be read as a table under either the
/// primary or the fallback encoding. Nothing downstream runs after this.
#[derive(Debug, Error)]
#[error("could not read uploaded file: {primary} (as UTF-8); {fallback} (as Latin-1)")]
pub struct IngestError {
    pub primary: ReadError,
    pub fallback: ReadError,
}
