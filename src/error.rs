use thiserror::Error;

/// Failure to turn raw delimited text into a dataset.
///
/// Only a missing or unreadable header is fatal; everything below the
/// header (empty periods, unparsable cells, ragged rows) is tolerated.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("dataset has no header row")]
    MissingHeader,

    #[error("header row is empty")]
    EmptyHeader,

    #[error("header row could not be read: {0}")]
    UnreadableHeader(#[source] csv::Error),
}

/// Invalid per-dataset configuration.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("decomposition rule declares no dimensions")]
    NoDimensions,

    #[error("decomposition delimiter is empty")]
    EmptyDelimiter,

    #[error("dimension '{0}' is declared more than once")]
    DuplicateDimension(String),

    #[error("prefix length must be at least 1")]
    ZeroPrefixLength,

    #[error("prefix list contains an empty prefix")]
    EmptyPrefix,

    #[error("suffix vocabulary is empty")]
    EmptyVocabulary,

    #[error("label order names unknown dimension '{0}'")]
    UnknownLabelDimension(String),

    #[error("display names given for unknown dimension '{0}'")]
    UnknownDisplayDimension(String),

    #[error("delimiter '{0}' is not a single ASCII character")]
    InvalidDelimiter(char),

    #[error("palette is empty")]
    EmptyPalette,

    #[error("palette entry '{0}' is not a hex colour")]
    InvalidColor(String),
}

/// Failure to build a queryable dataset from text and configuration.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("invalid dataset configuration: {0}")]
    Config(#[from] ConfigError),
}
