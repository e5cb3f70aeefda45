use crate::view::ElementId;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by tree and engine operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UiError {
    #[error("element {0:?} does not exist")]
    UnknownElement(ElementId),
    #[error("element {id:?} is not a {expected}")]
    WrongControl { id: ElementId, expected: &'static str },
    #[error("element {0:?} already has a parent")]
    AlreadyParented(ElementId),
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    Cycle { parent: ElementId, child: ElementId },
    #[error("window {0:?} is already registered")]
    DuplicateWindow(ElementId),
    #[error("window {0:?} is nested inside another element")]
    NestedWindow(ElementId),
    #[error("tab index {index} is out of range ({len} tabs)")]
    TabOutOfRange { index: usize, len: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("color `{0}` must start with '#'")]
    MissingHash(String),
    #[error("color `{0}` must have 3, 4, 6 or 8 hex digits")]
    BadLength(String),
    #[error("color `{0}` contains a non-hex digit")]
    BadDigit(String),
}
