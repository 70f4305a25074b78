use std::fmt;

/// The two kinds of identifiers a query can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    User,
    Item,
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdKind::User => write!(f, "user"),
            IdKind::Item => write!(f, "item"),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum CfError {
    #[error("Invalid rating matrix: {0}")]
    InvalidMatrix(String),

    #[error("Unknown {kind}: {id}")]
    NotFound { kind: IdKind, id: String },

    #[error("Unparsable rating '{value}' at line {line}, column {column}")]
    Parse {
        line: u64,
        column: usize,
        value: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CfError {
    pub(crate) fn unknown_user(id: &str) -> Self {
        CfError::NotFound {
            kind: IdKind::User,
            id: id.to_string(),
        }
    }

    pub(crate) fn unknown_item(id: &str) -> Self {
        CfError::NotFound {
            kind: IdKind::Item,
            id: id.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CfError>;
