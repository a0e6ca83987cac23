use std::fmt;

/// Error type for dataset loading and address checks
#[derive(Debug)]
pub enum CheckError {
    /// Dataset fetch failed (connection error or non-success status)
    Network(String),
    /// Local dataset file could not be read
    Io(std::io::Error),
    /// Dataset content is malformed
    Parse(String),
    /// Address or CIDR string is malformed
    Format(String),
    /// Configuration error
    Config(String),
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckError::Network(msg) => write!(f, "Network error: {}", msg),
            CheckError::Io(err) => write!(f, "IO error: {}", err),
            CheckError::Parse(msg) => write!(f, "Parse error: {}", msg),
            CheckError::Format(msg) => write!(f, "Format error: {}", msg),
            CheckError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for CheckError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CheckError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CheckError {
    fn from(err: std::io::Error) -> Self {
        CheckError::Io(err)
    }
}

impl From<reqwest::Error> for CheckError {
    fn from(err: reqwest::Error) -> Self {
        CheckError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for CheckError {
    fn from(err: serde_json::Error) -> Self {
        CheckError::Parse(err.to_string())
    }
}

impl From<csv::Error> for CheckError {
    fn from(err: csv::Error) -> Self {
        CheckError::Parse(err.to_string())
    }
}

impl CheckError {
    /// True for errors caused by the caller's input rather than the datasets
    pub fn is_format(&self) -> bool {
        matches!(self, CheckError::Format(_))
    }
}

pub type Result<T> = std::result::Result<T, CheckError>;
