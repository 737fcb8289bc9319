use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum RLPDecodeError {
    #[error("Invalid RLP length")]
    InvalidLength,
    #[error("Malformed RLP data")]
    MalformedData,
    #[error("Expected RLP string, got list")]
    UnexpectedList,
    #[error("Expected RLP list, got string")]
    UnexpectedString,
    #[error("{0}")]
    Custom(String),
}
