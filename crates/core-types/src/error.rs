use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Unknown table: '{0}'")]
    UnknownTable(String),

    #[error("Unknown sales field: '{0}'")]
    UnknownField(String),
}
