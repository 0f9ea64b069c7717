use thiserror::Error;

#[derive(Error, Debug)]
pub enum SampleDataError {
    #[error("Invalid sample record: {0}")]
    InvalidRecord(#[from] core_types::CoreError),

    #[error("Date out of range while generating the {0} series")]
    DateOverflow(&'static str),
}
