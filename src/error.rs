use thiserror::Error;

/// Enum of the possible error variants raised while loading or querying the coefficient model
#[derive(Error, Debug)]
pub enum IgrfError {
    /// Requested year lies outside the span covered by the coefficient table
    #[error("year {0} is outside the supported range [1900, 2025]")]
    YearOutOfRange(f64),

    /// The coefficient table is missing a column, a row, or holds an unreadable value
    #[error("coefficient data unavailable: {0}")]
    CoefficientData(String),

    /// Unable to read the coefficient source
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

#[cfg(feature = "python")]
impl From<IgrfError> for pyo3::PyErr {
    fn from(value: IgrfError) -> Self {
        let msg = value.to_string();
        pyo3::exceptions::PyValueError::new_err(msg)
    }
}
