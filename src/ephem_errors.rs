use thiserror::Error;

use crate::constants::JulianDate;

#[derive(Error, Debug)]
pub enum EphemError {
    #[error("Invalid orbital elements: {0}")]
    InvalidElements(String),

    #[error("{solver} did not converge after {iterations} iterations")]
    NumericalDivergence {
        solver: &'static str,
        iterations: usize,
    },

    #[error("Julian date {julian_date} is outside the validity window {valid}")]
    DateOutOfRange {
        julian_date: JulianDate,
        valid: &'static str,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Unable to parse element line {line}: {reason}")]
    ElementParsing { line: usize, reason: String },

    #[error("Body not found: {0}")]
    BodyNotFound(String),

    #[error("Observation request contains no epoch")]
    EmptyObservationRequest,

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV export error: {0}")]
    CsvError(#[from] csv::Error),
}

impl EphemError {
    /// Shorthand used by the iterative solvers.
    pub(crate) fn divergence(solver: &'static str, iterations: usize) -> Self {
        EphemError::NumericalDivergence { solver, iterations }
    }
}

impl PartialEq for EphemError {
    fn eq(&self, other: &Self) -> bool {
        use EphemError::*;
        match (self, other) {
            (InvalidElements(a), InvalidElements(b)) => a == b,
            (
                NumericalDivergence {
                    solver: s1,
                    iterations: i1,
                },
                NumericalDivergence {
                    solver: s2,
                    iterations: i2,
                },
            ) => s1 == s2 && i1 == i2,
            (
                DateOutOfRange {
                    julian_date: d1,
                    valid: v1,
                },
                DateOutOfRange {
                    julian_date: d2,
                    valid: v2,
                },
            ) => d1 == d2 && v1 == v2,
            (InvalidConfiguration(a), InvalidConfiguration(b)) => a == b,
            (
                ElementParsing {
                    line: l1,
                    reason: r1,
                },
                ElementParsing {
                    line: l2,
                    reason: r2,
                },
            ) => l1 == l2 && r1 == r2,
            (BodyNotFound(a), BodyNotFound(b)) => a == b,

            // I/O errors are not comparable: same variant is enough
            (IoError(_), IoError(_)) => true,
            (CsvError(_), CsvError(_)) => true,

            (EmptyObservationRequest, EmptyObservationRequest) => true,

            _ => false,
        }
    }
}
