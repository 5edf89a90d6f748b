use thiserror::Error;

/// Failures of the orbital kernel itself.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum KernelError {
    #[error("invalid scale {0} px/AU: scale must be positive and finite")]
    InvalidScale(f64),
}

/// Failures while turning a catalog file into star and planet records.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed catalog CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("catalog has no {0:?} column")]
    MissingColumn(&'static str),

    #[error("catalog contains no rows")]
    NoRows,

    #[error("host {0:?} not found in catalog")]
    HostNotFound(String),

    #[error("host {0:?} has no row with positive stellar mass, radius and temperature")]
    MissingStar(String),
}
