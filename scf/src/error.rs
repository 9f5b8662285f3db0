use basis::error::BasisError;
use thiserror::Error;

/// Hard failures of the SCF machinery.
///
/// An SCF run that simply runs out of cycles is not an error; it is reported
/// through `ScfStatus::IterationLimitExceeded` on the result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScfError {
    #[error(transparent)]
    Basis(#[from] BasisError),

    /// Coincident nuclei, a numerically singular overlap matrix, or a Fock
    /// matrix that picked up non-finite entries.
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("Singular matrix: {0}")]
    SingularMatrix(String),

    #[error("Jacobi diagonalization did not converge in {sweeps} sweeps (off-diagonal sum {off_diagonal:e})")]
    EigenNotConverged { sweeps: usize, off_diagonal: f64 },

    /// Restricted closed-shell SCF needs an even electron count.
    #[error("Closed-shell SCF requires an even number of electrons, got {0}")]
    OpenShell(usize),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
