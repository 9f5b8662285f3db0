use thiserror::Error;

/// Errors raised while assembling Gaussian basis functions.
///
/// All of these are detected at construction time, so a basis set that was
/// built successfully can be handed to the integral code without further
/// checks.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BasisError {
    /// The contraction data is inconsistent: exponent/coefficient counts do not
    /// match, a contraction is empty, an exponent is not a positive finite
    /// number, or the contracted function has no norm.
    #[error("Malformed basis input: {0}")]
    MalformedBasis(String),

    /// Cartesian shells are only tabulated up to `max` (g functions).
    #[error("Angular momentum {l} exceeds the supported maximum of {max}")]
    AngularMomentumTooHigh { l: i32, max: i32 },

    /// The basis library has no entry for the requested element.
    #[error("Basis set '{library}' has no entry for atomic number {atomic_number}")]
    UnknownElement { atomic_number: u32, library: String },

    /// A basis-function centre is not a finite point.
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),
}
