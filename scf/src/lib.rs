// Restricted Hartree-Fock on top of the `basis` integral crate

pub mod eigen;
pub mod error;
pub mod fock;
pub mod molecule;
pub mod scf_impl;

pub use eigen::{EigenDecomposition, JacobiSolver, JacobiStatus};
pub use error::ScfError;
pub use fock::{EriStore, FockBuilder, FockMode};
pub use molecule::{Atom, Molecule, Units, BOHR_TO_ANGSTROM};
pub use scf_impl::{
    ConvergenceCriterion, ConvergenceState, CriteriaMode, InitialGuess, IterationRecord,
    ScfResult, ScfStatus, SimpleSCF, DIIS,
};
