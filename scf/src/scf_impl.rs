//! Restricted closed-shell Hartree-Fock.
//!
//! `SimpleSCF` owns the one-electron matrices, the Fock builder and the
//! iteration state; the free functions here are the matrix algebra it shares
//! with the tests.

extern crate nalgebra as na;

mod convergence;
mod diis;
mod simple;
#[cfg(test)]
mod tests;

pub use convergence::{ConvergenceCriterion, ConvergenceState, CriteriaMode};
pub use diis::DIIS;
pub use simple::{InitialGuess, IterationRecord, ScfResult, ScfStatus, SimpleSCF};

use crate::eigen::JacobiSolver;
use crate::error::ScfError;
use na::{DMatrix, DVector};

/// Overlap eigenvalues at or below this mark a linearly dependent basis.
pub const OVERLAP_EIGENVALUE_THRESHOLD: f64 = 1e-10;

/// Flip each eigenvector so that its largest-magnitude entry is positive.
pub fn align_eigenvectors(mut eigvecs: DMatrix<f64>) -> DMatrix<f64> {
    for j in 0..eigvecs.ncols() {
        let max_val = eigvecs
            .column(j)
            .iter()
            .fold(0.0_f64, |m, &x| if x.abs() > m.abs() { x } else { m });
        if max_val < 0.0 {
            eigvecs.column_mut(j).neg_mut();
        }
    }
    eigvecs
}

/// D = 2 C_occ C_occᵗ for the lowest `n_occ` columns of `coeffs`.
pub fn closed_shell_density(coeffs: &DMatrix<f64>, n_occ: usize) -> DMatrix<f64> {
    let occupied = coeffs.columns(0, n_occ);
    2.0 * &occupied * occupied.transpose()
}

/// Root-mean-square elementwise difference of two density matrices.
pub fn density_rms(new: &DMatrix<f64>, old: &DMatrix<f64>) -> f64 {
    if new.is_empty() {
        return 0.0;
    }
    ((new - old).norm_squared() / new.len() as f64).sqrt()
}

/// ½ Σ D (H + F).
pub fn electronic_energy(
    density: &DMatrix<f64>,
    h_core: &DMatrix<f64>,
    fock: &DMatrix<f64>,
) -> f64 {
    0.5 * density.component_mul(&(h_core + fock)).sum()
}

/// Symmetric (Löwdin) orthogonalizer X = U s^{-1/2} Uᵗ, so that XᵗSX = 1.
pub fn lowdin_orthogonalizer(
    overlap: &DMatrix<f64>,
    solver: &JacobiSolver,
) -> Result<DMatrix<f64>, ScfError> {
    let eig = solver.diagonalize(overlap)?.into_converged()?;

    if let Some(&smallest) = eig.values.iter().min_by(|a, b| a.total_cmp(b)) {
        if smallest <= OVERLAP_EIGENVALUE_THRESHOLD {
            return Err(ScfError::DegenerateGeometry(format!(
                "overlap matrix is singular (smallest eigenvalue {:e}); basis functions are linearly dependent",
                smallest
            )));
        }
    }

    let inv_sqrt = DVector::from_iterator(eig.values.len(), eig.values.iter().map(|s| 1.0 / s.sqrt()));
    Ok(&eig.vectors * DMatrix::from_diagonal(&inv_sqrt) * eig.vectors.transpose())
}
