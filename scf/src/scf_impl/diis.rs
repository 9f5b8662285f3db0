use crate::error::ScfError;
use nalgebra::{DMatrix, DVector};
use tracing::debug;

/// DIIS (Direct Inversion in the Iterative Subspace) convergence accelerator
///
/// DIIS accelerates SCF convergence by extrapolating the Fock matrix using a linear
/// combination of previous Fock matrices, weighted to minimize the error vector.
///
/// # Algorithm
///
/// The DIIS error matrix is calculated as the commutator: E = FDS - SDF
/// where F is the Fock matrix, D is the density matrix, and S is the overlap matrix.
///
/// The extrapolated Fock matrix is: F_DIIS = Σ c_i F_i
/// where coefficients c_i are determined by minimizing ||Σ c_i E_i||^2
/// subject to the constraint Σ c_i = 1.
#[derive(Debug, Clone)]
pub struct DIIS {
    error_matrices: Vec<DMatrix<f64>>,
    fock_matrices: Vec<DMatrix<f64>>,
    max_subspace_size: usize,
}

impl DIIS {
    /// * `max_subspace_size` - Maximum number of previous Fock/error matrices to store (typically 6-12)
    pub fn new(max_subspace_size: usize) -> Self {
        DIIS {
            error_matrices: Vec::new(),
            fock_matrices: Vec::new(),
            max_subspace_size: max_subspace_size.max(1),
        }
    }

    pub fn calculate_error_matrix(
        &self,
        fock: &DMatrix<f64>,
        density: &DMatrix<f64>,
        overlap: &DMatrix<f64>,
    ) -> DMatrix<f64> {
        fock * density * overlap - overlap * density * fock
    }

    /// Push a Fock matrix and its commutator error, dropping the oldest
    /// pair once the subspace is full.
    pub fn update(
        &mut self,
        fock_matrix: DMatrix<f64>,
        density_matrix: &DMatrix<f64>,
        overlap_matrix: &DMatrix<f64>,
    ) {
        let error = self.calculate_error_matrix(&fock_matrix, density_matrix, overlap_matrix);

        if self.error_matrices.len() >= self.max_subspace_size {
            self.error_matrices.remove(0);
            self.fock_matrices.remove(0);
        }

        self.error_matrices.push(error);
        self.fock_matrices.push(fock_matrix);
    }

    /// Largest |element| of the most recent error matrix.
    pub fn latest_error(&self) -> Option<f64> {
        self.error_matrices.last().map(|e| e.abs().max())
    }

    /// Solve the bordered B-matrix equations and return Σ c_i F_i.
    pub fn extrapolate(&self) -> Result<DMatrix<f64>, ScfError> {
        let n = self.error_matrices.len();
        if n == 0 {
            return Err(ScfError::SingularMatrix(
                "DIIS subspace is empty".to_string(),
            ));
        }

        // B_ij = <e_i|e_j>, bordered by the Σ c_i = 1 constraint
        let mut b = DMatrix::zeros(n + 1, n + 1);
        for i in 0..n {
            for j in 0..=i {
                let dot = self.error_matrices[i].dot(&self.error_matrices[j]);
                b[(i, j)] = dot;
                b[(j, i)] = dot;
            }
            b[(i, n)] = -1.0;
            b[(n, i)] = -1.0;
        }

        let mut rhs = DVector::zeros(n + 1);
        rhs[n] = -1.0;

        let coeffs = b.lu().solve(&rhs).ok_or_else(|| {
            ScfError::SingularMatrix(format!("DIIS B matrix with {} vectors", n))
        })?;
        if coeffs.iter().any(|c| !c.is_finite()) {
            return Err(ScfError::SingularMatrix(format!(
                "DIIS coefficients are not finite with {} vectors",
                n
            )));
        }

        let mut fock_extrapolated =
            DMatrix::zeros(self.fock_matrices[0].nrows(), self.fock_matrices[0].ncols());
        for (fock, c) in self.fock_matrices.iter().zip(coeffs.iter()) {
            fock_extrapolated += fock * *c;
        }

        debug!("DIIS extrapolation with {} vectors", n);
        Ok(fock_extrapolated)
    }

    pub fn reset(&mut self) {
        self.error_matrices.clear();
        self.fock_matrices.clear();
    }

    pub fn size(&self) -> usize {
        self.error_matrices.len()
    }

    pub fn max_subspace_size(&self) -> usize {
        self.max_subspace_size
    }
}
