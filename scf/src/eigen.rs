//! Cyclic Jacobi diagonalization of real symmetric matrices.
//!
//! Each sweep visits every upper-triangle element once and annihilates it
//! with a plane rotation. During the first three sweeps rotations are only
//! applied to elements above 0.2 Σ|a_pq| / n²; afterwards every non-zero
//! element is rotated, and elements too small to change either diagonal
//! entry in floating point are simply set to zero.

use crate::error::ScfError;
use nalgebra::{DMatrix, DVector};
use tracing::debug;

/// Sweeps that use the relaxed rotation threshold.
const RELAXED_SWEEPS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JacobiStatus {
    Converged,
    /// Sweep budget exhausted. `off_diagonal` is Σ_{p<q} |a_pq| at exit.
    NotConverged { sweeps: usize, off_diagonal: f64 },
}

/// Eigenvalues with eigenvectors stored as matrix columns.
#[derive(Debug, Clone)]
pub struct EigenDecomposition {
    pub values: DVector<f64>,
    pub vectors: DMatrix<f64>,
    pub sweeps: usize,
    pub status: JacobiStatus,
}

impl EigenDecomposition {
    pub fn is_converged(&self) -> bool {
        self.status == JacobiStatus::Converged
    }

    /// Turn an unconverged decomposition into `EigenNotConverged`.
    pub fn into_converged(self) -> Result<Self, ScfError> {
        match self.status {
            JacobiStatus::Converged => Ok(self),
            JacobiStatus::NotConverged {
                sweeps,
                off_diagonal,
            } => Err(ScfError::EigenNotConverged {
                sweeps,
                off_diagonal,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JacobiSolver {
    pub max_sweeps: usize,
    /// Order eigenpairs by ascending eigenvalue.
    pub sort: bool,
}

impl Default for JacobiSolver {
    fn default() -> Self {
        Self {
            max_sweeps: 50,
            sort: true,
        }
    }
}

fn rotate(m: &mut DMatrix<f64>, s: f64, tau: f64, i: usize, j: usize, k: usize, l: usize) {
    let g = m[(i, j)];
    let h = m[(k, l)];
    m[(i, j)] = g - s * (h + g * tau);
    m[(k, l)] = h + s * (g - h * tau);
}

fn off_diagonal_sum(a: &DMatrix<f64>) -> f64 {
    let n = a.nrows();
    (0..n)
        .flat_map(|p| ((p + 1)..n).map(move |q| (p, q)))
        .map(|(p, q)| a[(p, q)].abs())
        .sum()
}

impl JacobiSolver {
    pub fn new(max_sweeps: usize, sort: bool) -> Self {
        Self { max_sweeps, sort }
    }

    /// Diagonalize `matrix`. Only the upper triangle is read.
    ///
    /// Running out of sweeps is reported through `status`, not as an error.
    pub fn diagonalize(&self, matrix: &DMatrix<f64>) -> Result<EigenDecomposition, ScfError> {
        let n = matrix.nrows();
        if matrix.ncols() != n {
            return Err(ScfError::InvalidInput(format!(
                "cannot diagonalize a {}x{} matrix",
                n,
                matrix.ncols()
            )));
        }
        if matrix.iter().any(|x| !x.is_finite()) {
            return Err(ScfError::InvalidInput(
                "matrix to diagonalize has non-finite entries".to_string(),
            ));
        }

        let mut a = matrix.clone();
        let mut v = DMatrix::<f64>::identity(n, n);
        let mut d: Vec<f64> = (0..n).map(|i| a[(i, i)]).collect();
        let mut b = d.clone();
        let mut z = vec![0.0; n];

        let mut sweeps = 0;
        let mut status = JacobiStatus::Converged;
        loop {
            let sm = off_diagonal_sum(&a);
            if sm == 0.0 {
                break;
            }
            if sweeps == self.max_sweeps {
                status = JacobiStatus::NotConverged {
                    sweeps,
                    off_diagonal: sm,
                };
                break;
            }
            sweeps += 1;

            let tresh = if sweeps <= RELAXED_SWEEPS {
                0.2 * sm / (n * n) as f64
            } else {
                0.0
            };

            for p in 0..n.saturating_sub(1) {
                for q in (p + 1)..n {
                    let apq = a[(p, q)];
                    let g = 100.0 * apq.abs();
                    if sweeps > RELAXED_SWEEPS + 1
                        && d[p].abs() + g == d[p].abs()
                        && d[q].abs() + g == d[q].abs()
                    {
                        a[(p, q)] = 0.0;
                    } else if apq.abs() > tresh {
                        let h = d[q] - d[p];
                        let t = if h.abs() + g == h.abs() {
                            apq / h
                        } else {
                            let theta = 0.5 * h / apq;
                            let t = 1.0 / (theta.abs() + (1.0 + theta * theta).sqrt());
                            if theta < 0.0 {
                                -t
                            } else {
                                t
                            }
                        };
                        let c = 1.0 / (1.0 + t * t).sqrt();
                        let s = t * c;
                        let tau = s / (1.0 + c);
                        let h = t * apq;
                        z[p] -= h;
                        z[q] += h;
                        d[p] -= h;
                        d[q] += h;
                        a[(p, q)] = 0.0;

                        for j in 0..p {
                            rotate(&mut a, s, tau, j, p, j, q);
                        }
                        for j in (p + 1)..q {
                            rotate(&mut a, s, tau, p, j, j, q);
                        }
                        for j in (q + 1)..n {
                            rotate(&mut a, s, tau, p, j, q, j);
                        }
                        for j in 0..n {
                            rotate(&mut v, s, tau, j, p, j, q);
                        }
                    }
                }
            }

            for p in 0..n {
                b[p] += z[p];
                d[p] = b[p];
                z[p] = 0.0;
            }
        }

        if self.sort {
            // selection sort, moving eigenvector columns along
            for i in 0..n {
                let k = (i..n).fold(i, |k, j| if d[j] < d[k] { j } else { k });
                if k != i {
                    d.swap(i, k);
                    v.swap_columns(i, k);
                }
            }
        }

        debug!("Jacobi: n = {}, {} sweeps, {:?}", n, sweeps, status);
        Ok(EigenDecomposition {
            values: DVector::from_vec(d),
            vectors: v,
            sweeps,
            status,
        })
    }
}
