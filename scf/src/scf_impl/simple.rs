//! Restricted closed-shell SCF driver.

extern crate nalgebra as na;

use super::{
    align_eigenvectors, closed_shell_density, density_rms, electronic_energy,
    lowdin_orthogonalizer, ConvergenceCriterion, ConvergenceState, DIIS,
};
use crate::eigen::JacobiSolver;
use crate::error::ScfError;
use crate::fock::{core_hamiltonian, overlap_matrix, FockBuilder, FockMode};
use crate::molecule::Molecule;
use basis::basis::BasisSet;
use basis::eri::{EriMethod, TwoElectronStrategy};
use na::{DMatrix, DVector};
use std::cmp::Ordering;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScfStatus {
    Converged,
    /// `max_cycle` reached; the result holds the last iterate.
    IterationLimitExceeded,
}

/// Starting point of a run.
#[derive(Debug, Clone)]
pub enum InitialGuess {
    /// Occupy the eigenvectors of the core Hamiltonian.
    CoreHamiltonian,
    Density(DMatrix<f64>),
    /// Continue from an earlier run: its density, with its energy as the
    /// reference for the first energy difference.
    Restart { density: DMatrix<f64>, energy: f64 },
}

/// One line of progress, handed to the observer after every cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationRecord {
    pub iteration: usize,
    /// Total energy (electronic + nuclear) of this cycle.
    pub energy: f64,
    pub delta_energy: Option<f64>,
    pub density_rms: f64,
    pub diis_used: bool,
    /// Largest |FDS − SDF| element of this cycle, when DIIS is on.
    pub diis_error: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct ScfResult {
    pub status: ScfStatus,
    pub iterations: usize,
    pub total_energy: f64,
    pub electronic_energy: f64,
    pub nuclear_repulsion: f64,
    /// Ascending.
    pub orbital_energies: DVector<f64>,
    /// Molecular orbitals as columns, same order as `orbital_energies`.
    pub coefficients: DMatrix<f64>,
    pub density: DMatrix<f64>,
    pub fock: DMatrix<f64>,
    pub num_occupied: usize,
}

impl ScfResult {
    pub fn is_converged(&self) -> bool {
        self.status == ScfStatus::Converged
    }

    pub fn homo_energy(&self) -> Option<f64> {
        self.num_occupied
            .checked_sub(1)
            .map(|homo| self.orbital_energies[homo])
    }

    pub fn lumo_energy(&self) -> Option<f64> {
        self.orbital_energies.get(self.num_occupied).copied()
    }
}

pub struct SimpleSCF<E: TwoElectronStrategy = EriMethod> {
    pub num_basis: usize,
    pub num_occupied: usize,
    pub max_cycle: usize,
    pub convergence: ConvergenceCriterion,
    /// Weight of the new density in D ← λ D_new + (1 − λ) D_old; 1 disables damping.
    pub density_mixing: f64,
    pub diis: Option<DIIS>,
    pub jacobi: JacobiSolver,
    pub nuclear_repulsion: f64,
    pub overlap_matrix: DMatrix<f64>,
    pub h_core: DMatrix<f64>,
    pub density_matrix: DMatrix<f64>,
    pub fock_matrix: DMatrix<f64>,
    pub coeffs: DMatrix<f64>,
    pub e_level: DVector<f64>,
    orthogonalizer: DMatrix<f64>,
    fock_builder: FockBuilder<E>,
}

impl<E: TwoElectronStrategy> SimpleSCF<E> {
    /// Set up everything that stays fixed for the molecule: S, H, E_nuc, X
    /// and, in in-core mode, the two-electron integral store.
    pub fn new(
        molecule: &Molecule,
        basis: &BasisSet,
        strategy: E,
        mode: FockMode,
    ) -> Result<Self, ScfError> {
        Self::with_solver(molecule, basis, strategy, mode, JacobiSolver::default())
    }

    pub fn with_solver(
        molecule: &Molecule,
        basis: &BasisSet,
        strategy: E,
        mode: FockMode,
        jacobi: JacobiSolver,
    ) -> Result<Self, ScfError> {
        let num_basis = basis.len();
        if num_basis == 0 {
            return Err(ScfError::InvalidInput("basis set is empty".to_string()));
        }
        let electrons = molecule.electron_count()?;
        if electrons % 2 != 0 {
            return Err(ScfError::OpenShell(electrons));
        }
        let num_occupied = electrons / 2;
        if num_occupied > num_basis {
            return Err(ScfError::InvalidInput(format!(
                "{} doubly occupied orbitals do not fit into {} basis functions",
                num_occupied, num_basis
            )));
        }

        let nuclear_repulsion = molecule.nuclear_repulsion()?;
        let functions = basis.functions();
        let overlap_matrix = overlap_matrix(functions);
        let h_core = core_hamiltonian(functions, molecule);
        let orthogonalizer = lowdin_orthogonalizer(&overlap_matrix, &jacobi)?;

        info!(
            "RHF setup: {} basis functions ({}), {} electrons, two-electron integrals via {} ({:?})",
            num_basis,
            basis.name,
            electrons,
            strategy.name(),
            mode
        );
        info!("Nuclear repulsion energy: {:.10} au", nuclear_repulsion);

        let fock_builder = FockBuilder::new(functions, strategy, mode);

        Ok(SimpleSCF {
            num_basis,
            num_occupied,
            max_cycle: 50,
            convergence: ConvergenceCriterion::default(),
            density_mixing: 1.0,
            diis: None,
            jacobi,
            nuclear_repulsion,
            overlap_matrix,
            h_core: h_core.clone(),
            density_matrix: DMatrix::zeros(num_basis, num_basis),
            fock_matrix: h_core,
            coeffs: DMatrix::zeros(num_basis, num_basis),
            e_level: DVector::zeros(num_basis),
            orthogonalizer,
            fock_builder,
        })
    }

    pub fn set_convergence_threshold(&mut self, threshold: f64) {
        self.convergence = ConvergenceCriterion::Energy(threshold);
        info!("Convergence threshold set to {}", threshold);
    }

    pub fn enable_diis(&mut self, subspace_size: usize) {
        let diis = DIIS::new(subspace_size);
        info!("DIIS enabled with subspace size {}", diis.max_subspace_size());
        self.diis = Some(diis);
    }

    pub fn disable_diis(&mut self) {
        self.diis = None;
    }

    pub fn orthogonalizer(&self) -> &DMatrix<f64> {
        &self.orthogonalizer
    }

    /// Solve FC = SCε in the orthogonal basis: F' = XᵗFX, C = XC'.
    /// Orbitals come back in ascending order.
    pub fn solve_roothaan(
        &self,
        fock: &DMatrix<f64>,
    ) -> Result<(DVector<f64>, DMatrix<f64>), ScfError> {
        let x = &self.orthogonalizer;
        let f_prime = x.transpose() * fock * x;
        let eig = self.jacobi.diagonalize(&f_prime)?.into_converged()?;

        let mut indices: Vec<usize> = (0..eig.values.len()).collect();
        if !self.jacobi.sort {
            indices.sort_by(|&a, &b| {
                eig.values[a]
                    .partial_cmp(&eig.values[b])
                    .unwrap_or(Ordering::Equal)
            });
        }
        let values = DVector::from_fn(eig.values.len(), |i, _| eig.values[indices[i]]);
        let vectors = eig.vectors.select_columns(&indices);

        Ok((values, align_eigenvectors(x * vectors)))
    }

    /// Density from occupying the core-Hamiltonian orbitals.
    pub fn core_guess(&self) -> Result<DMatrix<f64>, ScfError> {
        let (_, coeffs) = self.solve_roothaan(&self.h_core)?;
        Ok(closed_shell_density(&coeffs, self.num_occupied))
    }

    pub fn run(&mut self, guess: InitialGuess) -> Result<ScfResult, ScfError> {
        self.run_with_observer(guess, |_| {})
    }

    /// Re-run from a previous result's density and energy.
    pub fn restart_from(&mut self, previous: &ScfResult) -> Result<ScfResult, ScfError> {
        self.run(InitialGuess::Restart {
            density: previous.density.clone(),
            energy: previous.total_energy,
        })
    }

    pub fn run_with_observer<F>(
        &mut self,
        guess: InitialGuess,
        mut observer: F,
    ) -> Result<ScfResult, ScfError>
    where
        F: FnMut(&IterationRecord),
    {
        if self.max_cycle == 0 {
            return Err(ScfError::InvalidInput("max_cycle must be positive".to_string()));
        }
        if !(self.density_mixing > 0.0 && self.density_mixing <= 1.0) {
            return Err(ScfError::InvalidInput(format!(
                "density mixing must lie in (0, 1], got {}",
                self.density_mixing
            )));
        }

        let (mut density, mut previous_energy) = match guess {
            InitialGuess::CoreHamiltonian => (self.core_guess()?, None),
            InitialGuess::Density(d) => (d, None),
            InitialGuess::Restart { density, energy } => (density, Some(energy)),
        };
        if density.shape() != (self.num_basis, self.num_basis) {
            return Err(ScfError::InvalidInput(format!(
                "initial density is {}x{}, expected {}x{}",
                density.nrows(),
                density.ncols(),
                self.num_basis,
                self.num_basis
            )));
        }
        if let Some(diis) = self.diis.as_mut() {
            diis.reset();
        }

        info!("Starting SCF cycle...");
        let mut last_electronic = 0.0;
        for cycle in 1..=self.max_cycle {
            let fock = self.fock_builder.fock_matrix(&self.h_core, &density)?;
            if fock.iter().any(|x| !x.is_finite()) {
                return Err(ScfError::DegenerateGeometry(format!(
                    "Fock matrix became non-finite in cycle {}",
                    cycle
                )));
            }
            let electronic = electronic_energy(&density, &self.h_core, &fock);
            let total_energy = electronic + self.nuclear_repulsion;

            let (fock_to_diagonalize, diis_used) = self.extrapolate(&fock, &density);
            let diis_error = self.diis.as_ref().and_then(|d| d.latest_error());
            let (e_level, coeffs) = self.solve_roothaan(&fock_to_diagonalize)?;

            let mut new_density = closed_shell_density(&coeffs, self.num_occupied);
            if self.density_mixing < 1.0 {
                new_density = self.density_mixing * new_density
                    + (1.0 - self.density_mixing) * &density;
            }
            let rms = density_rms(&new_density, &density);

            let state = ConvergenceState {
                iteration: cycle,
                old_energy: previous_energy,
                new_energy: total_energy,
                density_rms: Some(rms),
            };
            let record = IterationRecord {
                iteration: cycle,
                energy: total_energy,
                delta_energy: state.delta_energy(),
                density_rms: rms,
                diis_used,
                diis_error,
            };
            let diis_note = match (diis_error, diis_used) {
                (Some(err), true) => format!(", DIIS err = {:.3e}", err),
                (Some(err), false) => format!(", err = {:.3e}", err),
                (None, _) => String::new(),
            };
            info!(
                "Cycle {}: E = {:.12} au, dE = {:.12} au, rms(D) = {:.3e}{}",
                cycle,
                total_energy,
                record.delta_energy.unwrap_or(0.0),
                rms,
                diis_note
            );
            observer(&record);

            self.fock_matrix = fock;
            self.coeffs = coeffs;
            self.e_level = e_level;
            self.density_matrix = new_density;

            if self.convergence.is_satisfied(&state) {
                info!("SCF converged in {} cycles.", cycle);
                return Ok(self.result(ScfStatus::Converged, cycle, electronic));
            }
            previous_energy = Some(total_energy);
            last_electronic = electronic;
            density = self.density_matrix.clone();
        }

        warn!(
            "SCF did not converge within {} cycles; returning the last iterate",
            self.max_cycle
        );
        Ok(self.result(
            ScfStatus::IterationLimitExceeded,
            self.max_cycle,
            last_electronic,
        ))
    }

    // DIIS-extrapolated Fock matrix, or the plain one when DIIS is off, has
    // fewer than two vectors, or hits a singular B matrix.
    fn extrapolate(&mut self, fock: &DMatrix<f64>, density: &DMatrix<f64>) -> (DMatrix<f64>, bool) {
        let Some(diis) = self.diis.as_mut() else {
            return (fock.clone(), false);
        };
        diis.update(fock.clone(), density, &self.overlap_matrix);
        if diis.size() < 2 {
            return (fock.clone(), false);
        }
        match diis.extrapolate() {
            Ok(f) => (f, true),
            Err(e) => {
                warn!("{}; restarting DIIS from the current Fock matrix", e);
                diis.reset();
                diis.update(fock.clone(), density, &self.overlap_matrix);
                (fock.clone(), false)
            }
        }
    }

    fn result(&self, status: ScfStatus, iterations: usize, electronic: f64) -> ScfResult {
        ScfResult {
            status,
            iterations,
            total_energy: electronic + self.nuclear_repulsion,
            electronic_energy: electronic,
            nuclear_repulsion: self.nuclear_repulsion,
            orbital_energies: self.e_level.clone(),
            coefficients: self.coeffs.clone(),
            density: self.density_matrix.clone(),
            fock: self.fock_matrix.clone(),
            num_occupied: self.num_occupied,
        }
    }
}
