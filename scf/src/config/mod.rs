//! Configuration management for SCF calculations
//!
//! The YAML job file maps onto `Config`; every SCF parameter is optional and
//! filled in by `with_defaults`. Command-line flags override file values.

mod args;

pub use args::Args;

use basis::eri::EriMethod;
use scf::{ConvergenceCriterion, CriteriaMode, FockMode, Units};
use serde::Deserialize;

pub const DEFAULT_BASIS: &str = "sto-3g";

/// Main configuration structure for SCF calculations
#[derive(Debug, Deserialize)]
pub struct Config {
    pub geometry: Vec<Atom>,
    pub units: Option<Units>,
    pub basis: Option<String>,
    pub charge: Option<i32>,
    #[serde(default)]
    pub scf_params: ScfParams,
}

/// Atomic position configuration
#[derive(Debug, Deserialize)]
pub struct Atom {
    pub element: String,
    pub coords: [f64; 3],
}

/// SCF-specific parameters
#[derive(Debug, Deserialize)]
pub struct ScfParams {
    pub max_cycle: Option<usize>,
    pub convergence_threshold: Option<f64>,
    pub density_threshold: Option<f64>,
    pub criteria_mode: Option<CriteriaMode>,
    pub density_mixing: Option<f64>,
    pub diis_subspace_size: Option<usize>,
    pub eri_method: Option<EriMethod>,
    pub fock_mode: Option<FockMode>,
    pub jacobi_max_sweeps: Option<usize>,
    pub sort_eigenvalues: Option<bool>,
}

impl Default for ScfParams {
    fn default() -> Self {
        ScfParams {
            max_cycle: Some(50),
            convergence_threshold: Some(1e-8),
            density_threshold: None,
            criteria_mode: Some(CriteriaMode::All),
            density_mixing: Some(1.0),
            diis_subspace_size: Some(0),
            eri_method: Some(EriMethod::HeadGordonPople),
            fock_mode: Some(FockMode::InCore),
            jacobi_max_sweeps: Some(50),
            sort_eigenvalues: Some(true),
        }
    }
}

impl ScfParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.max_cycle.is_none() {
            self.max_cycle = defaults.max_cycle;
        }
        if self.convergence_threshold.is_none() {
            self.convergence_threshold = defaults.convergence_threshold;
        }
        if self.criteria_mode.is_none() {
            self.criteria_mode = defaults.criteria_mode;
        }
        if self.density_mixing.is_none() {
            self.density_mixing = defaults.density_mixing;
        }
        if self.diis_subspace_size.is_none() {
            self.diis_subspace_size = defaults.diis_subspace_size;
        }
        if self.eri_method.is_none() {
            self.eri_method = defaults.eri_method;
        }
        if self.fock_mode.is_none() {
            self.fock_mode = defaults.fock_mode;
        }
        if self.jacobi_max_sweeps.is_none() {
            self.jacobi_max_sweeps = defaults.jacobi_max_sweeps;
        }
        if self.sort_eigenvalues.is_none() {
            self.sort_eigenvalues = defaults.sort_eigenvalues;
        }
        self
    }

    /// Replace file values with any flags given on the command line
    pub fn override_with(mut self, args: &Args) -> Self {
        if args.max_cycle.is_some() {
            self.max_cycle = args.max_cycle;
        }
        if args.convergence_threshold.is_some() {
            self.convergence_threshold = args.convergence_threshold;
        }
        if args.density_threshold.is_some() {
            self.density_threshold = args.density_threshold;
        }
        if args.density_mixing.is_some() {
            self.density_mixing = args.density_mixing;
        }
        if args.diis_subspace_size.is_some() {
            self.diis_subspace_size = args.diis_subspace_size;
        }
        if let Some(choice) = args.criteria_mode {
            self.criteria_mode = Some(choice.into());
        }
        if args.jacobi_max_sweeps.is_some() {
            self.jacobi_max_sweeps = args.jacobi_max_sweeps;
        }
        if args.sort_eigenvalues.is_some() {
            self.sort_eigenvalues = args.sort_eigenvalues;
        }
        if let Some(choice) = args.eri_method {
            self.eri_method = Some(choice.into());
        }
        if let Some(choice) = args.fock_mode {
            self.fock_mode = Some(choice.into());
        }
        self
    }

    pub fn convergence_criterion(&self) -> ConvergenceCriterion {
        ConvergenceCriterion::energy_and_density(
            self.convergence_threshold.unwrap_or(1e-8),
            self.density_threshold,
            self.criteria_mode.unwrap_or_default(),
        )
    }

    /// DIIS subspace size, None when DIIS is disabled
    pub fn diis_size(&self) -> Option<usize> {
        self.diis_subspace_size.filter(|&size| size > 0)
    }
}

impl Config {
    /// Apply defaults to all configuration sections
    pub fn with_defaults(mut self) -> Self {
        self.scf_params = self.scf_params.with_defaults();
        if self.units.is_none() {
            self.units = Some(Units::default());
        }
        if self.basis.is_none() {
            self.basis = Some(DEFAULT_BASIS.to_string());
        }
        self
    }

    pub fn basis_name(&self) -> &str {
        self.basis.as_deref().unwrap_or(DEFAULT_BASIS)
    }

    pub fn charge(&self, args: &Args) -> i32 {
        args.charge.or(self.charge).unwrap_or(0)
    }
}
