//! Command-line argument parsing for SCF calculations

use basis::eri::EriMethod;
use clap::{ArgAction, Parser, ValueEnum};
use scf::{CriteriaMode, FockMode};

/// Restricted Hartree-Fock with YAML job configuration
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    pub config_file: String,

    /// Override output file: (default stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Write a plain-text summary of the final result to this file
    #[arg(long)]
    pub summary: Option<String>,

    /// Override density mixing parameter (1.0 disables damping)
    #[arg(long)]
    pub density_mixing: Option<f64>,

    /// Override maximum SCF cycles
    #[arg(long)]
    pub max_cycle: Option<usize>,

    /// Override DIIS subspace size (0 disables DIIS)
    #[arg(long)]
    pub diis_subspace_size: Option<usize>,

    /// Override energy convergence threshold (hartree)
    #[arg(long)]
    pub convergence_threshold: Option<f64>,

    /// Also require (or accept, see --criteria-mode) an RMS density change below this
    #[arg(long)]
    pub density_threshold: Option<f64>,

    /// Combine the energy and density criteria with all (default) or any
    #[arg(long, value_enum)]
    pub criteria_mode: Option<CriteriaChoice>,

    /// Override the Jacobi sweep budget per diagonalization
    #[arg(long)]
    pub jacobi_max_sweeps: Option<usize>,

    /// Sort orbital energies ascending inside the Jacobi solver (true/false)
    #[arg(long, action = ArgAction::Set)]
    pub sort_eigenvalues: Option<bool>,

    /// Two-electron integral scheme
    #[arg(long, value_enum)]
    pub eri_method: Option<EriChoice>,

    /// Keep all two-electron integrals in memory or recompute them each cycle
    #[arg(long, value_enum)]
    pub fock_mode: Option<FockChoice>,

    /// Molecular charge (default: 0 for neutral)
    #[arg(long, allow_hyphen_values = true)]
    pub charge: Option<i32>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum EriChoice {
    Huzinaga,
    Hgp,
}

impl From<EriChoice> for EriMethod {
    fn from(choice: EriChoice) -> Self {
        match choice {
            EriChoice::Huzinaga => EriMethod::Huzinaga,
            EriChoice::Hgp => EriMethod::HeadGordonPople,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FockChoice {
    InCore,
    Direct,
}

impl From<FockChoice> for FockMode {
    fn from(choice: FockChoice) -> Self {
        match choice {
            FockChoice::InCore => FockMode::InCore,
            FockChoice::Direct => FockMode::Direct,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CriteriaChoice {
    All,
    Any,
}

impl From<CriteriaChoice> for CriteriaMode {
    fn from(choice: CriteriaChoice) -> Self {
        match choice {
            CriteriaChoice::All => CriteriaMode::All,
            CriteriaChoice::Any => CriteriaMode::Any,
        }
    }
}
