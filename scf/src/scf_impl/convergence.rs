use serde::Deserialize;

/// Snapshot handed to the convergence test after every cycle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConvergenceState {
    pub iteration: usize,
    /// None on the first cycle of a run without a reference energy.
    pub old_energy: Option<f64>,
    pub new_energy: f64,
    /// RMS change of the density matrix over this cycle.
    pub density_rms: Option<f64>,
}

impl ConvergenceState {
    pub fn delta_energy(&self) -> Option<f64> {
        self.old_energy.map(|old| self.new_energy - old)
    }
}

/// How the energy and density sub-criteria are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriteriaMode {
    #[default]
    All,
    Any,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConvergenceCriterion {
    /// |E_new − E_old| <= tol.
    Energy(f64),
    /// RMS density change <= tol.
    DensityRms(f64),
    /// Every sub-criterion holds; an empty list always holds.
    All(Vec<ConvergenceCriterion>),
    /// At least one sub-criterion holds; an empty list never holds.
    Any(Vec<ConvergenceCriterion>),
}

impl Default for ConvergenceCriterion {
    fn default() -> Self {
        ConvergenceCriterion::Energy(1e-8)
    }
}

impl ConvergenceCriterion {
    /// Energy tolerance, optionally combined with a density tolerance.
    pub fn energy_and_density(
        energy_tol: f64,
        density_tol: Option<f64>,
        mode: CriteriaMode,
    ) -> Self {
        let energy = ConvergenceCriterion::Energy(energy_tol);
        match density_tol {
            None => energy,
            Some(tol) => {
                let parts = vec![energy, ConvergenceCriterion::DensityRms(tol)];
                match mode {
                    CriteriaMode::All => ConvergenceCriterion::All(parts),
                    CriteriaMode::Any => ConvergenceCriterion::Any(parts),
                }
            }
        }
    }

    pub fn is_satisfied(&self, state: &ConvergenceState) -> bool {
        match self {
            ConvergenceCriterion::Energy(tol) => state
                .delta_energy()
                .map_or(false, |de| de.abs() <= *tol),
            ConvergenceCriterion::DensityRms(tol) => {
                state.density_rms.map_or(false, |rms| rms <= *tol)
            }
            ConvergenceCriterion::All(parts) => parts.iter().all(|c| c.is_satisfied(state)),
            ConvergenceCriterion::Any(parts) => parts.iter().any(|c| c.is_satisfied(state)),
        }
    }
}
