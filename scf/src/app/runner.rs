use crate::config::ScfParams;
use color_eyre::eyre::{eyre, Result};
use scf::{InitialGuess, JacobiSolver, Molecule, ScfResult, SimpleSCF};
use basis::basis::BasisSet;
use tracing::info;

/// Configure a restricted SCF from the resolved parameters and run it from
/// the core-Hamiltonian guess.
pub fn run_restricted(
    molecule: &Molecule,
    basis: &BasisSet,
    params: &ScfParams,
) -> Result<ScfResult> {
    info!("\nInitializing restricted SCF...");
    let jacobi = JacobiSolver::new(
        params.jacobi_max_sweeps.unwrap_or(50),
        params.sort_eigenvalues.unwrap_or(true),
    );
    let mut scf = SimpleSCF::with_solver(
        molecule,
        basis,
        params.eri_method.unwrap_or_default(),
        params.fock_mode.unwrap_or_default(),
        jacobi,
    )?;

    configure_cycles(&mut scf, params);
    configure_mixing(&mut scf, params)?;
    configure_diis(&mut scf, params);
    scf.convergence = params.convergence_criterion();
    info!("Convergence criterion: {:?}", scf.convergence);

    let result = scf.run(InitialGuess::CoreHamiltonian)?;
    Ok(result)
}

fn configure_cycles(scf: &mut SimpleSCF, params: &ScfParams) {
    scf.max_cycle = params.max_cycle.unwrap_or(scf.max_cycle);
    info!("Maximum SCF cycles: {}", scf.max_cycle);
}

fn configure_mixing(scf: &mut SimpleSCF, params: &ScfParams) -> Result<()> {
    let mixing = params.density_mixing.unwrap_or(1.0);
    if !(mixing > 0.0 && mixing <= 1.0) {
        return Err(eyre!("density_mixing must lie in (0, 1], got {}", mixing));
    }
    scf.density_mixing = mixing;
    info!("Density mixing: {:.2}", mixing);
    Ok(())
}

fn configure_diis(scf: &mut SimpleSCF, params: &ScfParams) {
    match params.diis_size() {
        Some(size) => scf.enable_diis(size),
        None => {
            scf.disable_diis();
            info!("DIIS disabled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use basis::library::Sto3g;
    use nalgebra::Vector3;
    use periodic_table_on_an_enum::Element;
    use scf::ScfStatus;
    use std::sync::{Arc, Mutex};

    fn h2() -> Molecule {
        Molecule::from_angstrom(
            &[
                (Element::Hydrogen, Vector3::new(0.0, 0.0, 0.0)),
                (Element::Hydrogen, Vector3::new(0.0, 0.0, 0.74)),
            ],
            0,
        )
        .unwrap()
    }

    #[test]
    fn test_default_parameters_reach_reference_energy() {
        let mol = h2();
        let basis = mol.build_basis(&Sto3g).unwrap();
        let params = ScfParams::default();
        let result = run_restricted(&mol, &basis, &params).unwrap();
        assert_eq!(result.status, ScfStatus::Converged);
        assert!((result.total_energy - -1.1167593656305694).abs() < 1e-6);
    }

    #[test]
    fn test_diis_and_direct_mode() {
        let mol = h2();
        let basis = mol.build_basis(&Sto3g).unwrap();
        let yaml = "diis_subspace_size: 4\nfock_mode: direct\neri_method: huzinaga\n";
        let params = serde_yml::from_str::<ScfParams>(yaml).unwrap().with_defaults();
        let result = run_restricted(&mol, &basis, &params).unwrap();
        assert!(result.is_converged());
        assert!((result.total_energy - -1.1167593656305694).abs() < 1e-6);
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_setup_is_logged_once() {
        let mol = h2();
        let basis = mol.build_basis(&Sto3g).unwrap();
        let params = ScfParams {
            diis_subspace_size: Some(4),
            ..ScfParams::default()
        };

        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let result = tracing::subscriber::with_default(subscriber, || {
            run_restricted(&mol, &basis, &params)
        })
        .unwrap();
        assert!(result.is_converged());

        let log = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert_eq!(log.matches("Starting SCF cycle").count(), 1, "{}", log);
        assert_eq!(log.matches("DIIS enabled").count(), 1, "{}", log);
        assert_eq!(log.matches("Cycle 1:").count(), 1, "{}", log);
    }

    #[test]
    fn test_bad_mixing_is_rejected() {
        let mol = h2();
        let basis = mol.build_basis(&Sto3g).unwrap();
        let params = ScfParams {
            density_mixing: Some(1.5),
            ..ScfParams::default()
        };
        let err = run_restricted(&mol, &basis, &params).unwrap_err();
        assert!(err.to_string().contains("density_mixing"));
    }
}
