//! Tests for the restricted SCF driver

use super::*;
use crate::eigen::JacobiSolver;
use crate::error::ScfError;
use crate::fock::FockMode;
use crate::molecule::Molecule;
use basis::eri::{EriMethod, HeadGordonPople, Huzinaga};
use basis::library::Sto3g;
use nalgebra::{DMatrix, Vector3};
use periodic_table_on_an_enum::Element;

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

fn water() -> Molecule {
    Molecule::from_bohr(
        &[
            (Element::Oxygen, Vector3::new(0.0, 0.0, 0.0)),
            (Element::Hydrogen, Vector3::new(0.0, 1.43, 1.1)),
            (Element::Hydrogen, Vector3::new(0.0, -1.43, 1.1)),
        ],
        0,
    )
    .unwrap()
}

fn h2_scf() -> SimpleSCF<EriMethod> {
    let mol = h2();
    let basis = mol.build_basis(&Sto3g).unwrap();
    SimpleSCF::new(&mol, &basis, EriMethod::HeadGordonPople, FockMode::InCore).unwrap()
}

#[test]
fn test_h2_sto3g_energy() {
    let mut scf = h2_scf();
    let result = scf.run(InitialGuess::CoreHamiltonian).unwrap();

    assert!(result.is_converged());
    assert!(
        (result.nuclear_repulsion - 0.7151043908648649).abs() < 1e-8,
        "E_nuc = {}",
        result.nuclear_repulsion
    );
    assert!(
        (result.total_energy - -1.1167593656305694).abs() < 1e-6,
        "E_total = {}",
        result.total_energy
    );
    assert!((result.electronic_energy + result.nuclear_repulsion - result.total_energy).abs() < 1e-12);

    let expected = [-0.5786, 0.6711];
    for (e, x) in result.orbital_energies.iter().zip(expected.iter()) {
        assert!((e - x).abs() < 1e-3, "orbital energy {} vs {}", e, x);
    }
    assert_eq!(result.homo_energy(), Some(result.orbital_energies[0]));
    assert_eq!(result.lumo_energy(), Some(result.orbital_energies[1]));
}

#[test]
fn test_density_has_correct_electron_count() {
    let mut scf = h2_scf();
    let result = scf.run(InitialGuess::CoreHamiltonian).unwrap();
    // Tr(DS) = N
    let electrons = (&result.density * &scf.overlap_matrix).trace();
    assert!((electrons - 2.0).abs() < 1e-10, "Tr(DS) = {}", electrons);

    // orbitals are S-orthonormal
    let cts = result.coefficients.transpose() * &scf.overlap_matrix * &result.coefficients;
    assert!((cts - DMatrix::identity(2, 2)).abs().max() < 1e-10);
}

#[test]
fn test_orthogonalizer() {
    let scf = h2_scf();
    let x = scf.orthogonalizer();
    let xtsx = x.transpose() * &scf.overlap_matrix * x;
    assert!((xtsx - DMatrix::identity(2, 2)).abs().max() < 1e-10);
}

#[test]
fn test_restart_converges_in_one_cycle() {
    let mut scf = h2_scf();
    let first = scf.run(InitialGuess::CoreHamiltonian).unwrap();
    let second = scf.restart_from(&first).unwrap();
    assert!(second.is_converged());
    assert_eq!(second.iterations, 1);
    assert!((second.total_energy - first.total_energy).abs() < 1e-8);
}

#[test]
fn test_observer_sees_every_cycle() {
    let mut scf = h2_scf();
    let mut records = Vec::new();
    let result = scf
        .run_with_observer(InitialGuess::CoreHamiltonian, |r| records.push(*r))
        .unwrap();

    assert_eq!(records.len(), result.iterations);
    assert!(records[0].delta_energy.is_none());
    for (k, r) in records.iter().enumerate() {
        assert_eq!(r.iteration, k + 1);
        assert!(!r.diis_used);
        assert!(r.diis_error.is_none());
    }
    let last = records[records.len() - 1];
    assert!((last.energy - result.total_energy).abs() < 1e-12);
}

#[test]
fn test_iteration_limit_is_a_status() {
    let mol = water();
    let basis = mol.build_basis(&Sto3g).unwrap();
    let mut scf = SimpleSCF::new(&mol, &basis, HeadGordonPople, FockMode::InCore).unwrap();
    scf.max_cycle = 2;
    let result = scf.run(InitialGuess::CoreHamiltonian).unwrap();
    assert_eq!(result.status, ScfStatus::IterationLimitExceeded);
    assert_eq!(result.iterations, 2);
    assert!(result.total_energy.is_finite());
}

#[test]
fn test_water_diis_matches_plain_iteration() {
    let mol = water();
    let basis = mol.build_basis(&Sto3g).unwrap();

    let mut plain = SimpleSCF::new(&mol, &basis, HeadGordonPople, FockMode::InCore).unwrap();
    plain.max_cycle = 200;
    plain.convergence =
        ConvergenceCriterion::energy_and_density(1e-10, Some(1e-7), CriteriaMode::All);
    let reference = plain.run(InitialGuess::CoreHamiltonian).unwrap();
    assert!(reference.is_converged());
    assert!(
        reference.total_energy > -75.1 && reference.total_energy < -74.8,
        "water STO-3G energy {}",
        reference.total_energy
    );

    let mut accelerated = SimpleSCF::new(&mol, &basis, HeadGordonPople, FockMode::Direct).unwrap();
    accelerated.max_cycle = 200;
    accelerated.convergence = plain.convergence.clone();
    accelerated.enable_diis(6);
    let mut used_diis = false;
    let mut errors = Vec::new();
    let result = accelerated
        .run_with_observer(InitialGuess::CoreHamiltonian, |r| {
            used_diis |= r.diis_used;
            errors.push(r.diis_error);
        })
        .unwrap();

    assert!(result.is_converged());
    assert!(used_diis);
    assert_eq!(accelerated.diis.as_ref().map(|d| d.max_subspace_size()), Some(6));
    assert!(errors.iter().all(|e| e.is_some()));
    let first = errors[0].unwrap();
    let last = errors[errors.len() - 1].unwrap();
    assert!(last < 1e-4 && last < first, "commutator error {} -> {}", first, last);
    assert!(result.iterations <= reference.iterations);
    assert!(
        (result.total_energy - reference.total_energy).abs() < 1e-6,
        "DIIS {} vs plain {}",
        result.total_energy,
        reference.total_energy
    );
}

#[test]
fn test_damped_run_reaches_same_energy() {
    let mut reference = h2_scf();
    let expected = reference.run(InitialGuess::CoreHamiltonian).unwrap();

    let mut damped = h2_scf();
    damped.density_mixing = 0.5;
    damped.max_cycle = 200;
    let result = damped.run(InitialGuess::CoreHamiltonian).unwrap();
    assert!(result.is_converged());
    assert!((result.total_energy - expected.total_energy).abs() < 1e-6);
}

#[test]
fn test_strategies_give_same_energy() {
    let mol = water();
    let basis = mol.build_basis(&Sto3g).unwrap();
    let mut energies = Vec::new();
    for method in [EriMethod::Huzinaga, EriMethod::HeadGordonPople] {
        let mut scf = SimpleSCF::new(&mol, &basis, method, FockMode::InCore).unwrap();
        scf.enable_diis(6);
        energies.push(scf.run(InitialGuess::CoreHamiltonian).unwrap().total_energy);
    }
    assert!((energies[0] - energies[1]).abs() < 1e-8, "{:?}", energies);
}

#[test]
fn test_supplied_density_guess() {
    let mut scf = h2_scf();
    let guess = scf.core_guess().unwrap();
    let from_guess = scf.run(InitialGuess::Density(guess)).unwrap();
    let from_core = scf.run(InitialGuess::CoreHamiltonian).unwrap();
    assert!((from_guess.total_energy - from_core.total_energy).abs() < 1e-10);
    assert_eq!(from_guess.iterations, from_core.iterations);

    assert!(matches!(
        scf.run(InitialGuess::Density(DMatrix::zeros(3, 3))),
        Err(ScfError::InvalidInput(_))
    ));
}

#[test]
fn test_invalid_driver_setup() {
    let h2_cation = Molecule::from_angstrom(
        &[
            (Element::Hydrogen, Vector3::new(0.0, 0.0, 0.0)),
            (Element::Hydrogen, Vector3::new(0.0, 0.0, 0.74)),
        ],
        1,
    )
    .unwrap();
    let basis = h2_cation.build_basis(&Sto3g).unwrap();
    assert!(matches!(
        SimpleSCF::new(&h2_cation, &basis, Huzinaga, FockMode::Direct),
        Err(ScfError::OpenShell(1))
    ));

    let mut scf = h2_scf();
    scf.max_cycle = 0;
    assert!(scf.run(InitialGuess::CoreHamiltonian).is_err());
    scf.max_cycle = 10;
    scf.density_mixing = 0.0;
    assert!(scf.run(InitialGuess::CoreHamiltonian).is_err());
}

#[test]
fn test_coincident_basis_centres_are_degenerate() {
    // two hydrogens 1e-6 bohr apart: the nuclei are distinct but the basis is
    // linearly dependent
    let mol = Molecule::from_bohr(
        &[
            (Element::Hydrogen, Vector3::new(0.0, 0.0, 0.0)),
            (Element::Hydrogen, Vector3::new(0.0, 0.0, 1e-6)),
        ],
        0,
    )
    .unwrap();
    let basis = mol.build_basis(&Sto3g).unwrap();
    assert!(matches!(
        SimpleSCF::new(&mol, &basis, HeadGordonPople, FockMode::InCore),
        Err(ScfError::DegenerateGeometry(_))
    ));
}

#[test]
fn test_starved_jacobi_is_reported() {
    let mol = water();
    let basis = mol.build_basis(&Sto3g).unwrap();
    let result = SimpleSCF::with_solver(
        &mol,
        &basis,
        HeadGordonPople,
        FockMode::Direct,
        JacobiSolver::new(1, true),
    );
    assert!(matches!(result, Err(ScfError::EigenNotConverged { .. })));
}

#[test]
fn test_helpers() {
    let c = DMatrix::from_row_slice(2, 2, &[0.6, -0.8, 0.8, 0.6]);
    let d = closed_shell_density(&c, 1);
    assert!((d[(0, 0)] - 0.72).abs() < 1e-12);
    assert!((d[(0, 1)] - 0.96).abs() < 1e-12);
    assert!(density_rms(&d, &d) == 0.0);

    let flipped = align_eigenvectors(DMatrix::from_row_slice(2, 1, &[0.3, -0.9]));
    assert!(flipped[(1, 0)] > 0.0 && flipped[(0, 0)] < 0.0);

    let h = DMatrix::identity(2, 2);
    assert!((electronic_energy(&d, &h, &h) - d.trace()).abs() < 1e-12);
}
