//! End-to-end checks through the public API: molecule → basis → integrals →
//! SCF, for H2 and LiH in STO-3G.

use basis::eri::{EriMethod, HeadGordonPople, Huzinaga};
use basis::library::Sto3g;
use nalgebra::{DMatrix, Vector3};
use periodic_table_on_an_enum::Element;
use rand::Rng;
use scf::{FockBuilder, FockMode, InitialGuess, JacobiSolver, Molecule, ScfStatus, SimpleSCF};

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

fn lih() -> Molecule {
    Molecule::from_angstrom(
        &[
            (Element::Lithium, Vector3::new(0.0, 0.0, 0.0)),
            (Element::Hydrogen, Vector3::new(0.0, 0.0, 1.6)),
        ],
        0,
    )
    .unwrap()
}

#[test]
fn h2_reference_energies() {
    let mol = h2();
    let basis = mol.build_basis(&Sto3g).unwrap();
    for mode in [FockMode::InCore, FockMode::Direct] {
        let mut scf = SimpleSCF::new(&mol, &basis, EriMethod::default(), mode).unwrap();
        let result = scf.run(InitialGuess::CoreHamiltonian).unwrap();

        assert_eq!(result.status, ScfStatus::Converged);
        assert!((result.nuclear_repulsion - 0.7151043908648649).abs() < 1e-8);
        assert!(
            (result.total_energy - -1.1167593656305694).abs() < 1e-6,
            "{:?}: E = {}",
            mode,
            result.total_energy
        );
        assert!((result.orbital_energies[0] - -0.5786).abs() < 1e-3);
        assert!((result.orbital_energies[1] - 0.6711).abs() < 1e-3);
    }
}

#[test]
fn h2_restart_is_idempotent() {
    let mol = h2();
    let basis = mol.build_basis(&Sto3g).unwrap();
    let mut scf = SimpleSCF::new(&mol, &basis, Huzinaga, FockMode::InCore).unwrap();
    let converged = scf.run(InitialGuess::CoreHamiltonian).unwrap();
    let again = scf.restart_from(&converged).unwrap();
    assert_eq!(again.status, ScfStatus::Converged);
    assert_eq!(again.iterations, 1);
    assert!((again.density.clone() - converged.density).abs().max() < 1e-6);
}

#[test]
fn lih_in_core_and_direct_fock_agree() {
    let mol = lih();
    let basis = mol.build_basis(&Sto3g).unwrap();
    let n = basis.len();
    assert_eq!(n, 6);

    let mut rng = rand::thread_rng();
    let m = DMatrix::from_fn(n, n, |_, _| rng.gen_range(-1.0..1.0));
    let density = &m + m.transpose();

    let in_core = FockBuilder::new(basis.functions(), HeadGordonPople, FockMode::InCore);
    let direct = FockBuilder::new(basis.functions(), Huzinaga, FockMode::Direct);
    let g1 = in_core.g_matrix(&density).unwrap();
    let g2 = direct.g_matrix(&density).unwrap();
    let diff = (&g1 - &g2).abs().max();
    assert!(diff < 1e-6, "G matrices differ by {}", diff);
    assert!((&g1 - g1.transpose()).abs().max() < 1e-12);
}

#[test]
fn lih_converges_with_diis() {
    let mol = lih();
    let basis = mol.build_basis(&Sto3g).unwrap();
    let mut scf = SimpleSCF::new(&mol, &basis, EriMethod::default(), FockMode::InCore).unwrap();
    scf.enable_diis(8);
    scf.max_cycle = 100;
    let result = scf.run(InitialGuess::CoreHamiltonian).unwrap();
    assert!(result.is_converged());
    // STO-3G LiH sits near -7.86 hartree
    assert!(
        result.total_energy > -7.9 && result.total_energy < -7.8,
        "LiH energy {}",
        result.total_energy
    );
    assert_eq!(result.num_occupied, 2);
    assert!(result.homo_energy().unwrap() < result.lumo_energy().unwrap());
}

#[test]
fn jacobi_diagonalizes_fock_matrix() {
    let mol = lih();
    let basis = mol.build_basis(&Sto3g).unwrap();
    let mut scf = SimpleSCF::new(&mol, &basis, EriMethod::default(), FockMode::InCore).unwrap();
    let result = scf.run(InitialGuess::CoreHamiltonian).unwrap();

    let x = scf.orthogonalizer();
    let f_prime = x.transpose() * &result.fock * x;
    let eig = JacobiSolver::default().diagonalize(&f_prime).unwrap();
    assert!(eig.is_converged());

    let v = &eig.vectors;
    let d = v.transpose() * &f_prime * v;
    for i in 0..d.nrows() {
        for j in 0..d.ncols() {
            let expected = if i == j { eig.values[i] } else { 0.0 };
            assert!((d[(i, j)] - expected).abs() < 1e-7);
        }
    }
    for i in 1..eig.values.len() {
        assert!(eig.values[i - 1] <= eig.values[i]);
    }
}
