//! One-electron matrices and the two-electron part of the Fock matrix.
//!
//! G_ij = Σ_kl D_kl [(ij|kl) − ½(ik|jl)] for the total closed-shell density
//! D. Both build modes walk only the canonical quartets (i ≥ j, k ≥ l,
//! ij ≥ kl) and scatter each integral into all eight index permutations.

use crate::error::ScfError;
use crate::molecule::Molecule;
use basis::basis::Basis;
use basis::cgto::ContractedGTO;
use basis::eri::{eri_index, num_unique_integrals, TwoElectronStrategy};
use nalgebra::DMatrix;
use rayon::prelude::*;
use serde::Deserialize;
use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FockMode {
    /// Compute all unique integrals once and keep them in memory.
    #[default]
    InCore,
    /// Recompute integrals on every G build.
    Direct,
}

// (i, j) with i >= j in triangular order, so that pairs[pair_index(i, j)] == (i, j)
fn canonical_pairs(n: usize) -> Vec<(usize, usize)> {
    (0..n).flat_map(|i| (0..=i).map(move |j| (i, j))).collect()
}

/// Fill a symmetric matrix from f(i, j), evaluated in parallel for j <= i.
fn symmetric_matrix<F>(n: usize, f: F) -> DMatrix<f64>
where
    F: Fn(usize, usize) -> f64 + Sync,
{
    let pairs = canonical_pairs(n);
    let values: Vec<f64> = pairs.par_iter().map(|&(i, j)| f(i, j)).collect();

    let mut m = DMatrix::zeros(n, n);
    for (&(i, j), value) in pairs.iter().zip(values) {
        m[(i, j)] = value;
        m[(j, i)] = value;
    }
    m
}

pub fn overlap_matrix(basis: &[ContractedGTO]) -> DMatrix<f64> {
    symmetric_matrix(basis.len(), |i, j| ContractedGTO::Sab(&basis[i], &basis[j]))
}

pub fn kinetic_matrix(basis: &[ContractedGTO]) -> DMatrix<f64> {
    symmetric_matrix(basis.len(), |i, j| ContractedGTO::Tab(&basis[i], &basis[j]))
}

pub fn nuclear_attraction_matrix(basis: &[ContractedGTO], molecule: &Molecule) -> DMatrix<f64> {
    let nuclei = molecule.nuclei();
    symmetric_matrix(basis.len(), |i, j| {
        nuclei
            .iter()
            .map(|(z, center)| ContractedGTO::Vab(&basis[i], &basis[j], *center, *z))
            .sum()
    })
}

/// H = T + V.
pub fn core_hamiltonian(basis: &[ContractedGTO], molecule: &Molecule) -> DMatrix<f64> {
    kinetic_matrix(basis) + nuclear_attraction_matrix(basis, molecule)
}

/// All unique (ij|kl), packed by `basis::eri::eri_index`.
#[derive(Debug, Clone)]
pub struct EriStore {
    num_basis: usize,
    values: Vec<f64>,
}

impl EriStore {
    /// Evaluate every unique integral. Each worker owns one row of the packed
    /// array (all kl <= ij for a fixed pair ij).
    pub fn build<E: TwoElectronStrategy + ?Sized>(basis: &[ContractedGTO], strategy: &E) -> Self {
        let start = Instant::now();
        let n = basis.len();
        let pairs = canonical_pairs(n);
        let mut values = vec![0.0; num_unique_integrals(n)];

        let mut rows: Vec<&mut [f64]> = Vec::with_capacity(pairs.len());
        let mut rest = values.as_mut_slice();
        for p in 0..pairs.len() {
            let (row, tail) = std::mem::take(&mut rest).split_at_mut(p + 1);
            rows.push(row);
            rest = tail;
        }

        rows.into_par_iter().enumerate().for_each(|(p, row)| {
            let (i, j) = pairs[p];
            for (q, slot) in row.iter_mut().enumerate() {
                let (k, l) = pairs[q];
                *slot = strategy.coulomb(&basis[i], &basis[j], &basis[k], &basis[l]);
            }
        });

        info!(
            "ERI store: {} unique integrals ({:.2} MiB) with {} in {:.2?}",
            values.len(),
            (values.len() * std::mem::size_of::<f64>()) as f64 / (1024.0 * 1024.0),
            strategy.name(),
            start.elapsed()
        );
        Self {
            num_basis: n,
            values,
        }
    }

    pub fn num_basis(&self) -> usize {
        self.num_basis
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// (ij|kl) in any index order.
    pub fn get(&self, i: usize, j: usize, k: usize, l: usize) -> f64 {
        self.values[eri_index(i, j, k, l)]
    }

    // row p, column q <= p of the packed array
    fn packed(&self, p: usize, q: usize) -> f64 {
        self.values[p * (p + 1) / 2 + q]
    }
}

/// Builds G(D) and F = H + G(D) with an injected two-electron strategy.
pub struct FockBuilder<E: TwoElectronStrategy> {
    basis: Vec<ContractedGTO>,
    strategy: E,
    mode: FockMode,
    store: Option<EriStore>,
}

impl<E: TwoElectronStrategy> FockBuilder<E> {
    /// In-core mode evaluates the integral store here, before any SCF cycle.
    pub fn new(basis: &[ContractedGTO], strategy: E, mode: FockMode) -> Self {
        let store = match mode {
            FockMode::InCore => Some(EriStore::build(basis, &strategy)),
            FockMode::Direct => None,
        };
        Self {
            basis: basis.to_vec(),
            strategy,
            mode,
            store,
        }
    }

    pub fn store(&self) -> Option<&EriStore> {
        self.store.as_ref()
    }

    pub fn g_matrix(&self, density: &DMatrix<f64>) -> Result<DMatrix<f64>, ScfError> {
        let n = self.basis.len();
        if density.shape() != (n, n) {
            return Err(ScfError::InvalidInput(format!(
                "density matrix is {}x{}, basis has {} functions",
                density.nrows(),
                density.ncols(),
                n
            )));
        }

        let start = Instant::now();
        let g = match &self.store {
            Some(store) => assemble(n, density, |p, q| store.packed(p, q)),
            None => {
                let pairs = canonical_pairs(n);
                assemble(n, density, |p, q| {
                    let ((i, j), (k, l)) = (pairs[p], pairs[q]);
                    self.strategy
                        .coulomb(&self.basis[i], &self.basis[j], &self.basis[k], &self.basis[l])
                })
            }
        };
        debug!("G matrix ({:?}) built in {:.2?}", self.mode, start.elapsed());
        Ok(g)
    }

    pub fn fock_matrix(
        &self,
        h_core: &DMatrix<f64>,
        density: &DMatrix<f64>,
    ) -> Result<DMatrix<f64>, ScfError> {
        Ok(h_core + self.g_matrix(density)?)
    }
}

/// J − ½K over canonical quartets. `integral(p, q)` returns (ij|kl) for
/// pair indices p = ij >= q = kl. Workers accumulate private J and K
/// matrices that are summed at the join.
fn assemble<F>(n: usize, density: &DMatrix<f64>, integral: F) -> DMatrix<f64>
where
    F: Fn(usize, usize) -> f64 + Sync,
{
    let pairs = canonical_pairs(n);
    let d = density;

    let (j_mat, k_mat) = (0..pairs.len())
        .into_par_iter()
        .fold(
            || (DMatrix::<f64>::zeros(n, n), DMatrix::<f64>::zeros(n, n)),
            |(mut jm, mut km), p| {
                let (i, j) = pairs[p];
                for q in 0..=p {
                    let (k, l) = pairs[q];
                    let mut v = integral(p, q);
                    if v == 0.0 {
                        continue;
                    }
                    if i == j {
                        v *= 0.5;
                    }
                    if k == l {
                        v *= 0.5;
                    }
                    if p == q {
                        v *= 0.5;
                    }

                    jm[(i, j)] += 2.0 * d[(k, l)] * v;
                    jm[(j, i)] += 2.0 * d[(k, l)] * v;
                    jm[(k, l)] += 2.0 * d[(i, j)] * v;
                    jm[(l, k)] += 2.0 * d[(i, j)] * v;

                    km[(i, k)] += d[(j, l)] * v;
                    km[(j, k)] += d[(i, l)] * v;
                    km[(i, l)] += d[(j, k)] * v;
                    km[(j, l)] += d[(i, k)] * v;
                    km[(k, i)] += d[(l, j)] * v;
                    km[(l, i)] += d[(k, j)] * v;
                    km[(k, j)] += d[(l, i)] * v;
                    km[(l, j)] += d[(k, i)] * v;
                }
                (jm, km)
            },
        )
        .reduce(
            || (DMatrix::<f64>::zeros(n, n), DMatrix::<f64>::zeros(n, n)),
            |(j1, k1), (j2, k2)| (j1 + j2, k1 + k2),
        );

    j_mat - k_mat * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::molecule::Molecule;
    use basis::eri::{EriMethod, HeadGordonPople, Huzinaga};
    use basis::library::Sto3g;
    use nalgebra::Vector3;
    use periodic_table_on_an_enum::Element;
    use rand::Rng;

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

    fn random_density(n: usize) -> DMatrix<f64> {
        let mut rng = rand::thread_rng();
        let m = DMatrix::from_fn(n, n, |_, _| rng.gen_range(-0.5..0.5));
        &m + m.transpose()
    }

    // straight quadruple loop over every index, no symmetry
    fn reference_g(basis: &[ContractedGTO], d: &DMatrix<f64>) -> DMatrix<f64> {
        let n = basis.len();
        DMatrix::from_fn(n, n, |i, j| {
            let mut g = 0.0;
            for k in 0..n {
                for l in 0..n {
                    let coulomb = HeadGordonPople.coulomb(&basis[i], &basis[j], &basis[k], &basis[l]);
                    let exchange = HeadGordonPople.coulomb(&basis[i], &basis[k], &basis[j], &basis[l]);
                    g += d[(k, l)] * (coulomb - 0.5 * exchange);
                }
            }
            g
        })
    }

    #[test]
    fn test_one_electron_matrices_symmetric() {
        let mol = water();
        let basis = mol.build_basis(&Sto3g).unwrap();
        let s = overlap_matrix(basis.functions());
        let h = core_hamiltonian(basis.functions(), &mol);
        for i in 0..basis.len() {
            assert!((s[(i, i)] - 1.0).abs() < 1e-6, "S[{},{}] = {}", i, i, s[(i, i)]);
            for j in 0..basis.len() {
                assert!((s[(i, j)] - s[(j, i)]).abs() < 1e-14);
                assert!((h[(i, j)] - h[(j, i)]).abs() < 1e-14);
            }
        }
    }

    #[test]
    fn test_store_matches_strategy() {
        let basis = water().build_basis(&Sto3g).unwrap();
        let f = basis.functions();
        let store = EriStore::build(f, &Huzinaga);
        let n = f.len();
        assert_eq!(store.len(), num_unique_integrals(n));
        assert_eq!(store.num_basis(), n);
        for (i, j, k, l) in [(0, 0, 0, 0), (2, 1, 4, 3), (6, 5, 2, 2), (3, 3, 3, 0)] {
            let direct = Huzinaga.coulomb(&f[i], &f[j], &f[k], &f[l]);
            assert!((store.get(i, j, k, l) - direct).abs() < 1e-12);
            assert!((store.get(l, k, j, i) - direct).abs() < 1e-12);
        }
    }

    #[test]
    fn test_symmetric_assembly_matches_full_sum() {
        let basis = water().build_basis(&Sto3g).unwrap();
        let d = random_density(basis.len());
        let builder = FockBuilder::new(basis.functions(), HeadGordonPople, FockMode::InCore);
        let g = builder.g_matrix(&d).unwrap();
        let reference = reference_g(basis.functions(), &d);
        for i in 0..basis.len() {
            for j in 0..basis.len() {
                assert!(
                    (g[(i, j)] - reference[(i, j)]).abs() < 1e-10,
                    "G[{},{}] = {}, expected {}",
                    i,
                    j,
                    g[(i, j)],
                    reference[(i, j)]
                );
            }
        }
    }

    #[test]
    fn test_in_core_and_direct_agree() {
        let basis = water().build_basis(&Sto3g).unwrap();
        let d = random_density(basis.len());
        let in_core = FockBuilder::new(basis.functions(), EriMethod::Huzinaga, FockMode::InCore);
        let direct = FockBuilder::new(basis.functions(), EriMethod::Huzinaga, FockMode::Direct);
        assert!(in_core.store().is_some());
        assert!(direct.store().is_none());

        let g1 = in_core.g_matrix(&d).unwrap();
        let g2 = direct.g_matrix(&d).unwrap();
        assert!(
            (&g1 - &g2).abs().max() < 1e-6,
            "in-core and direct G differ by {}",
            (&g1 - &g2).abs().max()
        );
    }

    #[test]
    fn test_density_shape_checked() {
        let basis = water().build_basis(&Sto3g).unwrap();
        let builder = FockBuilder::new(basis.functions(), HeadGordonPople, FockMode::Direct);
        assert!(matches!(
            builder.g_matrix(&DMatrix::zeros(3, 3)),
            Err(ScfError::InvalidInput(_))
        ));
    }
}
